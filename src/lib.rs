// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # assetscope
//!
//! A cross-platform library for inspecting and editing serialized asset container files
//! whose records have a schema determined at runtime rather than at compile time. Built in
//! pure Rust, `assetscope` provides the in-memory workspace layer an asset editor sits on:
//! load many container files (cross-referencing each other as dependencies), resolve the
//! schema and typed value of any record on demand, stage edits as a non-destructive
//! overlay over the immutable source data, and determine exactly which files a save must
//! rewrite.
//!
//! ## Features
//!
//! - **Stable record identities** - Case-insensitive cross-file identity scheme keying all
//!   record-level state
//! - **Copy-on-write edit overlay** - Staged replacements and removals with precise
//!   dirty/clean bookkeeping; source data is never touched
//! - **Three-tier schema resolution** - Embedded per-file type trees, a global class
//!   database, and reflected script schemas, with graceful degradation at every tier
//! - **Lazy materialization** - Typed value trees are computed on demand and cached per
//!   container, never mutated in place
//! - **Efficient data access** - Memory-mapped container files with bounds-checked,
//!   endian-aware reads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use assetscope::prelude::*;
//!
//! let workspace = Workspace::builder().class_database(class_db).build()?;
//! let file = workspace.load_file(instance)?;
//!
//! // materialize a record's typed value tree
//! let cont = workspace.container(&file, 0, 5, false).unwrap();
//! let tree = workspace.base_field(&cont).unwrap();
//! println!("record type: {}", tree.type_name);
//!
//! // stage an edit; the overlay tracks what a save must rewrite
//! workspace.stage_replacement(&file, replacer, None)?;
//! for changed in workspace.changed_files() {
//!     println!("needs rewrite: {}", changed.name());
//! }
//! # Ok::<(), assetscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `assetscope` is organized into three modules:
//!
//! - [`file`] - Data access: [`file::DataSource`] backends (owned buffers, memory-mapped
//!   files), endian-aware io, and the structural metadata a loader collaborator produces
//! - [`schema`] - Schema sources and the value model: layout templates, the embedded and
//!   global schema databases, and the reflection collaborator boundary
//! - [`workspace`] - The core state machine: file catalog, identity index, edit overlay
//!   and the schema-resolving materializer
//!
//! The byte-level container format, the global class-database loader and the reflection
//! algorithm over compiled script metadata are external collaborators — this crate
//! consumes them at trait/data boundaries and never parses container layouts itself.
//!
//! ## Error Handling
//!
//! "Not found" is not an error in this library: unknown identities, unresolvable
//! dependency indices and missing schema sources all degrade to [`Option`] results or
//! fallback layouts per the resolution rules. [`Result<T, Error>`](Result) is reserved
//! for byte-level access violations, malformed record data and workspace misuse.

#[macro_use]
pub(crate) mod error;

/// Shared fixtures used by unit tests across the crate
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use assetscope::prelude::*;
///
/// let id = RecordId::new("sharedassets0.assets", 42);
/// assert_eq!(id.path_id(), 42);
/// ```
pub mod prelude;

/// Data access for serialized asset container files.
///
/// Provides the [`file::DataSource`] abstraction over record byte storage with in-memory
/// ([`file::Memory`]) and memory-mapped ([`file::Physical`]) backends, the endian-aware
/// [`file::io`] layer, and the structural metadata types a loader collaborator produces:
/// [`file::SerializedFile`], [`file::FileInstance`], [`file::BundleHandle`] and
/// [`file::EngineVersion`].
pub mod file;

/// Schema sources and the typed value model for records.
///
/// Field layouts ([`schema::TemplateField`]) come from the embedded per-file schema
/// database ([`schema::TypeTreeDb`]), the global class database
/// ([`schema::ClassDatabase`]) or reflected script metadata
/// ([`schema::ScriptTemplateProvider`]); materialized values are
/// [`schema::ValueField`] trees.
pub mod schema;

/// The editing workspace: catalog, overlay, schema resolution and materialization.
///
/// The [`workspace::Workspace`] container coordinates the
/// [`workspace::FileCatalog`], the record identity index, the
/// [`workspace::EditOverlay`] and the three-tier schema resolver; see the module
/// documentation for the architecture and mutation discipline.
pub mod workspace;

/// `assetscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. Used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `assetscope` Error type
///
/// The main error type for all operations in this crate. Covers byte-level access
/// violations, malformed record data, I/O failures and workspace misconfiguration;
/// not-found conditions are expressed as [`Option`] results instead.
pub use error::Error;

/// The editing workspace over a set of loaded container files.
///
/// See [`workspace::Workspace`] for staged edits, schema resolution and materialization.
pub use workspace::Workspace;

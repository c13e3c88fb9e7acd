//! Schema sources and the typed value model for records.
//!
//! A record's bytes carry no self-description; its field layout is resolved at runtime
//! from one of three schema sources, in fixed fallback order:
//!
//! 1. The embedded per-file schema database ([`crate::schema::TypeTreeDb`]), when the
//!    declaring file carries one and it has a non-empty entry
//! 2. The workspace-wide class database ([`crate::schema::ClassDatabase`]), keyed by a
//!    normalized type identifier
//! 3. For script-defined record subtypes, a layout reflected out of a compiled script
//!    assembly through the [`crate::schema::ScriptTemplateProvider`] collaborator
//!
//! All three produce the same artifact: a [`crate::schema::TemplateField`] layout tree,
//! which the materializer combines with a record's byte range to build a
//! [`crate::schema::ValueField`] value tree.
//!
//! # Key Components
//!
//! - [`crate::schema::TemplateField`] / [`crate::schema::FieldKind`] - field layout trees
//! - [`crate::schema::ValueField`] / [`crate::schema::FieldValue`] - typed value trees,
//!   materialized lazily and serialized back to bytes for previews
//! - [`crate::schema::TypeTreeDb`] - embedded per-file schema database
//! - [`crate::schema::ClassDatabase`] - global fallback class database with legacy id
//!   normalization ([`crate::schema::normalize_class_id`])
//! - [`crate::schema::ScriptTemplateProvider`] - reflection collaborator boundary

mod classdb;
mod reflect;
mod template;
mod typetree;
mod value;

pub use classdb::{normalize_class_id, ClassDatabase, ClassDbEntry, WellKnownClass};
pub use reflect::{ScriptRef, ScriptTemplateProvider};
pub use template::{FieldKind, TemplateField};
pub use typetree::{TypeTreeDb, TypeTreeEntry};
pub use value::{FieldValue, ValueField};

/// Script-type identifier value marking a record that is not a script-defined subtype.
pub const SCRIPT_INDEX_NONE: u16 = 0xffff;

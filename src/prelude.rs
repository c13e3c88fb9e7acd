//! Convenient re-exports of the most commonly used types and traits.
//!
//! This module provides a curated selection of the most frequently used types from across
//! the assetscope library, allowing for convenient glob imports.
//!
//! # Example
//!
//! ```rust
//! use assetscope::prelude::*;
//!
//! let id = RecordId::new("Level0", 5);
//! assert_eq!(id.file_name(), "level0");
//! ```

pub use crate::{
    file::{
        BundleHandle, BundleHandleRc, DataSource, EngineVersion, ExternalRef, FileInstance,
        FileInstanceRc, Memory, Physical, RecordInfo, SerializedFile,
    },
    schema::{
        normalize_class_id, ClassDatabase, ClassDbEntry, FieldKind, FieldValue, ScriptRef,
        ScriptTemplateProvider, TemplateField, TypeTreeDb, TypeTreeEntry, ValueField,
        WellKnownClass, SCRIPT_INDEX_NONE,
    },
    workspace::{
        ChangeFlags, ContainerRc, EditOverlay, FileCatalog, RecordContainer, RecordId,
        RecordRemover, RecordUpdater, Replacer, ReplacerKind, ReplacerRc, TemplateResolver,
        Workspace,
    },
    Error, Result,
};

//! Structural metadata of a parsed container file.
//!
//! A loader collaborator parses the on-disk container layout and produces a
//! [`crate::file::SerializedFile`]: the record table, the declared dependency list and the
//! optional embedded type tree. The workspace never re-parses this metadata — it is
//! structurally immutable after load, and all overlay state lives outside it.

use std::collections::HashMap;

use crate::{file::EngineVersion, schema::TypeTreeDb};

/// Location and type information for one record inside a container file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    /// Path identifier, unique within the declaring file
    pub path_id: i64,
    /// Byte offset of the record data within the file's data region
    pub offset: u64,
    /// Length of the record data in bytes
    pub len: u32,
    /// Type identifier, interpreted through schema resolution
    pub class_id: i32,
    /// Script-type identifier; [`crate::schema::SCRIPT_INDEX_NONE`] when the record is not
    /// a script-defined subtype
    pub script_index: u16,
}

/// One entry of a container file's declared dependency list.
///
/// Dependencies are declared by path and referenced from pointer fields by 1-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRef {
    /// Declared path of the dependency, as written by the engine (may be relative,
    /// `archive:/` style, or a bare file name)
    pub path: String,
}

impl ExternalRef {
    /// Creates a dependency reference from its declared path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        ExternalRef { path: path.into() }
    }

    /// The bare file-name component of the declared path, lowercased.
    ///
    /// Engines write dependency paths in several shapes; the final component is the stable
    /// part used for catalog lookup.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.path)
            .to_lowercase()
    }
}

/// Parsed structural metadata of one container file.
///
/// Produced by the loader collaborator, consumed read-only by the workspace. The record
/// table is indexed by path id at construction so identity lookups stay O(1).
pub struct SerializedFile {
    format_version: u32,
    engine_version: EngineVersion,
    records: Vec<RecordInfo>,
    by_path_id: HashMap<i64, usize>,
    externals: Vec<ExternalRef>,
    type_tree: Option<TypeTreeDb>,
}

impl SerializedFile {
    /// Assembles the metadata of a parsed container file.
    ///
    /// `type_tree` is `Some` only for files that carry an embedded per-file schema
    /// database; most release builds strip it.
    #[must_use]
    pub fn new(
        format_version: u32,
        engine_version: EngineVersion,
        records: Vec<RecordInfo>,
        externals: Vec<ExternalRef>,
        type_tree: Option<TypeTreeDb>,
    ) -> Self {
        let by_path_id = records
            .iter()
            .enumerate()
            .map(|(index, record)| (record.path_id, index))
            .collect();

        SerializedFile {
            format_version,
            engine_version,
            records,
            by_path_id,
            externals,
            type_tree,
        }
    }

    /// The container format version.
    #[must_use]
    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// The engine version tag the file was written by.
    #[must_use]
    pub fn engine_version(&self) -> &EngineVersion {
        &self.engine_version
    }

    /// All records declared by this file, in file order.
    #[must_use]
    pub fn records(&self) -> &[RecordInfo] {
        &self.records
    }

    /// Looks up a record by its path identifier.
    #[must_use]
    pub fn record(&self, path_id: i64) -> Option<&RecordInfo> {
        self.by_path_id.get(&path_id).map(|&index| &self.records[index])
    }

    /// The declared dependency list, in declaration order.
    #[must_use]
    pub fn externals(&self) -> &[ExternalRef] {
        &self.externals
    }

    /// The `index`-th declared dependency, if in range.
    #[must_use]
    pub fn external(&self, index: usize) -> Option<&ExternalRef> {
        self.externals.get(index)
    }

    /// Whether this file carries an embedded per-file schema database.
    #[must_use]
    pub fn has_type_tree(&self) -> bool {
        self.type_tree.is_some()
    }

    /// The embedded per-file schema database, if present.
    #[must_use]
    pub fn type_tree(&self) -> Option<&TypeTreeDb> {
        self.type_tree.as_ref()
    }
}

impl std::fmt::Debug for SerializedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializedFile")
            .field("format_version", &self.format_version)
            .field("engine_version", &self.engine_version)
            .field("records", &self.records.len())
            .field("externals", &self.externals.len())
            .field("has_type_tree", &self.has_type_tree())
            .finish()
    }
}

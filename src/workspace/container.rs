//! Record containers: one reference to one record, lazy or materialized.

use std::sync::Arc;

use crate::{
    file::{DataSource, FileInstanceRc, RecordInfo},
    schema::ValueField,
    workspace::RecordId,
    Result,
};

/// A shared reference to a record container.
pub type ContainerRc = Arc<RecordContainer>;

/// A reference to one record: its owning file, its byte range, its type identifiers and —
/// once computed — its materialized value tree.
///
/// Containers come in two flavors with one shape: source-backed containers reference a
/// range of the owning file's data, overlay-backed containers own an in-memory preview
/// buffer. A container starts lazy; materialization produces a *new* container carrying
/// the value tree, and the identity index keeps the lazy form. No container is ever
/// mutated after construction, so a handle held by one caller can never change under
/// another.
pub struct RecordContainer {
    id: RecordId,
    file: FileInstanceRc,
    source: Arc<dyn DataSource>,
    offset: u64,
    len: u32,
    class_id: i32,
    script_index: u16,
    value: Option<Arc<ValueField>>,
}

impl RecordContainer {
    /// Creates a lazy container for a record declared by its owning file.
    #[must_use]
    pub fn from_record(file: &FileInstanceRc, info: &RecordInfo) -> Self {
        RecordContainer {
            id: RecordId::for_file(file, info.path_id),
            file: file.clone(),
            source: file.data().clone(),
            offset: info.offset,
            len: info.len,
            class_id: info.class_id,
            script_index: info.script_index,
            value: None,
        }
    }

    /// Creates a lazy container over a staged replacement's preview buffer. The type
    /// identifiers come from the replacer's declared metadata, not from the file.
    #[must_use]
    pub fn from_overlay(
        file: &FileInstanceRc,
        path_id: i64,
        class_id: i32,
        script_index: u16,
        preview: Arc<dyn DataSource>,
    ) -> Self {
        let len = u32::try_from(preview.len()).unwrap_or(u32::MAX);
        RecordContainer {
            id: RecordId::for_file(file, path_id),
            file: file.clone(),
            source: preview,
            offset: 0,
            len,
            class_id,
            script_index,
            value: None,
        }
    }

    /// Returns a new container identical to this one but carrying a materialized value
    /// tree.
    #[must_use]
    pub fn with_value(&self, value: Arc<ValueField>) -> Self {
        RecordContainer {
            id: self.id.clone(),
            file: self.file.clone(),
            source: self.source.clone(),
            offset: self.offset,
            len: self.len,
            class_id: self.class_id,
            script_index: self.script_index,
            value: Some(value),
        }
    }

    /// The record's identity.
    #[must_use]
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// The owning file.
    #[must_use]
    pub fn file(&self) -> &FileInstanceRc {
        &self.file
    }

    /// The record's path identifier.
    #[must_use]
    pub fn path_id(&self) -> i64 {
        self.id.path_id()
    }

    /// The record's type identifier.
    #[must_use]
    pub fn class_id(&self) -> i32 {
        self.class_id
    }

    /// The record's script-type identifier; [`crate::schema::SCRIPT_INDEX_NONE`] for
    /// plain types.
    #[must_use]
    pub fn script_index(&self) -> u16 {
        self.script_index
    }

    /// The record's byte length.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether the record has zero bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The record's raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] when the declared range exceeds the data
    /// source, which indicates corrupt structural metadata.
    pub fn read_data(&self) -> Result<&[u8]> {
        let offset = usize::try_from(self.offset).map_err(|_| crate::Error::OutOfBounds)?;
        self.source.data_slice(offset, self.len as usize)
    }

    /// Whether a materialized value tree is present.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// The materialized value tree, when present.
    #[must_use]
    pub fn value(&self) -> Option<&Arc<ValueField>> {
        self.value.as_ref()
    }
}

impl std::fmt::Debug for RecordContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordContainer")
            .field("id", &self.id)
            .field("class_id", &self.class_id)
            .field("script_index", &self.script_index)
            .field("len", &self.len)
            .field("materialized", &self.has_value())
            .finish()
    }
}

//! Staged-edit producers.
//!
//! A [`Replacer`] describes one pending record mutation: the identity it targets, the
//! type identifiers the replacement declares, and how to serialize the replacement bytes.
//! The two stock producers cover the editor workflows — [`RecordUpdater`] for new or
//! modified records (raw bytes or a value tree serialized through the default path) and
//! [`RecordRemover`] for staged removals.

use std::sync::Arc;

use crate::{
    schema::{ValueField, SCRIPT_INDEX_NONE},
    Result,
};

/// A shared replacer handle, as stored in the overlay.
pub type ReplacerRc = Arc<dyn Replacer>;

/// Whether a replacer stages a value change or a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacerKind {
    /// Stages new or modified record content
    Modify,
    /// Stages removal of the record
    Remove,
}

/// One pending record mutation.
pub trait Replacer: Send + Sync {
    /// The path identifier of the record this replacer targets.
    fn path_id(&self) -> i64;

    /// The type identifier the replacement declares.
    fn class_id(&self) -> i32;

    /// The script-type identifier the replacement declares.
    fn script_index(&self) -> u16;

    /// Whether this replacer is a value change or a removal.
    fn kind(&self) -> ReplacerKind;

    /// Serializes the replacement bytes — the default preview path when the caller
    /// supplies none.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] when the replacement content cannot be
    /// serialized (e.g. an over-long string in a value tree).
    fn write(&self, buf: &mut Vec<u8>) -> Result<()>;
}

enum Payload {
    Bytes(Vec<u8>),
    Value(ValueField),
}

/// Stages new or modified content for one record.
pub struct RecordUpdater {
    path_id: i64,
    class_id: i32,
    script_index: u16,
    payload: Payload,
}

impl RecordUpdater {
    /// Creates an updater from pre-serialized record bytes.
    #[must_use]
    pub fn from_bytes(path_id: i64, class_id: i32, script_index: u16, bytes: Vec<u8>) -> Self {
        RecordUpdater {
            path_id,
            class_id,
            script_index,
            payload: Payload::Bytes(bytes),
        }
    }

    /// Creates an updater from a value tree, serialized on demand through
    /// [`crate::schema::ValueField::to_bytes`].
    #[must_use]
    pub fn from_value(path_id: i64, class_id: i32, script_index: u16, value: ValueField) -> Self {
        RecordUpdater {
            path_id,
            class_id,
            script_index,
            payload: Payload::Value(value),
        }
    }
}

impl Replacer for RecordUpdater {
    fn path_id(&self) -> i64 {
        self.path_id
    }

    fn class_id(&self) -> i32 {
        self.class_id
    }

    fn script_index(&self) -> u16 {
        self.script_index
    }

    fn kind(&self) -> ReplacerKind {
        ReplacerKind::Modify
    }

    fn write(&self, buf: &mut Vec<u8>) -> Result<()> {
        match &self.payload {
            Payload::Bytes(bytes) => {
                buf.extend_from_slice(bytes);
                Ok(())
            }
            Payload::Value(value) => {
                buf.extend_from_slice(&value.to_bytes()?);
                Ok(())
            }
        }
    }
}

/// Stages removal of one record.
pub struct RecordRemover {
    path_id: i64,
    class_id: i32,
}

impl RecordRemover {
    /// Creates a remover for the record at `path_id`.
    #[must_use]
    pub fn new(path_id: i64, class_id: i32) -> Self {
        RecordRemover { path_id, class_id }
    }
}

impl Replacer for RecordRemover {
    fn path_id(&self) -> i64 {
        self.path_id
    }

    fn class_id(&self) -> i32 {
        self.class_id
    }

    fn script_index(&self) -> u16 {
        SCRIPT_INDEX_NONE
    }

    fn kind(&self) -> ReplacerKind {
        ReplacerKind::Remove
    }

    fn write(&self, _buf: &mut Vec<u8>) -> Result<()> {
        // A removal serializes to nothing; the write step drops the record entirely
        Ok(())
    }
}

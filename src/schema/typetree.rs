//! Embedded per-file schema databases.
//!
//! Some container files carry their own schema table describing the field layouts of
//! exactly the types they use — the tier-1 schema source. When a file carries one and it
//! has a non-empty entry for a record's type, that entry wins and no other source is
//! consulted.

use crate::schema::TemplateField;

/// One entry of an embedded schema table.
///
/// An entry can be *declared but empty* (the engine wrote the type header without nodes);
/// such entries decline during resolution and the chain falls through to the class
/// database.
#[derive(Debug, Clone)]
pub struct TypeTreeEntry {
    /// Type identifier this entry describes
    pub class_id: i32,
    /// Script-type identifier, [`crate::schema::SCRIPT_INDEX_NONE`] for plain types
    pub script_index: u16,
    /// The field layout; `None` for declared-but-empty entries
    pub root: Option<TemplateField>,
}

impl TypeTreeEntry {
    /// Creates a populated entry.
    #[must_use]
    pub fn new(class_id: i32, script_index: u16, root: TemplateField) -> Self {
        TypeTreeEntry {
            class_id,
            script_index,
            root: Some(root),
        }
    }

    /// Creates a declared-but-empty entry.
    #[must_use]
    pub fn empty(class_id: i32, script_index: u16) -> Self {
        TypeTreeEntry {
            class_id,
            script_index,
            root: None,
        }
    }
}

/// The embedded schema table of one container file.
#[derive(Debug, Clone, Default)]
pub struct TypeTreeDb {
    entries: Vec<TypeTreeEntry>,
}

impl TypeTreeDb {
    /// Creates a schema table from its entries.
    #[must_use]
    pub fn new(entries: Vec<TypeTreeEntry>) -> Self {
        TypeTreeDb { entries }
    }

    /// Finds the entry for `(class_id, script_index)`, empty entries included.
    #[must_use]
    pub fn find(&self, class_id: i32, script_index: u16) -> Option<&TypeTreeEntry> {
        self.entries
            .iter()
            .find(|e| e.class_id == class_id && e.script_index == script_index)
    }

    /// Finds any entry for a script-type identifier, regardless of base type. Used to
    /// decide whether reflected extraction is needed for a script record.
    #[must_use]
    pub fn find_by_script_index(&self, script_index: u16) -> Option<&TypeTreeEntry> {
        self.entries.iter().find(|e| e.script_index == script_index)
    }

    /// All entries, in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[TypeTreeEntry] {
        &self.entries
    }
}

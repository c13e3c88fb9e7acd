//! Schema resolution: the ordered template-source chain.
//!
//! Given a record's type identifiers and declaring file, resolution walks a fixed,
//! ordered list of sources, each polymorphic over one capability — "given a query,
//! produce a layout or decline":
//!
//! 1. [`EmbeddedTreeSource`] - the declaring file's embedded schema database
//! 2. [`ClassDatabaseSource`] - the workspace-wide class database
//!
//! The script-reflection tier sits *above* this chain (it needs to materialize the base
//! layout and chase a record pointer, which only the workspace can do) and composes its
//! result from the tier-2 layout; see
//! [`crate::workspace::Workspace::script_template`].
//!
//! Absence at any tier degrades to the next; when every source declines, resolution
//! yields a minimal empty layout, never a hard failure. Legacy aliased type identifiers
//! are normalized exactly once, before the chain runs.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    file::FileInstance,
    schema::{normalize_class_id, ClassDatabase, TemplateField, SCRIPT_INDEX_NONE},
};

/// One schema lookup: normalized type identifier, script-type identifier and declaring
/// file.
pub struct TemplateQuery<'a> {
    /// Type identifier, already passed through [`crate::schema::normalize_class_id`]
    pub class_id: i32,
    /// Script-type identifier; [`SCRIPT_INDEX_NONE`] for plain types
    pub script_index: u16,
    /// The file declaring the record
    pub file: &'a FileInstance,
}

/// A schema source: produces a field layout for a query, or declines.
pub trait TemplateSource: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Produces a layout for `query`, or `None` to pass resolution to the next source.
    fn resolve(&self, query: &TemplateQuery<'_>) -> Option<TemplateField>;
}

/// Tier 1: the embedded per-file schema database.
///
/// Declines when the declaring file carries no schema table, has no entry for the query,
/// or the entry is declared-but-empty.
pub struct EmbeddedTreeSource;

impl TemplateSource for EmbeddedTreeSource {
    fn name(&self) -> &'static str {
        "embedded-tree"
    }

    fn resolve(&self, query: &TemplateQuery<'_>) -> Option<TemplateField> {
        let tree = query.file.serialized().type_tree()?;
        let entry = tree.find(query.class_id, query.script_index)?;
        entry.root.clone()
    }
}

/// Tier 2: the workspace-wide class database.
pub struct ClassDatabaseSource {
    db: Arc<ClassDatabase>,
}

impl ClassDatabaseSource {
    /// Creates a source over the injected class database.
    #[must_use]
    pub fn new(db: Arc<ClassDatabase>) -> Self {
        ClassDatabaseSource { db }
    }
}

impl TemplateSource for ClassDatabaseSource {
    fn name(&self) -> &'static str {
        "class-database"
    }

    fn resolve(&self, query: &TemplateQuery<'_>) -> Option<TemplateField> {
        self.db.find(query.class_id).map(|entry| entry.root.clone())
    }
}

/// The ordered chain of schema sources.
pub struct TemplateResolver {
    sources: Vec<Box<dyn TemplateSource>>,
}

impl TemplateResolver {
    /// Creates the standard two-tier chain over the injected class database.
    #[must_use]
    pub fn new(db: Arc<ClassDatabase>) -> Self {
        TemplateResolver {
            sources: vec![
                Box::new(EmbeddedTreeSource),
                Box::new(ClassDatabaseSource::new(db)),
            ],
        }
    }

    /// Resolves a field layout for `(class_id, script_index)` as declared by `file`.
    ///
    /// The identifier is normalized once, then each source is tried in order; when all
    /// decline the result is a minimal empty layout.
    #[must_use]
    pub fn resolve(&self, file: &FileInstance, class_id: i32, script_index: u16) -> TemplateField {
        let normalized = normalize_class_id(class_id);
        if normalized != class_id {
            trace!(class_id, normalized, "normalized legacy type identifier");
        }

        let query = TemplateQuery {
            class_id: normalized,
            script_index,
            file,
        };

        for source in &self.sources {
            if let Some(template) = source.resolve(&query) {
                trace!(source = source.name(), class_id = normalized, "schema resolved");
                return template;
            }
        }

        debug!(class_id = normalized, script_index, "no schema source matched, using empty layout");
        TemplateField::object("Base", "Object", vec![])
    }

    /// Whether the declaring file already knows a non-empty layout for a script-type
    /// identifier — in which case reflected extraction is unnecessary.
    #[must_use]
    pub fn knows_script(&self, file: &FileInstance, script_index: u16) -> bool {
        if script_index == SCRIPT_INDEX_NONE {
            return true;
        }

        file.serialized()
            .type_tree()
            .and_then(|tree| tree.find_by_script_index(script_index))
            .is_some_and(|entry| entry.root.is_some())
    }
}

impl std::fmt::Debug for TemplateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("TemplateResolver").field("sources", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        file::{FileInstance, Memory, SerializedFile},
        schema::{ClassDbEntry, FieldKind, TypeTreeDb, TypeTreeEntry},
    };

    fn class_db() -> Arc<ClassDatabase> {
        Arc::new(ClassDatabase::new(vec![
            ClassDbEntry::new(
                4,
                "Transform",
                TemplateField::object(
                    "Base",
                    "Transform",
                    vec![TemplateField::primitive("m_FromDb", "int", FieldKind::I32)],
                ),
            ),
            ClassDbEntry::new(
                240,
                "AudioMixer",
                TemplateField::object("Base", "AudioMixer", vec![]),
            ),
        ]))
    }

    fn file_with_tree(tree: Option<TypeTreeDb>) -> FileInstance {
        let file = SerializedFile::new(22, "2019.4.31f1".parse().unwrap(), vec![], vec![], tree);
        FileInstance::new("level0", file, Arc::new(Memory::new(vec![])))
    }

    #[test]
    fn test_embedded_entry_wins_over_class_db() {
        let tree = TypeTreeDb::new(vec![TypeTreeEntry::new(
            4,
            SCRIPT_INDEX_NONE,
            TemplateField::object(
                "Base",
                "Transform",
                vec![TemplateField::primitive("m_FromTree", "int", FieldKind::I32)],
            ),
        )]);
        let file = file_with_tree(Some(tree));
        let resolver = TemplateResolver::new(class_db());

        let template = resolver.resolve(&file, 4, SCRIPT_INDEX_NONE);
        assert!(template.child("m_FromTree").is_some());
        assert!(template.child("m_FromDb").is_none());
    }

    #[test]
    fn test_missing_tree_entry_falls_back_to_class_db() {
        let tree = TypeTreeDb::new(vec![]);
        let file = file_with_tree(Some(tree));
        let resolver = TemplateResolver::new(class_db());

        let template = resolver.resolve(&file, 4, SCRIPT_INDEX_NONE);
        assert!(template.child("m_FromDb").is_some());
    }

    #[test]
    fn test_empty_tree_entry_declines() {
        let tree = TypeTreeDb::new(vec![TypeTreeEntry::empty(4, SCRIPT_INDEX_NONE)]);
        let file = file_with_tree(Some(tree));
        let resolver = TemplateResolver::new(class_db());

        let template = resolver.resolve(&file, 4, SCRIPT_INDEX_NONE);
        assert!(template.child("m_FromDb").is_some());
    }

    #[test]
    fn test_legacy_alias_normalized_before_lookup() {
        let file = file_with_tree(None);
        let resolver = TemplateResolver::new(class_db());

        // 241 (controller alias) resolves through the canonical 240 entry
        let template = resolver.resolve(&file, 241, SCRIPT_INDEX_NONE);
        assert_eq!(template.type_name, "AudioMixer");
    }

    #[test]
    fn test_all_sources_decline_yields_empty_layout() {
        let file = file_with_tree(None);
        let resolver = TemplateResolver::new(class_db());

        let template = resolver.resolve(&file, 9999, SCRIPT_INDEX_NONE);
        assert!(template.children.is_empty());
        assert_eq!(template.type_name, "Object");
    }

    #[test]
    fn test_knows_script() {
        let tree = TypeTreeDb::new(vec![
            TypeTreeEntry::new(114, 1, TemplateField::object("Base", "MonoBehaviour", vec![])),
            TypeTreeEntry::empty(114, 2),
        ]);
        let file = file_with_tree(Some(tree));
        let resolver = TemplateResolver::new(class_db());

        assert!(resolver.knows_script(&file, 1));
        // declared-but-empty entries do not count as known
        assert!(!resolver.knows_script(&file, 2));
        assert!(!resolver.knows_script(&file, 3));
        assert!(resolver.knows_script(&file, SCRIPT_INDEX_NONE));

        let bare = file_with_tree(None);
        assert!(!resolver.knows_script(&bare, 1));
    }
}

//! The file catalog: loaded container files and dependency resolution.

use dashmap::DashMap;
use tracing::debug;

use crate::{
    file::{FileInstance, FileInstanceRc},
    Error, Result,
};
use std::sync::Arc;

/// Tracks loaded container files: the load-ordered list, the case-insensitive path index
/// and dependency resolution between files.
///
/// The load-ordered list is append-only; the path index is derived from it and can be
/// rebuilt wholesale after bulk registration through [`FileCatalog::rebuild_path_index`].
/// Dependency references are declared by path and resolved lazily — a dependency loaded
/// *after* its dependent becomes resolvable retroactively, because failed resolutions are
/// never cached.
pub struct FileCatalog {
    files: boxcar::Vec<FileInstanceRc>,
    by_path: DashMap<String, FileInstanceRc>,
    by_name: DashMap<String, FileInstanceRc>,
}

impl Default for FileCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FileCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        FileCatalog {
            files: boxcar::Vec::new(),
            by_path: DashMap::new(),
            by_name: DashMap::new(),
        }
    }

    /// Registers a loaded file in the load-ordered list and the path index.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] when a file with the same normalized path
    /// is already registered — duplicate loads are caller error, no merging policy is
    /// imposed here.
    pub fn load(&self, instance: FileInstance) -> Result<FileInstanceRc> {
        let instance = Arc::new(instance);
        if self.by_path.contains_key(instance.key()) {
            return Err(Error::Configuration(format!(
                "file '{}' is already loaded",
                instance.key()
            )));
        }

        self.files.push(instance.clone());
        self.index(&instance);
        debug!(file = instance.key(), records = instance.serialized().records().len(), "loaded container file");
        Ok(instance)
    }

    fn index(&self, instance: &FileInstanceRc) {
        self.by_path.insert(instance.key().to_string(), instance.clone());
        // bare-name index is first-wins: dependency declarations reference the earliest
        // load when directories collide
        self.by_name
            .entry(instance.name().to_lowercase())
            .or_insert_with(|| instance.clone());
    }

    /// Rebuilds the path index from the load-ordered list.
    ///
    /// The index is not incrementally maintained against external mutation of instances;
    /// call this after any bulk registration pass.
    pub fn rebuild_path_index(&self) {
        self.by_path.clear();
        self.by_name.clear();
        for (_, instance) in self.files.iter() {
            self.index(instance);
        }
    }

    /// Looks up a file by normalized path key.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<FileInstanceRc> {
        self.by_path.get(&path.to_lowercase()).map(|e| e.value().clone())
    }

    /// Looks up a file by bare file name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<FileInstanceRc> {
        self.by_name.get(&name.to_lowercase()).map(|e| e.value().clone())
    }

    /// The number of loaded files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.count()
    }

    /// Whether no files are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.count() == 0
    }

    /// Iterates the loaded files in load order.
    pub fn iter(&self) -> impl Iterator<Item = FileInstanceRc> + '_ {
        self.files.iter().map(|(_, instance)| instance.clone())
    }

    /// Resolves the `index`-th entry of `from`'s declared dependency list.
    ///
    /// Resolution tries, in order: the full declared path, a sibling of `from`'s own
    /// location, and the bare file name (which is how files grouped in an archive find
    /// each other). Successful resolutions are cached per slot on the instance; failures
    /// are not, so late loads become visible. Returns `None` when the index is out of
    /// range or the target is not loaded.
    #[must_use]
    pub fn resolve_dependency(&self, from: &FileInstanceRc, index: usize) -> Option<FileInstanceRc> {
        if let Some(cached) = from.cached_dependency(index) {
            return Some(cached);
        }

        let external = from.serialized().external(index)?;

        let resolved = self
            .get(&external.path)
            .or_else(|| {
                from.path()
                    .parent()
                    .map(|dir| dir.join(external.file_name()))
                    .and_then(|p| self.get(&p.to_string_lossy()))
            })
            .or_else(|| self.get_by_name(&external.file_name()));

        match resolved {
            Some(instance) => {
                from.cache_dependency(index, instance.clone());
                Some(instance)
            }
            None => {
                debug!(
                    from = from.key(),
                    dependency = external.path,
                    index,
                    "dependency not resolvable"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for FileCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCatalog").field("files", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{ExternalRef, Memory, SerializedFile};

    fn instance(path: &str, externals: Vec<ExternalRef>) -> FileInstance {
        let file = SerializedFile::new(22, "2019.4.31f1".parse().unwrap(), vec![], externals, None);
        FileInstance::new(path, file, Arc::new(Memory::new(vec![])))
    }

    #[test]
    fn test_load_and_lookup_case_insensitive() {
        let catalog = FileCatalog::new();
        catalog.load(instance("Game_Data/SharedAssets0.assets", vec![])).unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("game_data/sharedassets0.assets").is_some());
        assert!(catalog.get("GAME_DATA/SHAREDASSETS0.ASSETS").is_some());
        assert!(catalog.get_by_name("sharedassets0.assets").is_some());
        assert!(catalog.get("other.assets").is_none());
    }

    #[test]
    fn test_duplicate_load_is_caller_error() {
        let catalog = FileCatalog::new();
        catalog.load(instance("level0", vec![])).unwrap();

        assert!(matches!(
            catalog.load(instance("Level0", vec![])),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_resolve_dependency_by_bare_name() {
        let catalog = FileCatalog::new();
        let level = catalog
            .load(instance(
                "data/level0",
                vec![ExternalRef::new("Library/sharedassets1.assets")],
            ))
            .unwrap();
        let shared = catalog.load(instance("elsewhere/sharedassets1.assets", vec![])).unwrap();

        let resolved = catalog.resolve_dependency(&level, 0).unwrap();
        assert!(Arc::ptr_eq(&resolved, &shared));
        // second resolution hits the instance cache
        assert!(level.cached_dependency(0).is_some());
    }

    #[test]
    fn test_resolve_dependency_out_of_range() {
        let catalog = FileCatalog::new();
        let level = catalog.load(instance("level0", vec![])).unwrap();
        assert!(catalog.resolve_dependency(&level, 0).is_none());
    }

    #[test]
    fn test_resolve_dependency_late_load() {
        let catalog = FileCatalog::new();
        let level = catalog
            .load(instance("level0", vec![ExternalRef::new("sharedassets1.assets")]))
            .unwrap();

        // not loaded yet: fails, and the failure is not cached
        assert!(catalog.resolve_dependency(&level, 0).is_none());

        let shared = catalog.load(instance("sharedassets1.assets", vec![])).unwrap();
        let resolved = catalog.resolve_dependency(&level, 0).unwrap();
        assert!(Arc::ptr_eq(&resolved, &shared));
    }

    #[test]
    fn test_rebuild_path_index() {
        let catalog = FileCatalog::new();
        catalog.load(instance("level0", vec![])).unwrap();
        catalog.load(instance("level1", vec![])).unwrap();

        catalog.by_path.clear();
        assert!(catalog.get("level0").is_none());

        catalog.rebuild_path_index();
        assert!(catalog.get("level0").is_some());
        assert!(catalog.get("level1").is_some());
    }
}

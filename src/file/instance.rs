//! Loaded container-file handles.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use crate::file::{DataSource, SerializedFile};

/// A reference to a loaded container file.
pub type FileInstanceRc = Arc<FileInstance>;
/// A reference to an enclosing archive handle.
pub type BundleHandleRc = Arc<BundleHandle>;

/// Handle to the archive a container file was loaded out of.
///
/// Files extracted from an archive resolve sibling resources (e.g. the managed-assembly
/// directory for reflected schema extraction) relative to the archive's location, not
/// relative to wherever the extracted bytes happen to live.
#[derive(Debug)]
pub struct BundleHandle {
    path: PathBuf,
    name: String,
}

impl BundleHandle {
    /// Creates an archive handle from the archive's canonical path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        BundleHandle { path, name }
    }

    /// The archive's canonical path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The archive's file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One loaded container file: path identity, structural metadata, record data source and
/// optional enclosing archive.
///
/// Created by the loader collaborator, registered with the
/// [`crate::workspace::FileCatalog`], and never structurally mutated afterwards — staged
/// edits live in the workspace's overlay, not here. Declared dependencies are resolved
/// lazily through the catalog and cached per slot on first success.
pub struct FileInstance {
    path: PathBuf,
    name: String,
    key: String,
    file: SerializedFile,
    source: Arc<dyn DataSource>,
    parent_bundle: Option<BundleHandleRc>,
    dependencies: Vec<OnceLock<FileInstanceRc>>,
}

impl FileInstance {
    /// Creates a handle for a container file loaded directly from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, file: SerializedFile, source: Arc<dyn DataSource>) -> Self {
        Self::with_bundle(path, file, source, None)
    }

    /// Creates a handle for a container file extracted from an enclosing archive.
    #[must_use]
    pub fn in_bundle(
        path: impl Into<PathBuf>,
        file: SerializedFile,
        source: Arc<dyn DataSource>,
        bundle: BundleHandleRc,
    ) -> Self {
        Self::with_bundle(path, file, source, Some(bundle))
    }

    fn with_bundle(
        path: impl Into<PathBuf>,
        file: SerializedFile,
        source: Arc<dyn DataSource>,
        parent_bundle: Option<BundleHandleRc>,
    ) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Normalized once here; every identity and catalog lookup reuses it
        let key = path.to_string_lossy().to_lowercase();
        let dependencies = (0..file.externals().len()).map(|_| OnceLock::new()).collect();

        FileInstance {
            path,
            name,
            key,
            file,
            source,
            parent_bundle,
            dependencies,
        }
    }

    /// The canonical path this file was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file-name component of the path.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lowercased canonical path, the key under which this file is indexed.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The parsed structural metadata.
    #[must_use]
    pub fn serialized(&self) -> &SerializedFile {
        &self.file
    }

    /// The record byte source.
    #[must_use]
    pub fn data(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// The enclosing archive, when this file was loaded out of one.
    #[must_use]
    pub fn parent_bundle(&self) -> Option<&BundleHandleRc> {
        self.parent_bundle.as_ref()
    }

    /// The directory that sibling resources resolve against: the enclosing archive's
    /// directory when present, this file's directory otherwise.
    #[must_use]
    pub fn sibling_dir(&self, name: &str) -> Option<PathBuf> {
        let base = match &self.parent_bundle {
            Some(bundle) => bundle.path().parent(),
            None => self.path.parent(),
        };

        base.map(|dir| dir.join(name))
    }

    /// The cached resolution of the `index`-th declared dependency, if resolved before.
    #[must_use]
    pub fn cached_dependency(&self, index: usize) -> Option<FileInstanceRc> {
        self.dependencies.get(index).and_then(|slot| slot.get().cloned())
    }

    /// Caches a successful dependency resolution. Failed resolutions are never cached so
    /// that loading the missing file later makes the slot resolvable.
    pub(crate) fn cache_dependency(&self, index: usize, instance: FileInstanceRc) {
        if let Some(slot) = self.dependencies.get(index) {
            let _ = slot.set(instance);
        }
    }
}

impl std::fmt::Debug for FileInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileInstance")
            .field("path", &self.path)
            .field("records", &self.file.records().len())
            .field("externals", &self.file.externals().len())
            .field("parent_bundle", &self.parent_bundle.as_ref().map(|b| b.name()))
            .finish()
    }
}

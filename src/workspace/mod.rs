//! The editing workspace: catalog, overlay, schema resolution and materialization.
//!
//! This module provides the [`Workspace`] container coordinating everything the crate is
//! about: loading container files, staging non-destructive edits over them, resolving
//! record schemas through the three-tier fallback chain, and materializing typed value
//! trees on demand.
//!
//! # Architecture
//!
//! The workspace owns four pieces of state with a strict mutation discipline:
//!
//! - The [`FileCatalog`] of loaded files (mutated only by [`Workspace::load_file`])
//! - The identity index mapping every [`RecordId`] to its current [`RecordContainer`] —
//!   source-backed after load, overlay-backed while a replacement is staged
//! - The [`EditOverlay`] of staged replacements, removal markers and per-file
//!   [`ChangeFlags`] (mutated only by the staging/retraction/flag operations)
//! - The observer list, notified synchronously, exactly once per mutating call
//!
//! Readers ([`Workspace::container`], [`Workspace::base_field`], schema resolution) never
//! mutate shared state: materialization returns a *new* container and the index keeps the
//! lazy one, so concurrent readers are safe alongside a single mutator.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use assetscope::prelude::*;
//! use std::sync::Arc;
//!
//! let workspace = Workspace::builder()
//!     .class_database(class_db)
//!     .build()?;
//! let file = workspace.load_file(instance)?;
//!
//! // read a record's typed value tree
//! let cont = workspace.container(&file, 0, 5, false).unwrap();
//! let tree = workspace.base_field(&cont).unwrap();
//!
//! // stage an edit and see what needs rewriting
//! let replacer = Arc::new(RecordUpdater::from_bytes(5, 4, SCRIPT_INDEX_NONE, new_bytes));
//! workspace.stage_replacement(&file, replacer, None)?;
//! assert!(workspace.is_modified());
//! assert_eq!(workspace.changed_files().len(), 1);
//! # Ok::<(), assetscope::Error>(())
//! ```

mod catalog;
mod container;
mod identity;
mod overlay;
mod replacer;
mod resolver;

use std::{
    collections::HashSet,
    path::Path,
    sync::{Arc, RwLock},
};

use crossbeam_skiplist::SkipMap;
use tracing::{debug, warn};

pub use catalog::FileCatalog;
pub use container::{ContainerRc, RecordContainer};
pub use identity::RecordId;
pub use overlay::{ChangeFlags, EditOverlay, StagedEdit};
pub use replacer::{RecordRemover, RecordUpdater, Replacer, ReplacerKind, ReplacerRc};
pub use resolver::{
    ClassDatabaseSource, EmbeddedTreeSource, TemplateQuery, TemplateResolver, TemplateSource,
};

use crate::{
    file::{FileInstance, FileInstanceRc, Memory},
    schema::{
        ClassDatabase, ScriptRef, ScriptTemplateProvider, TemplateField, ValueField,
        WellKnownClass, SCRIPT_INDEX_NONE,
    },
    Error, Result,
};

/// Callback invoked with the owning file and record identity on every staged replacement
/// or retraction.
pub type ItemUpdatedHandler = Box<dyn Fn(&FileInstanceRc, &RecordId) + Send + Sync>;

/// The name of the managed-assembly directory searched next to a declaring file (or its
/// enclosing archive) during reflected schema extraction.
const MANAGED_DIR: &str = "Managed";

/// The in-memory workspace over a set of loaded container files.
///
/// See the [module documentation](self) for the architecture. All methods take `&self`;
/// the workspace follows a single-writer / multiple-reader discipline and is not designed
/// for concurrent mutation.
pub struct Workspace {
    catalog: FileCatalog,
    class_db: Arc<ClassDatabase>,
    resolver: TemplateResolver,
    script_provider: Option<Arc<dyn ScriptTemplateProvider>>,
    records: SkipMap<RecordId, ContainerRc>,
    overlay: EditOverlay,
    observers: RwLock<Vec<ItemUpdatedHandler>>,
    from_bundle: bool,
}

impl Workspace {
    /// Creates a workspace over the injected class database, with no script provider.
    #[must_use]
    pub fn new(class_db: Arc<ClassDatabase>) -> Self {
        Workspace {
            catalog: FileCatalog::new(),
            resolver: TemplateResolver::new(class_db.clone()),
            class_db,
            script_provider: None,
            records: SkipMap::new(),
            overlay: EditOverlay::new(),
            observers: RwLock::new(Vec::new()),
            from_bundle: false,
        }
    }

    /// Starts building a workspace.
    #[must_use]
    pub fn builder() -> WorkspaceBuilder {
        WorkspaceBuilder::new()
    }

    /// The file catalog.
    #[must_use]
    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    /// The edit overlay (read access; mutation goes through the workspace methods).
    #[must_use]
    pub fn overlay(&self) -> &EditOverlay {
        &self.overlay
    }

    /// The injected class database.
    #[must_use]
    pub fn class_database(&self) -> &Arc<ClassDatabase> {
        &self.class_db
    }

    /// Whether this workspace was opened from an archive.
    #[must_use]
    pub fn from_bundle(&self) -> bool {
        self.from_bundle
    }

    /// Whether any staged edit or other-file change exists.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.overlay.is_modified()
    }

    /// Registers an observer, invoked synchronously with (file, identity) on every
    /// staged replacement or retraction — one notification per mutating call.
    pub fn on_item_updated(&self, handler: impl Fn(&FileInstanceRc, &RecordId) + Send + Sync + 'static) {
        if let Ok(mut observers) = self.observers.write() {
            observers.push(Box::new(handler));
        }
    }

    fn notify(&self, file: &FileInstanceRc, id: &RecordId) {
        if let Ok(observers) = self.observers.read() {
            for observer in observers.iter() {
                observer(file, id);
            }
        }
    }

    // ---- catalog ----------------------------------------------------------------

    /// Registers a loaded file and seeds the identity index with one lazy container per
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] for duplicate loads.
    pub fn load_file(&self, instance: FileInstance) -> Result<FileInstanceRc> {
        let rc = self.catalog.load(instance)?;
        for info in rc.serialized().records() {
            let cont = RecordContainer::from_record(&rc, info);
            self.records.insert(cont.id().clone(), Arc::new(cont));
        }
        Ok(rc)
    }

    /// Rebuilds the catalog's path index from the load-ordered list.
    pub fn rebuild_path_index(&self) {
        self.catalog.rebuild_path_index();
    }

    /// The containers of one file's records, ordered by path identifier, reflecting the
    /// overlay (staged replacements appear, staged removals do not).
    #[must_use]
    pub fn records_of(&self, file: &FileInstance) -> Vec<ContainerRc> {
        let lower = RecordId::new(file.key(), i64::MIN);
        let upper = RecordId::new(file.key(), i64::MAX);
        self.records
            .range(lower..=upper)
            .map(|entry| entry.value().clone())
            .collect()
    }

    // ---- overlay ----------------------------------------------------------------

    /// Stages a replacement or removal for the identity produced by `replacer`.
    ///
    /// An existing entry for the same identity is retracted first, closing its preview
    /// buffer. Removal replacers clear the identity's container and join the removal
    /// set. Value replacers store their preview (serialized through the replacer when
    /// none is supplied) and install a fresh lazy container over it, typed by the
    /// replacer's declared metadata. Fires one item-updated notification and marks the
    /// workspace modified.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] when the default serialization path fails.
    pub fn stage_replacement(
        &self,
        file: &FileInstanceRc,
        replacer: ReplacerRc,
        preview: Option<Vec<u8>>,
    ) -> Result<()> {
        let id = RecordId::for_file(file, replacer.path_id());

        if let Some(previous) = self.overlay.staged_replacer(&id) {
            self.retract(file, previous.as_ref(), true);
        }

        let preview = match preview {
            Some(bytes) => bytes,
            None => {
                let mut bytes = Vec::new();
                replacer.write(&mut bytes)?;
                bytes
            }
        };
        let preview = Arc::new(Memory::new(preview));

        match replacer.kind() {
            ReplacerKind::Remove => {
                self.records.remove(&id);
                self.overlay.mark_removed(id.clone());
            }
            ReplacerKind::Modify => {
                let cont = RecordContainer::from_overlay(
                    file,
                    replacer.path_id(),
                    replacer.class_id(),
                    replacer.script_index(),
                    preview.clone(),
                );
                self.records.insert(id.clone(), Arc::new(cont));
            }
        }

        self.overlay
            .insert_staged(id.clone(), StagedEdit { replacer, preview });

        self.notify(file, &id);
        self.overlay.set_modified(true);
        Ok(())
    }

    /// Retracts the overlay entry for the identity produced by `replacer`.
    ///
    /// The preview buffer is dropped (closed) unless `close_preview` is false, in which
    /// case it is returned to the caller. Removal markers leave the removal set, and the
    /// source-backed container is restored when the file still declares the record.
    /// Retracting a non-existent entry is a no-op apart from the notification. The
    /// workspace-modified flag becomes false only when no staged entries and no
    /// other-file changes remain.
    pub fn retract(
        &self,
        file: &FileInstanceRc,
        replacer: &dyn Replacer,
        close_preview: bool,
    ) -> Option<Arc<Memory>> {
        let id = RecordId::for_file(file, replacer.path_id());

        let mut kept_open = None;
        if let Some(edit) = self.overlay.remove_staged(&id) {
            if !close_preview {
                kept_open = Some(edit.preview.clone());
            }
            // dropping the entry here closes the preview

            if self.overlay.is_removed(&id) {
                self.overlay.unmark_removed(&id);
            }

            // the identity's container reverts to the source file where possible
            match file.serialized().record(id.path_id()) {
                Some(info) => {
                    let cont = RecordContainer::from_record(file, info);
                    self.records.insert(id.clone(), Arc::new(cont));
                }
                None => {
                    self.records.remove(&id);
                }
            }
        }

        self.notify(file, &id);

        if self.overlay.staged_count() == 0 && !self.overlay.any_other_changes() {
            self.overlay.set_modified(false);
        }
        kept_open
    }

    /// ORs `flags` into `file`'s other-change mask. A non-empty mask marks the workspace
    /// modified.
    pub fn set_other_change_flags(&self, file: &FileInstanceRc, flags: ChangeFlags) {
        self.overlay.or_flags(file.key(), flags);
    }

    /// Clears `flags` from `file`'s other-change mask, pruning the entry when it reaches
    /// zero and recomputing the workspace-modified flag.
    pub fn clear_other_change_flags(&self, file: &FileInstanceRc, flags: ChangeFlags) {
        self.overlay.clear_flags(file.key(), flags);
    }

    /// The set of files that must be rewritten to persist the overlay: files owning any
    /// staged entry plus files with non-zero other-change masks.
    ///
    /// Computed by a full scan of overlay state on every call — O(staged + flagged),
    /// called once per save, not per edit.
    #[must_use]
    pub fn changed_files(&self) -> Vec<FileInstanceRc> {
        let mut seen = HashSet::new();
        let mut changed = Vec::new();

        for id in self.overlay.staged_ids() {
            if let Some(file) = self.catalog.get(id.file_name()) {
                if seen.insert(file.key().to_string()) {
                    changed.push(file);
                }
            }
        }

        for key in self.overlay.flagged_files() {
            if let Some(file) = self.catalog.get(&key) {
                if seen.insert(file.key().to_string()) {
                    changed.push(file);
                }
            }
        }

        changed
    }

    // ---- schema resolution ------------------------------------------------------

    /// Resolves the field layout for a container's record.
    ///
    /// When `resolve_scripts` is true and the record is a script-attached behavior whose
    /// script-type layout is not already known, reflected extraction is attempted through
    /// the managed-assembly directory next to the declaring file (or its enclosing
    /// archive); every absence along that path degrades to the class-database layout.
    #[must_use]
    pub fn template_for(&self, cont: &RecordContainer, resolve_scripts: bool) -> TemplateField {
        let file = cont.file();

        if cont.class_id() == WellKnownClass::MonoBehaviour.id()
            && resolve_scripts
            && !self.resolver.knows_script(file, cont.script_index())
        {
            if let Some(managed) = file.sibling_dir(MANAGED_DIR) {
                if managed.is_dir() {
                    return self.script_template(cont, &managed);
                }
                debug!(dir = %managed.display(), "no managed directory, skipping reflected extraction");
            }
        }

        self.resolver.resolve(file, cont.class_id(), cont.script_index())
    }

    /// Resolves a script record's composed field layout: the class-database layout
    /// extended with the script-declared fields reflected out of its assembly.
    ///
    /// Degrades to the unextended base layout when the record has no script reference,
    /// the referenced script record cannot be resolved, the assembly is missing from
    /// `managed_dir`, no provider is configured, or reflection itself fails. The composed
    /// layout is not cached here; repeated reflection is the caller's cost to manage.
    #[must_use]
    pub fn script_template(&self, cont: &RecordContainer, managed_dir: &Path) -> TemplateField {
        let file = cont.file();
        let base = self.resolver.resolve(file, cont.class_id(), cont.script_index());

        if cont.script_index() == SCRIPT_INDEX_NONE {
            return base;
        }

        let Some(provider) = &self.script_provider else {
            debug!("no script template provider configured");
            return base;
        };

        let Ok(data) = cont.read_data() else {
            return base;
        };
        let Ok(base_value) = ValueField::materialize(&base, data) else {
            return base;
        };
        let Some(script_ptr) = base_value.get("m_Script") else {
            return base;
        };
        let Some(script_cont) = self.container_from_pointer(file, script_ptr, false) else {
            debug!("script reference record not resolvable");
            return base;
        };
        let Some(script_value) = script_cont.value() else {
            return base;
        };

        let (Some(class_name), Some(namespace), Some(assembly_name)) = (
            script_value.get("m_ClassName").and_then(ValueField::as_str),
            script_value.get("m_Namespace").and_then(ValueField::as_str),
            script_value.get("m_AssemblyName").and_then(ValueField::as_str),
        ) else {
            return base;
        };

        let script = ScriptRef::new(class_name, namespace, assembly_name);
        let assembly_path = managed_dir.join(&script.assembly_name);
        if !assembly_path.is_file() {
            debug!(assembly = %assembly_path.display(), "script assembly not found");
            return base;
        }

        match provider.extend_template(
            &base,
            &assembly_path,
            &script,
            file.serialized().engine_version(),
        ) {
            Ok(composed) => composed,
            Err(error) => {
                warn!(%error, script = script.full_name(), "reflected extraction failed");
                base
            }
        }
    }

    // ---- materialization --------------------------------------------------------

    /// Resolves a record container by (declaring file, dependency index, path id).
    ///
    /// `file_id = 0` means `file` itself; `file_id = k > 0` resolves the `(k-1)`-th
    /// declared dependency through the catalog. With `only_identity` the container is
    /// returned as indexed (possibly lazy); otherwise a lazy container is materialized
    /// and returned as a new value — the index keeps the lazy form.
    ///
    /// Returns `None` when the dependency index is invalid, the identity is unknown (or
    /// staged for removal), or the record bytes do not parse against the resolved layout.
    #[must_use]
    pub fn container(
        &self,
        file: &FileInstanceRc,
        file_id: i32,
        path_id: i64,
        only_identity: bool,
    ) -> Option<ContainerRc> {
        let file = if file_id == 0 {
            file.clone()
        } else {
            let index = usize::try_from(file_id.checked_sub(1)?).ok()?;
            self.catalog.resolve_dependency(file, index)?
        };

        let id = RecordId::for_file(&file, path_id);
        let cont = self.records.get(&id)?.value().clone();

        if only_identity || cont.has_value() {
            return Some(cont);
        }

        let template = self.template_for(&cont, true);
        let data = match cont.read_data() {
            Ok(data) => data,
            Err(error) => {
                warn!(%error, id = %id, "record byte range unreadable");
                return None;
            }
        };
        match ValueField::materialize(&template, data) {
            Ok(value) => Some(Arc::new(cont.with_value(Arc::new(value)))),
            Err(error) => {
                warn!(%error, id = %id, "record failed to materialize");
                None
            }
        }
    }

    /// Resolves a record container through an already-materialized pointer field (its
    /// `m_FileID` / `m_PathID` sub-fields).
    #[must_use]
    pub fn container_from_pointer(
        &self,
        file: &FileInstanceRc,
        pointer: &ValueField,
        only_identity: bool,
    ) -> Option<ContainerRc> {
        let (file_id, path_id) = pointer.as_pointer()?;
        self.container(file, file_id, path_id, only_identity)
    }

    /// The materialized value tree for a container: its own when present, otherwise the
    /// identity is re-resolved with materialization. `None` when the identity can no
    /// longer be resolved.
    #[must_use]
    pub fn base_field(&self, cont: &RecordContainer) -> Option<Arc<ValueField>> {
        if let Some(value) = cont.value() {
            return Some(value.clone());
        }

        let resolved = self.container(cont.file(), 0, cont.path_id(), false)?;
        resolved.value().cloned()
    }

    /// The materialized value tree for (declaring file, dependency index, path id).
    #[must_use]
    pub fn base_field_at(&self, file: &FileInstanceRc, file_id: i32, path_id: i64) -> Option<Arc<ValueField>> {
        self.container(file, file_id, path_id, false)
            .and_then(|cont| cont.value().cloned())
    }

    /// The materialized value tree behind a pointer field.
    #[must_use]
    pub fn base_field_from_pointer(
        &self,
        file: &FileInstanceRc,
        pointer: &ValueField,
    ) -> Option<Arc<ValueField>> {
        self.container_from_pointer(file, pointer, false)
            .and_then(|cont| cont.value().cloned())
    }

    /// The value tree of a script record materialized against its composed layout,
    /// forcing reflected extraction through `managed_dir` — for callers that already know
    /// script deserialization is wanted and where the assemblies live.
    #[must_use]
    pub fn script_base_field(&self, cont: &RecordContainer, managed_dir: &Path) -> Option<Arc<ValueField>> {
        let template = self.script_template(cont, managed_dir);
        let data = cont.read_data().ok()?;
        ValueField::materialize(&template, data).ok().map(Arc::new)
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("files", &self.catalog.len())
            .field("records", &self.records.len())
            .field("staged", &self.overlay.staged_count())
            .field("modified", &self.is_modified())
            .field("from_bundle", &self.from_bundle)
            .finish()
    }
}

/// Builder for [`Workspace`], in the loader style: inject collaborators, queue initial
/// files, build.
///
/// # Examples
///
/// ```rust,ignore
/// let workspace = Workspace::builder()
///     .class_database(class_db)
///     .script_provider(provider)
///     .from_bundle(true)
///     .with_file(instance)
///     .build()?;
/// ```
#[derive(Default)]
pub struct WorkspaceBuilder {
    class_db: Option<Arc<ClassDatabase>>,
    script_provider: Option<Arc<dyn ScriptTemplateProvider>>,
    from_bundle: bool,
    files: Vec<FileInstance>,
}

impl WorkspaceBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        WorkspaceBuilder::default()
    }

    /// Sets the global class database (required).
    #[must_use]
    pub fn class_database(mut self, db: Arc<ClassDatabase>) -> Self {
        self.class_db = Some(db);
        self
    }

    /// Sets the reflection collaborator for script-defined record types.
    #[must_use]
    pub fn script_provider(mut self, provider: Arc<dyn ScriptTemplateProvider>) -> Self {
        self.script_provider = Some(provider);
        self
    }

    /// Marks the workspace as opened from an archive.
    #[must_use]
    pub fn from_bundle(mut self, from_bundle: bool) -> Self {
        self.from_bundle = from_bundle;
        self
    }

    /// Queues a file to load during [`WorkspaceBuilder::build`], in call order.
    #[must_use]
    pub fn with_file(mut self, instance: FileInstance) -> Self {
        self.files.push(instance);
        self
    }

    /// Builds the workspace and loads the queued files.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] when no class database was set or a queued
    /// file is a duplicate load.
    pub fn build(self) -> Result<Workspace> {
        let class_db = self
            .class_db
            .ok_or_else(|| Error::Configuration("a class database is required to build a workspace".to_string()))?;

        let mut workspace = Workspace::new(class_db);
        workspace.script_provider = self.script_provider;
        workspace.from_bundle = self.from_bundle;

        for instance in self.files {
            workspace.load_file(instance)?;
        }
        Ok(workspace)
    }
}

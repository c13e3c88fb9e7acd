//! The edit overlay: staged mutations layered over immutable source data.
//!
//! The overlay is the workspace's mutation log. It holds, per record identity, at most
//! one staged entry — a replacement (with its preview buffer) or a removal marker — plus
//! the per-file masks of changes that are not expressible as a single record edit, and
//! the derived workspace-modified flag.
//!
//! The overlay stores state only; the orchestration (retract-before-stage, container
//! installation, observer notification, source-container restore) lives in
//! [`crate::workspace::Workspace`], which is the sole mutator of this structure.

use std::sync::atomic::{AtomicBool, Ordering};

use bitflags::bitflags;
use dashmap::{DashMap, DashSet};

use crate::{
    file::Memory,
    workspace::{RecordId, ReplacerRc},
};
use std::sync::Arc;

bitflags! {
    /// Per-file change categories not expressible as a single record edit.
    ///
    /// An absent mask means "no such changes"; a present mask is always non-zero —
    /// entries that reach zero are pruned immediately.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChangeFlags: u32 {
        /// The declared dependency list changed
        const DEPENDENCIES = 1 << 0;
        /// Header or version metadata changed
        const METADATA = 1 << 1;
        /// Records were reordered without content changes
        const ORDER = 1 << 2;
    }
}

/// One staged overlay entry: the producing replacer and its preview buffer.
///
/// Removal markers carry a (typically empty) preview too, so that retraction handles both
/// kinds uniformly.
pub struct StagedEdit {
    /// The replacer that produced this entry
    pub replacer: ReplacerRc,
    /// Preview bytes; overlay containers read through this same buffer
    pub preview: Arc<Memory>,
}

/// Staged replacements, removal markers, per-file change masks and the derived
/// workspace-modified flag.
#[derive(Default)]
pub struct EditOverlay {
    staged: DashMap<RecordId, StagedEdit>,
    removed: DashSet<RecordId>,
    other_changes: DashMap<String, ChangeFlags>,
    modified: AtomicBool,
}

impl EditOverlay {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        EditOverlay::default()
    }

    /// Whether any staged entry or non-zero change mask exists.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::Acquire)
    }

    pub(crate) fn set_modified(&self, value: bool) {
        self.modified.store(value, Ordering::Release);
    }

    /// The number of staged entries (replacements and removal markers).
    #[must_use]
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    /// Whether an entry is staged for `id`.
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.staged.contains_key(id)
    }

    /// The preview buffer staged for `id`, when one exists.
    #[must_use]
    pub fn preview_for(&self, id: &RecordId) -> Option<Arc<Memory>> {
        self.staged.get(id).map(|entry| entry.preview.clone())
    }

    /// The replacer staged for `id`, when one exists.
    #[must_use]
    pub fn staged_replacer(&self, id: &RecordId) -> Option<ReplacerRc> {
        self.staged.get(id).map(|entry| entry.replacer.clone())
    }

    /// Whether `id` is marked for removal.
    #[must_use]
    pub fn is_removed(&self, id: &RecordId) -> bool {
        self.removed.contains(id)
    }

    /// The identities of all staged entries.
    #[must_use]
    pub fn staged_ids(&self) -> Vec<RecordId> {
        self.staged.iter().map(|entry| entry.key().clone()).collect()
    }

    /// The current change mask for a file key, when non-zero.
    #[must_use]
    pub fn flags_for(&self, file_key: &str) -> Option<ChangeFlags> {
        self.other_changes.get(file_key).map(|entry| *entry.value())
    }

    /// The file keys carrying non-zero change masks.
    #[must_use]
    pub fn flagged_files(&self) -> Vec<String> {
        self.other_changes.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Whether any file carries a non-zero change mask.
    #[must_use]
    pub fn any_other_changes(&self) -> bool {
        !self.other_changes.is_empty()
    }

    pub(crate) fn insert_staged(&self, id: RecordId, edit: StagedEdit) -> Option<StagedEdit> {
        self.staged.insert(id, edit)
    }

    pub(crate) fn remove_staged(&self, id: &RecordId) -> Option<StagedEdit> {
        self.staged.remove(id).map(|(_, edit)| edit)
    }

    pub(crate) fn mark_removed(&self, id: RecordId) {
        self.removed.insert(id);
    }

    pub(crate) fn unmark_removed(&self, id: &RecordId) {
        self.removed.remove(id);
    }

    pub(crate) fn or_flags(&self, file_key: &str, flags: ChangeFlags) {
        if flags.is_empty() {
            return;
        }

        self.other_changes
            .entry(file_key.to_string())
            .and_modify(|mask| *mask |= flags)
            .or_insert(flags);
        self.set_modified(true);
    }

    pub(crate) fn clear_flags(&self, file_key: &str, flags: ChangeFlags) {
        if let Some(mut entry) = self.other_changes.get_mut(file_key) {
            *entry.value_mut() -= flags;
            let now_empty = entry.value().is_empty();
            drop(entry);

            // zero-valued entries are pruned, never left behind
            if now_empty {
                self.other_changes.remove(file_key);
            }
        }

        if self.staged.is_empty() && !self.any_other_changes() {
            self.set_modified(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{schema::SCRIPT_INDEX_NONE, workspace::RecordUpdater};

    fn edit(path_id: i64) -> StagedEdit {
        StagedEdit {
            replacer: Arc::new(RecordUpdater::from_bytes(path_id, 4, SCRIPT_INDEX_NONE, vec![1])),
            preview: Arc::new(Memory::new(vec![1])),
        }
    }

    #[test]
    fn test_staged_entry_roundtrip() {
        let overlay = EditOverlay::new();
        let id = RecordId::new("level0", 5);

        assert!(!overlay.contains(&id));
        assert!(overlay.insert_staged(id.clone(), edit(5)).is_none());
        assert!(overlay.contains(&id));
        assert_eq!(overlay.staged_count(), 1);
        assert!(overlay.preview_for(&id).is_some());

        let removed = overlay.remove_staged(&id).unwrap();
        assert_eq!(removed.replacer.path_id(), 5);
        assert!(!overlay.contains(&id));
    }

    #[test]
    fn test_insert_returns_superseded_entry() {
        let overlay = EditOverlay::new();
        let id = RecordId::new("level0", 5);

        overlay.insert_staged(id.clone(), edit(5));
        let old = overlay.insert_staged(id.clone(), edit(5)).unwrap();
        assert_eq!(old.replacer.path_id(), 5);
        assert_eq!(overlay.staged_count(), 1);
    }

    #[test]
    fn test_removal_marker_set() {
        let overlay = EditOverlay::new();
        let id = RecordId::new("level0", 5);

        overlay.mark_removed(id.clone());
        assert!(overlay.is_removed(&id));
        overlay.unmark_removed(&id);
        assert!(!overlay.is_removed(&id));
    }

    #[test]
    fn test_flag_accumulation_and_pruning() {
        let overlay = EditOverlay::new();

        overlay.or_flags("level0", ChangeFlags::DEPENDENCIES);
        overlay.or_flags("level0", ChangeFlags::METADATA);
        assert_eq!(
            overlay.flags_for("level0"),
            Some(ChangeFlags::DEPENDENCIES | ChangeFlags::METADATA)
        );
        assert!(overlay.is_modified());

        overlay.clear_flags("level0", ChangeFlags::DEPENDENCIES);
        assert_eq!(overlay.flags_for("level0"), Some(ChangeFlags::METADATA));

        overlay.clear_flags("level0", ChangeFlags::METADATA);
        // pruned, not left as a zero entry
        assert_eq!(overlay.flags_for("level0"), None);
        assert!(overlay.flagged_files().is_empty());
        assert!(!overlay.is_modified());
    }

    #[test]
    fn test_or_with_empty_mask_is_noop() {
        let overlay = EditOverlay::new();
        overlay.or_flags("level0", ChangeFlags::empty());

        assert_eq!(overlay.flags_for("level0"), None);
        assert!(!overlay.is_modified());
    }

    #[test]
    fn test_clear_on_unknown_file_is_noop() {
        let overlay = EditOverlay::new();
        overlay.clear_flags("level0", ChangeFlags::DEPENDENCIES);
        assert_eq!(overlay.flags_for("level0"), None);
    }
}

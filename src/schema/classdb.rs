//! Workspace-wide fallback class database.
//!
//! The global class database is the tier-2 schema source: a type-identifier → field-layout
//! table loaded once per workspace lifetime by an external collaborator and injected at
//! construction. Lookups key on a *normalized* identifier — a handful of legacy editor-side
//! type identifiers alias runtime types and are fixed up before the lookup
//! ([`normalize_class_id`]).

use std::collections::HashMap;

use strum::{Display, EnumIter, FromRepr};

use crate::schema::TemplateField;

/// Well-known type identifiers this layer needs to recognize by name.
///
/// Not a complete registry — only the identifiers the workspace machinery itself branches
/// on (script records, script sources, the legacy audio aliases) plus a few common types
/// that keep fixtures and diagnostics readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, FromRepr)]
#[repr(i32)]
pub enum WellKnownClass {
    /// Scene object
    GameObject = 1,
    /// Transform component
    Transform = 4,
    /// Audio clip resource
    AudioClip = 83,
    /// Script-attached behavior; the record kind eligible for reflected schema extraction
    MonoBehaviour = 114,
    /// Script reference record holding class name, namespace and assembly name
    MonoScript = 115,
    /// Texture resource
    Texture2D = 28,
    /// Audio mixer runtime type
    AudioMixer = 240,
    /// Legacy editor-side alias of [`WellKnownClass::AudioMixer`]
    AudioMixerController = 241,
    /// Legacy editor-side alias of [`WellKnownClass::AudioMixerGroup`]
    AudioMixerGroupController = 243,
    /// Legacy editor-side alias of [`WellKnownClass::AudioMixerSnapshot`]
    AudioMixerSnapshotController = 245,
    /// Audio mixer snapshot runtime type
    AudioMixerSnapshot = 272,
    /// Audio mixer group runtime type
    AudioMixerGroup = 273,
}

impl WellKnownClass {
    /// The raw type identifier.
    #[must_use]
    pub fn id(self) -> i32 {
        self as i32
    }
}

/// Maps legacy/aliased type identifiers onto their canonical identifier.
///
/// Editor builds historically serialized the audio-mixer family under controller-side
/// identifiers that the class database only knows by their runtime identifiers. Applied
/// before every tier-2 lookup; identity for everything else.
#[must_use]
pub fn normalize_class_id(class_id: i32) -> i32 {
    match WellKnownClass::from_repr(class_id) {
        Some(WellKnownClass::AudioMixerController) => WellKnownClass::AudioMixer.id(),
        Some(WellKnownClass::AudioMixerGroupController) => WellKnownClass::AudioMixerGroup.id(),
        Some(WellKnownClass::AudioMixerSnapshotController) => WellKnownClass::AudioMixerSnapshot.id(),
        _ => class_id,
    }
}

/// One class database entry: a named type with its field layout.
#[derive(Debug, Clone)]
pub struct ClassDbEntry {
    /// Canonical type identifier
    pub class_id: i32,
    /// Type name, e.g. `Transform`
    pub name: String,
    /// Field layout for records of this type
    pub root: TemplateField,
}

impl ClassDbEntry {
    /// Creates an entry from its identifier, name and layout.
    #[must_use]
    pub fn new(class_id: i32, name: impl Into<String>, root: TemplateField) -> Self {
        ClassDbEntry {
            class_id,
            name: name.into(),
            root,
        }
    }
}

/// The global type-identifier → field-layout table.
///
/// Loaded once per workspace lifetime. An absent entry is not an error — schema
/// resolution degrades to a minimal empty layout when no source can produce one.
#[derive(Debug, Default)]
pub struct ClassDatabase {
    by_id: HashMap<i32, ClassDbEntry>,
}

impl ClassDatabase {
    /// Creates an empty database. Every lookup will decline, which exercises the
    /// degraded-layout path end to end.
    #[must_use]
    pub fn empty() -> Self {
        ClassDatabase::default()
    }

    /// Creates a database from its entries. Later duplicates replace earlier ones.
    #[must_use]
    pub fn new(entries: Vec<ClassDbEntry>) -> Self {
        let by_id = entries.into_iter().map(|e| (e.class_id, e)).collect();
        ClassDatabase { by_id }
    }

    /// Looks up an entry by canonical type identifier. Callers normalize legacy aliases
    /// through [`normalize_class_id`] first.
    #[must_use]
    pub fn find(&self, class_id: i32) -> Option<&ClassDbEntry> {
        self.by_id.get(&class_id)
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the database holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

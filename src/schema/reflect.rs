//! Reflection collaborator boundary for script-defined record schemas.
//!
//! Script-defined record subtypes carry fields declared in compiled script assemblies, not
//! in any stored schema table. The workspace locates the script's assembly and identity,
//! then delegates the actual metadata walk to an implementation of
//! [`ScriptTemplateProvider`] — the reflection algorithm itself is outside this crate.

use std::path::Path;

use crate::{file::EngineVersion, schema::TemplateField, Result};

/// The identity of a script class, read out of a materialized script reference record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef {
    /// Declared class name, e.g. `PlayerController`
    pub class_name: String,
    /// Declaring namespace; may be empty
    pub namespace: String,
    /// File name of the assembly declaring the class, e.g. `Assembly-CSharp.dll`
    pub assembly_name: String,
}

impl ScriptRef {
    /// Creates a script identity from its components.
    #[must_use]
    pub fn new(
        class_name: impl Into<String>,
        namespace: impl Into<String>,
        assembly_name: impl Into<String>,
    ) -> Self {
        ScriptRef {
            class_name: class_name.into(),
            namespace: namespace.into(),
            assembly_name: assembly_name.into(),
        }
    }

    /// The namespace-qualified class name.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}.{}", self.namespace, self.class_name)
        }
    }
}

/// Collaborator that synthesizes a field layout from compiled script metadata.
///
/// Given the assembly on disk, the script identity and the declaring file's engine
/// version, an implementation returns `base` extended with the script-declared fields.
/// The workspace composes the call but never caches its result — repeated reflection is a
/// known cost center a caller may cache externally, keyed by assembly, class and version.
pub trait ScriptTemplateProvider: Send + Sync {
    /// Extends `base` with the fields declared by `script` in the assembly at
    /// `assembly_path`.
    ///
    /// # Errors
    ///
    /// Implementations report unreadable assemblies or unresolvable classes as
    /// [`crate::Error::Error`]; the workspace degrades those to the tier-2 layout.
    fn extend_template(
        &self,
        base: &TemplateField,
        assembly_path: &Path,
        script: &ScriptRef,
        version: &EngineVersion,
    ) -> Result<TemplateField>;
}

//! Field-layout templates.
//!
//! A [`TemplateField`] tree describes how one record type's bytes are laid out: which
//! fields exist, in which order, with which primitive kinds, where counted arrays and
//! length-prefixed strings sit, and which fields are followed by 4-byte alignment. All
//! three schema sources produce this one artifact, so the materializer never knows where
//! a layout came from.

/// Primitive kind of one template field.
///
/// `None` marks a structural field whose value is carried entirely by its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Structural field; children carry the data
    None,
    /// 1-byte boolean
    Bool,
    /// Signed 8-bit integer
    I8,
    /// Unsigned 8-bit integer
    U8,
    /// Signed 16-bit integer
    I16,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 64-bit integer
    I64,
    /// Unsigned 64-bit integer
    U64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
    /// Length-prefixed UTF-8 string
    String,
}

/// One node of a field-layout tree.
///
/// Arrays are modeled as a field with `is_array = true` whose single child is the element
/// template; the serialized form is a little-endian `i32` count followed by that many
/// elements. Strings and arrays align the read cursor to 4 bytes afterwards, matching the
/// engine's serializer.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateField {
    /// Field name, e.g. `m_Name`
    pub name: String,
    /// Declared type name, e.g. `string` or `PPtr<MonoScript>`
    pub type_name: String,
    /// Primitive kind of this field's own value
    pub kind: FieldKind,
    /// Whether this field is a counted array of its child template
    pub is_array: bool,
    /// Whether the cursor aligns to 4 bytes after this field
    pub align_after: bool,
    /// Child field templates, in serialization order
    pub children: Vec<TemplateField>,
}

impl TemplateField {
    /// Creates a primitive field.
    #[must_use]
    pub fn primitive(name: impl Into<String>, type_name: impl Into<String>, kind: FieldKind) -> Self {
        TemplateField {
            name: name.into(),
            type_name: type_name.into(),
            kind,
            is_array: false,
            align_after: false,
            children: Vec::new(),
        }
    }

    /// Creates a structural field from its children.
    #[must_use]
    pub fn object(
        name: impl Into<String>,
        type_name: impl Into<String>,
        children: Vec<TemplateField>,
    ) -> Self {
        TemplateField {
            name: name.into(),
            type_name: type_name.into(),
            kind: FieldKind::None,
            is_array: false,
            align_after: false,
            children,
        }
    }

    /// Creates a length-prefixed string field. Strings align after their payload.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        TemplateField {
            name: name.into(),
            type_name: "string".into(),
            kind: FieldKind::String,
            is_array: false,
            align_after: true,
            children: Vec::new(),
        }
    }

    /// Creates a counted array field over `element`. Arrays align after their payload.
    #[must_use]
    pub fn array(name: impl Into<String>, type_name: impl Into<String>, element: TemplateField) -> Self {
        TemplateField {
            name: name.into(),
            type_name: type_name.into(),
            kind: FieldKind::None,
            is_array: true,
            align_after: true,
            children: vec![element],
        }
    }

    /// Creates a record-pointer field: the `m_FileID` / `m_PathID` pair that references a
    /// record in this file (`m_FileID = 0`) or in a declared dependency (1-based index).
    #[must_use]
    pub fn pointer(name: impl Into<String>, target: &str) -> Self {
        TemplateField::object(
            name,
            format!("PPtr<{target}>"),
            vec![
                TemplateField::primitive("m_FileID", "int", FieldKind::I32),
                TemplateField::primitive("m_PathID", "SInt64", FieldKind::I64),
            ],
        )
    }

    /// Marks this field as aligning the cursor to 4 bytes after its value.
    #[must_use]
    pub fn with_align(mut self) -> Self {
        self.align_after = true;
        self
    }

    /// Finds a direct child by field name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&TemplateField> {
        self.children.iter().find(|c| c.name == name)
    }

    /// The element template of an array field.
    #[must_use]
    pub fn element(&self) -> Option<&TemplateField> {
        if self.is_array {
            self.children.first()
        } else {
            None
        }
    }

    /// Appends `extra` fields after this template's own children, preserving everything
    /// else. This is how a reflected script layout extends its tier-2 base layout.
    #[must_use]
    pub fn extended_with(&self, extra: Vec<TemplateField>) -> Self {
        let mut composed = self.clone();
        composed.children.extend(extra);
        composed
    }
}

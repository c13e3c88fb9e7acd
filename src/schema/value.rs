//! Typed value trees materialized from record bytes.
//!
//! A [`ValueField`] tree is the fully typed form of one record: the result of walking a
//! [`crate::schema::TemplateField`] layout over the record's byte range. Materialization
//! is strict — a declared length that exceeds the remaining record bytes is a malformed
//! record, not a truncated value. The inverse direction, [`ValueField::to_bytes`], is the
//! default serialization path for staged-edit preview buffers.

use crate::{
    file::io::{read_le_at, write_le_at},
    schema::{FieldKind, TemplateField},
    Result,
};

/// The typed value carried by one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Structural field; the children carry the data
    None,
    /// Counted array; the children are the elements
    Array,
    /// Boolean
    Bool(bool),
    /// Signed 8-bit integer
    I8(i8),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Signed 16-bit integer
    I16(i16),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Signed 32-bit integer
    I32(i32),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 64-bit integer
    I64(i64),
    /// Unsigned 64-bit integer
    U64(u64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// UTF-8 string
    Str(String),
}

/// One node of a materialized value tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueField {
    /// Field name from the template
    pub name: String,
    /// Declared type name from the template
    pub type_name: String,
    value: FieldValue,
    align_after: bool,
    children: Vec<ValueField>,
}

fn align4(offset: &mut usize) {
    *offset = (*offset + 3) & !3;
}

fn read_field(template: &TemplateField, data: &[u8], offset: &mut usize) -> Result<ValueField> {
    if template.is_array {
        let element = template
            .element()
            .ok_or_else(|| malformed_error!("array field '{}' has no element template", template.name))?;

        let count: i32 = read_le_at(data, offset)?;
        if count < 0 {
            return Err(malformed_error!(
                "array field '{}' declares negative count {}",
                template.name,
                count
            ));
        }

        let mut children = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            children.push(read_field(element, data, offset)?);
        }

        if template.align_after {
            align4(offset);
        }

        return Ok(ValueField {
            name: template.name.clone(),
            type_name: template.type_name.clone(),
            value: FieldValue::Array,
            align_after: template.align_after,
            children,
        });
    }

    let (value, children) = match template.kind {
        FieldKind::None => {
            let mut children = Vec::with_capacity(template.children.len());
            for child in &template.children {
                children.push(read_field(child, data, offset)?);
            }
            (FieldValue::None, children)
        }
        FieldKind::Bool => (FieldValue::Bool(read_le_at::<u8>(data, offset)? != 0), Vec::new()),
        FieldKind::I8 => (FieldValue::I8(read_le_at(data, offset)?), Vec::new()),
        FieldKind::U8 => (FieldValue::U8(read_le_at(data, offset)?), Vec::new()),
        FieldKind::I16 => (FieldValue::I16(read_le_at(data, offset)?), Vec::new()),
        FieldKind::U16 => (FieldValue::U16(read_le_at(data, offset)?), Vec::new()),
        FieldKind::I32 => (FieldValue::I32(read_le_at(data, offset)?), Vec::new()),
        FieldKind::U32 => (FieldValue::U32(read_le_at(data, offset)?), Vec::new()),
        FieldKind::I64 => (FieldValue::I64(read_le_at(data, offset)?), Vec::new()),
        FieldKind::U64 => (FieldValue::U64(read_le_at(data, offset)?), Vec::new()),
        FieldKind::F32 => (FieldValue::F32(read_le_at(data, offset)?), Vec::new()),
        FieldKind::F64 => (FieldValue::F64(read_le_at(data, offset)?), Vec::new()),
        FieldKind::String => {
            let len: i32 = read_le_at(data, offset)?;
            if len < 0 {
                return Err(malformed_error!(
                    "string field '{}' declares negative length {}",
                    template.name,
                    len
                ));
            }

            let len = len as usize;
            let end = offset.checked_add(len).ok_or(crate::Error::OutOfBounds)?;
            if end > data.len() {
                return Err(malformed_error!(
                    "string field '{}' overruns record data ({} bytes past end)",
                    template.name,
                    end - data.len()
                ));
            }

            let text = String::from_utf8_lossy(&data[*offset..end]).into_owned();
            *offset = end;
            (FieldValue::Str(text), Vec::new())
        }
    };

    if template.align_after {
        align4(offset);
    }

    Ok(ValueField {
        name: template.name.clone(),
        type_name: template.type_name.clone(),
        value,
        align_after: template.align_after,
        children,
    })
}

fn write_field(field: &ValueField, buf: &mut Vec<u8>, offset: &mut usize) -> Result<()> {
    match &field.value {
        FieldValue::None => {
            for child in &field.children {
                write_field(child, buf, offset)?;
            }
        }
        FieldValue::Array => {
            let count = i32::try_from(field.children.len())
                .map_err(|_| malformed_error!("array field '{}' exceeds i32 count", field.name))?;
            write_le_at(buf, offset, count)?;
            for child in &field.children {
                write_field(child, buf, offset)?;
            }
        }
        FieldValue::Bool(v) => write_le_at(buf, offset, u8::from(*v))?,
        FieldValue::I8(v) => write_le_at(buf, offset, *v)?,
        FieldValue::U8(v) => write_le_at(buf, offset, *v)?,
        FieldValue::I16(v) => write_le_at(buf, offset, *v)?,
        FieldValue::U16(v) => write_le_at(buf, offset, *v)?,
        FieldValue::I32(v) => write_le_at(buf, offset, *v)?,
        FieldValue::U32(v) => write_le_at(buf, offset, *v)?,
        FieldValue::I64(v) => write_le_at(buf, offset, *v)?,
        FieldValue::U64(v) => write_le_at(buf, offset, *v)?,
        FieldValue::F32(v) => write_le_at(buf, offset, *v)?,
        FieldValue::F64(v) => write_le_at(buf, offset, *v)?,
        FieldValue::Str(text) => {
            let len = i32::try_from(text.len())
                .map_err(|_| malformed_error!("string field '{}' exceeds i32 length", field.name))?;
            write_le_at(buf, offset, len)?;
            buf.extend_from_slice(text.as_bytes());
            *offset += text.len();
        }
    }

    if field.align_after {
        let aligned = (*offset + 3) & !3;
        if buf.len() < aligned {
            buf.resize(aligned, 0);
        }
        *offset = aligned;
    }

    Ok(())
}

impl ValueField {
    /// Materializes a value tree by walking `template` over `data`.
    ///
    /// `data` is exactly the record's byte range; alignment is computed relative to its
    /// start, matching how the engine aligns record payloads.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] when a declared string/array length is
    /// inconsistent with the record bytes, and [`crate::Error::OutOfBounds`] when a
    /// primitive read would overrun them.
    pub fn materialize(template: &TemplateField, data: &[u8]) -> Result<ValueField> {
        let mut offset = 0;
        read_field(template, data, &mut offset)
    }

    /// Serializes this value tree back to bytes — the default preview path for staged
    /// replacements.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] when a string or array exceeds the
    /// serializable `i32` length range.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut offset = 0;
        write_field(self, &mut buf, &mut offset)?;
        Ok(buf)
    }

    /// Constructs a value node directly; used by callers assembling replacement records.
    #[must_use]
    pub fn from_parts(
        name: impl Into<String>,
        type_name: impl Into<String>,
        value: FieldValue,
        children: Vec<ValueField>,
    ) -> Self {
        ValueField {
            name: name.into(),
            type_name: type_name.into(),
            value,
            align_after: false,
            children,
        }
    }

    /// The typed value of this field.
    #[must_use]
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Replaces this field's value; the edit workflow mutates a materialized tree and
    /// serializes it back through [`ValueField::to_bytes`].
    pub fn set(&mut self, value: FieldValue) {
        self.value = value;
    }

    /// Child fields, in serialization order. For arrays these are the elements.
    #[must_use]
    pub fn children(&self) -> &[ValueField] {
        &self.children
    }

    /// Finds a direct child by field name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ValueField> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Finds a direct child by field name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ValueField> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// The value as a bool, when it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            FieldValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// The value widened to `i64`, for any integer kind.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            FieldValue::I8(v) => Some(i64::from(v)),
            FieldValue::U8(v) => Some(i64::from(v)),
            FieldValue::I16(v) => Some(i64::from(v)),
            FieldValue::U16(v) => Some(i64::from(v)),
            FieldValue::I32(v) => Some(i64::from(v)),
            FieldValue::U32(v) => Some(i64::from(v)),
            FieldValue::I64(v) => Some(v),
            FieldValue::U64(v) => i64::try_from(v).ok(),
            FieldValue::Bool(v) => Some(i64::from(v)),
            _ => None,
        }
    }

    /// The value narrowed to `i32`, for any integer kind that fits.
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    /// The value as an `f64`, for float kinds.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            FieldValue::F32(v) => Some(f64::from(v)),
            FieldValue::F64(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a string slice, when it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Reads this field as a record pointer: the `(m_FileID, m_PathID)` pair.
    #[must_use]
    pub fn as_pointer(&self) -> Option<(i32, i64)> {
        let file_id = self.get("m_FileID")?.as_i32()?;
        let path_id = self.get("m_PathID")?.as_i64()?;
        Some((file_id, path_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TemplateField;

    fn transform_template() -> TemplateField {
        TemplateField::object(
            "Base",
            "Transform",
            vec![
                TemplateField::pointer("m_GameObject", "GameObject"),
                TemplateField::object(
                    "m_LocalPosition",
                    "Vector3f",
                    vec![
                        TemplateField::primitive("x", "float", FieldKind::F32),
                        TemplateField::primitive("y", "float", FieldKind::F32),
                        TemplateField::primitive("z", "float", FieldKind::F32),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn test_materialize_nested_object() {
        let mut data = Vec::new();
        data.extend_from_slice(&0i32.to_le_bytes()); // m_FileID
        data.extend_from_slice(&7i64.to_le_bytes()); // m_PathID
        data.extend_from_slice(&1.0f32.to_le_bytes());
        data.extend_from_slice(&2.0f32.to_le_bytes());
        data.extend_from_slice(&3.0f32.to_le_bytes());

        let value = ValueField::materialize(&transform_template(), &data).unwrap();
        assert_eq!(value.get("m_GameObject").unwrap().as_pointer(), Some((0, 7)));

        let position = value.get("m_LocalPosition").unwrap();
        assert_eq!(position.get("y").unwrap().as_f64(), Some(2.0));
    }

    #[test]
    fn test_materialize_string_with_alignment() {
        let template = TemplateField::object(
            "Base",
            "Named",
            vec![
                TemplateField::string("m_Name"),
                TemplateField::primitive("m_Tag", "UInt32", FieldKind::U32),
            ],
        );

        let mut data = Vec::new();
        data.extend_from_slice(&5i32.to_le_bytes());
        data.extend_from_slice(b"hello");
        data.extend_from_slice(&[0, 0, 0]); // pad to 4
        data.extend_from_slice(&0xAABBu32.to_le_bytes());

        let value = ValueField::materialize(&template, &data).unwrap();
        assert_eq!(value.get("m_Name").unwrap().as_str(), Some("hello"));
        assert_eq!(value.get("m_Tag").unwrap().as_i64(), Some(0xAABB));
    }

    #[test]
    fn test_materialize_array() {
        let template = TemplateField::array(
            "m_Indices",
            "vector",
            TemplateField::primitive("data", "UInt16", FieldKind::U16),
        );

        let mut data = Vec::new();
        data.extend_from_slice(&3i32.to_le_bytes());
        for v in [10u16, 20, 30] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&[0, 0]); // pad to 4

        let value = ValueField::materialize(&template, &data).unwrap();
        assert_eq!(value.children().len(), 3);
        assert_eq!(value.children()[2].as_i64(), Some(30));
    }

    #[test]
    fn test_materialize_rejects_overrun_string() {
        let template = TemplateField::string("m_Name");
        let mut data = Vec::new();
        data.extend_from_slice(&100i32.to_le_bytes());
        data.extend_from_slice(b"short");

        assert!(matches!(
            ValueField::materialize(&template, &data),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_materialize_rejects_negative_count() {
        let template = TemplateField::array(
            "m_Data",
            "vector",
            TemplateField::primitive("data", "UInt8", FieldKind::U8),
        );
        let data = (-1i32).to_le_bytes();

        assert!(matches!(
            ValueField::materialize(&template, &data),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_serialize_matches_materialized_form() {
        let template = TemplateField::object(
            "Base",
            "Named",
            vec![
                TemplateField::string("m_Name"),
                TemplateField::primitive("m_Enabled", "bool", FieldKind::Bool).with_align(),
                TemplateField::primitive("m_Order", "int", FieldKind::I32),
            ],
        );

        let mut data = Vec::new();
        data.extend_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(b"ab");
        data.extend_from_slice(&[0, 0]); // pad
        data.push(1);
        data.extend_from_slice(&[0, 0, 0]); // pad
        data.extend_from_slice(&42i32.to_le_bytes());

        let value = ValueField::materialize(&template, &data).unwrap();
        assert_eq!(value.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_set_and_reserialize() {
        let template = TemplateField::object(
            "Base",
            "Named",
            vec![TemplateField::string("m_Name"), TemplateField::primitive("m_Order", "int", FieldKind::I32)],
        );

        let mut data = Vec::new();
        data.extend_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(b"ab");
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&1i32.to_le_bytes());

        let mut value = ValueField::materialize(&template, &data).unwrap();
        value.get_mut("m_Order").unwrap().set(FieldValue::I32(9));

        let bytes = value.to_bytes().unwrap();
        let reread = ValueField::materialize(&template, &bytes).unwrap();
        assert_eq!(reread.get("m_Order").unwrap().as_i32(), Some(9));
        assert_eq!(reread.get("m_Name").unwrap().as_str(), Some("ab"));
    }
}

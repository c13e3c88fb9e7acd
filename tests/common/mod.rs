//! Shared builders for integration tests, using only the public API.
#![allow(dead_code)]

use std::sync::Arc;

use assetscope::prelude::*;

/// Installs the test log subscriber; `RUST_LOG=assetscope=trace` surfaces resolver and
/// catalog diagnostics while a test runs.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const GAMEOBJECT_PATH_ID: i64 = 1;
pub const TRANSFORM_PATH_ID: i64 = 5;
pub const BEHAVIOUR_PATH_ID: i64 = 10;
pub const SCRIPT_PATH_ID: i64 = 11;

pub fn engine_version() -> EngineVersion {
    "2019.4.31f1".parse().unwrap()
}

pub fn class_db() -> Arc<ClassDatabase> {
    Arc::new(ClassDatabase::new(vec![
        ClassDbEntry::new(
            WellKnownClass::GameObject.id(),
            "GameObject",
            TemplateField::object("Base", "GameObject", vec![TemplateField::string("m_Name")]),
        ),
        ClassDbEntry::new(
            WellKnownClass::Transform.id(),
            "Transform",
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
            ),
        ),
        ClassDbEntry::new(
            WellKnownClass::MonoBehaviour.id(),
            "MonoBehaviour",
            TemplateField::object(
                "Base",
                "MonoBehaviour",
                vec![
                    TemplateField::pointer("m_GameObject", "GameObject"),
                    TemplateField::primitive("m_Enabled", "UInt8", FieldKind::U8).with_align(),
                    TemplateField::pointer("m_Script", "MonoScript"),
                    TemplateField::string("m_Name"),
                ],
            ),
        ),
        ClassDbEntry::new(
            WellKnownClass::MonoScript.id(),
            "MonoScript",
            TemplateField::object(
                "Base",
                "MonoScript",
                vec![
                    TemplateField::string("m_ClassName"),
                    TemplateField::string("m_Namespace"),
                    TemplateField::string("m_AssemblyName"),
                ],
            ),
        ),
    ]))
}

pub fn string_bytes(text: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(text.len() as i32).to_le_bytes());
    bytes.extend_from_slice(text.as_bytes());
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes
}

pub fn pointer_bytes(file_id: i32, path_id: i64) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&file_id.to_le_bytes());
    bytes.extend_from_slice(&path_id.to_le_bytes());
    bytes
}

pub fn transform_bytes(gameobject_path: i64, position: [f32; 3]) -> Vec<u8> {
    let mut bytes = pointer_bytes(0, gameobject_path);
    for component in position {
        bytes.extend_from_slice(&component.to_le_bytes());
    }
    bytes
}

pub fn behaviour_bytes(script_file_id: i32, script_path: i64, extra: &[u8]) -> Vec<u8> {
    let mut bytes = pointer_bytes(0, GAMEOBJECT_PATH_ID);
    bytes.push(1); // m_Enabled
    bytes.extend_from_slice(&[0, 0, 0]); // align
    bytes.extend_from_slice(&pointer_bytes(script_file_id, script_path));
    bytes.extend_from_slice(&string_bytes("Behaviour"));
    bytes.extend_from_slice(extra);
    bytes
}

pub fn monoscript_bytes(class_name: &str, namespace: &str, assembly: &str) -> Vec<u8> {
    let mut bytes = string_bytes(class_name);
    bytes.extend_from_slice(&string_bytes(namespace));
    bytes.extend_from_slice(&string_bytes(assembly));
    bytes
}

/// Assembles a `FileInstance` from `(path_id, class_id, script_index, bytes)` tuples laid
/// out back to back.
pub fn build_file(
    path: &str,
    records: Vec<(i64, i32, u16, Vec<u8>)>,
    externals: Vec<ExternalRef>,
    type_tree: Option<TypeTreeDb>,
) -> FileInstance {
    let mut data = Vec::new();
    let mut infos = Vec::new();

    for (path_id, class_id, script_index, bytes) in records {
        infos.push(RecordInfo {
            path_id,
            offset: data.len() as u64,
            len: bytes.len() as u32,
            class_id,
            script_index,
        });
        data.extend_from_slice(&bytes);
    }

    FileInstance::new(
        path,
        SerializedFile::new(22, engine_version(), infos, externals, type_tree),
        Arc::new(Memory::new(data)),
    )
}

/// A container file with one GameObject (path 1) and one Transform (path 5).
pub fn level_file(path: &str) -> FileInstance {
    build_file(
        path,
        vec![
            (
                GAMEOBJECT_PATH_ID,
                WellKnownClass::GameObject.id(),
                SCRIPT_INDEX_NONE,
                string_bytes("Player"),
            ),
            (
                TRANSFORM_PATH_ID,
                WellKnownClass::Transform.id(),
                SCRIPT_INDEX_NONE,
                transform_bytes(GAMEOBJECT_PATH_ID, [1.0, 2.0, 3.0]),
            ),
        ],
        vec![],
        None,
    )
}

/// A reflection collaborator that appends one `i32` field named `<class>_field`.
pub struct AppendingProvider;

impl ScriptTemplateProvider for AppendingProvider {
    fn extend_template(
        &self,
        base: &TemplateField,
        _assembly_path: &std::path::Path,
        script: &ScriptRef,
        _version: &EngineVersion,
    ) -> Result<TemplateField> {
        Ok(base.extended_with(vec![TemplateField::primitive(
            format!("{}_field", script.class_name),
            "int",
            FieldKind::I32,
        )]))
    }
}

/// A reflection collaborator that fails the test if it is ever consulted.
pub struct PanickingProvider;

impl ScriptTemplateProvider for PanickingProvider {
    fn extend_template(
        &self,
        _base: &TemplateField,
        _assembly_path: &std::path::Path,
        _script: &ScriptRef,
        _version: &EngineVersion,
    ) -> Result<TemplateField> {
        panic!("reflection must not be attempted for already-known script types");
    }
}

/// Creates a unique scratch directory for tests that need real paths on disk.
pub fn scratch_dir(label: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "assetscope_{label}_{}_{}",
        std::process::id(),
        std::thread::current().name().unwrap_or("t").replace("::", "_")
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

//! Stable cross-file record identities.

use std::fmt;

use crate::file::FileInstance;

/// Uniquely names a record across all loaded container files.
///
/// An identity is the pair of the owning file's lowercased canonical path and the record's
/// 64-bit path identifier. The file-name component is normalized exactly once, at
/// construction — every map keyed by `RecordId` therefore gets case-insensitive file
/// matching without any per-lookup folding.
///
/// Ordering sorts by file name first, so all records of one file form a contiguous run in
/// an ordered index.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId {
    file: String,
    path_id: i64,
}

impl RecordId {
    /// Creates an identity from a file name and path identifier, normalizing the name.
    #[must_use]
    pub fn new(file: impl AsRef<str>, path_id: i64) -> Self {
        RecordId {
            file: file.as_ref().to_lowercase(),
            path_id,
        }
    }

    /// Creates an identity for a record in `file`, reusing the instance's pre-normalized
    /// key.
    #[must_use]
    pub fn for_file(file: &FileInstance, path_id: i64) -> Self {
        RecordId {
            file: file.key().to_string(),
            path_id,
        }
    }

    /// The normalized owning-file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file
    }

    /// The record's path identifier within its file.
    #[must_use]
    pub fn path_id(&self) -> i64 {
        self.path_id
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({}, path: {})", self.file, self.path_id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.path_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_equality_is_case_insensitive_on_file() {
        let a = RecordId::new("SharedAssets0.assets", 5);
        let b = RecordId::new("sharedassets0.ASSETS", 5);
        let c = RecordId::new("sharedassets0.assets", 6);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_path_id_is_exact() {
        let a = RecordId::new("level0", -3);
        assert_eq!(a.path_id(), -3);
        assert_ne!(a, RecordId::new("level0", 3));
    }

    #[test]
    fn test_ordering_groups_by_file() {
        let mut ids = vec![
            RecordId::new("b.assets", 1),
            RecordId::new("a.assets", 9),
            RecordId::new("a.assets", 2),
        ];
        ids.sort();

        assert_eq!(ids[0], RecordId::new("a.assets", 2));
        assert_eq!(ids[1], RecordId::new("a.assets", 9));
        assert_eq!(ids[2], RecordId::new("b.assets", 1));
    }

    #[test]
    fn test_hash_map_key() {
        let mut map = HashMap::new();
        map.insert(RecordId::new("Level0", 1), "camera");

        assert_eq!(map.get(&RecordId::new("level0", 1)), Some(&"camera"));
        assert_eq!(map.get(&RecordId::new("level1", 1)), None);
    }

    #[test]
    fn test_display() {
        let id = RecordId::new("Level0", 42);
        assert_eq!(id.to_string(), "level0:42");
        assert!(format!("{:?}", id).contains("path: 42"));
    }
}

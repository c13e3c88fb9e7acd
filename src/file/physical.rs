//! Physical file backend for memory-mapped I/O.
//!
//! Provides the [`crate::file::Physical`] backend implementing [`crate::file::DataSource`]
//! for container files on disk using memory-mapped I/O. Only the record ranges actually
//! materialized are paged in, which matters for multi-gigabyte resource files.

use std::{fs::File, path::Path};

use memmap2::Mmap;

use crate::{file::DataSource, Error::OutOfBounds, Result};

/// Memory-mapped data source for a container file on disk.
///
/// # Examples
///
/// ```rust,no_run
/// use assetscope::file::{DataSource, Physical};
/// use std::path::Path;
///
/// let source = Physical::new(Path::new("sharedassets0.assets"))?;
/// println!("File size: {} bytes", source.len());
/// # Ok::<(), assetscope::Error>(())
/// ```
pub struct Physical {
    map: Mmap,
}

impl Physical {
    /// Memory-map the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped, and
    /// [`crate::Error::Empty`] for zero-length files.
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(crate::Error::Empty);
        }

        // Safety: the mapping is read-only and the file is kept open for its duration
        let map = unsafe { Mmap::map(&file)? };
        Ok(Physical { map })
    }
}

impl DataSource for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = offset.checked_add(len).ok_or(OutOfBounds)?;
        if end > self.map.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.map[offset..end])
    }

    fn data(&self) -> &[u8] {
        &self.map
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_physical_missing_file() {
        assert!(Physical::new(Path::new("does_not_exist.assets")).is_err());
    }

    #[test]
    fn test_physical_maps_and_slices() {
        let mut tmp = std::env::temp_dir();
        tmp.push("assetscope_physical_test.bin");
        {
            let mut f = File::create(&tmp).unwrap();
            f.write_all(&[0x55, 0x4E, 0x49, 0x54, 0x59]).unwrap();
        }

        let source = Physical::new(&tmp).unwrap();
        assert_eq!(source.len(), 5);
        assert_eq!(source.data_slice(0, 5).unwrap(), b"UNITY");
        assert!(source.data_slice(4, 2).is_err());

        std::fs::remove_file(&tmp).ok();
    }
}

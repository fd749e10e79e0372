//! Memory-mapped BT files.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::binary::node::Document;
use crate::error::Result;

/// A read-only map of a whole file. Views borrow from it, so the map
/// outlives every `Document` created over it.
pub struct MappedFile {
    path: PathBuf,
    mmap: Mmap,
}

impl MappedFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // The file must not be truncated by another process while mapped.
        let mmap = unsafe { Mmap::map(&file) }?;
        tracing::debug!("mapped {} ({} bytes)", path.display(), mmap.len());
        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Validate the header and return a document over the map.
    pub fn document(&self) -> Result<Document<'_>> {
        Document::from_bytes(&self.mmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::arena::{SectionArena, WriteConfig};
    use crate::error::TreeError;
    use tempfile::TempDir;

    #[test]
    fn test_mapped_file_reads_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.bt");

        let mut arena = SectionArena::new();
        arena.root().unwrap().dict().put(3).unwrap().int64(-9);
        let bytes = arena.emit(&WriteConfig::default()).unwrap().bytes;
        std::fs::write(&path, &bytes).unwrap();

        let mapped = MappedFile::open(&path).unwrap();
        assert_eq!(mapped.bytes(), bytes.as_slice());
        assert_eq!(mapped.path(), path.as_path());
        let root = mapped.document().unwrap().root().unwrap();
        assert_eq!(root.as_dict().unwrap().get(3).unwrap().as_i64().unwrap(), -9);
    }

    #[test]
    fn test_mapped_file_missing() {
        let dir = TempDir::new().unwrap();
        let result = MappedFile::open(&dir.path().join("nope.bt"));
        assert!(matches!(result, Err(TreeError::Io(_))));
    }
}

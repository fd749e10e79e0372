//! Section records: the unit of allocation in the BT writer.
//!
//! A record is an append-only byte buffer plus a list of outgoing links.
//! Each link names a 4-byte slot inside the record that must receive the
//! final file offset of another record once both have been emitted.

use crate::binary::types::{FixedWidth, LINK_SIZE};

/// Handle of a record inside a `SectionArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub(crate) u32);

impl SectionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A deferred forward reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// Offset of the slot within the owning record.
    pub at: u32,
    /// Record whose final offset goes into the slot.
    pub target: SectionId,
}

#[derive(Debug, Default, Clone)]
pub struct SectionRecord {
    data: Vec<u8>,
    links: Vec<Link>,
}

impl SectionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn has_links(&self) -> bool {
        !self.links.is_empty()
    }

    /// Append raw bytes.
    pub fn write(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append a fixed-width value in native byte order.
    pub fn write_value<T: FixedWidth>(&mut self, value: T) {
        value.extend_ne(&mut self.data);
    }

    /// Overwrite already-written bytes starting at `offset`. Bytes that
    /// would land past the current end are dropped.
    pub fn set(&mut self, offset: usize, bytes: &[u8]) {
        for (dst, src) in self.data.iter_mut().skip(offset).zip(bytes) {
            *dst = *src;
        }
    }

    /// Remove the last byte, if any.
    pub fn pop(&mut self) {
        self.data.pop();
    }

    /// Append a zeroed offset slot that will point at `target`.
    pub fn link(&mut self, target: SectionId) {
        self.links.push(Link {
            at: self.data.len() as u32,
            target,
        });
        self.data.extend_from_slice(&[0u8; LINK_SIZE]);
    }

    /// Hash of at most `hash_bytes` leading bytes.
    ///
    /// Only a prefix is hashed; equality is always confirmed with a full
    /// byte comparison before two records are merged.
    pub fn content_hash(&self, hash_bytes: u32) -> u64 {
        let end = self.data.len().min(hash_bytes as usize);
        let hash = blake3::hash(&self.data[..end]);
        let mut word = [0u8; 8];
        word.copy_from_slice(&hash.as_bytes()[0..8]);
        u64::from_le_bytes(word)
    }
}

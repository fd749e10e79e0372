//! Read-only position over a borrowed byte region.
//!
//! Moving the cursor never fails; reading checks that the requested bytes
//! lie inside the region and reports `Truncated` otherwise.

use crate::binary::types::FixedWidth;
use crate::error::{Result, TreeError};

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Cursor positioned at an absolute offset.
    pub fn at(bytes: &'a [u8], offset: usize) -> Self {
        Self { bytes, pos: offset }
    }

    /// Move to an absolute offset within the region.
    #[inline]
    pub fn jump(&mut self, offset: u32) {
        self.pos = offset as usize;
    }

    /// Move `count` bytes forward.
    #[inline]
    pub fn skip(&mut self, count: usize) {
        self.pos = self.pos.saturating_add(count);
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The whole backing region.
    #[inline]
    pub fn region(&self) -> &'a [u8] {
        self.bytes
    }

    /// Bytes from the current position to the end of the region.
    pub fn rest(&self) -> &'a [u8] {
        self.bytes.get(self.pos..).unwrap_or(&[])
    }

    /// Fail unless `count` bytes are readable at the current position.
    pub fn ensure(&self, count: usize) -> Result<()> {
        match self.pos.checked_add(count) {
            Some(end) if end <= self.bytes.len() => Ok(()),
            _ => Err(TreeError::Truncated {
                offset: self.pos,
                needed: count,
                len: self.bytes.len(),
            }),
        }
    }

    /// Borrow `count` bytes and advance past them.
    pub fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        self.ensure(count)?;
        let slice = &self.bytes[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Read a fixed-width value in native byte order.
    #[inline]
    pub fn read<T: FixedWidth>(&mut self) -> Result<T> {
        let slice = self.take(T::WIDTH)?;
        Ok(T::from_ne_slice(slice))
    }

    /// Read a value without moving.
    pub fn peek<T: FixedWidth>(&self) -> Result<T> {
        let mut probe = *self;
        probe.read()
    }
}

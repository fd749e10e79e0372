//! BT file header.
//!
//! ```text
//! Offset  Size  Field
//! 0       4     signature: 00 'B' 'T' FF
//! 4       1     version: u8 = 1
//! 5       1     endian: u8 (00 big, FF little, 11 mixed)
//! 6       2     flags: u16, most significant byte first
//! 8       4     root_offset: u32, native order
//! ```
//!
//! The flags field is the only big-endian value in the format. Files
//! produced on a machine with the other byte order are rejected, never
//! byte-swapped.

use crate::binary::cursor::Cursor;
use crate::binary::types::*;
use crate::error::{Result, TreeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub endian: u8,
    pub flags: u16,
    pub root_offset: u32,
}

impl Header {
    /// Header for a file written by this process.
    pub fn new(flags: u16, root_offset: u32) -> Self {
        Self {
            version: FORMAT_VERSION,
            endian: native_endianness(),
            flags,
            root_offset,
        }
    }

    /// Decode the header from the start of `bytes`. Only the signature is
    /// checked here; use `readable()` / `validate()` for compatibility.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        cursor.ensure(HEADER_SIZE)?;

        let mut signature = [0u8; 4];
        signature.copy_from_slice(cursor.take(4)?);
        if signature != SIGNATURE {
            return Err(TreeError::InvalidSignature(signature));
        }

        let version = cursor.read::<u8>()?;
        let endian = cursor.read::<u8>()?;
        let first = cursor.read::<u8>()?;
        let second = cursor.read::<u8>()?;
        let flags = u16::from_be_bytes([first, second]);
        let root_offset = cursor.read::<u32>()?;

        Ok(Self {
            version,
            endian,
            flags,
            root_offset,
        })
    }

    /// Append exactly `HEADER_SIZE` bytes to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&SIGNATURE);
        out.push(self.version);
        out.push(self.endian);
        out.extend_from_slice(&self.flags.to_be_bytes());
        self.root_offset.extend_ne(out);
    }

    /// Whether this process can read the file as-is.
    pub fn readable(&self) -> bool {
        self.version == FORMAT_VERSION && self.endian == native_endianness()
    }

    /// Like `readable()`, but names the reason. Endianness is checked
    /// first so a foreign byte order is reported regardless of version.
    pub fn validate(&self) -> Result<()> {
        if self.endian != native_endianness() {
            return Err(TreeError::UnsupportedEndianness(self.endian));
        }
        if self.version != FORMAT_VERSION {
            return Err(TreeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

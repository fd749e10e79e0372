//! BT format types and constants.
//!
//! Every value in a BT file starts with a one-byte tag. The high nibble
//! selects the category, the low nibble the width of the inline payload:
//!
//! ```text
//! Tag   Variant  Inline payload
//! 0x14  Float32  4 bytes
//! 0x18  Float64  8 bytes
//! 0x21  Int8     1 byte
//! 0x22  Int16    2 bytes
//! 0x24  Int32    4 bytes
//! 0x28  Int64    8 bytes
//! 0x31  Bool     1 byte (0 = false)
//! 0xD4  Text     u32 offset of a NUL-terminated byte run
//! 0xE4  List     u32 offset of [count: u32][element tag: u8][payload x count]
//! 0xF4  Dict     u32 offset of [count: u8]([key: u16][tag: u8][payload])*
//! ```
//!
//! All multi-byte values use the producer's native byte order.

use std::fmt;

// ── Constants ──────────────────────────────────────────────────────

/// Magic bytes at the start of every BT file
pub const SIGNATURE: [u8; 4] = [0x00, b'B', b'T', 0xFF];

/// Format version
pub const FORMAT_VERSION: u8 = 1;

/// Header size in bytes
pub const HEADER_SIZE: usize = 12;

/// Width of a forward-reference slot
pub const LINK_SIZE: usize = 4;

/// Maximum number of entries in one dictionary (count is a single byte)
pub const MAX_DICT_ENTRIES: usize = 0xFF;

/// Number of leading bytes hashed per section by default
pub const DEFAULT_HASH_BYTES: u32 = 20;

/// Endianness marker for big-endian producers
pub const ENDIAN_BIG: u8 = 0x00;

/// Endianness marker for little-endian producers
pub const ENDIAN_LITTLE: u8 = 0xFF;

/// Endianness marker for anything else
pub const ENDIAN_MIXED: u8 = 0x11;

/// Marker describing the byte order of the running process.
pub const fn native_endianness() -> u8 {
    if cfg!(target_endian = "big") {
        ENDIAN_BIG
    } else if cfg!(target_endian = "little") {
        ENDIAN_LITTLE
    } else {
        ENDIAN_MIXED
    }
}

/// Human readable name of an endianness marker.
pub fn endianness_name(marker: u8) -> &'static str {
    match marker {
        ENDIAN_BIG => "big-endian",
        ENDIAN_LITTLE => "little-endian",
        _ => "mixed-endian",
    }
}

// ── Tag ────────────────────────────────────────────────────────────

/// Variant of a tagged tree value (stored as u8 in front of every value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Float32 = 0x14,
    Float64 = 0x18,
    Int8 = 0x21,
    Int16 = 0x22,
    Int32 = 0x24,
    Int64 = 0x28,
    Bool = 0x31,
    Text = 0xD4,
    List = 0xE4,
    Dict = 0xF4,
}

impl Tag {
    pub const ALL: [Tag; 10] = [
        Tag::Float32,
        Tag::Float64,
        Tag::Int8,
        Tag::Int16,
        Tag::Int32,
        Tag::Int64,
        Tag::Bool,
        Tag::Text,
        Tag::List,
        Tag::Dict,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x14 => Some(Self::Float32),
            0x18 => Some(Self::Float64),
            0x21 => Some(Self::Int8),
            0x22 => Some(Self::Int16),
            0x24 => Some(Self::Int32),
            0x28 => Some(Self::Int64),
            0x31 => Some(Self::Bool),
            0xD4 => Some(Self::Text),
            0xE4 => Some(Self::List),
            0xF4 => Some(Self::Dict),
            _ => None,
        }
    }

    /// Inline payload width in bytes.
    pub fn width(self) -> usize {
        width_of(self as u8)
    }

    /// Whether the payload is a link to a separate section.
    pub fn is_compound(self) -> bool {
        matches!(self, Tag::Text | Tag::List | Tag::Dict)
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Float32 => "Float32",
            Tag::Float64 => "Float64",
            Tag::Int8 => "Int8",
            Tag::Int16 => "Int16",
            Tag::Int32 => "Int32",
            Tag::Int64 => "Int64",
            Tag::Bool => "Bool",
            Tag::Text => "Text",
            Tag::List => "List",
            Tag::Dict => "Dict",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inline payload width of a raw tag byte. Defined for unknown tags too,
/// so readers can step over values they do not understand.
#[inline]
pub fn width_of(tag: u8) -> usize {
    (tag & 0x0F) as usize
}

/// Name of a raw tag byte, `Undefined` for unknown tags.
pub fn name_of(tag: u8) -> &'static str {
    Tag::from_u8(tag).map(Tag::name).unwrap_or("Undefined")
}

// ── Fixed-width payloads ───────────────────────────────────────────

/// A value with a fixed-size native-order byte representation.
pub trait FixedWidth: Copy {
    const WIDTH: usize;

    /// Decode from exactly `WIDTH` bytes.
    fn from_ne_slice(bytes: &[u8]) -> Self;

    /// Append the native-order encoding to `out`.
    fn extend_ne(self, out: &mut Vec<u8>);
}

macro_rules! fixed_width {
    ($($ty:ty),*) => {
        $(
            impl FixedWidth for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn from_ne_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::WIDTH]);
                    <$ty>::from_ne_bytes(raw)
                }

                #[inline]
                fn extend_ne(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

fixed_width!(u8, u16, u32, i8, i16, i32, i64, f32, f64);

impl FixedWidth for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn from_ne_slice(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn extend_ne(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }
}

/// A scalar variant of the tree: a fixed-width payload with its own tag.
pub trait Primitive: FixedWidth {
    const TAG: Tag;
}

impl Primitive for bool {
    const TAG: Tag = Tag::Bool;
}
impl Primitive for i8 {
    const TAG: Tag = Tag::Int8;
}
impl Primitive for i16 {
    const TAG: Tag = Tag::Int16;
}
impl Primitive for i32 {
    const TAG: Tag = Tag::Int32;
}
impl Primitive for i64 {
    const TAG: Tag = Tag::Int64;
}
impl Primitive for f32 {
    const TAG: Tag = Tag::Float32;
}
impl Primitive for f64 {
    const TAG: Tag = Tag::Float64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip_u8() {
        for tag in Tag::ALL {
            assert_eq!(Tag::from_u8(tag as u8), Some(tag));
        }
        assert_eq!(Tag::from_u8(0x00), None);
        assert_eq!(Tag::from_u8(0xC4), None);
    }

    #[test]
    fn test_tag_width_matches_low_nibble() {
        assert_eq!(Tag::Int8.width(), 1);
        assert_eq!(Tag::Int16.width(), 2);
        assert_eq!(Tag::Int32.width(), 4);
        assert_eq!(Tag::Int64.width(), 8);
        assert_eq!(Tag::Float32.width(), 4);
        assert_eq!(Tag::Float64.width(), 8);
        assert_eq!(Tag::Bool.width(), 1);
        for tag in [Tag::Text, Tag::List, Tag::Dict] {
            assert!(tag.is_compound());
            assert_eq!(tag.width(), LINK_SIZE);
        }
    }

    #[test]
    fn test_primitive_widths_match_tags() {
        assert_eq!(<bool as FixedWidth>::WIDTH, Tag::Bool.width());
        assert_eq!(<i8 as FixedWidth>::WIDTH, Tag::Int8.width());
        assert_eq!(<i16 as FixedWidth>::WIDTH, Tag::Int16.width());
        assert_eq!(<i32 as FixedWidth>::WIDTH, Tag::Int32.width());
        assert_eq!(<i64 as FixedWidth>::WIDTH, Tag::Int64.width());
        assert_eq!(<f32 as FixedWidth>::WIDTH, Tag::Float32.width());
        assert_eq!(<f64 as FixedWidth>::WIDTH, Tag::Float64.width());
    }

    #[test]
    fn test_unknown_tag_name() {
        assert_eq!(name_of(0x99), "Undefined");
        assert_eq!(name_of(0xF4), "Dict");
        assert_eq!(width_of(0x99), 9);
    }

    #[test]
    fn test_native_endianness_is_known() {
        let marker = native_endianness();
        assert!(marker == ENDIAN_BIG || marker == ENDIAN_LITTLE);
        assert_ne!(endianness_name(marker), "mixed-endian");
    }
}

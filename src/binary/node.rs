//! Lazy, borrowed views over an emitted BT buffer.
//!
//! A `NodeView` is a cursor plus the value's tag. Nothing is decoded until
//! it is asked for, and nothing is copied: every view borrows the caller's
//! buffer, so the compiler rejects views that would outlive it.
//!
//! Dict and list views check on construction that their whole entry table
//! lies inside the buffer, which keeps iteration infallible afterwards.
//! Text views trust the NUL terminator; the scan is bounded by the buffer
//! but the contents of untrusted files are not validated.

use crate::binary::cursor::Cursor;
use crate::binary::header::Header;
use crate::binary::types::*;
use crate::error::{Result, TreeError};

fn mismatch(expected: Tag, found: u8) -> TreeError {
    TreeError::TypeMismatch {
        expected: expected.name(),
        found: name_of(found),
    }
}

// ── Document ───────────────────────────────────────────────────────

/// Entry point for reading a BT buffer.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    bytes: &'a [u8],
    header: Option<Header>,
    root_offset: u32,
}

impl<'a> Document<'a> {
    /// Decode and validate the header, rejecting foreign byte orders and
    /// versions.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let header = Header::decode(bytes)?;
        header.validate()?;
        Ok(Self {
            bytes,
            header: Some(header),
            root_offset: header.root_offset,
        })
    }

    /// Buffer emitted with `include_header: false`; the root is at 0.
    pub fn without_header(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            header: None,
            root_offset: 0,
        }
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn root(&self) -> Result<NodeView<'a>> {
        NodeView::read(Cursor::at(self.bytes, self.root_offset as usize))
    }
}

// ── NodeView ───────────────────────────────────────────────────────

/// A value of any type; dispatch on its tag to get a typed view.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    tag: u8,
    cursor: Cursor<'a>,
}

impl<'a> NodeView<'a> {
    /// Read the tag byte; the cursor is left on the payload.
    pub fn read(mut cursor: Cursor<'a>) -> Result<Self> {
        let tag = cursor.read::<u8>()?;
        Ok(Self { tag, cursor })
    }

    /// View over a payload whose tag is known from context (list elements).
    pub fn with_tag(cursor: Cursor<'a>, tag: u8) -> Self {
        Self { tag, cursor }
    }

    /// Raw tag byte.
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Decoded tag, `None` for tags this version does not know.
    pub fn variant(&self) -> Option<Tag> {
        Tag::from_u8(self.tag)
    }

    pub fn name(&self) -> &'static str {
        name_of(self.tag)
    }

    /// Offset of the payload within the buffer.
    pub fn offset(&self) -> usize {
        self.cursor.position()
    }

    #[inline]
    pub fn is(&self, tag: Tag) -> bool {
        self.tag == tag as u8
    }

    pub fn is_dict(&self) -> bool {
        self.is(Tag::Dict)
    }

    pub fn is_list(&self) -> bool {
        self.is(Tag::List)
    }

    pub fn is_text(&self) -> bool {
        self.is(Tag::Text)
    }

    fn expect(&self, tag: Tag) -> Result<()> {
        if self.is(tag) {
            Ok(())
        } else {
            Err(mismatch(tag, self.tag))
        }
    }

    pub fn as_primitive<P: Primitive>(&self) -> Result<P> {
        self.expect(P::TAG)?;
        self.cursor.peek::<P>()
    }

    pub fn as_bool(&self) -> Result<bool> {
        self.as_primitive()
    }

    pub fn as_i8(&self) -> Result<i8> {
        self.as_primitive()
    }

    pub fn as_i16(&self) -> Result<i16> {
        self.as_primitive()
    }

    pub fn as_i32(&self) -> Result<i32> {
        self.as_primitive()
    }

    pub fn as_i64(&self) -> Result<i64> {
        self.as_primitive()
    }

    pub fn as_f32(&self) -> Result<f32> {
        self.as_primitive()
    }

    pub fn as_f64(&self) -> Result<f64> {
        self.as_primitive()
    }

    pub fn as_text(&self) -> Result<TextView<'a>> {
        self.expect(Tag::Text)?;
        TextView::new(self.cursor)
    }

    pub fn as_dict(&self) -> Result<DictView<'a>> {
        self.expect(Tag::Dict)?;
        DictView::new(self.cursor)
    }

    /// List view in "any node" mode: the element tag is not checked.
    pub fn as_list(&self) -> Result<ListView<'a>> {
        self.expect(Tag::List)?;
        ListView::new(self.cursor, None)
    }

    /// List view that requires every element to be of type `element`.
    pub fn as_list_of(&self, element: Tag) -> Result<ListView<'a>> {
        self.expect(Tag::List)?;
        ListView::new(self.cursor, Some(element))
    }
}

/// Resolve the 4-byte indirection written in place of a compound value.
fn follow_link(mut cursor: Cursor<'_>) -> Result<Cursor<'_>> {
    let offset = cursor.read::<u32>()?;
    cursor.jump(offset);
    Ok(cursor)
}

// ── TextView ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct TextView<'a> {
    bytes: &'a [u8],
}

impl<'a> TextView<'a> {
    pub fn new(cursor: Cursor<'a>) -> Result<Self> {
        let cursor = follow_link(cursor)?;
        cursor.ensure(0)?;
        let rest = cursor.rest();
        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        Ok(Self {
            bytes: &rest[..end],
        })
    }

    /// Text bytes without the terminator.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn as_str(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.bytes)?)
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.bytes).into_owned()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ── DictView ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct DictView<'a> {
    count: usize,
    entries: Cursor<'a>,
}

impl<'a> DictView<'a> {
    pub fn new(cursor: Cursor<'a>) -> Result<Self> {
        let mut cursor = follow_link(cursor)?;
        let count = cursor.read::<u8>()? as usize;

        // Walk the entry table once so iteration cannot run off the end.
        let mut probe = cursor;
        for _ in 0..count {
            probe.skip(2);
            let tag = probe.read::<u8>()?;
            probe.ensure(width_of(tag))?;
            probe.skip(width_of(tag));
        }

        Ok(Self {
            count,
            entries: cursor,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> DictIter<'a> {
        DictIter {
            cursor: self.entries,
            remaining: self.count,
        }
    }

    /// First entry stored under `key`.
    pub fn get(&self, key: u16) -> Result<NodeView<'a>> {
        self.iter()
            .find(|(entry, _)| *entry == key)
            .map(|(_, node)| node)
            .ok_or_else(|| TreeError::KeyNotFound(key.to_string()))
    }

    pub fn has(&self, key: u16) -> bool {
        self.iter().any(|(entry, _)| entry == key)
    }
}

impl<'a> IntoIterator for DictView<'a> {
    type Item = (u16, NodeView<'a>);
    type IntoIter = DictIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct DictIter<'a> {
    cursor: Cursor<'a>,
    remaining: usize,
}

impl<'a> Iterator for DictIter<'a> {
    type Item = (u16, NodeView<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let key = self.cursor.read::<u16>().ok()?;
        let node = NodeView::read(self.cursor).ok()?;
        self.cursor.skip(1 + width_of(node.tag()));
        Some((key, node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

// ── ListView ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ListView<'a> {
    count: usize,
    element: u8,
    stride: usize,
    elements: Cursor<'a>,
}

impl<'a> ListView<'a> {
    /// With `Some(tag)` the list must have been written with that element
    /// tag; with `None` any element tag is accepted.
    pub fn new(cursor: Cursor<'a>, expected: Option<Tag>) -> Result<Self> {
        let mut cursor = follow_link(cursor)?;
        let count = cursor.read::<u32>()? as usize;
        let element = cursor.read::<u8>()?;

        if let Some(expected) = expected {
            if element != expected as u8 {
                return Err(mismatch(expected, element));
            }
        }

        let stride = width_of(element);
        let total = count.checked_mul(stride).ok_or(TreeError::Truncated {
            offset: cursor.position(),
            needed: usize::MAX,
            len: cursor.region().len(),
        })?;
        cursor.ensure(total)?;

        Ok(Self {
            count,
            element,
            stride,
            elements: cursor,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Raw element tag shared by every element.
    pub fn element_tag(&self) -> u8 {
        self.element
    }

    pub fn element_name(&self) -> &'static str {
        name_of(self.element)
    }

    pub fn get(&self, index: usize) -> Result<NodeView<'a>> {
        if index >= self.count {
            return Err(TreeError::IndexOutOfBounds {
                index,
                len: self.count,
            });
        }
        let mut cursor = self.elements;
        cursor.skip(index * self.stride);
        Ok(NodeView::with_tag(cursor, self.element))
    }

    /// Per-element views carrying the shared tag.
    pub fn iter(&self) -> ListIter<'a> {
        ListIter {
            cursor: self.elements,
            element: self.element,
            stride: self.stride,
            remaining: self.count,
        }
    }

    /// Decode every element as `P`; fails if the element type differs.
    pub fn values<P: Primitive>(&self) -> Result<Vec<P>> {
        if self.element != P::TAG as u8 {
            return Err(mismatch(P::TAG, self.element));
        }
        self.iter().map(|node| node.as_primitive::<P>()).collect()
    }
}

impl<'a> IntoIterator for ListView<'a> {
    type Item = NodeView<'a>;
    type IntoIter = ListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct ListIter<'a> {
    cursor: Cursor<'a>,
    element: u8,
    stride: usize,
    remaining: usize,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = NodeView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let node = NodeView::with_tag(self.cursor, self.element);
        self.cursor.skip(self.stride);
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

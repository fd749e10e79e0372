//! Node writers: build a BT tree inside a `SectionArena`.
//!
//! A `NodeWriter` is a place for exactly one value. Scalars are written
//! inline into the current record. Compound values (dict, list, text)
//! write a link into the current record and get a record of their own:
//!
//! ```text
//! dict record: [count: u8] ([key: u16] [tag: u8] [payload])*
//! list record: [count: u32] [element tag: u8] [payload]*
//! text record: [bytes] 0x00
//! ```
//!
//! Dict entries carry their own tag; list elements share the list's
//! element tag and are written without one.

use crate::binary::arena::SectionArena;
use crate::binary::section::SectionId;
use crate::binary::types::{Primitive, Tag, MAX_DICT_ENTRIES};
use crate::error::{Result, TreeError};

fn check_text(value: &str) -> Result<()> {
    match value.bytes().position(|b| b == 0) {
        Some(pos) => Err(TreeError::InteriorNul(pos)),
        None => Ok(()),
    }
}

// ── NodeWriter ─────────────────────────────────────────────────────

/// Where a slot's value goes. Dict keys and element counts are only
/// committed together with the value itself.
enum Slot<'a> {
    Root,
    Entry { key: u16, count: &'a mut u8 },
    Element { count: &'a mut u32 },
}

#[must_use = "nothing is written until a value is put into the slot"]
pub struct NodeWriter<'a> {
    arena: &'a mut SectionArena,
    section: SectionId,
    slot: Slot<'a>,
}

impl<'a> NodeWriter<'a> {
    pub(crate) fn root(arena: &'a mut SectionArena, section: SectionId) -> Self {
        Self {
            arena,
            section,
            slot: Slot::Root,
        }
    }

    /// Commit the slot: bump the owner's count, then write the key and
    /// tag where the layout has them.
    fn begin(&mut self, tag: Tag) {
        let record = self.arena.record_mut(self.section);
        match &mut self.slot {
            Slot::Root => record.write_value(tag as u8),
            Slot::Entry { key, count } => {
                **count += 1;
                record.set(0, &[**count]);
                record.write_value(*key);
                record.write_value(tag as u8);
            }
            // list elements share the list's tag
            Slot::Element { count } => {
                **count += 1;
                record.set(0, &count.to_ne_bytes());
            }
        }
    }

    /// Tag the slot, allocate a record for the value and link it.
    fn child(&mut self, tag: Tag) -> SectionId {
        self.begin(tag);
        let child = self.arena.allocate();
        self.arena.record_mut(self.section).link(child);
        child
    }

    pub fn primitive<P: Primitive>(mut self, value: P) {
        self.begin(P::TAG);
        self.arena.record_mut(self.section).write_value(value);
    }

    pub fn bool(self, value: bool) {
        self.primitive(value)
    }

    pub fn int8(self, value: i8) {
        self.primitive(value)
    }

    pub fn int16(self, value: i16) {
        self.primitive(value)
    }

    pub fn int32(self, value: i32) {
        self.primitive(value)
    }

    pub fn int64(self, value: i64) {
        self.primitive(value)
    }

    pub fn float32(self, value: f32) {
        self.primitive(value)
    }

    pub fn float64(self, value: f64) {
        self.primitive(value)
    }

    /// Write a text value. Fails without touching the tree, the enclosing
    /// dict or list included, if `value` contains a NUL byte.
    pub fn text(mut self, value: &str) -> Result<TextWriter<'a>> {
        check_text(value)?;
        let section = self.child(Tag::Text);
        let record = self.arena.record_mut(section);
        record.write(value.as_bytes());
        record.write_value(0u8);
        Ok(TextWriter {
            arena: self.arena,
            section,
        })
    }

    pub fn dict(mut self) -> DictWriter<'a> {
        let section = self.child(Tag::Dict);
        self.arena.record_mut(section).write_value(0u8);
        DictWriter {
            arena: self.arena,
            section,
            count: 0,
        }
    }

    /// Start a homogeneous list whose elements all have tag `element`.
    pub fn list(mut self, element: Tag) -> ListWriter<'a> {
        let section = self.child(Tag::List);
        let record = self.arena.record_mut(section);
        record.write_value(0u32);
        record.write_value(element as u8);
        ListWriter {
            arena: self.arena,
            section,
            element,
            count: 0,
        }
    }
}

// ── DictWriter ─────────────────────────────────────────────────────

pub struct DictWriter<'a> {
    arena: &'a mut SectionArena,
    section: SectionId,
    count: u8,
}

impl<'a> DictWriter<'a> {
    /// Slot for a value under `key`. The entry only exists once a value
    /// has been written into the slot.
    ///
    /// Keys are not checked for uniqueness; readers return the first match.
    pub fn put(&mut self, key: u16) -> Result<NodeWriter<'_>> {
        if self.count as usize == MAX_DICT_ENTRIES {
            return Err(TreeError::CapacityExceeded(MAX_DICT_ENTRIES));
        }

        Ok(NodeWriter {
            arena: &mut *self.arena,
            section: self.section,
            slot: Slot::Entry {
                key,
                count: &mut self.count,
            },
        })
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn section(&self) -> SectionId {
        self.section
    }
}

// ── ListWriter ─────────────────────────────────────────────────────

pub struct ListWriter<'a> {
    arena: &'a mut SectionArena,
    section: SectionId,
    element: Tag,
    count: u32,
}

impl<'a> ListWriter<'a> {
    /// Slot for the next element, which must be of type `tag`.
    pub fn slot(&mut self, tag: Tag) -> Result<NodeWriter<'_>> {
        if tag != self.element {
            return Err(TreeError::TypeMismatch {
                expected: self.element.name(),
                found: tag.name(),
            });
        }

        Ok(NodeWriter {
            arena: &mut *self.arena,
            section: self.section,
            slot: Slot::Element {
                count: &mut self.count,
            },
        })
    }

    pub fn push<P: Primitive>(&mut self, value: P) -> Result<()> {
        self.slot(P::TAG)?.primitive(value);
        Ok(())
    }

    pub fn push_text(&mut self, value: &str) -> Result<TextWriter<'_>> {
        self.slot(Tag::Text)?.text(value)
    }

    pub fn push_dict(&mut self) -> Result<DictWriter<'_>> {
        Ok(self.slot(Tag::Dict)?.dict())
    }

    pub fn push_list(&mut self, element: Tag) -> Result<ListWriter<'_>> {
        Ok(self.slot(Tag::List)?.list(element))
    }

    pub fn element(&self) -> Tag {
        self.element
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn section(&self) -> SectionId {
        self.section
    }
}

// ── TextWriter ─────────────────────────────────────────────────────

pub struct TextWriter<'a> {
    arena: &'a mut SectionArena,
    section: SectionId,
}

impl<'a> TextWriter<'a> {
    /// Extend the text, keeping it NUL terminated.
    pub fn append(&mut self, value: &str) -> Result<&mut Self> {
        check_text(value)?;
        let record = self.arena.record_mut(self.section);
        record.pop();
        record.write(value.as_bytes());
        record.write_value(0u8);
        Ok(self)
    }

    pub fn section(&self) -> SectionId {
        self.section
    }
}

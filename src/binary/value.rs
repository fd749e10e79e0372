//! Owned BT values.
//!
//! `BinaryValue` is a fully materialized tree, handy for tests, tools and
//! small documents. Large files should be walked with the views instead.

use crate::binary::arena::{Emission, SectionArena, WriteConfig};
use crate::binary::node::NodeView;
use crate::binary::types::{name_of, Tag};
use crate::binary::writer::NodeWriter;
use crate::error::{Result, TreeError};

#[derive(Debug, Clone, PartialEq)]
pub enum BinaryValue {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Text(String),
    List(BinaryList),
    /// Entries in insertion order; keys may repeat.
    Dict(Vec<(u16, BinaryValue)>),
}

/// Homogeneous list: every item must carry `element`'s tag.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryList {
    pub element: Tag,
    pub items: Vec<BinaryValue>,
}

impl BinaryList {
    pub fn new(element: Tag) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    pub fn with_items(element: Tag, items: Vec<BinaryValue>) -> Self {
        Self { element, items }
    }
}

impl BinaryValue {
    pub fn tag(&self) -> Tag {
        match self {
            BinaryValue::Bool(_) => Tag::Bool,
            BinaryValue::Int8(_) => Tag::Int8,
            BinaryValue::Int16(_) => Tag::Int16,
            BinaryValue::Int32(_) => Tag::Int32,
            BinaryValue::Int64(_) => Tag::Int64,
            BinaryValue::Float32(_) => Tag::Float32,
            BinaryValue::Float64(_) => Tag::Float64,
            BinaryValue::Text(_) => Tag::Text,
            BinaryValue::List(_) => Tag::List,
            BinaryValue::Dict(_) => Tag::Dict,
        }
    }

    /// Materialize the subtree under `node`.
    pub fn read(node: NodeView<'_>) -> Result<Self> {
        let tag = node.variant().ok_or(TreeError::TypeMismatch {
            expected: "known node type",
            found: name_of(node.tag()),
        })?;

        let value = match tag {
            Tag::Bool => BinaryValue::Bool(node.as_bool()?),
            Tag::Int8 => BinaryValue::Int8(node.as_i8()?),
            Tag::Int16 => BinaryValue::Int16(node.as_i16()?),
            Tag::Int32 => BinaryValue::Int32(node.as_i32()?),
            Tag::Int64 => BinaryValue::Int64(node.as_i64()?),
            Tag::Float32 => BinaryValue::Float32(node.as_f32()?),
            Tag::Float64 => BinaryValue::Float64(node.as_f64()?),
            Tag::Text => BinaryValue::Text(node.as_text()?.as_str()?.to_owned()),
            Tag::List => {
                let list = node.as_list()?;
                let element = Tag::from_u8(list.element_tag()).ok_or(TreeError::TypeMismatch {
                    expected: "known element type",
                    found: list.element_name(),
                })?;
                let items = list
                    .iter()
                    .map(BinaryValue::read)
                    .collect::<Result<Vec<_>>>()?;
                BinaryValue::List(BinaryList { element, items })
            }
            Tag::Dict => {
                let entries = node
                    .as_dict()?
                    .iter()
                    .map(|(key, child)| BinaryValue::read(child).map(|value| (key, value)))
                    .collect::<Result<Vec<_>>>()?;
                BinaryValue::Dict(entries)
            }
        };
        Ok(value)
    }

    /// Write this value into `slot`.
    pub fn write(&self, slot: NodeWriter<'_>) -> Result<()> {
        match self {
            BinaryValue::Bool(v) => slot.bool(*v),
            BinaryValue::Int8(v) => slot.int8(*v),
            BinaryValue::Int16(v) => slot.int16(*v),
            BinaryValue::Int32(v) => slot.int32(*v),
            BinaryValue::Int64(v) => slot.int64(*v),
            BinaryValue::Float32(v) => slot.float32(*v),
            BinaryValue::Float64(v) => slot.float64(*v),
            BinaryValue::Text(text) => {
                slot.text(text)?;
            }
            BinaryValue::List(list) => {
                let mut writer = slot.list(list.element);
                for item in &list.items {
                    item.write(writer.slot(item.tag())?)?;
                }
            }
            BinaryValue::Dict(entries) => {
                let mut writer = slot.dict();
                for (key, value) in entries {
                    value.write(writer.put(*key)?)?;
                }
            }
        }
        Ok(())
    }

    /// Build a document with this value as its root.
    pub fn encode(&self, config: &WriteConfig) -> Result<Emission> {
        let mut arena = SectionArena::new();
        self.write(arena.root()?)?;
        arena.emit(config)
    }
}

impl From<bool> for BinaryValue {
    fn from(v: bool) -> Self {
        BinaryValue::Bool(v)
    }
}

impl From<i32> for BinaryValue {
    fn from(v: i32) -> Self {
        BinaryValue::Int32(v)
    }
}

impl From<i64> for BinaryValue {
    fn from(v: i64) -> Self {
        BinaryValue::Int64(v)
    }
}

impl From<f64> for BinaryValue {
    fn from(v: f64) -> Self {
        BinaryValue::Float64(v)
    }
}

impl From<&str> for BinaryValue {
    fn from(v: &str) -> Self {
        BinaryValue::Text(v.to_owned())
    }
}

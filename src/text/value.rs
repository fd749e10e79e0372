//! Owned TT value tree.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TreeError};

/// Variant of a parsed text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Bool,
    String,
    Integer,
    Number,
    List,
    Dict,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Bool => "Bool",
            Variant::String => "String",
            Variant::Integer => "Integer",
            Variant::Number => "Number",
            Variant::List => "List",
            Variant::Dict => "Dict",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextValue {
    Bool(bool),
    /// String contents as written, escapes not interpreted.
    String(String),
    Integer(i64),
    Number(f64),
    List(TextList),
    Dict(TextDict),
}

impl TextValue {
    pub fn variant(&self) -> Variant {
        match self {
            TextValue::Bool(_) => Variant::Bool,
            TextValue::String(_) => Variant::String,
            TextValue::Integer(_) => Variant::Integer,
            TextValue::Number(_) => Variant::Number,
            TextValue::List(_) => Variant::List,
            TextValue::Dict(_) => Variant::Dict,
        }
    }

    fn mismatch(&self, expected: Variant) -> TreeError {
        TreeError::TypeMismatch {
            expected: expected.name(),
            found: self.variant().name(),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            TextValue::Bool(v) => Ok(*v),
            _ => Err(self.mismatch(Variant::Bool)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            TextValue::String(v) => Ok(v),
            _ => Err(self.mismatch(Variant::String)),
        }
    }

    pub fn as_integer(&self) -> Result<i64> {
        match self {
            TextValue::Integer(v) => Ok(*v),
            _ => Err(self.mismatch(Variant::Integer)),
        }
    }

    /// Numeric value; integers qualify as numbers.
    pub fn as_number(&self) -> Result<f64> {
        match self {
            TextValue::Number(v) => Ok(*v),
            TextValue::Integer(v) => Ok(*v as f64),
            _ => Err(self.mismatch(Variant::Number)),
        }
    }

    pub fn as_list(&self) -> Result<&TextList> {
        match self {
            TextValue::List(v) => Ok(v),
            _ => Err(self.mismatch(Variant::List)),
        }
    }

    pub fn as_dict(&self) -> Result<&TextDict> {
        match self {
            TextValue::Dict(v) => Ok(v),
            _ => Err(self.mismatch(Variant::Dict)),
        }
    }
}

// ── Dict ───────────────────────────────────────────────────────────

/// Unordered, unique-keyed dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextDict {
    entries: HashMap<String, TextValue>,
}

impl TextDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: TextValue) -> Option<TextValue> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Result<&TextValue> {
        self.entries
            .get(key)
            .ok_or_else(|| TreeError::KeyNotFound(key.to_string()))
    }

    pub fn get_opt(&self, key: &str) -> Option<&TextValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TextValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries ordered by key.
    pub fn sorted(&self) -> Vec<(&str, &TextValue)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl FromIterator<(String, TextValue)> for TextDict {
    fn from_iter<I: IntoIterator<Item = (String, TextValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ── List ───────────────────────────────────────────────────────────

/// Ordered, heterogeneous list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextList {
    items: Vec<TextValue>,
}

impl TextList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: TextValue) {
        self.items.push(value);
    }

    pub fn get(&self, index: usize) -> Result<&TextValue> {
        self.items.get(index).ok_or(TreeError::IndexOutOfBounds {
            index,
            len: self.items.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextValue> {
        self.items.iter()
    }
}

impl FromIterator<TextValue> for TextList {
    fn from_iter<I: IntoIterator<Item = TextValue>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TextList {
    type Item = &'a TextValue;
    type IntoIter = std::slice::Iter<'a, TextValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── TT output ──────────────────────────────────────────────────────
//
// Dicts go one entry per line (the newline is the separator), lists stay
// on one line with explicit commas. Keys are sorted so output is stable.

const INDENT: &str = "    ";

fn write_value(f: &mut fmt::Formatter<'_>, value: &TextValue, depth: usize) -> fmt::Result {
    match value {
        TextValue::Bool(v) => write!(f, "{}", v),
        TextValue::String(v) => write!(f, "\"{}\"", v),
        TextValue::Integer(v) => write!(f, "{}", v),
        // Debug keeps a decimal point or exponent, so the value re-parses
        // as a number rather than an integer.
        TextValue::Number(v) => write!(f, "{:?}", v),
        TextValue::List(list) => write_list(f, list, depth),
        TextValue::Dict(dict) => write_dict(f, dict, depth),
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, list: &TextList, depth: usize) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in list.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_value(f, item, depth)?;
    }
    f.write_str("]")
}

fn write_dict(f: &mut fmt::Formatter<'_>, dict: &TextDict, depth: usize) -> fmt::Result {
    if dict.is_empty() {
        return f.write_str("{}");
    }

    f.write_str("{\n")?;
    for (key, value) in dict.sorted() {
        write!(f, "{}{} ", INDENT.repeat(depth + 1), key)?;
        write_value(f, value, depth + 1)?;
        f.write_str("\n")?;
    }
    write!(f, "{}}}", INDENT.repeat(depth))
}

impl fmt::Display for TextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, 0)
    }
}

impl fmt::Display for TextDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_dict(f, self, 0)
    }
}

impl fmt::Display for TextList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self, 0)
    }
}

//! tagtree - tagged tree values with two encodings.
//!
//! - `binary`: BT, a compact relocatable format. Trees are written into a
//!   section arena, emitted with optional content deduplication, and read
//!   back lazily through borrowed views (typically over a memory map).
//! - `text`: TT, a small hand-written configuration syntax parsed into an
//!   owned value tree.
//!
//! ```no_run
//! use tagtree::binary::{Document, SectionArena, WriteConfig};
//!
//! let mut arena = SectionArena::new();
//! let mut root = arena.root()?.dict();
//! root.put(1)?.int32(69);
//! root.put(2)?.text("Hello World!")?;
//! let bytes = arena.emit(&WriteConfig::default())?.bytes;
//!
//! let dict = Document::from_bytes(&bytes)?.root()?.as_dict()?;
//! assert_eq!(dict.get(1)?.as_i32()?, 69);
//! # Ok::<(), tagtree::TreeError>(())
//! ```

pub mod error;
pub mod binary;
pub mod text;

pub use error::{ParseError, ParseErrorKind, Result, TreeError};

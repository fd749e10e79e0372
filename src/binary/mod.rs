//! BT: the binary tagged-tree format.
//!
//! Documents are built in a `SectionArena` through node writers, emitted
//! into one buffer (with optional section deduplication) and read back
//! through zero-copy views.

pub mod types;
pub mod cursor;
pub mod header;
pub mod section;
pub mod cache;
pub mod arena;
pub mod writer;
pub mod node;
pub mod value;
pub mod mapped;

pub use types::*;
pub use cursor::Cursor;
pub use header::Header;
pub use section::{Link, SectionId, SectionRecord};
pub use cache::{DedupCache, DedupStats, Probe};
pub use arena::{Emission, SectionArena, WriteConfig};
pub use writer::{DictWriter, ListWriter, NodeWriter, TextWriter};
pub use node::{DictIter, DictView, Document, ListIter, ListView, NodeView, TextView};
pub use value::{BinaryList, BinaryValue};
pub use mapped::MappedFile;

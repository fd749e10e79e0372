//! TT: the human-authored text format.
//!
//! ```text
//! /* comments are allowed anywhere outside strings */
//! {
//!     name "demo"
//!     size 0x20, ratio 0.75
//!     tags ["a", "b"]
//!     nested { enabled true }
//! }
//! ```
//!
//! Input is tokenized in full, then parsed by recursive descent into an
//! owned `TextDict`.

pub mod token;
pub mod lexer;
pub mod window;
pub mod value;
pub mod parser;

pub use token::{Token, TokenKind};
pub use lexer::tokenize;
pub use window::{TokenWindow, WindowCursor};
pub use value::{TextDict, TextList, TextValue, Variant};
pub use parser::{parse_bytes, parse_document, parse_integer, parse_number, read_text_file};

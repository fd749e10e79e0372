//! Error types for both tree codecs

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Invalid file signature: {0:02x?}")]
    InvalidSignature([u8; 4]),

    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unsupported endianness marker: 0x{0:02x}")]
    UnsupportedEndianness(u8),

    #[error("Expected node type: {expected}, but got: {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Expected key: {0}, but it was not found in the dictionary")]
    KeyNotFound(String),

    #[error("Index {index} is outside bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Unable to add another key, maximum dictionary capacity of {0} reached")]
    CapacityExceeded(usize),

    #[error("Truncated data: need {needed} bytes at offset {offset}, buffer has {len}")]
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("Offset {0} does not fit into a 32-bit section address")]
    OffsetOverflow(usize),

    #[error("Document has no root value")]
    EmptyDocument,

    #[error("Document root has already been written")]
    RootAlreadyWritten,

    #[error("Text contains a NUL byte at position {0}")]
    InteriorNul(usize),

    #[error("Invalid UTF-8 in text: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl TreeError {
    /// Stable error code, used by the command-line tools
    pub fn code(&self) -> &'static str {
        match self {
            TreeError::InvalidSignature(_) => "INVALID_SIGNATURE",
            TreeError::UnsupportedVersion(_) => "UNSUPPORTED_VERSION",
            TreeError::UnsupportedEndianness(_) => "UNSUPPORTED_ENDIANNESS",
            TreeError::TypeMismatch { .. } => "TYPE_MISMATCH",
            TreeError::KeyNotFound(_) => "KEY_NOT_FOUND",
            TreeError::IndexOutOfBounds { .. } => "INDEX_OUT_OF_BOUNDS",
            TreeError::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            TreeError::Truncated { .. } => "TRUNCATED",
            TreeError::RootAlreadyWritten => "ROOT_ALREADY_WRITTEN",
            TreeError::Parse(err) => err.kind.code(),
            _ => "INTERNAL_ERROR",
        }
    }
}

/// A text-format error with the position it was detected at.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{line}:{column}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: u32, column: u32) -> Self {
        Self { kind, line, column }
    }

    /// Render as `unit:line:column: message`.
    pub fn located(&self, unit: &str) -> String {
        format!("{}:{}:{}: {}", unit, self.line, self.column, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected byte while tokenizing; the message names the byte.
    Lexical(String),
    UnexpectedEndOfScope,
    UnexpectedToken { expected: String, found: String },
    DuplicateKey(String),
    UnbalancedBracket(char),
    InvalidPrimitive(String),
}

impl ParseErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorKind::Lexical(_) => "LEXICAL_ERROR",
            ParseErrorKind::UnexpectedEndOfScope => "UNEXPECTED_END_OF_SCOPE",
            ParseErrorKind::UnexpectedToken { .. } => "UNEXPECTED_TOKEN",
            ParseErrorKind::DuplicateKey(_) => "DUPLICATE_KEY",
            ParseErrorKind::UnbalancedBracket(_) => "UNBALANCED_BRACKET",
            ParseErrorKind::InvalidPrimitive(_) => "INVALID_PRIMITIVE",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Lexical(message) => f.write_str(message),
            ParseErrorKind::UnexpectedEndOfScope => f.write_str("Unexpected end of scope"),
            ParseErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "Expected {} but got: '{}'", expected, found)
            }
            ParseErrorKind::DuplicateKey(key) => {
                write!(f, "Expected unique property name but got: '{}'", key)
            }
            ParseErrorKind::UnbalancedBracket(close) => {
                write!(f, "Missing closing '{}'", close)
            }
            ParseErrorKind::InvalidPrimitive(text) => {
                write!(f, "Expected valid primitive value but got: '{}'", text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_names_both_variants() {
        let err = TreeError::TypeMismatch {
            expected: "Dict",
            found: "Int32",
        };
        assert_eq!(err.to_string(), "Expected node type: Dict, but got: Int32");
        assert_eq!(err.code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_parse_error_display_has_position() {
        let err = ParseError::new(ParseErrorKind::DuplicateKey("a".into()), 3, 7);
        assert_eq!(
            err.to_string(),
            "3:7: Expected unique property name but got: 'a'"
        );
        assert_eq!(
            err.located("config.tt"),
            "config.tt:3:7: Expected unique property name but got: 'a'"
        );
    }

    #[test]
    fn test_parse_error_code_passes_through() {
        let err: TreeError = ParseError::new(ParseErrorKind::UnexpectedEndOfScope, 1, 1).into();
        assert_eq!(err.code(), "UNEXPECTED_END_OF_SCOPE");
    }
}

//! TT tokens and character classes.

use crate::error::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted run of word characters: keys, numbers, `true`/`false`.
    Word,
    /// Quoted text, quotes excluded, escapes kept verbatim.
    String,
    /// One of `[ ] { } ,`.
    Symbol,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Word => "word",
            TokenKind::String => "string",
            TokenKind::Symbol => "symbol",
        }
    }
}

/// A token borrowing its text from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Position of the token's first character, 1-based.
    pub line: u32,
    pub column: u32,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, line: u32, column: u32) -> Self {
        Self {
            kind,
            text,
            line,
            column,
        }
    }

    /// Whether this is the symbol `symbol`. Strings never match, even if
    /// their text does.
    pub fn is_symbol(&self, symbol: char) -> bool {
        self.kind == TokenKind::Symbol && self.text.starts_with(symbol)
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// Error positioned at this token.
    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.line, self.column)
    }

    /// "Expected `what` but got: '<token>'".
    pub fn expected(&self, what: &str) -> ParseError {
        self.error(ParseErrorKind::UnexpectedToken {
            expected: what.to_string(),
            found: self.text.to_string(),
        })
    }
}

// ── Character classes ──────────────────────────────────────────────

#[inline]
pub fn is_white(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\t' | b'\r')
}

#[inline]
pub fn is_symbol(b: u8) -> bool {
    matches!(b, b'[' | b']' | b'{' | b'}' | b',')
}

#[inline]
pub fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.')
}

#[inline]
pub fn is_printable(b: u8) -> bool {
    (b' '..=b'~').contains(&b)
}

/// Human readable name of a byte for error messages.
pub fn describe_byte(b: u8) -> String {
    match b {
        _ if is_printable(b) => format!("'{}'", b as char),
        0 => "nul byte ('\\0')".to_string(),
        b'\n' => "new line ('\\n')".to_string(),
        b'\t' => "tab ('\\t')".to_string(),
        b'\r' => "carriage return ('\\r')".to_string(),
        _ => format!("byte 0x{:02X}", b),
    }
}

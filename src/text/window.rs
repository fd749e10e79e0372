//! Token windows: immutable slices of the token sequence.
//!
//! The parser never copies tokens. Every nested value is a window into the
//! one token vector produced by the lexer, cut out by bracket balancing.

use crate::error::{ParseError, ParseErrorKind};
use crate::text::token::{Token, TokenKind};

/// `[start, end)` over a token slice.
#[derive(Debug, Clone, Copy)]
pub struct TokenWindow<'t, 'a> {
    tokens: &'t [Token<'a>],
    start: usize,
    end: usize,
    /// Last token of the window, or the token before an empty window.
    /// Used to position end-of-scope errors.
    last: Option<Token<'a>>,
}

impl<'t, 'a> TokenWindow<'t, 'a> {
    /// Window over the whole sequence.
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self::between(tokens, 0, tokens.len())
    }

    fn between(tokens: &'t [Token<'a>], start: usize, end: usize) -> Self {
        let last = end
            .checked_sub(1)
            .and_then(|index| tokens.get(index))
            .or_else(|| tokens.first())
            .copied();
        Self {
            tokens,
            start,
            end,
            last,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Token at a window-relative index.
    pub fn get(&self, index: usize) -> Option<&'t Token<'a>> {
        if index < self.len() {
            self.tokens.get(self.start + index)
        } else {
            None
        }
    }

    pub fn first(&self) -> Option<&'t Token<'a>> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&Token<'a>> {
        self.last.as_ref()
    }

    /// Window-relative sub-range, clamped to this window.
    pub fn sub(&self, from: usize, to: usize) -> Self {
        let end = (self.start + to).min(self.end);
        let start = (self.start + from).min(end);
        Self::between(self.tokens, start, end)
    }

    /// Drop the first and last token (the brackets of a compound value).
    pub fn unpack(&self) -> Self {
        if self.len() < 2 {
            return self.sub(0, 0);
        }
        self.sub(1, self.len() - 1)
    }

    /// "Unexpected end of scope" at the window's last token.
    pub fn end_of_scope(&self) -> ParseError {
        let (line, column) = self.last.map_or((1, 1), |t| (t.line, t.column));
        ParseError::new(ParseErrorKind::UnexpectedEndOfScope, line, column)
    }
}

/// Sequential reader over one window.
#[derive(Debug, Clone)]
pub struct WindowCursor<'t, 'a> {
    window: TokenWindow<'t, 'a>,
    index: usize,
}

impl<'t, 'a> WindowCursor<'t, 'a> {
    pub fn new(window: TokenWindow<'t, 'a>) -> Self {
        Self { window, index: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.window.len() - self.index
    }

    pub fn next_token(&mut self) -> Result<&'t Token<'a>, ParseError> {
        let token = self
            .window
            .get(self.index)
            .ok_or_else(|| self.window.end_of_scope())?;
        self.index += 1;
        Ok(token)
    }

    /// Next value: a single token, or for `[` / `{` the window up to and
    /// including the matching closer.
    pub fn next_value(&mut self) -> Result<TokenWindow<'t, 'a>, ParseError> {
        let start = self.index;
        let first = self.next_token()?;
        let mut length = 1;

        if first.kind == TokenKind::Symbol {
            let close = match first.text {
                "[" => ']',
                "{" => '}',
                _ => return Err(first.expected("property value")),
            };
            length += self.count_until_balanced(first, close)?;
        }

        Ok(self.window.sub(start, start + length))
    }

    /// Consume tokens until the bracket opened by `open` is closed. Only
    /// brackets of the same type are counted.
    fn count_until_balanced(&mut self, open: &Token<'a>, close: char) -> Result<usize, ParseError> {
        let opener = open.text.chars().next().unwrap_or('{');
        let mut depth = 1usize;
        let mut count = 0usize;

        while depth > 0 {
            let token = self
                .window
                .get(self.index)
                .ok_or_else(|| open.error(ParseErrorKind::UnbalancedBracket(close)))?;
            self.index += 1;
            count += 1;

            if token.is_symbol(opener) {
                depth += 1;
            } else if token.is_symbol(close) {
                depth -= 1;
            }
        }

        Ok(count)
    }

    /// Accept `,` or a line break between the previous and the next token.
    /// Does nothing at the end of the window.
    pub fn consume_separator(&mut self) -> Result<(), ParseError> {
        let Some(token) = self.window.get(self.index) else {
            return Ok(());
        };

        if token.is_symbol(',') {
            self.index += 1;
            return Ok(());
        }

        let previous = self
            .index
            .checked_sub(1)
            .and_then(|index| self.window.get(index));
        if previous.is_some_and(|prev| prev.line != token.line) {
            return Ok(());
        }

        Err(token.expected("','"))
    }
}

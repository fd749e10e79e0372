//! TT lexer.
//!
//! A single pass over the bytes with one byte of lookahead. All structure
//! in TT is ASCII, so token boundaries always fall on UTF-8 boundaries and
//! tokens can borrow `&str` slices of the source. Non-ASCII bytes are only
//! allowed inside strings and comments.
//!
//! Line and column advance on every byte in every state, so positions stay
//! correct after multi-line comments.

use crate::error::{ParseError, ParseErrorKind};
use crate::text::token::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    Word,
    String,
    Comment,
}

fn lexical(message: String, line: u32, column: u32) -> ParseError {
    ParseError::new(ParseErrorKind::Lexical(message), line, column)
}

/// Whether a word continues past the current byte. `line`/`column` are
/// the position of the current byte; the next byte sits right after it.
fn word_continues(next: Option<u8>, line: u32, column: u32) -> Result<bool, ParseError> {
    match next {
        None => Ok(false),
        Some(n) if is_white(n) || is_symbol(n) => Ok(false),
        Some(n) if is_word(n) => Ok(true),
        Some(n) => Err(lexical(
            format!("Unexpected {} in token", describe_byte(n)),
            line,
            column + 1,
        )),
    }
}

/// Split `source` into tokens. Stops at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();

    let mut state = State::Outside;
    let mut line = 1u32;
    let mut column = 1u32;

    // start of the pending word or string
    let mut begin = 0usize;
    let mut begin_line = 1u32;
    let mut begin_column = 1u32;

    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        let next = bytes.get(i + 1).copied();
        let (at_line, at_column) = (line, column);

        if c == b'\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }

        match state {
            State::Outside => {
                if c == b'/' && next == Some(b'*') {
                    state = State::Comment;
                    i += 2;
                    column += 1;
                    continue;
                }

                if c == b'"' {
                    state = State::String;
                    begin = i + 1;
                    begin_line = at_line;
                    begin_column = at_column;
                } else if is_symbol(c) {
                    tokens.push(Token::new(
                        TokenKind::Symbol,
                        &source[i..i + 1],
                        at_line,
                        at_column,
                    ));
                } else if is_word(c) {
                    begin = i;
                    begin_line = at_line;
                    begin_column = at_column;
                    if word_continues(next, at_line, at_column)? {
                        state = State::Word;
                    } else {
                        tokens.push(Token::new(
                            TokenKind::Word,
                            &source[i..i + 1],
                            at_line,
                            at_column,
                        ));
                    }
                } else if !is_white(c) {
                    return Err(lexical(
                        format!("Unexpected {} in scope", describe_byte(c)),
                        at_line,
                        at_column,
                    ));
                }
            }

            State::Word => {
                if !word_continues(next, at_line, at_column)? {
                    tokens.push(Token::new(
                        TokenKind::Word,
                        &source[begin..=i],
                        begin_line,
                        begin_column,
                    ));
                    state = State::Outside;
                }
            }

            State::Comment => {
                if c == b'*' && next == Some(b'/') {
                    state = State::Outside;
                    i += 2;
                    column += 1;
                    continue;
                }
            }

            State::String => {
                if c == b'\\' {
                    match next {
                        Some(n) if is_printable(n) => {
                            i += 2;
                            column += 1;
                            continue;
                        }
                        Some(n) => {
                            return Err(lexical(
                                format!("Unexpected {} in escape", describe_byte(n)),
                                at_line,
                                at_column + 1,
                            ));
                        }
                        None => break,
                    }
                }

                if c == b'"' {
                    tokens.push(Token::new(
                        TokenKind::String,
                        &source[begin..i],
                        begin_line,
                        begin_column,
                    ));
                    state = State::Outside;

                    // strings need whitespace, a symbol or a comment after them
                    let comment = next == Some(b'/') && bytes.get(i + 2) == Some(&b'*');
                    if let Some(n) = next.filter(|&n| !is_white(n) && !is_symbol(n) && !comment) {
                        return Err(lexical(
                            format!("Unexpected {} in scope", describe_byte(n)),
                            at_line,
                            at_column + 1,
                        ));
                    }
                } else if c == b'\n' || c == 0 {
                    return Err(lexical(
                        format!("Unexpected {} in string", describe_byte(c)),
                        at_line,
                        at_column,
                    ));
                }
            }
        }

        i += 1;
    }

    // An open comment simply runs to the end of input.
    if state == State::String {
        return Err(lexical(
            "Unexpected end of input in string".to_string(),
            begin_line,
            begin_column,
        ));
    }

    Ok(tokens)
}

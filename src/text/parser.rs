//! Recursive-descent parser from tokens to a `TextDict`.

use std::path::Path;

use crate::error::{ParseError, ParseErrorKind, Result};
use crate::text::lexer::tokenize;
use crate::text::token::{Token, TokenKind};
use crate::text::value::{TextDict, TextList, TextValue};
use crate::text::window::{TokenWindow, WindowCursor};

/// Parse a whole TT document. The document must be exactly one dict.
pub fn parse_document(source: &str) -> Result<TextDict> {
    let tokens = tokenize(source)?;
    tracing::trace!("tokenized {} tokens", tokens.len());
    Ok(parse_tokens(&tokens)?)
}

/// Like `parse_document`, for input not yet known to be UTF-8.
pub fn parse_bytes(source: &[u8]) -> Result<TextDict> {
    parse_document(std::str::from_utf8(source)?)
}

/// Load and parse a TT file.
pub fn read_text_file(path: &Path) -> Result<TextDict> {
    let bytes = std::fs::read(path)?;
    let dict = parse_bytes(&bytes)?;
    tracing::debug!("parsed {} ({} top-level keys)", path.display(), dict.len());
    Ok(dict)
}

fn parse_tokens(tokens: &[Token<'_>]) -> std::result::Result<TextDict, ParseError> {
    let mut cursor = WindowCursor::new(TokenWindow::new(tokens));

    let first = cursor.clone().next_token()?;
    if !first.is_symbol('{') {
        return Err(first.expected("'{'"));
    }

    let root = cursor.next_value()?;
    if cursor.remaining() > 0 {
        let extra = cursor.next_token()?;
        return Err(extra.expected("end of document"));
    }

    parse_dict(root.unpack())
}

fn parse_value(cursor: &mut WindowCursor<'_, '_>) -> std::result::Result<TextValue, ParseError> {
    let window = cursor.next_value()?;
    let first = window.first().ok_or_else(|| window.end_of_scope())?;

    if first.is_symbol('[') {
        Ok(TextValue::List(parse_list(window.unpack())?))
    } else if first.is_symbol('{') {
        Ok(TextValue::Dict(parse_dict(window.unpack())?))
    } else {
        parse_primitive(first)
    }
}

fn parse_dict(window: TokenWindow<'_, '_>) -> std::result::Result<TextDict, ParseError> {
    let mut cursor = WindowCursor::new(window);
    let mut dict = TextDict::new();

    while cursor.remaining() > 0 {
        let name = cursor.next_token()?;
        if !name.is_word() {
            return Err(name.expected("property name"));
        }
        if dict.contains_key(name.text) {
            return Err(name.error(ParseErrorKind::DuplicateKey(name.text.to_string())));
        }

        let value = parse_value(&mut cursor)?;
        dict.insert(name.text, value);
        cursor.consume_separator()?;
    }

    Ok(dict)
}

fn parse_list(window: TokenWindow<'_, '_>) -> std::result::Result<TextList, ParseError> {
    let mut cursor = WindowCursor::new(window);
    let mut list = TextList::new();

    while cursor.remaining() > 0 {
        list.push(parse_value(&mut cursor)?);
        cursor.consume_separator()?;
    }

    Ok(list)
}

fn parse_primitive(token: &Token<'_>) -> std::result::Result<TextValue, ParseError> {
    match token.kind {
        TokenKind::String => return Ok(TextValue::String(token.text.to_string())),
        TokenKind::Word if token.text == "true" => return Ok(TextValue::Bool(true)),
        TokenKind::Word if token.text == "false" => return Ok(TextValue::Bool(false)),
        _ => {}
    }

    if let Some(value) = parse_integer(token.text) {
        return Ok(TextValue::Integer(value));
    }
    if let Some(value) = parse_number(token.text) {
        return Ok(TextValue::Number(value));
    }

    Err(token.error(ParseErrorKind::InvalidPrimitive(token.text.to_string())))
}

/// Integer literal with an optional `-` and a base prefix: `0x`, `0o`,
/// `0b`, or a bare leading `0` for octal. Must fit in an `i64`.
pub fn parse_integer(text: &str) -> Option<i64> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let lower = body.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits) = match lower.as_deref() {
        Some("0x") => (16, &body[2..]),
        Some("0o") => (8, &body[2..]),
        Some("0b") => (2, &body[2..]),
        _ if body.len() > 1 && body.starts_with('0') => (8, &body[1..]),
        _ => (10, body),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

/// Floating point literal. Overflow to infinity is rejected unless the
/// literal itself spells out `inf`, `infinity` or `nan`.
pub fn parse_number(text: &str) -> Option<f64> {
    let value: f64 = text.parse().ok()?;
    if value.is_finite() {
        return Some(value);
    }

    let spelled = text.trim_start_matches('-').to_ascii_lowercase();
    matches!(spelled.as_str(), "inf" | "infinity" | "nan").then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;

    fn parse_error(source: &str) -> ParseError {
        match parse_document(source) {
            Err(TreeError::Parse(err)) => err,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_document() {
        let dict = parse_document(r#"{a 1, b [1,2,3], c {d "hi"}}"#).unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.get("a").unwrap(), &TextValue::Integer(1));

        let b = dict.get("b").unwrap().as_list().unwrap();
        let items: Vec<i64> = b.iter().map(|v| v.as_integer().unwrap()).collect();
        assert_eq!(items, vec![1, 2, 3]);

        let c = dict.get("c").unwrap().as_dict().unwrap();
        assert_eq!(c.get("d").unwrap().as_str().unwrap(), "hi");
    }

    #[test]
    fn test_duplicate_key() {
        let err = parse_error("{a 1, a 2}");
        assert_eq!(err.kind, ParseErrorKind::DuplicateKey("a".into()));
        assert_eq!((err.line, err.column), (1, 7));
    }

    #[test]
    fn test_newline_separates_like_comma() {
        assert_eq!(
            parse_document("{a 1\nb 2}").unwrap(),
            parse_document("{a 1, b 2}").unwrap()
        );
    }

    #[test]
    fn test_missing_separator() {
        let err = parse_error("{a 1 b 2}");
        assert_eq!(err.to_string(), "1:6: Expected ',' but got: 'b'");
    }

    #[test]
    fn test_empty_input() {
        let err = parse_error("");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEndOfScope);
        assert_eq!((err.line, err.column), (1, 1));

        let err = parse_error("  /* only a comment */ ");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEndOfScope);
    }

    #[test]
    fn test_document_must_be_dict() {
        let err = parse_error("[1 2]");
        assert_eq!(err.to_string(), "1:1: Expected '{' but got: '['");
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse_error("{a 1} b");
        assert_eq!(err.to_string(), "1:7: Expected end of document but got: 'b'");
    }

    #[test]
    fn test_unbalanced_document() {
        let err = parse_error("{a [1, 2}");
        assert_eq!(err.kind, ParseErrorKind::UnbalancedBracket(']'));
        assert_eq!((err.line, err.column), (1, 4));
    }

    #[test]
    fn test_key_must_be_word() {
        let err = parse_error(r#"{"a" 1}"#);
        assert_eq!(err.to_string(), "1:2: Expected property name but got: 'a'");
    }

    #[test]
    fn test_missing_value() {
        let err = parse_error("{a}");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEndOfScope);
        assert_eq!((err.line, err.column), (1, 2));
    }

    #[test]
    fn test_primitives() {
        let dict = parse_document(
            "{t true, f false, s \"true\", hex 0x1F, oct 017, new_oct 0o17, bin -0b101, \
             big 9223372036854775807, small -9223372036854775808, \
             x 1.5, y -2e3, z 08, w inf}",
        )
        .unwrap();

        assert_eq!(dict.get("t").unwrap(), &TextValue::Bool(true));
        assert_eq!(dict.get("f").unwrap(), &TextValue::Bool(false));
        // only bare words become booleans
        assert_eq!(dict.get("s").unwrap(), &TextValue::String("true".into()));
        assert_eq!(dict.get("hex").unwrap(), &TextValue::Integer(31));
        assert_eq!(dict.get("oct").unwrap(), &TextValue::Integer(15));
        assert_eq!(dict.get("new_oct").unwrap(), &TextValue::Integer(15));
        assert_eq!(dict.get("bin").unwrap(), &TextValue::Integer(-5));
        assert_eq!(dict.get("big").unwrap(), &TextValue::Integer(i64::MAX));
        assert_eq!(dict.get("small").unwrap(), &TextValue::Integer(i64::MIN));
        assert_eq!(dict.get("x").unwrap(), &TextValue::Number(1.5));
        assert_eq!(dict.get("y").unwrap(), &TextValue::Number(-2000.0));
        // not octal, falls through to the float grammar
        assert_eq!(dict.get("z").unwrap(), &TextValue::Number(8.0));
        assert_eq!(dict.get("w").unwrap(), &TextValue::Number(f64::INFINITY));
    }

    #[test]
    fn test_integer_overflow_becomes_number() {
        let dict = parse_document("{n 9223372036854775808}").unwrap();
        assert_eq!(
            dict.get("n").unwrap(),
            &TextValue::Number(9223372036854775808.0)
        );
    }

    #[test]
    fn test_invalid_primitive() {
        let err = parse_error("{a hello}");
        assert_eq!(err.kind, ParseErrorKind::InvalidPrimitive("hello".into()));
        assert_eq!(
            err.to_string(),
            "1:4: Expected valid primitive value but got: 'hello'"
        );

        let err = parse_error("{a 1e999}");
        assert_eq!(err.kind, ParseErrorKind::InvalidPrimitive("1e999".into()));
    }

    #[test]
    fn test_parse_integer_edges() {
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("-0"), Some(0));
        assert_eq!(parse_integer("0x"), None);
        assert_eq!(parse_integer("-"), None);
        assert_eq!(parse_integer("1.0"), None);
        assert_eq!(parse_integer("0XfF"), Some(255));
        assert_eq!(parse_integer("-9223372036854775809"), None);
    }

    #[test]
    fn test_heterogeneous_nested_lists() {
        let err = parse_document("{l [1, \"two\", [3.0], {k v_1}]}").unwrap_err();
        // `v_1` is not a valid primitive
        assert!(matches!(err, TreeError::Parse(_)));

        let dict = parse_document("{l [1, \"two\", [3.0], {k true}]}").unwrap();
        let list = dict.get("l").unwrap().as_list().unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(1).unwrap().as_str().unwrap(), "two");
        assert_eq!(
            list.get(2).unwrap().as_list().unwrap().get(0).unwrap(),
            &TextValue::Number(3.0)
        );
        assert!(list
            .get(3)
            .unwrap()
            .as_dict()
            .unwrap()
            .get("k")
            .unwrap()
            .as_bool()
            .unwrap());
    }

    #[test]
    fn test_display_reparses() {
        let source = "{a 1, b [1, -2.5, \"x\"], c {d \"hi\", e {}}, f [], g 1e20}";
        let dict = parse_document(source).unwrap();
        let printed = dict.to_string();
        assert_eq!(parse_document(&printed).unwrap(), dict);
    }

    #[test]
    fn test_read_text_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.tt");
        std::fs::write(&path, "{\n  name \"demo\"\n  size 3\n}\n").unwrap();
        let dict = read_text_file(&path).unwrap();
        assert_eq!(dict.get("size").unwrap().as_integer().unwrap(), 3);

        std::fs::write(&path, [b'{', 0xFF, b'}']).unwrap();
        assert!(matches!(read_text_file(&path), Err(TreeError::Utf8(_))));
    }
}

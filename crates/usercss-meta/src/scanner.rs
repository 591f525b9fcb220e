//! Cursor-based scanner over a metadata block.
//!
//! Every primitive consumes one token at the cursor and, unless noted, the
//! whitespace following it. Errors carry absolute offsets: the scanner is
//! created with the offset of its text inside the full source.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Number, Value};

use crate::error::{ParseError, ParseErrorKind, Result};

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!(stringify!($name), " is valid")));
    };
}

pattern!(WORD, r"^([0-9A-Za-z_-]+)\s*");
pattern!(NUMBER, r"^-?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)(?:[eE]-?[0-9]+)?\s*");
pattern!(STRING_BACKTICK, r"^`(?:\\`|[\s\S])*?`");
pattern!(STRING_DOUBLE, r#"^"(?:\\"|[^\n])*?""#);
pattern!(STRING_SINGLE, r"^'(?:\\'|[^\n])*?'");
pattern!(STRING_BARE, r"^[0-9A-Za-z_]+");
pattern!(STRING_UNQUOTED, r#"^[^"]*"#);
pattern!(WHITESPACE_RUN, r"\s+");
pattern!(EOT, r"^<<<EOT([\s\S]+?)EOT;");
pattern!(LINE, r"^.*");
pattern!(ESCAPE, r#"\\(["'`\\/bfnrt]|u[0-9a-fA-F]{4})"#);

/// A cursor over metadata text.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over `text`, which starts at byte `base` of the source.
    pub fn new(text: &'a str, base: usize) -> Self {
        Self { text, pos: 0, base }
    }

    /// The scanned text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Cursor position relative to the scanned text.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.text.len());
    }

    /// Offset of the scanned text inside the full source.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Text from the cursor to the end.
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// The character under the cursor.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Whether the cursor reached the end of the text.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Build an error pointing at relative position `pos`.
    pub fn error_at(&self, kind: ParseErrorKind, pos: usize) -> ParseError {
        ParseError::new(kind, self.base + pos)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(kind, self.pos)
    }

    fn advance(&mut self, len: usize) {
        self.pos += len;
    }

    /// Skip whitespace, including newlines.
    pub fn eat_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Skip whitespace up to the end of the current line.
    pub fn eat_same_line_whitespace(&mut self) {
        let skipped: usize = self
            .rest()
            .chars()
            .take_while(|c| c.is_whitespace() && *c != '\n')
            .map(char::len_utf8)
            .sum();
        self.pos += skipped;
    }

    /// Skip to the end of the current line, leaving the newline in place.
    pub fn eat_line(&mut self) {
        let len = LINE.find(self.rest()).map_or(0, |m| m.end());
        self.advance(len);
    }

    /// Consume one character.
    pub fn parse_char(&mut self) -> Result<char> {
        let c = self
            .peek()
            .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEof))?;
        self.advance(c.len_utf8());
        Ok(c)
    }

    /// Consume a `[\w-]+` word. `expected` names the word in the error.
    pub fn parse_word(&mut self, expected: &'static str) -> Result<String> {
        let caps = WORD
            .captures(self.rest())
            .ok_or_else(|| self.error(ParseErrorKind::InvalidWord { expected }))?;
        let word = caps[1].to_string();
        self.advance(caps[0].len());
        Ok(word)
    }

    /// Consume a backtick string, a quoted string or a bare word, and unquote it.
    ///
    /// With `same_line`, only whitespace up to the end of the line is skipped
    /// afterwards.
    pub fn parse_string(&mut self, same_line: bool) -> Result<String> {
        let rest = self.rest();
        let rx: &Regex = match rest.chars().next() {
            Some('`') => &STRING_BACKTICK,
            Some('"') => &STRING_DOUBLE,
            Some('\'') => &STRING_SINGLE,
            _ => &STRING_BARE,
        };
        let raw = rx
            .find(rest)
            .ok_or_else(|| self.error(ParseErrorKind::InvalidString))?
            .as_str();
        self.advance(raw.len());
        if same_line {
            self.eat_same_line_whitespace();
        } else {
            self.eat_whitespace();
        }
        Ok(unquote(raw))
    }

    /// Consume everything up to the next `"`, collapsing whitespace runs to `-`.
    pub fn parse_string_unquoted(&mut self) -> String {
        let raw = STRING_UNQUOTED.find(self.rest()).map_or("", |m| m.as_str());
        self.advance(raw.len());
        WHITESPACE_RUN.replace_all(raw.trim(), "-").into_owned()
    }

    /// Consume the rest of the line. The value is trimmed and unquoted.
    pub fn parse_string_to_end(&mut self) -> Result<String> {
        let line = LINE.find(self.rest()).map_or("", |m| m.as_str());
        let value = line.trim();
        if value.is_empty() {
            return Err(self.error_at(ParseErrorKind::MissingValue, self.pos + line.len()));
        }
        self.advance(line.len());
        Ok(unquote(value))
    }

    /// Consume a `<<<EOT ... EOT;` block and return its trimmed body.
    pub fn parse_eot(&mut self) -> Result<String> {
        let caps = EOT
            .captures(self.rest())
            .ok_or_else(|| self.error(ParseErrorKind::MissingEot))?;
        let value = unescape_comment(caps[1].trim());
        self.advance(caps[0].len());
        self.eat_whitespace();
        Ok(value)
    }

    /// Consume a numeric literal.
    pub fn parse_number(&mut self) -> Result<f64> {
        let raw = NUMBER
            .find(self.rest())
            .ok_or_else(|| self.error(ParseErrorKind::InvalidNumber))?
            .as_str();
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| self.error(ParseErrorKind::InvalidNumber))?;
        self.advance(raw.len());
        Ok(value)
    }

    /// Consume a JSON-like literal: object, array, string, number, or one of
    /// `null`, `true`, `false`. Strings may use any of the three quote styles
    /// and object keys may be bare words.
    pub fn parse_json(&mut self) -> Result<Value> {
        match self.peek() {
            None => Err(self.error(ParseErrorKind::UnexpectedEof)),
            Some('{') => self.parse_json_object(),
            Some('[') => self.parse_json_array(),
            Some('"' | '\'' | '`') => self.parse_string(false).map(Value::String),
            Some(c) if c == '-' || c == '.' || c.is_ascii_digit() => {
                let n = self.parse_number()?;
                Ok(Number::from_f64(n).map_or(Value::Null, Value::Number))
            }
            Some(_) => {
                let start = self.pos;
                match self.parse_word("literal")?.as_str() {
                    "null" => Ok(Value::Null),
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    other => Err(self.error_at(
                        ParseErrorKind::UnknownJsonLiteral(other.to_string()),
                        start,
                    )),
                }
            }
        }
    }

    fn parse_json_object(&mut self) -> Result<Value> {
        let mut object = Map::new();
        self.advance(1);
        self.eat_whitespace();
        loop {
            match self.peek() {
                Some('}') => break,
                None => return Err(self.error(ParseErrorKind::MissingChar(vec!['}']))),
                Some(_) => {}
            }
            let key = self.parse_string(false)?;
            if self.peek() != Some(':') {
                return Err(self.error(ParseErrorKind::MissingChar(vec![':'])));
            }
            self.advance(1);
            self.eat_whitespace();
            let value = self.parse_json()?;
            object.insert(key, value);
            match self.peek() {
                Some(',') => {
                    self.advance(1);
                    self.eat_whitespace();
                }
                Some('}') => {}
                _ => return Err(self.error(ParseErrorKind::MissingChar(vec![',', '}']))),
            }
        }
        self.advance(1);
        self.eat_whitespace();
        Ok(Value::Object(object))
    }

    fn parse_json_array(&mut self) -> Result<Value> {
        let mut array = Vec::new();
        self.advance(1);
        self.eat_whitespace();
        loop {
            match self.peek() {
                Some(']') => break,
                None => return Err(self.error(ParseErrorKind::MissingChar(vec![']']))),
                Some(_) => {}
            }
            array.push(self.parse_json()?);
            match self.peek() {
                Some(',') => {
                    self.advance(1);
                    self.eat_whitespace();
                }
                Some(']') => {}
                _ => return Err(self.error(ParseErrorKind::MissingChar(vec![',', ']']))),
            }
        }
        self.advance(1);
        self.eat_whitespace();
        Ok(Value::Array(array))
    }
}

/// Strip matching quotes and resolve JSON escapes inside them.
///
/// Text that is not wrapped in quotes only gets `*\/` turned back into `*/`.
pub fn unquote(s: &str) -> String {
    let (Some(first), Some(last)) = (s.chars().next(), s.chars().next_back()) else {
        return String::new();
    };
    let quoted = s.len() >= 2 && first == last && matches!(first, '"' | '\'' | '`');
    if !quoted {
        return unescape_comment(s);
    }
    let inner = &s[1..s.len() - 1];
    ESCAPE
        .replace_all(inner, |caps: &Captures<'_>| {
            let seq = &caps[1];
            let c = seq.chars().next().unwrap_or_default();
            match c {
                '"' | '\'' | '`' if c != first => caps[0].to_string(),
                '"' | '\'' | '`' | '\\' | '/' => c.to_string(),
                'b' => "\u{8}".to_string(),
                'f' => "\u{c}".to_string(),
                'n' => "\n".to_string(),
                'r' => "\r".to_string(),
                't' => "\t".to_string(),
                _ => u32::from_str_radix(&seq[1..], 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map_or_else(|| caps[0].to_string(), String::from),
            }
        })
        .into_owned()
}

/// Turn escaped comment terminators (`*\/`) back into `*/`.
pub fn unescape_comment(s: &str) -> String {
    s.replace("*\\/", "*/")
}

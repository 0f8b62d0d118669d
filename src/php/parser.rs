//! Parser for PHP files that consist of a single `return [...];` statement.
//!
//! Only literal data is accepted: strings, numbers, booleans, `null`,
//! nested `[...]`/`array(...)` and `Name::class` constants. Anything that
//! would need evaluation is rejected.
use thiserror::Error;

use super::{PhpArray, PhpKey, PhpValue};

/// A PHP file could not be read as an array literal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// Byte offset in the source.
    pub offset: usize,
}

/// Parse `<?php ... return [...];` into its array.
///
/// `declare`, `namespace` and `use` statements before the `return` are
/// skipped.
///
/// # Errors
///
/// Returns [`ParseError`] if the file is not a literal array return.
pub fn parse_file(source: &str) -> Result<PhpArray, ParseError> {
    let mut parser = Parser { src: source, pos: 0 };
    parser.eat("\u{feff}");
    parser.skip_whitespace();
    if !parser.eat("<?php") {
        return Err(parser.error("expected '<?php' open tag"));
    }

    loop {
        parser.skip_trivia();
        if parser.eat_keyword("return") {
            break;
        }
        if parser.eat_keyword("declare")
            || parser.eat_keyword("namespace")
            || parser.eat_keyword("use")
        {
            parser.skip_statement()?;
            continue;
        }
        return Err(parser.error("expected 'return' statement"));
    }

    parser.skip_trivia();
    let value = parser.parse_value()?;
    let PhpValue::Array(array) = value else {
        return Err(parser.error("returned value is not an array"));
    };
    parser.skip_trivia();
    if !parser.eat(";") {
        return Err(parser.error("expected ';' after returned array"));
    }
    parser.skip_trivia();
    parser.eat("?>");
    parser.skip_trivia();
    if parser.pos < parser.src.len() {
        return Err(parser.error("unexpected content after return statement"));
    }
    Ok(array)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Consume `word` case-insensitively when it is not followed by an
    /// identifier character.
    fn eat_keyword(&mut self, word: &str) -> bool {
        let rest = self.rest();
        let Some(head) = rest.get(..word.len()) else {
            return false;
        };
        let boundary = rest[word.len()..]
            .chars()
            .next()
            .is_none_or(|c| !is_ident_char(c) && c != '\\');
        if head.eq_ignore_ascii_case(word) && boundary {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            offset: self.pos,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if self.eat("//") || (self.rest().starts_with('#') && !self.rest().starts_with("#[")) {
                let end = self.rest().find('\n').unwrap_or(self.rest().len());
                self.pos += end;
            } else if self.eat("/*") {
                let end = self.rest().find("*/").map_or(self.rest().len(), |i| i + 2);
                self.pos += end;
            } else {
                return;
            }
        }
    }

    fn skip_statement(&mut self) -> Result<(), ParseError> {
        match self.rest().find(';') {
            Some(end) => {
                self.pos += end + 1;
                Ok(())
            }
            None => Err(self.error("unterminated statement")),
        }
    }

    fn parse_value(&mut self) -> Result<PhpValue, ParseError> {
        match self.peek() {
            Some('[') => {
                self.bump();
                self.parse_array_body(']')
            }
            Some('\'') => self.parse_single_quoted().map(PhpValue::String),
            Some('"') => self.parse_double_quoted().map(PhpValue::String),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.parse_number(),
            Some(c) if is_ident_start(c) => self.parse_name(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of file")),
        }
    }

    fn parse_array_body(&mut self, close: char) -> Result<PhpValue, ParseError> {
        let mut array = PhpArray::default();
        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(PhpValue::Array(array));
            }
            let first = self.parse_value()?;
            self.skip_trivia();
            if self.eat("=>") {
                self.skip_trivia();
                let key = to_key(&first).ok_or_else(|| self.error("illegal array key"))?;
                let value = self.parse_value()?;
                array.insert(key, value);
            } else {
                array.push(first);
            }
            self.skip_trivia();
            if self.eat(",") {
                continue;
            }
            if self.peek() != Some(close) {
                return Err(self.error("expected ',' or end of array"));
            }
        }
    }

    fn parse_single_quoted(&mut self) -> Result<String, ParseError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\'') => return Ok(out),
                Some('\\') => match self.peek() {
                    Some(c @ ('\'' | '\\')) => {
                        self.bump();
                        out.push(c);
                    }
                    _ => out.push('\\'),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_double_quoted(&mut self) -> Result<String, ParseError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => {
                    let escaped = match self.peek() {
                        Some('n') => Some('\n'),
                        Some('t') => Some('\t'),
                        Some('r') => Some('\r'),
                        Some('v') => Some('\u{0b}'),
                        Some('e') => Some('\u{1b}'),
                        Some('f') => Some('\u{0c}'),
                        Some(c @ ('\\' | '$' | '"')) => Some(c),
                        _ => None,
                    };
                    if let Some(c) = escaped {
                        self.bump();
                        out.push(c);
                    } else {
                        out.push('\\');
                    }
                }
                Some('$') if self.peek().is_some_and(is_ident_start) => {
                    return Err(self.error("string interpolation is not supported"));
                }
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_number(&mut self) -> Result<PhpValue, ParseError> {
        let start = self.pos;
        let negative = self.eat("-");
        if !negative {
            self.eat("+");
        }

        if self.eat("0x") || self.eat("0X") {
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                self.bump();
            }
            let digits = self.src[digits_start..self.pos].replace('_', "");
            let n = i64::from_str_radix(&digits, 16)
                .map_err(|_| self.error("invalid hexadecimal literal"))?;
            return Ok(PhpValue::Int(if negative { -n } else { n }));
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' | 'e' | 'E' => is_float = true,
                '+' | '-' if matches!(self.src[..self.pos].chars().last(), Some('e' | 'E')) => {}
                _ => break,
            }
            self.bump();
        }

        let text = self.src[start..self.pos].replace('_', "");
        if !is_float && let Ok(n) = text.parse::<i64>() {
            return Ok(PhpValue::Int(n));
        }
        text.parse::<f64>()
            .map(PhpValue::Float)
            .map_err(|_| ParseError {
                message: format!("invalid number '{text}'"),
                offset: start,
            })
    }

    fn parse_name(&mut self) -> Result<PhpValue, ParseError> {
        let start = self.pos;
        if self.eat_keyword("array") {
            self.skip_trivia();
            if self.eat("(") {
                return self.parse_array_body(')');
            }
            return Err(self.error("expected '(' after 'array'"));
        }
        while self.peek().is_some_and(|c| is_ident_char(c) || c == '\\') {
            self.bump();
        }
        let name = &self.src[start..self.pos];
        if self.eat("::class") {
            return Ok(PhpValue::String(name.trim_start_matches('\\').to_string()));
        }
        match name.to_ascii_lowercase().as_str() {
            "true" => Ok(PhpValue::Bool(true)),
            "false" => Ok(PhpValue::Bool(false)),
            "null" => Ok(PhpValue::Null),
            _ => Err(ParseError {
                message: format!("unsupported expression '{name}'"),
                offset: start,
            }),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '\\'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Convert a parsed key expression the way PHP casts array keys.
fn to_key(value: &PhpValue) -> Option<PhpKey> {
    match value {
        PhpValue::Int(n) => Some(PhpKey::Int(*n)),
        PhpValue::String(s) => Some(PhpKey::from_str_key(s)),
        PhpValue::Bool(b) => Some(PhpKey::Int(i64::from(*b))),
        PhpValue::Null => Some(PhpKey::String(String::new())),
        #[allow(clippy::cast_possible_truncation)]
        PhpValue::Float(f) => Some(PhpKey::Int(f.trunc() as i64)),
        PhpValue::Array(_) => None,
    }
}

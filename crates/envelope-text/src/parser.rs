use envelope_core::{Container, EnvelopeError, Header, Result, TypeTag, Value};

use crate::codec::{DATA_OPEN, HEADER_FIELDS, HEADER_OPEN};
use crate::escape::{needs_escape, ESCAPE};

/// Single-pass, left-to-right parser over UTF-8 validated input.
pub(crate) struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    max_depth: usize,
}

/// Byte that ended a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldEnd {
    Comma,
    Bracket,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a [u8], max_depth: usize) -> Self {
        Self {
            input,
            pos: 0,
            max_depth,
        }
    }

    /// Parse one complete document and require the input to end after it.
    pub(crate) fn parse(mut self) -> Result<Container> {
        self.skip_whitespace();
        let container = self.parse_container(0)?;
        self.skip_whitespace();
        if self.pos != self.input.len() {
            return Err(self.entry_error("trailing bytes after data block"));
        }
        Ok(container)
    }

    fn parse_container(&mut self, depth: usize) -> Result<Container> {
        if depth > self.max_depth {
            return Err(EnvelopeError::MaxDepthExceeded {
                max: self.max_depth,
            }
            .at_offset(self.pos));
        }

        // A nested payload may carry only its data block.
        let header = if depth > 0 && self.at_literal(DATA_OPEN) {
            Header::default()
        } else {
            let header = self.parse_header()?;
            self.skip_whitespace();
            header
        };
        let mut container = Container::with_header(header);
        self.parse_data(depth, &mut container)?;
        Ok(container)
    }

    fn parse_header(&mut self) -> Result<Header> {
        if !self.eat_literal(HEADER_OPEN) {
            return Err(self.header_error("expected '@header={'"));
        }

        let mut fields: Vec<String> = Vec::with_capacity(HEADER_FIELDS);
        for index in 1..=HEADER_FIELDS {
            match self.peek() {
                Some(b'[') => self.pos += 1,
                Some(b'}') => {
                    return Err(self.header_error(&format!(
                        "expected {HEADER_FIELDS} fields, found {}",
                        index - 1
                    )))
                }
                _ => return Err(self.header_error("expected '['")),
            }

            let number_start = self.pos;
            let number = self.take_while(|byte| byte.is_ascii_digit());
            if number != index.to_string() {
                return Err(EnvelopeError::MalformedHeader(format!(
                    "expected field number {index}, found {number:?}"
                ))
                .at_offset(number_start));
            }
            self.expect(b',', Self::header_error)?;

            let (value, end) = self.read_field().map_err(as_header_error)?;
            if end != FieldEnd::Bracket {
                return Err(self.header_error("unescaped ',' inside header field"));
            }
            self.expect(b';', Self::header_error)?;
            fields.push(value);
        }

        if self.peek() != Some(b'}') {
            return Err(self.header_error("more than six header fields"));
        }
        self.pos += 1;
        self.expect(b';', Self::header_error)?;

        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();
        Ok(Header {
            target_id: next(),
            target_sub_id: next(),
            source_id: next(),
            source_sub_id: next(),
            message_type: next(),
            version: next(),
        })
    }

    fn parse_data(&mut self, depth: usize, container: &mut Container) -> Result<()> {
        if !self.eat_literal(DATA_OPEN) {
            return Err(self.entry_error("expected '@data={'"));
        }

        loop {
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(b'[') => {
                    self.pos += 1;
                    let value = self.parse_entry(depth)?;
                    container.add(value);
                }
                Some(_) => return Err(self.entry_error("expected '[' or '}'")),
                None => return Err(self.entry_error("unterminated data block")),
            }
        }

        if self.peek() != Some(b';') {
            return Err(self.entry_error("missing ';' after data block"));
        }
        self.pos += 1;
        Ok(())
    }

    fn parse_entry(&mut self, depth: usize) -> Result<Value> {
        let name_start = self.pos;
        let (name, end) = self.read_field()?;
        if end != FieldEnd::Comma {
            return Err(self.entry_error("entry has too few fields"));
        }
        if name.is_empty() {
            return Err(EnvelopeError::EmptyName.at_offset(name_start));
        }

        let type_start = self.pos;
        let type_text = self.take_while(|byte| byte != b',' && byte != b']');
        let id: i64 = type_text.parse().map_err(|_| {
            EnvelopeError::MalformedEntry(format!("non-numeric type {type_text:?}"))
                .at_offset(type_start)
        })?;
        let tag = TypeTag::from_id(id).map_err(|err| err.at_offset(type_start))?;
        self.expect(b',', Self::entry_error)?;

        let data_start = self.pos;
        let value = if tag == TypeTag::Container {
            let child = self.parse_container(depth + 1)?;
            self.expect(b']', Self::entry_error)?;
            Value::container(name, child).map_err(|err| err.at_offset(data_start))?
        } else {
            let (data, end) = self.read_field()?;
            if end != FieldEnd::Bracket {
                return Err(self.entry_error("unescaped ',' inside field"));
            }
            Value::from_text(name, tag, &data).map_err(|err| err.at_offset(data_start))?
        };

        self.expect(b';', Self::entry_error)?;
        Ok(value)
    }

    /// Read an escaped field up to and including its terminator (`,` or `]`).
    /// Braces are accepted unescaped since they never end a field.
    fn read_field(&mut self) -> Result<(String, FieldEnd)> {
        let mut out = Vec::new();
        loop {
            let Some(byte) = self.peek() else {
                return Err(self.entry_error("unterminated field"));
            };
            match byte {
                ESCAPE => {
                    match self.input.get(self.pos + 1) {
                        Some(&next) if needs_escape(next) => out.push(next),
                        _ => return Err(self.entry_error("invalid escape sequence")),
                    }
                    self.pos += 2;
                }
                b',' => {
                    self.pos += 1;
                    return Ok((into_string(out)?, FieldEnd::Comma));
                }
                b']' => {
                    self.pos += 1;
                    return Ok((into_string(out)?, FieldEnd::Bracket));
                }
                b';' | b'[' => {
                    return Err(self.entry_error(&format!(
                        "unescaped '{}' inside field",
                        byte as char
                    )));
                }
                other => {
                    out.push(other);
                    self.pos += 1;
                }
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn at_literal(&self, literal: &str) -> bool {
        self.input[self.pos..].starts_with(literal.as_bytes())
    }

    fn eat_literal(&mut self, literal: &str) -> bool {
        if self.at_literal(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8, error: fn(&Self, &str) -> EnvelopeError) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(error(self, &format!("expected '{}'", byte as char)))
        }
    }

    fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while self.peek().is_some_and(&accept) {
            self.pos += 1;
        }
        // Callers stop on ASCII bytes, so the slice ends on a char boundary.
        std::str::from_utf8(&input[start..self.pos]).unwrap_or_default()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn header_error(&self, reason: &str) -> EnvelopeError {
        EnvelopeError::MalformedHeader(reason.to_string()).at_offset(self.pos)
    }

    fn entry_error(&self, reason: &str) -> EnvelopeError {
        EnvelopeError::MalformedEntry(reason.to_string()).at_offset(self.pos)
    }
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|err| EnvelopeError::InvalidUtf8(err.to_string()))
}

fn as_header_error(err: EnvelopeError) -> EnvelopeError {
    match err {
        EnvelopeError::Located { at, source } => match *source {
            EnvelopeError::MalformedEntry(reason) => {
                EnvelopeError::MalformedHeader(reason).at(at)
            }
            other => other.at(at),
        },
        other => other,
    }
}

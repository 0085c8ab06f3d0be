use crate::types::DecodeError;

/// The kind of the next JSON token, as reported by [`JsonReader::peek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    String,
    Number,
    Bool,
    Null,
}

/// A pull-style token reader over a single JSON value.
///
/// Decoders drive the structure explicitly: `begin_object`, `has_next`,
/// `next_name`, one of the `next_*` value readers (or `skip_value` for
/// unrecognized fields), then `end_object`. `peek` reports the kind of
/// the next value without consuming it, which is what lets a decoder
/// buffer a raw token and defer interpreting it until more of the
/// object has been read.
pub struct JsonReader<'a> {
    data: &'a str,
    pos: usize,
    /// One entry per open container; true until its first element has
    /// been consumed, which is what lets `has_next` demand a separator
    /// exactly between elements.
    fresh: Vec<bool>,
}

impl<'a> JsonReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            data: input,
            pos: 0,
            fresh: Vec::new(),
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.data.as_bytes()
    }

    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.bytes().get(pos).copied()
    }

    /// The unread remainder of the input.
    fn rest(&self) -> &'a [u8] {
        self.bytes().get(self.pos..).unwrap_or(&[])
    }

    fn skip_ws(&mut self) {
        while let Some(&b) = self.bytes().get(self.pos) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn peek_byte(&mut self) -> Result<u8, DecodeError> {
        self.skip_ws();
        self.bytes()
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof)
    }

    fn expect_byte(&mut self, want: u8) -> Result<(), DecodeError> {
        if self.peek_byte()? != want {
            return Err(DecodeError::Syntax { offset: self.pos });
        }
        self.pos += 1;
        Ok(())
    }

    /// Report the kind of the next token without consuming it.
    pub fn peek(&mut self) -> Result<Token, DecodeError> {
        Ok(match self.peek_byte()? {
            b'{' => Token::BeginObject,
            b'}' => Token::EndObject,
            b'[' => Token::BeginArray,
            b']' => Token::EndArray,
            b'"' => Token::String,
            b't' | b'f' => Token::Bool,
            b'n' => Token::Null,
            b'-' | b'0'..=b'9' => Token::Number,
            _ => return Err(DecodeError::Syntax { offset: self.pos }),
        })
    }

    pub fn begin_object(&mut self) -> Result<(), DecodeError> {
        self.expect_byte(b'{')?;
        self.fresh.push(true);
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<(), DecodeError> {
        self.expect_byte(b'}')?;
        self.fresh.pop();
        Ok(())
    }

    pub fn begin_array(&mut self) -> Result<(), DecodeError> {
        self.expect_byte(b'[')?;
        self.fresh.push(true);
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<(), DecodeError> {
        self.expect_byte(b']')?;
        self.fresh.pop();
        Ok(())
    }

    /// True while the enclosing object or array has more elements.
    /// Elements after the first must be introduced by exactly one
    /// comma; a leading, missing, or trailing comma is a syntax error.
    pub fn has_next(&mut self) -> Result<bool, DecodeError> {
        let b = self.peek_byte()?;
        let first = self.fresh.last().copied().unwrap_or(true);
        if b == b',' {
            if first {
                return Err(DecodeError::Syntax { offset: self.pos });
            }
            self.pos += 1;
            let b = self.peek_byte()?;
            if b == b'}' || b == b']' {
                return Err(DecodeError::Syntax { offset: self.pos });
            }
            return Ok(true);
        }
        if b == b'}' || b == b']' {
            return Ok(false);
        }
        if !first {
            return Err(DecodeError::Syntax { offset: self.pos });
        }
        if let Some(top) = self.fresh.last_mut() {
            *top = false;
        }
        Ok(true)
    }

    /// Read an object key and its `:` separator.
    pub fn next_name(&mut self) -> Result<String, DecodeError> {
        let name = self.next_string()?;
        self.expect_byte(b':')?;
        Ok(name)
    }

    pub fn next_bool(&mut self) -> Result<bool, DecodeError> {
        self.skip_ws();
        if self.rest().starts_with(b"true") {
            self.pos += 4;
            Ok(true)
        } else if self.rest().starts_with(b"false") {
            self.pos += 5;
            Ok(false)
        } else {
            Err(DecodeError::Syntax { offset: self.pos })
        }
    }

    pub fn next_null(&mut self) -> Result<(), DecodeError> {
        self.skip_ws();
        if self.rest().starts_with(b"null") {
            self.pos += 4;
            Ok(())
        } else {
            Err(DecodeError::Syntax { offset: self.pos })
        }
    }

    /// Read a JSON string value, resolving escapes.
    pub fn next_string(&mut self) -> Result<String, DecodeError> {
        self.expect_byte(b'"')?;
        let mut out = String::new();
        loop {
            let b = *self
                .bytes()
                .get(self.pos)
                .ok_or(DecodeError::UnexpectedEof)?;
            match b {
                b'"' => {
                    self.pos += 1;
                    return Ok(out);
                }
                b'\\' => {
                    self.pos += 1;
                    self.read_escape(&mut out)?;
                }
                _ => {
                    // Copy a run of unescaped bytes verbatim. The run
                    // ends at an ASCII byte, so the slice boundaries
                    // are always valid UTF-8 boundaries.
                    let start = self.pos;
                    while let Some(&c) = self.bytes().get(self.pos) {
                        if c == b'"' || c == b'\\' {
                            break;
                        }
                        self.pos += 1;
                    }
                    out.push_str(&self.data[start..self.pos]);
                }
            }
        }
    }

    fn read_escape(&mut self, out: &mut String) -> Result<(), DecodeError> {
        let b = *self
            .bytes()
            .get(self.pos)
            .ok_or(DecodeError::UnexpectedEof)?;
        self.pos += 1;
        match b {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{0008}'),
            b'f' => out.push('\u{000C}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let unit = self.read_hex4()?;
                let c = if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate: a `\uXXXX` low surrogate must follow.
                    if !self.rest().starts_with(b"\\u") {
                        return Err(DecodeError::Syntax { offset: self.pos });
                    }
                    self.pos += 2;
                    let low = self.read_hex4()?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(DecodeError::Syntax { offset: self.pos });
                    }
                    let cp =
                        0x10000 + ((u32::from(unit - 0xD800)) << 10) + u32::from(low - 0xDC00);
                    char::from_u32(cp).ok_or(DecodeError::Syntax { offset: self.pos })?
                } else {
                    char::from_u32(u32::from(unit))
                        .ok_or(DecodeError::Syntax { offset: self.pos })?
                };
                out.push(c);
            }
            _ => return Err(DecodeError::Syntax { offset: self.pos - 1 }),
        }
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u16, DecodeError> {
        let mut unit: u16 = 0;
        for _ in 0..4 {
            let b = *self
                .bytes()
                .get(self.pos)
                .ok_or(DecodeError::UnexpectedEof)?;
            let digit = match b {
                b'0'..=b'9' => b - b'0',
                b'a'..=b'f' => b - b'a' + 10,
                b'A'..=b'F' => b - b'A' + 10,
                _ => return Err(DecodeError::Syntax { offset: self.pos }),
            };
            unit = unit << 4 | u16::from(digit);
            self.pos += 1;
        }
        Ok(unit)
    }

    /// Read the next number token and return its raw literal text.
    ///
    /// Keeping the literal (rather than eagerly parsing it) is what
    /// allows a caller to decide later whether the token is an integer
    /// or a double.
    pub fn next_literal(&mut self) -> Result<&'a str, DecodeError> {
        self.skip_ws();
        let start = self.pos;
        if self.byte_at(self.pos) == Some(b'-') {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while matches!(self.byte_at(self.pos), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(DecodeError::Syntax { offset: start });
        }
        if self.byte_at(self.pos) == Some(b'.') {
            self.pos += 1;
            while matches!(self.byte_at(self.pos), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.byte_at(self.pos), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.byte_at(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            while matches!(self.byte_at(self.pos), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        Ok(&self.data[start..self.pos])
    }

    /// Read the next number token as a signed 64-bit integer.
    pub fn next_i64(&mut self) -> Result<i64, DecodeError> {
        let literal = self.next_literal()?;
        literal
            .parse()
            .map_err(|_| DecodeError::MalformedNumber(literal.to_string()))
    }

    /// Skip the next value entirely, nested containers included.
    pub fn skip_value(&mut self) -> Result<(), DecodeError> {
        match self.peek()? {
            Token::BeginObject => {
                self.begin_object()?;
                while self.has_next()? {
                    self.next_name()?;
                    self.skip_value()?;
                }
                self.end_object()
            }
            Token::BeginArray => {
                self.begin_array()?;
                while self.has_next()? {
                    self.skip_value()?;
                }
                self.end_array()
            }
            Token::String => self.next_string().map(|_| ()),
            Token::Number => self.next_literal().map(|_| ()),
            Token::Bool => self.next_bool().map(|_| ()),
            Token::Null => self.next_null(),
            Token::EndObject | Token::EndArray => Err(DecodeError::Syntax { offset: self.pos }),
        }
    }
}

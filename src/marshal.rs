//! Minimal reader for Ruby's Marshal serialization format (version 4.8).
//!
//! The unicode property dataset is produced by Ruby's `Marshal.dump` of a
//! `Hash` keyed by codepoint, so this module only needs read compatibility
//! with the tags such a dump contains: nil, booleans, fixnums, strings,
//! symbols, arrays, hashes, instance-variable wrappers and the two link
//! forms. Every other tag is rejected.

use std::fmt;

/// Arbitrary nested data as decoded from a Marshal stream.
///
/// `Hash` is a pair vector rather than a map so that iteration order is
/// exactly the insertion order of the serialized hash.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RubyValue {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    Symbol(String),
    Array(Vec<RubyValue>),
    Hash(Vec<(RubyValue, RubyValue)>),
}

impl RubyValue {
    /// A short name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Array(_) => "array",
            Self::Hash(_) => "hash",
        }
    }
}

impl fmt::Display for RubyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) | Self::Symbol(s) => f.write_str(s),
            Self::Array(_) | Self::Hash(_) => f.write_str(self.kind()),
        }
    }
}

/// Errors produced while decoding a Marshal stream.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MarshalError {
    #[error("unsupported Marshal version {0}.{1}, expected 4.8")]
    UnsupportedVersion(u8, u8),
    #[error("unsupported Marshal tag {0:?} at offset {1}")]
    UnsupportedTag(char, usize),
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),
    #[error("invalid link index {0} at offset {1}")]
    BadLink(usize, usize),
    #[error("string at offset {0} is not valid UTF-8")]
    InvalidUtf8(usize),
    #[error("negative length at offset {0}")]
    NegativeLength(usize),
}

type Result<T, E = MarshalError> = std::result::Result<T, E>;

/// Decodes a full Marshal stream, returning its top-level value.
///
/// Trailing bytes after the top-level value are ignored, which is what
/// Ruby's own reader does.
pub fn decode(bytes: &[u8]) -> Result<RubyValue> {
    let mut dec = Decoder::new(bytes);
    dec.read_header()?;
    dec.read_value()
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Previously decoded linkable objects, indexed by `@` links.
    objects: Vec<RubyValue>,
    /// Previously decoded symbols, indexed by `;` links.
    symbols: Vec<String>,
}

impl<'a> Decoder<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0, objects: Vec::new(), symbols: Vec::new() }
    }

    fn read_header(&mut self) -> Result<()> {
        let major = self.read_byte()?;
        let minor = self.read_byte()?;
        if (major, minor) != (4, 8) {
            return Err(MarshalError::UnsupportedVersion(major, minor));
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let b = *self.bytes.get(self.pos).ok_or(MarshalError::UnexpectedEof(self.pos))?;
        self.pos += 1;
        Ok(b)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(MarshalError::UnexpectedEof(self.pos))?;
        let slice = self.bytes.get(self.pos..end).ok_or(MarshalError::UnexpectedEof(self.pos))?;
        self.pos = end;
        Ok(slice)
    }

    /// Ruby's variable-length integer encoding, used for both fixnums and
    /// lengths.
    fn read_long(&mut self) -> Result<i64> {
        let head = self.read_byte()? as i8;
        match head {
            0 => Ok(0),
            1..=4 => {
                let mut value: i64 = 0;
                for i in 0..head as u32 {
                    value |= (self.read_byte()? as i64) << (8 * i);
                }
                Ok(value)
            }
            -4..=-1 => {
                let count = (-head) as u32;
                let mut value: i64 = -1;
                for i in 0..count {
                    value &= !(0xff_i64 << (8 * i));
                    value |= (self.read_byte()? as i64) << (8 * i);
                }
                Ok(value)
            }
            5..=127 => Ok(head as i64 - 5),
            -128..=-5 => Ok(head as i64 + 5),
        }
    }

    fn read_len(&mut self) -> Result<usize> {
        let at = self.pos;
        usize::try_from(self.read_long()?).map_err(|_| MarshalError::NegativeLength(at))
    }

    fn read_str(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let at = self.pos;
        let raw = self.read_bytes(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| MarshalError::InvalidUtf8(at))
    }

    /// Reserves an object-table slot before parsing the object's contents,
    /// matching the registration order of Ruby's reader.
    fn reserve(&mut self) -> usize {
        self.objects.push(RubyValue::Nil);
        self.objects.len() - 1
    }

    fn read_value(&mut self) -> Result<RubyValue> {
        let at = self.pos;
        let tag = self.read_byte()?;
        match tag {
            b'0' => Ok(RubyValue::Nil),
            b'T' => Ok(RubyValue::Bool(true)),
            b'F' => Ok(RubyValue::Bool(false)),
            b'i' => Ok(RubyValue::Int(self.read_long()?)),
            b':' => {
                let name = self.read_str()?;
                self.symbols.push(name.clone());
                Ok(RubyValue::Symbol(name))
            }
            b';' => {
                let index = self.read_len()?;
                let name = self
                    .symbols
                    .get(index)
                    .ok_or(MarshalError::BadLink(index, at))?
                    .clone();
                Ok(RubyValue::Symbol(name))
            }
            b'@' => {
                let index = self.read_len()?;
                self.objects
                    .get(index)
                    .cloned()
                    .ok_or(MarshalError::BadLink(index, at))
            }
            b'"' => {
                let slot = self.reserve();
                let value = RubyValue::Str(self.read_str()?);
                self.objects[slot] = value.clone();
                Ok(value)
            }
            b'[' => {
                let slot = self.reserve();
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len.min(4096));
                for _ in 0..len {
                    items.push(self.read_value()?);
                }
                let value = RubyValue::Array(items);
                self.objects[slot] = value.clone();
                Ok(value)
            }
            b'{' => {
                let slot = self.reserve();
                let len = self.read_len()?;
                let mut pairs = Vec::with_capacity(len.min(4096));
                for _ in 0..len {
                    let key = self.read_value()?;
                    let value = self.read_value()?;
                    pairs.push((key, value));
                }
                let value = RubyValue::Hash(pairs);
                self.objects[slot] = value.clone();
                Ok(value)
            }
            b'I' => {
                // Instance-variable wrapper; Ruby >= 1.9 uses it to tag
                // string encodings (`:E => true`). The wrapped object keeps
                // its own link slot, the ivars are decoded and dropped.
                let value = self.read_value()?;
                let count = self.read_len()?;
                for _ in 0..count {
                    self.read_value()?;
                    self.read_value()?;
                }
                Ok(value)
            }
            other => Err(MarshalError::UnsupportedTag(other as char, at)),
        }
    }
}

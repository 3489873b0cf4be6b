//! Typed model of the Unicode property table.

use crate::marshal::RubyValue;
use eyre::{bail, Result, WrapErr};
use std::fmt;

/// Key of one table entry.
///
/// The source hash may key by integer codepoint or by string identifier;
/// both render the way Ruby string interpolation renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableKey {
    Codepoint(i64),
    Name(String),
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codepoint(n) => write!(f, "{n}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

/// Properties of one codepoint, decoded from the source's positional
/// 7-element record. Absent optional fields stay absent all the way into the
/// output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnicodeRecord {
    pub combining_class: i64,
    pub exclusion: i64,
    pub canonical: Option<String>,
    pub compatibility: Option<String>,
    pub uppercase: Option<String>,
    pub lowercase: Option<String>,
    pub titlecase: Option<String>,
}

/// The full table, in the source hash's insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnicodeTable {
    pub entries: Vec<(TableKey, UnicodeRecord)>,
}

impl UnicodeTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the decoded Marshal graph into typed records.
    ///
    /// The top-level value must be a hash of arrays. Short arrays are
    /// tolerated, with missing positions treated as nil, because Ruby
    /// indexing past the end of an array yields nil.
    pub fn from_value(value: RubyValue) -> Result<Self> {
        let RubyValue::Hash(pairs) = value else {
            bail!("expected a hash at the top level, got {}", value.kind());
        };

        let mut entries = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let key = match key {
                RubyValue::Int(n) => TableKey::Codepoint(n),
                RubyValue::Str(s) => TableKey::Name(s),
                other => bail!("unsupported table key type: {}", other.kind()),
            };
            let record = UnicodeRecord::from_value(value)
                .wrap_err_with(|| format!("invalid record for key {key}"))?;
            entries.push((key, record));
        }
        Ok(Self { entries })
    }
}

impl UnicodeRecord {
    fn from_value(value: RubyValue) -> Result<Self> {
        let RubyValue::Array(mut fields) = value else {
            bail!("expected an array, got {}", value.kind());
        };
        // Positions beyond the serialized length are nil.
        fields.resize(7, RubyValue::Nil);
        let mut fields = fields.into_iter();

        Ok(Self {
            combining_class: required_int(fields.next(), "combining_class")?,
            exclusion: required_int(fields.next(), "exclusion")?,
            canonical: mapping(fields.next(), "canonical")?,
            compatibility: mapping(fields.next(), "compatibility")?,
            uppercase: mapping(fields.next(), "uppercase_codepoint")?,
            lowercase: mapping(fields.next(), "lowercase_codepoint")?,
            titlecase: mapping(fields.next(), "titlecase_codepoint")?,
        })
    }
}

fn required_int(value: Option<RubyValue>, field: &str) -> Result<i64> {
    match value {
        Some(RubyValue::Int(n)) => Ok(n),
        Some(other) => bail!("{field} must be an integer, got {}", other.kind()),
        None => bail!("{field} is missing"),
    }
}

/// A mapping field is nil, a string of codepoints, or a single raw integer
/// codepoint, which Ruby renders as its one-character string (`"%c" % raw`).
fn mapping(value: Option<RubyValue>, field: &str) -> Result<Option<String>> {
    match value {
        None | Some(RubyValue::Nil) => Ok(None),
        Some(RubyValue::Str(s)) => Ok(Some(s)),
        Some(RubyValue::Int(n)) => {
            let cp = u32::try_from(n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| eyre::eyre!("{field} holds an invalid codepoint {n}"))?;
            Ok(Some(cp.to_string()))
        }
        Some(other) => bail!("{field} must be nil, a string or an integer, got {}", other.kind()),
    }
}

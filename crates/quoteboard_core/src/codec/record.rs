//! Single-record text codec.
//!
//! # Responsibility
//! - Render one `Quote` into the fixed three-field block stored as `{id}.json`.
//! - Parse that block back without a general-purpose JSON parser.
//!
//! # Invariants
//! - Key order and indentation of encoded output never change.
//! - Values are written verbatim; nothing is escaped.
//! - `decode_quote(&encode_quote(q)) == q` whenever `content` and `author`
//!   contain none of `"`, `,` or a line break. Other inputs are unsupported.
//! - Any shape violation fails the whole record; fields never default.

use crate::model::quote::{Quote, QuoteId};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ID_KEY: &str = "\"id\"";
const CONTENT_KEY: &str = "\"content\"";
const AUTHOR_KEY: &str = "\"author\"";

/// Decode failure for one record block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A recognized key line has no `:` separator.
    MissingDelimiter(String),
    MissingField(&'static str),
    DuplicateField(&'static str),
    /// A string field is not wrapped in double quotes.
    UnquotedValue { field: &'static str, value: String },
    InvalidId(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDelimiter(line) => write!(f, "missing `:` in record line `{line}`"),
            Self::MissingField(field) => write!(f, "record is missing field `{field}`"),
            Self::DuplicateField(field) => write!(f, "record repeats field `{field}`"),
            Self::UnquotedValue { field, value } => {
                write!(f, "field `{field}` must be a quoted string, got `{value}`")
            }
            Self::InvalidId(value) => write!(f, "invalid record id `{value}`"),
        }
    }
}

impl Error for CodecError {}

/// Encodes one quote into its record block.
///
/// Output has no trailing newline:
///
/// ```text
/// {
///     "id": 1,
///     "content": "...",
///     "author": "..."
/// }
/// ```
pub fn encode_quote(quote: &Quote) -> String {
    format!(
        "{{\n    {ID_KEY}: {},\n    {CONTENT_KEY}: \"{}\",\n    {AUTHOR_KEY}: \"{}\"\n}}",
        quote.id, quote.content, quote.author
    )
}

/// Decodes one record block.
///
/// Lines are matched by key prefix after trimming; unrecognized lines
/// (braces, blank lines, unknown keys) are ignored.
pub fn decode_quote(text: &str) -> Result<Quote, CodecError> {
    let mut id: Option<QuoteId> = None;
    let mut content: Option<String> = None;
    let mut author: Option<String> = None;

    for line in text.lines().map(str::trim) {
        if line.starts_with(ID_KEY) {
            let raw = field_value(line)?;
            let parsed = raw
                .parse::<QuoteId>()
                .map_err(|_| CodecError::InvalidId(raw.to_string()))?;
            set_once(&mut id, parsed, "id")?;
        } else if line.starts_with(CONTENT_KEY) {
            let value = quoted(field_value(line)?, "content")?;
            set_once(&mut content, value, "content")?;
        } else if line.starts_with(AUTHOR_KEY) {
            let value = quoted(field_value(line)?, "author")?;
            set_once(&mut author, value, "author")?;
        }
    }

    Ok(Quote {
        id: id.ok_or(CodecError::MissingField("id"))?,
        content: content.ok_or(CodecError::MissingField("content"))?,
        author: author.ok_or(CodecError::MissingField("author"))?,
    })
}

/// Value part of `"key": value,` with the trailing separator removed.
fn field_value(line: &str) -> Result<&str, CodecError> {
    let (_, value) = line
        .split_once(':')
        .ok_or_else(|| CodecError::MissingDelimiter(line.to_string()))?;
    let value = value.trim();
    Ok(value.strip_suffix(',').unwrap_or(value).trim_end())
}

fn quoted(value: &str, field: &'static str) -> Result<String, CodecError> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_string)
        .ok_or_else(|| CodecError::UnquotedValue {
            field,
            value: value.to_string(),
        })
}

fn set_once<T>(slot: &mut Option<T>, value: T, field: &'static str) -> Result<(), CodecError> {
    if slot.is_some() {
        return Err(CodecError::DuplicateField(field));
    }
    *slot = Some(value);
    Ok(())
}

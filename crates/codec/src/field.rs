//! Field kinds: the closed set of typed compress/decompress units.
//!
//! Each kind turns one `Value` into a short token and back. `decompress` is
//! a left inverse of `compress`; `Record::save` additionally checks
//! `compress(decompress(compress(v))) == compress(v)` before storing a value.
//!
//! The kind set is fixed, so this is a tagged union matched exhaustively
//! rather than a trait object hierarchy.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::base36;
use crate::error::CodecError;
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;
use crate::wire;

/// Epoch for date tokens: 2020-01-01T00:00:00Z. Offsetting keeps base-36
/// tokens short across the system's operating date range.
pub const DATE_EPOCH_SECS: i64 = 1_577_836_800;

/// Default significant digits for float tokens.
pub const DEFAULT_FLOAT_DIGITS: u32 = 4;

/// Token emitted for boolean true; false is the empty string.
const TRUE_TOKEN: &str = "t";

/// One typed unit of the state codec.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Fixed key set; each key's base-36 ordinal is its declaration index.
    Enum { keys: Vec<String> },
    /// Fixed value table keyed by equality; exactly one entry must match.
    Choice { values: Vec<Value> },
    /// Value must be a member of a fixed ordered list; the token is its index.
    Index { values: Vec<Value> },
    /// Ordered list of inner-kind values, joined with the array wire format.
    Array(Box<FieldKind>),
    /// Identity.
    Str,
    /// Signed base-36 integer.
    Int,
    /// Fixed-precision decimal text; precision loss beyond `digits` is
    /// accepted by design.
    Float { digits: u32 },
    /// `"t"` for true, empty string for false.
    Bool,
    /// Seconds since [`DATE_EPOCH_SECS`], base-36. Sub-second precision is
    /// dropped by design.
    Date,
    /// Recursively encoded sub-record; decompresses to its plain value map.
    Nested(Arc<Schema>),
    /// Same wire behavior as `Nested`; record accessors rebuild a `Record`
    /// over the sub-schema for chained access.
    NestedRecord(Arc<Schema>),
}

impl FieldKind {
    /// Float kind with the default precision.
    pub fn float() -> Self {
        FieldKind::Float {
            digits: DEFAULT_FLOAT_DIGITS,
        }
    }

    /// Enum kind from string-ish keys.
    pub fn enumeration<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        FieldKind::Enum {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Short name used in type-mismatch errors.
    pub fn expected_type(&self) -> &'static str {
        match self {
            FieldKind::Enum { .. } => "string",
            FieldKind::Choice { .. } | FieldKind::Index { .. } => "value",
            FieldKind::Array(_) => "list",
            FieldKind::Str => "string",
            FieldKind::Int => "integer",
            FieldKind::Float { .. } => "float",
            FieldKind::Bool => "boolean",
            FieldKind::Date => "date",
            FieldKind::Nested(_) | FieldKind::NestedRecord(_) => "map",
        }
    }

    /// Compress a typed value to a short token.
    pub fn compress(&self, value: &Value) -> Result<String, CodecError> {
        match self {
            FieldKind::Enum { keys } => {
                let key = value
                    .as_str()
                    .ok_or_else(|| CodecError::UnknownKey(value.type_name().to_string()))?;
                let index = keys
                    .iter()
                    .position(|k| k == key)
                    .ok_or_else(|| CodecError::UnknownKey(key.to_string()))?;
                Ok(base36::encode_u64(index as u64))
            }
            FieldKind::Choice { values } => {
                let mut matches = values.iter().enumerate().filter(|(_, v)| *v == value);
                match (matches.next(), matches.next()) {
                    (Some((index, _)), None) => Ok(base36::encode_u64(index as u64)),
                    _ => Err(CodecError::AmbiguousOrMissingValue),
                }
            }
            FieldKind::Index { values } => {
                let index = values
                    .iter()
                    .position(|v| v == value)
                    .ok_or(CodecError::ValueNotInList)?;
                Ok(base36::encode_u64(index as u64))
            }
            FieldKind::Array(inner) => {
                let items = value.as_list().ok_or_else(|| CodecError::TypeMismatch {
                    field: String::new(),
                    expected: "list",
                })?;
                let tokens = items
                    .iter()
                    .map(|item| inner.compress(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(wire::join_tokens(&tokens))
            }
            FieldKind::Str => value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| CodecError::TypeMismatch {
                    field: String::new(),
                    expected: "string",
                }),
            FieldKind::Int => value
                .as_int()
                .map(base36::encode_i64)
                .ok_or_else(|| CodecError::TypeMismatch {
                    field: String::new(),
                    expected: "integer",
                }),
            FieldKind::Float { digits } => value
                .as_float()
                .map(|f| format_significant(f, *digits))
                .ok_or_else(|| CodecError::TypeMismatch {
                    field: String::new(),
                    expected: "float",
                }),
            FieldKind::Bool => match value.as_bool() {
                Some(true) => Ok(TRUE_TOKEN.to_string()),
                Some(false) => Ok(String::new()),
                None => Err(CodecError::TypeMismatch {
                    field: String::new(),
                    expected: "boolean",
                }),
            },
            FieldKind::Date => value
                .as_date()
                .map(|d| base36::encode_i64(d.timestamp() - DATE_EPOCH_SECS))
                .ok_or_else(|| CodecError::TypeMismatch {
                    field: String::new(),
                    expected: "date",
                }),
            FieldKind::Nested(schema) | FieldKind::NestedRecord(schema) => {
                let entries = value.as_map().ok_or_else(|| CodecError::TypeMismatch {
                    field: String::new(),
                    expected: "map",
                })?;
                let mut record = Record::new(Arc::clone(schema));
                record.save_all(
                    entries
                        .iter()
                        .map(|(name, v)| (name.clone(), Some(v.clone()))),
                )?;
                record.encode()
            }
        }
    }

    /// Decompress a token back to a value. `Ok(None)` means the token maps
    /// to nothing (absent), which callers reject or skip as they see fit.
    pub fn decompress(&self, token: &str) -> Result<Option<Value>, CodecError> {
        match self {
            FieldKind::Enum { keys } => Ok(base36::decode_u64(token)
                .and_then(|index| keys.get(index as usize))
                .map(|key| Value::Str(key.clone()))),
            FieldKind::Choice { values } | FieldKind::Index { values } => {
                Ok(base36::decode_u64(token)
                    .and_then(|index| values.get(index as usize))
                    .cloned())
            }
            FieldKind::Array(inner) => {
                let tokens = wire::split_tokens(token)?;
                let mut items = Vec::with_capacity(tokens.len());
                for (index, element) in tokens.iter().enumerate() {
                    match inner.decompress(element)? {
                        Some(value) => items.push(value),
                        None => return Err(CodecError::InvalidElement { index }),
                    }
                }
                Ok(Some(Value::List(items)))
            }
            FieldKind::Str => Ok(Some(Value::Str(token.to_string()))),
            FieldKind::Int => Ok(base36::decode_i64(token).map(Value::Int)),
            FieldKind::Float { .. } => Ok(token.parse::<f64>().ok().map(Value::Float)),
            FieldKind::Bool => Ok(match token {
                TRUE_TOKEN => Some(Value::Bool(true)),
                "" => Some(Value::Bool(false)),
                _ => None,
            }),
            FieldKind::Date => Ok(base36::decode_i64(token)
                .and_then(|secs| Utc.timestamp_opt(secs + DATE_EPOCH_SECS, 0).single())
                .map(Value::Date)),
            FieldKind::Nested(schema) => {
                let record = Record::decode(Arc::clone(schema), token)?;
                Ok(Some(Value::Map(record.into_values())))
            }
            FieldKind::NestedRecord(schema) => {
                let record = Record::decode(Arc::clone(schema), token)?;
                Ok(Some(Value::Map(record.into_values())))
            }
        }
    }
}

/// Render a float with the given number of significant digits, trimming the
/// representation the way the shortest-round-trip formatter does.
fn format_significant(value: f64, digits: u32) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let magnitude = value.abs().log10().floor();
    let scale = 10f64.powf(digits.max(1) as f64 - 1.0 - magnitude);
    let rounded = (value * scale).round() / scale;
    format!("{rounded}")
}

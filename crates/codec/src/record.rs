//! Sparse records over a schema, and their wire encoding.
//!
//! `encode` writes a presence mask (stored bit-complemented, matching the
//! deployed wire format) as the first token, then one compressed token per
//! present field in schema order. `decode` is strict: every set bit consumes
//! exactly one token, trailing tokens are rejected, and any failure leaves no
//! partially populated record behind.
//!
//! An absent key means "unset", which is distinct from every encodable value;
//! `Bool(false)` and `Int(0)` survive a round trip without collapsing into
//! absence.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::base36;
use crate::error::CodecError;
use crate::schema::Schema;
use crate::value::Value;
use crate::wire;

/// A schema reference plus a mutable sparse field map.
///
/// Records are created per encode/decode call and owned exclusively by their
/// caller; nothing here is shared across requests.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    values: BTreeMap<String, Value>,
}

impl Record {
    /// Fresh record with every field unset.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The sparse field map.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Consume the record, keeping its sparse field map.
    pub fn into_values(self) -> BTreeMap<String, Value> {
        self.values
    }

    /// Get a field's value, failing if the field is unknown or unset.
    pub fn get(&self, name: &str) -> Result<&Value, CodecError> {
        if self.schema.position(name).is_none() {
            return Err(CodecError::UnknownField(name.to_string()));
        }
        self.values
            .get(name)
            .ok_or_else(|| CodecError::FieldUnset(name.to_string()))
    }

    /// Presence / equality test that never fails: with `None` it reports
    /// whether the field is set at all, with `Some(v)` whether it equals `v`.
    pub fn is(&self, name: &str, expected: Option<&Value>) -> bool {
        match (self.values.get(name), expected) {
            (Some(_), None) => true,
            (Some(actual), Some(wanted)) => actual == wanted,
            (None, _) => false,
        }
    }

    pub fn str(&self, name: &str) -> Result<&str, CodecError> {
        match self.get(name)? {
            Value::Str(s) => Ok(s),
            _ => Err(CodecError::TypeMismatch {
                field: name.to_string(),
                expected: "string",
            }),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, CodecError> {
        self.get(name)?
            .as_int()
            .ok_or_else(|| CodecError::TypeMismatch {
                field: name.to_string(),
                expected: "integer",
            })
    }

    pub fn float(&self, name: &str) -> Result<f64, CodecError> {
        self.get(name)?
            .as_float()
            .ok_or_else(|| CodecError::TypeMismatch {
                field: name.to_string(),
                expected: "float",
            })
    }

    pub fn bool(&self, name: &str) -> Result<bool, CodecError> {
        self.get(name)?
            .as_bool()
            .ok_or_else(|| CodecError::TypeMismatch {
                field: name.to_string(),
                expected: "boolean",
            })
    }

    pub fn date(&self, name: &str) -> Result<DateTime<Utc>, CodecError> {
        self.get(name)?
            .as_date()
            .ok_or_else(|| CodecError::TypeMismatch {
                field: name.to_string(),
                expected: "date",
            })
    }

    pub fn list(&self, name: &str) -> Result<&[Value], CodecError> {
        self.get(name)?
            .as_list()
            .ok_or_else(|| CodecError::TypeMismatch {
                field: name.to_string(),
                expected: "list",
            })
    }

    /// Rebuild a `Record` from a nested-record field for chained access.
    pub fn record(&self, name: &str) -> Result<Record, CodecError> {
        let entries = self
            .get(name)?
            .as_map()
            .ok_or_else(|| CodecError::TypeMismatch {
                field: name.to_string(),
                expected: "map",
            })?
            .clone();
        let schema = match self.schema.kind(name) {
            Some(crate::field::FieldKind::Nested(sub))
            | Some(crate::field::FieldKind::NestedRecord(sub)) => Arc::clone(sub),
            _ => {
                return Err(CodecError::TypeMismatch {
                    field: name.to_string(),
                    expected: "map",
                })
            }
        };
        let mut record = Record::new(schema);
        record.values = entries;
        Ok(record)
    }

    /// Store a value after checking the field's codec accepts it: the value
    /// must compress, and re-compressing its own decompression must yield the
    /// same token. `None` (and NaN floats) delete the key instead.
    pub fn save(&mut self, name: &str, value: Option<Value>) -> Result<(), CodecError> {
        let kind = self
            .schema
            .kind(name)
            .ok_or_else(|| CodecError::UnknownField(name.to_string()))?;
        let value = match value {
            Some(v) if !v.is_unstorable() => v,
            _ => {
                self.values.remove(name);
                return Ok(());
            }
        };
        let token = kind.compress(&value)?;
        let recovered = kind
            .decompress(&token)?
            .ok_or_else(|| CodecError::UnwritableValue(name.to_string()))?;
        if kind.compress(&recovered)? != token {
            return Err(CodecError::UnwritableValue(name.to_string()));
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Apply `save` per provided entry, ignoring names the schema lacks.
    pub fn save_all(
        &mut self,
        entries: impl IntoIterator<Item = (String, Option<Value>)>,
    ) -> Result<(), CodecError> {
        for (name, value) in entries {
            if self.schema.position(&name).is_some() {
                self.save(&name, value)?;
            }
        }
        Ok(())
    }

    /// Derive an independent record with one field changed, leaving this one
    /// untouched. Sibling components on one message embed different resumed
    /// states from a shared schema this way.
    pub fn with(&self, name: &str, value: Option<Value>) -> Result<Record, CodecError> {
        let mut copy = self.clone();
        copy.save(name, value)?;
        Ok(copy)
    }

    /// Encode the sparse record into one string.
    pub fn encode(&self) -> Result<String, CodecError> {
        let width = self.schema.len();
        let mut mask: u64 = 0;
        let mut tokens = Vec::with_capacity(self.values.len() + 1);
        tokens.push(String::new());
        for (position, field) in self.schema.fields().iter().enumerate() {
            if let Some(value) = self.values.get(&field.name) {
                mask |= 1 << position;
                tokens.push(field.kind.compress(value)?);
            }
        }
        // The deployed wire format stores the mask bit-complemented.
        tokens[0] = base36::encode_u64(!mask & width_mask(width));
        Ok(wire::join_tokens(&tokens))
    }

    /// Decode an encoded string into a fresh record on the given schema.
    pub fn decode(schema: Arc<Schema>, encoded: &str) -> Result<Record, CodecError> {
        let tokens = wire::split_tokens(encoded)?;
        let (head, rest) = tokens
            .split_first()
            .ok_or_else(|| CodecError::InvalidEncodedIdentifier("empty record".to_string()))?;
        let complement = base36::decode_u64(head)
            .ok_or_else(|| CodecError::MalformedToken(head.clone()))?;
        let width = schema.len();
        if complement & !width_mask(width) != 0 {
            return Err(CodecError::MalformedToken(head.clone()));
        }
        let mask = !complement & width_mask(width);

        let mut values = BTreeMap::new();
        let mut remaining = rest.iter();
        for (position, field) in schema.fields().iter().enumerate() {
            if mask & (1 << position) == 0 {
                continue;
            }
            let token = remaining
                .next()
                .ok_or_else(|| CodecError::MalformedToken(field.name.clone()))?;
            let value = field
                .kind
                .decompress(token)?
                .ok_or_else(|| CodecError::MalformedToken(token.clone()))?;
            values.insert(field.name.clone(), value);
        }
        if remaining.next().is_some() {
            return Err(CodecError::InvalidEncodedIdentifier(
                "trailing record tokens".to_string(),
            ));
        }
        Ok(Record { schema, values })
    }
}

fn width_mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

//! Ordered schemas: field name → kind, declaration order fixed.
//!
//! Declaration order determines each field's bit position in the record
//! presence mask, so a schema is append-only across deployed versions.

use std::collections::HashMap;

use crate::error::CodecError;
use crate::field::FieldKind;

/// Presence masks are a single `u64`, which caps schema width.
pub const MAX_FIELDS: usize = 64;

/// One named, typed schema slot.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered mapping of field name → field kind.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema, rejecting duplicates and over-wide field lists.
    pub fn new(fields: Vec<Field>) -> Result<Self, CodecError> {
        if fields.len() > MAX_FIELDS {
            return Err(CodecError::SchemaTooLarge);
        }
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), position).is_some() {
                return Err(CodecError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields, index })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in declaration (presence-mask) order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Bit position of a field, if it exists.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Kind of a named field, if it exists.
    pub fn kind(&self, name: &str) -> Option<&FieldKind> {
        self.position(name).map(|at| &self.fields[at].kind)
    }
}

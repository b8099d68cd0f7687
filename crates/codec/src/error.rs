//! Unified error type for the codec layer.
//!
//! Every failure in field compression, record encoding, or identifier
//! handling surfaces as one variant here, so callers can match on the
//! category without string inspection.

use thiserror::Error;

/// Unified error type for codec operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An enum field was given a key outside its fixed key set
    #[error("Unknown enum key: {0}")]
    UnknownKey(String),

    /// A choice field's value table matched zero or several entries
    #[error("Choice value is missing from the table or ambiguous")]
    AmbiguousOrMissingValue,

    /// A list-index field was given a value outside its fixed list
    #[error("Value is not a member of the fixed list")]
    ValueNotInList,

    /// An array element failed to decompress
    #[error("Array element {index} did not decompress")]
    InvalidElement { index: usize },

    /// A value's shape does not match the field kind
    #[error("Type mismatch for field '{field}': expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// The field name is not part of the schema
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The field is part of the schema but carries no value
    #[error("Field '{0}' is unset")]
    FieldUnset(String),

    /// A value failed the round-trip idempotence check on save
    #[error("Value for field '{0}' does not survive its own codec")]
    UnwritableValue(String),

    /// Schemas are capped at 64 fields by the presence mask width
    #[error("Schema exceeds the 64-field presence mask")]
    SchemaTooLarge,

    /// Two schema fields share a name
    #[error("Duplicate schema field: {0}")]
    DuplicateField(String),

    /// A token inside an encoded record could not be consumed
    #[error("Malformed record token: {0}")]
    MalformedToken(String),

    /// Routing prefixes must not contain codec delimiter characters
    #[error("Invalid routing prefix: {0}")]
    InvalidPrefix(String),

    /// The plain state payload exceeds the identifier inflation cap
    #[error("State payload is {len} bytes, over the {max}-byte cap")]
    StateTooLarge { len: usize, max: usize },

    /// The packed identifier exceeds the platform's 100-character cap
    #[error("Identifier is {len} characters, over the {max}-character cap")]
    IdentifierTooLong { len: usize, max: usize },

    /// The identifier was not produced by this codec, or is corrupted
    #[error("Invalid encoded identifier: {0}")]
    InvalidEncodedIdentifier(String),
}

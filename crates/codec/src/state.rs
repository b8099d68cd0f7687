//! View state: a record tagged with a routing prefix, and the full
//! component-identifier wire format built from both.
//!
//! `to_wire_id` never truncates: when the packed identifier would exceed the
//! platform cap the caller gets `IdentifierTooLong` and must carry less
//! state instead.

use std::sync::Arc;

use crate::error::CodecError;
use crate::pack;
use crate::record::Record;
use crate::schema::Schema;
use crate::wire;

/// Separator between the routing prefix and the record token. Disjoint from
/// base-36 digits and from the array wire format's delimiter/escape pair.
pub const PREFIX_SEPARATOR: char = ':';

/// The platform's hard cap on component identifiers, in characters.
pub const MAX_WIRE_ID_CHARS: usize = 100;

/// Reject prefixes that would collide with codec delimiter characters.
pub fn validate_prefix(prefix: &str) -> Result<(), CodecError> {
    let reserved = [PREFIX_SEPARATOR, wire::DELIMITER, wire::ESCAPE];
    if prefix.chars().any(|c| reserved.contains(&c)) {
        return Err(CodecError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// A record plus its immutable routing prefix.
#[derive(Debug, Clone)]
pub struct ViewState {
    prefix: String,
    pub record: Record,
}

impl ViewState {
    /// Fresh state for a new UI artifact. Fails on a reserved-character
    /// prefix; this is a build-time contract, not a runtime one.
    pub fn new(prefix: impl Into<String>, schema: Arc<Schema>) -> Result<Self, CodecError> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(Self {
            prefix,
            record: Record::new(schema),
        })
    }

    /// Rehydrate state from a record token that `split_wire_id` separated
    /// from its prefix.
    pub fn from_token(
        prefix: impl Into<String>,
        schema: Arc<Schema>,
        token: &str,
    ) -> Result<Self, CodecError> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(Self {
            prefix,
            record: Record::decode(schema, token)?,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Produce the full platform component identifier.
    pub fn to_wire_id(&self) -> Result<String, CodecError> {
        let plain = format!(
            "{}{}{}",
            self.prefix,
            PREFIX_SEPARATOR,
            self.record.encode()?
        );
        let packed = pack::pack(&plain)?;
        let len = packed.chars().count();
        if len > MAX_WIRE_ID_CHARS {
            return Err(CodecError::IdentifierTooLong {
                len,
                max: MAX_WIRE_ID_CHARS,
            });
        }
        Ok(packed)
    }
}

/// Split an inbound identifier into `(prefix, record_token)`.
///
/// Fails with `InvalidEncodedIdentifier` when the identifier was not
/// produced by this codec or has been truncated or corrupted.
pub fn split_wire_id(id: &str) -> Result<(String, String), CodecError> {
    let plain = pack::unpack(id)?;
    match plain.split_once(PREFIX_SEPARATOR) {
        Some((prefix, token)) => Ok((prefix.to_string(), token.to_string())),
        None => Err(CodecError::InvalidEncodedIdentifier(
            "missing prefix separator".to_string(),
        )),
    }
}

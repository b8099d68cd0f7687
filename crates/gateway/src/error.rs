//! Unified error type for the routing layer.
//!
//! Build-time configuration errors (duplicate routes, bad keys) are
//! surfaced at construction and never at request time; everything else is a
//! malformed-input error that the dispatcher renders as a user-visible
//! message through the error boundary.

use thiserror::Error;

use parley_codec::CodecError;

use crate::envelope::CommandKind;

/// Unified error type for gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Two handlers registered the same (name, kind) command pair
    #[error("Duplicate command route: {name} ({kind:?})")]
    DuplicateCommand { name: String, kind: CommandKind },

    /// Two handlers registered the same non-empty component prefix
    #[error("Duplicate component prefix: {0}")]
    DuplicatePrefix(String),

    /// No handler matches the inbound routing key
    #[error("No handler for view: {0}")]
    UnknownView(String),

    /// The handler requires a guild context the interaction lacks
    #[error("This command can only be used in a server")]
    GuildOnly,

    /// The request body is not a valid interaction envelope
    #[error("Malformed interaction envelope: {0}")]
    MalformedEnvelope(String),

    /// A component interaction arrived without the state its handler needs
    #[error("Interaction carries no view state")]
    MissingState,

    /// State codec failure while decoding or minting an identifier
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The configured public key is not valid hex-encoded ed25519 material
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Request signature verification failed; fail closed
    #[error("Request signature mismatch")]
    SignatureMismatch,
}

impl GatewayError {
    /// True for errors that mean the component identifier is stale, foreign,
    /// or corrupted, rather than a bug.
    pub fn is_stale_component(&self) -> bool {
        matches!(
            self,
            GatewayError::UnknownView(_)
                | GatewayError::MissingState
                | GatewayError::Codec(CodecError::InvalidEncodedIdentifier(_))
                | GatewayError::Codec(CodecError::MalformedToken(_))
        )
    }
}

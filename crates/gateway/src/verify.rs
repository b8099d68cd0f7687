//! Request authentication.
//!
//! The platform signs every webhook POST with an ed25519 key; the signature
//! covers `timestamp + raw body`. Verification fails closed: no further
//! processing happens on a mismatch.

use ed25519_dalek::{Signature, VerifyingKey};

use crate::error::GatewayError;

/// Verifies inbound request signatures against the pre-shared public key.
#[derive(Debug, Clone)]
pub struct RequestVerifier {
    key: VerifyingKey,
}

impl RequestVerifier {
    /// Build from the platform's hex-encoded public key.
    pub fn from_hex(public_key_hex: &str) -> Result<Self, GatewayError> {
        let bytes: [u8; 32] = hex::decode(public_key_hex)
            .map_err(|e| GatewayError::InvalidPublicKey(e.to_string()))?
            .try_into()
            .map_err(|_| GatewayError::InvalidPublicKey("expected 32 bytes".to_string()))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| GatewayError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Check a hex signature over `timestamp + raw_body`.
    pub fn verify(
        &self,
        timestamp: &str,
        raw_body: &str,
        signature_hex: &str,
    ) -> Result<(), GatewayError> {
        let signature_bytes =
            hex::decode(signature_hex).map_err(|_| GatewayError::SignatureMismatch)?;
        let signature = Signature::from_slice(&signature_bytes)
            .map_err(|_| GatewayError::SignatureMismatch)?;
        let mut message = Vec::with_capacity(timestamp.len() + raw_body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(raw_body.as_bytes());
        self.key
            .verify_strict(&message, &signature)
            .map_err(|_| GatewayError::SignatureMismatch)
    }
}

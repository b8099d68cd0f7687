//! Gateway configuration.

use crate::error::GatewayError;
use crate::verify::RequestVerifier;

/// Configuration an embedding server hands to the dispatcher.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Hex-encoded ed25519 public key from the platform's app settings.
    pub public_key_hex: String,
}

impl GatewayConfig {
    pub fn new(public_key_hex: impl Into<String>) -> Self {
        Self {
            public_key_hex: public_key_hex.into(),
        }
    }

    /// Load from the environment (`PARLEY_PUBLIC_KEY`).
    pub fn from_env() -> Result<Self, GatewayError> {
        let public_key_hex = std::env::var("PARLEY_PUBLIC_KEY")
            .map_err(|_| GatewayError::InvalidPublicKey("PARLEY_PUBLIC_KEY not set".to_string()))?;
        Ok(Self { public_key_hex })
    }

    /// Build the request verifier for this configuration.
    pub fn verifier(&self) -> Result<RequestVerifier, GatewayError> {
        RequestVerifier::from_hex(&self.public_key_hex)
    }
}

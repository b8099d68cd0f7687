//! Port for the platform's webhook follow-up API.
//!
//! The dispatcher never talks HTTP itself; an adapter implementing this
//! trait is injected at construction. Every call is keyed by the interaction
//! token captured from the inbound envelope, which outlives this process for
//! the platform's stated window.

use async_trait::async_trait;

/// Errors from the platform API adapter.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("Platform request failed: {0}")]
    RequestFailed(String),
    #[error("Platform unavailable")]
    Unavailable,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Post a new follow-up message under the interaction token.
    async fn create_followup(
        &self,
        token: &str,
        body: serde_json::Value,
    ) -> Result<(), MessagingError>;

    /// Edit the original response for the interaction token.
    async fn edit_original(
        &self,
        token: &str,
        body: serde_json::Value,
    ) -> Result<(), MessagingError>;

    /// Delete the original response for the interaction token.
    async fn delete_original(&self, token: &str) -> Result<(), MessagingError>;
}

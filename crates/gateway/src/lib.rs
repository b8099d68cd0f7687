//! Parley Gateway library.
//!
//! Routing core for a webhook-driven chat-bot integration: verifies each
//! signed inbound POST, classifies the interaction, resolves exactly one
//! typed handler, rehydrates view state from the component identifier, and
//! emits the immediate response envelope. Slower work returns a continuation
//! that is scheduled off the response path.
//!
//! ## Structure
//!
//! - `envelope` - Inbound interaction and outbound response DTOs
//! - `verify` / `config` - Request authentication
//! - `route` / `handler` / `registry` - Signatures bound to callbacks
//! - `api` - Port for the platform's follow-up/edit/delete calls
//! - `dispatch` - The per-request state machine

pub mod api;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod registry;
pub mod route;
pub mod verify;

/// End-to-end dispatch tests over signed requests.
#[cfg(test)]
mod e2e_tests;

pub use api::{MessagingError, MessagingPort};
pub use config::GatewayConfig;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use envelope::{
    CommandKind, Interaction, InteractionData, InteractionKind, InteractionResponse, ResponseKind,
};
pub use error::GatewayError;
pub use handler::{Continuation, FollowUp, Handler, InteractionContext, Reply};
pub use registry::Registry;
pub use route::{RouteKey, ViewSignature};
pub use verify::RequestVerifier;

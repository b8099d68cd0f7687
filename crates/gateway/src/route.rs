//! Signatures: typed descriptors of a command or component family.
//!
//! A signature carries the state schema plus the routing key the registry
//! indexes on. Prefix validation happens here, at construction, so a bad
//! prefix is a build-time failure rather than a request-time one.

use std::sync::Arc;

use parley_codec::{state, Schema, ViewState};

use crate::envelope::CommandKind;
use crate::error::GatewayError;

/// How inbound interactions reach a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKey {
    /// Command invocations, routed by (name, kind).
    Command { name: String, kind: CommandKind },
    /// Component/modal interactions, routed by the identifier prefix.
    Component { prefix: String },
}

/// Immutable descriptor of one command/component family.
#[derive(Debug, Clone)]
pub struct ViewSignature {
    pub route: RouteKey,
    pub schema: Arc<Schema>,
    /// Only usable inside a guild.
    pub guild_only: bool,
    /// Excluded from the registry unless experiments are enabled.
    pub experimental: bool,
}

impl ViewSignature {
    /// Signature for a slash command.
    pub fn command(name: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self::command_of_kind(name, CommandKind::ChatInput, schema)
    }

    /// Signature for a context-menu or slash command of a specific kind.
    pub fn command_of_kind(
        name: impl Into<String>,
        kind: CommandKind,
        schema: Arc<Schema>,
    ) -> Self {
        Self {
            route: RouteKey::Command {
                name: name.into(),
                kind,
            },
            schema,
            guild_only: false,
            experimental: false,
        }
    }

    /// Signature for a stateful component family. Fails immediately when the
    /// prefix contains a reserved codec character or is empty.
    pub fn component(prefix: impl Into<String>, schema: Arc<Schema>) -> Result<Self, GatewayError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(GatewayError::Codec(
                parley_codec::CodecError::InvalidPrefix(prefix),
            ));
        }
        state::validate_prefix(&prefix)?;
        Ok(Self {
            route: RouteKey::Component { prefix },
            schema,
            guild_only: false,
            experimental: false,
        })
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    pub fn experimental(mut self) -> Self {
        self.experimental = true;
        self
    }

    /// The component prefix, when this signature routes components.
    pub fn prefix(&self) -> Option<&str> {
        match &self.route {
            RouteKey::Component { prefix } => Some(prefix),
            RouteKey::Command { .. } => None,
        }
    }

    /// Mint a fresh view state for a new UI artifact of this family.
    pub fn state(&self) -> Result<ViewState, GatewayError> {
        let prefix = self.prefix().unwrap_or_default();
        Ok(ViewState::new(prefix, Arc::clone(&self.schema))?)
    }

    /// Rehydrate view state from a record token split off an inbound
    /// identifier.
    pub fn state_from_token(&self, token: &str) -> Result<ViewState, GatewayError> {
        let prefix = self.prefix().unwrap_or_default();
        Ok(ViewState::from_token(
            prefix,
            Arc::clone(&self.schema),
            token,
        )?)
    }
}

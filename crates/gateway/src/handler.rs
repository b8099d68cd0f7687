//! Handlers: signatures bound to callback logic.
//!
//! A callback returns a [`Reply`]: the immediate response body plus an
//! optional continuation task. The dispatcher sends the response within the
//! platform's acknowledgment window and schedules the continuation on the
//! host runtime, off the response path, behind its own error boundary.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use parley_codec::ViewState;

use crate::api::{MessagingError, MessagingPort};
use crate::envelope::{Interaction, InteractionResponse};
use crate::error::GatewayError;
use crate::route::ViewSignature;

/// Deferred work scheduled after the immediate response is sent. Failures
/// are caught by the dispatcher's continuation boundary and turned into a
/// user-visible follow-up; nothing here may assume the response channel
/// still exists.
pub type Continuation = BoxFuture<'static, anyhow::Result<()>>;

/// Follow-up capability bound to one interaction token, captured at defer
/// time. Valid for the platform's stated token window, not tied to this
/// process's lifetime.
#[derive(Clone)]
pub struct FollowUp {
    token: String,
    api: Arc<dyn MessagingPort>,
}

impl FollowUp {
    pub fn new(token: impl Into<String>, api: Arc<dyn MessagingPort>) -> Self {
        Self {
            token: token.into(),
            api,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn send(&self, body: serde_json::Value) -> Result<(), MessagingError> {
        self.api.create_followup(&self.token, body).await
    }

    pub async fn edit_original(&self, body: serde_json::Value) -> Result<(), MessagingError> {
        self.api.edit_original(&self.token, body).await
    }

    pub async fn delete_original(&self) -> Result<(), MessagingError> {
        self.api.delete_original(&self.token).await
    }
}

/// What a callback hands back to the dispatcher.
pub struct Reply {
    /// Passed through unmodified as the immediate HTTP response body.
    pub response: InteractionResponse,
    /// Optional deferred work; never awaited on the response path.
    pub continuation: Option<Continuation>,
}

impl Reply {
    /// Finish now; no deferred work.
    pub fn immediate(response: InteractionResponse) -> Self {
        Self {
            response,
            continuation: None,
        }
    }

    /// Acknowledge with a placeholder message and continue in the background.
    pub fn deferred(ephemeral: bool, continuation: Continuation) -> Self {
        Self {
            response: InteractionResponse::deferred(ephemeral),
            continuation: Some(continuation),
        }
    }

    /// Acknowledge a component interaction and continue in the background.
    pub fn deferred_update(continuation: Continuation) -> Self {
        Self {
            response: InteractionResponse::deferred_update(),
            continuation: Some(continuation),
        }
    }
}

/// Everything a callback sees for one interaction. Owned per event; nothing
/// is shared across requests.
pub struct InteractionContext {
    pub interaction: Interaction,
    /// Typed state decoded from the component identifier; `None` for
    /// command and autocomplete interactions.
    pub state: Option<ViewState>,
    api: Arc<dyn MessagingPort>,
}

impl InteractionContext {
    pub fn new(
        interaction: Interaction,
        state: Option<ViewState>,
        api: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            interaction,
            state,
            api,
        }
    }

    /// The decoded view state, or `MissingState` for stateless interactions.
    pub fn state(&self) -> Result<&ViewState, GatewayError> {
        self.state.as_ref().ok_or(GatewayError::MissingState)
    }

    /// Follow-up capability for this interaction's token.
    pub fn follow_up(&self) -> FollowUp {
        FollowUp::new(self.interaction.token.clone(), Arc::clone(&self.api))
    }
}

type RunFn =
    Arc<dyn Fn(InteractionContext) -> BoxFuture<'static, anyhow::Result<Reply>> + Send + Sync>;

type AutocompleteFn = Arc<
    dyn Fn(InteractionContext) -> BoxFuture<'static, anyhow::Result<InteractionResponse>>
        + Send
        + Sync,
>;

type GuildSignatureFn = Arc<dyn Fn(&str) -> Option<ViewSignature> + Send + Sync>;

/// A signature bound to its callbacks. Exactly one handler may exist per
/// routing key; the registry enforces that at construction.
#[derive(Clone)]
pub struct Handler {
    pub signature: ViewSignature,
    run: RunFn,
    autocomplete: Option<AutocompleteFn>,
    guild_signature: Option<GuildSignatureFn>,
}

impl Handler {
    pub fn new<F, Fut>(signature: ViewSignature, run: F) -> Self
    where
        F: Fn(InteractionContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<Reply>> + Send + 'static,
    {
        Self {
            signature,
            run: Arc::new(move |ctx| Box::pin(run(ctx))),
            autocomplete: None,
            guild_signature: None,
        }
    }

    /// Attach an autocomplete callback.
    pub fn with_autocomplete<F, Fut>(mut self, autocomplete: F) -> Self
    where
        F: Fn(InteractionContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<InteractionResponse>> + Send + 'static,
    {
        self.autocomplete = Some(Arc::new(move |ctx| Box::pin(autocomplete(ctx))));
        self
    }

    /// Attach a per-guild signature override, consulted by deployment
    /// tooling and by guild-scoped decodes.
    pub fn with_guild_signature<F>(mut self, guild_signature: F) -> Self
    where
        F: Fn(&str) -> Option<ViewSignature> + Send + Sync + 'static,
    {
        self.guild_signature = Some(Arc::new(guild_signature));
        self
    }

    /// The signature to use for an interaction from the given guild.
    pub fn signature_for(&self, guild_id: Option<&str>) -> ViewSignature {
        guild_id
            .and_then(|id| self.guild_signature.as_ref().and_then(|f| f(id)))
            .unwrap_or_else(|| self.signature.clone())
    }

    pub async fn run(&self, ctx: InteractionContext) -> anyhow::Result<Reply> {
        (self.run)(ctx).await
    }

    pub async fn run_autocomplete(
        &self,
        ctx: InteractionContext,
    ) -> anyhow::Result<InteractionResponse> {
        match &self.autocomplete {
            Some(callback) => callback(ctx).await,
            None => Err(GatewayError::UnknownView("autocomplete".to_string()).into()),
        }
    }

    pub fn has_autocomplete(&self) -> bool {
        self.autocomplete.is_some()
    }
}

//! The per-request dispatch state machine.
//!
//! verify → classify → route → decode state → invoke → respond. Every
//! classification, decode, or callback failure funnels through one
//! application-supplied error renderer that always produces a valid
//! response envelope; the dispatcher applies no retry policy. Deferred
//! continuations run on the host runtime with their own nested error
//! boundary, since no response channel remains once the immediate response
//! has been sent.

use std::sync::Arc;

use parley_codec::state::split_wire_id;

use crate::api::MessagingPort;
use crate::envelope::{Interaction, InteractionKind, InteractionResponse};
use crate::error::GatewayError;
use crate::handler::{FollowUp, InteractionContext, Reply};
use crate::registry::Registry;
use crate::verify::RequestVerifier;

/// Renders any dispatch failure as a user-visible response envelope.
pub type ErrorRenderer = Arc<dyn Fn(&anyhow::Error) -> InteractionResponse + Send + Sync>;

/// Outcome of one inbound request.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Signature verification failed; respond 401 with no body.
    Unauthorized,
    /// The immediate response body to send back.
    Response(InteractionResponse),
}

/// Routes one inbound event to exactly one handler.
pub struct Dispatcher {
    registry: Arc<Registry>,
    verifier: RequestVerifier,
    api: Arc<dyn MessagingPort>,
    render_error: ErrorRenderer,
    timeout_notice: Option<serde_json::Value>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<Registry>,
        verifier: RequestVerifier,
        api: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            registry,
            verifier,
            api,
            render_error: Arc::new(render_error_default),
            timeout_notice: None,
        }
    }

    /// Replace the default error renderer.
    pub fn with_error_renderer(mut self, render_error: ErrorRenderer) -> Self {
        self.render_error = render_error;
        self
    }

    /// Configure the follow-up body sent when an external watchdog signals
    /// that a deferred interaction expired.
    pub fn with_timeout_notice(mut self, body: serde_json::Value) -> Self {
        self.timeout_notice = Some(body);
        self
    }

    /// Handle one inbound request: the two auth headers plus the raw body.
    pub async fn handle(
        &self,
        signature_hex: &str,
        timestamp: &str,
        raw_body: &str,
    ) -> DispatchOutcome {
        if self
            .verifier
            .verify(timestamp, raw_body, signature_hex)
            .is_err()
        {
            tracing::warn!("request signature mismatch, failing closed");
            return DispatchOutcome::Unauthorized;
        }

        let response = match self.dispatch(raw_body).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "dispatch failed, rendering error response");
                (self.render_error)(&error)
            }
        };
        DispatchOutcome::Response(response)
    }

    /// Fallback follow-up for an interaction whose deferred work never
    /// finished; driven by an external watchdog.
    pub async fn notify_timeout(&self, token: &str) {
        if let Some(notice) = &self.timeout_notice {
            if let Err(error) = self.api.create_followup(token, notice.clone()).await {
                tracing::error!(error = %error, "failed to deliver timeout notice");
            }
        }
    }

    async fn dispatch(&self, raw_body: &str) -> anyhow::Result<InteractionResponse> {
        let interaction: Interaction = serde_json::from_str(raw_body)
            .map_err(|e| GatewayError::MalformedEnvelope(e.to_string()))?;

        match interaction.kind {
            InteractionKind::Ping => {
                tracing::debug!("heartbeat");
                Ok(InteractionResponse::pong())
            }
            InteractionKind::Command => {
                let handler = self.resolve_command(&interaction)?;
                self.check_guild(&interaction, handler)?;
                let token = interaction.token.clone();
                let ctx = InteractionContext::new(interaction, None, Arc::clone(&self.api));
                let reply = handler.run(ctx).await?;
                Ok(self.finish(reply, token))
            }
            InteractionKind::Autocomplete => {
                // No defer capability on the autocomplete path.
                let handler = self.resolve_command(&interaction)?;
                let ctx = InteractionContext::new(interaction, None, Arc::clone(&self.api));
                handler.run_autocomplete(ctx).await
            }
            InteractionKind::Component | InteractionKind::ModalSubmit => {
                let custom_id = interaction
                    .data()
                    .custom_id
                    .clone()
                    .ok_or(GatewayError::MissingState)?;
                let (prefix, token) = split_wire_id(&custom_id).map_err(GatewayError::from)?;
                let handler = self.registry.find_prefix(&prefix)?;
                self.check_guild(&interaction, handler)?;
                let signature = handler.signature_for(interaction.guild_id.as_deref());
                let state = signature.state_from_token(&token)?;
                tracing::debug!(prefix = %prefix, "component state decoded");
                let interaction_token = interaction.token.clone();
                let ctx =
                    InteractionContext::new(interaction, Some(state), Arc::clone(&self.api));
                let reply = handler.run(ctx).await?;
                Ok(self.finish(reply, interaction_token))
            }
        }
    }

    fn resolve_command<'a>(
        &'a self,
        interaction: &Interaction,
    ) -> Result<&'a crate::handler::Handler, GatewayError> {
        let data = interaction.data();
        let name = data
            .name
            .as_deref()
            .ok_or_else(|| GatewayError::MalformedEnvelope("command without name".to_string()))?;
        let kind = data.kind.unwrap_or(crate::envelope::CommandKind::ChatInput);
        tracing::debug!(command = %name, "routing command");
        self.registry.find_command(name, kind)
    }

    fn check_guild(
        &self,
        interaction: &Interaction,
        handler: &crate::handler::Handler,
    ) -> Result<(), GatewayError> {
        let signature = handler.signature_for(interaction.guild_id.as_deref());
        if signature.guild_only && interaction.guild_id.is_none() {
            return Err(GatewayError::GuildOnly);
        }
        Ok(())
    }

    /// Send-side of a reply: schedule the continuation on the host runtime
    /// behind its own error boundary, pass the immediate response through
    /// unmodified. The continuation is never awaited on the response path.
    fn finish(&self, reply: Reply, token: String) -> InteractionResponse {
        if let Some(continuation) = reply.continuation {
            let follow_up = FollowUp::new(token, Arc::clone(&self.api));
            let render_error = Arc::clone(&self.render_error);
            tokio::spawn(async move {
                if let Err(error) = continuation.await {
                    tracing::error!(error = %error, "deferred continuation failed");
                    let response = render_error(&error);
                    if let Some(body) = response.data {
                        if let Err(send_error) = follow_up.send(body).await {
                            tracing::error!(
                                error = %send_error,
                                "failed to surface continuation failure"
                            );
                        }
                    }
                }
            });
        }
        reply.response
    }
}

/// Default error boundary: known routing/codec failures become friendly
/// ephemeral messages, everything else renders generically. Always yields a
/// valid envelope.
fn render_error_default(error: &anyhow::Error) -> InteractionResponse {
    match error.downcast_ref::<GatewayError>() {
        Some(gateway_error) if gateway_error.is_stale_component() => {
            InteractionResponse::ephemeral_text(
                "This component is outdated. Re-run the command to get a fresh one.",
            )
        }
        Some(GatewayError::GuildOnly) => {
            InteractionResponse::ephemeral_text("This command can only be used in a server.")
        }
        _ => InteractionResponse::ephemeral_text("Something went wrong. Please try again."),
    }
}

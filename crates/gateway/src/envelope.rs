//! Interaction envelope DTOs.
//!
//! The platform discriminates event kinds with small integers; these DTOs
//! keep that wire shape (`type` fields deserialized via `try_from = "u8"`)
//! while the rest of the platform's domain model - message bodies, members,
//! options - stays as loose `serde_json::Value`, since formatting and the
//! user model are out of scope here.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Inbound event kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub enum InteractionKind {
    Ping,
    Command,
    Component,
    Autocomplete,
    ModalSubmit,
}

impl TryFrom<u8> for InteractionKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(InteractionKind::Ping),
            2 => Ok(InteractionKind::Command),
            3 => Ok(InteractionKind::Component),
            4 => Ok(InteractionKind::Autocomplete),
            5 => Ok(InteractionKind::ModalSubmit),
            other => Err(format!("unknown interaction type: {other}")),
        }
    }
}

/// Command flavor: slash command or a context-menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CommandKind {
    ChatInput,
    User,
    Message,
}

impl TryFrom<u8> for CommandKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CommandKind::ChatInput),
            2 => Ok(CommandKind::User),
            3 => Ok(CommandKind::Message),
            other => Err(format!("unknown command type: {other}")),
        }
    }
}

impl From<CommandKind> for u8 {
    fn from(value: CommandKind) -> Self {
        match value {
            CommandKind::ChatInput => 1,
            CommandKind::User => 2,
            CommandKind::Message => 3,
        }
    }
}

/// The `data` payload of a command/component/modal interaction.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct InteractionData {
    /// Command name, for command and autocomplete interactions.
    #[serde(default)]
    pub name: Option<String>,
    /// Command kind discriminator.
    #[serde(rename = "type", default)]
    pub kind: Option<CommandKind>,
    /// Packed component identifier, for component and modal interactions.
    #[serde(default)]
    pub custom_id: Option<String>,
    /// Command options / focused autocomplete option.
    #[serde(default)]
    pub options: Vec<serde_json::Value>,
    /// Select-menu selections.
    #[serde(default)]
    pub values: Vec<String>,
    /// Modal components, opaque here.
    #[serde(default)]
    pub components: Option<serde_json::Value>,
}

/// One inbound event.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    /// Token for follow-up/edit/delete calls; valid for the platform's
    /// stated window, independent of this process's lifetime.
    pub token: String,
    pub application_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub member: Option<serde_json::Value>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl Interaction {
    pub fn data(&self) -> &InteractionData {
        static EMPTY: InteractionData = InteractionData {
            name: None,
            kind: None,
            custom_id: None,
            options: Vec::new(),
            values: Vec::new(),
            components: None,
        };
        self.data.as_ref().unwrap_or(&EMPTY)
    }
}

/// Outbound response kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ResponseKind {
    Pong,
    ChannelMessage,
    DeferredChannelMessage,
    DeferredUpdateMessage,
    UpdateMessage,
    AutocompleteResult,
    Modal,
}

impl From<ResponseKind> for u8 {
    fn from(value: ResponseKind) -> Self {
        match value {
            ResponseKind::Pong => 1,
            ResponseKind::ChannelMessage => 4,
            ResponseKind::DeferredChannelMessage => 5,
            ResponseKind::DeferredUpdateMessage => 6,
            ResponseKind::UpdateMessage => 7,
            ResponseKind::AutocompleteResult => 8,
            ResponseKind::Modal => 9,
        }
    }
}

/// Message flag marking a response visible only to the invoking user.
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

/// The immediate HTTP response body.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl InteractionResponse {
    /// Heartbeat acknowledgment.
    pub fn pong() -> Self {
        Self {
            kind: ResponseKind::Pong,
            data: None,
        }
    }

    /// New channel message.
    pub fn message(body: serde_json::Value) -> Self {
        Self {
            kind: ResponseKind::ChannelMessage,
            data: Some(body),
        }
    }

    /// Ephemeral plain-text message.
    pub fn ephemeral_text(text: impl Into<String>) -> Self {
        Self::message(json!({ "content": text.into(), "flags": EPHEMERAL_FLAG }))
    }

    /// Edit of the message the component lives on.
    pub fn update(body: serde_json::Value) -> Self {
        Self {
            kind: ResponseKind::UpdateMessage,
            data: Some(body),
        }
    }

    /// Placeholder acknowledging a command while a continuation works.
    pub fn deferred(ephemeral: bool) -> Self {
        Self {
            kind: ResponseKind::DeferredChannelMessage,
            data: ephemeral.then(|| json!({ "flags": EPHEMERAL_FLAG })),
        }
    }

    /// Placeholder acknowledging a component while a continuation works.
    pub fn deferred_update() -> Self {
        Self {
            kind: ResponseKind::DeferredUpdateMessage,
            data: None,
        }
    }

    /// Autocomplete choice list.
    pub fn autocomplete(choices: serde_json::Value) -> Self {
        Self {
            kind: ResponseKind::AutocompleteResult,
            data: Some(json!({ "choices": choices })),
        }
    }

    /// Modal prompt.
    pub fn modal(body: serde_json::Value) -> Self {
        Self {
            kind: ResponseKind::Modal,
            data: Some(body),
        }
    }
}

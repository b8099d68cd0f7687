//! Handler registry: routing keys resolved to exactly one handler.
//!
//! Built once from the full handler list. Duplicate routing keys are a
//! build-time configuration error; lookups at request time either resolve
//! to exactly one handler or fail `UnknownView`.

use std::collections::HashMap;

use crate::envelope::CommandKind;
use crate::error::GatewayError;
use crate::handler::Handler;

/// Immutable routing table over the registered handlers.
pub struct Registry {
    handlers: Vec<Handler>,
    by_command: HashMap<(String, CommandKind), usize>,
    by_prefix: HashMap<String, usize>,
}

impl Registry {
    /// Build the registry, including experimental handlers.
    pub fn new(handlers: Vec<Handler>) -> Result<Self, GatewayError> {
        Self::with_experiments(handlers, true)
    }

    /// Build the registry, dropping experimental handlers when
    /// `enable_experiments` is false.
    pub fn with_experiments(
        handlers: Vec<Handler>,
        enable_experiments: bool,
    ) -> Result<Self, GatewayError> {
        let handlers: Vec<Handler> = handlers
            .into_iter()
            .filter(|h| enable_experiments || !h.signature.experimental)
            .collect();

        let mut by_command = HashMap::new();
        let mut by_prefix = HashMap::new();
        for (at, handler) in handlers.iter().enumerate() {
            match &handler.signature.route {
                crate::route::RouteKey::Command { name, kind } => {
                    if by_command.insert((name.clone(), *kind), at).is_some() {
                        return Err(GatewayError::DuplicateCommand {
                            name: name.clone(),
                            kind: *kind,
                        });
                    }
                }
                crate::route::RouteKey::Component { prefix } => {
                    if !prefix.is_empty() && by_prefix.insert(prefix.clone(), at).is_some() {
                        return Err(GatewayError::DuplicatePrefix(prefix.clone()));
                    }
                }
            }
        }
        Ok(Self {
            handlers,
            by_command,
            by_prefix,
        })
    }

    /// Resolve a command interaction's (name, kind) pair.
    pub fn find_command(&self, name: &str, kind: CommandKind) -> Result<&Handler, GatewayError> {
        self.by_command
            .get(&(name.to_string(), kind))
            .map(|&at| &self.handlers[at])
            .ok_or_else(|| GatewayError::UnknownView(name.to_string()))
    }

    /// Resolve a component identifier's routing prefix.
    pub fn find_prefix(&self, prefix: &str) -> Result<&Handler, GatewayError> {
        self.by_prefix
            .get(prefix)
            .map(|&at| &self.handlers[at])
            .ok_or_else(|| GatewayError::UnknownView(prefix.to_string()))
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }
}

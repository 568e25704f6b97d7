//! Command orchestration
//!
//! One command flows through: wake phrase stripped → intent routed →
//! capability dispatched or free-form reply generated → reply text. Every path
//! ends in a reply; errors are turned into a short apology.

use std::sync::Arc;

use crate::capability::{CapabilityRegistry, CommandRunner};
use crate::config::Config;
use crate::oracle::{ChatCompletionsOracle, Oracle};
use crate::prompt::persona_prompt;
use crate::router::{IntentRouter, RoutedAction};
use crate::wake::WakePhrase;
use crate::{Error, Result};

/// Reply when nothing is left after the wake phrase
pub const CLARIFY_REPLY: &str = "¿En qué puedo ayudarte?";

/// How a single command was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Nothing to do after stripping the wake phrase
    Clarify,
    /// A capability handled the command
    Dispatched {
        capability: String,
        action: String,
        reply: String,
    },
    /// The routed capability is not registered
    Unavailable { capability: String },
    /// The oracle answered directly
    FreeForm { reply: String },
    /// Routing, dispatch or generation failed
    Failed { error: String },
}

impl CommandOutcome {
    /// User-facing reply text
    #[must_use]
    pub fn into_reply(self) -> String {
        match self {
            Self::Clarify => CLARIFY_REPLY.to_string(),
            Self::Dispatched { reply, .. } | Self::FreeForm { reply } => reply,
            Self::Unavailable { capability } => {
                format!("La capacidad '{capability}' no está disponible")
            }
            Self::Failed { error } => format!("Lo siento, hubo un error: {error}"),
        }
    }
}

/// Routes commands to capabilities or to the free-form responder
pub struct Assistant {
    wake: WakePhrase,
    router: IntentRouter,
    registry: Arc<CapabilityRegistry>,
    oracle: Arc<dyn Oracle>,
    system_prompt: String,
}

impl Assistant {
    /// Create an assistant
    ///
    /// The registry is fixed for the assistant's lifetime; the persona prompt
    /// is rendered once from it.
    #[must_use]
    pub fn new(wake_word: &str, registry: Arc<CapabilityRegistry>, oracle: Arc<dyn Oracle>) -> Self {
        let wake = WakePhrase::new(wake_word);
        let system_prompt = persona_prompt(
            wake.word(),
            &registry.manifest(),
            registry.get("video").is_some(),
        );

        tracing::info!(
            wake_word = wake.word(),
            capabilities = ?registry.names(),
            "assistant ready"
        );

        Self {
            wake,
            router: IntentRouter::new(oracle.clone()),
            registry,
            oracle,
            system_prompt,
        }
    }

    /// Build an assistant from validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or a client cannot be built
    pub async fn from_config(config: &Config, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        config.validate()?;

        let oracle = ChatCompletionsOracle::new(config.api_key()?, config.llm.chat_settings())?;
        let registry = CapabilityRegistry::from_config(&config.capabilities, runner).await?;

        Ok(Self::new(
            &config.wake_word,
            Arc::new(registry),
            Arc::new(oracle),
        ))
    }

    /// Wake phrase in use
    #[must_use]
    pub const fn wake(&self) -> &WakePhrase {
        &self.wake
    }

    /// Registered capabilities
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Persona system prompt sent with free-form requests
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Process a command and return the reply text
    pub async fn process_command(&self, raw: &str) -> String {
        self.handle(raw).await.into_reply()
    }

    /// Process a command and report how it was resolved
    pub async fn handle(&self, raw: &str) -> CommandOutcome {
        let command = self.wake.strip(raw);
        if command.is_empty() {
            tracing::debug!("empty command after wake phrase");
            return CommandOutcome::Clarify;
        }

        tracing::info!(command, "processing command");

        match self.route(command).await {
            Ok(outcome) => outcome,
            Err(Error::CapabilityNotFound(capability)) => {
                tracing::warn!(capability = %capability, "routed to unregistered capability");
                CommandOutcome::Unavailable { capability }
            }
            Err(e) => {
                tracing::error!(error = %e, "command failed");
                CommandOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn route(&self, command: &str) -> Result<CommandOutcome> {
        let descriptors = self.registry.descriptors();
        match self.router.classify(command, &descriptors).await? {
            Some(routed) => self.dispatch(routed).await,
            None => {
                tracing::debug!("no capability needed, generating reply");
                let reply = self.oracle.complete(&self.system_prompt, command).await?;
                Ok(CommandOutcome::FreeForm { reply })
            }
        }
    }

    /// Invoke the routed capability action
    ///
    /// # Errors
    ///
    /// Returns `CapabilityNotFound` if the capability is not registered
    pub async fn dispatch(&self, routed: RoutedAction) -> Result<CommandOutcome> {
        let RoutedAction {
            capability,
            action,
            parameters,
        } = routed;

        let provider = self.registry.require(&capability)?;

        tracing::info!(capability = %capability, action = %action, "dispatching");
        let reply = provider.invoke(&action, &parameters).await;
        tracing::debug!(reply = %reply, "capability replied");

        Ok(CommandOutcome::Dispatched {
            capability,
            action,
            reply,
        })
    }
}

//! Capability providers
//!
//! A capability is a named, self-describing bundle of actions (device control,
//! music control, video search). The orchestrator only sees the [`Capability`]
//! trait; the side effects of each action live inside the provider.
//!
//! Requested action names come from a language model and are not guaranteed to
//! be canonical, so providers resolve them through an [`ActionTable`] of
//! keyword sets instead of exact comparison.

pub mod mobile;
pub mod music;
mod process;
pub mod video;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

pub use mobile::{DeviceBackend, MobileCapability};
pub use music::{MusicCapability, MusicService, SpotifyClient};
pub use process::{CommandOutput, CommandRunner, SystemRunner};
#[cfg(test)]
pub(crate) use process::testing;
pub use video::VideoCapability;

use crate::config::CapabilitiesConfig;
use crate::{Error, Result};

/// Action parameters as produced by the intent router
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// Line rendered in place of the manifest when nothing is registered
pub const EMPTY_MANIFEST: &str = "Ninguna herramienta disponible";

/// Description of a single invocable action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    /// Action identifier (e.g. "open_app")
    pub name: String,

    /// Human-readable description shown to the classifier
    pub description: String,

    /// Parameter name to type hint, in declaration order
    pub parameters: Vec<(String, String)>,
}

impl ActionDescriptor {
    /// Create an action without parameters
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a parameter with its type hint
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, hint: impl Into<String>) -> Self {
        self.parameters.push((name.into(), hint.into()));
        self
    }
}

/// Static self-description of a capability provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityDescriptor {
    /// Unique capability name (e.g. "mobile")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Actions in priority order
    pub actions: Vec<ActionDescriptor>,
}

impl CapabilityDescriptor {
    /// Create a descriptor with no actions
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            actions: Vec::new(),
        }
    }

    /// Append an action
    ///
    /// Action names must be unique within a descriptor.
    #[must_use]
    pub fn action(mut self, action: ActionDescriptor) -> Self {
        debug_assert!(
            self.actions.iter().all(|a| a.name != action.name),
            "duplicate action {}",
            action.name
        );
        self.actions.push(action);
        self
    }

    /// Look up an action by exact name
    #[must_use]
    pub fn find_action(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|a| a.name == name)
    }
}

/// Ordered keyword match table used to resolve loosely-named actions
///
/// Rules are evaluated in order; the first rule with a keyword contained in
/// the lower-cased action name wins. Callers handle `None` as their default
/// branch.
pub struct ActionTable<A: 'static> {
    rules: &'static [(&'static [&'static str], A)],
}

impl<A: Copy> ActionTable<A> {
    /// Build a table from `(keywords, action)` rules in priority order
    #[must_use]
    pub const fn new(rules: &'static [(&'static [&'static str], A)]) -> Self {
        Self { rules }
    }

    /// Resolve a requested action name to a tagged action
    #[must_use]
    pub fn resolve(&self, requested: &str) -> Option<A> {
        let needle = requested.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.rules
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| needle.contains(k)))
            .map(|(_, action)| *action)
    }
}

/// A named bundle of invocable actions
#[async_trait]
pub trait Capability: Send + Sync {
    /// Static self-description
    fn describe(&self) -> &CapabilityDescriptor;

    /// Capability name, taken from the descriptor
    fn name(&self) -> &str {
        &self.describe().name
    }

    /// Execute an action and return a human-readable result
    ///
    /// Provider-local failures (unknown action, missing parameter, backend
    /// errors) are reported in the returned text, never as an `Err`.
    async fn invoke(&self, action: &str, parameters: &Parameters) -> String;
}

/// Registered capability providers, keyed by name
///
/// Built once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct CapabilityRegistry {
    providers: Vec<Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from the enabled capabilities
    ///
    /// Music is registered even without credentials so the user is told to
    /// configure them instead of being told it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if a music client cannot be built from the credentials
    pub async fn from_config(
        config: &CapabilitiesConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        let mut registry = Self::new();

        if config.mobile {
            let mobile = MobileCapability::detect(runner.clone()).await;
            tracing::info!(backend = ?mobile.backend(), "mobile capability enabled");
            registry.register(Arc::new(mobile))?;
        }

        if config.music.enabled {
            let service: Option<Arc<dyn MusicService>> = match &config.music.credentials {
                Some(creds) => Some(Arc::new(SpotifyClient::new(
                    creds.client_id.clone(),
                    SecretString::from(creds.client_secret.expose_secret().to_string()),
                    SecretString::from(creds.refresh_token.expose_secret().to_string()),
                )?)),
                None => {
                    tracing::warn!("music capability enabled without Spotify credentials");
                    None
                }
            };
            registry.register(Arc::new(MusicCapability::new(service)))?;
        }

        if config.video {
            registry.register(Arc::new(VideoCapability::new(runner)))?;
        }

        tracing::info!(capabilities = ?registry.names(), "capabilities registered");
        Ok(registry)
    }

    /// Register a provider
    ///
    /// # Errors
    ///
    /// Returns error if a provider with the same name is already registered
    pub fn register(&mut self, provider: Arc<dyn Capability>) -> Result<()> {
        let name = provider.name();
        if self.get(name).is_some() {
            return Err(Error::DuplicateCapability(name.to_string()));
        }

        tracing::debug!(capability = name, "registered capability");
        self.providers.push(provider);
        Ok(())
    }

    /// Look up a provider by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Capability>> {
        self.providers.iter().find(|p| p.name() == name)
    }

    /// Look up a provider, failing if it is not registered
    ///
    /// # Errors
    ///
    /// Returns `CapabilityNotFound` if no provider has this name
    pub fn require(&self, name: &str) -> Result<&Arc<dyn Capability>> {
        self.get(name)
            .ok_or_else(|| Error::CapabilityNotFound(name.to_string()))
    }

    /// Descriptors of every registered provider, in registration order
    #[must_use]
    pub fn descriptors(&self) -> Vec<&CapabilityDescriptor> {
        self.providers.iter().map(|p| p.describe()).collect()
    }

    /// Registered capability names, in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Number of registered providers
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Render the capability manifest for prompts
    #[must_use]
    pub fn manifest(&self) -> String {
        render_manifest(&self.descriptors())
    }
}

/// Render one `- {capability}.{action}: {description}` line per action
#[must_use]
pub fn render_manifest(descriptors: &[&CapabilityDescriptor]) -> String {
    let lines: Vec<String> = descriptors
        .iter()
        .flat_map(|cap| {
            cap.actions
                .iter()
                .map(move |a| format!("- {}.{}: {}", cap.name, a.name, a.description))
        })
        .collect();

    if lines.is_empty() {
        EMPTY_MANIFEST.to_string()
    } else {
        lines.join("\n")
    }
}

/// Read a string parameter, accepting numbers and booleans as text
#[must_use]
pub fn param_str(params: &Parameters, key: &str) -> Option<String> {
    match params.get(key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read an integer parameter, accepting numeric strings
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn param_i64(params: &Parameters, key: &str) -> Option<i64> {
    match params.get(key)? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a boolean flag, accepting "true"/"false" strings
#[must_use]
pub fn param_bool(params: &Parameters, key: &str) -> Option<bool> {
    match params.get(key)? {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Open,
        Notify,
    }

    static TABLE: ActionTable<Tag> = ActionTable::new(&[
        (&["open", "launch", "abrir"], Tag::Open),
        (&["notif", "alerta"], Tag::Notify),
    ]);

    struct Echo {
        descriptor: CapabilityDescriptor,
    }

    #[async_trait]
    impl Capability for Echo {
        fn describe(&self) -> &CapabilityDescriptor {
            &self.descriptor
        }

        async fn invoke(&self, action: &str, _parameters: &Parameters) -> String {
            format!("{}:{action}", self.descriptor.name)
        }
    }

    fn echo(name: &str) -> Arc<dyn Capability> {
        Arc::new(Echo {
            descriptor: CapabilityDescriptor::new(name, "echo")
                .action(ActionDescriptor::new("ping", "Responde pong"))
                .action(ActionDescriptor::new("say", "Repite").param("text", "string")),
        })
    }

    #[test]
    fn action_table_matches_by_keyword_in_priority_order() {
        assert_eq!(TABLE.resolve("open_app"), Some(Tag::Open));
        assert_eq!(TABLE.resolve("  LAUNCH "), Some(Tag::Open));
        assert_eq!(TABLE.resolve("send_notification"), Some(Tag::Notify));
        assert_eq!(TABLE.resolve("open_notification"), Some(Tag::Open));
        assert_eq!(TABLE.resolve("dance"), None);
        assert_eq!(TABLE.resolve(""), None);
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let mut registry = CapabilityRegistry::new();
        registry.register(echo("mobile")).unwrap();

        let err = registry.register(echo("mobile")).unwrap_err();
        assert!(matches!(err, Error::DuplicateCapability(name) if name == "mobile"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_require_reports_missing_capability() {
        let registry = CapabilityRegistry::new();
        let err = registry.require("music").err().unwrap();
        assert!(matches!(err, Error::CapabilityNotFound(name) if name == "music"));
    }

    #[test]
    fn manifest_lists_every_action() {
        let mut registry = CapabilityRegistry::new();
        registry.register(echo("mobile")).unwrap();
        registry.register(echo("video")).unwrap();

        assert_eq!(
            registry.manifest(),
            "- mobile.ping: Responde pong\n- mobile.say: Repite\n- video.ping: Responde pong\n- video.say: Repite"
        );
        assert_eq!(registry.names(), vec!["mobile", "video"]);
    }

    #[tokio::test]
    async fn from_config_registers_enabled_capabilities() {
        use crate::config::MusicConfig;

        let config = CapabilitiesConfig {
            mobile: true,
            video: true,
            music: MusicConfig {
                enabled: true,
                credentials: None,
            },
        };
        let runner = Arc::new(testing::ScriptedRunner::succeeding());

        let registry = CapabilityRegistry::from_config(&config, runner).await.unwrap();
        assert_eq!(registry.names(), vec!["mobile", "music", "video"]);

        let reply = registry
            .require("music")
            .unwrap()
            .invoke("current", &Parameters::new())
            .await;
        assert!(reply.contains("no está autenticado"));
    }

    #[tokio::test]
    async fn from_config_skips_disabled_capabilities() {
        let config = CapabilitiesConfig {
            mobile: false,
            video: false,
            music: crate::config::MusicConfig::default(),
        };
        let runner = Arc::new(testing::ScriptedRunner::succeeding());

        let registry = CapabilityRegistry::from_config(&config, runner).await.unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_manifest_renders_sentinel() {
        assert_eq!(CapabilityRegistry::new().manifest(), EMPTY_MANIFEST);
    }

    #[test]
    fn parameter_readers_are_lenient() {
        let params = json!({
            "duration": "750",
            "level": 42.6,
            "name": "  chrome ",
            "blank": "   ",
            "auto_play": "true",
        });
        let params = params.as_object().unwrap();

        assert_eq!(param_i64(params, "duration"), Some(750));
        assert_eq!(param_i64(params, "level"), Some(43));
        assert_eq!(param_str(params, "name").as_deref(), Some("chrome"));
        assert_eq!(param_str(params, "blank"), None);
        assert_eq!(param_bool(params, "auto_play"), Some(true));
        assert_eq!(param_str(params, "missing"), None);
    }
}

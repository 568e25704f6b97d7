//! Intent routing
//!
//! Asks the oracle whether a command maps to a registered capability action
//! and, if so, which one and with what parameters.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;

use crate::capability::{CapabilityDescriptor, Parameters, render_manifest};
use crate::oracle::Oracle;
use crate::prompt::{CLASSIFIER_SYSTEM_PROMPT, classification_prompt};
use crate::Result;

/// First `{` through last `}`, across lines
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// A classified capability call
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedAction {
    /// Registered capability name
    pub capability: String,
    /// Requested action name (may be loosely phrased)
    pub action: String,
    /// Extracted parameters
    pub parameters: Parameters,
}

/// JSON shape the classifier is asked to produce
///
/// Older prompts used `requires_mcp`/`mcp`/`params`; both spellings are read.
#[derive(Debug, Deserialize)]
struct Classification {
    #[serde(default, alias = "requires_mcp")]
    requires_capability: Option<bool>,
    #[serde(default, alias = "mcp")]
    capability: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default, alias = "params")]
    parameters: Option<Parameters>,
}

/// Classifies commands against the available capabilities
pub struct IntentRouter {
    oracle: Arc<dyn Oracle>,
}

impl IntentRouter {
    /// Create a router backed by `oracle`
    #[must_use]
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Classify `text`
    ///
    /// Returns `Ok(None)` when no capability is needed, including when the
    /// oracle's reply cannot be parsed.
    ///
    /// # Errors
    ///
    /// Returns error if the oracle call itself fails
    pub async fn classify(
        &self,
        text: &str,
        available: &[&CapabilityDescriptor],
    ) -> Result<Option<RoutedAction>> {
        if available.iter().all(|c| c.actions.is_empty()) {
            tracing::debug!("no capabilities registered, skipping classification");
            return Ok(None);
        }

        let manifest = render_manifest(available);
        let prompt = classification_prompt(text, &manifest);
        let reply = self
            .oracle
            .complete(CLASSIFIER_SYSTEM_PROMPT, &prompt)
            .await?;

        let routed = parse_classification(&reply);
        tracing::debug!(?routed, "classification result");
        Ok(routed)
    }
}

/// Extract a routed action from a classifier reply
///
/// Tolerates prose around the JSON object. Anything unparseable, or a reply
/// that does not require a capability, yields `None`.
#[must_use]
pub fn parse_classification(reply: &str) -> Option<RoutedAction> {
    let Some(found) = JSON_OBJECT.find(reply.trim()) else {
        tracing::debug!("classifier reply has no JSON object");
        return None;
    };

    let parsed: Classification = match serde_json::from_str(found.as_str()) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(error = %e, "classifier reply is not valid JSON");
            return None;
        }
    };

    if !parsed.requires_capability.unwrap_or(false) {
        return None;
    }

    let mut capability = parsed.capability.unwrap_or_default().trim().to_string();
    let mut action = parsed.action.unwrap_or_default().trim().to_string();

    // "mobile.notify" in the capability field carries the action too
    if let Some(dot) = capability.find('.') {
        let suffix = capability.split_off(dot + 1);
        capability.truncate(dot);
        if action.is_empty() {
            action = suffix;
        }
    }

    Some(RoutedAction {
        capability,
        action,
        parameters: parsed.parameters.unwrap_or_default(),
    })
}

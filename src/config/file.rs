//! TOML configuration file loading
//!
//! Supports `~/.config/pocket/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PocketConfigFile {
    /// Assistant identity
    #[serde(default)]
    pub assistant: AssistantFileConfig,

    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice input/output
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Capability toggles and credentials
    #[serde(default)]
    pub capabilities: CapabilitiesFileConfig,
}

/// `[assistant]` section
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AssistantFileConfig {
    /// Base wake word (e.g. "asistente")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_word: Option<String>,

    /// Speech recognition language code (e.g. "es")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// `[llm]` section
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LlmFileConfig {
    /// Provider ("groq", "openai", "openrouter")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Model identifier (e.g. "llama-3.3-70b-versatile")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible API base, without the `/chat/completions` suffix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// `[voice]` section
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VoiceFileConfig {
    /// Start in voice mode without `--voice`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Whisper model used for transcription
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stt_model: Option<String>,

    /// Seconds of audio recorded per utterance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_secs: Option<u64>,
}

/// `[capabilities.*]` sections
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CapabilitiesFileConfig {
    #[serde(default)]
    pub mobile: CapabilityToggle,

    #[serde(default)]
    pub music: MusicFileConfig,

    #[serde(default)]
    pub video: CapabilityToggle,
}

/// Simple capability toggle
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CapabilityToggle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// `[capabilities.music]` section
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MusicFileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Spotify application client ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Long-lived OAuth refresh token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Load the TOML config file from `path`
///
/// Returns `PocketConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file(path: &Path) -> PocketConfigFile {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return PocketConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                PocketConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            PocketConfigFile::default()
        }
    }
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the content is not valid TOML for this schema
pub fn parse_config(content: &str) -> crate::Result<PocketConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Return the config file path: `~/.config/pocket/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("pocket").join("config.toml"))
}

//! Configuration management for the assistant

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::oracle::ChatSettings;
use crate::{Error, Result};

use file::PocketConfigFile;

/// Default wake word
pub const DEFAULT_WAKE_WORD: &str = "asistente";

/// Default speech recognition language
pub const DEFAULT_LANGUAGE: &str = "es";

/// Default Whisper model for transcription
pub const DEFAULT_STT_MODEL: &str = "whisper-large-v3-turbo";

/// Marker left in the sample config for keys the user must fill in
const PLACEHOLDER_MARKER: &str = "TU_";

/// Assistant configuration
#[derive(Debug)]
pub struct Config {
    /// Base wake word, lower-cased
    pub wake_word: String,

    /// Language code for transcription and replies
    pub language: String,

    /// LLM oracle configuration
    pub llm: LlmConfig,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// Capability toggles
    pub capabilities: CapabilitiesConfig,
}

/// Supported OpenAI-compatible LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Groq,
    OpenAi,
    OpenRouter,
}

impl LlmProvider {
    /// Parse a provider name, case-insensitively
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "groq" => Some(Self::Groq),
            "openai" => Some(Self::OpenAi),
            "openrouter" => Some(Self::OpenRouter),
            _ => None,
        }
    }

    /// Canonical lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAi => "openai",
            Self::OpenRouter => "openrouter",
        }
    }

    /// Environment variable holding this provider's API key
    #[must_use]
    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    /// API base URL
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    /// Model used when none is configured
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Groq => "llama-3.3-70b-versatile",
            Self::OpenAi => "gpt-4o-mini",
            Self::OpenRouter => "meta-llama/llama-3.3-70b-instruct",
        }
    }
}

/// LLM oracle configuration
#[derive(Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,

    /// Model identifier
    pub model: String,

    /// API key, `None` if not configured
    pub api_key: Option<SecretString>,

    /// API base URL without trailing slash
    pub base_url: String,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Request timeout
    pub timeout: Duration,
}

impl LlmConfig {
    /// Chat completions endpoint
    #[must_use]
    pub fn chat_endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Whisper-compatible transcription endpoint
    #[must_use]
    pub fn transcription_endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    /// Request settings for the chat oracle
    #[must_use]
    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            endpoint: self.chat_endpoint(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.timeout,
        }
    }
}

/// Voice input/output configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Start in voice mode by default
    pub enabled: bool,

    /// Whisper model for transcription
    pub stt_model: String,

    /// Recording length per utterance
    pub record_duration: Duration,
}

/// Which capabilities are registered at startup
#[derive(Debug)]
pub struct CapabilitiesConfig {
    pub mobile: bool,
    pub video: bool,
    pub music: MusicConfig,
}

/// Music capability configuration
#[derive(Debug, Default)]
pub struct MusicConfig {
    pub enabled: bool,

    /// Spotify credentials, `None` if any part is missing
    pub credentials: Option<SpotifyCredentials>,
}

/// Spotify OAuth application credentials plus a refresh token
#[derive(Debug)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
}

impl Config {
    /// Load configuration from `path` (or the standard location) and the process environment
    ///
    /// Precedence is env > TOML > default. The result is not validated; call
    /// [`Config::validate`] before building the oracle.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .or_else(file::config_file_path)
            .unwrap_or_else(|| PathBuf::from("config.toml"));

        let fc = file::load_config_file(&path);
        Self::resolve(fc, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with an environment lookup
    pub fn resolve(fc: PocketConfigFile, env_lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| env_lookup(key).filter(|v| !v.trim().is_empty());

        let wake_word = env("POCKET_WAKE_WORD")
            .or(fc.assistant.wake_word)
            .unwrap_or_else(|| DEFAULT_WAKE_WORD.to_string())
            .trim()
            .to_lowercase();

        let language = fc
            .assistant
            .language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        // LLM (env > toml > provider default)
        let provider = fc
            .llm
            .provider
            .as_deref()
            .and_then(|name| {
                let parsed = LlmProvider::parse(name);
                if parsed.is_none() {
                    tracing::warn!(provider = name, "unknown LLM provider, using groq");
                }
                parsed
            })
            .unwrap_or_default();

        let llm = LlmConfig {
            provider,
            model: env("POCKET_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or_else(|| provider.default_model().to_string()),
            api_key: env(provider.api_key_env())
                .or(fc.llm.api_key)
                .map(SecretString::from),
            base_url: env("POCKET_LLM_BASE_URL")
                .or(fc.llm.base_url)
                .unwrap_or_else(|| provider.default_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            temperature: fc.llm.temperature.unwrap_or(0.7),
            max_tokens: fc.llm.max_tokens.unwrap_or(500),
            timeout: Duration::from_secs(fc.llm.timeout_secs.unwrap_or(30)),
        };

        let voice = VoiceConfig {
            enabled: fc.voice.enabled.unwrap_or(false),
            stt_model: fc
                .voice
                .stt_model
                .unwrap_or_else(|| DEFAULT_STT_MODEL.to_string()),
            record_duration: Duration::from_secs(fc.voice.record_secs.unwrap_or(5)),
        };

        // Spotify credentials only count when all three parts are present
        let music_file = fc.capabilities.music;
        let credentials = match (
            env("SPOTIFY_CLIENT_ID").or(music_file.client_id),
            env("SPOTIFY_CLIENT_SECRET").or(music_file.client_secret),
            env("SPOTIFY_REFRESH_TOKEN").or(music_file.refresh_token),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Some(SpotifyCredentials {
                    client_id,
                    client_secret: SecretString::from(client_secret),
                    refresh_token: SecretString::from(refresh_token),
                })
            }
            _ => None,
        };

        let capabilities = CapabilitiesConfig {
            mobile: fc.capabilities.mobile.enabled.unwrap_or(true),
            video: fc.capabilities.video.enabled.unwrap_or(false),
            music: MusicConfig {
                enabled: music_file.enabled.unwrap_or(false),
                credentials,
            },
        };

        Self {
            wake_word,
            language,
            llm,
            voice,
            capabilities,
        }
    }

    /// Check that the configuration can start a session
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the LLM API key is missing or still the
    /// sample placeholder, or the wake word is empty
    pub fn validate(&self) -> Result<()> {
        let env_var = self.llm.provider.api_key_env();
        let Some(key) = &self.llm.api_key else {
            return Err(Error::Config(format!(
                "{env_var} not set (export it or add api_key to [llm] in the config file)"
            )));
        };

        if key.expose_secret().contains(PLACEHOLDER_MARKER) {
            return Err(Error::Config(format!(
                "{env_var} is still the sample placeholder, set a real key"
            )));
        }

        if self.wake_word.is_empty() {
            return Err(Error::Config("wake word must not be empty".to_string()));
        }

        Ok(())
    }

    /// API key for the oracle and transcription services
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no key is configured
    pub fn api_key(&self) -> Result<SecretString> {
        self.llm
            .api_key
            .as_ref()
            .map(|k| SecretString::from(k.expose_secret().to_string()))
            .ok_or_else(|| {
                Error::Config(format!("{} not set", self.llm.provider.api_key_env()))
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = Config::resolve(PocketConfigFile::default(), env_of(&[]));

        assert_eq!(config.wake_word, "asistente");
        assert_eq!(config.language, "es");
        assert_eq!(config.llm.provider, LlmProvider::Groq);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(
            config.llm.chat_endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(
            config.llm.transcription_endpoint(),
            "https://api.groq.com/openai/v1/audio/transcriptions"
        );
        assert_eq!(config.llm.timeout, Duration::from_secs(30));
        assert!(config.capabilities.mobile);
        assert!(!config.capabilities.video);
        assert!(!config.capabilities.music.enabled);
        assert!(config.capabilities.music.credentials.is_none());
        assert_eq!(config.voice.stt_model, DEFAULT_STT_MODEL);
    }

    #[test]
    fn env_overrides_file() {
        let fc = file::parse_config(
            r#"
[assistant]
wake_word = "jarvis"

[llm]
model = "from-file"
api_key = "file-key"
"#,
        )
        .unwrap();

        let config = Config::resolve(
            fc,
            env_of(&[
                ("POCKET_WAKE_WORD", "Nova"),
                ("POCKET_LLM_MODEL", "from-env"),
                ("GROQ_API_KEY", "env-key"),
            ]),
        );

        assert_eq!(config.wake_word, "nova");
        assert_eq!(config.llm.model, "from-env");
        assert_eq!(config.api_key().unwrap().expose_secret(), "env-key");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let fc = file::parse_config("[assistant]\nwake_word = \"jarvis\"").unwrap();
        let config = Config::resolve(fc, env_of(&[("POCKET_WAKE_WORD", "  ")]));
        assert_eq!(config.wake_word, "jarvis");
    }

    #[test]
    fn provider_selects_defaults_and_key_variable() {
        let fc = file::parse_config("[llm]\nprovider = \"OpenAI\"\nbase_url = \"http://localhost:8080/v1/\"")
            .unwrap();
        let config = Config::resolve(fc, env_of(&[("OPENAI_API_KEY", "sk-test")]));

        assert_eq!(config.llm.provider, LlmProvider::OpenAi);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(
            config.llm.chat_endpoint(),
            "http://localhost:8080/v1/chat/completions"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_key_fails_validation() {
        let config = Config::resolve(PocketConfigFile::default(), env_of(&[]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn placeholder_key_fails_validation() {
        let config = Config::resolve(
            PocketConfigFile::default(),
            env_of(&[("GROQ_API_KEY", "TU_API_KEY_AQUI")]),
        );
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn music_credentials_need_all_parts() {
        let fc = file::parse_config(
            "[capabilities.music]\nenabled = true\nclient_id = \"id\"\nclient_secret = \"secret\"",
        )
        .unwrap();
        let partial = Config::resolve(fc, env_of(&[]));
        assert!(partial.capabilities.music.enabled);
        assert!(partial.capabilities.music.credentials.is_none());

        let fc = file::parse_config("[capabilities.music]\nclient_id = \"id\"").unwrap();
        let complete = Config::resolve(
            fc,
            env_of(&[
                ("SPOTIFY_CLIENT_SECRET", "secret"),
                ("SPOTIFY_REFRESH_TOKEN", "refresh"),
            ]),
        );
        let creds = complete.capabilities.music.credentials.unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.refresh_token.expose_secret(), "refresh");
    }
}

//! Interactive first-run setup wizard (`pocket setup`)

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Select};

use crate::config::file::{
    self, AssistantFileConfig, CapabilitiesFileConfig, CapabilityToggle, LlmFileConfig,
    MusicFileConfig, PocketConfigFile, VoiceFileConfig,
};
use crate::config::{DEFAULT_LANGUAGE, DEFAULT_STT_MODEL, DEFAULT_WAKE_WORD, LlmProvider};

const PROVIDERS: [LlmProvider; 3] = [LlmProvider::Groq, LlmProvider::OpenAi, LlmProvider::OpenRouter];

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup(path: Option<&Path>) -> anyhow::Result<()> {
    println!("Pocket Setup\n");

    let config_path = path
        .map(Path::to_path_buf)
        .or_else(file::config_file_path)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    // Load existing config if present
    let existing = file::load_config_file(&config_path);
    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. Wake word and language
    let wake_word: String = Input::new()
        .with_prompt("Wake word")
        .default(
            existing
                .assistant
                .wake_word
                .clone()
                .unwrap_or_else(|| DEFAULT_WAKE_WORD.to_string()),
        )
        .interact_text()?;

    let language: String = Input::new()
        .with_prompt("Language code")
        .default(
            existing
                .assistant
                .language
                .clone()
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        )
        .interact_text()?;

    // 2. LLM provider + API key
    let labels: Vec<&str> = PROVIDERS.iter().map(|p| p.as_str()).collect();
    let default_provider = existing
        .llm
        .provider
        .as_deref()
        .and_then(LlmProvider::parse)
        .and_then(|p| PROVIDERS.iter().position(|&l| l == p))
        .unwrap_or(0);

    let provider_idx = Select::new()
        .with_prompt("Select an LLM provider")
        .items(&labels)
        .default(default_provider)
        .interact()?;
    let provider = PROVIDERS[provider_idx];

    let existing_key = existing.llm.api_key.as_deref();
    let prompt = existing_key.map_or_else(
        || format!("{} API key ({})", provider.as_str(), provider.api_key_env()),
        |k| {
            format!(
                "{} API key (current: {}, leave blank to keep)",
                provider.as_str(),
                mask_secret(k)
            )
        },
    );

    let api_key_input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;
    let api_key = keep_if_blank(api_key_input, existing_key);

    // 3. LLM model
    let default_model = existing
        .llm
        .model
        .clone()
        .unwrap_or_else(|| provider.default_model().to_string());
    let model: String = Input::new()
        .with_prompt("LLM model")
        .default(default_model)
        .interact_text()?;

    // 4. Voice
    let enable_voice = Confirm::new()
        .with_prompt("Start in voice mode by default?")
        .default(existing.voice.enabled.unwrap_or(false))
        .interact()?;

    // 5. Capabilities
    let caps = &existing.capabilities;
    let mobile = Confirm::new()
        .with_prompt("Enable device control (Termux or adb)?")
        .default(caps.mobile.enabled.unwrap_or(true))
        .interact()?;
    let video = Confirm::new()
        .with_prompt("Enable YouTube search (needs yt-dlp)?")
        .default(caps.video.enabled.unwrap_or(false))
        .interact()?;
    let music_enabled = Confirm::new()
        .with_prompt("Enable Spotify control?")
        .default(caps.music.enabled.unwrap_or(false))
        .interact()?;

    let music = if music_enabled {
        MusicFileConfig {
            enabled: Some(true),
            client_id: ask_optional("Spotify client ID", caps.music.client_id.as_deref())?,
            client_secret: ask_optional(
                "Spotify client secret",
                caps.music.client_secret.as_deref(),
            )?,
            refresh_token: ask_optional(
                "Spotify refresh token",
                caps.music.refresh_token.as_deref(),
            )?,
        }
    } else {
        MusicFileConfig {
            enabled: Some(false),
            ..MusicFileConfig::default()
        }
    };

    // 6. Build and write config
    let config_file = PocketConfigFile {
        assistant: AssistantFileConfig {
            wake_word: Some(wake_word.trim().to_lowercase()),
            language: Some(language),
        },
        llm: LlmFileConfig {
            provider: Some(provider.as_str().to_string()),
            model: Some(model),
            api_key,
            ..existing.llm
        },
        voice: VoiceFileConfig {
            enabled: Some(enable_voice),
            stt_model: existing
                .voice
                .stt_model
                .or_else(|| Some(DEFAULT_STT_MODEL.to_string())),
            record_secs: existing.voice.record_secs,
        },
        capabilities: CapabilitiesFileConfig {
            mobile: CapabilityToggle {
                enabled: Some(mobile),
            },
            music,
            video: CapabilityToggle {
                enabled: Some(video),
            },
        },
    };

    write_config(&config_path, &config_file)?;
    println!("\nConfig written to {}", config_path.display());
    println!("\nSetup complete! Run `pocket` to start.");

    Ok(())
}

/// Prompt for a secret-ish value, keeping the current one on blank input
fn ask_optional(label: &str, current: Option<&str>) -> anyhow::Result<Option<String>> {
    let prompt = current.map_or_else(
        || label.to_string(),
        |c| format!("{label} (current: {}, leave blank to keep)", mask_secret(c)),
    );
    let input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(keep_if_blank(input, current))
}

fn keep_if_blank(input: String, current: Option<&str>) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        current.map(str::to_string)
    } else {
        Some(input.to_string())
    }
}

/// Show only the first and last four characters of a secret
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

/// Serialize and write the config file
fn write_config(path: &Path, config: &PocketConfigFile) -> anyhow::Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}

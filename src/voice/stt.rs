//! Speech-to-text (STT) processing

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Response from a Whisper-compatible transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: String,
}

/// Turns recorded audio into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe WAV audio bytes
    ///
    /// # Errors
    ///
    /// Returns error if transcription fails
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String>;
}

/// Transcribes speech through a Whisper-compatible HTTP endpoint (Groq, `OpenAI`)
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
    language: String,
}

impl SpeechToText {
    /// Create a new STT client
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(
        api_key: SecretString,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(Error::Config(
                "API key required for Whisper transcription".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: endpoint.into(),
            model: model.into(),
            language: language.into(),
        })
    }

    fn form(&self, audio: Vec<u8>) -> Result<reqwest::multipart::Form> {
        Ok(reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", self.language.clone()))
    }
}

#[async_trait]
impl Transcriber for SpeechToText {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        tracing::debug!(
            audio_bytes = audio.len(),
            model = %self.model,
            language = %self.language,
            "starting Whisper transcription"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(self.form(audio)?)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse response");
            e
        })?;

        let text = result.text.trim().to_string();
        tracing::info!(transcript = %text, "transcription complete");
        Ok(text)
    }
}

//! Voice input and output
//!
//! A [`VoiceBackend`] listens for one utterance and speaks replies. The backend
//! is chosen once at startup: Termux tools on an Android device, typed input and
//! printed output everywhere else.

mod console;
mod stt;
mod termux;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use console::ConsoleVoice;
pub use stt::{SpeechToText, Transcriber};
pub use termux::TermuxVoice;

use crate::capability::CommandRunner;
use crate::capability::mobile::TERMUX_PREFIX;
use crate::config::Config;
use crate::Result;

/// Listen/speak device
#[async_trait]
pub trait VoiceBackend: Send + Sync {
    /// Short backend identifier for logs
    fn name(&self) -> &'static str;

    /// Capture one utterance
    ///
    /// Returns `Ok(None)` when nothing intelligible was heard.
    ///
    /// # Errors
    ///
    /// Returns error if the input device or transcription fails. End of typed
    /// input is reported as an `UnexpectedEof` I/O error.
    async fn listen(&self, timeout: Duration) -> Result<Option<String>>;

    /// Say `text` to the user
    ///
    /// # Errors
    ///
    /// Returns error if the output device fails
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Pick the voice backend for this device
///
/// # Errors
///
/// Returns error if the transcription client cannot be built
pub fn select_backend(
    config: &Config,
    runner: Arc<dyn CommandRunner>,
) -> Result<Arc<dyn VoiceBackend>> {
    if !Path::new(TERMUX_PREFIX).exists() {
        tracing::info!("not running in Termux, using console voice");
        return Ok(Arc::new(ConsoleVoice::new()));
    }

    let stt = SpeechToText::new(
        config.api_key()?,
        config.llm.transcription_endpoint(),
        config.voice.stt_model.clone(),
        config.language.clone(),
    )?;

    tracing::info!(model = %config.voice.stt_model, "using Termux voice");
    Ok(Arc::new(TermuxVoice::new(
        runner,
        Arc::new(stt),
        config.voice.record_duration,
    )))
}

//! Termux microphone and text-to-speech
//!
//! Audio is recorded with `termux-microphone-record` into a temporary file,
//! sent to a [`Transcriber`], and replies are spoken with `termux-tts-speak`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::console::ConsoleVoice;
use super::stt::Transcriber;
use super::VoiceBackend;
use crate::capability::CommandRunner;
use crate::{Error, Result};

const RECORDER: &str = "termux-microphone-record";
const SPEAKER: &str = "termux-tts-speak";

/// Files smaller than this are treated as empty recordings
const MIN_AUDIO_BYTES: u64 = 100;

/// Extra wait after the recording length before stopping the recorder
const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// Voice backend built on the Termux:API command-line tools
pub struct TermuxVoice {
    runner: Arc<dyn CommandRunner>,
    transcriber: Arc<dyn Transcriber>,
    record_duration: Duration,
    settle: Duration,
    fallback: Option<ConsoleVoice>,
}

impl TermuxVoice {
    /// Create a Termux backend
    ///
    /// Falls back to typed input when the recorder is not installed.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        transcriber: Arc<dyn Transcriber>,
        record_duration: Duration,
    ) -> Self {
        let fallback = if runner.available(RECORDER) {
            None
        } else {
            tracing::warn!(
                program = RECORDER,
                "recorder not found (pkg install termux-api), falling back to typed input"
            );
            Some(ConsoleVoice::with_prompt("⌨️ (Falta termux-api) Escribe aquí: "))
        };

        Self {
            runner,
            transcriber,
            record_duration,
            settle: DEFAULT_SETTLE,
            fallback,
        }
    }

    /// Override the wait after recording
    #[must_use]
    pub const fn with_settle_delay(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Whether typed input replaces the microphone
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.fallback.is_some()
    }

    async fn stop_recorder(&self) -> Result<()> {
        self.runner
            .run(RECORDER, &["-q".to_string()], None)
            .await
            .map(|_| ())
    }

    async fn record(&self, path: &Path, length: Duration) -> Result<()> {
        // A previous recording may still be running
        self.stop_recorder().await?;

        let args = vec![
            "-l".to_string(),
            length.as_secs().max(1).to_string(),
            "-f".to_string(),
            path.display().to_string(),
        ];
        let output = self.runner.run(RECORDER, &args, None).await?;
        if !output.success {
            return Err(Error::Voice(format!(
                "recorder failed: {}",
                output.stderr.trim()
            )));
        }

        tokio::time::sleep(length + self.settle).await;
        self.stop_recorder().await
    }
}

#[async_trait]
impl VoiceBackend for TermuxVoice {
    fn name(&self) -> &'static str {
        "termux"
    }

    async fn listen(&self, timeout: Duration) -> Result<Option<String>> {
        if let Some(fallback) = &self.fallback {
            return fallback.listen(timeout).await;
        }

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("utterance.wav");
        let length = self.record_duration.min(timeout);

        println!("🎤 Escuchando... (habla por {}s)", length.as_secs().max(1));
        self.record(&path, length).await?;

        let size = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len(),
            Err(_) => 0,
        };
        if size < MIN_AUDIO_BYTES {
            tracing::debug!(bytes = size, "empty recording");
            println!("❌ Audio vacío o no generado");
            return Ok(None);
        }

        println!("🔄 Procesando audio con Whisper...");
        let audio = tokio::fs::read(&path).await?;
        let text = self.transcriber.transcribe(audio).await?;

        if text.trim().is_empty() {
            println!("❓ No entendí");
            return Ok(None);
        }

        println!("📝 Escuché: {text}");
        Ok(Some(text))
    }

    async fn speak(&self, text: &str) -> Result<()> {
        println!("🔊 {text}");
        if self.fallback.is_some() && !self.runner.available(SPEAKER) {
            return Ok(());
        }

        let output = self.runner.run(SPEAKER, &[text.to_string()], None).await?;
        if output.success {
            Ok(())
        } else {
            Err(Error::Voice(format!("tts failed: {}", output.stderr.trim())))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::capability::testing::{ScriptedRunner, failed, ok};

    struct FixedTranscript {
        text: String,
        received: Mutex<Vec<usize>>,
    }

    impl FixedTranscript {
        fn new(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: text.to_string(),
                received: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transcriber for FixedTranscript {
        async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
            self.received.lock().unwrap().push(audio.len());
            Ok(self.text.clone())
        }
    }

    /// Recorder that writes `bytes` of audio to the `-f` path
    fn recorder(bytes: usize) -> ScriptedRunner {
        ScriptedRunner::new(move |_, args| {
            if let Some(pos) = args.iter().position(|a| a == "-f") {
                std::fs::write(&args[pos + 1], vec![0u8; bytes]).unwrap();
            }
            ok("")
        })
        .with_installed(&[RECORDER, SPEAKER])
    }

    fn voice(runner: &Arc<ScriptedRunner>, transcriber: &Arc<FixedTranscript>) -> TermuxVoice {
        TermuxVoice::new(runner.clone(), transcriber.clone(), Duration::from_millis(20))
            .with_settle_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn records_and_transcribes() {
        let runner = Arc::new(recorder(2048));
        let transcriber = FixedTranscript::new("hey asistente abre chrome");
        let voice = voice(&runner, &transcriber);

        let heard = voice.listen(Duration::from_secs(10)).await.unwrap();

        assert_eq!(heard.as_deref(), Some("hey asistente abre chrome"));
        assert_eq!(*transcriber.received.lock().unwrap(), vec![2048]);

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].args, vec!["-q"]);
        assert_eq!(calls[1].args[..2], ["-l".to_string(), "1".to_string()]);
        assert_eq!(calls[2].args, vec!["-q"]);
    }

    #[tokio::test]
    async fn tiny_recording_is_nothing_heard() {
        let runner = Arc::new(recorder(10));
        let transcriber = FixedTranscript::new("ignored");
        let voice = voice(&runner, &transcriber);

        assert_eq!(voice.listen(Duration::from_secs(10)).await.unwrap(), None);
        assert!(transcriber.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_transcript_is_nothing_heard() {
        let runner = Arc::new(recorder(2048));
        let transcriber = FixedTranscript::new("   ");
        let voice = voice(&runner, &transcriber);

        assert_eq!(voice.listen(Duration::from_secs(10)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn recorder_failure_is_a_voice_error() {
        let runner = Arc::new(
            ScriptedRunner::new(|_, args| {
                if args.iter().any(|a| a == "-f") {
                    failed("permission denied")
                } else {
                    ok("")
                }
            })
            .with_installed(&[RECORDER]),
        );
        let voice = voice(&runner, &FixedTranscript::new(""));

        let err = voice.listen(Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, Error::Voice(msg) if msg.contains("permission denied")));
    }

    #[test]
    fn missing_recorder_degrades_to_typed_input() {
        let runner = Arc::new(ScriptedRunner::succeeding());
        let voice = voice(&runner, &FixedTranscript::new(""));
        assert!(voice.is_degraded());
    }

    #[tokio::test]
    async fn speak_uses_termux_tts() {
        let runner = Arc::new(recorder(0));
        let voice = voice(&runner, &FixedTranscript::new(""));

        voice.speak("Hola").await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].program, SPEAKER);
        assert_eq!(calls[0].args, vec!["Hola"]);
    }
}

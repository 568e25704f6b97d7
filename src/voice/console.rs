//! Typed input and printed output

use std::io::{BufRead, Write};
use std::time::Duration;

use async_trait::async_trait;

use super::VoiceBackend;
use crate::Result;

/// Console stand-in for a microphone and speaker
///
/// Blocking stdin reads run on the blocking pool, so the listen timeout is not
/// enforced; the user simply types.
#[derive(Debug, Clone, Default)]
pub struct ConsoleVoice {
    prompt: String,
}

impl ConsoleVoice {
    /// Console voice with the default prompt
    #[must_use]
    pub fn new() -> Self {
        Self::with_prompt("⌨️ Escribe aquí: ")
    }

    /// Console voice with a custom prompt
    #[must_use]
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Read one line from stdin on the blocking pool
///
/// Returns `Ok(None)` on end of input.
async fn read_stdin_line(prompt: String) -> Result<Option<String>> {
    let line = tokio::task::spawn_blocking(move || -> std::io::Result<Option<String>> {
        let mut stdout = std::io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        Ok((read > 0).then_some(line))
    })
    .await
    .map_err(|e| crate::Error::Voice(format!("input task failed: {e}")))??;

    Ok(line)
}

#[async_trait]
impl VoiceBackend for ConsoleVoice {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn listen(&self, _timeout: Duration) -> Result<Option<String>> {
        let Some(line) = read_stdin_line(self.prompt.clone()).await? else {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        };

        let text = line.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }

    async fn speak(&self, text: &str) -> Result<()> {
        println!("🔊 {text}");
        Ok(())
    }
}

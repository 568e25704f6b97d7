//! Interactive read-process-reply loops

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::assistant::Assistant;
use crate::voice::VoiceBackend;
use crate::{Error, Result};

/// Words that end a text session
pub const EXIT_WORDS: [&str; 3] = ["salir", "exit", "quit"];

/// Printed when a session ends
pub const FAREWELL: &str = "👋 ¡Hasta luego!";

/// How long voice mode listens for each utterance
pub const LISTEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause after a failed listen so a broken device doesn't spin
const ERROR_PAUSE: Duration = Duration::from_secs(1);

/// Whether `line` asks to end the session
#[must_use]
pub fn is_exit_word(line: &str) -> bool {
    let line = line.trim();
    EXIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w))
}

/// Run the text session until an exit word, end of input, or Ctrl-C
///
/// # Errors
///
/// Returns error if reading input or writing output fails
pub async fn run_text<R, W>(assistant: &Assistant, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let intro = format!(
        "\n✅ ¡Listo! Di 'Hey {}' seguido de tu comando\n   Escribe 'salir' para terminar\n\n",
        assistant.wake().word()
    );
    output.write_all(intro.as_bytes()).await?;

    let mut lines = input.lines();
    loop {
        output.write_all("Tú: ".as_bytes()).await?;
        output.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                None
            }
        };

        let Some(line) = line else {
            output.write_all(format!("\n{FAREWELL}\n").as_bytes()).await?;
            break;
        };

        let line = line.trim();
        if is_exit_word(line) {
            output.write_all(format!("{FAREWELL}\n").as_bytes()).await?;
            break;
        }
        if line.is_empty() {
            continue;
        }

        let reply = assistant.process_command(line).await;
        output
            .write_all(format!("🤖: {reply}\n\n").as_bytes())
            .await?;
    }

    output.flush().await?;
    Ok(())
}

/// Run the voice session until Ctrl-C or end of typed input
///
/// # Errors
///
/// Returns error only if the greeting cannot be spoken
pub async fn run_voice(assistant: &Assistant, voice: &dyn VoiceBackend) -> Result<()> {
    let wake = assistant.wake().word();
    println!("\n✅ ¡Modo voz activo!");
    println!("   Di 'Hey {wake}' seguido de tu comando");
    println!("   Presiona Ctrl+C para salir\n");

    tracing::info!(backend = voice.name(), "voice session started");
    voice
        .speak(&format!("Hola, soy {wake}. ¿En qué puedo ayudarte?"))
        .await?;

    loop {
        let heard = tokio::select! {
            heard = voice.listen(LISTEN_TIMEOUT) => heard,
            _ = tokio::signal::ctrl_c() => {
                say(voice, "¡Hasta luego!").await;
                println!("\n{FAREWELL}");
                break;
            }
        };

        let text = match heard {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                println!("\n{FAREWELL}");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "listen failed");
                println!("❌ Error: {e}");
                tokio::time::sleep(ERROR_PAUSE).await;
                continue;
            }
        };

        println!("Tú: {text}");
        let reply = assistant.process_command(&text).await;
        println!("🤖: {reply}");
        say(voice, &reply).await;
    }

    Ok(())
}

/// Speak, logging rather than propagating output failures
async fn say(voice: &dyn VoiceBackend, text: &str) {
    if let Err(e) = voice.speak(text).await {
        tracing::warn!(error = %e, "speak failed");
    }
}

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use pocket_assistant::capability::{CapabilityRegistry, CommandRunner, SystemRunner};
use pocket_assistant::{Assistant, Config, session, voice};

/// Pocket - voice and text assistant for your phone
#[derive(Parser)]
#[command(name = "pocket", version, about)]
struct Cli {
    /// Listen and reply by voice instead of typed text
    #[arg(long)]
    voice: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Override the wake word
    #[arg(long)]
    wake_word: Option<String>,

    /// Config file (defaults to ~/.config/pocket/config.toml)
    #[arg(short, long, env = "POCKET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Process a single command and print the reply
    Ask {
        /// Command text, e.g. "hey asistente, abre chrome"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List the enabled capabilities and their actions
    Capabilities,
    /// Interactive first-run setup
    Setup,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,pocket_assistant=info",
        1 => "info,pocket_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);

    match cli.command {
        Some(Command::Setup) => pocket_assistant::setup::run_setup(cli.config.as_deref()),
        Some(Command::Capabilities) => {
            let config = load_config(cli.config.as_deref(), cli.wake_word.as_deref());
            let registry =
                CapabilityRegistry::from_config(&config.capabilities, runner).await?;
            println!("{}", registry.manifest());
            Ok(())
        }
        Some(Command::Ask { text }) => {
            let config = load_config(cli.config.as_deref(), cli.wake_word.as_deref());
            let assistant = Assistant::from_config(&config, runner).await?;
            println!("{}", assistant.process_command(&text.join(" ")).await);
            Ok(())
        }
        None => {
            let config = load_config(cli.config.as_deref(), cli.wake_word.as_deref());
            let voice_mode = cli.voice || config.voice.enabled;
            interactive(&config, runner, voice_mode).await
        }
    }
}

/// Load config, applying the `--wake-word` override
fn load_config(path: Option<&Path>, wake_word: Option<&str>) -> Config {
    let mut config = Config::load(path);
    if let Some(word) = wake_word {
        config.wake_word = word.trim().to_lowercase();
    }
    config
}

#[allow(clippy::future_not_send)]
async fn interactive(
    config: &Config,
    runner: Arc<dyn CommandRunner>,
    voice_mode: bool,
) -> anyhow::Result<()> {
    println!("🤖 Iniciando Asistente Móvil...");
    println!("{}", "=".repeat(50));
    println!("🎤 Wake word: 'Hey {}'", config.wake_word);
    println!("🌐 Idioma: {}", config.language);
    println!("🔊 Modo: {}", if voice_mode { "Voz" } else { "Texto" });
    println!("{}", "=".repeat(50));

    let assistant = Assistant::from_config(config, runner.clone()).await?;

    if voice_mode {
        let backend = voice::select_backend(config, runner)?;
        session::run_voice(&assistant, backend.as_ref()).await?;
    } else {
        session::run_text(
            &assistant,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
        )
        .await?;
    }

    Ok(())
}

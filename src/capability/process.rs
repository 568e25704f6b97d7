//! External command execution for capability backends

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::{Error, Result};

/// Upper bound for a single helper command
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured result of an external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

/// Runs helper programs (`termux-*`, `adb`, `yt-dlp`)
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, optionally feeding `stdin`
    async fn run(&self, program: &str, args: &[String], stdin: Option<&str>)
    -> Result<CommandOutput>;

    /// Whether `program` can be found on `PATH`
    fn available(&self, program: &str) -> bool;
}

/// Runs commands as child processes of the assistant
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<CommandOutput> {
        run_with_timeout(program, args, stdin, COMMAND_TIMEOUT).await
    }

    fn available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Spawn `program` and collect its output, killing it after `limit`
///
/// Feeding stdin counts against the limit.
async fn run_with_timeout(
    program: &str,
    args: &[String],
    stdin: Option<&str>,
    limit: Duration,
) -> Result<CommandOutput> {
    tracing::debug!(program, ?args, "running command");

    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .kill_on_drop(true);

    let mut child = cmd.spawn()?;
    let pipe = child.stdin.take();

    let finished = async move {
        if let (Some(input), Some(mut pipe)) = (stdin, pipe) {
            pipe.write_all(input.as_bytes()).await?;
            // Closing stdin lets the child see EOF
            drop(pipe);
        }
        child.wait_with_output().await
    };

    let output = tokio::time::timeout(limit, finished)
        .await
        .map_err(|_| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("{program} timed out ({}ms)", limit.as_millis()),
            ))
        })??;

    if !output.status.success() {
        tracing::debug!(program, status = %output.status, "command failed");
    }

    Ok(CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    type Responder = Box<dyn Fn(&str, &[String]) -> CommandOutput + Send + Sync>;

    /// A single recorded invocation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Call {
        pub program: String,
        pub args: Vec<String>,
        pub stdin: Option<String>,
    }

    /// Records every command and answers from a closure
    pub struct ScriptedRunner {
        responder: Responder,
        installed: Vec<&'static str>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedRunner {
        pub fn new(
            responder: impl Fn(&str, &[String]) -> CommandOutput + Send + Sync + 'static,
        ) -> Self {
            Self {
                responder: Box::new(responder),
                installed: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Every command succeeds with empty output
        pub fn succeeding() -> Self {
            Self::new(|_, _| ok(""))
        }

        pub fn with_installed(mut self, programs: &[&'static str]) -> Self {
            self.installed.extend_from_slice(programs);
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn programs(&self) -> Vec<String> {
            self.calls().into_iter().map(|c| c.program).collect()
        }
    }

    pub fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            success: true,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: &str) -> CommandOutput {
        CommandOutput {
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(
            &self,
            program: &str,
            args: &[String],
            stdin: Option<&str>,
        ) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(Call {
                program: program.to_string(),
                args: args.to_vec(),
                stdin: stdin.map(str::to_string),
            });
            Ok((self.responder)(program, args))
        }

        fn available(&self, program: &str) -> bool {
            self.installed.contains(&program)
        }
    }
}

//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use pocket_assistant::capability::{CommandOutput, CommandRunner};
use pocket_assistant::{Assistant, CapabilityRegistry, Oracle, Result};

/// Oracle that answers from a queue and records every prompt
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedOracle {
    /// Oracle that returns `replies` in order, then "ok"
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Oracle whose first call fails with `error`
    pub fn failing(error: pocket_assistant::Error) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Number of completed calls
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// (system, user) prompt pairs, in call order
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))
    }
}

/// Command runner that succeeds and records `program args...` lines
#[derive(Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        _stdin: Option<&str>,
    ) -> Result<CommandOutput> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.commands.lock().unwrap().push(line);

        Ok(CommandOutput {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    fn available(&self, _program: &str) -> bool {
        true
    }
}

/// Build an assistant over `registry`
pub fn assistant(
    wake_word: &str,
    registry: CapabilityRegistry,
    oracle: &Arc<ScriptedOracle>,
) -> Assistant {
    Assistant::new(wake_word, Arc::new(registry), oracle.clone())
}

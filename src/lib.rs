//! Pocket Assistant - voice and text assistant for Android devices
//!
//! This library provides the core functionality for the assistant:
//! - Capability providers (device control, Spotify, YouTube)
//! - LLM-based intent routing
//! - Command orchestration with wake phrase handling
//! - Voice and text session loops
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Sessions                          │
//! │        Text (stdin)   │   Voice (Termux / console)   │
//! └────────────────────┬────────────────────────────────┘
//!                      │ raw text
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Assistant                         │
//! │   Wake phrase  │  Intent router  │  Free-form reply  │
//! └──────────┬─────────────────────────────┬────────────┘
//!            │ RoutedAction                │ prompt
//! ┌──────────▼──────────────┐   ┌──────────▼────────────┐
//! │  Capability registry    │   │  Oracle (chat API)    │
//! │  mobile │ music │ video │   │  Groq / OpenAI / ...  │
//! └─────────────────────────┘   └───────────────────────┘
//! ```

pub mod assistant;
pub mod capability;
pub mod config;
pub mod error;
pub mod oracle;
pub mod prompt;
pub mod router;
pub mod session;
pub mod setup;
pub mod voice;
pub mod wake;

pub use assistant::{Assistant, CommandOutcome};
pub use capability::{
    ActionDescriptor, ActionTable, Capability, CapabilityDescriptor, CapabilityRegistry,
    Parameters,
};
pub use config::Config;
pub use error::{Error, Result};
pub use oracle::{ChatCompletionsOracle, ChatSettings, Oracle};
pub use router::{IntentRouter, RoutedAction};
pub use voice::VoiceBackend;
pub use wake::WakePhrase;

//! Error types for the assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a command
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream service answered with a non-success status
    #[error("upstream error {status}: {body}")]
    Transport {
        /// HTTP status code returned by the upstream service
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// Routed action names a capability that is not registered
    #[error("capability not found: {0}")]
    CapabilityNotFound(String),

    /// A capability with the same name is already registered
    #[error("capability already registered: {0}")]
    DuplicateCapability(String),

    /// Chat completion succeeded but carried no reply text
    #[error("the model returned an empty reply")]
    EmptyCompletion,

    /// Voice I/O error
    #[error("voice error: {0}")]
    Voice(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

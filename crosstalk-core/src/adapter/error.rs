//! Adapter error types

use super::emulator::EmulatorState;
use crate::providers::ProviderError;
use thiserror::Error;

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Boxed error returned by a failing tool-use callback
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Message shown to the shopper when the stream shape fault is hit
pub const STREAMING_UNAVAILABLE_MESSAGE: &str =
    "Streaming is temporarily unavailable. Please try again in a moment.";

/// Errors surfaced to the orchestration layer
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A required credential or setting is absent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider produced a stream the client cannot consume
    #[error("{}", STREAMING_UNAVAILABLE_MESSAGE)]
    StreamingUnavailable {
        #[source]
        source: ProviderError,
    },

    /// A tool payload that should be JSON is not
    #[error("Tool payload for '{tool_use_id}' is not valid JSON: {source}")]
    Parse {
        tool_use_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The terminal response has no candidate
    #[error("Provider response contained no candidate")]
    MissingCandidate,

    /// The system prompt key is not registered
    #[error("Unknown system prompt key: {0}")]
    UnknownPrompt(String),

    /// A history turn cannot be translated
    #[error("Invalid turn at index {index}: {reason}")]
    InvalidTurn { index: usize, reason: String },

    /// The tool-use callback failed
    #[error("Tool-use callback failed for '{tool}'")]
    Callback {
        tool: String,
        #[source]
        source: CallbackError,
    },

    /// The emulator was driven out of order
    #[error("Invalid emulator transition from {from:?} to {to:?}")]
    InvalidTransition { from: EmulatorState, to: EmulatorState },

    /// Any other provider failure, unchanged
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl AdapterError {
    /// Translate a provider failure, recovering the known stream-shape fault
    pub fn from_provider(err: ProviderError) -> Self {
        if err.is_stream_incompatibility() {
            AdapterError::StreamingUnavailable { source: err }
        } else {
            AdapterError::Provider(err)
        }
    }

    /// Message suitable for showing to the shopper
    pub fn user_message(&self) -> String {
        match self {
            AdapterError::StreamingUnavailable { .. } => STREAMING_UNAVAILABLE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

//! Crosstalk Core Library
//!
//! This crate lets a chat orchestration layer written against the canonical
//! (Anthropic-style) message and tool-calling contract drive Gemini instead,
//! with the same turn-taking, tool-invocation and streaming semantics.
//!
//! - [`protocol`]: the canonical chat contract
//! - [`providers`]: the Gemini wire format, translators and HTTP client
//! - [`adapter`]: the streaming emulator and the adapter entry point
//! - [`config`]: configuration loading and validation

pub mod adapter;
pub mod config;
pub mod protocol;
pub mod providers;

pub use adapter::{AdapterError, AdapterResult, Callbacks, ConversationAdapter};
pub use config::AdapterConfig;

/// Returns the version of the Crosstalk Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}

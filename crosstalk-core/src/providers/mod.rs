//! Provider layer
//!
//! This module holds the outbound contract the adapter drives
//! ([`GenerativeBackend`]), the provider error taxonomy, and the Gemini
//! implementation: wire types, converters, tool schema normalization and
//! the streaming HTTP client.

pub mod backend;
pub mod error;
pub mod gemini;

pub use backend::{ChunkStream, GenerativeBackend, ModelConfig};
pub use error::{ProviderError, ProviderResult};

// Re-export concrete providers
pub use gemini::GeminiClient;

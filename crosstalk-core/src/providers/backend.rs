//! Outbound streaming-generation contract
//!
//! The adapter only ever talks to the remote provider through
//! [`GenerativeBackend`], so tests can substitute a scripted backend for the
//! HTTP client.

use super::error::ProviderResult;
use super::gemini::types::{
    GeminiContent, GeminiPart, GeminiTool, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig,
};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Stream of response chunks from one streaming call
pub type ChunkStream = Pin<Box<dyn Stream<Item = ProviderResult<GenerateContentResponse>> + Send>>;

/// Model configuration sent alongside the contents of one call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelConfig {
    /// Model identifier, e.g. `gemini-2.0-flash`
    pub model: String,

    /// System instruction, resolved once per request
    pub system_instruction: String,

    /// Function declarations, absent when no tools are offered
    pub tools: Option<Vec<GeminiTool>>,

    /// Sampling parameters
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Assemble the request body for a call
    pub fn new(contents: Vec<GeminiContent>, model: &ModelConfig) -> Self {
        let system_instruction = (!model.system_instruction.is_empty()).then(|| GeminiContent {
            role: None,
            parts: vec![GeminiPart::text(model.system_instruction.clone())],
        });

        Self {
            contents,
            system_instruction,
            tools: model.tools.clone(),
            generation_config: model.generation_config.clone(),
        }
    }
}

/// A provider able to stream generated content
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Get the backend's name
    fn name(&self) -> &str;

    /// Start one streaming generation call
    ///
    /// Resolves once the provider has accepted the call; the chunks then
    /// arrive through the returned stream, in provider order.
    async fn stream_generate_content(
        &self,
        model: &ModelConfig,
        contents: Vec<GeminiContent>,
    ) -> ProviderResult<ChunkStream>;
}

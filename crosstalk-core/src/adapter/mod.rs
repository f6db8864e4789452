//! Cross-provider conversation adapter
//!
//! [`ConversationAdapter`] lets an orchestration layer written against the
//! canonical chat contract drive a Gemini backend. One call translates the
//! history and tool declarations, streams the response through
//! [`Callbacks`], and returns the canonical assistant message.

mod callbacks;
pub mod emulator;
mod error;
mod prompts;

pub use callbacks::Callbacks;
pub use emulator::{Aggregate, EmulatorState, StreamEmulator};
pub use error::{AdapterError, AdapterResult, CallbackError, STREAMING_UNAVAILABLE_MESSAGE};
pub use prompts::{PromptRegistry, PromptResolver};

use crate::config::{AdapterConfig, ModelSettings, SafeLogging};
use crate::protocol::{AssistantMessage, ChatRequest};
use crate::providers::gemini::converter::to_gemini_contents;
use crate::providers::gemini::tools::to_gemini_tools;
use crate::providers::gemini::types::GenerationConfig;
use crate::providers::{GeminiClient, GenerativeBackend, ModelConfig};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Adapter between the canonical chat contract and a generative backend
///
/// Holds no per-request state; one instance can serve concurrent calls.
#[derive(Clone)]
pub struct ConversationAdapter {
    backend: Arc<dyn GenerativeBackend>,
    prompts: Arc<dyn PromptResolver>,
    model: ModelSettings,
}

impl ConversationAdapter {
    /// Create an adapter over an explicit backend and prompt source
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        prompts: Arc<dyn PromptResolver>,
        model: ModelSettings,
    ) -> Self {
        Self {
            backend,
            prompts,
            model,
        }
    }

    /// Create an adapter backed by a [`GeminiClient`]
    ///
    /// Fails before any call is attempted when the API key is absent.
    pub fn from_config(config: &AdapterConfig) -> AdapterResult<Self> {
        if config.provider.api_key.is_empty() {
            return Err(AdapterError::Configuration(
                "Gemini API key is not configured".to_string(),
            ));
        }

        let client = GeminiClient::new(&config.provider)
            .map_err(|e| AdapterError::Configuration(e.to_string()))?;
        tracing::info!(config = %config.safe_for_logging(), "conversation adapter ready");

        Ok(Self::new(
            Arc::new(client),
            Arc::new(PromptRegistry::from_config(config)),
            config.model.clone(),
        ))
    }

    /// Model settings used for every call
    pub fn model(&self) -> &ModelSettings {
        &self.model
    }

    /// Handle one conversation turn end to end
    ///
    /// The returned message is the one passed to `on_message`.
    pub async fn run(&self, request: ChatRequest, callbacks: &Callbacks) -> AdapterResult<AssistantMessage> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "adapter_run",
            %request_id,
            backend = self.backend.name(),
            model = %self.model.id,
        );

        async move {
            let model = self.model_config(&request)?;
            let contents = to_gemini_contents(&request.history)?;

            tracing::debug!(
                turns = request.history.len(),
                contents = contents.len(),
                tools = request.tools.len(),
                "request translated"
            );

            let message = StreamEmulator::new(callbacks)
                .run(self.backend.as_ref(), &model, contents)
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "adapter run failed"))?;

            tracing::info!(
                stop_reason = ?message.stop_reason,
                tool_uses = message.tool_uses().count(),
                "adapter run completed"
            );
            Ok(message)
        }
        .instrument(span)
        .await
    }

    /// Resolve the system instruction and assemble the model configuration
    fn model_config(&self, request: &ChatRequest) -> AdapterResult<ModelConfig> {
        let system_instruction = self
            .prompts
            .resolve(&request.system_prompt_key)
            .ok_or_else(|| AdapterError::UnknownPrompt(request.system_prompt_key.clone()))?;

        let generation_config = (self.model.temperature.is_some()
            || self.model.max_output_tokens.is_some())
        .then(|| GenerationConfig {
            temperature: self.model.temperature,
            max_output_tokens: self.model.max_output_tokens,
        });

        Ok(ModelConfig {
            model: self.model.id.clone(),
            system_instruction,
            tools: to_gemini_tools(&request.tools),
            generation_config,
        })
    }
}

impl std::fmt::Debug for ConversationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationAdapter")
            .field("backend", &self.backend.name())
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ToolDeclaration, Turn};
    use crate::providers::{ChunkStream, ProviderResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the model configuration and answers with an empty stream
    #[derive(Default)]
    struct RecordingBackend {
        seen: Mutex<Option<ModelConfig>>,
    }

    #[async_trait]
    impl GenerativeBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        async fn stream_generate_content(
            &self,
            model: &ModelConfig,
            _contents: Vec<crate::providers::gemini::GeminiContent>,
        ) -> ProviderResult<ChunkStream> {
            *self.seen.lock().unwrap() = Some(model.clone());
            Ok(Box::pin(futures::stream::empty()))
        }
    }

    fn adapter(backend: Arc<RecordingBackend>, model: ModelSettings) -> ConversationAdapter {
        let prompts = PromptRegistry::new().with_prompt("storefront", "You help shoppers.");
        ConversationAdapter::new(backend, Arc::new(prompts), model)
    }

    #[test]
    fn test_missing_key_fails_at_construction() {
        let err = ConversationAdapter::from_config(&AdapterConfig::new("")).unwrap_err();
        assert!(matches!(err, AdapterError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_model_config_is_assembled_once() {
        let backend = Arc::new(RecordingBackend::default());
        let model = ModelSettings {
            id: "gemini-test".into(),
            temperature: Some(0.2),
            max_output_tokens: None,
        };
        let request = ChatRequest::new("storefront", vec![Turn::user("hi")]).with_tools(vec![
            ToolDeclaration::new("get_cart", "Show the cart", json!({"type": "object"})),
        ]);

        // An empty stream has no candidate
        let err = adapter(backend.clone(), model)
            .run(request, &Callbacks::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::MissingCandidate));

        let seen = backend.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.model, "gemini-test");
        assert_eq!(seen.system_instruction, "You help shoppers.");
        assert_eq!(seen.tools.unwrap()[0].function_declarations[0].name, "get_cart");
        assert_eq!(seen.generation_config.unwrap().temperature, Some(0.2));
    }

    #[tokio::test]
    async fn test_unknown_prompt_key_fails_before_call() {
        let backend = Arc::new(RecordingBackend::default());
        let request = ChatRequest::new("checkout", vec![Turn::user("hi")]);

        let err = adapter(backend.clone(), ModelSettings::default())
            .run(request, &Callbacks::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AdapterError::UnknownPrompt(key) if key == "checkout"));
        assert!(backend.seen.lock().unwrap().is_none());
    }
}

//! Streaming response emulation
//!
//! [`StreamEmulator`] drives one streaming call and replays it through the
//! [`Callbacks`] contract. The run is an explicit state machine:
//!
//! ```text
//! Idle -> Streaming -> Aggregating -> ToolDispatch(0..n) -> Completed
//!                                  \-----------------------/
//! ```
//!
//! `ToolDispatch` is skipped when the terminal response carries no
//! function calls.

use super::callbacks::Callbacks;
use super::error::{AdapterError, AdapterResult};
use crate::protocol::{AssistantMessage, ToolUseBlock};
use crate::providers::gemini::converter::{to_assistant_message, tool_use_blocks};
use crate::providers::gemini::streaming::ResponseAggregator;
use crate::providers::gemini::types::{Candidate, GeminiContent, GenerateContentResponse, UsageMetadata};
use crate::providers::{ChunkStream, GenerativeBackend, ModelConfig};
use futures::StreamExt;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Emulator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulatorState {
    Idle,
    Streaming,
    Aggregating,
    /// Dispatching the tool-use block at this position
    ToolDispatch(usize),
    Completed,
}

impl EmulatorState {
    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(self, next: EmulatorState) -> bool {
        use EmulatorState::*;

        match (self, next) {
            (Idle, Streaming) => true,
            (Streaming, Aggregating) => true,
            (Aggregating, ToolDispatch(0)) | (Aggregating, Completed) => true,
            (ToolDispatch(current), ToolDispatch(following)) => following == current + 1,
            (ToolDispatch(_), Completed) => true,
            _ => false,
        }
    }
}

/// The terminal candidate with the response-level usage
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub candidate: Candidate,
    pub usage: Option<UsageMetadata>,
}

/// Replays one streaming call through the callback contract
pub struct StreamEmulator<'a> {
    callbacks: &'a Callbacks,
    state: EmulatorState,
    text: String,
    fragments: usize,
    aggregator: ResponseAggregator,
}

impl<'a> StreamEmulator<'a> {
    pub fn new(callbacks: &'a Callbacks) -> Self {
        Self {
            callbacks,
            state: EmulatorState::Idle,
            text: String::new(),
            fragments: 0,
            aggregator: ResponseAggregator::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> EmulatorState {
        self.state
    }

    /// Text accumulated from the fragments so far
    pub fn accumulated_text(&self) -> &str {
        &self.text
    }

    /// Number of `on_text` notifications issued
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Run the whole protocol for one call
    pub async fn run(
        mut self,
        backend: &dyn GenerativeBackend,
        model: &ModelConfig,
        contents: Vec<GeminiContent>,
    ) -> AdapterResult<AssistantMessage> {
        let mut stream = self.open(backend, model, contents).await?;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(AdapterError::from_provider)?;
            self.on_chunk(chunk)?;
        }

        let aggregate = self.aggregate()?;
        let tool_uses = tool_use_blocks(&aggregate.candidate);
        self.dispatch(&tool_uses).await?;

        let text = std::mem::take(&mut self.text);
        let message = to_assistant_message(
            text,
            tool_uses,
            aggregate.candidate.finish_reason,
            aggregate.usage.as_ref(),
        );
        self.complete(message)
    }

    /// Issue the streaming call
    pub async fn open(
        &mut self,
        backend: &dyn GenerativeBackend,
        model: &ModelConfig,
        contents: Vec<GeminiContent>,
    ) -> AdapterResult<ChunkStream> {
        self.transition(EmulatorState::Streaming)?;
        debug!(backend = backend.name(), model = %model.model, "opening stream");

        backend
            .stream_generate_content(model, contents)
            .await
            .map_err(AdapterError::from_provider)
    }

    /// Handle one streamed chunk
    ///
    /// A non-empty text fragment is forwarded to `on_text` as received.
    pub fn on_chunk(&mut self, chunk: GenerateContentResponse) -> AdapterResult<()> {
        if self.state != EmulatorState::Streaming {
            return Err(AdapterError::InvalidTransition {
                from: self.state,
                to: EmulatorState::Streaming,
            });
        }

        let fragment = chunk.text();
        if !fragment.is_empty() {
            self.callbacks.emit_text(&fragment);
            self.text.push_str(&fragment);
            self.fragments += 1;
        }

        self.aggregator.push(chunk);
        Ok(())
    }

    /// Close the stream and pick the terminal candidate
    pub fn aggregate(&mut self) -> AdapterResult<Aggregate> {
        self.transition(EmulatorState::Aggregating)?;

        let aggregator = std::mem::take(&mut self.aggregator);
        let chunks = aggregator.chunk_count();
        let response = aggregator.finish();
        debug!(chunks, fragments = self.fragments, "stream exhausted");

        let usage = response.usage_metadata;
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or(AdapterError::MissingCandidate)?;

        Ok(Aggregate { candidate, usage })
    }

    /// Notify `on_tool_use` for each block, one at a time and in order
    pub async fn dispatch(&mut self, tool_uses: &[ToolUseBlock]) -> AdapterResult<()> {
        let mut seen = HashSet::new();

        for (position, block) in tool_uses.iter().enumerate() {
            self.transition(EmulatorState::ToolDispatch(position))?;

            if !seen.insert(block.name.as_str()) {
                warn!(tool = %block.name, "tool invoked more than once, tool-use ids collide");
            }
            debug!(tool = %block.name, position, "dispatching tool use");
            self.callbacks.emit_tool_use(block.clone()).await?;
        }

        Ok(())
    }

    /// Deliver the final message
    pub fn complete(&mut self, message: AssistantMessage) -> AdapterResult<AssistantMessage> {
        self.transition(EmulatorState::Completed)?;
        self.callbacks.emit_message(&message);
        Ok(message)
    }

    fn transition(&mut self, next: EmulatorState) -> AdapterResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(AdapterError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

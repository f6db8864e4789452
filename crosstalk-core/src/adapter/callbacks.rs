//! Caller-supplied notification handlers
//!
//! Mirrors the event sequence of a natively streaming client: incremental
//! text, tool-use requests, then the final message. Every handler is
//! optional and an absent one is skipped.

use super::error::{AdapterError, AdapterResult, CallbackError};
use crate::protocol::{AssistantMessage, ToolUseBlock};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;

type TextHandler = Box<dyn Fn(&str) + Send + Sync>;
type ToolUseHandler =
    Box<dyn Fn(ToolUseBlock) -> BoxFuture<'static, Result<(), CallbackError>> + Send + Sync>;
type MessageHandler = Box<dyn Fn(&AssistantMessage) + Send + Sync>;

/// The three-callback contract
#[derive(Default)]
pub struct Callbacks {
    on_text: Option<TextHandler>,
    on_tool_use: Option<ToolUseHandler>,
    on_message: Option<MessageHandler>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler for each non-empty text fragment
    pub fn on_text(mut self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_text = Some(Box::new(handler));
        self
    }

    /// Handler for each tool-use block, awaited before the next one fires
    pub fn on_tool_use<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(ToolUseBlock) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        self.on_tool_use = Some(Box::new(move |block| Box::pin(handler(block))));
        self
    }

    /// Handler for the final assistant message
    pub fn on_message(mut self, handler: impl Fn(&AssistantMessage) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Box::new(handler));
        self
    }

    pub(crate) fn emit_text(&self, fragment: &str) {
        if let Some(handler) = &self.on_text {
            handler(fragment);
        }
    }

    pub(crate) async fn emit_tool_use(&self, block: ToolUseBlock) -> AdapterResult<()> {
        let Some(handler) = &self.on_tool_use else {
            return Ok(());
        };
        let tool = block.name.clone();
        handler(block)
            .await
            .map_err(|source| AdapterError::Callback { tool, source })
    }

    pub(crate) fn emit_message(&self, message: &AssistantMessage) {
        if let Some(handler) = &self.on_message {
            handler(message);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_text", &self.on_text.is_some())
            .field("on_tool_use", &self.on_tool_use.is_some())
            .field("on_message", &self.on_message.is_some())
            .finish()
    }
}

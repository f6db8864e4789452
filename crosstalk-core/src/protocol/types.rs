//! Canonical conversation types
//!
//! These are the shapes the orchestration layer speaks: turns of
//! user/assistant/tool messages, tagged content blocks, tool declarations
//! with a JSON-schema `input_schema`, and the assistant message the
//! adapter hands back. The design prioritizes:
//! - Round-tripping the wire JSON of the canonical contract unchanged
//! - Explicit, typed handling of opaque tool payloads (`serde_json::Value`)
//! - Tolerance for roles outside the canonical set

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a turn in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shopper input, or tool results fed back to the model
    User,
    /// Model output
    Assistant,
    /// Standalone tool response turn
    Tool,
    /// Any role outside the canonical set (e.g. "system")
    #[serde(other)]
    Other,
}

/// Content of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// Ordered content blocks
    Blocks(Vec<ContentBlock>),
    /// Structured payload (tool turns)
    Structured(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

/// Individual content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content block
    Text { text: String },
    /// The assistant asks for a tool to be invoked
    ToolUse(ToolUseBlock),
    /// The result of an earlier tool invocation
    ToolResult(ToolResultBlock),
    /// Any block type outside the ones above (images, documents, ...)
    #[serde(other)]
    Unknown,
}

/// "Invoke tool `name` with `input`"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUseBlock {
    /// Invocation identifier
    pub id: String,

    /// Tool name
    pub name: String,

    /// Tool arguments
    pub input: Value,
}

/// Tool result addressed to an invocation identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultBlock {
    /// Identifier of the invocation this result answers
    pub tool_use_id: String,

    /// Result payload, usually serialized JSON
    #[serde(default)]
    pub content: ToolResultContent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Tool result payload: a string, a list of blocks, or structured data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    Structured(Value),
}

impl Default for ToolResultContent {
    fn default() -> Self {
        ToolResultContent::Text(String::new())
    }
}

impl ToolResultContent {
    /// Text payload of the result
    pub fn text(&self) -> String {
        match self {
            ToolResultContent::Text(text) => text.clone(),
            ToolResultContent::Blocks(blocks) => join_text_blocks(blocks),
            ToolResultContent::Structured(Value::String(text)) => text.clone(),
            ToolResultContent::Structured(value) => value.to_string(),
        }
    }
}

/// A tool invocation recorded on an assistant turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Stable invocation identifier
    pub id: String,

    /// Tool name
    pub name: String,

    /// Argument object, passed through untransformed
    #[serde(default, alias = "input")]
    pub arguments: Value,
}

/// One entry in a conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TurnRepr")]
pub struct Turn {
    /// Role of the turn
    pub role: Role,

    /// Content of the turn
    #[serde(default)]
    pub content: MessageContent,

    /// Tool invocations (assistant turns)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Invocation identifier answered by a tool turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Wire shape of a turn before its content is interpreted
///
/// A `tool` turn's payload is kept as raw JSON: arrays and objects there are
/// tool output, not content blocks.
#[derive(Deserialize)]
struct TurnRepr {
    role: Role,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
    #[serde(default)]
    tool_call_id: Option<String>,
}

impl TryFrom<TurnRepr> for Turn {
    type Error = serde_json::Error;

    fn try_from(repr: TurnRepr) -> Result<Self, Self::Error> {
        let content = match (repr.role, repr.content) {
            (Role::Tool, Value::String(text)) => MessageContent::Text(text),
            (Role::Tool, value) => MessageContent::Structured(value),
            (_, Value::Null) => MessageContent::default(),
            (_, value) => serde_json::from_value(value)?,
        };

        Ok(Self {
            role: repr.role,
            content,
            tool_calls: repr.tool_calls,
            tool_call_id: repr.tool_call_id,
        })
    }
}

/// Tool declaration as the orchestration layer writes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Tool name
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// JSON-schema parameter specification
    pub input_schema: Value,
}

/// Why generation ended, independent of the provider that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
}

/// Token accounting for one assistant message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The assistant message produced for one conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// Always `assistant`
    pub role: Role,

    /// A single text block, or one-or-more tool-use blocks
    pub content: Vec<ContentBlock>,

    /// Normalized stop reason
    pub stop_reason: StopReason,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Inbound request from the orchestration layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far, oldest first
    pub history: Vec<Turn>,

    /// Key of the system instruction to send with this request
    pub system_prompt_key: String,

    /// Tools the model may call
    #[serde(default)]
    pub tools: Vec<ToolDeclaration>,
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Turn {
    /// Create a user turn with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::Text(text.into()))
    }

    /// Create an assistant turn with text content
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, MessageContent::Text(text.into()))
    }

    /// Create an assistant turn that invokes tools
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        let mut turn = Self::new(Role::Assistant, MessageContent::default());
        turn.tool_calls = tool_calls;
        turn
    }

    /// Create a user turn carrying tool results
    pub fn tool_results(results: Vec<ToolResultBlock>) -> Self {
        Self::new(
            Role::User,
            MessageContent::Blocks(results.into_iter().map(ContentBlock::ToolResult).collect()),
        )
    }

    /// Create a standalone tool turn
    pub fn tool(tool_call_id: impl Into<String>, content: MessageContent) -> Self {
        let mut turn = Self::new(Role::Tool, content);
        turn.tool_call_id = Some(tool_call_id.into());
        turn
    }

    /// Create a turn with an arbitrary role and content
    pub fn new(role: Role, content: MessageContent) -> Self {
        Self {
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

impl ToolResultBlock {
    /// Create a tool result with a string payload
    pub fn new(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: ToolResultContent::Text(content.into()),
            is_error: None,
        }
    }
}

impl ToolDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

impl ChatRequest {
    /// Create a new request for a history and system prompt key
    pub fn new(system_prompt_key: impl Into<String>, history: Vec<Turn>) -> Self {
        Self {
            history,
            system_prompt_key: system_prompt_key.into(),
            tools: Vec::new(),
        }
    }

    /// Set the tool declarations
    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }
}

impl MessageContent {
    /// Check if content is empty
    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(s) => s.is_empty(),
            MessageContent::Blocks(blocks) => blocks.is_empty(),
            MessageContent::Structured(value) => value.is_null(),
        }
    }

    /// Every text block joined with a newline, non-text blocks skipped
    pub fn joined_text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Blocks(blocks) => join_text_blocks(blocks),
            MessageContent::Structured(Value::String(s)) => s.clone(),
            MessageContent::Structured(Value::Null) => String::new(),
            MessageContent::Structured(value) => value.to_string(),
        }
    }

    /// Whether the first block is a tool result
    pub fn starts_with_tool_result(&self) -> bool {
        matches!(
            self,
            MessageContent::Blocks(blocks) if matches!(blocks.first(), Some(ContentBlock::ToolResult(_)))
        )
    }

    /// Tool result blocks, in order
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResultBlock> {
        let blocks: &[ContentBlock] = match self {
            MessageContent::Blocks(blocks) => blocks,
            _ => &[],
        };
        blocks.iter().filter_map(|block| match block {
            ContentBlock::ToolResult(result) => Some(result),
            _ => None,
        })
    }
}

impl AssistantMessage {
    /// Create a text-only assistant message
    pub fn text(text: impl Into<String>, stop_reason: StopReason) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::Text { text: text.into() }],
            stop_reason,
            usage: None,
        }
    }

    /// Create an assistant message that requests tool invocations
    pub fn tool_use(blocks: Vec<ToolUseBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: blocks.into_iter().map(ContentBlock::ToolUse).collect(),
            stop_reason: StopReason::ToolUse,
            usage: None,
        }
    }

    /// Text of the message, if it is a text message
    pub fn as_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Tool-use blocks, in order
    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolUseBlock> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolUse(block) => Some(block),
            _ => None,
        })
    }

    /// Convert into a history turn for the next request
    pub fn into_turn(self) -> Turn {
        let tool_calls: Vec<ToolCall> = self
            .tool_uses()
            .map(|block| ToolCall::new(block.id.clone(), block.name.clone(), block.input.clone()))
            .collect();

        if tool_calls.is_empty() {
            Turn::new(Role::Assistant, MessageContent::Blocks(self.content))
        } else {
            Turn::assistant_tool_calls(tool_calls)
        }
    }
}

fn join_text_blocks(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

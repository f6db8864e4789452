//! Protocol module for the canonical chat contract
//!
//! This module defines the canonical data models the orchestration layer is
//! written against. These structures are designed to be:
//! - Provider-agnostic
//! - Wire-compatible with the canonical tool-calling JSON
//! - Type-safe and serializable

pub mod types;

pub use types::{
    AssistantMessage, ChatRequest, ContentBlock, MessageContent, Role, StopReason, ToolCall,
    ToolDeclaration, ToolResultBlock, ToolResultContent, ToolUseBlock, Turn, Usage,
};

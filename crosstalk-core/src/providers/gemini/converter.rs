//! Conversion between the canonical chat contract and Gemini format

use super::types::*;
use crate::adapter::{AdapterError, AdapterResult};
use crate::protocol::{
    AssistantMessage, MessageContent, Role, StopReason, ToolCall, ToolResultBlock,
    ToolResultContent, ToolUseBlock, Turn, Usage,
};
use serde_json::Value;
use tracing::{debug, warn};

// ============================================================================
// Outbound: canonical history -> Gemini contents
// ============================================================================

/// Convert a canonical history into Gemini contents
///
/// Turns whose role is outside `user | assistant | tool` are dropped; the
/// remaining turns keep their relative order.
pub fn to_gemini_contents(history: &[Turn]) -> AdapterResult<Vec<GeminiContent>> {
    let mut contents = Vec::with_capacity(history.len());

    for (index, turn) in history.iter().enumerate() {
        match to_gemini_content(index, turn)? {
            Some(content) => contents.push(content),
            None => warn!(index, role = ?turn.role, "dropping turn with unsupported role"),
        }
    }

    debug!(turns = history.len(), contents = contents.len(), "translated history");
    Ok(contents)
}

/// Convert a single turn, `None` when its role has no Gemini counterpart
fn to_gemini_content(index: usize, turn: &Turn) -> AdapterResult<Option<GeminiContent>> {
    let content = match turn.role {
        Role::Assistant if !turn.tool_calls.is_empty() => GeminiContent::new(
            GeminiRole::Model,
            turn.tool_calls
                .iter()
                .map(|call| GeminiPart::function_call(call.name.clone(), call.arguments.clone()))
                .collect(),
        ),
        Role::Assistant => GeminiContent::new(
            GeminiRole::Model,
            vec![GeminiPart::text(turn.content.joined_text())],
        ),
        Role::User if turn.content.starts_with_tool_result() => GeminiContent::new(
            GeminiRole::Function,
            turn.content
                .tool_results()
                .map(tool_result_to_part)
                .collect::<AdapterResult<Vec<_>>>()?,
        ),
        Role::User => GeminiContent::new(
            GeminiRole::User,
            vec![GeminiPart::text(turn.content.joined_text())],
        ),
        Role::Tool => {
            let tool_call_id = turn.tool_call_id.as_deref().ok_or_else(|| AdapterError::InvalidTurn {
                index,
                reason: "tool turn has no tool_call_id".to_string(),
            })?;
            let response = structured_payload(tool_call_id, &turn.content)?;
            GeminiContent::new(
                GeminiRole::Function,
                vec![GeminiPart::function_response(tool_call_id, response)],
            )
        }
        Role::Other => return Ok(None),
    };

    Ok(Some(content))
}

/// A tool result addresses the call, so the response is named by `tool_use_id`
fn tool_result_to_part(result: &ToolResultBlock) -> AdapterResult<GeminiPart> {
    let response = match &result.content {
        ToolResultContent::Structured(value) if !value.is_string() => value.clone(),
        content => parse_payload(&result.tool_use_id, &content.text())?,
    };
    Ok(GeminiPart::function_response(result.tool_use_id.clone(), response))
}

/// Structured payloads pass through, string payloads are parsed
fn structured_payload(tool_call_id: &str, content: &MessageContent) -> AdapterResult<Value> {
    match content {
        MessageContent::Structured(Value::String(text)) => parse_payload(tool_call_id, text),
        MessageContent::Structured(value) => Ok(value.clone()),
        MessageContent::Text(text) => parse_payload(tool_call_id, text),
        MessageContent::Blocks(_) => parse_payload(tool_call_id, &content.joined_text()),
    }
}

fn parse_payload(tool_use_id: &str, payload: &str) -> AdapterResult<Value> {
    serde_json::from_str(payload).map_err(|source| AdapterError::Parse {
        tool_use_id: tool_use_id.to_string(),
        source,
    })
}

// ============================================================================
// Inbound: Gemini contents -> canonical history
// ============================================================================

/// Convert Gemini contents back into a canonical history
///
/// Function calls become tool calls whose id is the function name, and
/// function responses become tool results addressed by the response name.
pub fn from_gemini_contents(contents: &[GeminiContent]) -> Vec<Turn> {
    contents.iter().map(from_gemini_content).collect()
}

fn from_gemini_content(content: &GeminiContent) -> Turn {
    match content.role {
        Some(GeminiRole::Model) => {
            let tool_calls: Vec<ToolCall> = content
                .function_calls()
                .map(|call| ToolCall::new(call.name.clone(), call.name.clone(), call.args.clone()))
                .collect();

            if tool_calls.is_empty() {
                Turn::assistant(joined_part_text(content))
            } else {
                Turn::assistant_tool_calls(tool_calls)
            }
        }
        Some(GeminiRole::Function) => Turn::tool_results(
            content
                .parts
                .iter()
                .filter_map(|part| part.function_response.as_ref())
                .map(|response| ToolResultBlock::new(response.name.clone(), response.response.to_string()))
                .collect(),
        ),
        Some(GeminiRole::User) | None => Turn::user(joined_part_text(content)),
    }
}

fn joined_part_text(content: &GeminiContent) -> String {
    content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Terminal response -> canonical assistant message
// ============================================================================

/// Tool-use blocks for every function call of a candidate, in order
///
/// Gemini function calls carry no invocation id, so the function name
/// doubles as the id.
pub fn tool_use_blocks(candidate: &Candidate) -> Vec<ToolUseBlock> {
    candidate
        .content
        .iter()
        .flat_map(GeminiContent::function_calls)
        .map(|call| ToolUseBlock {
            id: call.name.clone(),
            name: call.name.clone(),
            input: call.args.clone(),
        })
        .collect()
}

/// Build the canonical assistant message
///
/// Tool-use blocks win over text: a message never mixes the two.
pub fn to_assistant_message(
    text: String,
    tool_uses: Vec<ToolUseBlock>,
    finish_reason: Option<FinishReason>,
    usage: Option<&UsageMetadata>,
) -> AssistantMessage {
    let mut message = if tool_uses.is_empty() {
        AssistantMessage::text(text, map_finish_reason(finish_reason))
    } else {
        AssistantMessage::tool_use(tool_uses)
    };
    message.usage = usage.map(from_usage_metadata);
    message
}

/// Map a Gemini finish reason onto the canonical vocabulary
pub fn map_finish_reason(reason: Option<FinishReason>) -> StopReason {
    match reason {
        Some(FinishReason::MaxTokens) => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    }
}

fn from_usage_metadata(usage: &UsageMetadata) -> Usage {
    Usage {
        input_tokens: usage.prompt_token_count,
        output_tokens: usage.candidates_token_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(Some(FinishReason::Stop), StopReason::EndTurn; "stop")]
    #[test_case(Some(FinishReason::MaxTokens), StopReason::MaxTokens; "max tokens")]
    #[test_case(Some(FinishReason::Safety), StopReason::EndTurn; "safety")]
    #[test_case(Some(FinishReason::MalformedFunctionCall), StopReason::EndTurn; "malformed call")]
    #[test_case(Some(FinishReason::Unknown), StopReason::EndTurn; "unknown")]
    #[test_case(None, StopReason::EndTurn; "absent")]
    fn test_map_finish_reason(reason: Option<FinishReason>, expected: StopReason) {
        assert_eq!(map_finish_reason(reason), expected);
    }

    #[test]
    fn test_tool_uses_discard_text() {
        let message = to_assistant_message(
            "Let me check.".to_string(),
            vec![ToolUseBlock {
                id: "get_cart".into(),
                name: "get_cart".into(),
                input: json!({}),
            }],
            Some(FinishReason::Stop),
            None,
        );

        assert!(message.as_text().is_none());
        assert_eq!(message.stop_reason, StopReason::ToolUse);
    }

    #[test]
    fn test_usage_is_carried() {
        let usage = UsageMetadata {
            prompt_token_count: 40,
            candidates_token_count: 8,
            total_token_count: 48,
        };
        let message = to_assistant_message("ok".into(), Vec::new(), Some(FinishReason::Stop), Some(&usage));
        assert_eq!(
            message.usage,
            Some(Usage {
                input_tokens: 40,
                output_tokens: 8
            })
        );
    }

    #[test]
    fn test_tool_turn_without_id_is_rejected() {
        let turn = Turn {
            role: Role::Tool,
            content: MessageContent::Text("{}".into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        };

        let err = to_gemini_contents(&[turn]).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidTurn { index: 0, .. }));
    }
}

//! Tests for the canonical wire format

use crosstalk_core::protocol::*;
use serde_json::json;

#[test]
fn test_turn_wire_format() {
    let turn: Turn = serde_json::from_value(json!({
        "role": "assistant",
        "content": [
            {"type": "text", "text": "Looking that up"},
            {"type": "tool_use", "id": "toolu_1", "name": "search_products", "input": {"q": "mug"}}
        ]
    }))
    .unwrap();

    assert_eq!(turn.role, Role::Assistant);
    match &turn.content {
        MessageContent::Blocks(blocks) => {
            assert_eq!(blocks.len(), 2);
            assert!(matches!(&blocks[1], ContentBlock::ToolUse(block) if block.name == "search_products"));
        }
        other => panic!("Expected blocks, got {:?}", other),
    }
    assert_eq!(turn.content.joined_text(), "Looking that up");
}

#[test]
fn test_tool_result_with_block_content() {
    let turn: Turn = serde_json::from_value(json!({
        "role": "user",
        "content": [{
            "type": "tool_result",
            "tool_use_id": "toolu_1",
            "content": [{"type": "text", "text": "{\"count\": 2}"}],
            "is_error": false
        }]
    }))
    .unwrap();

    assert!(turn.content.starts_with_tool_result());
    let result = turn.content.tool_results().next().unwrap();
    assert_eq!(result.tool_use_id, "toolu_1");
    assert_eq!(result.content.text(), "{\"count\": 2}");
    assert_eq!(result.is_error, Some(false));
}

#[test]
fn test_tool_call_accepts_input_alias() {
    let call: ToolCall =
        serde_json::from_value(json!({"id": "c1", "name": "get_cart", "input": {"user": 7}})).unwrap();
    assert_eq!(call.arguments, json!({"user": 7}));
}

#[test]
fn test_chat_request_defaults() {
    let request: ChatRequest = serde_json::from_value(json!({
        "history": [{"role": "user", "content": "hi"}],
        "system_prompt_key": "storefront"
    }))
    .unwrap();

    assert!(request.tools.is_empty());
    assert_eq!(request.history[0], Turn::user("hi"));
}

#[test]
fn test_assistant_message_into_turn() {
    let message = AssistantMessage::tool_use(vec![ToolUseBlock {
        id: "get_cart".into(),
        name: "get_cart".into(),
        input: json!({}),
    }]);

    let turn = message.into_turn();
    assert_eq!(turn.role, Role::Assistant);
    assert_eq!(turn.tool_calls, vec![ToolCall::new("get_cart", "get_cart", json!({}))]);
}

#[test]
fn test_stop_reason_serialization() {
    assert_eq!(serde_json::to_value(StopReason::EndTurn).unwrap(), json!("end_turn"));
    assert_eq!(serde_json::to_value(StopReason::ToolUse).unwrap(), json!("tool_use"));
    assert_eq!(serde_json::to_value(StopReason::MaxTokens).unwrap(), json!("max_tokens"));
}

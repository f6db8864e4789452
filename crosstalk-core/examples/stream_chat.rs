//! Stream one storefront chat turn through Gemini
//!
//! Reads the API key from `GEMINI_API_KEY` (or `GOOGLE_API_KEY`), streams
//! text to stdout and prints any tool calls the model asks for.
//!
//! Run with: cargo run --example stream_chat -- "Do you sell travel mugs?"

use crosstalk_core::adapter::CallbackError;
use crosstalk_core::config::{AdapterConfig, ConfigValidator};
use crosstalk_core::protocol::{ChatRequest, ToolDeclaration, Turn};
use crosstalk_core::{Callbacks, ConversationAdapter};
use serde_json::json;
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Do you sell travel mugs?".to_string());

    let config = AdapterConfig::from_env()?.with_prompt(
        "storefront",
        "You are a friendly storefront assistant. Use the tools to look up products.",
    );
    ConfigValidator::new().validate(&config)?;
    let adapter = ConversationAdapter::from_config(&config)?;

    let tools = vec![ToolDeclaration::new(
        "search_products",
        "Search the product catalog",
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "max_price": {"type": "number"}
            },
            "required": ["query"],
            "additional_properties": false
        }),
    )];
    let request = ChatRequest::new("storefront", vec![Turn::user(question)]).with_tools(tools);

    let callbacks = Callbacks::new()
        .on_text(|fragment| {
            print!("{}", fragment);
            let _ = std::io::stdout().flush();
        })
        .on_tool_use(|block| async move {
            println!("\n→ tool call {} {}", block.name, block.input);
            Ok::<(), CallbackError>(())
        });

    match adapter.run(request, &callbacks).await {
        Ok(message) => {
            println!();
            if let Some(usage) = message.usage {
                eprintln!(
                    "stop_reason={:?} input_tokens={} output_tokens={}",
                    message.stop_reason, usage.input_tokens, usage.output_tokens
                );
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("\n{}", err.user_message());
            Err(err.into())
        }
    }
}

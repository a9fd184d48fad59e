/// This example runs one completion through the full pipeline and prints the
/// usage record it leaves behind.
///
/// Configuration comes from the environment (a `.env` file works too):
///  • `OPENAI_API_KEY` is required
///  • `GPT_CORE_CHATGPT_MODEL`, `GPT_CORE_TEMPERATURE`, `GPT_CORE_MAX_TOKENS`
///    and `GPT_CORE_REASONING_EFFORT` are optional
///
/// Set `GPT_CORE_INSPECT=1` to print the raw request and response bodies.
/// Records are appended to `usage.jsonl` in the working directory.
///
/// Run with: RUST_LOG=gpt_core=debug cargo run --example chat-completion
use std::sync::Arc;

use dotenv::dotenv;
use gpt_core::core::InspectorConfig;
use gpt_core::{
    Conversation, EnvConfig, GptService, JsonlUsageSink, Message, OpenAiConfig, Overrides,
    UsageSink,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut openai = OpenAiConfig::default().with_user_agent("gpt-core-demo/0.1");
    if std::env::var("GPT_CORE_INSPECT").is_ok_and(|v| v == "1") {
        openai = openai.with_inspector(
            InspectorConfig::default()
                .on_request(|req| println!("━━━ REQUEST ━━━\n{req:#}\n"))
                .on_response(|res| println!("━━━ RESPONSE ━━━\n{res:#}\n")),
        );
    }

    let sink = Arc::new(JsonlUsageSink::new("usage.jsonl"));
    let service = GptService::openai(openai, Arc::new(EnvConfig), sink.clone())?;

    let conversation = Conversation::new(vec![
        Message::system("You are a concise assistant. Answer in two sentences at most."),
        Message::user("Why do reasoning models sometimes return an empty answer?"),
    ]);

    let text = service
        .chat_completion(&conversation, &Overrides::new())
        .await?;

    println!("━━━ ANSWER ━━━");
    println!("{text}");

    if let Some(record) = sink.list().await?.first() {
        println!();
        println!("━━━ USAGE ━━━");
        println!(
            "model: {} | tokens: {} in / {} out ({} reasoning) | cost: {:.6} {}",
            record.model,
            record.input_tokens,
            record.output_tokens,
            record.reasoning_tokens,
            record.cost,
            record.currency
        );
        if record.used_retry || record.used_fallback {
            println!(
                "retry: {} | fallback: {}",
                record.used_retry, record.used_fallback
            );
        }
    }

    Ok(())
}

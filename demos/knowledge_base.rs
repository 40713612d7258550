//! Example: answer a store question from `demos/kb.json` through the `search_kb` tool.
//!
//! Run with: `GEMINI_API_KEY=... cargo run --example knowledge_base`

use llm_workflows::workflows::ask_knowledge_base;
use llm_workflows::Settings;

const KB_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/kb.json");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let ctx = Settings::from_env()?.into_ctx()?;

    for question in ["What is the return policy?", "What is the weather in Tokyo?"] {
        let answer = ask_knowledge_base(&ctx, KB_PATH, question).await?;
        println!("Q: {}", question);
        println!("A: {} (record {})", answer.output.answer, answer.output.source);
        println!();
    }
    Ok(())
}

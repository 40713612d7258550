//! Example: let the model call `get_weather`, then answer with a typed result.
//!
//! Run with: `GEMINI_API_KEY=... cargo run --example weather_tool`

use llm_workflows::workflows::ask_weather;
use llm_workflows::Settings;

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

    let answer = ask_weather(&ctx, "What's the weather like in Paris today?").await?;

    for call in &answer.tool_calls {
        println!("Called {} with {}", call.name, call.args);
    }
    println!("{}", answer.output.response);
    println!("Temperature: {}°C", answer.output.temperature);
    Ok(())
}

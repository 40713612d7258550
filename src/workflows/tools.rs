//! Function-calling round trip.
//!
//! The first call offers the registry's tools and no response schema. Each
//! function call in the reply is executed locally, then the call and its
//! result are appended to the transcript as a model turn and a user turn.
//! The second call sends the grown transcript with the final schema.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::info;

use crate::backend::{Content, FunctionCall, FunctionResponse};
use crate::error::Result;
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::parsing::truncate;
use crate::stage::Stage;
use crate::tools::{KbResponse, SearchKbTool, ToolRegistry, WeatherResponse, WeatherTool};

pub const WEATHER_INSTRUCTION: &str = "You are a helpful weather assistant.  When users ask about weather in cities, use the get_weather function with approximate coordinates for major cities. ";

pub const KB_INSTRUCTION: &str =
    "You are a helpful assistant that answers questions from the knowledge base about our e-commerce store.";

/// Final answer of a tool-assisted exchange.
#[derive(Debug, Clone)]
pub struct ToolAnswer<T> {
    pub output: T,
    /// Everything sent on the second call, in order.
    pub transcript: Vec<Content>,
    /// Function calls the model made on the first call.
    pub tool_calls: Vec<FunctionCall>,
}

/// Answer `question` with `stage`'s output type, letting the model call tools first.
///
/// A reply without function calls still gets the second, schema-constrained
/// call. A call naming an unregistered tool aborts with
/// [`WorkflowError::UnknownTool`](crate::WorkflowError::UnknownTool).
pub async fn answer_with_tools<T>(
    ctx: &ExecCtx,
    registry: &ToolRegistry,
    stage: &Stage<T>,
    question: &str,
) -> Result<ToolAnswer<T>>
where
    T: DeserializeOwned + JsonSchema,
{
    let mut transcript = vec![Content::user_text(question)];
    let first = stage
        .call_with_tools(ctx, transcript.clone(), registry.declarations())
        .await?;

    let tool_calls: Vec<FunctionCall> = first.function_calls().into_iter().cloned().collect();
    if tool_calls.is_empty() {
        info!(reply = %truncate(&first.text(), 200), "No function call found in the response");
    }

    for call in &tool_calls {
        info!(tool = %call.name, args = %call.args, "Function to call");
        let result = registry.execute(call).await;
        emit(
            &ctx.event_handler,
            Event::ToolInvoked {
                name: call.name.clone(),
                ok: result.is_ok(),
            },
        );
        let output = result?;
        info!(tool = %call.name, result = %output, "Function execution result");

        transcript.push(Content::function_calls(vec![call.clone()]));
        transcript.push(Content::function_responses(vec![FunctionResponse {
            id: call.id.clone(),
            name: call.name.clone(),
            response: json!({ "result": output }),
        }]));
    }

    let answer = stage.run_with(ctx, transcript.clone()).await?;
    Ok(ToolAnswer {
        output: answer.output,
        transcript,
        tool_calls,
    })
}

/// Weather assistant backed by [`WeatherTool`].
pub async fn ask_weather(ctx: &ExecCtx, question: &str) -> Result<ToolAnswer<WeatherResponse>> {
    let registry = ToolRegistry::new().with(WeatherTool::new().with_client(ctx.client.clone()));
    let stage = Stage::<WeatherResponse>::new("weather", WEATHER_INSTRUCTION);
    answer_with_tools(ctx, &registry, &stage, question).await
}

/// Store assistant backed by [`SearchKbTool`] over the file at `kb_path`.
pub async fn ask_knowledge_base(
    ctx: &ExecCtx,
    kb_path: impl Into<PathBuf>,
    question: &str,
) -> Result<ToolAnswer<KbResponse>> {
    let registry = ToolRegistry::new().with(SearchKbTool::new(kb_path));
    let stage = Stage::<KbResponse>::new("knowledge-base", KB_INSTRUCTION);
    answer_with_tools(ctx, &registry, &stage, question).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockBackend, Part, Role};
    use crate::tools::tests::EchoTool;
    use crate::WorkflowError;
    use serde::Deserialize;
    use std::io::Write;
    use std::sync::Arc;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Echoed {
        text: String,
    }

    fn function_call(name: &str, args: serde_json::Value) -> Part {
        Part::FunctionCall(FunctionCall {
            id: None,
            name: name.into(),
            args,
        })
    }

    fn ctx_with(mock: Arc<MockBackend>) -> ExecCtx {
        ExecCtx::builder("http://test").backend(mock).build().unwrap()
    }

    #[tokio::test]
    async fn test_tool_loop_grows_transcript() {
        let mock = Arc::new(MockBackend::from_parts(vec![
            vec![function_call("echo", json!({"text": "hi"}))],
            vec![Part::Text(r#"{"text": "hi"}"#.into())],
        ]));
        let ctx = ctx_with(mock.clone());
        let registry = ToolRegistry::new().with(EchoTool);
        let stage = Stage::<Echoed>::new("echo", "Use the echo tool.");

        let answer = answer_with_tools(&ctx, &registry, &stage, "say hi")
            .await
            .unwrap();
        assert_eq!(answer.output.text, "hi");
        assert_eq!(answer.tool_calls.len(), 1);
        assert_eq!(answer.transcript.len(), 3);
        assert_eq!(answer.transcript[1].role, Role::Model);
        assert_eq!(answer.transcript[2].role, Role::User);
        match &answer.transcript[2].parts[0] {
            Part::FunctionResponse(resp) => {
                assert_eq!(resp.name, "echo");
                assert_eq!(resp.response, json!({"result": {"echo": {"text": "hi"}}}));
            }
            other => panic!("expected function response, got {other:?}"),
        }

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tools.len(), 1);
        assert!(requests[0].response_schema.is_none());
        assert!(requests[1].tools.is_empty());
        assert_eq!(requests[1].response_schema.as_ref().unwrap().name, "Echoed");
        assert_eq!(requests[1].contents.len(), 3);
        assert_eq!(requests[0].system_instruction, requests[1].system_instruction);
    }

    #[tokio::test]
    async fn test_no_function_call_still_makes_second_call() {
        let mock = Arc::new(MockBackend::new(vec![
            "I can answer directly.".into(),
            r#"{"text": "direct"}"#.into(),
        ]));
        let ctx = ctx_with(mock.clone());
        let registry = ToolRegistry::new().with(EchoTool);
        let stage = Stage::<Echoed>::new("echo", "Use the echo tool.");

        let answer = answer_with_tools(&ctx, &registry, &stage, "hi").await.unwrap();
        assert_eq!(answer.output.text, "direct");
        assert!(answer.tool_calls.is_empty());
        assert_eq!(answer.transcript.len(), 1);
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_aborts() {
        let mock = Arc::new(MockBackend::from_parts(vec![vec![function_call(
            "delete_everything",
            json!({}),
        )]]));
        let ctx = ctx_with(mock.clone());
        let registry = ToolRegistry::new().with(EchoTool);
        let stage = Stage::<Echoed>::new("echo", "Use the echo tool.");

        let err = answer_with_tools(&ctx, &registry, &stage, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownTool(ref n) if n == "delete_everything"));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_ask_knowledge_base() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"records": [{{"id": 1, "question": "What is the return policy?", "answer": "30 days."}}]}}"#
        )
        .unwrap();

        let mock = Arc::new(MockBackend::from_parts(vec![
            vec![function_call("search_kb", json!({"question": "What is the return policy?"}))],
            vec![Part::Text(r#"{"answer": "Returns are accepted within 30 days.", "source": 1}"#.into())],
        ]));
        let ctx = ctx_with(mock.clone());

        let answer = ask_knowledge_base(&ctx, file.path(), "What is the return policy?")
            .await
            .unwrap();
        assert_eq!(answer.output.source, 1);

        let second = &mock.requests()[1];
        assert_eq!(second.system_instruction.as_deref(), Some(KB_INSTRUCTION));
        match &second.contents[2].parts[0] {
            Part::FunctionResponse(resp) => {
                assert_eq!(resp.response["result"]["records"][0]["answer"], "30 days.");
            }
            other => panic!("expected function response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_weather_declaration_offered() {
        // No function call: the weather API is never hit.
        let mock = Arc::new(MockBackend::new(vec![
            "Sorry, which city?".into(),
            r#"{"temperature": 0.0, "response": "Which city do you mean?"}"#.into(),
        ]));
        let ctx = ctx_with(mock.clone());

        let answer = ask_weather(&ctx, "What's the weather like?").await.unwrap();
        assert_eq!(answer.output.response, "Which city do you mean?");
        let first = &mock.requests()[0];
        assert_eq!(first.tools[0].name, "get_weather");
        assert_eq!(first.system_instruction.as_deref(), Some(WEATHER_INSTRUCTION));
    }
}

use std::fmt;
use std::marker::PhantomData;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::backend::{Content, FunctionDeclaration, LlmRequest, LlmResponse, ResponseSchema};
use crate::client::LlmConfig;
use crate::error::Result;
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::parsing::{parse_value_defensively, truncate};
use crate::prompt::render;
use crate::schema::response_schema;
use crate::types::StageOutput;
use crate::WorkflowError;

/// One model invocation with a declared output type.
///
/// The response schema sent to the model is derived from `T`, and the reply
/// must deserialize into `T` or the call fails with
/// [`WorkflowError::SchemaMismatch`]. There is no soft validation and no retry.
///
/// The system instruction is a template: `{today}` and any other
/// [`ExecCtx`] variables are substituted at call time.
///
/// # Example
///
/// ```no_run
/// use llm_workflows::{ExecCtx, Stage};
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, JsonSchema)]
/// struct Sentiment {
///     /// "positive", "negative" or "neutral"
///     label: String,
/// }
///
/// # async fn run() -> llm_workflows::Result<()> {
/// let ctx = ExecCtx::builder("https://generativelanguage.googleapis.com")
///     .gemini("AIza...")
///     .build()?;
/// let stage = Stage::<Sentiment>::new("sentiment", "Classify the sentiment of the text.");
/// let out = stage.run(&ctx, "I love this!").await?;
/// println!("{}", out.output.label);
/// # Ok(())
/// # }
/// ```
pub struct Stage<T> {
    name: String,
    system_template: String,
    model: Option<String>,
    config: LlmConfig,
    _output: PhantomData<fn() -> T>,
}

impl<T> Clone for Stage<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            system_template: self.system_template.clone(),
            model: self.model.clone(),
            config: self.config.clone(),
            _output: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Stage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("output", &std::any::type_name::<T>())
            .field("model", &self.model)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Stage<T>
where
    T: DeserializeOwned + JsonSchema,
{
    pub fn new(name: impl Into<String>, system_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_template: system_template.into(),
            model: None,
            config: LlmConfig::default(),
            _output: PhantomData,
        }
    }

    /// Override the context's default model for this stage.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_config(mut self, config: LlmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_template(&self) -> &str {
        &self.system_template
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Model used for this stage under `ctx`.
    pub fn model<'a>(&'a self, ctx: &'a ExecCtx) -> &'a str {
        self.model.as_deref().unwrap_or(&ctx.model)
    }

    /// The system instruction with template variables substituted.
    pub fn system_instruction(&self, ctx: &ExecCtx) -> String {
        render(&self.system_template, &ctx.template_vars())
    }

    /// Assemble the gateway request for this stage.
    pub fn build_request(
        &self,
        ctx: &ExecCtx,
        contents: Vec<Content>,
        response_schema: Option<ResponseSchema>,
        tools: Vec<FunctionDeclaration>,
    ) -> LlmRequest {
        LlmRequest {
            model: self.model(ctx).to_string(),
            system_instruction: Some(self.system_instruction(ctx)),
            contents,
            response_schema,
            tools,
            config: self.config.clone(),
        }
    }

    /// Run the stage on a single user message.
    pub async fn run(&self, ctx: &ExecCtx, input: &str) -> Result<StageOutput<T>> {
        debug!(stage = %self.name, input = %truncate(input, 200), "Stage input");
        self.run_with(ctx, vec![Content::user_text(input)]).await
    }

    /// Run the stage on a prepared transcript, requesting `T`'s schema.
    pub async fn run_with(&self, ctx: &ExecCtx, contents: Vec<Content>) -> Result<StageOutput<T>> {
        let schema = response_schema::<T>()?;
        emit(
            &ctx.event_handler,
            Event::StageStart {
                name: self.name.clone(),
                schema: schema.name.clone(),
            },
        );
        info!(stage = %self.name, schema = %schema.name, "Starting stage");

        let request = self.build_request(ctx, contents, Some(schema), Vec::new());
        let result = self.complete_validated(ctx, &request).await;

        emit(
            &ctx.event_handler,
            Event::StageEnd {
                name: self.name.clone(),
                ok: result.is_ok(),
            },
        );
        match &result {
            Ok(_) => info!(stage = %self.name, "Stage completed"),
            Err(e) => warn!(stage = %self.name, error = %e, "Stage failed"),
        }
        result
    }

    /// Call the model with function declarations and no response schema.
    ///
    /// Used for the first turn of a tool-use exchange; the reply may hold
    /// function calls instead of text.
    pub async fn call_with_tools(
        &self,
        ctx: &ExecCtx,
        contents: Vec<Content>,
        tools: Vec<FunctionDeclaration>,
    ) -> Result<LlmResponse> {
        info!(stage = %self.name, tools = tools.len(), "Calling model with tools");
        let request = self.build_request(ctx, contents, None, tools);
        ctx.backend
            .complete(&ctx.client, &ctx.base_url, &request)
            .await
    }

    /// Check a raw reply against `T`.
    pub fn validate(&self, raw: &str) -> Result<T> {
        let value = parse_value_defensively(raw).map_err(|e| self.mismatch(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| self.mismatch(e.to_string()))
    }

    async fn complete_validated(&self, ctx: &ExecCtx, request: &LlmRequest) -> Result<StageOutput<T>> {
        let response = ctx
            .backend
            .complete(&ctx.client, &ctx.base_url, request)
            .await?;
        let raw_response = response.text();
        let output = self.validate(&raw_response)?;
        Ok(StageOutput {
            output,
            raw_response,
            model: request.model.clone(),
        })
    }

    fn mismatch(&self, message: String) -> WorkflowError {
        WorkflowError::SchemaMismatch {
            stage: self.name.clone(),
            expected: T::schema_name(),
            message,
        }
    }
}

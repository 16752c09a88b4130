use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::response::{AgentResponse, ToolCallRecord};
use crate::session::Session;
use chefbot_core::message::{ToolResult, ToolUse};
use chefbot_core::{Context, Message, Span, SpanKind, ToolCall, Tracer};
use chefbot_llm::{CompletionRequest, LlmProvider, ToolChoice, RAW_ARGUMENTS_KEY};
use chefbot_tools::ToolExecutor;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How much of a malformed argument string is kept on the tool span.
pub const ARGS_PREVIEW_CHARS: usize = 500;

/// Runs the bounded model ↔ tools loop for one user turn.
pub struct Executor {
    config: AgentConfig,
    llm: Arc<dyn LlmProvider>,
    tools: Option<Arc<ToolExecutor>>,
    tracer: Tracer,
}

impl Executor {
    pub fn new(
        config: AgentConfig,
        llm: Arc<dyn LlmProvider>,
        tools: Option<Arc<ToolExecutor>>,
    ) -> Self {
        Self {
            config,
            llm,
            tools,
            tracer: Tracer::default(),
        }
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Runs one turn under a new root span.
    pub async fn execute(&self, session: &Session, user_input: &str) -> Result<AgentResponse> {
        let span = self.tracer.start(self.span_name());
        self.run(span, session, user_input).await
    }

    /// Runs one turn under a span nested in `parent`.
    pub async fn execute_in(
        &self,
        parent: &Span,
        session: &Session,
        user_input: &str,
    ) -> Result<AgentResponse> {
        let span = parent.child(self.span_name());
        self.run(span, session, user_input).await
    }

    fn span_name(&self) -> String {
        format!("agent:{}", self.config.name)
    }

    async fn run(&self, span: Span, session: &Session, user_input: &str) -> Result<AgentResponse> {
        let mut span = span.with_kind(SpanKind::Agent).with_input(user_input);
        span.set_metadata("model", &self.config.model);
        span.set_metadata("max_iterations", self.config.max_iterations);

        session.add_message(Message::user(user_input));

        let mut records = Vec::new();
        let mut plans = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            session.increment_iterations();
            span.trace(&format!("[Iteration {}]", iteration));
            info!(agent = %self.config.name, iteration, "Starting agent loop iteration");

            if self.config.plans_before(iteration) {
                match self.plan(&span, session).await {
                    Ok(plan) => plans.push(plan),
                    Err(e) => {
                        span.error(format!("planning failed: {}", e));
                        return Err(e);
                    }
                }
            }

            let request = self.build_request(session);
            let response = match self.llm.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(agent = %self.config.name, iteration, error = %e, "LLM call failed");
                    span.error(format!("LLM call failed: {}", e));
                    return Err(e.into());
                }
            };

            let tool_uses: Vec<ToolUse> = response
                .message
                .tool_uses()
                .into_iter()
                .cloned()
                .collect();

            if tool_uses.is_empty() {
                let text = response.text_content().trim().to_string();
                session.add_message(Message::assistant(&text));

                span.set_output(&text);
                span.set_metadata("iterations", iteration);
                span.set_metadata("tool_calls", records.len());

                return Ok(AgentResponse::new(*session.id(), text)
                    .with_tool_calls(records)
                    .with_iterations(iteration)
                    .with_plans(plans));
            }

            session.add_message(response.message);

            for tool_use in &tool_uses {
                let call = self.dispatch(&span, session, tool_use).await;
                let result = if call.is_failed() {
                    ToolResult::error(&call.provider_id, call.result_text())
                } else {
                    ToolResult::success(&call.provider_id, call.result_text())
                };
                session.add_message(Message::tool_result(result));
                records.push(ToolCallRecord::from_call(&call));
            }

            session.increment_tool_calls(tool_uses.len());
        }

        warn!(
            agent = %self.config.name,
            max_iterations = self.config.max_iterations,
            "Agent stopped without a final answer"
        );
        span.set_metadata("tool_calls", records.len());
        span.error("max iterations reached");
        Err(AgentError::MaxIterationsReached(self.config.max_iterations))
    }

    /// Runs one requested call. Failures are recorded on the call and handed
    /// back to the model; they never abort the loop.
    async fn dispatch(&self, parent: &Span, session: &Session, tool_use: &ToolUse) -> ToolCall {
        let raw_arguments = tool_use
            .input
            .get(RAW_ARGUMENTS_KEY)
            .and_then(Value::as_str);
        let input = match raw_arguments {
            Some(_) => json!({}),
            None => tool_use.input.clone(),
        };

        let mut span = parent
            .child(format!("tool:{}", tool_use.name))
            .with_kind(SpanKind::Tool)
            .with_input(&input);

        if let Some(raw) = raw_arguments {
            warn!(tool = %tool_use.name, "Model sent tool arguments that are not valid JSON");
            span.error("Invalid JSON arguments from model");
            span.set_metadata("tool", &tool_use.name);
            span.set_metadata(
                "args_raw",
                raw.chars().take(ARGS_PREVIEW_CHARS).collect::<String>(),
            );
        }

        span.trace(&format!("Tool call: {}({})", tool_use.name, input));

        let mut call = ToolCall::new(&tool_use.id, &tool_use.name, input);

        match self
            .tools
            .as_ref()
            .filter(|tools| tools.registry().contains(&tool_use.name))
        {
            Some(tools) => {
                let ctx = Context::new()
                    .with_timeout(self.config.tool_timeout())
                    .with_session(*session.id())
                    .with_tracer(parent.tracer().clone());
                if let Err(e) = tools.execute_call(&ctx, &mut call).await {
                    debug!(tool = %tool_use.name, error = %e, "Tool error returned to the model");
                }
            }
            None => {
                warn!(tool = %tool_use.name, "Model requested an unknown tool");
                call.start();
                call.fail(json!({ "error": format!("unknown tool '{}'", tool_use.name) }).to_string());
            }
        }

        span.trace(&format!("Result: {}", call.result_text()));
        span.set_output(call.result_text());
        if call.is_failed() && !span.is_error() {
            span.warn(call.result_text());
        }

        call
    }

    /// Asks the model, without tools, for a short plan of the next steps and
    /// records it in the session as an assistant note.
    async fn plan(&self, parent: &Span, session: &Session) -> Result<String> {
        let mut span = parent.child("planning").with_kind(SpanKind::Generation);

        let mut messages = session.last_messages(self.config.max_context_messages);
        messages.push(Message::user(self.planning_prompt()));

        let request = CompletionRequest::new(&self.config.model, messages)
            .with_system(&self.config.system_prompt)
            .with_temperature(self.config.temperature);

        let response = match self.llm.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                span.error(e.to_string());
                return Err(e.into());
            }
        };

        let plan = response.text_content().trim().to_string();
        let note = format!("Plan: {}", plan);
        span.trace(&note);
        span.set_output(&plan);
        session.add_message(Message::assistant(note));

        debug!(agent = %self.config.name, "Planning step recorded");
        Ok(plan)
    }

    fn planning_prompt(&self) -> String {
        let tools = self
            .tools
            .as_ref()
            .map(|tools| tools.registry().list().join(", "))
            .filter(|names| !names.is_empty())
            .unwrap_or_else(|| "aucun".to_string());

        format!(
            "Avant d'agir, fais le point sur la conversation et rédige un plan court \
             (3 à 5 étapes numérotées) des prochaines actions.\n\
             Outils disponibles : {}.\n\
             Ne réponds pas encore à la demande et n'appelle aucun outil.",
            tools
        )
    }

    fn build_request(&self, session: &Session) -> CompletionRequest {
        let messages = session.last_messages(self.config.max_context_messages);

        let mut request = CompletionRequest::new(&self.config.model, messages)
            .with_system(&self.config.system_prompt)
            .with_temperature(self.config.temperature);

        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        if self.config.tools_enabled {
            if let Some(tools) = &self.tools {
                let definitions = tools.registry().definitions();
                if !definitions.is_empty() {
                    request = request
                        .with_tools(definitions)
                        .with_tool_choice(ToolChoice::Auto)
                        .with_parallel_tool_calls(self.config.parallel_tool_calls);
                }
            }
        }

        request
    }
}

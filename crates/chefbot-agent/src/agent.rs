use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::executor::Executor;
use crate::response::AgentResponse;
use crate::session::Session;
use chefbot_core::{Span, Tracer};
use chefbot_llm::LlmProvider;
use chefbot_tools::{ToolExecutor, ToolRegistry};
use std::sync::Arc;

pub struct Agent {
    config: AgentConfig,
    llm: Arc<dyn LlmProvider>,
    tools: Option<Arc<ToolExecutor>>,
    tracer: Tracer,
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools
            .as_ref()
            .map(|tools| {
                tools
                    .registry()
                    .list()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn create_session(&self) -> Session {
        Session::new().with_metadata("agent", &self.config.name)
    }

    pub async fn chat(&self, session: &Session, message: &str) -> Result<String> {
        let response = self.process(session, message).await?;
        Ok(response.text)
    }

    pub async fn process(&self, session: &Session, message: &str) -> Result<AgentResponse> {
        self.executor().execute(session, message).await
    }

    /// Like [`Agent::process`], with the run recorded as a child of `parent`.
    pub async fn process_in(
        &self,
        parent: &Span,
        session: &Session,
        message: &str,
    ) -> Result<AgentResponse> {
        self.executor().execute_in(parent, session, message).await
    }

    fn executor(&self) -> Executor {
        Executor::new(self.config.clone(), self.llm.clone(), self.tools.clone())
            .with_tracer(self.tracer.clone())
    }
}

#[derive(Default)]
pub struct AgentBuilder {
    config: Option<AgentConfig>,
    name: Option<String>,
    system_prompt: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_iterations: Option<usize>,
    planning_interval: Option<usize>,
    parallel_tool_calls: Option<bool>,
    tools_enabled: Option<bool>,
    llm: Option<Arc<dyn LlmProvider>>,
    tool_registry: Option<Arc<ToolRegistry>>,
    tracer: Option<Tracer>,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn planning_interval(mut self, interval: usize) -> Self {
        self.planning_interval = Some(interval);
        self
    }

    pub fn parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = Some(parallel);
        self
    }

    pub fn tools_enabled(mut self, enabled: bool) -> Self {
        self.tools_enabled = Some(enabled);
        self
    }

    pub fn llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    pub fn tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn build(self) -> Result<Agent> {
        let llm = self.llm.ok_or_else(|| AgentError::config("LLM provider is required"))?;

        let mut config = self.config.unwrap_or_default();

        if let Some(name) = self.name {
            config.name = name;
        }
        if let Some(prompt) = self.system_prompt {
            config.system_prompt = prompt;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(temp) = self.temperature {
            config.temperature = temp;
        }
        if let Some(max) = self.max_tokens {
            config.max_tokens = Some(max);
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = max;
        }
        if let Some(interval) = self.planning_interval {
            config.planning_interval = Some(interval);
        }
        if let Some(parallel) = self.parallel_tool_calls {
            config.parallel_tool_calls = parallel;
        }
        if let Some(enabled) = self.tools_enabled {
            config.tools_enabled = enabled;
        }

        if config.max_iterations == 0 {
            return Err(AgentError::config("max_iterations must be at least 1"));
        }

        let tools = self.tool_registry.map(|registry| {
            Arc::new(ToolExecutor::new(registry).with_timeout(config.tool_timeout()))
        });

        Ok(Agent {
            config,
            llm,
            tools,
            tracer: self.tracer.unwrap_or_default(),
        })
    }
}

use chefbot_core::config::LlmConfig;
use chefbot_core::{Config, Span, SpanKind, Tracer};
use chefbot_llm::LlmProvider;
use std::sync::Arc;

/// Which model serves which role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Models {
    /// Plain chat: the chef, the planner and the evaluation task.
    pub chat: String,
    /// Tool-calling agents.
    pub tools: String,
    pub judge: String,
}

impl Models {
    pub fn from_llm_config(config: &LlmConfig) -> Self {
        Self {
            chat: config.default_model.clone(),
            tools: config.tool_model.clone(),
            judge: config.judge_model.clone(),
        }
    }
}

impl Default for Models {
    fn default() -> Self {
        Self::from_llm_config(&LlmConfig::default())
    }
}

/// Shared handle for every ChefBot feature: the provider, the models, the
/// tracer and the group tag stamped on every root span.
#[derive(Clone)]
pub struct ChefBot {
    llm: Arc<dyn LlmProvider>,
    models: Models,
    tracer: Tracer,
    group: String,
}

impl ChefBot {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            models: Models::default(),
            tracer: Tracer::default(),
            group: "Groupe".to_string(),
        }
    }

    pub fn from_config(config: &Config, llm: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm)
            .with_models(Models::from_llm_config(&config.llm))
            .with_group(&config.observability.group)
    }

    pub fn with_models(mut self, models: Models) -> Self {
        self.models = models;
        self
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    pub fn models(&self) -> &Models {
        &self.models
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Root span `<group>_Partie_<n>` tagged `Partie_<n>` and the group.
    pub(crate) fn partie_span(&self, partie: u8, kind: SpanKind) -> Span {
        let mut span = self
            .tracer
            .start(format!("{}_Partie_{}", self.group, partie))
            .with_kind(kind)
            .with_tags([format!("Partie_{}", partie), self.group.clone()]);
        span.set_metadata("partie", partie.to_string());
        span
    }
}

impl std::fmt::Debug for ChefBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChefBot")
            .field("provider", &self.llm.name())
            .field("models", &self.models)
            .field("group", &self.group)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefbot_core::observe::MemorySink;
    use chefbot_llm::testing::ScriptedProvider;

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.observability.group = "Groupe_Test".to_string();
        config.llm.judge_model = "judge".to_string();

        let bot = ChefBot::from_config(&config, Arc::new(ScriptedProvider::new()));
        assert_eq!(bot.group(), "Groupe_Test");
        assert_eq!(bot.models().judge, "judge");
        assert_eq!(bot.models().tools, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_partie_span_naming() {
        let sink = Arc::new(MemorySink::new());
        let bot = ChefBot::new(Arc::new(ScriptedProvider::new()))
            .with_group("G")
            .with_tracer(Tracer::new().with_sink(sink.clone()));

        bot.partie_span(3, SpanKind::Chain).end();

        let span = &sink.find("G_Partie_3")[0];
        assert_eq!(span.tags, vec!["Partie_3", "G"]);
        assert_eq!(span.metadata.get::<String>("partie").as_deref(), Some("3"));
        assert_eq!(span.kind, SpanKind::Chain);
    }
}

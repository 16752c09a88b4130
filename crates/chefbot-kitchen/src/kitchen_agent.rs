//! The kitchen agent: the dinner question answered with fridge, recipe and
//! dietary tools, either through the bare loop or through the `Agent` API.

use crate::chefbot::ChefBot;
use crate::error::{KitchenError, Result};
use crate::prompts::{
    DINNER_QUESTION, DINNER_QUESTION_RECIPE_HINT, FRAMEWORK_AGENT_SYSTEM, KITCHEN_AGENT_SYSTEM,
};
use chefbot_agent::{Agent, AgentConfig, AgentResponse, Executor, Session};
use chefbot_core::{Span, SpanKind};
use chefbot_tools::kitchen::{cooking_registry, KitchenCatalog};
use chefbot_tools::{ToolExecutor, ToolRegistry};
use std::sync::Arc;
use tracing::info;

pub const MANUAL_AGENT_NAME: &str = "manual_tool_calling_agent";
pub const FRAMEWORK_AGENT_NAME: &str = "framework_agent";

const AGENT_TEMPERATURE: f32 = 0.2;
const AGENT_MAX_ITERATIONS: usize = 5;

/// The dinner question with the reminder to fetch the final recipe.
pub fn manual_agent_question() -> String {
    format!("{}\n{}", DINNER_QUESTION, DINNER_QUESTION_RECIPE_HINT)
}

fn kitchen_registry() -> Result<Arc<ToolRegistry>> {
    let catalog = Arc::new(KitchenCatalog::weeknight());
    Ok(Arc::new(cooking_registry(catalog)?))
}

impl ChefBot {
    pub async fn manual_tool_calling_agent(&self, question: &str) -> Result<AgentResponse> {
        let config = AgentConfig::new(&self.models().tools, KITCHEN_AGENT_SYSTEM)
            .with_name(MANUAL_AGENT_NAME)
            .with_temperature(AGENT_TEMPERATURE)
            .with_max_iterations(AGENT_MAX_ITERATIONS)
            .with_parallel_tool_calls(false);
        let tools = ToolExecutor::new(kitchen_registry()?).with_timeout(config.tool_timeout());
        let executor = Executor::new(config, self.llm().clone(), Some(Arc::new(tools)))
            .with_tracer(self.tracer().clone());

        let mut span = self
            .partie_span(4, SpanKind::Agent)
            .with_input(question);
        span.set_metadata("variant", "manual");

        let result = executor.execute_in(&span, &Session::new(), question).await;
        self.finish_agent_span(&mut span, &result);
        result.map_err(KitchenError::from)
    }

    pub async fn run_framework_agent(&self, question: &str) -> Result<AgentResponse> {
        let agent = Agent::builder()
            .name(FRAMEWORK_AGENT_NAME)
            .system_prompt(FRAMEWORK_AGENT_SYSTEM)
            .model(&self.models().tools)
            .temperature(AGENT_TEMPERATURE)
            .max_iterations(AGENT_MAX_ITERATIONS)
            .llm(self.llm().clone())
            .tool_registry(kitchen_registry()?)
            .tracer(self.tracer().clone())
            .build()?;

        let mut span = self
            .partie_span(4, SpanKind::Agent)
            .with_input(question);
        span.set_metadata("variant", "framework");

        let session = agent.create_session();
        let result = agent.process_in(&span, &session, question).await;
        self.finish_agent_span(&mut span, &result);
        result.map_err(KitchenError::from)
    }

    fn finish_agent_span(
        &self,
        span: &mut Span,
        result: &chefbot_agent::Result<AgentResponse>,
    ) {
        match result {
            Ok(response) => {
                span.set_metadata("iterations", response.iterations);
                span.set_metadata("tool_calls", response.tool_call_count());
                span.set_metadata("status", "success");
                span.set_output(&response.text);
                info!(
                    iterations = response.iterations,
                    tool_calls = response.tool_call_count(),
                    "Kitchen agent answered"
                );
            }
            Err(e) => span.error(e.to_string()),
        }
        self.tracer().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefbot_core::observe::MemorySink;
    use chefbot_core::Tracer;
    use chefbot_llm::testing::ScriptedProvider;
    use serde_json::json;

    fn bot(llm: Arc<ScriptedProvider>) -> (ChefBot, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let bot = ChefBot::new(llm).with_tracer(Tracer::new().with_sink(sink.clone()));
        (bot, sink)
    }

    #[test]
    fn test_manual_question() {
        let question = manual_agent_question();
        assert!(question.starts_with("Je veux un dîner pour 2 personnes"));
        assert!(question.ends_with("pour la recette finale que tu recommandes."));
    }

    #[tokio::test]
    async fn test_manual_agent_uses_tools_then_answers() {
        let llm = Arc::new(
            ScriptedProvider::new()
                .with_tool_calls(vec![("call_1", "check_fridge", json!({}))])
                .with_tool_calls(vec![(
                    "call_2",
                    "get_recipe",
                    json!({"dish_name": "Curry de pois chiches"}),
                )])
                .with_text("Option 1 : curry de pois chiches. Option 2 : shakshuka."),
        );
        let (bot, sink) = bot(llm.clone());

        let response = bot
            .manual_tool_calling_agent(&manual_agent_question())
            .await
            .unwrap();
        assert_eq!(response.iterations, 3);
        assert!(response.tool_calls[0].output.contains("pois chiches"));
        assert!(response.tool_calls[1].output.contains("Curry de pois chiches facile"));

        let request = &llm.requests()[0];
        assert_eq!(request.temperature, Some(0.2));
        assert!(request.system.as_deref().unwrap_or("").contains("<function=...>"));
        assert_eq!(request.tools.as_ref().map(Vec::len), Some(3));

        let lines = sink.lines();
        assert!(lines.contains(&"[Iteration 1]".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("Tool call: check_fridge({})")));
        assert!(lines.iter().any(|l| l.starts_with("Result: ")));

        let root = &sink.find("Groupe_Partie_4")[0];
        assert_eq!(root.metadata.get::<String>("variant").as_deref(), Some("manual"));
        assert_eq!(root.metadata.get::<usize>("tool_calls"), Some(2));
        assert_eq!(sink.find("agent:manual_tool_calling_agent").len(), 1);
    }

    #[tokio::test]
    async fn test_manual_agent_stops_after_five_iterations() {
        let mut provider = ScriptedProvider::new();
        for i in 0..5 {
            provider = provider.with_tool_calls(vec![(
                &*format!("call_{}", i),
                "check_fridge",
                json!({}),
            )]);
        }
        let (bot, sink) = bot(Arc::new(provider));

        let err = bot.manual_tool_calling_agent("Boucle").await.unwrap_err();
        assert!(err.is_max_iterations());
        assert!(matches!(err, KitchenError::Agent(_)));
        assert!(sink.find("Groupe_Partie_4")[0].is_error());
    }

    #[tokio::test]
    async fn test_framework_agent() {
        let llm = Arc::new(
            ScriptedProvider::new()
                .with_tool_calls(vec![(
                    "call_1",
                    "check_dietary_info",
                    json!({"ingredient": "tofu"}),
                )])
                .with_text("Tofu sauté aux épinards."),
        );
        let (bot, sink) = bot(llm);

        let response = bot.run_framework_agent(DINNER_QUESTION).await.unwrap();
        assert_eq!(response.text, "Tofu sauté aux épinards.");
        assert!(response.tool_calls[0].output.contains("\"vegan\":true"));
        assert_eq!(sink.find("agent:framework_agent").len(), 1);
    }
}

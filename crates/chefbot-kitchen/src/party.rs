//! Four agents planning a dinner party together: the chef proposes, the
//! budget agent prices, the nutritionist checks and the manager answers.

use crate::chefbot::ChefBot;
use crate::error::Result;
use crate::prompts::{
    self, BUDGET_INSTRUCTIONS, CHEF_INSTRUCTIONS, MANAGER_INSTRUCTIONS, NUTRITIONIST_INSTRUCTIONS,
};
use chefbot_agent::Agent;
use chefbot_core::{Span, SpanKind};
use chefbot_tools::kitchen::{
    CalculateTool, CheckDietaryInfoTool, CheckFridgeTool, GetRecipeTool, KitchenCatalog,
    MenuDatabaseTool,
};
use chefbot_tools::{Tool, ToolRegistry};
use std::sync::Arc;
use tracing::{info, warn};

const SUB_AGENT_MAX_ITERATIONS: usize = 3;
const MANAGER_MAX_ITERATIONS: usize = 2;

pub struct DinnerPartyTeam {
    bot: ChefBot,
    chef: Agent,
    budget: Agent,
    nutritionist: Agent,
    manager: Agent,
}

impl DinnerPartyTeam {
    pub fn new(bot: &ChefBot) -> Result<Self> {
        let catalog = Arc::new(KitchenCatalog::dinner_party());

        let chef = Self::agent(
            bot,
            "chef_agent",
            CHEF_INSTRUCTIONS,
            SUB_AGENT_MAX_ITERATIONS,
        )
        .tool_registry(Arc::new(ToolRegistry::from_tools([
            Arc::new(CheckFridgeTool::new(catalog.clone())) as Arc<dyn Tool>,
            Arc::new(GetRecipeTool::new(catalog.clone())),
        ])?))
        .build()?;

        let budget = Self::agent(
            bot,
            "budget_agent",
            BUDGET_INSTRUCTIONS,
            SUB_AGENT_MAX_ITERATIONS,
        )
        .tool_registry(Arc::new(ToolRegistry::from_tools([
            Arc::new(CalculateTool::new()) as Arc<dyn Tool>,
            Arc::new(MenuDatabaseTool::new(catalog.clone())),
        ])?))
        .build()?;

        let nutritionist = Self::agent(
            bot,
            "nutritionist",
            NUTRITIONIST_INSTRUCTIONS,
            SUB_AGENT_MAX_ITERATIONS,
        )
        .tool_registry(Arc::new(ToolRegistry::from_tools([
            Arc::new(CheckDietaryInfoTool::new(catalog)) as Arc<dyn Tool>,
        ])?))
        .build()?;

        let manager = Self::agent(bot, "manager", MANAGER_INSTRUCTIONS, MANAGER_MAX_ITERATIONS)
            .tools_enabled(false)
            .build()?;

        Ok(Self {
            bot: bot.clone(),
            chef,
            budget,
            nutritionist,
            manager,
        })
    }

    fn agent(
        bot: &ChefBot,
        name: &str,
        instructions: &str,
        max_iterations: usize,
    ) -> chefbot_agent::AgentBuilder {
        Agent::builder()
            .name(name)
            .system_prompt(instructions)
            .model(&bot.models().tools)
            .max_iterations(max_iterations)
            .llm(bot.llm().clone())
            .tracer(bot.tracer().clone())
    }

    pub fn agents(&self) -> [&Agent; 4] {
        [&self.chef, &self.budget, &self.nutritionist, &self.manager]
    }

    fn trace(&self, line: &str) {
        self.bot.tracer().trace(line);
    }

    /// Runs a sub-agent. A failure becomes an `ERREUR: ...` note so the
    /// next agents still get an input.
    async fn consult(&self, parent: &mut Span, agent: &Agent, label: &str, prompt: &str) -> String {
        let session = agent.create_session();
        let out = match agent.process_in(parent, &session, prompt).await {
            Ok(response) => response.text,
            Err(e) => {
                warn!(agent = label, error = %e, "Sub-agent failed");
                parent.warn(format!("{} failed: {}", label, e));
                format!("ERREUR: {}", e)
            }
        };
        self.trace(&format!("\n[{}]\n{}", label, out));
        out
    }

    pub async fn manager_run(&self, request: &str) -> Result<String> {
        let mut span = self
            .bot
            .partie_span(6, SpanKind::Chain)
            .with_input(request);

        let rule = "=".repeat(80);
        self.trace(&rule);
        self.trace("PARTIE 6 - MULTI AGENT RUN");
        self.trace(request);
        self.trace(&rule);

        let chef_out = self
            .consult(&mut span, &self.chef, "chef_agent", &prompts::chef_prompt(request))
            .await;
        let budget_out = self
            .consult(&mut span, &self.budget, "budget_agent", &prompts::budget_prompt(request))
            .await;
        let nutri_out = self
            .consult(
                &mut span,
                &self.nutritionist,
                "nutritionist",
                &prompts::nutrition_prompt(request, &chef_out, &budget_out),
            )
            .await;

        let session = self.manager.create_session();
        let manager_prompt = prompts::manager_prompt(request, &chef_out, &budget_out, &nutri_out);
        let result = self
            .manager
            .process_in(&span, &session, &manager_prompt)
            .await;
        let result = match result {
            Ok(response) => {
                self.trace(&format!("\n[manager_final]\n{}", response.text));
                span.set_output(&response.text);
                span.set_metadata("status", "success");
                info!(chars = response.text.len(), "Dinner party plan ready");
                Ok(response.text)
            }
            Err(e) => {
                self.trace(&format!("\n[manager_final]\nERREUR: {}", e));
                span.error(e.to_string());
                Err(e.into())
            }
        };
        self.bot.tracer().flush();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::PARTY_REQUEST;
    use chefbot_core::observe::MemorySink;
    use chefbot_core::{SpanLevel, Tracer};
    use chefbot_llm::testing::ScriptedProvider;
    use serde_json::json;

    fn team(llm: ScriptedProvider) -> (DinnerPartyTeam, Arc<ScriptedProvider>, Arc<MemorySink>) {
        let llm = Arc::new(llm);
        let sink = Arc::new(MemorySink::new());
        let bot = ChefBot::new(llm.clone()).with_tracer(Tracer::new().with_sink(sink.clone()));
        (DinnerPartyTeam::new(&bot).unwrap(), llm, sink)
    }

    #[test]
    fn test_team_tools() {
        let (team, _, _) = team(ScriptedProvider::new());
        let [chef, budget, nutritionist, manager] = team.agents();
        assert_eq!(chef.tool_names(), ["check_fridge", "get_recipe"]);
        assert_eq!(budget.tool_names(), ["calculate", "menu_database"]);
        assert_eq!(nutritionist.tool_names(), ["check_dietary_info"]);
        assert!(!manager.config().tools_enabled);
        assert_eq!(manager.config().max_iterations, 2);
        assert_eq!(chef.config().max_iterations, 3);
    }

    #[tokio::test]
    async fn test_manager_run_chains_outputs() {
        let (team, llm, sink) = team(
            ScriptedProvider::new()
                .with_tool_calls(vec![("c1", "get_recipe", json!({"dish_name": "Houmous"}))])
                .with_text(r#"{"aperitif": ["houmous"]}"#)
                .with_tool_calls(vec![("c2", "calculate", json!({"expression": "5.5 * 8"}))])
                .with_text(r#"{"total_eur": 44}"#)
                .with_text(r#"{"ok": true}"#)
                .with_text("Menu final : houmous, curry, salade de fruits."),
        );

        let answer = team.manager_run(PARTY_REQUEST).await.unwrap();
        assert_eq!(answer, "Menu final : houmous, curry, salade de fruits.");

        let requests = llm.requests();
        let nutrition = requests[4].messages[0].text_content();
        assert!(nutrition.contains(r#"Propositions chef: {"aperitif": ["houmous"]}"#));
        assert!(nutrition.contains(r#"Menu budget: {"total_eur": 44}"#));
        let manager = requests[5].messages[0].text_content();
        assert!(manager.contains("NUTRITION:\n{\"ok\": true}"));
        assert!(requests[5].tools.is_none());

        let lines = sink.lines();
        assert_eq!(lines[1], "PARTIE 6 - MULTI AGENT RUN");
        assert!(lines.contains(&"\n[budget_agent]\n{\"total_eur\": 44}".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("Result: 44")));
        assert!(lines.contains(&"\n[manager_final]\nMenu final : houmous, curry, salade de fruits.".to_string()));

        let root = &sink.find("Groupe_Partie_6")[0];
        assert_eq!(root.level, SpanLevel::Default);
        assert_eq!(sink.find("agent:nutritionist").len(), 1);
    }

    #[tokio::test]
    async fn test_sub_agent_failure_is_recorded() {
        let (team, llm, sink) = team(
            ScriptedProvider::new()
                .with_error("surcharge")
                .with_text("budget ok")
                .with_text("nutrition ok")
                .with_text("Synthèse malgré tout."),
        );

        let answer = team.manager_run(PARTY_REQUEST).await.unwrap();
        assert_eq!(answer, "Synthèse malgré tout.");

        let manager = llm.requests()[3].messages[0].text_content();
        assert!(manager.contains("CHEF:\nERREUR: "));
        assert!(sink.lines().iter().any(|l| l.starts_with("\n[chef_agent]\nERREUR: ")));
        assert_eq!(sink.find("Groupe_Partie_6")[0].level, SpanLevel::Warning);
    }

    #[tokio::test]
    async fn test_manager_failure_propagates() {
        let (team, _, sink) = team(
            ScriptedProvider::new()
                .with_text("a")
                .with_text("b")
                .with_text("c")
                .with_error("plus de crédit"),
        );

        assert!(team.manager_run(PARTY_REQUEST).await.is_err());
        assert!(sink.find("Groupe_Partie_6")[0].is_error());
    }
}

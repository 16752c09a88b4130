use crate::chefbot::ChefBot;
use crate::error::Result;
use crate::prompts::WAITER_INSTRUCTIONS;
use chefbot_agent::{Agent, Session};
use chefbot_core::{Span, SpanKind};
use chefbot_tools::kitchen::{restaurant_registry, KitchenCatalog};
use chrono::Local;
use std::sync::Arc;
use tracing::info;

pub const WAITER_NAME: &str = "restaurant_waiter";

/// The waiter agent: builds group menus from the menu database and adds up
/// the bill, re-planning every second iteration.
pub struct RestaurantWaiter {
    bot: ChefBot,
    agent: Agent,
}

impl RestaurantWaiter {
    pub fn new(bot: &ChefBot) -> Result<Self> {
        let registry = restaurant_registry(Arc::new(KitchenCatalog::weeknight()))?;
        let agent = Agent::builder()
            .name(WAITER_NAME)
            .system_prompt(WAITER_INSTRUCTIONS)
            .model(&bot.models().tools)
            .max_iterations(5)
            .planning_interval(2)
            .llm(bot.llm().clone())
            .tool_registry(Arc::new(registry))
            .tracer(bot.tracer().clone())
            .build()?;
        Ok(Self {
            bot: bot.clone(),
            agent,
        })
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    fn trace(&self, line: &str) {
        self.bot.tracer().trace(line);
    }

    pub fn write_header(&self) {
        let rule = "=".repeat(70);
        self.trace(&rule);
        self.trace("RESTAURANT INTELLIGENT - RUN TRACE");
        self.trace(&format!("timestamp={}", Local::now().to_rfc3339()));
        self.trace(&rule);
    }

    fn root_span(&self, scenario: &str) -> Span {
        let mut span = self.bot.partie_span(5, SpanKind::Agent);
        span.set_metadata("scenario", scenario);
        span
    }

    /// One request on a fresh session.
    pub async fn plan_group_menu(&self, question: &str) -> Result<String> {
        let mut span = self.root_span("planning").with_input(question);
        self.trace("\n--- 5.2 TEST (planning agent) ---");
        self.trace(&format!("USER: {}", question));

        let session = self.agent.create_session();
        match self.agent.process_in(&span, &session, question).await {
            Ok(response) => {
                self.trace(&format!("AGENT: {}", response.text));
                span.set_metadata("plans", response.plans.len());
                span.set_output(&response.text);
                Ok(response.text)
            }
            Err(e) => {
                self.trace(&format!("AGENT: Error: {}", e));
                span.error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Several turns on one session; the history is never reset between turns.
    pub async fn conversation(&self, turns: &[&str]) -> Result<Vec<String>> {
        let session = self.agent.create_session();
        let mut span = self.root_span("conversation");
        span.set_metadata("turns", turns.len());
        self.trace(&format!(
            "\n--- 5.3 TEST (conversation, {} turns) ---",
            turns.len()
        ));

        let mut answers = Vec::with_capacity(turns.len());
        for (i, turn) in turns.iter().enumerate() {
            let answer = self.turn(&span, &session, i + 1, turn).await;
            match answer {
                Ok(answer) => answers.push(answer),
                Err(e) => {
                    span.error(e.to_string());
                    return Err(e);
                }
            }
        }

        span.set_output(&answers);
        info!(turns = answers.len(), "Conversation finished");
        Ok(answers)
    }

    async fn turn(&self, parent: &Span, session: &Session, n: usize, message: &str) -> Result<String> {
        self.trace(&format!("USER({}): {}", n, message));
        match self.agent.process_in(parent, session, message).await {
            Ok(response) => {
                self.trace(&format!("AGENT({}): {}", n, response.text));
                Ok(response.text)
            }
            Err(e) => {
                self.trace(&format!("AGENT({}): Error: {}", n, e));
                Err(e.into())
            }
        }
    }

    /// A free-form turn for interactive use, on the caller's session.
    pub async fn chat(&self, session: &Session, message: &str) -> Result<String> {
        Ok(self.agent.chat(session, message).await?)
    }
}

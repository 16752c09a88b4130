use crate::chefbot::ChefBot;
use crate::error::Result;
use crate::prompts::CHEF_SYSTEM;
use chefbot_core::{Message, SpanKind};
use chefbot_llm::chat;
use tracing::info;

impl ChefBot {
    /// One question to the seasonal chef at the given temperature.
    pub async fn ask_chef(&self, question: &str, temperature: f32) -> Result<String> {
        let mut span = self
            .partie_span(1, SpanKind::Generation)
            .with_input(question);

        let messages = vec![Message::system(CHEF_SYSTEM), Message::user(question)];
        match chat(self.llm().as_ref(), &self.models().chat, messages, temperature).await {
            Ok(answer) => {
                span.set_metadata("type", "response");
                span.set_metadata("season", "winter");
                span.set_metadata("output", &answer);
                span.set_metadata("temperature", temperature);
                span.set_metadata("status", "success");
                span.set_output(&answer);
                info!(temperature, chars = answer.len(), "Chef answered");
                Ok(answer)
            }
            Err(e) => {
                span.error(e.to_string());
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::chefbot::ChefBot;
    use crate::error::KitchenError;
    use chefbot_core::observe::MemorySink;
    use chefbot_core::{Role, SpanLevel, Tracer};
    use chefbot_llm::testing::ScriptedProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ask_chef_records_metadata() {
        let llm = Arc::new(ScriptedProvider::new().with_text("Une soupe de potimarron."));
        let sink = Arc::new(MemorySink::new());
        let bot = ChefBot::new(llm.clone())
            .with_group("Groupe_A")
            .with_tracer(Tracer::new().with_sink(sink.clone()));

        let answer = bot.ask_chef("Que manger ce midi ?", 0.7).await.unwrap();
        assert_eq!(answer, "Une soupe de potimarron.");

        let request = &llm.requests()[0];
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[0].text_content().contains("cuisine de saison"));

        let span = &sink.find("Groupe_A_Partie_1")[0];
        assert_eq!(span.tags, vec!["Partie_1", "Groupe_A"]);
        assert_eq!(span.metadata.get::<String>("status").as_deref(), Some("success"));
        assert_eq!(span.metadata.get::<String>("season").as_deref(), Some("winter"));
        assert_eq!(span.metadata.get::<f32>("temperature"), Some(0.7));
    }

    #[tokio::test]
    async fn test_ask_chef_failure_marks_span() {
        let llm = Arc::new(ScriptedProvider::new().with_error("quota dépassé"));
        let sink = Arc::new(MemorySink::new());
        let bot = ChefBot::new(llm).with_tracer(Tracer::new().with_sink(sink.clone()));

        let err = bot.ask_chef("Que manger ?", 0.1).await.unwrap_err();
        assert!(matches!(err, KitchenError::Llm(_)));

        let span = &sink.find("Groupe_Partie_1")[0];
        assert_eq!(span.level, SpanLevel::Error);
        assert!(span.status_message.as_deref().unwrap().contains("quota dépassé"));
    }
}

use super::dataset::Expected;
use crate::chefbot::ChefBot;
use crate::error::{KitchenError, Result};
use crate::prompts::{judge_user, JUDGE_SYSTEM};
use chefbot_core::{Message, Span, SpanKind};
use chefbot_llm::{chat, extract_json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const JUDGE_TEMPERATURE: f32 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JudgeScores {
    pub pertinence: f64,
    pub creativite: f64,
    pub praticite: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl JudgeScores {
    /// Reads the scores from the judge reply. Scores may come as numbers or
    /// numeric strings and are clamped to [0, 1].
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| KitchenError::judge("la réponse du juge n'est pas un objet JSON"))?;

        Ok(Self {
            pertinence: score(obj, "pertinence")?,
            creativite: score(obj, "creativite")?,
            praticite: score(obj, "praticite")?,
            explanation: obj
                .get("explanation")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

fn score(obj: &Map<String, Value>, key: &str) -> Result<f64> {
    let value = match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
        .ok_or_else(|| KitchenError::judge(format!("score '{}' manquant ou invalide", key)))
}

impl ChefBot {
    /// Grades an answer on pertinence, creativity and practicality.
    pub async fn llm_judge(
        &self,
        question: &str,
        output: &str,
        expected: &Expected,
    ) -> Result<JudgeScores> {
        let span = self.tracer().start("llm-judge");
        self.judge_with(span, question, output, expected).await
    }

    pub(crate) async fn llm_judge_in(
        &self,
        parent: &Span,
        question: &str,
        output: &str,
        expected: &Expected,
    ) -> Result<JudgeScores> {
        self.judge_with(parent.child("llm-judge"), question, output, expected)
            .await
    }

    async fn judge_with(
        &self,
        span: Span,
        question: &str,
        output: &str,
        expected: &Expected,
    ) -> Result<JudgeScores> {
        let mut span = span.with_kind(SpanKind::Generation);
        let expected_json = serde_json::to_string(expected)?;

        let messages = vec![
            Message::system(JUDGE_SYSTEM),
            Message::user(judge_user(question, output, &expected_json)),
        ];
        let raw = chat(self.llm().as_ref(), &self.models().judge, messages, JUDGE_TEMPERATURE)
            .await
            .map_err(|e| {
                span.error(e.to_string());
                e
            })?;

        let scores = extract_json(&raw)
            .map_err(KitchenError::from)
            .and_then(|value| JudgeScores::from_value(&value));
        match scores {
            Ok(scores) => {
                span.set_output(&scores);
                Ok(scores)
            }
            Err(e) => {
                span.error_with_raw(e.to_string(), "raw", &raw);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefbot_llm::testing::ScriptedProvider;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_scores_are_clamped_and_lenient() {
        let scores = JudgeScores::from_value(&json!({
            "pertinence": 1.4,
            "creativite": "0.5",
            "praticite": -2,
        }))
        .unwrap();
        assert_eq!(scores.pertinence, 1.0);
        assert_eq!(scores.creativite, 0.5);
        assert_eq!(scores.praticite, 0.0);
        assert!(scores.explanation.is_none());
    }

    #[test]
    fn test_missing_score() {
        let err = JudgeScores::from_value(&json!({"pertinence": 1, "creativite": 1})).unwrap_err();
        assert!(err.to_string().contains("praticite"));
    }

    #[tokio::test]
    async fn test_llm_judge_parses_fenced_reply() {
        let llm = Arc::new(ScriptedProvider::new().with_text(
            "```json\n{\"pertinence\": 0.9, \"creativite\": 0.6, \"praticite\": 0.8, \
             \"explanation\": \"Respecte les contraintes.\"}\n```",
        ));
        let bot = ChefBot::new(llm.clone());
        let expected = Expected {
            must_avoid: vec!["porc".to_string()],
            ..Default::default()
        };

        let scores = bot
            .llm_judge("Sans porc", "Poulet rôti", &expected)
            .await
            .unwrap();
        assert_eq!(scores.pertinence, 0.9);
        assert_eq!(scores.explanation.as_deref(), Some("Respecte les contraintes."));

        let request = &llm.requests()[0];
        assert_eq!(request.temperature, Some(0.1));
        let user = request.messages[1].text_content();
        assert!(user.starts_with("question:\nSans porc\n\noutput:\nPoulet rôti"));
        assert!(user.contains(r#""must_avoid":["porc"]"#));
    }

    #[tokio::test]
    async fn test_llm_judge_without_json() {
        let bot = ChefBot::new(Arc::new(ScriptedProvider::new().with_text("Très bien !")));
        let err = bot
            .llm_judge("q", "o", &Expected::default())
            .await
            .unwrap_err();
        assert!(matches!(err, KitchenError::Llm(chefbot_llm::LlmError::NoJson)));
    }
}

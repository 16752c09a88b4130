//! Weekly menu planning: plan the steps, execute them one by one, then
//! synthesize the week.

use crate::chefbot::ChefBot;
use crate::error::PlannerError;
use crate::prompts;
use chefbot_core::{Message, Span, SpanKind};
use chefbot_llm::{chat, extract_json};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

type Result<T> = std::result::Result<T, PlannerError>;

const PLAN_TEMPERATURE: f32 = 0.2;
const PLAN_RETRY_TEMPERATURE: f32 = 0.0;
const STEP_TEMPERATURE: f32 = 0.3;
const SYNTHESIS_TEMPERATURE: f32 = 0.2;

/// One step proposed by the planner. Fields the model adds are kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// A number or a string, depending on the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanStep {
    pub fn title_text(&self) -> String {
        self.title
            .as_ref()
            .and_then(non_null_text)
            .unwrap_or_else(|| "step".to_string())
    }

    pub fn prompt_text(&self) -> String {
        self.prompt
            .as_ref()
            .and_then(non_null_text)
            .unwrap_or_default()
    }

    /// Key under which the step output is stored: `{id}_{title}`, where a
    /// missing id falls back to `position` (1-based).
    pub fn output_key(&self, position: usize) -> String {
        let id = self
            .id
            .as_ref()
            .and_then(non_null_text)
            .unwrap_or_else(|| position.to_string());
        format!("{}_{}", id, self.title_text())
    }
}

/// Lists become their items joined by `, `.
fn non_null_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(non_null_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Plan {
    /// Accepts a JSON object whose `steps` is an array of objects.
    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        let has_steps = value
            .as_object()
            .and_then(|obj| obj.get("steps"))
            .map_or(false, Value::is_array);
        if !has_steps {
            return Err("Structure JSON invalide: clé 'steps' attendue.".to_string());
        }
        serde_json::from_value(value).map_err(|e| format!("Étapes invalides: {}", e))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DayMenu {
    #[serde(default, deserialize_with = "lenient_text")]
    pub day: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lunch: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dinner: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DayMenu {
    /// Reads one entry of `weekly_menu`. `day` is the key when the menu is
    /// keyed by day; an entry that is not an object becomes the lunch text.
    fn from_entry(day: Option<&str>, entry: &Value) -> Self {
        let mut menu =
            serde_json::from_value::<DayMenu>(entry.clone()).unwrap_or_else(|_| DayMenu {
                lunch: non_null_text(entry).unwrap_or_default(),
                ..DayMenu::default()
            });
        if let Some(day) = day.filter(|_| menu.day.is_empty()) {
            menu.day = day.to_string();
        }
        menu
    }
}

/// The synthesized week. `weekly_menu` is kept as the model wrote it
/// (usually a list of days, sometimes an object keyed by day); `days()`
/// reads it as typed entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMenu {
    pub weekly_menu: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WeeklyMenu {
    /// Accepts any JSON object carrying `weekly_menu`.
    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        let has_menu = value
            .as_object()
            .map_or(false, |obj| obj.contains_key("weekly_menu"));
        if !has_menu {
            return Err("JSON final invalide: clé 'weekly_menu' manquante.".to_string());
        }
        serde_json::from_value(value).map_err(|e| format!("Menu invalide: {}", e))
    }

    pub fn days(&self) -> Vec<DayMenu> {
        match &self.weekly_menu {
            Value::Array(entries) => entries
                .iter()
                .map(|entry| DayMenu::from_entry(None, entry))
                .collect(),
            Value::Object(by_day) => by_day
                .iter()
                .map(|(day, entry)| DayMenu::from_entry(Some(day), entry))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Strings stay as they are, other scalars and objects become their JSON text.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(non_null_text(&value).unwrap_or_default())
}

fn lenient_opt_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(non_null_text(&value))
}

impl ChefBot {
    pub async fn plan_weekly_menu(&self, constraints: &str) -> Result<WeeklyMenu> {
        let mut span = self
            .partie_span(2, SpanKind::Chain)
            .with_input(constraints);
        span.set_metadata("status", "start");

        let result = self.run_planner(&span, constraints).await;
        match &result {
            Ok(menu) => {
                span.set_metadata("status", "success");
                span.set_output(menu);
                info!(days = menu.days().len(), "Weekly menu ready");
            }
            Err(e) => span.error(e.to_string()),
        }
        self.tracer().flush();
        result
    }

    async fn run_planner(&self, parent: &Span, constraints: &str) -> Result<WeeklyMenu> {
        let plan = self.plan_steps_with_retry(parent, constraints).await?;

        let mut step_outputs: Map<String, Value> = Map::new();
        for step in &plan.steps {
            let key = step.output_key(step_outputs.len() + 1);
            let mut context = json!({ "constraints": constraints });
            if !step_outputs.is_empty() {
                context["step_outputs"] = Value::Object(step_outputs.clone());
            }
            let output = self.execute_step(parent, step, &context).await?;
            step_outputs.insert(key, Value::String(output));
        }

        self.synthesize(parent, constraints, &plan, &step_outputs).await
    }

    async fn plan_steps_with_retry(&self, parent: &Span, constraints: &str) -> Result<Plan> {
        let mut span = parent.child("plan_retry").with_tags(["plan", "retry"]);

        match self.plan_steps(&span, constraints).await {
            Ok(plan) => Ok(plan),
            Err(first) => {
                warn!(error = %first, "Plan rejected, retrying with the strict prompt");
                let raw = self
                    .planner_chat(
                        prompts::PLANNER_STRICT_SYSTEM,
                        prompts::plan_retry_user(constraints),
                        PLAN_RETRY_TEMPERATURE,
                    )
                    .await
                    .map_err(|e| {
                        span.error(e.to_string());
                        e
                    })?;

                match extract_json(&raw)
                    .map_err(|e| e.to_string())
                    .and_then(Plan::from_value)
                {
                    Ok(plan) => {
                        span.set_metadata("retry_used", true);
                        span.set_metadata("num_steps", plan.steps.len());
                        Ok(plan)
                    }
                    Err(reason) => {
                        let message = format!("JSON toujours invalide après retry. ({})", reason);
                        span.error_with_raw(&message, "raw_retry", &raw);
                        Err(PlannerError::InvalidPlan(message))
                    }
                }
            }
        }
    }

    async fn plan_steps(&self, parent: &Span, constraints: &str) -> Result<Plan> {
        let mut span = parent.child("plan").with_kind(SpanKind::Generation);

        let raw = self
            .planner_chat(
                prompts::PLANNER_SYSTEM,
                prompts::plan_user(constraints),
                PLAN_TEMPERATURE,
            )
            .await
            .map_err(|e| {
                span.error(e.to_string());
                e
            })?;

        match extract_json(&raw)
            .map_err(|e| e.to_string())
            .and_then(Plan::from_value)
        {
            Ok(plan) => {
                span.set_metadata("num_steps", plan.steps.len());
                span.set_metadata("status", "success");
                Ok(plan)
            }
            Err(reason) => {
                span.error_with_raw(&reason, "raw", &raw);
                Err(PlannerError::InvalidPlan(reason))
            }
        }
    }

    async fn execute_step(&self, parent: &Span, step: &PlanStep, context: &Value) -> Result<String> {
        let title = step.title_text();
        let mut span = parent
            .child("execute_step")
            .with_kind(SpanKind::Generation)
            .with_tags(["execute"]);
        span.set_metadata("step_id", &step.id);
        span.set_metadata("step_title", &title);

        let user = prompts::step_user(&title, &context.to_string(), &step.prompt_text());
        let output = self
            .planner_chat(prompts::STEP_SYSTEM, user, STEP_TEMPERATURE)
            .await
            .map_err(|e| {
                span.error(e.to_string());
                e
            })?;
        span.set_output(&output);
        Ok(output)
    }

    async fn synthesize(
        &self,
        parent: &Span,
        constraints: &str,
        plan: &Plan,
        step_outputs: &Map<String, Value>,
    ) -> Result<WeeklyMenu> {
        let mut span = parent
            .child("synthesis")
            .with_kind(SpanKind::Generation)
            .with_tags(["synthesis"]);

        let plan_json = serde_json::to_string(plan).map_err(chefbot_llm::LlmError::from)?;
        let outputs_json = Value::Object(step_outputs.clone()).to_string();
        let raw = self
            .planner_chat(
                prompts::SYNTHESIS_SYSTEM,
                prompts::synthesis_user(constraints, &plan_json, &outputs_json),
                SYNTHESIS_TEMPERATURE,
            )
            .await
            .map_err(|e| {
                span.error(e.to_string());
                e
            })?;

        match extract_json(&raw)
            .map_err(|e| e.to_string())
            .and_then(WeeklyMenu::from_value)
        {
            Ok(menu) => Ok(menu),
            Err(reason) => {
                span.error_with_raw(&reason, "raw", &raw);
                Err(PlannerError::InvalidMenu(reason))
            }
        }
    }

    async fn planner_chat(
        &self,
        system: &str,
        user: String,
        temperature: f32,
    ) -> std::result::Result<String, chefbot_llm::LlmError> {
        chat(
            self.llm().as_ref(),
            &self.models().chat,
            vec![Message::system(system), Message::user(user)],
            temperature,
        )
        .await
    }
}

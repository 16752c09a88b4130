//! Runs the planner task over the dataset and scores every answer with the
//! rule checks and the judge.

use super::dataset::{Dataset, DatasetItem, DatasetStore, DATASET_NAME};
use super::judge::JudgeScores;
use super::rules::{rule_evaluator, RuleScores};
use crate::chefbot::ChefBot;
use crate::error::Result;
use crate::prompts::EVAL_PLANNER_SYSTEM;
use chefbot_core::{Message, Span, SpanKind};
use chefbot_llm::chat;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing::{info, warn};

pub const PLANNER_TEMPERATURE: f32 = 0.4;

/// Score names, in report order.
pub const SCORE_NAMES: [&str; 6] = [
    "must_avoid_ok",
    "must_include_coverage",
    "overall_rules",
    "pertinence",
    "creativite",
    "praticite",
];

const DESCRIPTION: &str = "ChefBot menu planning evaluated by rules + LLM judge";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Evaluation {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

pub fn rule_evaluations(scores: &RuleScores) -> Vec<Evaluation> {
    vec![
        Evaluation::new("must_avoid_ok", scores.must_avoid_ok)
            .with_comment(format!("forbidden_hits={:?}", scores.forbidden_hits)),
        Evaluation::new("must_include_coverage", scores.must_include_coverage)
            .with_comment(format!("include_hits={:?}", scores.include_hits)),
        Evaluation::new("overall_rules", scores.overall_rules),
    ]
}

pub fn judge_evaluations(scores: &JudgeScores) -> Vec<Evaluation> {
    let mut pertinence = Evaluation::new("pertinence", scores.pertinence);
    pertinence.comment = scores.explanation.clone();
    vec![
        pertinence,
        Evaluation::new("creativite", scores.creativite),
        Evaluation::new("praticite", scores.praticite),
    ]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub item_id: String,
    pub constraints: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ItemResult {
    pub fn score(&self, name: &str) -> Option<f64> {
        self.evaluations
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreAverage {
    pub name: String,
    pub value: f64,
    /// Items that produced this score.
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRun {
    pub name: String,
    pub dataset: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: Map<String, Value>,
    pub items: Vec<ItemResult>,
    pub averages: Vec<ScoreAverage>,
}

impl ExperimentRun {
    pub fn average(&self, name: &str) -> Option<f64> {
        self.averages
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value)
    }

    pub fn failed_items(&self) -> usize {
        self.items.iter().filter(|i| !i.errors.is_empty()).count()
    }
}

fn averages(items: &[ItemResult]) -> Vec<ScoreAverage> {
    SCORE_NAMES
        .iter()
        .filter_map(|name| {
            let values: Vec<f64> = items.iter().filter_map(|i| i.score(name)).collect();
            (!values.is_empty()).then(|| ScoreAverage {
                name: name.to_string(),
                value: values.iter().sum::<f64>() / values.len() as f64,
                count: values.len(),
            })
        })
        .collect()
}

pub fn experiment_name(now: DateTime<Local>) -> String {
    format!("{}-{}", DATASET_NAME, now.format("%Y%m%d-%H%M%S"))
}

impl ChefBot {
    /// The task under evaluation: a plain-text menu for the constraints.
    pub async fn chefbot_planner(&self, constraints: &str) -> Result<String> {
        let span = self.tracer().start("chefbot_planner");
        self.planner_task(span, constraints).await
    }

    async fn planner_task(&self, span: Span, constraints: &str) -> Result<String> {
        let mut span = span.with_kind(SpanKind::Generation).with_input(constraints);
        let messages = vec![
            Message::system(EVAL_PLANNER_SYSTEM),
            Message::user(constraints),
        ];
        match chat(
            self.llm().as_ref(),
            &self.models().chat,
            messages,
            PLANNER_TEMPERATURE,
        )
        .await
        {
            Ok(output) => {
                span.set_output(&output);
                Ok(output)
            }
            Err(e) => {
                span.error(e.to_string());
                Err(e.into())
            }
        }
    }

    async fn evaluate_item(&self, parent: &Span, item: &DatasetItem) -> ItemResult {
        let mut span = parent.child("item").with_input(&item.input);
        span.set_metadata("item_id", &item.id);

        let mut result = ItemResult {
            item_id: item.id.clone(),
            constraints: item.input.constraints.clone(),
            output: None,
            evaluations: Vec::new(),
            errors: Vec::new(),
        };

        let output = match self
            .planner_task(span.child("chefbot_planner"), &item.input.constraints)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(item = %item.id, error = %e, "Task failed");
                span.error(e.to_string());
                result.errors.push(format!("task: {}", e));
                return result;
            }
        };

        let rules = rule_evaluator(&output, &item.expected_output);
        result.evaluations.extend(rule_evaluations(&rules));

        match self
            .llm_judge_in(&span, &item.input.constraints, &output, &item.expected_output)
            .await
        {
            Ok(judge) => result.evaluations.extend(judge_evaluations(&judge)),
            Err(e) => {
                warn!(item = %item.id, error = %e, "Judge failed");
                span.warn(e.to_string());
                result.errors.push(format!("judge: {}", e));
            }
        }

        span.set_output(&result.evaluations);
        result.output = Some(output);
        result
    }

    /// Evaluates every item of the dataset. Item failures are recorded in
    /// the run and never abort it.
    pub async fn evaluate_dataset(&self, dataset: &Dataset) -> ExperimentRun {
        let name = experiment_name(Local::now());
        let mut span = self
            .partie_span(3, SpanKind::Chain)
            .with_input(json!({"dataset": dataset.name, "items": dataset.items.len()}));
        span.set_metadata("experiment", &name);

        info!(experiment = %name, items = dataset.items.len(), "Running experiment");
        let mut items = Vec::with_capacity(dataset.items.len());
        for item in &dataset.items {
            items.push(self.evaluate_item(&span, item).await);
        }

        let run = ExperimentRun {
            name,
            dataset: dataset.name.clone(),
            description: DESCRIPTION.to_string(),
            timestamp: Utc::now(),
            metadata: Map::from_iter([
                ("planner_model".to_string(), json!(self.models().chat)),
                ("judge_model".to_string(), json!(self.models().judge)),
                ("temperature".to_string(), json!(0.4)),
            ]),
            averages: averages(&items),
            items,
        };

        if run.failed_items() > 0 {
            span.warn(format!("{} item(s) with errors", run.failed_items()));
        }
        span.set_output(&run.averages);
        self.tracer().flush();
        run
    }

    /// Loads the dataset from the store, evaluates it and saves the run
    /// next to it.
    pub async fn run_experiment(&self, store: &DatasetStore) -> Result<(ExperimentRun, PathBuf)> {
        let dataset = store.load(DATASET_NAME).await?;
        let run = self.evaluate_dataset(&dataset).await;
        let path = store.save_run(&dataset.name, &run.name, &run).await?;
        info!(path = %path.display(), "Experiment saved");
        Ok((run, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::dataset::{Expected, ItemInput};
    use chefbot_core::observe::MemorySink;
    use chefbot_core::Tracer;
    use chefbot_llm::testing::ScriptedProvider;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tempfile::TempDir;

    const JUDGE_OK: &str = r#"{"pertinence": 1.0, "creativite": 0.5, "praticite": 0.75, "explanation": "Bien."}"#;

    fn item(id: &str, avoid: &[&str], include: &[&str]) -> DatasetItem {
        DatasetItem {
            id: id.to_string(),
            input: ItemInput {
                constraints: format!("contraintes {}", id),
                extra: Map::new(),
            },
            expected_output: Expected {
                must_avoid: avoid.iter().map(|s| s.to_string()).collect(),
                must_include: include.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
            metadata: Map::new(),
        }
    }

    fn dataset(items: Vec<DatasetItem>) -> Dataset {
        Dataset {
            name: DATASET_NAME.to_string(),
            description: String::new(),
            metadata: Map::new(),
            items,
        }
    }

    #[test]
    fn test_experiment_name() {
        let now = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(experiment_name(now), "chefbot-menu-eval-20260307-090501");
    }

    #[test]
    fn test_rule_evaluation_comments() {
        let scores = rule_evaluator("du porc et du riz", &item("a", &["porc"], &["riz"]).expected_output);
        let evals = rule_evaluations(&scores);
        assert_eq!(evals[0].comment.as_deref(), Some(r#"forbidden_hits=["porc"]"#));
        assert_eq!(evals[1].comment.as_deref(), Some(r#"include_hits=["riz"]"#));
        assert!(evals[2].comment.is_none());
    }

    #[tokio::test]
    async fn test_evaluate_dataset() {
        let llm = Arc::new(
            ScriptedProvider::new()
                .with_text("Risotto aux champignons, riz arborio.")
                .with_text(JUDGE_OK)
                .with_text("Rôti de porc.")
                .with_text(r#"{"pertinence": 0.0, "creativite": 0.5, "praticite": 0.25}"#),
        );
        let sink = Arc::new(MemorySink::new());
        let bot = ChefBot::new(llm.clone()).with_tracer(Tracer::new().with_sink(sink.clone()));

        let run = bot
            .evaluate_dataset(&dataset(vec![
                item("a", &["porc"], &["riz"]),
                item("b", &["porc"], &["riz"]),
            ]))
            .await;

        assert_eq!(run.items.len(), 2);
        assert_eq!(run.items[0].score("overall_rules"), Some(1.0));
        assert_eq!(run.items[1].score("must_avoid_ok"), Some(0.0));
        assert_eq!(run.average("must_include_coverage"), Some(0.5));
        assert_eq!(run.average("pertinence"), Some(0.5));
        assert_eq!(run.average("praticite"), Some(0.5));
        let names: Vec<&str> = run.averages.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, SCORE_NAMES.to_vec());
        assert_eq!(run.metadata["temperature"], json!(0.4));

        let requests = llm.requests();
        assert_eq!(requests[0].temperature, Some(0.4));
        assert_eq!(requests[0].messages[1].text_content(), "contraintes a");
        assert_eq!(requests[1].temperature, Some(0.1));

        assert_eq!(sink.find("Groupe_Partie_3").len(), 1);
        assert_eq!(sink.find("llm-judge").len(), 2);
    }

    #[tokio::test]
    async fn test_item_errors_do_not_abort() {
        let llm = Arc::new(
            ScriptedProvider::new()
                .with_error("service indisponible")
                .with_text("Salade de riz.")
                .with_text("pas de note"),
        );
        let bot = ChefBot::new(llm);

        let run = bot
            .evaluate_dataset(&dataset(vec![item("a", &[], &["riz"]), item("b", &[], &["riz"])]))
            .await;

        assert_eq!(run.failed_items(), 2);
        assert!(run.items[0].output.is_none());
        assert!(run.items[0].errors[0].starts_with("task:"));
        assert_eq!(run.items[1].score("must_include_coverage"), Some(1.0));
        assert!(run.items[1].errors[0].starts_with("judge:"));
        assert_eq!(run.average("overall_rules"), Some(1.0));
        assert!(run.average("pertinence").is_none());
    }

    #[tokio::test]
    async fn test_run_experiment_saves_run() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path());
        store.save(&dataset(vec![item("a", &[], &[])])).await.unwrap();

        let llm = Arc::new(ScriptedProvider::new().with_text("Soupe.").with_text(JUDGE_OK));
        let (run, path) = ChefBot::new(llm).run_experiment(&store).await.unwrap();

        assert!(path.ends_with(format!("chefbot-menu-eval-runs/{}.json", run.name)));
        let saved: ExperimentRun =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.items[0].score("pertinence"), Some(1.0));
        assert_eq!(
            saved.items[0].evaluations[3].comment.as_deref(),
            Some("Bien.")
        );
    }
}

//! Offline evaluation of the menu planner: dataset, rule checks, LLM judge
//! and the experiment runner.

pub mod dataset;
pub mod experiment;
pub mod judge;
pub mod rules;

pub use dataset::{Dataset, DatasetItem, DatasetStore, Expected, ItemInput, DATASET_NAME};
pub use experiment::{Evaluation, ExperimentRun, ItemResult, ScoreAverage, SCORE_NAMES};
pub use judge::JudgeScores;
pub use rules::{rule_evaluator, RuleScores};

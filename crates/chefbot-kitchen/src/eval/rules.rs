use super::dataset::Expected;
use serde::{Deserialize, Serialize};

/// Scores of the programmatic checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleScores {
    /// 1.0 when no forbidden term appears, 0.0 otherwise.
    pub must_avoid_ok: f64,
    /// Share of the required terms found; 1.0 when none are required.
    pub must_include_coverage: f64,
    pub overall_rules: f64,
    pub forbidden_hits: Vec<String>,
    pub include_hits: Vec<String>,
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn hits(terms: &[String], haystack: &str) -> Vec<String> {
    terms
        .iter()
        .map(|term| term.to_lowercase())
        .filter(|term| !term.is_empty() && haystack.contains(term.as_str()))
        .collect()
}

pub fn rule_evaluator(output: &str, expected: &Expected) -> RuleScores {
    let out = normalize(output);

    let forbidden_hits = hits(&expected.must_avoid, &out);
    let must_avoid_ok = if forbidden_hits.is_empty() { 1.0 } else { 0.0 };

    let include_hits = hits(&expected.must_include, &out);
    let must_include_coverage = if expected.must_include.is_empty() {
        1.0
    } else {
        include_hits.len() as f64 / expected.must_include.len() as f64
    };

    RuleScores {
        must_avoid_ok,
        must_include_coverage,
        overall_rules: (must_avoid_ok + must_include_coverage) / 2.0,
        forbidden_hits,
        include_hits,
    }
}

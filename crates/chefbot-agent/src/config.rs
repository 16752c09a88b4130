use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_name")]
    pub name: String,

    pub system_prompt: String,

    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default = "default_max_context_messages")]
    pub max_context_messages: usize,

    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    #[serde(default = "default_tools_enabled")]
    pub tools_enabled: bool,

    /// Ask the model for a plan before iterations 1, 1+k, 1+2k, ...
    #[serde(default)]
    pub planning_interval: Option<usize>,

    #[serde(default)]
    pub parallel_tool_calls: bool,
}

fn default_name() -> String {
    "chefbot".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> Option<u32> {
    None
}

fn default_max_iterations() -> usize {
    5
}

fn default_max_context_messages() -> usize {
    50
}

fn default_tool_timeout_secs() -> u64 {
    60
}

fn default_tools_enabled() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            system_prompt: String::new(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_iterations: default_max_iterations(),
            max_context_messages: default_max_context_messages(),
            tool_timeout_secs: default_tool_timeout_secs(),
            tools_enabled: default_tools_enabled(),
            planning_interval: None,
            parallel_tool_calls: false,
        }
    }
}

impl AgentConfig {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_context_messages(mut self, max_messages: usize) -> Self {
        self.max_context_messages = max_messages;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_tools_enabled(mut self, enabled: bool) -> Self {
        self.tools_enabled = enabled;
        self
    }

    pub fn with_planning_interval(mut self, interval: usize) -> Self {
        self.planning_interval = Some(interval);
        self
    }

    pub fn with_parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = parallel;
        self
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Whether a planning step runs before the given 1-based iteration.
    pub fn plans_before(&self, iteration: usize) -> bool {
        match self.planning_interval {
            Some(k) if k > 0 && iteration > 0 => (iteration - 1) % k == 0,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = AgentConfig::default();
        assert_eq!(config.name, "chefbot");
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.temperature, 0.2);
        assert!(config.tools_enabled);
        assert!(!config.parallel_tool_calls);
        assert!(config.planning_interval.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = AgentConfig::new("llama-3.3-70b-versatile", "Tu es un serveur.")
            .with_name("waiter")
            .with_temperature(0.5)
            .with_max_iterations(3)
            .with_planning_interval(2);

        assert_eq!(config.name, "waiter");
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.planning_interval, Some(2));
    }

    #[test]
    fn test_plans_before() {
        let config = AgentConfig::default().with_planning_interval(2);
        let planned: Vec<usize> = (1..=5).filter(|i| config.plans_before(*i)).collect();
        assert_eq!(planned, vec![1, 3, 5]);

        assert!(!AgentConfig::default().plans_before(1));
        assert!(!AgentConfig::default().with_planning_interval(0).plans_before(1));
    }

    #[test]
    fn test_config_from_toml_like_json() {
        let config: AgentConfig = serde_json::from_value(serde_json::json!({
            "system_prompt": "Tu es un chef.",
            "model": "openai/gpt-oss-120b",
            "planning_interval": 3
        }))
        .unwrap();
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.planning_interval, Some(3));
    }
}

use chefbot_core::{Id, Metadata, ToolCall};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
    pub output: String,
    pub is_error: bool,
    pub duration_ms: u64,
}

impl ToolCallRecord {
    /// Snapshot of a finished call.
    pub fn from_call(call: &ToolCall) -> Self {
        Self {
            id: call.provider_id.clone(),
            name: call.name.clone(),
            input: call.input.clone(),
            output: call.result_text().to_string(),
            is_error: call.is_failed(),
            duration_ms: call.duration().map(|d| d.as_millis() as u64).unwrap_or(0),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub session_id: Id,
    pub text: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub iterations: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plans: Vec<String>,
    pub metadata: Metadata,
}

impl AgentResponse {
    pub fn new(session_id: Id, text: impl Into<String>) -> Self {
        Self {
            session_id,
            text: text.into(),
            tool_calls: Vec::new(),
            iterations: 1,
            plans: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCallRecord>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_plans(mut self, plans: Vec<String>) -> Self {
        self.plans = plans;
        self
    }

    pub fn with_metadata<K: Into<String>, V: Serialize>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn tool_call_count(&self) -> usize {
        self.tool_calls.len()
    }

    pub fn successful_tool_calls(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.tool_calls.iter().filter(|tc| !tc.is_error)
    }

    pub fn failed_tool_calls(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.tool_calls.iter().filter(|tc| tc.is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_basic() {
        let response = AgentResponse::new(Id::new(), "Voici votre menu.");
        assert_eq!(response.text(), "Voici votre menu.");
        assert!(!response.has_tool_calls());
        assert!(response.plans.is_empty());
    }

    #[test]
    fn test_record_from_completed_call() {
        let mut call = ToolCall::new("call_1", "get_recipe", json!({"dish_name": "shakshuka"}));
        call.start();
        call.complete(r#"{"title":"shakshuka"}"#);

        let response = AgentResponse::new(Id::new(), "Fait.")
            .with_tool_calls(vec![ToolCallRecord::from_call(&call)])
            .with_iterations(2);

        assert_eq!(response.tool_call_count(), 1);
        assert_eq!(response.iterations, 2);
        let record = &response.tool_calls[0];
        assert_eq!(record.id, "call_1");
        assert!(!record.is_error);
        assert_eq!(response.successful_tool_calls().count(), 1);
    }

    #[test]
    fn test_record_from_failed_call() {
        let mut call = ToolCall::new("call_2", "menu_database", json!({}));
        call.start();
        call.fail("Tool not found: menu_database");

        let record = ToolCallRecord::from_call(&call);
        assert!(record.is_error);
        assert_eq!(record.output, "Tool not found: menu_database");
    }
}

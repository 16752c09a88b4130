use crate::error::{Result, ToolError};
use async_trait::async_trait;
use chefbot_core::{Context, Metadata, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
            is_error: false,
        }
    }

    /// Compact JSON, non-ASCII characters kept as they are.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::text(serde_json::to_string(value)?))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            metadata: Metadata::new(),
            is_error: true,
        }
    }

    pub fn with_metadata<K: Into<String>, V: Serialize>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    async fn execute(&self, ctx: &Context, input: Value) -> Result<ToolOutput>;

    /// Rejects non-object input and missing required parameters.
    fn validate_input(&self, input: &Value) -> Result<()> {
        let required = self.definition().required_params();
        match input {
            Value::Null if required.is_empty() => Ok(()),
            Value::Object(map) => {
                let missing: Vec<&str> = required
                    .iter()
                    .filter(|p| map.get(p.as_str()).map_or(true, Value::is_null))
                    .map(String::as_str)
                    .collect();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(ToolError::invalid_input(format!(
                        "{}: missing required parameter(s) {}",
                        self.name(),
                        missing.join(", ")
                    )))
                }
            }
            other => Err(ToolError::invalid_input(format!(
                "{}: expected an object of arguments, got {}",
                self.name(),
                other
            ))),
        }
    }

    fn name(&self) -> &str {
        &self.definition().name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefbot_core::ToolParameter;

    struct NeedsDish {
        def: ToolDefinition,
    }

    #[async_trait]
    impl Tool for NeedsDish {
        fn definition(&self) -> &ToolDefinition {
            &self.def
        }

        async fn execute(&self, _ctx: &Context, _input: Value) -> Result<ToolOutput> {
            Ok(ToolOutput::text("ok"))
        }
    }

    #[test]
    fn test_tool_output_json_keeps_accents() {
        let output = ToolOutput::json(&serde_json::json!({"available": ["œufs", "épinards"]})).unwrap();
        assert_eq!(output.content, r#"{"available":["œufs","épinards"]}"#);
        assert!(!output.is_error);
    }

    #[test]
    fn test_tool_output_error() {
        let output = ToolOutput::error("boom").with_metadata("tool", "calculate");
        assert!(output.is_error);
        assert_eq!(output.metadata.get::<String>("tool").as_deref(), Some("calculate"));
    }

    #[test]
    fn test_validate_input() {
        let tool = NeedsDish {
            def: ToolDefinition::new("get_recipe", "Recette")
                .with_required_param("dish_name", ToolParameter::string()),
        };
        assert!(tool.validate_input(&serde_json::json!({"dish_name": "houmous"})).is_ok());
        assert!(matches!(
            tool.validate_input(&serde_json::json!({})),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(tool.validate_input(&Value::Null).is_err());
        assert!(tool.validate_input(&serde_json::json!("houmous")).is_err());
    }
}

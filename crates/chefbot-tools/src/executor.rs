use crate::error::{Result, ToolError};
use crate::registry::ToolRegistry;
use crate::traits::ToolOutput;
use chefbot_core::{Context, ToolCall};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    default_timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            default_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub async fn execute(&self, ctx: &Context, name: &str, input: Value) -> Result<ToolOutput> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::not_found(name))?;

        if ctx.is_cancelled() {
            return Err(ToolError::Cancelled);
        }

        tool.validate_input(&input)?;

        info!(tool = name, input = %input, "Executing tool");

        let execute_timeout = ctx
            .remaining()
            .unwrap_or(self.default_timeout)
            .min(self.default_timeout);

        match timeout(execute_timeout, tool.execute(ctx, input)).await {
            Ok(Ok(output)) => {
                info!(tool = name, is_error = output.is_error, "Tool execution completed");
                Ok(output)
            }
            Ok(Err(e)) => {
                warn!(tool = name, error = %e, "Tool execution failed");
                Err(e)
            }
            Err(_) => {
                warn!(tool = name, timeout_ms = execute_timeout.as_millis() as u64, "Tool execution timed out");
                Err(ToolError::Timeout(execute_timeout.as_millis() as u64))
            }
        }
    }

    /// Runs a call and records its outcome on it.
    pub async fn execute_call(&self, ctx: &Context, call: &mut ToolCall) -> Result<ToolOutput> {
        call.start();

        match self.execute(ctx, &call.name, call.input.clone()).await {
            Ok(output) => {
                if output.is_error {
                    call.fail(&output.content);
                } else {
                    call.complete(&output.content);
                }
                Ok(output)
            }
            Err(e) => {
                call.fail(e.to_string());
                Err(e)
            }
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Tool;
    use async_trait::async_trait;
    use chefbot_core::{Timestamp, ToolDefinition, ToolParameter};

    struct EchoTool {
        def: ToolDefinition,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                def: ToolDefinition::new("echo", "Echoes input")
                    .with_required_param("message", ToolParameter::string()),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.def
        }

        async fn execute(&self, _ctx: &Context, input: Value) -> Result<ToolOutput> {
            Ok(ToolOutput::text(input.to_string()))
        }
    }

    struct SlowTool {
        def: ToolDefinition,
    }

    #[async_trait]
    impl Tool for SlowTool {
        fn definition(&self) -> &ToolDefinition {
            &self.def
        }

        async fn execute(&self, _ctx: &Context, _input: Value) -> Result<ToolOutput> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(ToolOutput::text("done"))
        }
    }

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::new())).unwrap();
        registry
            .register(Arc::new(SlowTool {
                def: ToolDefinition::new("slow", "A slow tool"),
            }))
            .unwrap();
        ToolExecutor::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_executor_execute() {
        let output = executor()
            .execute(&Context::new(), "echo", serde_json::json!({"message": "bonjour"}))
            .await
            .unwrap();
        assert!(output.content.contains("bonjour"));
    }

    #[tokio::test]
    async fn test_executor_not_found() {
        let result = executor().execute(&Context::new(), "nonexistent", Value::Null).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_executor_validates() {
        let result = executor()
            .execute(&Context::new(), "echo", serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_executor_cancelled() {
        let ctx = Context::new();
        ctx.cancel();
        let result = executor()
            .execute(&ctx, "echo", serde_json::json!({"message": "x"}))
            .await;
        assert!(matches!(result, Err(ToolError::Cancelled)));
    }

    #[tokio::test]
    async fn test_executor_timeout() {
        let executor = executor().with_timeout(Duration::from_millis(100));
        let result = executor.execute(&Context::new(), "slow", Value::Null).await;
        assert!(matches!(result, Err(ToolError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_context_deadline_caps_timeout() {
        let ctx = Context::new().with_timeout(Duration::from_millis(150));
        let result = executor().execute(&ctx, "slow", Value::Null).await;
        assert!(matches!(result, Err(ToolError::Timeout(ms)) if ms <= 150));

        let past = Timestamp::from_unix_millis(Timestamp::now().unix_millis() - 1_000).unwrap();
        let ctx = Context::new().with_deadline(past);
        let result = executor().execute(&ctx, "slow", Value::Null).await;
        assert!(matches!(result, Err(ToolError::Timeout(0))));
    }

    #[tokio::test]
    async fn test_executor_execute_call() {
        let executor = executor();
        let mut call = ToolCall::new("call_1", "echo", serde_json::json!({"message": 1}));
        assert!(call.is_pending());

        let output = executor.execute_call(&Context::new(), &mut call).await.unwrap();
        assert!(call.is_completed());
        assert_eq!(call.result_text(), output.content);

        let mut missing = ToolCall::new("call_2", "nope", Value::Null);
        assert!(executor.execute_call(&Context::new(), &mut missing).await.is_err());
        assert!(missing.is_failed());
    }
}

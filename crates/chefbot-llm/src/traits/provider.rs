use crate::error::Result;
use crate::types::{CompletionRequest, CompletionResponse, ModelInfo};
use async_trait::async_trait;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    fn default_model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    async fn health_check(&self) -> Result<()> {
        let _ = self.list_models().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefbot_core::Message;

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn default_model(&self) -> &str {
            "echo-model"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            let last = request
                .messages
                .last()
                .map(|m| m.text_content())
                .unwrap_or_default();
            Ok(CompletionResponse::new(
                "echo-id",
                request.model,
                Message::assistant(last),
            ))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(vec![ModelInfo::new("echo-model", "echo")])
        }
    }

    #[tokio::test]
    async fn test_provider_object() {
        let provider: Box<dyn LlmProvider> = Box::new(EchoProvider);
        provider.health_check().await.unwrap();

        let response = provider
            .complete(CompletionRequest::new("echo-model", vec![Message::user("Bonjour")]))
            .await
            .unwrap();
        assert_eq!(response.text_content(), "Bonjour");
    }
}

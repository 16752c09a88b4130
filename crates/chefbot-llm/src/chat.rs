use crate::error::Result;
use crate::traits::LlmProvider;
use crate::types::CompletionRequest;
use chefbot_core::Message;
use tracing::debug;

/// One-shot completion returning the trimmed text of the reply, or an empty
/// string when the model produced no text.
pub async fn chat(
    provider: &dyn LlmProvider,
    model: &str,
    messages: Vec<Message>,
    temperature: f32,
) -> Result<String> {
    let request = CompletionRequest::new(model, messages).with_temperature(temperature);
    let response = provider.complete(request).await?;
    let text = response.text_content().trim().to_string();
    debug!(
        provider = provider.name(),
        model,
        temperature,
        chars = text.len(),
        "Chat completion"
    );
    Ok(text)
}

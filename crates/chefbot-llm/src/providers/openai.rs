use crate::error::{LlmError, Result};
use crate::traits::LlmProvider;
use crate::types::{
    CompletionRequest, CompletionResponse, ModelInfo, StopReason, TokenUsage, ToolChoice,
    RAW_ARGUMENTS_KEY,
};
use async_trait::async_trait;
use chefbot_core::message::{ContentBlock, ToolUse};
use chefbot_core::{Message, Role, ToolDefinition};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    client: Client,
    name: String,
    api_key: String,
    base_url: String,
    default_model: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, OPENAI_BASE_URL).with_model("gpt-4o-mini")
    }

    pub fn groq(api_key: impl Into<String>) -> Self {
        let mut provider =
            Self::with_base_url(api_key, GROQ_BASE_URL).with_model("openai/gpt-oss-120b");
        provider.name = "groq".to_string();
        provider
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(DEFAULT_TIMEOUT),
            name: "openai".to_string(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: "gpt-4o-mini".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn convert_messages(&self, messages: &[Message], system: Option<&str>) -> Vec<OpenAiMessage> {
        let mut result = Vec::new();

        if let Some(sys) = system {
            result.push(OpenAiMessage::text("system", sys));
        }

        for msg in messages {
            match msg.role {
                Role::System => result.push(OpenAiMessage::text("system", msg.text_content())),
                Role::User => result.push(OpenAiMessage::text("user", msg.text_content())),
                Role::Assistant => {
                    let tool_calls: Vec<_> = msg
                        .tool_uses()
                        .into_iter()
                        .map(|tu| OpenAiToolCall {
                            id: tu.id.clone(),
                            r#type: "function".to_string(),
                            function: OpenAiFunctionCall {
                                name: tu.name.clone(),
                                arguments: outgoing_arguments(&tu.input),
                            },
                        })
                        .collect();

                    let text = msg.text_content();
                    result.push(OpenAiMessage {
                        role: "assistant".to_string(),
                        content: if text.is_empty() { None } else { Some(text) },
                        tool_calls: if tool_calls.is_empty() {
                            None
                        } else {
                            Some(tool_calls)
                        },
                        tool_call_id: None,
                    });
                }
                Role::Tool => {
                    for tr in msg.tool_results() {
                        result.push(OpenAiMessage {
                            role: "tool".to_string(),
                            content: Some(tr.content.clone()),
                            tool_calls: None,
                            tool_call_id: Some(tr.tool_use_id.clone()),
                        });
                    }
                }
            }
        }

        result
    }

    fn convert_tools(&self, tools: &[ToolDefinition]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .map(|t| OpenAiTool {
                r#type: "function".to_string(),
                function: OpenAiFunction {
                    name: t.name.clone(),
                    description: Some(t.description.clone()),
                    parameters: t.parameters_schema(),
                },
            })
            .collect()
    }

    fn convert_tool_choice(&self, choice: &ToolChoice) -> Value {
        match choice {
            ToolChoice::Auto => Value::String("auto".to_string()),
            ToolChoice::None => Value::String("none".to_string()),
            ToolChoice::Required => Value::String("required".to_string()),
            ToolChoice::Tool { name } => serde_json::json!({
                "type": "function",
                "function": { "name": name }
            }),
        }
    }

    fn build_body(&self, request: &CompletionRequest) -> Result<Value> {
        let messages = self.convert_messages(&request.messages, request.system.as_deref());

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = max_tokens.into();
        }
        if let Some(temp) = request.temperature {
            body["temperature"] = temp.into();
        }
        if let Some(top_p) = request.top_p {
            body["top_p"] = top_p.into();
        }
        if let Some(stop) = &request.stop {
            body["stop"] = stop.clone().into();
        }
        if let Some(tools) = request.tools.as_deref().filter(|t| !t.is_empty()) {
            body["tools"] = serde_json::to_value(self.convert_tools(tools))?;
            if let Some(choice) = &request.tool_choice {
                body["tool_choice"] = self.convert_tool_choice(choice);
            }
            if let Some(parallel) = request.parallel_tool_calls {
                body["parallel_tool_calls"] = parallel.into();
            }
        }

        Ok(body)
    }

    fn parse_response(&self, response: OpenAiResponse) -> Result<CompletionResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::invalid_response("No choices in response"))?;

        let mut content_blocks = Vec::new();

        if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
            content_blocks.push(ContentBlock::text(text));
        }

        for tc in choice.message.tool_calls.unwrap_or_default() {
            let input = incoming_arguments(&tc.function.arguments);
            if input.get(RAW_ARGUMENTS_KEY).is_some() {
                warn!(tool = %tc.function.name, "Tool call arguments are not valid JSON");
            }
            content_blocks.push(ContentBlock::tool_use(ToolUse::new(
                tc.id,
                tc.function.name,
                input,
            )));
        }

        let message = Message::new(Role::Assistant, content_blocks);

        let stop_reason = choice
            .finish_reason
            .as_deref()
            .and_then(StopReason::from_finish_reason)
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse::new(
            response.id.unwrap_or_default(),
            response.model.unwrap_or_default(),
            message,
        )
        .with_usage(usage)
        .with_stop_reason(stop_reason))
    }
}

fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Object arguments as JSON text, except a preserved raw string which is
/// sent back exactly as the model wrote it.
fn outgoing_arguments(input: &Value) -> String {
    match input.get(RAW_ARGUMENTS_KEY).and_then(Value::as_str) {
        Some(raw) => raw.to_string(),
        None => input.to_string(),
    }
}

fn incoming_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        _ => serde_json::json!({ RAW_ARGUMENTS_KEY: raw }),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_body(&request)?;
        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map(|t| t.len()).unwrap_or(0),
            "Sending completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<f64>().ok())
                .map(|secs| (secs * 1000.0) as u64);
            let text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                429 => LlmError::rate_limited(&self.name, retry_after_ms),
                401 | 403 => LlmError::AuthenticationFailed(format!("{}: {}", status, text)),
                _ => LlmError::api(&self.name, format!("{}: {}", status, text)),
            });
        }

        let openai_response: OpenAiResponse =
            response.json().await.map_err(|e| self.transport_error(e))?;
        self.parse_response(openai_response)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let models = if self.base_url == GROQ_BASE_URL {
            vec![
                ModelInfo::new("openai/gpt-oss-120b", "groq")
                    .with_context_window(131072)
                    .with_tools(),
                ModelInfo::new("openai/gpt-oss-20b", "groq")
                    .with_context_window(131072)
                    .with_tools(),
                ModelInfo::new("llama-3.3-70b-versatile", "groq")
                    .with_context_window(131072)
                    .with_tools(),
            ]
        } else {
            vec![
                ModelInfo::new("gpt-4o", "openai")
                    .with_context_window(128000)
                    .with_tools(),
                ModelInfo::new("gpt-4o-mini", "openai")
                    .with_context_window(128000)
                    .with_tools(),
            ]
        };
        Ok(models)
    }
}

impl OpenAiProvider {
    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout.as_millis() as u64)
        } else if e.is_connect() {
            LlmError::network(e.to_string())
        } else if e.is_decode() {
            LlmError::invalid_response(e.to_string())
        } else {
            LlmError::Reqwest(e)
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl OpenAiMessage {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    r#type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiTool {
    r#type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunction {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefbot_core::message::ToolResult;
    use chefbot_core::ToolParameter;

    #[test]
    fn test_provider_creation() {
        let provider = OpenAiProvider::groq("gsk-test").with_model("llama-3.3-70b-versatile");

        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.base_url(), GROQ_BASE_URL);
        assert_eq!(provider.default_model(), "llama-3.3-70b-versatile");

        let custom = OpenAiProvider::with_base_url("k", "http://localhost:8080/v1/");
        assert_eq!(custom.base_url(), "http://localhost:8080/v1");
        assert_eq!(custom.name(), "openai");
    }

    #[test]
    fn test_message_conversion() {
        let provider = OpenAiProvider::new("test-key");

        let call = Message::new(
            Role::Assistant,
            vec![ContentBlock::tool_use(ToolUse::new(
                "call_1",
                "check_fridge",
                serde_json::json!({}),
            ))],
        );
        let messages = vec![
            Message::user("Qu'y a-t-il dans le frigo ?"),
            call,
            Message::tool_result(ToolResult::success("call_1", "{\"available\":[]}")),
        ];

        let converted = provider.convert_messages(&messages, Some("Tu es un chef"));

        assert_eq!(converted.len(), 4);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[1].role, "user");
        assert_eq!(converted[2].role, "assistant");
        assert!(converted[2].content.is_none());
        assert_eq!(converted[2].tool_calls.as_ref().unwrap()[0].function.arguments, "{}");
        assert_eq!(converted[3].role, "tool");
        assert_eq!(converted[3].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_body_tool_options_only_with_tools() {
        let provider = OpenAiProvider::groq("k");
        let plain = CompletionRequest::new("m", vec![Message::user("hi")])
            .with_tool_choice(ToolChoice::Auto)
            .with_parallel_tool_calls(false)
            .with_temperature(0.2);
        let body = provider.build_body(&plain).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());

        let def = ToolDefinition::new("get_recipe", "Recette")
            .with_required_param("dish_name", ToolParameter::string());
        let with_tools = plain.with_tools(vec![def]);
        let body = provider.build_body(&with_tools).unwrap();
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["parallel_tool_calls"], false);
        assert_eq!(body["tools"][0]["function"]["name"], "get_recipe");
        assert_eq!(
            body["tools"][0]["function"]["parameters"]["required"][0],
            "dish_name"
        );
    }

    #[test]
    fn test_parse_response_with_tool_calls() {
        let provider = OpenAiProvider::groq("k");
        let raw = serde_json::json!({
            "id": "chatcmpl-1",
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [
                        {"id": "a", "type": "function",
                         "function": {"name": "get_recipe", "arguments": "{\"dish_name\":\"shakshuka\"}"}},
                        {"id": "b", "type": "function",
                         "function": {"name": "calculate", "arguments": "{expression: 1+1"}}
                    ]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        });
        let parsed: OpenAiResponse = serde_json::from_value(raw).unwrap();
        let response = provider.parse_response(parsed).unwrap();

        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(response.usage.total(), 15);
        let uses = response.message.tool_uses();
        assert_eq!(uses.len(), 2);
        assert_eq!(uses[0].input["dish_name"], "shakshuka");
        assert_eq!(uses[1].input[RAW_ARGUMENTS_KEY], "{expression: 1+1");
        assert_eq!(outgoing_arguments(&uses[1].input), "{expression: 1+1");
    }

    #[test]
    fn test_parse_response_without_choices() {
        let provider = OpenAiProvider::groq("k");
        let parsed: OpenAiResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(matches!(
            provider.parse_response(parsed),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_list_models() {
        let models = OpenAiProvider::groq("k").list_models().await.unwrap();
        assert!(models.iter().any(|m| m.id == "llama-3.3-70b-versatile"));
    }
}

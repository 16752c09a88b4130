//! A provider that replays queued responses and records every request.

use crate::error::{LlmError, Result};
use crate::traits::LlmProvider;
use crate::types::{CompletionRequest, CompletionResponse, ModelInfo, StopReason};
use async_trait::async_trait;
use chefbot_core::message::{ContentBlock, ToolUse};
use chefbot_core::{Message, Role};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

type Scripted = std::result::Result<CompletionResponse, String>;

#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: CompletionResponse) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_response(
            CompletionResponse::new("scripted", "scripted-model", Message::assistant(text))
                .with_stop_reason(StopReason::EndTurn),
        )
    }

    /// A reply made of tool calls, given as `(call id, tool name, arguments)`.
    pub fn with_tool_calls(self, calls: Vec<(&str, &str, Value)>) -> Self {
        let blocks = calls
            .into_iter()
            .map(|(id, name, input)| ContentBlock::tool_use(ToolUse::new(id, name, input)))
            .collect();
        self.with_response(
            CompletionResponse::new("scripted", "scripted-model", Message::new(Role::Assistant, blocks))
                .with_stop_reason(StopReason::ToolUse),
        )
    }

    /// The next call fails with an API error.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, item: Scripted) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(item);
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(LlmError::api("scripted", message)),
            None => Err(LlmError::invalid_response("no scripted response left")),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo::new("scripted-model", "scripted").with_tools()])
    }
}

use crate::types::{Timestamp, ToolCallId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ToolCallStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ToolCallStatus::Completed | ToolCallStatus::Failed)
    }
}

/// One dispatched tool call, tracked from request to result.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: ToolCallId,
    /// Identifier the model attached to the call; echoed back in the tool message.
    pub provider_id: String,
    pub name: String,
    pub input: Value,
    pub status: ToolCallStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl ToolCall {
    pub fn new(provider_id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: ToolCallId::new(),
            provider_id: provider_id.into(),
            name: name.into(),
            input,
            status: ToolCallStatus::Pending,
            output: None,
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn start(&mut self) {
        self.status = ToolCallStatus::Running;
        self.started_at = Some(Timestamp::now());
    }

    pub fn complete(&mut self, output: impl Into<String>) {
        self.status = ToolCallStatus::Completed;
        self.output = Some(output.into());
        self.completed_at = Some(Timestamp::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = ToolCallStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Timestamp::now());
    }

    pub fn is_pending(&self) -> bool {
        self.status == ToolCallStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == ToolCallStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == ToolCallStatus::Failed
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end.duration_since(&start)),
            _ => None,
        }
    }

    /// Text handed back to the model: the output, or the error for failed calls.
    pub fn result_text(&self) -> &str {
        match self.status {
            ToolCallStatus::Failed => self.error.as_deref().unwrap_or_default(),
            _ => self.output.as_deref().unwrap_or_default(),
        }
    }
}

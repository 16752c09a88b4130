use chefbot_agent::AgentError;
use chefbot_llm::LlmError;
use chefbot_tools::ToolError;
use thiserror::Error;

/// Failures of the plan → execute → synthesize pipeline.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("{0}")]
    InvalidPlan(String),

    #[error("{0}")]
    InvalidMenu(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

#[derive(Error, Debug)]
pub enum KitchenError {
    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Judge error: {0}")]
    Judge(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KitchenError>;

impl KitchenError {
    pub fn judge(msg: impl Into<String>) -> Self {
        Self::Judge(msg.into())
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// True when the run stopped because an agent hit its iteration bound.
    pub fn is_max_iterations(&self) -> bool {
        matches!(self, Self::Agent(AgentError::MaxIterationsReached(_)))
    }
}

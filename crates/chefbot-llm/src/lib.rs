pub mod chat;
pub mod error;
pub mod json;
pub mod providers;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use chat::chat;
pub use error::{LlmError, Result};
pub use json::extract_json;
pub use traits::LlmProvider;
pub use types::{
    CompletionRequest, CompletionResponse, ModelInfo, StopReason, TokenUsage, ToolChoice,
    RAW_ARGUMENTS_KEY,
};

#[cfg(feature = "openai")]
pub use providers::OpenAiProvider;

pub mod prelude {
    pub use crate::chat::chat;
    pub use crate::error::{LlmError, Result};
    pub use crate::json::extract_json;
    pub use crate::traits::LlmProvider;
    pub use crate::types::{CompletionRequest, CompletionResponse, ModelInfo, ToolChoice};

    #[cfg(feature = "openai")]
    pub use crate::providers::OpenAiProvider;
}

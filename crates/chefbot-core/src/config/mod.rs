mod loader;
mod types;

pub use types::{Config, GeneralConfig, LlmConfig, LogLevel, ObservabilityConfig};

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiProvider, GROQ_BASE_URL, OPENAI_BASE_URL};

//! LLM backends for the recap pipeline (local Ollama, OpenAI, Azure OpenAI).
//!
//! One contract, `Backend::complete(prompt, model) -> text`, three variants
//! picked once at startup from `LLMConfig`.

pub mod config;
pub mod providers;
pub mod types;

pub use config::{ConfigOverrides, LLMConfig};
pub use providers::{AzureBackend, Backend, OllamaBackend, OpenAIBackend};
pub use types::*;

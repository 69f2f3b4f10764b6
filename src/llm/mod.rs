//! LLM client module
//!
//! Provides the planner's model backend: a provider-agnostic completion
//! trait plus the OpenAI implementation.

use std::sync::Arc;

mod client;
mod error;
mod openai;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, MessageContent, Role, StopReason, TokenUsage,
    ToolCall, ToolDefinition,
};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIClient::from_config(config)?)),
        other => Err(LlmError::InvalidResponse(format!(
            "Unknown LLM provider: '{}'. Supported: openai",
            other
        ))),
    }
}

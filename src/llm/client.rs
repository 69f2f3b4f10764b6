//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// A provider-agnostic LLM client
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion request to finish
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

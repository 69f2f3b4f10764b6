//! Planner error types

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::llm::LlmError;

/// Errors that can occur during a plan run
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Resume requested but no plan is suspended for session '{0}'")]
    NothingToResume(String),

    #[error("Resume payload has {got} decisions but {expected} interrupts are pending")]
    DecisionMismatch { expected: usize, got: usize },

    #[error("Internal planner error: {0}")]
    Internal(String),
}

//! Gatechat - console chat agent with authorization-gated tool calls
//!
//! Gatechat submits user utterances to an LLM-driven planner, streams the
//! planner's tool-execution updates to the console, and suspends whenever
//! the next step needs external authorization or human sign-off. Decisions
//! are collected in interrupt order and injected back so the plan resumes
//! exactly where it paused.
//!
//! # Modules
//!
//! - [`chat`] - top-level turn loop and state machine
//! - [`planner`] - plan runner, agent planner, suspend/resume types
//! - [`interrupt`] - interrupt classification
//! - [`approval`] - decision collection
//! - [`session`] - per-key conversation state
//! - [`gateway`] - tool host and authorization backend
//! - [`llm`] - LLM client trait and OpenAI implementation
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod approval;
pub mod chat;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod interrupt;
pub mod llm;
pub mod planner;
pub mod prompts;
pub mod session;

// Re-export commonly used types
pub use approval::{DecisionCollector, Operator};
pub use chat::{ChatSession, ConsoleOperator};
pub use config::{Config, GatewayConfig, LlmConfig, PromptConfig};
pub use gateway::{AuthRequest, Gateway, GatewayClient, GatewayError, ToolSpec};
pub use interrupt::{classify, InterruptKind};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, OpenAIClient};
pub use planner::{
    AgentPlanner, ConsoleSink, Decision, Interrupt, PlanRequest, PlanRunner, Planner, PlannerError, ResumePayload,
    StepUpdate, UpdateChunk, UpdateSink,
};
pub use session::{Session, SessionStore};

//! Planner module
//!
//! The planner is the opaque collaborator that, given conversation state,
//! produces either a final answer or a request to pause for external input.
//! [`PlanRunner`] drives one invocation at a time: updates stream out in
//! arrival order, and a non-empty interrupt batch means the run is suspended
//! and must be resumed with decisions.

use async_trait::async_trait;
use tokio::sync::mpsc;

mod agent;
mod error;
mod runner;
mod types;

pub use agent::AgentPlanner;
pub use error::PlannerError;
pub use runner::{ConsoleSink, PlanRunner, UpdateSink};
pub use types::{Decision, Interrupt, PlanRequest, ResumePayload, StepUpdate, UpdateChunk};

use crate::session::Session;

/// The plan backend
///
/// One call is one plan run: it proceeds until completion or until it must
/// pause for external input, sending [`UpdateChunk`]s along the way. A run
/// that sends one or more interrupts has not completed; its internal
/// progress is retained against the session key so a subsequent
/// [`PlanRequest::Resume`] continues rather than restarts.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(
        &self,
        session: &mut Session,
        request: PlanRequest,
        updates: mpsc::Sender<UpdateChunk>,
    ) -> Result<(), PlannerError>;
}

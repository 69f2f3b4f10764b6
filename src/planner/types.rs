//! Plan run wire types
//!
//! Covers both directions of the suspend/resume handshake: the update
//! chunks a plan run emits on the way out, and the request shapes fed back
//! in to start or continue a run.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gateway::AuthRequest;

/// Input for one plan run: a fresh user message, or the decisions that
/// answer a suspended run's interrupts
///
/// Exactly one form is active per invocation. The orchestrator never sends
/// a fresh input while a plan is suspended.
#[derive(Debug, Clone)]
pub enum PlanRequest {
    /// A new user message to append to the session
    Input(String),

    /// Decisions to inject into a paused plan
    Resume(ResumePayload),
}

/// The decision or ordered decision sequence fed back into a paused run
///
/// The single-vs-sequence asymmetry is a wire contract: exactly one
/// interrupt is answered with a bare decision, two or more with a sequence
/// in interrupt order. Do not unify the shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResumePayload {
    Single(Decision),
    Many(Vec<Decision>),
}

impl ResumePayload {
    /// Build the correctly-shaped payload from decisions in interrupt order
    pub fn from_decisions(mut decisions: Vec<Decision>) -> Self {
        if decisions.len() == 1 {
            ResumePayload::Single(decisions.remove(0))
        } else {
            ResumePayload::Many(decisions)
        }
    }

    /// Flatten back to an ordered decision list
    pub fn into_decisions(self) -> Vec<Decision> {
        match self {
            ResumePayload::Single(d) => vec![d],
            ResumePayload::Many(ds) => ds,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResumePayload::Single(_) => 1,
            ResumePayload::Many(ds) => ds.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A boolean authorization outcome answering one interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub authorized: bool,
}

impl Decision {
    pub fn authorized() -> Self {
        Self { authorized: true }
    }

    pub fn denied() -> Self {
        Self { authorized: false }
    }
}

/// An incremental unit of planner progress
///
/// Carries zero or more displayable message fragments. Arrival order is
/// significant and must be preserved when echoed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepUpdate {
    /// Which part of the plan produced the update ("agent", "tools", ...)
    pub source: String,
    pub messages: Vec<String>,
}

impl StepUpdate {
    pub fn new(source: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            source: source.into(),
            messages,
        }
    }
}

/// An opaque suspension marker raised by a plan run
///
/// The payload is a tagged JSON value; [`crate::interrupt::classify`]
/// recognizes the authorization-pending and approval-pending shapes and
/// maps everything else to a fail-closed fallback. Interrupts live only
/// for the duration of one suspended run and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interrupt {
    pub value: Value,
}

impl Interrupt {
    /// Raw payload, for planners that build their own shapes
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// An interrupt for a tool call waiting on an external authorization flow
    pub fn authorization(tool: &str, auth: &AuthRequest) -> Self {
        Self {
            value: serde_json::json!({
                "tool_name": tool,
                "authorization_required": true,
                "authorization_response": {
                    "url": auth.url,
                    "id": auth.id,
                },
            }),
        }
    }

    /// An interrupt for a tool call waiting on explicit human sign-off
    pub fn approval(tool: &str, input: &Value) -> Self {
        Self {
            value: serde_json::json!({
                "tool_name": tool,
                "hitl_required": true,
                "input": input,
            }),
        }
    }
}

/// One chunk of a plan run's update stream
///
/// Either a batch of step outputs to display, or a batch of interrupts
/// suspending the run.
#[derive(Debug, Clone)]
pub enum UpdateChunk {
    Steps(Vec<StepUpdate>),
    Interrupts(Vec<Interrupt>),
}

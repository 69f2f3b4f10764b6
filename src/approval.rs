//! Decision collection
//!
//! Turns one pending interrupt into a yes/no decision, blocking on either
//! the gateway's authorization wait or an operator response. Denials are
//! final: a failed wait or a non-affirmative answer flows through as a
//! negative decision with no retry.

use std::sync::Arc;

use colored::Colorize;
use eyre::Result;
use tracing::warn;

use crate::gateway::Gateway;
use crate::interrupt::{classify, InterruptKind};
use crate::planner::{Decision, Interrupt};

/// Marker prefix for authorization/approval prompts
const GEAR: &str = "⚙️:";

/// Reads operator responses
///
/// `read_line` returns `None` on end of input (Ctrl-D). An interrupted
/// read (Ctrl-C) comes back as an empty line.
pub trait Operator: Send {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Collects decisions for pending interrupts
pub struct DecisionCollector {
    gateway: Arc<dyn Gateway>,
}

impl DecisionCollector {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Obtain the decision answering one interrupt
    ///
    /// Never fails: every error path resolves to a denial so sibling
    /// interrupts in the same batch still get processed.
    pub async fn collect(&self, interrupt: &Interrupt, operator: &mut dyn Operator) -> Decision {
        match classify(interrupt) {
            InterruptKind::AuthorizationPending { tool, url, token } => {
                self.await_authorization(&tool, &url, &token).await
            }
            InterruptKind::ApprovalPending { tool, input } => self.ask_human(&tool, &input, operator),
            InterruptKind::Unrecognized => {
                warn!(value = %interrupt.value, "collect: unrecognized interrupt, denying");
                Decision::denied()
            }
        }
    }

    /// Block until the external authorization flow completes
    async fn await_authorization(&self, tool: &str, url: &str, token: &str) -> Decision {
        println!("{} Authorization required for tool call {}", GEAR.yellow(), tool.bold());
        println!("{} Please authorize in your browser: {}", GEAR.yellow(), url.underline());
        println!("{} Waiting for you to complete authorization...", GEAR.yellow());

        match self.gateway.wait_for_completion(token).await {
            Ok(()) => {
                println!("{} Authorization granted. Resuming execution...", GEAR.yellow());
                Decision::authorized()
            }
            Err(e) => {
                eprintln!("{} {} {}", GEAR.yellow(), "Authorization failed:".red(), e);
                warn!(%tool, error = %e, "await_authorization: wait failed");
                Decision::denied()
            }
        }
    }

    /// Present the proposed call and block for a yes/no response
    fn ask_human(&self, tool: &str, input: &serde_json::Value, operator: &mut dyn Operator) -> Decision {
        println!("{} Human approval required for tool call {}", GEAR.yellow(), tool.bold());
        println!("{} Proposed input: {}", GEAR.yellow(), input);

        match operator.read_line("Do you approve this tool call? [y/N] ") {
            Ok(Some(answer)) if is_affirmative(&answer) => Decision::authorized(),
            Ok(_) => Decision::denied(),
            Err(e) => {
                warn!(%tool, error = %e, "ask_human: read failed, denying");
                Decision::denied()
            }
        }
    }
}

/// Anything other than an affirmative token is "no"
fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

//! Top-level chat orchestration
//!
//! One user turn drives the state machine below: a plan run either finishes
//! the turn or suspends with interrupts; suspended runs loop through
//! decision collection and resumption until a run finishes with no
//! interrupts. A turn may take any number of suspend/resume round trips,
//! since each resume can surface further interrupts.

mod console;

pub use console::ConsoleOperator;

use colored::Colorize;
use eyre::Result;
use tracing::{debug, error};

use crate::approval::{DecisionCollector, Operator};
use crate::planner::{Interrupt, PlanRequest, PlanRunner, ResumePayload};
use crate::session::SessionStore;

/// Literal input that ends the session, matched case-insensitively
const EXIT_SENTINEL: &str = "exit";

/// Where a turn currently stands
enum TurnState {
    /// A plan run is in flight
    Running(PlanRequest),
    /// Interrupts received; decisions being collected in order
    AwaitingDecisions(Vec<Interrupt>),
    /// Turn complete
    Idle,
}

/// The interactive chat session
pub struct ChatSession {
    runner: PlanRunner,
    collector: DecisionCollector,
    store: SessionStore,
    session_key: String,
}

impl ChatSession {
    pub fn new(runner: PlanRunner, collector: DecisionCollector, session_key: impl Into<String>) -> Self {
        Self {
            runner,
            collector,
            store: SessionStore::new(),
            session_key: session_key.into(),
        }
    }

    /// Run the chat loop until the exit sentinel or end of input
    ///
    /// A turn that fails is logged and abandoned; the session's committed
    /// history stays intact so the next turn continues coherently.
    pub async fn run(&mut self, operator: &mut dyn Operator, initial: Option<String>) -> Result<()> {
        println!("{}", "Welcome to the chatbot! Type 'exit' to quit.".green());

        if let Some(message) = initial {
            println!("{} {}", ">".bright_green(), message);
            if let Err(e) = self.run_turn(&message, operator).await {
                error!(error = %e, "run: initial turn failed");
                eprintln!("{} {:#}", "Error:".red(), e);
            }
        }

        loop {
            let line = match operator.read_line(&format!("{} ", ">".bright_green()))? {
                Some(line) => line,
                None => break,
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case(EXIT_SENTINEL) {
                break;
            }

            if let Err(e) = self.run_turn(input, operator).await {
                // Abandon this turn only; committed history is untouched
                error!(error = %e, "run: turn failed");
                eprintln!("{} {:#}", "Error:".red(), e);
            }
        }

        println!("{}", "👋 Bye...".red());
        Ok(())
    }

    /// Handle one user input to completion
    ///
    /// Loops between running the plan and collecting decisions until a run
    /// comes back with no interrupts.
    pub async fn run_turn(&mut self, input: &str, operator: &mut dyn Operator) -> Result<()> {
        let session = self.store.session_mut(&self.session_key);
        let mut state = TurnState::Running(PlanRequest::Input(input.to_string()));

        loop {
            state = match state {
                TurnState::Running(request) => {
                    let interrupts = self.runner.run(session, request).await?;
                    if interrupts.is_empty() {
                        TurnState::Idle
                    } else {
                        debug!(count = interrupts.len(), "run_turn: plan suspended");
                        TurnState::AwaitingDecisions(interrupts)
                    }
                }
                TurnState::AwaitingDecisions(interrupts) => {
                    // Strictly sequential, in the order the interrupts
                    // arrived; resume relies on positional correlation.
                    let mut decisions = Vec::with_capacity(interrupts.len());
                    for interrupt in &interrupts {
                        decisions.push(self.collector.collect(interrupt, operator).await);
                    }
                    TurnState::Running(PlanRequest::Resume(ResumePayload::from_decisions(decisions)))
                }
                TurnState::Idle => break,
            };
        }

        Ok(())
    }
}

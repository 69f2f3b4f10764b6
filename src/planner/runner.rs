//! Plan runner
//!
//! Drives one planner invocation: step updates are echoed through the sink
//! in arrival order while the run is in flight, and the interrupts that
//! suspended the run (if any) are handed back to the caller. An empty
//! interrupt list means the turn is complete.

use std::sync::Arc;

use colored::Colorize;
use tokio::sync::mpsc;
use tracing::warn;

use super::{Interrupt, PlanRequest, Planner, PlannerError, UpdateChunk};
use crate::session::Session;

/// Channel capacity for the update stream
const UPDATE_BUFFER: usize = 64;

/// Where step messages go
pub trait UpdateSink: Send + Sync {
    fn step_message(&self, source: &str, text: &str);
}

/// Prints step messages to the console with a fixed marker
pub struct ConsoleSink;

impl UpdateSink for ConsoleSink {
    fn step_message(&self, _source: &str, text: &str) {
        println!("{} {}", "🤖:".bright_blue(), text);
    }
}

/// Runs one plan invocation at a time against a session
pub struct PlanRunner {
    planner: Arc<dyn Planner>,
    sink: Arc<dyn UpdateSink>,
}

impl PlanRunner {
    pub fn new(planner: Arc<dyn Planner>, sink: Arc<dyn UpdateSink>) -> Self {
        Self { planner, sink }
    }

    /// Run one pass of plan execution
    ///
    /// Echoes every step update in the order the planner produced it, then
    /// returns the interrupts that suspended the run. Updates echoed before
    /// a planner failure remain valid history; the failure itself propagates
    /// to the caller.
    pub async fn run(&self, session: &mut Session, request: PlanRequest) -> Result<Vec<Interrupt>, PlannerError> {
        let (tx, mut rx) = mpsc::channel::<UpdateChunk>(UPDATE_BUFFER);

        let sink = Arc::clone(&self.sink);
        let consumer = tokio::spawn(async move {
            let mut interrupts = Vec::new();
            while let Some(chunk) = rx.recv().await {
                match chunk {
                    UpdateChunk::Steps(steps) => {
                        for step in steps {
                            for message in &step.messages {
                                sink.step_message(&step.source, message);
                            }
                        }
                    }
                    UpdateChunk::Interrupts(batch) => interrupts.extend(batch),
                }
            }
            interrupts
        });

        // The sender moves into the planner call and drops when it returns,
        // which closes the stream and lets the consumer finish.
        let outcome = self.planner.plan(session, request, tx).await;

        let interrupts = consumer.await.unwrap_or_else(|e| {
            warn!(error = %e, "run: update consumer task failed");
            Vec::new()
        });

        outcome?;
        Ok(interrupts)
    }
}

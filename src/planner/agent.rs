//! LLM-driven planner implementation
//!
//! Runs the model in a tool-calling loop. Ungated tool calls execute through
//! the gateway immediately and their results fold into the session before
//! the run returns. Gated calls suspend the run instead: the pending calls
//! are recorded against the session key and matching interrupts are emitted,
//! so a later resume picks up exactly where the plan paused.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{Decision, Interrupt, PlanRequest, Planner, PlannerError, StepUpdate, UpdateChunk};
use crate::gateway::{Gateway, ToolSpec};
use crate::llm::{CompletionRequest, ContentBlock, LlmClient, Message, StopReason, ToolCall, ToolDefinition};
use crate::session::Session;

/// Longest tool output echoed as a step message
const TOOL_ECHO_LIMIT: usize = 200;

/// How a tool call is gated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Execute immediately
    Open,
    /// Needs a completed external authorization flow
    Authorization,
    /// Needs explicit human sign-off
    Approval,
}

/// An LLM tool-calling planner with authorization-gated tools
pub struct AgentPlanner {
    llm: Arc<dyn LlmClient>,
    gateway: Arc<dyn Gateway>,
    system_prompt: String,
    tools: Vec<ToolSpec>,
    approve_tools: HashSet<String>,
    max_tokens: u32,

    /// Gated calls awaiting decisions, by session key. Entries exist only
    /// while a run is suspended; they are consumed by the matching resume
    /// or discarded when the turn is abandoned.
    pending: Mutex<HashMap<String, Vec<ToolCall>>>,
}

impl AgentPlanner {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        gateway: Arc<dyn Gateway>,
        system_prompt: String,
        tools: Vec<ToolSpec>,
        approve_tools: Vec<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            llm,
            gateway,
            system_prompt,
            tools,
            approve_tools: approve_tools.into_iter().collect(),
            max_tokens,
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn gate_for(&self, tool: &str) -> Gate {
        if self.approve_tools.contains(tool) {
            return Gate::Approval;
        }
        if self
            .tools
            .iter()
            .any(|t| t.name == tool && t.requires_authorization)
        {
            return Gate::Authorization;
        }
        Gate::Open
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition::new(t.name.clone(), t.description.clone(), t.input_schema.clone()))
            .collect()
    }

    fn take_pending(&self, key: &str) -> Option<Vec<ToolCall>> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
    }

    fn store_pending(&self, key: &str, calls: Vec<ToolCall>) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), calls);
    }

    /// Execute one tool call through the gateway, folding failures into an
    /// error result the model can react to
    async fn execute_call(&self, call: &ToolCall) -> ContentBlock {
        match self.gateway.execute(&call.name, &call.input).await {
            Ok(output) => ContentBlock::tool_result(&call.id, output.to_string(), false),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "execute_call: tool execution failed");
                ContentBlock::tool_result(&call.id, format!("Tool execution failed: {}", e), true)
            }
        }
    }

    /// Apply decisions to the gated calls of a suspended run, in order
    async fn apply_decisions(&self, calls: Vec<ToolCall>, decisions: Vec<Decision>) -> Vec<ContentBlock> {
        let mut results = Vec::with_capacity(calls.len());
        for (call, decision) in calls.iter().zip(decisions) {
            if decision.authorized {
                debug!(tool = %call.name, "apply_decisions: authorized, executing");
                results.push(self.execute_call(call).await);
            } else {
                debug!(tool = %call.name, "apply_decisions: denied, skipping");
                results.push(ContentBlock::tool_result(
                    &call.id,
                    "Tool call was not authorized.",
                    true,
                ));
            }
        }
        results
    }
}

#[async_trait]
impl Planner for AgentPlanner {
    async fn plan(
        &self,
        session: &mut Session,
        request: PlanRequest,
        updates: mpsc::Sender<UpdateChunk>,
    ) -> Result<(), PlannerError> {
        let key = session.key().to_string();

        match request {
            PlanRequest::Input(text) => {
                // A fresh input while a run is suspended means the prior
                // turn was abandoned. The assistant message holding the
                // gated tool_use blocks is already in the history, so every
                // pending call must still get a result; an unanswered call
                // id is rejected by the completion API on every later turn.
                if let Some(stale) = self.take_pending(&key) {
                    warn!(session = %key, count = stale.len(), "plan: cancelling suspended run for fresh input");
                    session.push(Message::user_blocks(cancellation_results(&stale)));
                }
                session.push(Message::user(text));
            }
            PlanRequest::Resume(payload) => {
                let calls = self
                    .take_pending(&key)
                    .ok_or_else(|| PlannerError::NothingToResume(key.clone()))?;
                let decisions = payload.into_decisions();
                if decisions.len() != calls.len() {
                    let expected = calls.len();
                    let got = decisions.len();
                    // Put the run back so the next fresh input cancels it
                    // instead of leaving its tool calls unanswered.
                    self.store_pending(&key, calls);
                    return Err(PlannerError::DecisionMismatch { expected, got });
                }

                let results = self.apply_decisions(calls, decisions).await;
                session.push(Message::user_blocks(results));
            }
        }

        loop {
            let request = CompletionRequest {
                system_prompt: self.system_prompt.clone(),
                messages: session.history().to_vec(),
                tools: self.tool_definitions(),
                max_tokens: self.max_tokens,
            };

            let response = self.llm.complete(request).await?;

            if response.stop_reason != StopReason::ToolUse || response.tool_calls.is_empty() {
                // Terminal state: final answer
                if let Some(content) = response.content {
                    session.push(Message::assistant(&content));
                    let _ = updates
                        .send(UpdateChunk::Steps(vec![StepUpdate::new("agent", vec![content])]))
                        .await;
                }
                return Ok(());
            }

            // Record the assistant's tool requests, echoing any text that
            // came with them
            let mut blocks: Vec<ContentBlock> = Vec::new();
            if let Some(ref content) = response.content {
                blocks.push(ContentBlock::text(content));
                let _ = updates
                    .send(UpdateChunk::Steps(vec![StepUpdate::new(
                        "agent",
                        vec![content.clone()],
                    )]))
                    .await;
            }
            for call in &response.tool_calls {
                blocks.push(ContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.input.clone(),
                });
            }
            session.push(Message::assistant_blocks(blocks));

            let mut open_results: Vec<ContentBlock> = Vec::new();
            let mut open_echo: Vec<String> = Vec::new();
            let mut gated: Vec<ToolCall> = Vec::new();
            let mut interrupts: Vec<Interrupt> = Vec::new();
            let mut failure: Option<PlannerError> = None;
            let mut unanswered: Vec<ToolCall> = Vec::new();

            for call in response.tool_calls {
                if failure.is_some() {
                    unanswered.push(call);
                    continue;
                }
                match self.gate_for(&call.name) {
                    Gate::Open => {
                        let result = self.execute_call(&call).await;
                        if let ContentBlock::ToolResult { content, is_error, .. } = &result {
                            let outcome = if *is_error { "failed" } else { "ok" };
                            open_echo.push(format!("{} {}: {}", call.name, outcome, truncate(content)));
                        }
                        open_results.push(result);
                    }
                    Gate::Authorization => match self.gateway.begin_authorization(&call.name).await {
                        Ok(auth) => {
                            interrupts.push(Interrupt::authorization(&call.name, &auth));
                            gated.push(call);
                        }
                        Err(e) => {
                            warn!(tool = %call.name, error = %e, "plan: authorization flow could not start");
                            failure = Some(e.into());
                            unanswered.push(call);
                        }
                    },
                    Gate::Approval => {
                        interrupts.push(Interrupt::approval(&call.name, &call.input));
                        gated.push(call);
                    }
                }
            }

            if let Some(e) = failure {
                // The turn is abandoned mid-partition; the assistant's
                // tool calls are already committed, so answer all of them
                // before propagating the failure.
                unanswered.extend(gated);
                open_results.extend(cancellation_results(&unanswered));
                session.push(Message::user_blocks(open_results));
                return Err(e);
            }

            if !open_results.is_empty() {
                session.push(Message::user_blocks(open_results));
                let _ = updates
                    .send(UpdateChunk::Steps(vec![StepUpdate::new("tools", open_echo)]))
                    .await;
            }

            if !interrupts.is_empty() {
                debug!(session = %key, count = interrupts.len(), "plan: suspending for decisions");
                self.store_pending(&key, gated);
                let _ = updates.send(UpdateChunk::Interrupts(interrupts)).await;
                return Ok(());
            }
        }
    }
}

/// Error tool-results answering every call in `calls`, for runs that end
/// without real results
fn cancellation_results(calls: &[ToolCall]) -> Vec<ContentBlock> {
    calls
        .iter()
        .map(|call| ContentBlock::tool_result(&call.id, "Tool call was cancelled.", true))
        .collect()
}

fn truncate(s: &str) -> String {
    if s.len() > TOOL_ECHO_LIMIT {
        let cut: String = s.chars().take(TOOL_ECHO_LIMIT).collect();
        format!("{}... ({} chars total)", cut, s.len())
    } else {
        s.to_string()
    }
}

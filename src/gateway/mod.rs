//! Tool gateway module
//!
//! The gateway is the external collaborator that hosts the agent's tools and
//! runs authorization flows. Tools execute remotely on behalf of a configured
//! user id; tools bound to third-party services require that user to complete
//! an OAuth-style flow in the browser before the call may proceed.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

mod client;
mod error;

pub use client::GatewayClient;
pub use error::GatewayError;

/// A tool definition as reported by the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_schema")]
    pub input_schema: Value,
    /// Whether calls to this tool need a completed authorization flow
    #[serde(default)]
    pub requires_authorization: bool,
}

fn default_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

/// Handle for one in-flight authorization flow
#[derive(Debug, Clone, Deserialize)]
pub struct AuthRequest {
    /// User-facing URL to complete the flow in a browser
    pub url: String,
    /// Opaque completion token, passed to [`Gateway::wait_for_completion`]
    pub id: String,
}

/// External tool host and authorization backend
#[async_trait]
pub trait Gateway: Send + Sync {
    /// List the tool definitions for the configured toolkits
    async fn list_tools(&self, toolkits: &[String], limit: usize) -> Result<Vec<ToolSpec>, GatewayError>;

    /// Execute a tool call remotely and return its output
    async fn execute(&self, tool: &str, input: &Value) -> Result<Value, GatewayError>;

    /// Start an authorization flow for a tool, returning the user-facing
    /// URL and the completion token
    async fn begin_authorization(&self, tool: &str) -> Result<AuthRequest, GatewayError>;

    /// Block until the authorization flow identified by `id` completes
    ///
    /// Returns an error if the external party reports the flow as failed,
    /// denied, or expired. No internal deadline is imposed.
    async fn wait_for_completion(&self, id: &str) -> Result<(), GatewayError>;
}

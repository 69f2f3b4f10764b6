//! HTTP implementation of the tool gateway

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{AuthRequest, Gateway, GatewayError, ToolSpec};
use crate::config::GatewayConfig;

/// HTTP client for an Arcade-style tool gateway
pub struct GatewayClient {
    base_url: String,
    api_key: String,
    user_id: String,
    poll_interval: Duration,
    http: Client,
}

impl GatewayClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key and user id from the environment variables named
    /// in the config.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            GatewayError::InvalidResponse(format!("API key environment variable {} not set", config.api_key_env))
        })?;
        let user_id = std::env::var(&config.user_id_env).map_err(|_| {
            GatewayError::InvalidResponse(format!("User id environment variable {} not set", config.user_id_env))
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(GatewayError::Network)?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key,
            user_id,
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            http,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::ApiError { status, message });
        }

        Ok(response.json().await?)
    }

    async fn get(&self, path: &str) -> Result<Value, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::ApiError { status, message });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Gateway for GatewayClient {
    async fn list_tools(&self, toolkits: &[String], limit: usize) -> Result<Vec<ToolSpec>, GatewayError> {
        debug!(?toolkits, limit, "list_tools: called");
        let mut tools = Vec::new();

        for toolkit in toolkits {
            let body = self
                .get(&format!("/v1/tools?toolkit={}&limit={}", toolkit, limit))
                .await?;

            let items: Vec<ToolSpec> = serde_json::from_value(
                body.get("items")
                    .cloned()
                    .ok_or_else(|| GatewayError::InvalidResponse("tool listing missing 'items'".to_string()))?,
            )?;

            debug!(toolkit = %toolkit, count = items.len(), "list_tools: toolkit loaded");
            tools.extend(items);

            if tools.len() >= limit {
                tools.truncate(limit);
                break;
            }
        }

        Ok(tools)
    }

    async fn execute(&self, tool: &str, input: &Value) -> Result<Value, GatewayError> {
        debug!(%tool, "execute: called");
        let body = serde_json::json!({
            "tool_name": tool,
            "user_id": self.user_id,
            "input": input,
        });

        let response = self.post("/v1/tools/execute", &body).await?;

        Ok(response.get("output").cloned().unwrap_or(Value::Null))
    }

    async fn begin_authorization(&self, tool: &str) -> Result<AuthRequest, GatewayError> {
        debug!(%tool, "begin_authorization: called");
        let body = serde_json::json!({
            "tool_name": tool,
            "user_id": self.user_id,
        });

        let response = self.post("/v1/tools/authorize", &body).await?;

        Ok(serde_json::from_value(response)?)
    }

    async fn wait_for_completion(&self, id: &str) -> Result<(), GatewayError> {
        debug!(%id, "wait_for_completion: called");

        // Poll until the external party reports a terminal status. The
        // surrounding environment may impose a deadline; we do not.
        loop {
            let body = self.get(&format!("/v1/auth/requests/{}", id)).await?;

            let status: AuthStatus = serde_json::from_value(body)?;
            match status.status.as_str() {
                "completed" => return Ok(()),
                "pending" => {
                    tokio::time::sleep(self.poll_interval).await;
                }
                other => {
                    warn!(%id, status = %other, "wait_for_completion: terminal failure");
                    return Err(GatewayError::AuthorizationFailed(other.to_string()));
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthStatus {
    status: String,
}

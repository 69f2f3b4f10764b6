//! Tool gateway error types

use thiserror::Error;

/// Errors that can occur talking to the tool gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

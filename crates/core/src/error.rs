//! Error types for the thoughtloop domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. Nothing in the loop
//! recovers from any of them: every error aborts the run.

use thiserror::Error;

/// The top-level error type for all thoughtloop operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Transcript construction ---
    #[error("Validation error: {0}")]
    Validation(String),

    // --- Model invocation ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Action payload parsing ---
    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    // --- Tool lookup and execution ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures at the model-invocation boundary. Always fatal to the run.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// A model-emitted action payload that could not be understood.
#[derive(Debug, Clone, Error)]
pub enum ActionError {
    #[error("Malformed action XML: {reason}")]
    Malformed { reason: String },

    #[error("Action is missing required <{element}> element")]
    MissingElement { element: &'static str },
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

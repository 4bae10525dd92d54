//! Error types for Opsify API operations.

use thiserror::Error;

/// Errors that can occur while validating tool arguments or talking to the
/// Opsify API.
#[derive(Debug, Error)]
pub enum OpsifyError {
    /// Configuration is missing or invalid. Fatal at startup.
    #[error("{0}")]
    Config(String),

    /// Tool arguments failed validation.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The requested tool is not registered on this host.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A JSON payload supplied as a tool argument could not be parsed.
    #[error("Invalid JSON format - {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The upstream API answered with a 4xx/5xx status.
    #[error("API Error {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The upstream response body was not valid JSON.
    #[error("Invalid JSON response: {0}")]
    Decode(#[source] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// MCP transport failed to start or terminated abnormally.
    #[error("MCP transport error: {0}")]
    Transport(String),
}

impl OpsifyError {
    /// Whether the error originated upstream of the adapter, either on the
    /// wire or in a payload the adapter was asked to forward.
    ///
    /// The session host reports these as `Error: ...` text results instead
    /// of protocol errors.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::UpstreamStatus { .. } | Self::Decode(_) | Self::InvalidJson(_)
        )
    }

    /// Whether the caller supplied bad arguments.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParams(_) | Self::UnknownTool(_) | Self::InvalidJson(_)
        )
    }
}

/// Result type alias for Opsify operations.
pub type Result<T> = core::result::Result<T, OpsifyError>;

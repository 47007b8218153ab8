//! Error types for portfolio report operations
//!
//! Three layers of failure exist:
//! - [`AdapterError`]: one call to a market, news or generation service failed.
//!   The pipeline catches these per ticker and renders them into the report.
//! - [`DeliveryError`]: the finished report could not be sent. Terminal for a run.
//! - [`ReportError`]: configuration, input, template or storage problems.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single call to an external data or generation service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// Transport-level failure (DNS, TLS, connection reset, ...)
    #[error("request to {provider} failed: {message}")]
    Request { provider: String, message: String },

    /// The service answered with a non-success status
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// The response body could not be understood
    #[error("could not parse {provider} response: {message}")]
    Parse { provider: String, message: String },

    /// The call exceeded its deadline
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout { operation: String, after: Duration },

    /// Text generation failed (quota, model error, empty output)
    #[error("text generation failed: {0}")]
    Generation(String),

    /// The adapter is not configured correctly
    #[error("configuration error: {0}")]
    Config(String),
}

impl AdapterError {
    /// Wrap a reqwest error raised while talking to `provider`
    pub fn request(provider: &str, err: &reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Parse {
                provider: provider.to_string(),
                message: err.to_string(),
            };
        }
        Self::Request {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }

    /// Build a status error, truncating long bodies
    pub fn status(provider: &str, status: u16, body: &str) -> Self {
        const MAX_BODY: usize = 200;
        let body = match body.char_indices().nth(MAX_BODY) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::Status {
            provider: provider.to_string(),
            status,
            body,
        }
    }

    /// Build a parse error
    pub fn parse(provider: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

impl From<digest_llm::LLMError> for AdapterError {
    fn from(err: digest_llm::LLMError) -> Self {
        Self::Generation(err.to_string())
    }
}

/// Failure to hand the finished report to its recipients
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Missing or invalid transport settings
    #[error("delivery configuration error: {0}")]
    Config(String),

    /// The message could not be built
    #[error("failed to build email: {0}")]
    Build(String),

    /// The transport rejected or lost the message
    #[error("failed to send email: {0}")]
    Transport(String),

    /// Writing the report to disk failed
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Report pipeline errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ticker symbol could not be normalized
    #[error("Invalid ticker symbol: '{0}'")]
    InvalidTicker(String),

    /// Quantity is not a non-negative whole number
    #[error("Invalid quantity '{value}' for {ticker}")]
    InvalidQuantity { ticker: String, value: String },

    /// Prompt template failed to render
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// Chart rendering failed
    #[error("Chart error: {0}")]
    ChartError(String),

    /// Persisted portfolio could not be read or written
    #[error("Portfolio store error: {0}")]
    StoreError(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// An adapter could not be constructed
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// The report could not be delivered
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

impl From<digest_utils::EnvError> for ReportError {
    fn from(err: digest_utils::EnvError) -> Self {
        ReportError::ConfigError(err.to_string())
    }
}

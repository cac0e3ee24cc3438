//! Error types for the Service Layer client

use thiserror::Error;

/// Boxed source error carried by transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every failure the client can surface to a caller.
///
/// Query translation errors are deterministic: the same expression shape
/// always fails the same way. API and transport errors are never swallowed,
/// with the single exception of the best-effort logout.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid option, detected before any network call
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Login was rejected by the API
    #[error("Authentication failed ({code}): {message}")]
    Authentication { code: String, message: String },

    /// The addressed resource or key does not exist (HTTP 404)
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Structured error returned by the API on a non-2xx response
    #[error("Service Layer error {code} (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Network, TLS or timeout failure
    #[error("Request to Service Layer failed: {0}")]
    Transport(#[source] BoxError),

    /// A successful response whose body does not match the expected shape
    #[error("Failed to decode response body: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// A predicate or projection has a shape the API cannot express
    #[error("Query translation error: {0}")]
    QueryTranslation(String),

    /// A binary operator outside the API's filter grammar
    #[error("Operator {0} is not supported by Service Layer")]
    UnsupportedOperator(String),

    /// Entity type metadata is incomplete (e.g. no key field)
    #[error("Schema error: {0}")]
    Schema(String),

    /// A runtime value cannot be used where it was supplied (e.g. null key)
    #[error("Invalid value: {0}")]
    Value(String),

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn query_translation(message: impl Into<String>) -> Self {
        Self::QueryTranslation(message.into())
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub fn value(message: impl Into<String>) -> Self {
        Self::Value(message.into())
    }

    pub fn transport(source: impl Into<BoxError>) -> Self {
        Self::Transport(source.into())
    }

    /// API error code, when the failure carries one.
    ///
    /// Transport failures never have a code.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Authentication { code, .. } | Self::Api { code, .. } => Some(code),
            Self::NotFound { .. } => Some("404"),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the error comes from the remote side or the wire rather than
    /// from local misuse of the API
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::NotFound { .. }
                | Self::Api { .. }
                | Self::Transport(_)
        )
    }
}

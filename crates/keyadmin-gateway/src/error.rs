//! Error types for gateway operations

use thiserror::Error;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Generic message used when no response was received
pub const CONNECTIVITY_MESSAGE: &str =
    "could not reach the server, check the network connection";

/// Errors surfaced by gateway write operations and the liveness probe
///
/// Read operations never return these; they fall back to static data.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The backend is marked unavailable; the call was not attempted
    #[error("backend unavailable: {operation} requires a reachable backend")]
    BackendUnavailable {
        /// Operation that was refused
        operation: String,
    },

    /// The backend answered with a failure
    #[error("{message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message from the response body, or a generic status line
        message: String,
    },

    /// No response was received
    #[error("{message}")]
    Connectivity {
        /// Error message
        message: String,
        /// Whether the request hit its timeout
        timed_out: bool,
    },

    /// A local precondition failed; the call was not attempted
    #[error("Validation error: {field} - {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// The backend answered 2xx with a body that does not match the schema
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message
        message: String,
    },

    /// Invalid gateway configuration
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl GatewayError {
    /// Create a backend unavailable error
    pub fn backend_unavailable(operation: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            operation: operation.into(),
        }
    }

    /// Create a server error
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Create a connectivity error with the generic message
    pub fn connectivity(timed_out: bool) -> Self {
        Self::Connectivity {
            message: CONNECTIVITY_MESSAGE.to_string(),
            timed_out,
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Classify a transport failure
    ///
    /// Builder errors mean the request could not be formed; every other
    /// transport error means no response came back.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            Self::configuration(format!("could not build request: {err}"))
        } else {
            Self::connectivity(err.is_timeout())
        }
    }

    /// Whether this failure means the backend could not be reached
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    /// Check if error is retryable
    ///
    /// Only network-class failures are retried; an answer from the backend,
    /// even a failing one, is final.
    pub const fn is_retryable(&self) -> bool {
        self.is_network()
    }

    /// HTTP status, when the backend answered
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get error severity level for logging
    ///
    /// The gateway logs each failed call at the level this selects.
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation { .. } => ErrorSeverity::Info,
            Self::BackendUnavailable { .. } | Self::Server { .. } => ErrorSeverity::Warning,
            Self::Connectivity { .. } | Self::InvalidResponse { .. } => ErrorSeverity::Error,
            Self::Configuration { .. } => ErrorSeverity::Critical,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Informational - caller input was rejected locally
    Info,
    /// Warning - the backend refused or is known to be down
    Warning,
    /// Error - the backend could not be reached or misbehaved
    Error,
    /// Critical - the gateway is misconfigured
    Critical,
}

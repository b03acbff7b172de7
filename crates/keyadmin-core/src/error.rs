//! Error types shared across the keyadmin crates

use std::{error::Error as StdError, fmt};

/// Main error type for keyadmin
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation error
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
        }
    }
}

impl StdError for Error {}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validation_error_display() {
        let error = Error::Validation {
            field: "amount".to_string(),
            message: "must be non-zero".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Validation error: amount - must be non-zero"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn test_config_error_conversion() {
        let config_error = config::ConfigError::Message("bad value".to_string());
        let app_error = Error::from(config_error);

        match app_error {
            Error::Configuration { message } => assert_eq!(message, "bad value"),
            other => panic!("Expected Configuration error, got {other:?}"),
        }
    }
}

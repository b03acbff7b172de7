//! Core types and configuration for the keyadmin backend client

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod proxy;
pub mod types;

// Re-export commonly used types
pub use config::{Config, GatewayConfig, LoggingConfig, RetryConfig};
pub use error::{Error, Result};
pub use proxy::{ProxyItem, ProxyProtocol, ProxyStatistics};
pub use types::{
    AdminKey, ApiProvider, AuditLogEntry, BankInfo, CreditPackage, DashboardStats, KeySummary,
    ProviderStatus,
};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. The configured
/// format selects between JSON lines and the human-oriented pretty layer.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let installed = if logging.format == "json" {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|e| Error::Configuration {
        message: format!("failed to install tracing subscriber: {e}"),
    })
}

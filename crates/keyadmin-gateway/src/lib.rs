//! Access gateway for the key-management backend
//!
//! Every backend call goes through one [`Gateway`], which tracks whether the
//! backend is reachable. Reads (`list_keys`, `dashboard_stats`, ...) never
//! fail: while the backend is down, or when a call fails, they return canned
//! [`FallbackDataset`] values tagged [`DataSource::Fallback`]. Writes are
//! validated locally, then refused with [`GatewayError::BackendUnavailable`]
//! while the backend is down, and otherwise make exactly one call.
//!
//! ```no_run
//! use keyadmin_core::GatewayConfig;
//! use keyadmin_gateway::Gateway;
//!
//! # async fn run() -> keyadmin_gateway::GatewayResult<()> {
//! let gateway = Gateway::new(GatewayConfig::with_base_url("http://localhost:5000/api"))?;
//! gateway.wake_up().await;
//!
//! let keys = gateway.list_keys().await;
//! if keys.is_fallback() {
//!     println!("showing example data");
//! }
//!
//! gateway.update_credit("TV-DEMO-2024-001", 500.0).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::multiple_crate_versions,
    clippy::future_not_send
)]

pub mod availability;
pub mod error;
pub mod fallback;
pub mod fetched;
pub mod validation;

mod envelope;
mod gateway;
mod probe;
mod resources;
mod retry;

pub use availability::{AvailabilitySnapshot, BackendAvailability};
pub use error::{ErrorSeverity, GatewayError, GatewayResult};
pub use fallback::FallbackDataset;
pub use fetched::{DataSource, Fetched};
pub use gateway::Gateway;
pub use validation::CreditDelta;

//! Best-effort belief about whether the backend is reachable
//!
//! The flag is a hint, not a lock: concurrent calls race on it and the last
//! writer wins. One instance is owned by each gateway (and may be shared
//! between gateways through an `Arc`), so independent gateways never observe
//! each other's state.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Availability flag plus the time it was last confirmed or refuted
#[derive(Debug)]
pub struct BackendAvailability {
    available: AtomicBool,
    last_check: Mutex<Option<Check>>,
}

#[derive(Debug, Clone, Copy)]
struct Check {
    at: Instant,
    wall: DateTime<Utc>,
}

/// Point-in-time copy of the availability state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySnapshot {
    /// Whether the backend is believed reachable
    pub available: bool,
    /// When that belief was last updated by an actual call
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl BackendAvailability {
    /// Optimistic initial state: available, never checked
    pub fn new() -> Self {
        Self::starting_as(true)
    }

    /// Initial state with an explicit flag
    pub fn starting_as(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
            last_check: Mutex::new(None),
        }
    }

    /// Whether the backend is believed reachable
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Record a successful response
    pub fn mark_available(&self) {
        self.record(true);
    }

    /// Record a network-class failure
    pub fn mark_unavailable(&self) {
        self.record(false);
    }

    fn record(&self, available: bool) {
        let previous = self.available.swap(available, Ordering::AcqRel);
        *self.last_check.lock() = Some(Check {
            at: Instant::now(),
            wall: Utc::now(),
        });

        if previous != available {
            if available {
                tracing::info!("backend reachable again");
            } else {
                tracing::warn!("backend marked unavailable");
            }
        }
    }

    /// Wall-clock time of the last recorded outcome
    pub fn last_checked_at(&self) -> Option<DateTime<Utc>> {
        self.last_check.lock().map(|check| check.wall)
    }

    /// Time elapsed since the last recorded outcome
    pub fn since_last_check(&self) -> Option<Duration> {
        self.last_check.lock().map(|check| check.at.elapsed())
    }

    /// Copy the current state
    pub fn snapshot(&self) -> AvailabilitySnapshot {
        AvailabilitySnapshot {
            available: self.is_available(),
            last_checked_at: self.last_checked_at(),
        }
    }
}

impl Default for BackendAvailability {
    fn default() -> Self {
        Self::new()
    }
}

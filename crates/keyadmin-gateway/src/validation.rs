//! Local preconditions checked before any network call

use crate::error::{GatewayError, GatewayResult};
use serde::Serialize;

/// Largest magnitude an `f64` holds without losing integer precision
const MAX_EXACT_DELTA: f64 = 9_007_199_254_740_991.0;

/// Require a non-blank identifier
///
/// # Errors
///
/// Returns a validation error naming `field` when `value` is empty or only
/// whitespace.
pub fn require_identifier(field: &str, value: &str) -> GatewayResult<()> {
    if value.trim().is_empty() {
        return Err(GatewayError::validation(field, "must be a non-empty string"));
    }
    Ok(())
}

/// A signed, non-zero change to a key's credit balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CreditDelta(i64);

impl CreditDelta {
    /// Validate a delta entered as a number
    ///
    /// # Errors
    ///
    /// Rejects zero, NaN, infinities, fractional amounts and amounts too
    /// large to represent exactly.
    pub fn new(amount: f64) -> GatewayResult<Self> {
        if !amount.is_finite() {
            return Err(GatewayError::validation("amount", "must be a finite number"));
        }
        if amount == 0.0 {
            return Err(GatewayError::validation("amount", "must be non-zero"));
        }
        if amount.fract() != 0.0 {
            return Err(GatewayError::validation("amount", "must be a whole number of credits"));
        }
        if amount.abs() > MAX_EXACT_DELTA {
            return Err(GatewayError::validation("amount", "is too large"));
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(amount as i64))
    }

    /// The signed amount
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for CreditDelta {
    type Error = GatewayError;

    fn try_from(amount: i64) -> GatewayResult<Self> {
        if amount == 0 {
            return Err(GatewayError::validation("amount", "must be non-zero"));
        }
        Ok(Self(amount))
    }
}

//! Resource types exchanged with the key-management backend
//!
//! The backend is a document store that names identifiers `_id` and uses
//! camelCase field names; every type here keeps that wire shape so the same
//! definitions decode live responses and describe fallback data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A license/activation key issued to an end user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminKey {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,

    /// The secret key string handed to the user
    pub key: String,

    /// Remaining credit balance
    #[serde(default)]
    pub credit: i64,

    /// Free-text note
    #[serde(default)]
    pub note: Option<String>,

    /// Expiry timestamp, if the key expires
    #[serde(default)]
    pub expired_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Whether the key is active
    pub is_active: bool,

    /// Maximum number of activations
    #[serde(default = "default_max_activations")]
    pub max_activations: u32,

    /// Activations used so far, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_count: Option<u32>,

    /// Whether this is a trial key
    #[serde(default)]
    pub is_trial: bool,
}

const fn default_max_activations() -> u32 {
    1
}

const fn default_true() -> bool {
    true
}

impl AdminKey {
    /// Whether the key has an expiry at or before `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expired_at.is_some_and(|expiry| expiry <= now)
    }
}

/// Aggregate counters over a key list, as shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySummary {
    /// Number of keys
    pub total_keys: usize,
    /// Keys flagged active
    pub active_keys: usize,
    /// Keys whose expiry has passed
    pub expired_keys: usize,
    /// Sum of all credit balances, saturating at the `i64` bounds
    pub total_credit: i64,
    /// Sum of credit balances held by active keys, saturating likewise
    pub total_active_credit: i64,
}

impl KeySummary {
    /// Summarize `keys` as of `now`
    #[must_use]
    pub fn from_keys(keys: &[AdminKey], now: DateTime<Utc>) -> Self {
        keys.iter().fold(Self::default(), |mut summary, key| {
            summary.total_keys += 1;
            summary.total_credit = summary.total_credit.saturating_add(key.credit);
            if key.is_active {
                summary.active_keys += 1;
                summary.total_active_credit =
                    summary.total_active_credit.saturating_add(key.credit);
            }
            if key.is_expired_at(now) {
                summary.expired_keys += 1;
            }
            summary
        })
    }
}

/// Operational status of an upstream API provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderStatus {
    /// Working normally
    Operational,
    /// Working with elevated errors or latency
    Degraded,
    /// Failing
    Error,
    /// Not reported or not recognised
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Operational => "Operational",
            Self::Degraded => "Degraded",
            Self::Error => "Error",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// A third-party API vendor whose credentials are pooled by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProvider {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Operational status
    #[serde(default)]
    pub status: ProviderStatus,

    /// Pooled credentials, in backend order
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Spend today, in USD
    #[serde(default)]
    pub cost_today: f64,

    /// Lifetime request count
    #[serde(default)]
    pub total_requests: u64,

    /// Requests today
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_requests: Option<u64>,

    /// Successful requests today
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful_requests: Option<u64>,

    /// Failed requests today
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_requests: Option<u64>,

    /// Success rate as reported by the backend, e.g. `"98.5"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<String>,

    /// Tokens consumed today
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens_today: Option<u64>,

    /// Average response time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_response_time: Option<f64>,

    /// Last time the backend checked this provider
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
}

/// One entry of the administrative audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,

    /// Action code, e.g. `CREATE_KEY`
    pub action: String,

    /// Human-readable details
    #[serde(default)]
    pub details: String,

    /// When the action happened
    pub timestamp: DateTime<Utc>,

    /// Acting user
    #[serde(default)]
    pub user_id: Option<String>,

    /// Source address
    #[serde(default)]
    pub ip: Option<String>,
}

/// A purchasable bundle of credits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPackage {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Price in VND
    pub price: f64,

    /// Credits granted
    pub credits: i64,

    /// Bonus label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<String>,

    /// Marketing description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Highlighted as the popular choice
    #[serde(default)]
    pub is_popular: bool,

    /// Offered for sale
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Aggregates shown on the dashboard landing view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Billing aggregates
    #[serde(default)]
    pub billing_stats: BillingStats,

    /// Upstream API usage aggregates
    #[serde(default)]
    pub api_usage_stats: ApiUsageStats,
}

/// Billing aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingStats {
    /// Total revenue in VND
    #[serde(default)]
    pub total_revenue: f64,

    /// Transactions this month
    #[serde(default)]
    pub monthly_transactions: u64,
}

/// Upstream API usage aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUsageStats {
    /// Requests across all providers
    #[serde(default)]
    pub total_requests: u64,

    /// Spend today, in USD
    #[serde(default)]
    pub cost_today: f64,
}

/// Bank account shown to customers paying by transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankInfo {
    /// Bank name
    pub bank_name: String,

    /// Account number
    pub account_number: String,

    /// Account holder
    pub account_name: String,

    /// Branch
    #[serde(default)]
    pub branch_name: String,

    /// Payment note shown to customers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payload for creating a key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewKey {
    /// Starting credit
    pub credit: i64,

    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Expiry timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,

    /// Whether the key starts active
    pub is_active: bool,

    /// Maximum number of activations
    pub max_activations: u32,

    /// Whether this is a trial key
    pub is_trial: bool,
}

impl Default for NewKey {
    fn default() -> Self {
        Self {
            credit: 0,
            note: None,
            expired_at: None,
            is_active: true,
            max_activations: default_max_activations(),
            is_trial: false,
        }
    }
}

/// Partial update of a key's editable details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDetailsUpdate {
    /// New note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// New expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,

    /// New activation ceiling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_activations: Option<u32>,

    /// New trial flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_trial: Option<bool>,
}

/// A credential to add to a provider's pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderKeyInput {
    /// The credential string
    pub key: String,

    /// Optional nickname
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

/// Payload for creating or replacing a credit package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInput {
    /// Display name
    pub name: String,

    /// Price in VND
    pub price: f64,

    /// Credits granted
    pub credits: i64,

    /// Bonus label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<String>,

    /// Marketing description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Highlighted as the popular choice
    #[serde(default)]
    pub is_popular: bool,

    /// Offered for sale
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Response of operations that only report success
///
/// Tolerates an empty object as well as `{ success, message }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Success flag, when the backend sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    /// Message, when the backend sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

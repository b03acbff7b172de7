//! Proxy pool types for the `/admin/proxies` namespace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Proxy protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyProtocol {
    /// Plain HTTP proxy
    #[default]
    Http,
    /// HTTPS proxy
    Https,
    /// SOCKS4 proxy
    Socks4,
    /// SOCKS5 proxy
    Socks5,
}

impl fmt::Display for ProxyProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Socks4 => "socks4",
            Self::Socks5 => "socks5",
        };
        f.write_str(scheme)
    }
}

/// A proxy in the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyItem {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Host name or address
    pub host: String,

    /// Port
    pub port: u16,

    /// Proxy user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Proxy password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Protocol
    #[serde(default)]
    pub protocol: ProxyProtocol,

    /// Whether the proxy is in rotation
    pub is_active: bool,

    /// Region label
    #[serde(default)]
    pub location: String,

    /// Vendor label
    #[serde(default)]
    pub provider: String,

    /// Last time the proxy carried a request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,

    /// Successful requests
    #[serde(default)]
    pub success_count: u64,

    /// Failed requests
    #[serde(default)]
    pub failure_count: u64,

    /// Average response time in milliseconds
    #[serde(default)]
    pub avg_response_time: f64,

    /// API credential currently routed through this proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_api_key: Option<String>,

    /// Operator notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Coarse health grade derived from a proxy's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyHealth {
    /// Proxy is switched off
    Inactive,
    /// Proxy has never carried a request
    NeverUsed,
    /// At least 90% success
    Excellent,
    /// At least 70% success
    Good,
    /// Below 70% success
    Poor,
}

impl fmt::Display for ProxyHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Inactive => "Inactive",
            Self::NeverUsed => "Never Used",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Poor => "Poor",
        };
        f.write_str(label)
    }
}

impl ProxyItem {
    /// `host:port`
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Proxy URL, with credentials when both user and password are set
    ///
    /// Credentials are percent-encoded so reserved characters survive.
    #[must_use]
    pub fn url(&self) -> String {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!(
                "{}://{}:{}@{}",
                self.protocol,
                urlencoding::encode(user),
                urlencoding::encode(pass),
                self.endpoint()
            ),
            _ => format!("{}://{}", self.protocol, self.endpoint()),
        }
    }

    /// Success percentage, or `None` before the first request
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.success_count.saturating_add(self.failure_count);
        (total > 0).then(|| self.success_count as f64 / total as f64 * 100.0)
    }

    /// Health grade
    #[must_use]
    pub fn health(&self) -> ProxyHealth {
        if !self.is_active {
            return ProxyHealth::Inactive;
        }
        match self.success_rate() {
            None => ProxyHealth::NeverUsed,
            Some(rate) if rate >= 90.0 => ProxyHealth::Excellent,
            Some(rate) if rate >= 70.0 => ProxyHealth::Good,
            Some(_) => ProxyHealth::Poor,
        }
    }
}

/// Filter for listing proxies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyListQuery {
    /// 1-based page number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// `active`, `inactive` or `all`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Region filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// `true`, `false` or `all`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned: Option<String>,
}

/// Pagination block of a proxy listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page
    pub current_page: u32,
    /// Number of pages
    pub total_pages: u32,
    /// Number of proxies across all pages
    pub total_items: u64,
    /// Page size
    pub items_per_page: u32,
}

/// One page of proxies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyPage {
    /// Proxies on this page
    pub proxies: Vec<ProxyItem>,
    /// Pagination details
    pub pagination: Pagination,
}

/// Payload for adding a proxy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProxy {
    /// Display name
    pub name: String,
    /// Host name or address
    pub host: String,
    /// Port
    pub port: u16,
    /// Proxy user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Proxy password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Protocol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProxyProtocol>,
    /// Region label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Vendor label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Operator notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update of a proxy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyUpdate {
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// New port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// New protocol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProxyProtocol>,
    /// Switch the proxy on or off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// New region label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// New notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Result of a live test of one proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyTestResult {
    /// Whether the proxy answered
    pub success: bool,
    /// Exit address seen through the proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Round trip in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Summary message
    #[serde(default)]
    pub message: String,
}

/// Per-proxy line of a batch test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyBatchEntry {
    /// Proxy identifier
    pub proxy_id: String,
    /// Proxy name
    pub name: String,
    /// Proxy host
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Whether the proxy answered
    pub success: bool,
    /// Round trip in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Totals of a batch test
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyBatchSummary {
    /// Proxies tested
    pub total: u64,
    /// Proxies that answered
    pub success: u64,
    /// Proxies that failed
    pub failed: u64,
    /// Success percentage
    pub success_rate: f64,
}

/// Result of testing every proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyBatchTestResult {
    /// Per-proxy results
    pub results: Vec<ProxyBatchEntry>,
    /// Totals
    pub summary: ProxyBatchSummary,
}

/// Options for automatic proxy assignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoAssignRequest {
    /// Restrict to credentials of one provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Reassign credentials that already have a proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_reassign: Option<bool>,
}

/// Outcome of assigning one credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoAssignEntry {
    /// Credential, usually masked by the backend
    pub api_key: String,
    /// Provider of the credential
    pub provider: String,
    /// Assignment status
    pub status: String,
    /// Assigned proxy name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_name: Option<String>,
    /// Assigned proxy host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_host: Option<String>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of automatic proxy assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoAssignReport {
    /// Credentials that received a proxy
    pub total_assigned: u64,
    /// Per-credential outcomes
    pub results: Vec<AutoAssignEntry>,
}

/// Pool-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyOverview {
    /// Proxies in the pool
    pub total: u64,
    /// Active proxies
    pub active: u64,
    /// Proxies carrying a credential
    pub assigned: u64,
    /// Active proxies without a credential
    pub available: u64,
    /// Proxies used in the last day
    pub recent_activity: u64,
    /// Share of proxies that are assigned, in percent
    pub assignment_rate: f64,
}

/// A `{ _id, count }` bucket of a grouped count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBucket {
    /// Group key
    #[serde(rename = "_id")]
    pub key: String,
    /// Members in the group
    pub count: u64,
}

/// Entry of the best-performing proxies list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    /// Proxy name
    pub name: String,
    /// `host:port`
    pub endpoint: String,
    /// Success percentage
    pub success_rate: f64,
    /// Average response time in milliseconds
    pub avg_response_time: f64,
}

/// Aggregate statistics over the proxy pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyStatistics {
    /// Pool-wide counters
    pub overview: ProxyOverview,
    /// Proxies per location
    #[serde(default)]
    pub location_stats: Vec<CountBucket>,
    /// Proxies per protocol
    #[serde(default)]
    pub protocol_stats: Vec<CountBucket>,
    /// Proxies per vendor
    #[serde(default)]
    pub provider_stats: Vec<CountBucket>,
    /// Best performers, when the backend computes them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_performers: Option<Vec<TopPerformer>>,
}

impl ProxyStatistics {
    /// Compute pool statistics from a list of proxies
    ///
    /// Grouped counts are ordered by descending count, then key.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_proxies(proxies: &[ProxyItem], now: DateTime<Utc>) -> Self {
        let total = proxies.len() as u64;
        let active = proxies.iter().filter(|p| p.is_active).count() as u64;
        let assigned = proxies
            .iter()
            .filter(|p| p.assigned_api_key.is_some())
            .count() as u64;
        let available = proxies
            .iter()
            .filter(|p| p.is_active && p.assigned_api_key.is_none())
            .count() as u64;
        let day_ago = now - chrono::Duration::days(1);
        let recent_activity = proxies
            .iter()
            .filter(|p| p.last_used.is_some_and(|used| used >= day_ago))
            .count() as u64;
        let assignment_rate = if total == 0 {
            0.0
        } else {
            assigned as f64 / total as f64 * 100.0
        };

        Self {
            overview: ProxyOverview {
                total,
                active,
                assigned,
                available,
                recent_activity,
                assignment_rate,
            },
            location_stats: count_by(proxies, |p| p.location.clone()),
            protocol_stats: count_by(proxies, |p| p.protocol.to_string()),
            provider_stats: count_by(proxies, |p| p.provider.clone()),
            top_performers: None,
        }
    }
}

fn count_by(proxies: &[ProxyItem], key: impl Fn(&ProxyItem) -> String) -> Vec<CountBucket> {
    let mut counts = std::collections::BTreeMap::<String, u64>::new();
    for proxy in proxies {
        *counts.entry(key(proxy)).or_default() += 1;
    }

    let mut buckets: Vec<CountBucket> = counts
        .into_iter()
        .map(|(key, count)| CountBucket { key, count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    buckets
}

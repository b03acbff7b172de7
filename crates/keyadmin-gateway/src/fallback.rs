//! Static example data served by reads while the backend is unavailable
//!
//! The dataset is built once per process, with timestamps relative to that
//! moment, and never mutated afterwards.

use chrono::{DateTime, Duration, Utc};
use keyadmin_core::proxy::{Pagination, ProxyListQuery, ProxyPage, ProxyStatistics};
use keyadmin_core::types::{ApiUsageStats, BillingStats};
use keyadmin_core::{
    AdminKey, ApiProvider, AuditLogEntry, BankInfo, CreditPackage, DashboardStats, ProviderStatus,
    ProxyItem, ProxyProtocol,
};
use std::sync::{Arc, LazyLock};

/// Page size used when a proxy query does not set one
const DEFAULT_PROXY_PAGE_SIZE: u32 = 10;

static STANDARD: LazyLock<Arc<FallbackDataset>> =
    LazyLock::new(|| Arc::new(FallbackDataset::build(Utc::now())));

/// Canned example entities, keyed by resource
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDataset {
    /// Example keys
    pub keys: Vec<AdminKey>,
    /// Example providers
    pub providers: Vec<ApiProvider>,
    /// Example audit trail, newest first
    pub audit_log: Vec<AuditLogEntry>,
    /// Example credit packages
    pub packages: Vec<CreditPackage>,
    /// Example dashboard aggregates
    pub dashboard: DashboardStats,
    /// Example proxy pool
    pub proxies: Vec<ProxyItem>,
    /// Example bank details; none are configured in demo mode
    pub bank_info: Option<BankInfo>,
    /// When the dataset was built
    pub built_at: DateTime<Utc>,
}

impl FallbackDataset {
    /// The process-wide dataset
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD)
    }

    /// Build the dataset with timestamps relative to `now`
    #[must_use]
    pub fn build(now: DateTime<Utc>) -> Self {
        Self {
            keys: example_keys(now),
            providers: example_providers(now),
            audit_log: example_audit_log(now),
            packages: example_packages(),
            dashboard: DashboardStats {
                billing_stats: BillingStats {
                    total_revenue: 125_000_000.0,
                    monthly_transactions: 45,
                },
                api_usage_stats: ApiUsageStats {
                    total_requests: 15_234,
                    cost_today: 12.45,
                },
            },
            proxies: example_proxies(now),
            bank_info: None,
            built_at: now,
        }
    }

    /// Filter and paginate the example proxies the way the backend would
    #[must_use]
    pub fn proxy_page(&self, query: &ProxyListQuery) -> ProxyPage {
        let matching: Vec<&ProxyItem> = self
            .proxies
            .iter()
            .filter(|proxy| match query.status.as_deref() {
                Some("active") => proxy.is_active,
                Some("inactive") => !proxy.is_active,
                _ => true,
            })
            .filter(|proxy| match query.assigned.as_deref() {
                Some("true") => proxy.assigned_api_key.is_some(),
                Some("false") => proxy.assigned_api_key.is_none(),
                _ => true,
            })
            .filter(|proxy| {
                query
                    .location
                    .as_deref()
                    .is_none_or(|location| proxy.location.eq_ignore_ascii_case(location))
            })
            .collect();

        let per_page = query.limit.filter(|&limit| limit > 0).unwrap_or(DEFAULT_PROXY_PAGE_SIZE);
        let page = query.page.filter(|&page| page > 0).unwrap_or(1);
        let total_items = matching.len() as u64;
        let total_pages = u32::try_from(total_items.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX);
        let skip = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);
        let take = usize::try_from(per_page).unwrap_or(usize::MAX);

        ProxyPage {
            proxies: matching.into_iter().skip(skip).take(take).cloned().collect(),
            pagination: Pagination {
                current_page: page,
                total_pages,
                total_items,
                items_per_page: per_page,
            },
        }
    }

    /// Pool statistics over the example proxies
    #[must_use]
    pub fn proxy_stats(&self) -> ProxyStatistics {
        ProxyStatistics::from_proxies(&self.proxies, self.built_at)
    }
}

fn example_keys(now: DateTime<Utc>) -> Vec<AdminKey> {
    vec![
        AdminKey {
            id: "mock-key-1".to_string(),
            key: "TV-DEMO-2024-001".to_string(),
            credit: 1_000,
            note: Some("Demo key for testing".to_string()),
            expired_at: Some(now + Duration::days(30)),
            created_at: now,
            is_active: true,
            max_activations: 100,
            activation_count: Some(15),
            is_trial: false,
        },
        AdminKey {
            id: "mock-key-2".to_string(),
            key: "TV-PROD-2024-002".to_string(),
            credit: 5_000,
            note: Some("Production key".to_string()),
            expired_at: Some(now + Duration::days(90)),
            created_at: now,
            is_active: true,
            max_activations: 500,
            activation_count: Some(234),
            is_trial: false,
        },
        AdminKey {
            id: "mock-key-3".to_string(),
            key: "TV-EXPIRED-001".to_string(),
            credit: 0,
            note: Some("Expired key".to_string()),
            expired_at: Some(now - Duration::days(7)),
            created_at: now,
            is_active: false,
            max_activations: 50,
            activation_count: Some(50),
            is_trial: false,
        },
    ]
}

fn example_provider(
    id: &str,
    name: &str,
    status: ProviderStatus,
    cost_today: f64,
    api_keys: &[&str],
    now: DateTime<Utc>,
) -> ApiProvider {
    ApiProvider {
        id: id.to_string(),
        name: name.to_string(),
        status,
        api_keys: api_keys.iter().map(ToString::to_string).collect(),
        cost_today,
        total_requests: 0,
        daily_requests: None,
        successful_requests: None,
        failed_requests: None,
        success_rate: None,
        total_tokens_today: None,
        avg_response_time: None,
        last_checked: Some(now),
    }
}

fn example_providers(now: DateTime<Utc>) -> Vec<ApiProvider> {
    vec![
        example_provider(
            "mock-provider-1",
            "OpenAI GPT-4",
            ProviderStatus::Operational,
            8.25,
            &["sk-mock-key-1", "sk-mock-key-2"],
            now,
        ),
        example_provider(
            "mock-provider-2",
            "Google Gemini Pro",
            ProviderStatus::Operational,
            3.15,
            &["gem-mock-key-1"],
            now,
        ),
        example_provider(
            "mock-provider-3",
            "Deepseek V3",
            ProviderStatus::Degraded,
            1.05,
            &[],
            now,
        ),
    ]
}

fn example_audit_log(now: DateTime<Utc>) -> Vec<AuditLogEntry> {
    [
        ("mock-log-1", "CREATE_KEY", "Created key TV-DEMO-2024-001", 2),
        ("mock-log-2", "UPDATE_CREDIT", "Added 1000 credit to key TV-PROD-2024-002", 4),
        ("mock-log-3", "REVOKE_KEY", "Revoked key TV-EXPIRED-001", 6),
    ]
    .into_iter()
    .map(|(id, action, details, hours_ago)| AuditLogEntry {
        id: id.to_string(),
        action: action.to_string(),
        details: details.to_string(),
        timestamp: now - Duration::hours(hours_ago),
        user_id: Some("admin".to_string()),
        ip: Some("192.168.1.1".to_string()),
    })
    .collect()
}

fn example_packages() -> Vec<CreditPackage> {
    [
        ("mock-package-1", "Basic", 1_000, 50_000.0, "For individual users"),
        ("mock-package-2", "Pro", 5_000, 200_000.0, "For small businesses"),
        ("mock-package-3", "Enterprise", 20_000, 750_000.0, "For large businesses"),
    ]
    .into_iter()
    .map(|(id, name, credits, price, description)| CreditPackage {
        id: id.to_string(),
        name: name.to_string(),
        price,
        credits,
        bonus: None,
        description: Some(description.to_string()),
        is_popular: false,
        is_active: true,
    })
    .collect()
}

fn example_proxies(now: DateTime<Utc>) -> Vec<ProxyItem> {
    vec![
        ProxyItem {
            id: "1".to_string(),
            name: "US East Proxy 1".to_string(),
            host: "proxy1.example.com".to_string(),
            port: 8080,
            username: Some("user1".to_string()),
            password: Some("pass1".to_string()),
            protocol: ProxyProtocol::Http,
            is_active: true,
            location: "US East".to_string(),
            provider: "ProxyProvider".to_string(),
            last_used: Some(now),
            success_count: 150,
            failure_count: 5,
            avg_response_time: 250.0,
            assigned_api_key: Some("sk-1234...abcd".to_string()),
            notes: Some("Primary US proxy".to_string()),
            created_at: now - Duration::days(7),
            updated_at: now,
        },
        ProxyItem {
            id: "2".to_string(),
            name: "EU West Proxy 1".to_string(),
            host: "proxy2.example.com".to_string(),
            port: 3128,
            username: None,
            password: None,
            protocol: ProxyProtocol::Https,
            is_active: true,
            location: "EU West".to_string(),
            provider: "ProxyProvider".to_string(),
            last_used: None,
            success_count: 89,
            failure_count: 11,
            avg_response_time: 320.0,
            assigned_api_key: None,
            notes: Some("European region proxy".to_string()),
            created_at: now - Duration::days(5),
            updated_at: now,
        },
        ProxyItem {
            id: "3".to_string(),
            name: "Asia Pacific Proxy 1".to_string(),
            host: "proxy3.example.com".to_string(),
            port: 1080,
            username: None,
            password: None,
            protocol: ProxyProtocol::Socks5,
            is_active: false,
            location: "Asia Pacific".to_string(),
            provider: "ProxyProvider".to_string(),
            last_used: None,
            success_count: 45,
            failure_count: 15,
            avg_response_time: 450.0,
            assigned_api_key: Some("sk-5678...efgh".to_string()),
            notes: Some("Currently inactive due to issues".to_string()),
            created_at: now - Duration::days(10),
            updated_at: now,
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use keyadmin_core::KeySummary;
    use keyadmin_core::proxy::ProxyHealth;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_dataset_is_shared() {
        let first = FallbackDataset::standard();
        let second = FallbackDataset::standard();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_every_resource_has_examples() {
        let data = FallbackDataset::standard();

        assert_eq!(data.keys.len(), 3);
        assert_eq!(data.providers.len(), 3);
        assert_eq!(data.audit_log.len(), 3);
        assert_eq!(data.packages.len(), 3);
        assert_eq!(data.proxies.len(), 3);
        assert!(data.bank_info.is_none());
    }

    #[test]
    fn test_keys_cover_active_and_expired() {
        let data = FallbackDataset::build(Utc::now());
        let summary = KeySummary::from_keys(&data.keys, data.built_at);

        assert_eq!(summary.total_keys, 3);
        assert_eq!(summary.active_keys, 2);
        assert_eq!(summary.expired_keys, 1);
        assert_eq!(summary.total_credit, 6_000);
        assert_eq!(summary.total_active_credit, 6_000);
    }

    #[test]
    fn test_fallback_keys_decode_as_live_keys() {
        let data = FallbackDataset::standard();
        let encoded = serde_json::to_value(&data.keys).unwrap();

        for key in encoded.as_array().unwrap() {
            assert!(key.get("_id").is_some());
            assert!(key.get("key").is_some());
            assert!(key.get("isActive").is_some());
            assert!(key.get("credit").is_some());
        }

        let decoded: Vec<AdminKey> = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, data.keys);
    }

    #[test]
    fn test_audit_log_is_newest_first() {
        let data = FallbackDataset::standard();
        assert!(
            data.audit_log
                .windows(2)
                .all(|pair| pair[0].timestamp > pair[1].timestamp)
        );
    }

    #[test]
    fn test_proxy_page_filters() {
        let data = FallbackDataset::standard();

        let active = data.proxy_page(&ProxyListQuery {
            status: Some("active".to_string()),
            ..ProxyListQuery::default()
        });
        assert_eq!(active.proxies.len(), 2);
        assert!(active.proxies.iter().all(|p| p.health() != ProxyHealth::Inactive));

        let unassigned = data.proxy_page(&ProxyListQuery {
            assigned: Some("false".to_string()),
            ..ProxyListQuery::default()
        });
        assert_eq!(unassigned.proxies.len(), 1);
        assert_eq!(unassigned.proxies[0].name, "EU West Proxy 1");

        let by_location = data.proxy_page(&ProxyListQuery {
            location: Some("asia pacific".to_string()),
            ..ProxyListQuery::default()
        });
        assert_eq!(by_location.proxies.len(), 1);
    }

    #[test]
    fn test_proxy_page_paginates() {
        let data = FallbackDataset::standard();

        let page = data.proxy_page(&ProxyListQuery {
            page: Some(2),
            limit: Some(2),
            ..ProxyListQuery::default()
        });

        assert_eq!(page.proxies.len(), 1);
        assert_eq!(
            page.pagination,
            Pagination {
                current_page: 2,
                total_pages: 2,
                total_items: 3,
                items_per_page: 2,
            }
        );

        let beyond = data.proxy_page(&ProxyListQuery {
            page: Some(9),
            limit: Some(2),
            ..ProxyListQuery::default()
        });
        assert!(beyond.proxies.is_empty());
    }

    #[test]
    fn test_proxy_stats() {
        let stats = FallbackDataset::standard().proxy_stats();

        assert_eq!(stats.overview.total, 3);
        assert_eq!(stats.overview.active, 2);
        assert_eq!(stats.overview.assigned, 2);
        assert_eq!(stats.overview.available, 1);
        assert_eq!(stats.overview.recent_activity, 1);
    }
}

use crate::fetched::Fetched;
use crate::gateway::Gateway;
use keyadmin_core::{AuditLogEntry, DashboardStats};

impl Gateway {
    /// Administrative audit trail, newest first
    pub async fn list_audit_log(&self) -> Fetched<Vec<AuditLogEntry>> {
        let timeout = self.config().timeout();
        self.read(
            "list_audit_log",
            move || self.get_json("list_audit_log", "/audit-log", timeout),
            |data| data.audit_log.clone(),
        )
        .await
    }

    /// Billing and usage aggregates for the dashboard
    pub async fn dashboard_stats(&self) -> Fetched<DashboardStats> {
        let timeout = self.config().timeout();
        self.read(
            "dashboard_stats",
            move || self.get_json("dashboard_stats", "/stats/dashboard", timeout),
            |data| data.dashboard.clone(),
        )
        .await
    }
}

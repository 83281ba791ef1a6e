//! Dashboard projection.
//!
//! A stateless composition over the client: the four listings are fetched
//! independently so one failing tab never takes down the others, and the
//! counters are recomputed by plain tallying. Nothing here caches; callers
//! refresh on demand.

use tracing::warn;

use crate::client::ReportClient;
use crate::error::ClientError;
use crate::models::{
    AppealStatus, AppealSummary, BannedUser, DashboardStats, Report, ReportStatus,
};

/// One tab's worth of data, or the reason it could not be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum TabData<T> {
    Loaded(Vec<T>),
    Failed(String),
}

impl<T> TabData<T> {
    pub fn as_loaded(&self) -> Option<&[T]> {
        match self {
            Self::Loaded(items) => Some(items),
            Self::Failed(_) => None,
        }
    }

    fn from_result(result: Result<Vec<T>, ClientError>, tab: &str) -> Self {
        match result {
            Ok(items) => Self::Loaded(items),
            Err(err) => {
                warn!("Failed to load {tab}: {err}");
                Self::Failed(err.to_string())
            }
        }
    }
}

/// Everything the dashboard shows, recomputed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    /// Server-computed counters.
    pub stats: DashboardStats,
    /// The pending queue from the dashboard endpoint.
    pub pending: Vec<Report>,
    pub appeals: TabData<AppealSummary>,
    pub resolved: TabData<Report>,
    pub banned: TabData<BannedUser>,
}

/// Stateless projection layer over the client.
#[derive(Clone)]
pub struct DashboardAggregator {
    client: ReportClient,
}

impl DashboardAggregator {
    pub fn new(client: ReportClient) -> Self {
        Self { client }
    }

    /// Fetch all four listings. The dashboard endpoint itself is the one
    /// hard dependency (it carries the stats and the pending queue); each
    /// tab listing may fail on its own and is reported per-tab.
    pub async fn refresh(&self) -> Result<DashboardSnapshot, ClientError> {
        let (dashboard, appeals, resolved, banned) = tokio::join!(
            self.client.fetch_dashboard(),
            self.client.fetch_appeals(),
            self.client.fetch_resolved(),
            self.client.fetch_banned_users(),
        );

        let dashboard = dashboard?;

        Ok(DashboardSnapshot {
            stats: dashboard.stats,
            pending: dashboard.pending_reports,
            appeals: TabData::from_result(appeals, "appeals"),
            resolved: TabData::from_result(resolved, "resolved reports"),
            banned: TabData::from_result(banned, "banned users"),
        })
    }
}

/// Count reports still waiting for an admin (pending or picked up).
pub fn tally_open_reports(reports: &[Report]) -> u64 {
    reports
        .iter()
        .filter(|r| matches!(r.status, ReportStatus::Pending | ReportStatus::Reviewing))
        .count() as u64
}

/// Count appeals still waiting for a decision.
pub fn tally_open_appeals(appeals: &[AppealSummary]) -> u64 {
    appeals
        .iter()
        .filter(|a| a.status == AppealStatus::Pending)
        .count() as u64
}

/// Local recomputation of the counters from the fetched listings. The
/// server's stats stay authoritative; this is what tab badges show when a
/// listing loaded but the stats are stale.
pub fn tally_stats(snapshot: &DashboardSnapshot) -> DashboardStats {
    DashboardStats {
        total_pending: tally_open_reports(&snapshot.pending),
        total_appealed: snapshot
            .appeals
            .as_loaded()
            .map(tally_open_appeals)
            .unwrap_or(snapshot.stats.total_appealed),
        total_resolved_today: snapshot.stats.total_resolved_today,
        total_banned_users: snapshot
            .banned
            .as_loaded()
            .map(|users| users.len() as u64)
            .unwrap_or(snapshot.stats.total_banned_users),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, ReportReason, Timestamp};

    fn report(id: &str, status: ReportStatus) -> Report {
        Report {
            id: id.to_string(),
            reason: ReportReason::Spam,
            status,
            content_type: ContentType::Post,
            reporter_user_id: "u1".to_string(),
            reported_user_id: "u2".to_string(),
            reporter_user_name: None,
            reported_user_name: None,
            content_author_name: None,
            content_preview: None,
            description: None,
            admin_notes: None,
            created_at: Timestamp::from_unix_seconds(1_767_225_600).unwrap(),
            ai_decision: None,
        }
    }

    fn appeal(status: AppealStatus) -> AppealSummary {
        AppealSummary {
            report_id: "r1".to_string(),
            appeal_reason: "please reconsider".to_string(),
            status,
            admin_response: None,
            created_at: Timestamp::from_unix_seconds(1_767_225_600).unwrap(),
            resolved_at: None,
            report_reason: ReportReason::Spam,
            content_type: ContentType::Post,
            reported_user_name: None,
            reporter_user_name: None,
        }
    }

    #[test]
    fn test_tally_open_reports_counts_pending_and_reviewing() {
        let reports = vec![
            report("a", ReportStatus::Pending),
            report("b", ReportStatus::Reviewing),
            report("c", ReportStatus::ResolvedValid),
            report("d", ReportStatus::Appealed),
        ];
        assert_eq!(tally_open_reports(&reports), 2);
    }

    #[test]
    fn test_tally_open_appeals_ignores_resolved() {
        let appeals = vec![
            appeal(AppealStatus::Pending),
            appeal(AppealStatus::Approved),
            appeal(AppealStatus::Rejected),
            appeal(AppealStatus::Pending),
        ];
        assert_eq!(tally_open_appeals(&appeals), 2);
    }

    #[test]
    fn test_tally_stats_falls_back_to_server_on_failed_tab() {
        let snapshot = DashboardSnapshot {
            stats: DashboardStats {
                total_pending: 9,
                total_appealed: 4,
                total_resolved_today: 6,
                total_banned_users: 5,
            },
            pending: vec![report("a", ReportStatus::Pending)],
            appeals: TabData::Failed("HTTP 500".to_string()),
            resolved: TabData::Loaded(vec![]),
            banned: TabData::Loaded(vec![]),
        };

        let stats = tally_stats(&snapshot);
        assert_eq!(stats.total_pending, 1);
        // failed tab keeps the server's number
        assert_eq!(stats.total_appealed, 4);
        // loaded tab recomputes
        assert_eq!(stats.total_banned_users, 0);
        // always server-side: "today" needs the server's clock
        assert_eq!(stats.total_resolved_today, 6);
    }

    #[test]
    fn test_tab_data_as_loaded() {
        let loaded: TabData<Report> = TabData::Loaded(vec![]);
        assert!(loaded.as_loaded().is_some());
        let failed: TabData<Report> = TabData::Failed("boom".to_string());
        assert!(failed.as_loaded().is_none());
    }
}

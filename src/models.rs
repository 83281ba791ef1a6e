//! Wire records for the moderation API.
//!
//! The service speaks camelCase JSON, but a handful of fields arrive in
//! snake_case from older backend paths; serde aliases accept both, the way
//! the original console tolerated either spelling.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Why a report was filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Harassment,
    Inappropriate,
    Fake,
    Impersonation,
    Other,
}

impl fmt::Display for ReportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Spam => "Spam",
            Self::Harassment => "Harassment",
            Self::Inappropriate => "Inappropriate",
            Self::Fake => "Fake / Misleading",
            Self::Impersonation => "Impersonation",
            Self::Other => "Other",
        };
        write!(f, "{label}")
    }
}

/// Lifecycle status of a report. The sole driver of which admin actions
/// are legal; see the state machine module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Reviewing,
    ResolvedValid,
    ResolvedInvalid,
    Appealed,
}

impl ReportStatus {
    /// The wire spelling, also used in submission bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::ResolvedValid => "resolved_valid",
            Self::ResolvedInvalid => "resolved_invalid",
            Self::Appealed => "appealed",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Reviewing => "Reviewing",
            Self::ResolvedValid => "Valid",
            Self::ResolvedInvalid => "Invalid",
            Self::Appealed => "Appealed",
        };
        write!(f, "{label}")
    }
}

/// Kind of content a report targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Post,
    Comment,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post => write!(f, "post"),
            Self::Comment => write!(f, "comment"),
        }
    }
}

/// Status of an appeal. Terminal once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealStatus {
    Pending,
    Approved,
    Rejected,
}

impl AppealStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// A timestamp as the service serializes it: an RFC 3339 string, unix
/// seconds, or unix milliseconds, depending on which backend path wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Display form used across listings and the detail view.
    pub fn format(&self) -> String {
        self.0.format("%-d %b %Y %H:%M").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        let raw = Raw::deserialize(deserializer)?;
        let parsed = match raw {
            Raw::Number(n) => from_unix(n),
            Raw::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| s.parse::<i64>().ok().and_then(from_unix)),
        };
        parsed
            .map(Timestamp)
            .ok_or_else(|| D::Error::custom("unrecognized timestamp"))
    }
}

/// Unix timestamps over 1e12 can only be milliseconds.
fn from_unix(n: i64) -> Option<DateTime<Utc>> {
    if n > 1_000_000_000_000 {
        Utc.timestamp_millis_opt(n).single()
    } else {
        Utc.timestamp_opt(n, 0).single()
    }
}

/// A report as the listing and detail endpoints return it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub reason: ReportReason,
    pub status: ReportStatus,
    pub content_type: ContentType,
    #[serde(alias = "reporter_user_id")]
    pub reporter_user_id: String,
    #[serde(alias = "reported_user_id")]
    pub reported_user_id: String,
    #[serde(default)]
    pub reporter_user_name: Option<String>,
    #[serde(default)]
    pub reported_user_name: Option<String>,
    #[serde(default)]
    pub content_author_name: Option<String>,
    #[serde(default)]
    pub content_preview: Option<String>,
    /// Reporter's free-text explanation.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "admin_notes")]
    pub admin_notes: Option<String>,
    #[serde(alias = "created_at")]
    pub created_at: Timestamp,
    /// Embedded automated-analysis payload, verbatim. Parse with
    /// [`Report::ai_decision`].
    #[serde(default, alias = "ai_decision")]
    pub ai_decision: Option<String>,
}

impl Report {
    /// Parse the embedded analysis payload, if any.
    ///
    /// Malformed payloads are treated as absent: the analysis is advisory
    /// and must never block rendering a report.
    pub fn ai_decision(&self) -> Option<AiDecision> {
        let raw = self.ai_decision.as_deref()?;
        serde_json::from_str(raw).ok()
    }
}

/// Automated pre-screening verdict embedded in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiDecision {
    #[serde(default, alias = "isValid")]
    pub is_violation: bool,
    /// Confidence in [0, 1], when the analyzer reported one.
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub suggested_action: Option<String>,
}

/// An appeal attached to a report in `appealed` status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appeal {
    #[serde(alias = "report_id")]
    pub report_id: String,
    #[serde(alias = "appeal_reason")]
    pub appeal_reason: String,
    pub status: AppealStatus,
    #[serde(default, alias = "admin_response")]
    pub admin_response: Option<String>,
    #[serde(alias = "created_at")]
    pub created_at: Timestamp,
    #[serde(default, alias = "resolved_at")]
    pub resolved_at: Option<Timestamp>,
}

/// An appeal as the appeals listing returns it: the appeal plus enough of
/// the underlying report to render a card without a second fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealSummary {
    #[serde(alias = "report_id")]
    pub report_id: String,
    #[serde(alias = "appeal_reason")]
    pub appeal_reason: String,
    pub status: AppealStatus,
    #[serde(default, alias = "admin_response")]
    pub admin_response: Option<String>,
    #[serde(alias = "created_at")]
    pub created_at: Timestamp,
    #[serde(default, alias = "resolved_at")]
    pub resolved_at: Option<Timestamp>,
    pub report_reason: ReportReason,
    pub content_type: ContentType,
    #[serde(default)]
    pub reported_user_name: Option<String>,
    #[serde(default)]
    pub reporter_user_name: Option<String>,
}

/// One recorded violation against a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strike {
    pub reason: String,
    #[serde(alias = "created_at")]
    pub created_at: Timestamp,
}

/// A user currently banned by strike accumulation. Destroyed only via the
/// strike-reset transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannedUser {
    #[serde(alias = "user_id")]
    pub user_id: String,
    #[serde(alias = "user_name")]
    pub user_name: String,
    #[serde(default, alias = "avatar_url")]
    pub avatar_url: Option<String>,
    #[serde(alias = "strike_count")]
    pub strike_count: u32,
    /// Unix seconds.
    #[serde(alias = "banned_at")]
    pub banned_at: i64,
    pub reason: String,
    #[serde(default)]
    pub strikes: Vec<Strike>,
}

/// Point-in-time copy of the reported content, captured when the report
/// was filed. The content may have been edited or deleted since; every
/// field is optional and consumers degrade gracefully.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub hashtags: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_avatar_url: Option<String>,
}

/// The detail join: report, content snapshot, and the appeal if one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDetail {
    pub report: Report,
    #[serde(default)]
    pub content: ContentSnapshot,
    #[serde(default)]
    pub appeal: Option<Appeal>,
}

/// Server-computed dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_pending: u64,
    pub total_appealed: u64,
    pub total_resolved_today: u64,
    pub total_banned_users: u64,
}

/// Dashboard endpoint payload: counters plus the pending queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub stats: DashboardStats,
    #[serde(default)]
    pub pending_reports: Vec<Report>,
}

/// Outcome of asking the service to run automated analysis on the next
/// queued report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub message: String,
}

//! State types for the review state machine.
//!
//! A case is a report together with its appeal, if one exists. Following
//! "make illegal states unrepresentable", the enum captures exactly the
//! combinations the server can hand us: an appeal only rides on a report in
//! `appealed` status, and nowhere else.

use crate::models::{Appeal, AppealStatus, Report, ReportStatus};
use std::fmt;

/// Client-side view of a case's position in the review lifecycle.
///
/// Reports move `pending -> reviewing -> {resolved_valid, resolved_invalid}`
/// under admin action, and `pending|reviewing -> appealed` server-side when
/// the reported user files an appeal. Appeals move
/// `pending -> {approved, rejected}` and are then terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    /// Filed, not yet picked up.
    Pending,
    /// An admin has started looking at it.
    Reviewing,
    /// Resolved as a valid report (terminal for the report itself).
    ResolvedValid,
    /// Resolved as an invalid report (terminal for the report itself).
    ResolvedInvalid,
    /// The reported user appealed. `appeal` is None when the appeal record
    /// has not arrived yet (the status flips before the record is readable);
    /// nothing is actionable until it does.
    Appealed { appeal: Option<AppealStatus> },
}

impl CaseState {
    /// Derive the case state from server projections.
    ///
    /// The appeal is consulted only when the report says `appealed`: the
    /// server may keep resolved appeals around for history, and those must
    /// not resurrect an already-settled case.
    pub fn of(report: &Report, appeal: Option<&Appeal>) -> Self {
        match report.status {
            ReportStatus::Pending => Self::Pending,
            ReportStatus::Reviewing => Self::Reviewing,
            ReportStatus::ResolvedValid => Self::ResolvedValid,
            ReportStatus::ResolvedInvalid => Self::ResolvedInvalid,
            ReportStatus::Appealed => Self::Appealed {
                appeal: appeal.map(|a| a.status),
            },
        }
    }

    /// True when `ReviewReport` is legal from this state.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, Self::Pending | Self::Reviewing)
    }

    /// True when `ReviewAppeal` is legal from this state.
    pub fn has_pending_appeal(&self) -> bool {
        matches!(
            self,
            Self::Appealed {
                appeal: Some(AppealStatus::Pending)
            }
        )
    }

    /// True when no further admin action applies to this case.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ResolvedValid
                | Self::ResolvedInvalid
                | Self::Appealed {
                    appeal: Some(AppealStatus::Approved) | Some(AppealStatus::Rejected)
                }
        )
    }

    /// The report status this state corresponds to, for messages.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::ResolvedValid => "resolved_valid",
            Self::ResolvedInvalid => "resolved_invalid",
            Self::Appealed { .. } => "appealed",
        }
    }
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_label())
    }
}

/// The two ways an admin can resolve a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    ResolvedValid,
    ResolvedInvalid,
}

impl ReviewDecision {
    /// Wire spelling for the admin-review submission body.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolvedValid => "resolved_valid",
            Self::ResolvedInvalid => "resolved_invalid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "resolved_valid" | "valid" => Some(Self::ResolvedValid),
            "resolved_invalid" | "invalid" => Some(Self::ResolvedInvalid),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, ReportReason, Timestamp};

    fn report(status: ReportStatus) -> Report {
        Report {
            id: "r1".to_string(),
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

    fn appeal(status: AppealStatus) -> Appeal {
        Appeal {
            report_id: "r1".to_string(),
            appeal_reason: "it was satire".to_string(),
            status,
            admin_response: None,
            created_at: Timestamp::from_unix_seconds(1_767_312_000).unwrap(),
            resolved_at: None,
        }
    }

    #[test]
    fn test_case_state_follows_report_status() {
        assert_eq!(CaseState::of(&report(ReportStatus::Pending), None), CaseState::Pending);
        assert_eq!(
            CaseState::of(&report(ReportStatus::Reviewing), None),
            CaseState::Reviewing
        );
        assert_eq!(
            CaseState::of(&report(ReportStatus::ResolvedValid), None),
            CaseState::ResolvedValid
        );
    }

    #[test]
    fn test_appeal_only_counts_on_appealed_reports() {
        // A stale appeal record alongside a resolved report must not make
        // the case look appealable again.
        let state = CaseState::of(
            &report(ReportStatus::ResolvedValid),
            Some(&appeal(AppealStatus::Pending)),
        );
        assert_eq!(state, CaseState::ResolvedValid);
        assert!(!state.has_pending_appeal());
    }

    #[test]
    fn test_appealed_without_record_is_not_actionable() {
        let state = CaseState::of(&report(ReportStatus::Appealed), None);
        assert_eq!(state, CaseState::Appealed { appeal: None });
        assert!(!state.has_pending_appeal());
        assert!(!state.is_reviewable());
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_pending_appeal_is_actionable() {
        let state = CaseState::of(
            &report(ReportStatus::Appealed),
            Some(&appeal(AppealStatus::Pending)),
        );
        assert!(state.has_pending_appeal());
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_resolved_appeal_is_terminal() {
        for resolved in [AppealStatus::Approved, AppealStatus::Rejected] {
            let state =
                CaseState::of(&report(ReportStatus::Appealed), Some(&appeal(resolved)));
            assert!(state.is_terminal());
            assert!(!state.has_pending_appeal());
        }
    }

    #[test]
    fn test_review_decision_parse() {
        assert_eq!(
            ReviewDecision::parse("resolved_valid"),
            Some(ReviewDecision::ResolvedValid)
        );
        assert_eq!(ReviewDecision::parse("invalid"), Some(ReviewDecision::ResolvedInvalid));
        assert_eq!(ReviewDecision::parse("appealed"), None);
    }
}

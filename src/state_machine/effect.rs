//! Transition plans: what a validated action asks the workflow to do.
//!
//! A plan is data, not behavior. The single moderation request to issue
//! comes first; the implied effects describe what the server is expected to
//! do as a consequence (strike bookkeeping, unban), so callers can report
//! them without re-deriving policy.

use super::state::ReviewDecision;

/// Result of a successful transition validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// The request the workflow must issue.
    pub request: ModerationRequest,
    /// Consequences the server applies if the request lands.
    pub implied: Vec<ImpliedEffect>,
}

/// The one API submission a transition maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationRequest {
    AdminReview {
        report_id: String,
        decision: ReviewDecision,
        notes: String,
        should_strike: bool,
    },
    AppealReview {
        report_id: String,
        approved: bool,
        admin_response: String,
    },
    StrikeReset {
        user_id: String,
        message: String,
    },
}

/// Server-side consequences implied by a transition. The policy thresholds
/// (how many strikes ban a user) are the server's; the client only names
/// the effects it expects to observe on the next refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpliedEffect {
    /// The reported user's strike count increments and may cross the ban
    /// threshold.
    StrikeIssued { user_id: String },
    /// The strike from the original resolution is reversed.
    StrikeReversed { user_id: String },
    /// The user's entire strike history is cleared.
    StrikesCleared { user_id: String },
    /// The user leaves the banned listing.
    UserUnbanned { user_id: String },
    /// Counters and listings are stale; recompute the projection.
    RefreshDashboard,
}

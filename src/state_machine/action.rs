//! Actions an admin can request against a case or a banned user.
//!
//! Actions are inputs to the pure transition function; they carry exactly
//! what the operator typed, unvalidated. Validation happens in one place,
//! in [`super::transition::transition`].

use super::state::ReviewDecision;

/// All admin-initiated transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    /// Resolve a pending/reviewing report.
    ReviewReport {
        decision: ReviewDecision,
        /// Optional notes about the decision, kept with the report.
        notes: String,
        /// Issue a strike against the reported user. Only meaningful with
        /// a `resolved_valid` decision.
        should_strike: bool,
    },

    /// Resolve a pending appeal. Approval reverses the prior strike.
    ReviewAppeal {
        approved: bool,
        /// Mandatory explanation surfaced to the end user.
        admin_response: String,
    },

    /// Clear a banned user's strike history and unban them. Irreversible;
    /// `confirmed` is the operator's explicit yes.
    ResetStrikes {
        user_id: String,
        /// Mandatory explanation surfaced to the end user.
        message: String,
        confirmed: bool,
    },
}

impl AdminAction {
    /// Short name for logging.
    pub fn log_summary(&self) -> String {
        match self {
            Self::ReviewReport {
                decision,
                should_strike,
                ..
            } => format!("ReviewReport {{ decision: {decision}, strike: {should_strike} }}"),
            Self::ReviewAppeal { approved, .. } => {
                format!("ReviewAppeal {{ approved: {approved} }}")
            }
            Self::ResetStrikes { user_id, .. } => {
                format!("ResetStrikes {{ user: {user_id} }}")
            }
        }
    }
}

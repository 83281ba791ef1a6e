//! The review workflow: validate, submit, report consequences.
//!
//! Control flow for every admin action is the same: the state machine
//! validates the requested transition, the client issues the one request
//! the plan names, and the caller refreshes the dashboard. Local validation
//! failures never reach the network.
//!
//! The workflow also carries the duplicate-submission guard: once a
//! decision for a case went out this session, the control is disabled
//! locally. Anything beyond that (a second operator, a crashed retry) is
//! the server's to reject with a conflict.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::info;

use crate::client::ReportClient;
use crate::dashboard::{DashboardAggregator, DashboardSnapshot};
use crate::error::{ActionError, ClientError, ValidationError};
use crate::models::{Appeal, BannedUser, Report};
use crate::state_machine::{
    transition, AdminAction, ImpliedEffect, ModerationRequest, ReviewDecision, Subject,
    TransitionPlan,
};

/// Drives admin actions end to end.
pub struct ReviewWorkflow {
    client: ReportClient,
    aggregator: DashboardAggregator,
    /// Report ids (or user ids for resets) already submitted this session.
    submitted: Mutex<HashSet<String>>,
}

impl ReviewWorkflow {
    pub fn new(client: ReportClient) -> Self {
        let aggregator = DashboardAggregator::new(client.clone());
        Self {
            client,
            aggregator,
            submitted: Mutex::new(HashSet::new()),
        }
    }

    pub fn client(&self) -> &ReportClient {
        &self.client
    }

    /// Recompute the dashboard projection.
    pub async fn refresh(&self) -> Result<DashboardSnapshot, ClientError> {
        self.aggregator.refresh().await
    }

    /// Resolve a report. `should_strike` is only honored with a
    /// `resolved_valid` decision; the state machine rejects the other
    /// combination before any request is built.
    pub async fn review_report(
        &self,
        report: &Report,
        appeal: Option<&Appeal>,
        decision: ReviewDecision,
        notes: &str,
        should_strike: bool,
    ) -> Result<Vec<ImpliedEffect>, ActionError> {
        let plan = transition(
            &Subject::Case { report, appeal },
            &AdminAction::ReviewReport {
                decision,
                notes: notes.to_string(),
                should_strike,
            },
        )?;
        self.execute(&report.id, plan).await
    }

    /// Resolve a pending appeal. Approval reverses the original strike.
    pub async fn review_appeal(
        &self,
        report: &Report,
        appeal: Option<&Appeal>,
        approved: bool,
        admin_response: &str,
    ) -> Result<Vec<ImpliedEffect>, ActionError> {
        let plan = transition(
            &Subject::Case { report, appeal },
            &AdminAction::ReviewAppeal {
                approved,
                admin_response: admin_response.to_string(),
            },
        )?;
        self.execute(&report.id, plan).await
    }

    /// Clear a banned user's strikes and unban them. Irreversible;
    /// `confirmed` must carry the operator's explicit yes.
    pub async fn reset_strikes(
        &self,
        banned: &[BannedUser],
        user_id: &str,
        message: &str,
        confirmed: bool,
    ) -> Result<Vec<ImpliedEffect>, ActionError> {
        let plan = transition(
            &Subject::User { user_id, banned },
            &AdminAction::ResetStrikes {
                user_id: user_id.to_string(),
                message: message.to_string(),
                confirmed,
            },
        )?;
        self.execute(user_id, plan).await
    }

    async fn execute(
        &self,
        subject_id: &str,
        plan: TransitionPlan,
    ) -> Result<Vec<ImpliedEffect>, ActionError> {
        {
            let mut submitted = self.submitted.lock().expect("mutex poisoned");
            if !submitted.insert(subject_id.to_string()) {
                return Err(ValidationError::AlreadySubmitted.into());
            }
        }

        let result = match &plan.request {
            ModerationRequest::AdminReview {
                report_id,
                decision,
                notes,
                should_strike,
            } => {
                self.client
                    .submit_review(report_id, *decision, notes, *should_strike)
                    .await
            }
            ModerationRequest::AppealReview {
                report_id,
                approved,
                admin_response,
            } => {
                self.client
                    .submit_appeal_review(report_id, *approved, admin_response)
                    .await
            }
            ModerationRequest::StrikeReset { user_id, message } => {
                self.client.submit_strike_reset(user_id, message).await
            }
        };

        if let Err(err) = result {
            // The submission never landed; re-enable the control so the
            // operator can retry after fixing whatever failed. A conflict
            // stays disabled: the case moved on without us.
            if !matches!(err, ClientError::Conflict { .. }) {
                self.submitted
                    .lock()
                    .expect("mutex poisoned")
                    .remove(subject_id);
            }
            return Err(err.into());
        }

        info!("Action on {subject_id} submitted");
        Ok(plan.implied)
    }
}

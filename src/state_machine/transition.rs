//! Pure transition-validation function.
//!
//! This is the single legality entry point for admin actions: every action
//! handler goes through [`transition`] before anything touches the network.
//! The function is pure and total — any (subject, action) pair yields
//! either a plan or a `ValidationError`, never a panic.

use super::action::AdminAction;
use super::effect::{ImpliedEffect, ModerationRequest, TransitionPlan};
use super::state::{CaseState, ReviewDecision};
use crate::error::ValidationError;
use crate::models::{Appeal, BannedUser, Report};

/// What an action is aimed at.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// A report case: the report plus its appeal record, if one exists.
    Case {
        report: &'a Report,
        appeal: Option<&'a Appeal>,
    },
    /// A user, judged against the current banned listing.
    User {
        user_id: &'a str,
        banned: &'a [BannedUser],
    },
}

/// Validate an admin action against the current state and plan its
/// execution.
///
/// Local validation failures never issue a request; the server stays
/// authoritative for everything that passes (it answers a conflict when
/// state moved underneath us).
pub fn transition(
    subject: &Subject<'_>,
    action: &AdminAction,
) -> Result<TransitionPlan, ValidationError> {
    match (subject, action) {
        (
            Subject::Case { report, appeal },
            AdminAction::ReviewReport {
                decision,
                notes,
                should_strike,
            },
        ) => {
            let state = CaseState::of(report, *appeal);
            if !state.is_reviewable() {
                return Err(ValidationError::ReportNotReviewable {
                    status: state.status_label().to_string(),
                });
            }
            if *should_strike && *decision == ReviewDecision::ResolvedInvalid {
                return Err(ValidationError::StrikeOnInvalidDecision);
            }

            let mut implied = Vec::new();
            if *should_strike && *decision == ReviewDecision::ResolvedValid {
                implied.push(ImpliedEffect::StrikeIssued {
                    user_id: report.reported_user_id.clone(),
                });
            }
            implied.push(ImpliedEffect::RefreshDashboard);

            Ok(TransitionPlan {
                request: ModerationRequest::AdminReview {
                    report_id: report.id.clone(),
                    decision: *decision,
                    notes: notes.clone(),
                    should_strike: *should_strike,
                },
                implied,
            })
        }

        (
            Subject::Case { report, appeal },
            AdminAction::ReviewAppeal {
                approved,
                admin_response,
            },
        ) => {
            let state = CaseState::of(report, *appeal);
            if !state.has_pending_appeal() {
                return Err(ValidationError::NoPendingAppeal);
            }
            if admin_response.trim().is_empty() {
                return Err(ValidationError::EmptyAdminResponse);
            }

            let mut implied = Vec::new();
            if *approved {
                // Approval reverses the strike from the original resolution;
                // rejection leaves resolution and strike intact.
                implied.push(ImpliedEffect::StrikeReversed {
                    user_id: report.reported_user_id.clone(),
                });
            }
            implied.push(ImpliedEffect::RefreshDashboard);

            Ok(TransitionPlan {
                request: ModerationRequest::AppealReview {
                    report_id: report.id.clone(),
                    approved: *approved,
                    admin_response: admin_response.trim().to_string(),
                },
                implied,
            })
        }

        (
            Subject::User { user_id, banned },
            AdminAction::ResetStrikes {
                user_id: target,
                message,
                confirmed,
            },
        ) => {
            if *user_id != target.as_str() || !banned.iter().any(|u| u.user_id == *target) {
                return Err(ValidationError::UserNotBanned {
                    user_id: target.clone(),
                });
            }
            if message.trim().is_empty() {
                return Err(ValidationError::EmptyResetMessage);
            }
            if !confirmed {
                return Err(ValidationError::ConfirmationRequired);
            }

            Ok(TransitionPlan {
                request: ModerationRequest::StrikeReset {
                    user_id: target.clone(),
                    message: message.trim().to_string(),
                },
                implied: vec![
                    ImpliedEffect::StrikesCleared {
                        user_id: target.clone(),
                    },
                    ImpliedEffect::UserUnbanned {
                        user_id: target.clone(),
                    },
                    ImpliedEffect::RefreshDashboard,
                ],
            })
        }

        // A report action aimed at a user, or a user action aimed at a case.
        (Subject::User { .. }, AdminAction::ReviewReport { .. })
        | (Subject::User { .. }, AdminAction::ReviewAppeal { .. })
        | (Subject::Case { .. }, AdminAction::ResetStrikes { .. }) => {
            Err(ValidationError::WrongSubject)
        }
    }
}

//! Error taxonomy for the review console.
//!
//! Errors are split by where they originate: `AuthError` at initial login,
//! `SessionError` for an established session going bad, `ValidationError`
//! for local preconditions that must block a request before it leaves the
//! client, and `ClientError` for everything the API surface can return.

use thiserror::Error;

/// Failure of an explicit login attempt.
///
/// A failed login never touches existing session state: the operator
/// corrects the credentials and tries again.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The service rejected the credentials (401/403).
    #[error("invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// The service answered with an unexpected status.
    #[error("login failed: HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// No response from the service at all.
    #[error("login request failed")]
    Transport(#[from] reqwest::Error),
}

/// Failure of an already-established session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The token was rejected and re-authentication did not recover it.
    /// The session has been fully cleared; the operator must log in again.
    #[error("session expired, please log in again")]
    Expired,

    /// Network-level failure, no response received. The operation is
    /// abandoned; the operator may retry manually.
    #[error("network error")]
    Transport(#[source] reqwest::Error),
}

/// A local precondition failed. No request was issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `ReviewReport` on a report that is no longer open for review.
    #[error("report is {status} and can no longer be reviewed")]
    ReportNotReviewable { status: String },

    /// `ReviewAppeal` on a report without a pending appeal.
    #[error("no pending appeal to review for this report")]
    NoPendingAppeal,

    /// A strike cannot accompany an `resolved_invalid` decision.
    #[error("a strike can only be issued with a resolved_valid decision")]
    StrikeOnInvalidDecision,

    /// The mandatory explanation shown to the end user is missing.
    #[error("a response to the user is required")]
    EmptyAdminResponse,

    /// The mandatory reset explanation is missing.
    #[error("a message explaining the reset is required")]
    EmptyResetMessage,

    /// `ResetStrikes` on a user who is not currently banned.
    #[error("user {user_id} is not banned")]
    UserNotBanned { user_id: String },

    /// Strike reset is irreversible and needs explicit operator confirmation.
    #[error("strike reset requires confirmation")]
    ConfirmationRequired,

    /// The action does not apply to this kind of subject (a report action
    /// aimed at a user, or vice versa).
    #[error("action does not apply to this subject")]
    WrongSubject,

    /// The control for this case was already used this session; the server
    /// is the authority on whether the first submission landed.
    #[error("a decision for this case was already submitted")]
    AlreadySubmitted,
}

/// Failure of a typed API operation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The server rejected a transition because state changed underneath us.
    /// Surfaced verbatim; the dashboard should be refreshed to reconcile.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Any other non-2xx answer, with the server message when it sent one.
    #[error("{}", Self::api_display(*status, message.as_deref()))]
    Api { status: u16, message: Option<String> },

    /// The response body did not parse as the expected record.
    #[error("malformed response body")]
    Decode(#[source] reqwest::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    fn api_display(status: u16, message: Option<&str>) -> String {
        match message {
            Some(m) => m.to_string(),
            None => format!("HTTP {status}"),
        }
    }
}

/// Failure of a complete admin action (validate, submit).
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

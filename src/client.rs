//! Typed operations against the moderation API.
//!
//! Every method goes through the session pipeline (bearer injection and
//! 401 recovery happen there) and maps the response into the error
//! taxonomy: 409 is a conflict surfaced verbatim, any other non-2xx is
//! surfaced with the server's `{message}` when it sent one.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ClientError, SessionError};
use crate::models::{
    AppealSummary, BannedUser, DashboardData, ProcessOutcome, Report, ReportDetail,
};
use crate::session::{session_error, SessionManager};
use crate::state_machine::ReviewDecision;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminReviewRequest<'a> {
    status: &'a str,
    notes: &'a str,
    should_strike: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppealReviewRequest<'a> {
    approved: bool,
    admin_response: &'a str,
}

#[derive(Debug, Serialize)]
struct StrikeResetRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the admin surface of the moderation service.
#[derive(Clone)]
pub struct ReportClient {
    session: SessionManager,
}

impl ReportClient {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub async fn fetch_dashboard(&self) -> Result<DashboardData, ClientError> {
        self.get("/api/reports/admin/dashboard").await
    }

    pub async fn fetch_appeals(&self) -> Result<Vec<AppealSummary>, ClientError> {
        self.get("/api/reports/admin/appeals").await
    }

    pub async fn fetch_resolved(&self) -> Result<Vec<Report>, ClientError> {
        self.get("/api/reports/admin/resolved").await
    }

    pub async fn fetch_banned_users(&self) -> Result<Vec<BannedUser>, ClientError> {
        self.get("/api/reports/admin/banned-users").await
    }

    /// The detail join: report, point-in-time content snapshot, and the
    /// appeal if one exists. Snapshot fields may all be absent when the
    /// content was edited or deleted since the report was filed.
    pub async fn fetch_report_detail(&self, report_id: &str) -> Result<ReportDetail, ClientError> {
        self.get(&format!("/api/reports/{report_id}/content")).await
    }

    pub async fn submit_review(
        &self,
        report_id: &str,
        decision: ReviewDecision,
        notes: &str,
        should_strike: bool,
    ) -> Result<(), ClientError> {
        info!(
            "Submitting review for report {report_id}: {decision} (strike: {should_strike})"
        );
        self.post_no_content(
            &format!("/api/reports/{report_id}/admin-review"),
            &AdminReviewRequest {
                status: decision.as_str(),
                notes,
                should_strike,
            },
        )
        .await
    }

    pub async fn submit_appeal_review(
        &self,
        report_id: &str,
        approved: bool,
        admin_response: &str,
    ) -> Result<(), ClientError> {
        info!("Submitting appeal review for report {report_id}: approved={approved}");
        self.post_no_content(
            &format!("/api/reports/{report_id}/appeal-review"),
            &AppealReviewRequest {
                approved,
                admin_response,
            },
        )
        .await
    }

    pub async fn submit_strike_reset(
        &self,
        user_id: &str,
        message: &str,
    ) -> Result<(), ClientError> {
        info!("Resetting strikes for user {user_id}");
        self.post_no_content(
            &format!("/api/reports/admin/reset-strikes/{user_id}"),
            &StrikeResetRequest { message },
        )
        .await
    }

    /// Ask the service to run automated analysis on the next queued report.
    pub async fn process_next_report(&self) -> Result<ProcessOutcome, ClientError> {
        let url = self.session.endpoint("/api/reports/process-next");
        let response = self
            .session
            .http()
            .post(&url)
            .send()
            .await
            .map_err(session_error)?;
        let response = check_status(response).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.session.endpoint(path);
        let response = self
            .session
            .http()
            .get(&url)
            .send()
            .await
            .map_err(session_error)?;
        let response = check_status(response).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    async fn post_no_content<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        let url = self.session.endpoint(path);
        let response = self
            .session
            .http()
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(session_error)?;
        check_status(response).await?;
        Ok(())
    }
}

/// Map a non-2xx response into the error taxonomy.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // A 401 surviving the pipeline means re-authentication succeeded but
    // the service still refuses the token; treat it as an expired session.
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ClientError::Session(SessionError::Expired));
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message);

    if status == reqwest::StatusCode::CONFLICT {
        return Err(ClientError::Conflict {
            message: message.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        });
    }

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

//! Pure state-to-markup rendering.
//!
//! Every function here is a pure projection from fetched records to an HTML
//! fragment; nothing touches the network or any mutable state. Optional
//! fields omit their sections entirely — a report whose content was deleted
//! still renders, just shorter.

use std::fmt::Write as _;

use crate::models::{
    AiDecision, AppealStatus, AppealSummary, BannedUser, Report, ReportDetail, Timestamp,
};

/// Minimal HTML escaping for text interpolated into markup.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn banned_at_label(unix_seconds: i64) -> String {
    Timestamp::from_unix_seconds(unix_seconds)
        .map(|t| t.format())
        .unwrap_or_default()
}

/// One card in a report listing.
pub fn render_report_card(report: &Report) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<div class=\"report-card\" data-report-id=\"{id}\">\
         <div class=\"report-card-header\">\
         <span class=\"reason-badge\">{reason}</span>\
         <span class=\"status-badge\">{status}</span>\
         <span class=\"report-card-type\">{content_type}</span>\
         </div>",
        id = escape_html(&report.id),
        reason = report.reason,
        status = report.status,
        content_type = report.content_type,
    );

    let reporter = report
        .reporter_user_name
        .as_deref()
        .unwrap_or(&report.reporter_user_id);
    let reported = report
        .reported_user_name
        .as_deref()
        .unwrap_or(&report.reported_user_id);
    let _ = write!(
        html,
        "<div class=\"report-card-users\">\
         <span>Reporter: <strong>{}</strong></span>\
         <span>Reported: <strong>{}</strong></span>\
         </div>",
        escape_html(reporter),
        escape_html(reported),
    );

    if let Some(preview) = &report.content_preview {
        let _ = write!(
            html,
            "<div class=\"report-card-preview\">{}</div>",
            escape_html(preview)
        );
    }
    if let Some(description) = &report.description {
        let _ = write!(
            html,
            "<div class=\"report-card-meta\"><span>{}</span></div>",
            escape_html(description)
        );
    }

    let _ = write!(
        html,
        "<div class=\"report-card-meta\"><span>{}</span></div></div>",
        report.created_at.format()
    );
    html
}

/// A report listing, or an empty state when there is nothing to show.
pub fn render_report_list(reports: &[Report], empty_label: &str) -> String {
    if reports.is_empty() {
        return format!(
            "<div class=\"empty-state\">No {}</div>",
            escape_html(empty_label)
        );
    }
    reports.iter().map(render_report_card).collect()
}

fn appeal_status_label(status: AppealStatus) -> &'static str {
    match status {
        AppealStatus::Pending => "Pending Review",
        AppealStatus::Approved => "Approved",
        AppealStatus::Rejected => "Rejected",
    }
}

/// One card in the appeals listing.
pub fn render_appeal_card(appeal: &AppealSummary) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<div class=\"report-card\" data-report-id=\"{id}\">\
         <div class=\"report-card-header\">\
         <span class=\"reason-badge\">{reason}</span>\
         <span class=\"appeal-status-badge\">{status}</span>\
         <span class=\"report-card-type\">{content_type}</span>\
         </div>\
         <div class=\"report-card-preview\">{appeal_reason}</div>",
        id = escape_html(&appeal.report_id),
        reason = appeal.report_reason,
        status = appeal_status_label(appeal.status),
        content_type = appeal.content_type,
        appeal_reason = escape_html(&appeal.appeal_reason),
    );

    if let Some(response) = &appeal.admin_response {
        let _ = write!(
            html,
            "<div class=\"admin-response-preview\"><span class=\"admin-label\">Admin:</span> {}</div>",
            escape_html(response)
        );
    }

    let _ = write!(
        html,
        "<div class=\"report-card-meta\"><span>Appealed: {}</span>",
        appeal.created_at.format()
    );
    if let Some(resolved_at) = &appeal.resolved_at {
        let _ = write!(html, "<span>Resolved: {}</span>", resolved_at.format());
    }
    html.push_str("</div></div>");
    html
}

/// One card in the banned-users listing, strike history included.
pub fn render_banned_user_card(user: &BannedUser) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<div class=\"banned-user-card\" data-user-id=\"{id}\">\
         <div class=\"banned-user-name\">{name}</div>\
         <div class=\"banned-user-meta\">ID: {id} &middot; Strikes: {strikes} &middot; Banned: {banned_at}</div>\
         <div class=\"banned-user-reason\"><strong>Ban reason:</strong> {reason}</div>",
        id = escape_html(&user.user_id),
        name = escape_html(&user.user_name),
        strikes = user.strike_count,
        banned_at = banned_at_label(user.banned_at),
        reason = escape_html(&user.reason),
    );

    if !user.strikes.is_empty() {
        html.push_str("<div class=\"strikes-list\"><h4>Strike History</h4>");
        for (i, strike) in user.strikes.iter().enumerate() {
            let _ = write!(
                html,
                "<div class=\"strike-item\">\
                 <span class=\"strike-number\">#{n}</span>\
                 <span class=\"strike-reason\">{reason}</span>\
                 <span class=\"strike-date\">{date}</span>\
                 </div>",
                n = i + 1,
                reason = escape_html(&strike.reason),
                date = strike.created_at.format(),
            );
        }
        html.push_str("</div>");
    }

    html.push_str("</div>");
    html
}

fn render_ai_section(decision: &AiDecision) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"detail-section\"><h3>AI Analysis</h3><div class=\"ai-decision\">");

    let verdict = if decision.is_violation {
        "AI found violation"
    } else {
        "AI found no violation"
    };
    let _ = write!(html, "<div class=\"ai-decision-result\">{verdict}");
    if let Some(confidence) = decision.confidence {
        let _ = write!(html, " ({:.0}% confidence)", confidence * 100.0);
    }
    html.push_str("</div>");

    if let Some(reasoning) = &decision.reasoning {
        let _ = write!(
            html,
            "<div class=\"ai-decision-reasoning\">{}</div>",
            escape_html(reasoning)
        );
    }
    if let Some(action) = &decision.suggested_action {
        let _ = write!(
            html,
            "<div class=\"ai-decision-action\">Suggested: <strong>{}</strong></div>",
            escape_html(action)
        );
    }

    html.push_str("</div></div>");
    html
}

/// The full detail view for one case.
///
/// Sections render only when their data exists: no reporter description, no
/// section; content deleted since the report was filed, just the header of
/// an empty content box. Never an error fragment.
pub fn render_detail(detail: &ReportDetail) -> String {
    let report = &detail.report;
    let content = &detail.content;
    let mut html = String::new();

    let _ = write!(
        html,
        "<div class=\"detail-header\">\
         <h2>Report: {reason}</h2>\
         <div class=\"detail-meta\">\
         <span class=\"reason-badge\">{reason}</span>\
         <span class=\"status-badge\">{status}</span>\
         <span class=\"report-card-type\">{content_type}</span>\
         </div></div>",
        reason = report.reason,
        status = report.status,
        content_type = report.content_type,
    );

    // People involved
    let author = content
        .user_name
        .as_deref()
        .unwrap_or(&report.reported_user_id);
    let _ = write!(
        html,
        "<div class=\"detail-section\"><h3>People involved</h3>\
         <div class=\"detail-users\">\
         <div class=\"detail-user\"><strong>{}</strong> — reported user (author)</div>\
         <div class=\"detail-user\"><strong>{}</strong> — reporter</div>\
         </div></div>",
        escape_html(author),
        escape_html(&report.reporter_user_id),
    );

    // Reported content snapshot
    let heading = match report.content_type {
        crate::models::ContentType::Post => "Reported Post",
        crate::models::ContentType::Comment => "Reported Comment",
    };
    let _ = write!(
        html,
        "<div class=\"detail-section\"><h3>{heading}</h3><div class=\"detail-content-box\">"
    );
    if let Some(text) = &content.content {
        let _ = write!(
            html,
            "<div class=\"detail-content-text\">{}</div>",
            escape_html(text)
        );
    }
    if let Some(media_url) = &content.media_url {
        let _ = write!(
            html,
            "<div class=\"detail-content-image\"><img src=\"{}\" alt=\"\"></div>",
            escape_html(media_url)
        );
    }
    if let Some(category) = &content.category {
        let _ = write!(
            html,
            "<div class=\"detail-content-category\">Category: <strong>{}</strong></div>",
            escape_html(category)
        );
    }
    html.push_str("</div></div>");

    if let Some(description) = &report.description {
        let _ = write!(
            html,
            "<div class=\"detail-section\"><h3>Reporter's Description</h3>\
             <div class=\"detail-description\">&quot;{}&quot;</div></div>",
            escape_html(description)
        );
    }

    if let Some(decision) = report.ai_decision() {
        html.push_str(&render_ai_section(&decision));
    }

    if let Some(appeal) = &detail.appeal {
        let _ = write!(
            html,
            "<div class=\"detail-section\"><h3>User Appeal</h3><div class=\"appeal-box\">\
             <div class=\"appeal-reason\">{reason}</div>\
             <div class=\"appeal-meta\">Submitted: {submitted} &middot; Status: <strong>{status}</strong></div>",
            reason = escape_html(&appeal.appeal_reason),
            submitted = appeal.created_at.format(),
            status = appeal_status_label(appeal.status),
        );
        if let Some(response) = &appeal.admin_response {
            let _ = write!(
                html,
                "<div class=\"admin-response-box\"><strong>Admin Response:</strong> {}</div>",
                escape_html(response)
            );
        }
        html.push_str("</div></div>");
    }

    if let Some(notes) = &report.admin_notes {
        let _ = write!(
            html,
            "<div class=\"detail-section\"><h3>Previous Admin Notes</h3>\
             <div class=\"detail-description\">{}</div></div>",
            escape_html(notes)
        );
    }

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Appeal, ContentSnapshot, ContentType, ReportReason, ReportStatus, Strike,
    };

    fn bare_report() -> Report {
        Report {
            id: "r1".to_string(),
            reason: ReportReason::Spam,
            status: ReportStatus::Pending,
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

    #[test]
    fn test_detail_omits_absent_sections() {
        let detail = ReportDetail {
            report: bare_report(),
            content: ContentSnapshot::default(),
            appeal: None,
        };

        let html = render_detail(&detail);
        assert!(html.contains("Report: Spam"));
        assert!(html.contains("Reported Post"));
        assert!(!html.contains("Reporter's Description"));
        assert!(!html.contains("AI Analysis"));
        assert!(!html.contains("User Appeal"));
        assert!(!html.contains("Previous Admin Notes"));
        assert!(!html.contains("detail-content-text"));
        assert!(!html.contains("error"));
    }

    #[test]
    fn test_detail_renders_present_sections() {
        let mut report = bare_report();
        report.description = Some("keeps spamming links".to_string());
        report.admin_notes = Some("second report this week".to_string());
        report.ai_decision =
            Some("{\"isViolation\":true,\"confidence\":0.93,\"reasoning\":\"repeated links\"}".to_string());

        let detail = ReportDetail {
            report,
            content: ContentSnapshot {
                content: Some("buy cheap stuff".to_string()),
                media_url: None,
                category: Some("marketplace".to_string()),
                hashtags: None,
                user_name: Some("spammy".to_string()),
                user_avatar_url: None,
            },
            appeal: Some(Appeal {
                report_id: "r1".to_string(),
                appeal_reason: "it was one link".to_string(),
                status: AppealStatus::Pending,
                admin_response: None,
                created_at: Timestamp::from_unix_seconds(1_767_312_000).unwrap(),
                resolved_at: None,
            }),
        };

        let html = render_detail(&detail);
        assert!(html.contains("Reporter&#39;s Description") || html.contains("Reporter's Description"));
        assert!(html.contains("keeps spamming links"));
        assert!(html.contains("AI Analysis"));
        assert!(html.contains("93% confidence"));
        assert!(html.contains("User Appeal"));
        assert!(html.contains("it was one link"));
        assert!(html.contains("Previous Admin Notes"));
        assert!(html.contains("spammy"));
        assert!(html.contains("Category: <strong>marketplace</strong>"));
    }

    #[test]
    fn test_malformed_ai_payload_renders_nothing() {
        let mut report = bare_report();
        report.ai_decision = Some("{broken".to_string());
        let detail = ReportDetail {
            report,
            content: ContentSnapshot::default(),
            appeal: None,
        };
        assert!(!render_detail(&detail).contains("AI Analysis"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut report = bare_report();
        report.content_preview = Some("<script>alert(1)</script>".to_string());
        let html = render_report_card(&report);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_report_card_prefers_names_over_ids() {
        let mut report = bare_report();
        report.reporter_user_name = Some("Alice".to_string());
        let html = render_report_card(&report);
        assert!(html.contains("Reporter: <strong>Alice</strong>"));
        // no name for the reported user, fall back to the id
        assert!(html.contains("Reported: <strong>u2</strong>"));
    }

    #[test]
    fn test_empty_listing_renders_empty_state() {
        let html = render_report_list(&[], "pending reports");
        assert!(html.contains("empty-state"));
        assert!(html.contains("No pending reports"));
    }

    #[test]
    fn test_banned_user_card_lists_strikes_in_order() {
        let user = BannedUser {
            user_id: "user42".to_string(),
            user_name: "Mallory".to_string(),
            avatar_url: None,
            strike_count: 2,
            banned_at: 1_767_225_600,
            reason: "strike limit reached".to_string(),
            strikes: vec![
                Strike {
                    reason: "spam".to_string(),
                    created_at: Timestamp::from_unix_seconds(1_767_000_000).unwrap(),
                },
                Strike {
                    reason: "harassment".to_string(),
                    created_at: Timestamp::from_unix_seconds(1_767_100_000).unwrap(),
                },
            ],
        };

        let html = render_banned_user_card(&user);
        assert!(html.contains("Strike History"));
        let first = html.find("#1").unwrap();
        let second = html.find("#2").unwrap();
        assert!(first < second);
        assert!(html.contains("Strikes: 2"));
    }

    #[test]
    fn test_banned_user_without_strike_history_omits_section() {
        let user = BannedUser {
            user_id: "user43".to_string(),
            user_name: "Eve".to_string(),
            avatar_url: None,
            strike_count: 3,
            banned_at: 1_767_225_600,
            reason: "manual ban".to_string(),
            strikes: vec![],
        };
        assert!(!render_banned_user_card(&user).contains("Strike History"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("a & b < c > d \"e\" 'f'"),
            "a &amp; b &lt; c &gt; d &quot;e&quot; &#39;f&#39;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::Level;

use modwarden::config::Config;
use modwarden::credentials::SqliteCredentialStore;
use modwarden::dashboard::{tally_stats, DashboardSnapshot, TabData};
use modwarden::models::{AppealSummary, BannedUser, Report};
use modwarden::session::SessionManager;
use modwarden::state_machine::ReviewDecision;
use modwarden::views;
use modwarden::{ReportClient, ReviewWorkflow};

/// Modwarden: admin review console for content-moderation reports
#[derive(Parser, Debug)]
#[command(name = "modwarden")]
#[command(about = "Admin review console for content-moderation reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and persist the session
    Login(LoginArgs),
    /// Show dashboard counters and the pending queue
    Dashboard,
    /// List appeals
    Appeals,
    /// List resolved reports
    Resolved,
    /// List banned users with strike history
    Banned,
    /// Show one report in detail
    Show(ShowArgs),
    /// Resolve a pending/reviewing report
    Review(ReviewArgs),
    /// Resolve a pending appeal
    Appeal(AppealArgs),
    /// Clear a banned user's strikes and unban them (irreversible)
    ResetStrikes(ResetStrikesArgs),
    /// Ask the service to run automated analysis on the next queued report
    ProcessNext,
    /// Clear the session and stored credentials
    Logout,
}

#[derive(Parser, Debug)]
struct LoginArgs {
    /// Admin user id
    #[arg(long)]
    user_id: String,

    /// Admin password
    #[arg(long)]
    password: String,
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// Report id
    report_id: String,

    /// Print the rendered HTML fragment instead of a text summary
    #[arg(long)]
    html: bool,
}

#[derive(Parser, Debug)]
struct ReviewArgs {
    /// Report id
    report_id: String,

    /// Decision: valid or invalid
    #[arg(long, value_parser = ["valid", "invalid", "resolved_valid", "resolved_invalid"])]
    decision: String,

    /// Optional notes kept with the report
    #[arg(long, default_value = "")]
    notes: String,

    /// Issue a strike against the reported user (valid decisions only)
    #[arg(long)]
    strike: bool,
}

#[derive(Parser, Debug)]
struct AppealArgs {
    /// Report id
    report_id: String,

    /// Approve the appeal (reverses the strike); omit to reject
    #[arg(long)]
    approve: bool,

    /// Mandatory response shown to the user
    #[arg(long)]
    response: String,
}

#[derive(Parser, Debug)]
struct ResetStrikesArgs {
    /// User id to unban
    user_id: String,

    /// Mandatory message shown to the user
    #[arg(long)]
    message: String,

    /// Confirm this irreversible action
    #[arg(long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::WARN).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store = SqliteCredentialStore::open(&config.credentials_path(), &config.api_url)
        .context("Failed to open credential store")?;
    let session = SessionManager::new(&config.api_url, Arc::new(store));
    let client = ReportClient::new(session.clone());
    let workflow = ReviewWorkflow::new(client.clone());

    if let Commands::Login(args) = &cli.command {
        session.login(&args.user_id, &args.password).await?;
        println!("Logged in as {}", args.user_id);
        return Ok(());
    }

    // Everything else rides the restored session; the first request either
    // works or walks the 401-recovery path.
    if !session.restore().await {
        return Err(anyhow!("Not logged in. Run `modwarden login` first."));
    }

    match cli.command {
        Commands::Login(_) => unreachable!("handled above"),
        Commands::Dashboard => {
            let snapshot = workflow.refresh().await?;
            print_dashboard(&snapshot);
        }
        Commands::Appeals => {
            let appeals = client.fetch_appeals().await?;
            print_appeals(&appeals);
        }
        Commands::Resolved => {
            let reports = client.fetch_resolved().await?;
            print_reports("Resolved reports", &reports);
        }
        Commands::Banned => {
            let users = client.fetch_banned_users().await?;
            print_banned(&users);
        }
        Commands::Show(args) => {
            let detail = client.fetch_report_detail(&args.report_id).await?;
            if args.html {
                println!("{}", views::render_detail(&detail));
            } else {
                print_detail_summary(&detail.report);
            }
        }
        Commands::Review(args) => {
            let decision = ReviewDecision::parse(&args.decision)
                .ok_or_else(|| anyhow!("unknown decision: {}", args.decision))?;
            let detail = client.fetch_report_detail(&args.report_id).await?;
            let effects = workflow
                .review_report(
                    &detail.report,
                    detail.appeal.as_ref(),
                    decision,
                    &args.notes,
                    args.strike,
                )
                .await?;
            println!("Report {} resolved as {decision}", args.report_id);
            print_effects(&effects);
        }
        Commands::Appeal(args) => {
            let detail = client.fetch_report_detail(&args.report_id).await?;
            let effects = workflow
                .review_appeal(
                    &detail.report,
                    detail.appeal.as_ref(),
                    args.approve,
                    &args.response,
                )
                .await?;
            let verdict = if args.approve { "approved" } else { "rejected" };
            println!("Appeal on report {} {verdict}", args.report_id);
            print_effects(&effects);
        }
        Commands::ResetStrikes(args) => {
            let banned = client.fetch_banned_users().await?;
            let effects = workflow
                .reset_strikes(&banned, &args.user_id, &args.message, args.yes)
                .await?;
            println!("Strikes reset for {}", args.user_id);
            print_effects(&effects);
        }
        Commands::ProcessNext => {
            let outcome = client.process_next_report().await?;
            println!("{}", outcome.message);
        }
        Commands::Logout => {
            session.logout().await;
            println!("Logged out");
        }
    }

    Ok(())
}

fn print_effects(effects: &[modwarden::ImpliedEffect]) {
    use modwarden::ImpliedEffect;
    for effect in effects {
        match effect {
            ImpliedEffect::StrikeIssued { user_id } => {
                println!("  strike issued against {user_id}")
            }
            ImpliedEffect::StrikeReversed { user_id } => {
                println!("  strike reversed for {user_id}")
            }
            ImpliedEffect::StrikesCleared { user_id } => {
                println!("  strike history cleared for {user_id}")
            }
            ImpliedEffect::UserUnbanned { user_id } => println!("  {user_id} unbanned"),
            ImpliedEffect::RefreshDashboard => {}
        }
    }
}

fn print_dashboard(snapshot: &DashboardSnapshot) {
    let stats = &snapshot.stats;
    println!(
        "Pending: {}  Appealed: {}  Resolved today: {}  Banned: {}",
        stats.total_pending,
        stats.total_appealed,
        stats.total_resolved_today,
        stats.total_banned_users
    );

    let local = tally_stats(snapshot);
    if local.total_pending != stats.total_pending {
        println!(
            "(listing shows {} open reports; counters may be stale)",
            local.total_pending
        );
    }

    print_reports("Pending reports", &snapshot.pending);
    if let TabData::Failed(reason) = &snapshot.appeals {
        println!("  appeals tab unavailable: {reason}");
    }
    if let TabData::Failed(reason) = &snapshot.resolved {
        println!("  resolved tab unavailable: {reason}");
    }
    if let TabData::Failed(reason) = &snapshot.banned {
        println!("  banned tab unavailable: {reason}");
    }
}

fn print_reports(heading: &str, reports: &[Report]) {
    println!("{heading}:");
    if reports.is_empty() {
        println!("  (none)");
        return;
    }
    for report in reports {
        println!(
            "  {}  [{}] {} {} — reported {} ({})",
            report.id,
            report.status,
            report.reason,
            report.content_type,
            report
                .reported_user_name
                .as_deref()
                .unwrap_or(&report.reported_user_id),
            report.created_at
        );
    }
}

fn print_appeals(appeals: &[AppealSummary]) {
    println!("Appeals:");
    if appeals.is_empty() {
        println!("  (none)");
        return;
    }
    for appeal in appeals {
        println!(
            "  {}  [{:?}] {} — {}",
            appeal.report_id, appeal.status, appeal.report_reason, appeal.appeal_reason
        );
    }
}

fn print_banned(users: &[BannedUser]) {
    println!("Banned users:");
    if users.is_empty() {
        println!("  (none)");
        return;
    }
    for user in users {
        println!(
            "  {}  {} — {} strikes — {}",
            user.user_id, user.user_name, user.strike_count, user.reason
        );
        for (i, strike) in user.strikes.iter().enumerate() {
            println!("      #{} {} ({})", i + 1, strike.reason, strike.created_at);
        }
    }
}

fn print_detail_summary(report: &Report) {
    println!("Report {}", report.id);
    println!("  reason: {}", report.reason);
    println!("  status: {}", report.status);
    println!("  type:   {}", report.content_type);
    println!("  reported user: {}", report.reported_user_id);
    println!("  reporter:      {}", report.reporter_user_id);
    if let Some(preview) = &report.content_preview {
        println!("  preview: {preview}");
    }
    if let Some(description) = &report.description {
        println!("  description: {description}");
    }
    if let Some(decision) = report.ai_decision() {
        let verdict = if decision.is_violation {
            "violation"
        } else {
            "no violation"
        };
        match decision.confidence {
            Some(c) => println!("  ai: {verdict} ({:.0}% confidence)", c * 100.0),
            None => println!("  ai: {verdict}"),
        }
    }
}

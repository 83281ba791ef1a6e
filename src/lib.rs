pub mod client;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod session;
pub mod state_machine;
pub mod views;
pub mod workflow;

pub use client::ReportClient;
pub use dashboard::{DashboardAggregator, DashboardSnapshot, TabData};
pub use error::{ActionError, AuthError, ClientError, SessionError, ValidationError};
pub use session::SessionManager;
pub use state_machine::{
    AdminAction, CaseState, ImpliedEffect, ModerationRequest, ReviewDecision, Subject,
    TransitionPlan,
};
pub use workflow::ReviewWorkflow;

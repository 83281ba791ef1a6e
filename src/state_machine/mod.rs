//! Explicit state machine for the report/appeal review lifecycle.
//!
//! The design separates:
//! - **State**: what is known about a case (`CaseState`)
//! - **Actions**: what the admin asked for (`AdminAction`)
//! - **Plans**: what to do about it (`TransitionPlan`)
//! - **Transition**: pure function `(State, Action) -> Result<Plan, ValidationError>`
//!
//! The transition function performs every legality check in one place, so
//! no action handler can bypass it. It has no side effects: the moderation
//! request and its implied consequences come back as data, and the workflow
//! layer executes them against the real API.

pub mod action;
pub mod effect;
pub mod state;
pub mod transition;

pub use action::*;
pub use effect::*;
pub use state::*;
pub use transition::*;

//! Data models for plans, step results, clarifications, and execution state.
//!
//! This module contains the core domain models flowing through the
//! plan-and-execute engine. Validation logic lives next to the types it
//! guards ([`Plan::validate`]); presentation lives in [`crate::display`].

pub mod clarification;
pub mod plan;
pub mod result;
pub mod state;

pub use clarification::{ClarificationOption, ClarificationRequest};
pub use plan::{Plan, PlanKind, Step, MIN_STEP_DESCRIPTION_LEN};
pub use result::{Documents, StepResult};
pub use state::ExecutionState;

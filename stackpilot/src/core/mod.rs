//! Core domain model types for stackpilot.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Stack actions and status sets
//! - Stack events as observed on the control plane's event stream
//! - The operation descriptor and its terminal outcome

mod event;
mod operation;
mod outcome;
mod status;

pub use event::StackEvent;
pub use operation::StackOperation;
pub use outcome::PollOutcome;
pub use status::{
    is_exists_status, is_failure_status, is_success_status, StackAction, EXISTS_STATUSES,
    FAILURE_STATUSES, STACK_RESOURCE_TYPE, SUCCESS_STATUSES,
};

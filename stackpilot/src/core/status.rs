//! Stack actions and resource status sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource type of the stack itself; only its events can end an operation.
pub const STACK_RESOURCE_TYPE: &str = "AWS::CloudFormation::Stack";

/// Statuses that end an operation successfully.
pub const SUCCESS_STATUSES: &[&str] = &["CREATE_COMPLETE", "DELETE_COMPLETE", "UPDATE_COMPLETE"];

/// Statuses that end an operation with a failure.
pub const FAILURE_STATUSES: &[&str] = &[
    "ROLLBACK_FAILED",
    "ROLLBACK_IN_PROGRESS",
    "ROLLBACK_COMPLETE",
    "UPDATE_ROLLBACK_IN_PROGRESS",
    "UPDATE_ROLLBACK_COMPLETE",
    "UPDATE_FAILED",
    "DELETE_FAILED",
];

/// Stack statuses for which a stack counts as existing (and is updated
/// rather than created).
pub const EXISTS_STATUSES: &[&str] = &[
    "CREATE_COMPLETE",
    "UPDATE_COMPLETE",
    "ROLLBACK_COMPLETE",
    "UPDATE_ROLLBACK_COMPLETE",
];

/// Returns true if the status is in the success set.
#[must_use]
pub fn is_success_status(status: &str) -> bool {
    SUCCESS_STATUSES.contains(&status)
}

/// Returns true if the status is in the failure set.
#[must_use]
pub fn is_failure_status(status: &str) -> bool {
    FAILURE_STATUSES.contains(&status)
}

/// Returns true if a stack with this status exists.
#[must_use]
pub fn is_exists_status(status: &str) -> bool {
    EXISTS_STATUSES.contains(&status)
}

/// The kind of stack operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackAction {
    /// Create a new stack.
    Create,
    /// Update an existing stack.
    Update,
    /// Delete a stack.
    Delete,
}

impl StackAction {
    /// Returns the progressive verb used in progress lines ("Creating").
    #[must_use]
    pub const fn progressive(&self) -> &'static str {
        match self {
            Self::Create => "Creating",
            Self::Update => "Updating",
            Self::Delete => "Deleting",
        }
    }

    /// Returns the upper-case label used in failure messages ("CREATE").
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for StackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

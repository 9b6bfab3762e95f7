//! Terminal result of a stack operation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StackAction;

/// The single terminal result of a [`super::StackOperation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum PollOutcome {
    /// The stack reached a success state (or no longer exists).
    Success,
    /// The stack reached a failure state, or polling could not continue.
    Failure(String),
}

impl PollOutcome {
    /// Builds the failure message `"<stack> <ACTION> Failed[: <reason>]"`.
    #[must_use]
    pub fn failure(stack_name: &str, action: StackAction, reason: Option<&str>) -> Self {
        let mut message = format!("{stack_name} {} Failed", action.label());
        if let Some(reason) = reason.filter(|r| !r.is_empty()) {
            message.push_str(": ");
            message.push_str(reason);
        }
        Self::Failure(message)
    }

    /// Returns true for [`PollOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure(message) => Some(message),
        }
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure(message) => write!(f, "failure: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_with_reason() {
        let outcome = PollOutcome::failure("demo", StackAction::Update, Some("Resource failed"));
        assert_eq!(outcome.failure_message(), Some("demo UPDATE Failed: Resource failed"));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_failure_without_reason() {
        let outcome = PollOutcome::failure("demo", StackAction::Create, None);
        assert_eq!(outcome.failure_message(), Some("demo CREATE Failed"));

        let empty = PollOutcome::failure("demo", StackAction::Create, Some(""));
        assert_eq!(empty, outcome);
    }

    #[test]
    fn test_outcome_serialize() {
        let json = serde_json::to_value(PollOutcome::Success).unwrap();
        assert_eq!(json["outcome"], "success");
    }
}

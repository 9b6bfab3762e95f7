//! Poll states and the terminal-event decision.

use crate::core::{is_failure_status, is_success_status, PollOutcome, StackEvent, StackOperation};

/// State of an operation's polling state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// No terminal event yet.
    Polling,
    /// The operation succeeded.
    Succeeded,
    /// The operation failed with the given message.
    Failed(String),
}

impl PollState {
    /// Returns true for `Succeeded` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Polling)
    }

    /// Converts a terminal state into its outcome.
    #[must_use]
    pub fn into_outcome(self) -> Option<PollOutcome> {
        match self {
            Self::Polling => None,
            Self::Succeeded => Some(PollOutcome::Success),
            Self::Failed(message) => Some(PollOutcome::Failure(message)),
        }
    }
}

impl From<PollOutcome> for PollState {
    fn from(outcome: PollOutcome) -> Self {
        match outcome {
            PollOutcome::Success => Self::Succeeded,
            PollOutcome::Failure(message) => Self::Failed(message),
        }
    }
}

/// Decides the operation's state from the most recent event of a round.
///
/// Only an event of the stack resource whose logical id is the stack name
/// can end the operation. A failure status stamped before the operation
/// started is a leftover from an earlier run and counts as success.
#[must_use]
pub fn decide(operation: &StackOperation, last_event: Option<&StackEvent>) -> PollState {
    let Some(event) = last_event else {
        return PollState::Polling;
    };
    if !event.is_stack_event_for(operation.stack_name()) {
        return PollState::Polling;
    }

    let status = event.resource_status.as_str();
    let current = event.timestamp >= operation.started_at();

    if is_failure_status(status) && current {
        PollState::from(PollOutcome::failure(
            operation.stack_name(),
            operation.action(),
            event.resource_status_reason.as_deref(),
        ))
    } else if is_success_status(status) || is_failure_status(status) {
        PollState::Succeeded
    } else {
        PollState::Polling
    }
}

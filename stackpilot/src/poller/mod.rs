//! Event polling and the operation outcome state machine.
//!
//! An [`EventPoller`] follows one [`StackOperation`]: it repeatedly fetches
//! the stack's events, reports the new ones, and stops once the stack's own
//! terminal event (or a terminal fetch error) decides the outcome.

mod seen;
mod state;

pub use seen::SeenEventSet;
pub use state::{decide, PollState};

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use crate::cancellation::CancellationToken;
use crate::client::ControlPlane;
use crate::core::{PollOutcome, StackEvent, StackOperation};
use crate::errors::ControlPlaneError;
use crate::events::{ProgressLine, ProgressSink};

/// Message of the outcome produced when polling is cancelled.
pub const CANCELLED_MESSAGE: &str = "cancelled";

/// Result of a single polling round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundResult {
    /// Another round of the same operation was still running.
    Skipped,
    /// The round ran; this is the resulting state.
    Polled(PollState),
}

/// Follows one stack operation's event stream to a terminal outcome.
pub struct EventPoller {
    control_plane: Arc<dyn ControlPlane>,
    sink: Arc<dyn ProgressSink>,
    operation: StackOperation,
    seen: Mutex<SeenEventSet>,
}

impl EventPoller {
    /// Creates a poller with an empty seen-event set.
    #[must_use]
    pub fn new(
        control_plane: Arc<dyn ControlPlane>,
        sink: Arc<dyn ProgressSink>,
        operation: StackOperation,
    ) -> Self {
        Self {
            control_plane,
            sink,
            operation,
            seen: Mutex::new(SeenEventSet::new()),
        }
    }

    /// Returns the operation being followed.
    #[must_use]
    pub const fn operation(&self) -> &StackOperation {
        &self.operation
    }

    /// Fetches the stack's events, newest first.
    ///
    /// Paging stops at the last page or at the first page that reaches back
    /// past the operation start; older history cannot affect the outcome.
    pub async fn fetch_events(&self) -> Result<Vec<StackEvent>, ControlPlaneError> {
        let stack_name = self.operation.stack_name();
        let started_at = self.operation.started_at();
        let mut events = Vec::new();
        let mut page_token = None;

        loop {
            let page = self
                .control_plane
                .describe_stack_events(stack_name, page_token.take())
                .await?;
            let reached_start = page.stack_events.iter().any(|e| e.timestamp < started_at);
            events.extend(page.stack_events);

            match page.next_token {
                Some(next) if !reached_start => page_token = Some(next),
                _ => break,
            }
        }

        Ok(events)
    }

    /// Filters, orders, reports, and decides on one round's events.
    pub fn process(&self, seen: &mut SeenEventSet, events: Vec<StackEvent>) -> PollState {
        // Oldest first, so a stable sort keeps the API's order for equal timestamps.
        let mut fresh = seen.take_fresh(events.into_iter().rev().collect());
        fresh.sort_by_key(|event| event.timestamp);

        let started_at = self.operation.started_at();
        for event in fresh.iter().filter(|e| e.timestamp >= started_at) {
            self.sink.report(&ProgressLine::new(
                self.operation.action(),
                self.operation.stack_name(),
                event.clone(),
            ));
        }

        decide(&self.operation, fresh.last())
    }

    /// Runs one fetch-and-process round.
    ///
    /// Returns [`RoundResult::Skipped`] without fetching if another round of
    /// this operation is in flight.
    #[instrument(skip(self), fields(stack = %self.operation.stack_name()))]
    pub async fn poll_round(&self) -> RoundResult {
        let Ok(mut seen) = self.seen.try_lock() else {
            debug!("Previous round still running, skipping tick");
            return RoundResult::Skipped;
        };

        let state = match self.fetch_events().await {
            Ok(events) => self.process(&mut seen, events),
            Err(e) if e.is_not_found() => {
                debug!("Stack no longer exists");
                PollState::Succeeded
            }
            Err(e) if e.is_throttling() => {
                warn!("Control plane API calls are throttling");
                self.process(&mut seen, Vec::new())
            }
            Err(e) => PollState::from(PollOutcome::failure(
                self.operation.stack_name(),
                self.operation.action(),
                Some(&e.to_string()),
            )),
        };

        debug!(seen = seen.len(), ?state, "Round complete");
        RoundResult::Polled(state)
    }

    /// Polls until the operation reaches a terminal state.
    ///
    /// The first round runs immediately, then one per poll interval. If
    /// `cancel` fires, polling stops without further fetches and the outcome
    /// is `Failure("cancelled")`.
    pub async fn run(&self, cancel: Option<Arc<CancellationToken>>) -> PollOutcome {
        let span = info_span!(
            "poll",
            stack = %self.operation.stack_name(),
            action = %self.operation.action(),
            operation_id = %self.operation.operation_id(),
        );
        self.run_inner(cancel.as_deref()).instrument(span).await
    }

    async fn run_inner(&self, cancel: Option<&CancellationToken>) -> PollOutcome {
        let mut interval = tokio::time::interval(self.operation.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = wait_for_cancel(cancel) => return cancelled(),
                _ = interval.tick() => {}
            }

            let round = tokio::select! {
                biased;
                () = wait_for_cancel(cancel) => return cancelled(),
                round = self.poll_round() => round,
            };

            if let RoundResult::Polled(state) = round {
                if let Some(outcome) = state.into_outcome() {
                    info!(%outcome, "Stack operation finished");
                    return outcome;
                }
            }
        }
    }
}

impl std::fmt::Debug for EventPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPoller")
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

async fn wait_for_cancel(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

fn cancelled() -> PollOutcome {
    info!("Polling cancelled");
    PollOutcome::Failure(CANCELLED_MESSAGE.to_string())
}

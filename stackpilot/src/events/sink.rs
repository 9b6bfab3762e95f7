//! Progress sink trait and implementations.

use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use tracing::{event, Level};

use crate::core::{StackAction, StackEvent};
use crate::utils::clock_time;

/// One progress-worthy stack event of a running operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressLine {
    /// The operation's action.
    pub action: StackAction,
    /// The operation's stack name.
    pub stack_name: String,
    /// The event being reported.
    pub event: StackEvent,
}

impl ProgressLine {
    /// Creates a progress line.
    #[must_use]
    pub fn new(action: StackAction, stack_name: impl Into<String>, event: StackEvent) -> Self {
        Self {
            action,
            stack_name: stack_name.into(),
            event,
        }
    }
}

impl fmt::Display for ProgressLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {} - {}  {}  {}",
            clock_time(&self.event.timestamp),
            self.action.progressive(),
            self.stack_name,
            self.event.resource_type,
            self.event.logical_resource_id,
            self.event.resource_status,
            self.event.resource_status_reason.as_deref().unwrap_or(""),
        )
    }
}

/// Receives the events an operation reports as progress.
///
/// Sinks are called from the polling loop and must not block.
pub trait ProgressSink: Send + Sync {
    /// Reports one line of progress.
    fn report(&self, line: &ProgressLine);
}

/// A no-op sink that discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgressSink;

impl ProgressSink for NoOpProgressSink {
    fn report(&self, _line: &ProgressLine) {}
}

/// A sink that logs progress through `tracing`.
#[derive(Debug, Clone)]
pub struct LoggingProgressSink {
    level: Level,
}

impl Default for LoggingProgressSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingProgressSink {
    /// Creates a new logging sink with the specified level.
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    /// Returns the level progress is logged at.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub const fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

macro_rules! progress_event {
    ($level:expr, $line:expr) => {
        event!(
            $level,
            stack = %$line.stack_name,
            status = %$line.event.resource_status,
            event_id = %$line.event.event_id,
            "{}",
            $line
        )
    };
}

impl ProgressSink for LoggingProgressSink {
    fn report(&self, line: &ProgressLine) {
        // `event!` needs a constant level.
        if self.level == Level::ERROR {
            progress_event!(Level::ERROR, line);
        } else if self.level == Level::WARN {
            progress_event!(Level::WARN, line);
        } else if self.level == Level::INFO {
            progress_event!(Level::INFO, line);
        } else if self.level == Level::DEBUG {
            progress_event!(Level::DEBUG, line);
        } else {
            progress_event!(Level::TRACE, line);
        }
    }
}

/// A collecting sink for tests and callers that render progress themselves.
#[derive(Debug, Default)]
pub struct CollectingProgressSink {
    lines: RwLock<Vec<ProgressLine>>,
}

impl CollectingProgressSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected lines.
    #[must_use]
    pub fn lines(&self) -> Vec<ProgressLine> {
        self.lines.read().clone()
    }

    /// Returns the ids of all reported events, in report order.
    #[must_use]
    pub fn event_ids(&self) -> Vec<String> {
        self.lines.read().iter().map(|l| l.event.event_id.clone()).collect()
    }

    /// Returns the number of collected lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    /// Returns true if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.read().is_empty()
    }

    /// Clears all collected lines.
    pub fn clear(&self) {
        self.lines.write().clear();
    }
}

impl ProgressSink for CollectingProgressSink {
    fn report(&self, line: &ProgressLine) {
        self.lines.write().push(line.clone());
    }
}

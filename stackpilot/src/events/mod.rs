//! Progress reporting for running stack operations.
//!
//! The poller decides which events are progress-worthy; sinks decide how
//! (and whether) they are shown.

mod sink;

pub use sink::{
    CollectingProgressSink, LoggingProgressSink, NoOpProgressSink, ProgressLine, ProgressSink,
};

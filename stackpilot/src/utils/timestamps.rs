//! Timestamp helpers.

use chrono::{DateTime, Local, Utc};

/// Represents a UTC timestamp.
pub type Timestamp = DateTime<Utc>;

/// Formats a timestamp as local `HH:MM:SS`, the prefix of progress lines.
#[must_use]
pub fn clock_time(timestamp: &Timestamp) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

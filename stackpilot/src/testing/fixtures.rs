//! Event and timestamp fixtures.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::core::StackEvent;

/// A fixed instant used as the start of test operations.
#[must_use]
pub fn fixed_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Returns `fixed_start()` shifted by `offset_secs`.
#[must_use]
pub fn seconds_after_start(offset_secs: i64) -> DateTime<Utc> {
    fixed_start() + Duration::seconds(offset_secs)
}

/// An event of the stack resource itself.
#[must_use]
pub fn stack_event(id: &str, stack_name: &str, status: &str, timestamp: DateTime<Utc>) -> StackEvent {
    StackEvent::for_stack(id, stack_name, status, timestamp)
}

/// An event of a resource inside the stack.
#[must_use]
pub fn resource_event(
    id: &str,
    resource_type: &str,
    logical_id: &str,
    status: &str,
    timestamp: DateTime<Utc>,
) -> StackEvent {
    StackEvent::new(id, resource_type, logical_id, status, timestamp)
}

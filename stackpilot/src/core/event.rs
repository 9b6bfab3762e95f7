//! Stack event type as returned by the control plane's event stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::STACK_RESOURCE_TYPE;

/// A single status change of a stack or one of its resources.
///
/// Events are immutable once observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackEvent {
    /// Unique event id.
    pub event_id: String,

    /// Resource type, e.g. `AWS::S3::Bucket`.
    pub resource_type: String,

    /// Logical id of the resource inside the template.
    pub logical_resource_id: String,

    /// Resource status, e.g. `CREATE_IN_PROGRESS`.
    pub resource_status: String,

    /// Free-text reason attached to the status change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_status_reason: Option<String>,

    /// When the status change happened.
    pub timestamp: DateTime<Utc>,
}

impl StackEvent {
    /// Creates a new event without a status reason.
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        resource_type: impl Into<String>,
        logical_resource_id: impl Into<String>,
        resource_status: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            resource_type: resource_type.into(),
            logical_resource_id: logical_resource_id.into(),
            resource_status: resource_status.into(),
            resource_status_reason: None,
            timestamp,
        }
    }

    /// Creates an event for the stack resource itself.
    #[must_use]
    pub fn for_stack(
        event_id: impl Into<String>,
        stack_name: impl Into<String>,
        resource_status: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(event_id, STACK_RESOURCE_TYPE, stack_name, resource_status, timestamp)
    }

    /// Sets the status reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.resource_status_reason = Some(reason.into());
        self
    }

    /// Returns true if this event belongs to the named stack itself rather
    /// than to a child resource or a nested stack.
    #[must_use]
    pub fn is_stack_event_for(&self, stack_name: &str) -> bool {
        self.resource_type == STACK_RESOURCE_TYPE && self.logical_resource_id == stack_name
    }
}

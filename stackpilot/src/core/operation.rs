//! One logical deploy attempt.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

use super::StackAction;
use crate::config::DEFAULT_POLL_INTERVAL_MS;

/// Identifies one create/update/delete attempt against a stack.
///
/// The start timestamp is fixed at construction; every terminal-event
/// decision for this operation is made relative to it.
#[derive(Debug, Clone)]
pub struct StackOperation {
    operation_id: Uuid,
    stack_name: String,
    action: StackAction,
    started_at: DateTime<Utc>,
    poll_interval: Duration,
    capabilities: Vec<String>,
    tags: BTreeMap<String, String>,
    role_name: Option<String>,
}

impl StackOperation {
    /// Creates a new operation started at `started_at`.
    #[must_use]
    pub fn new(stack_name: impl Into<String>, action: StackAction, started_at: DateTime<Utc>) -> Self {
        Self {
            operation_id: Uuid::new_v4(),
            stack_name: stack_name.into(),
            action,
            started_at,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            capabilities: Vec::new(),
            tags: BTreeMap::new(),
            role_name: None,
        }
    }

    /// Sets the polling interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the capability tokens.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the stack tags.
    #[must_use]
    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// Sets the execution role name.
    #[must_use]
    pub fn with_role_name(mut self, role_name: Option<String>) -> Self {
        self.role_name = role_name.filter(|name| !name.is_empty());
        self
    }

    /// Returns the operation id used for log correlation.
    #[must_use]
    pub const fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    /// Returns the stack name.
    #[must_use]
    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    /// Returns the action.
    #[must_use]
    pub const fn action(&self) -> StackAction {
        self.action
    }

    /// Returns the start timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the polling interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the capability tokens.
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Returns the tags.
    #[must_use]
    pub const fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Returns the execution role name, if configured.
    #[must_use]
    pub fn role_name(&self) -> Option<&str> {
        self.role_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_operation_defaults() {
        let started = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let op = StackOperation::new("demo", StackAction::Create, started);

        assert_eq!(op.stack_name(), "demo");
        assert_eq!(op.started_at(), started);
        assert_eq!(op.poll_interval(), Duration::from_millis(5000));
        assert!(op.role_name().is_none());
    }

    #[test]
    fn test_empty_role_name_is_none() {
        let op = StackOperation::new("demo", StackAction::Create, Utc::now())
            .with_role_name(Some(String::new()));
        assert!(op.role_name().is_none());
    }

    #[test]
    fn test_operation_ids_are_unique() {
        let now = Utc::now();
        let a = StackOperation::new("demo", StackAction::Create, now);
        let b = StackOperation::new("demo", StackAction::Create, now);
        assert_ne!(a.operation_id(), b.operation_id());
    }
}

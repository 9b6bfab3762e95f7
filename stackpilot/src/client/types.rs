//! Wire-level response types exchanged with the control plane.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::StackEvent;

/// Identifier returned by the control plane for a submitted stack.
pub type StackId = String;

/// One page of a stack's event history, newest event first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventPage {
    /// Events on this page.
    #[serde(default)]
    pub stack_events: Vec<StackEvent>,
    /// Token for the next (older) page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl EventPage {
    /// Creates a final page.
    #[must_use]
    pub fn last(stack_events: Vec<StackEvent>) -> Self {
        Self {
            stack_events,
            next_token: None,
        }
    }

    /// Creates a page followed by another one.
    #[must_use]
    pub fn with_next(stack_events: Vec<StackEvent>, next_token: impl Into<String>) -> Self {
        Self {
            stack_events,
            next_token: Some(next_token.into()),
        }
    }
}

/// A parameter declared by a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterDeclaration {
    /// Parameter key in its declared casing.
    pub parameter_key: String,
    /// Default value declared by the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl ParameterDeclaration {
    /// Declares a parameter without a default.
    #[must_use]
    pub fn required(key: impl Into<String>) -> Self {
        Self {
            parameter_key: key.into(),
            default_value: None,
        }
    }

    /// Declares a parameter with a default.
    #[must_use]
    pub fn with_default(key: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            parameter_key: key.into(),
            default_value: Some(default.into()),
        }
    }
}

/// Current state of a stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackDescription {
    /// Stack name.
    pub stack_name: String,
    /// Stack status, e.g. `UPDATE_COMPLETE`.
    pub stack_status: String,
    /// Stack outputs keyed by output key.
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
}

impl StackDescription {
    /// Creates a description without outputs.
    #[must_use]
    pub fn new(stack_name: impl Into<String>, stack_status: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            stack_status: stack_status.into(),
            outputs: BTreeMap::new(),
        }
    }

    /// Adds an output.
    #[must_use]
    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }
}

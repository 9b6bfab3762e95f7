//! Testing utilities for stackpilot operations.
//!
//! This module provides:
//! - A scripted in-memory control plane and a static identity provider
//! - Event and timestamp fixtures

mod fixtures;
mod mocks;

pub use fixtures::{fixed_start, resource_event, seconds_after_start, stack_event};
pub use mocks::{ScriptedControlPlane, StaticIdentity};

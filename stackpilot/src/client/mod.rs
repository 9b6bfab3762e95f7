//! Interfaces to the remote infrastructure-as-code control plane.
//!
//! The transport (HTTP, auth, SDK retries) lives behind these traits; the
//! orchestrator only depends on the calls it needs.

mod types;

pub use types::{EventPage, ParameterDeclaration, StackDescription, StackId};

use async_trait::async_trait;

use crate::errors::ControlPlaneError;
use crate::request::StackRequest;
use crate::template::TemplateSource;

/// The control plane calls the orchestrator consumes.
///
/// One client is shared by every polling round of an operation, and may be
/// shared across concurrent operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Submits a create request.
    async fn create_stack(&self, request: &StackRequest) -> Result<StackId, ControlPlaneError>;

    /// Submits an update request.
    ///
    /// Implementations return [`ControlPlaneError::NoUpdates`] when the
    /// request would not change the stack.
    async fn update_stack(&self, request: &StackRequest) -> Result<StackId, ControlPlaneError>;

    /// Submits a delete request.
    async fn delete_stack(&self, stack_name: &str) -> Result<(), ControlPlaneError>;

    /// Returns one page of stack events, newest first.
    async fn describe_stack_events(
        &self,
        stack_name: &str,
        page_token: Option<String>,
    ) -> Result<EventPage, ControlPlaneError>;

    /// Returns the parameters declared by a template, in declaration order.
    async fn get_template_parameters(
        &self,
        template: &TemplateSource,
    ) -> Result<Vec<ParameterDeclaration>, ControlPlaneError>;

    /// Describes a stack's current status and outputs.
    async fn describe_stack(&self, stack_name: &str) -> Result<StackDescription, ControlPlaneError>;

    /// Validates a template and returns the provider's validation summary.
    async fn validate_template(
        &self,
        template: &TemplateSource,
    ) -> Result<serde_json::Value, ControlPlaneError>;
}

/// Looks up the account the caller's credentials belong to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the current account id.
    async fn account_id(&self) -> Result<String, ControlPlaneError>;
}

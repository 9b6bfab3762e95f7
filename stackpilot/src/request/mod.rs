//! Stack request composition.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::IdentityProvider;
use crate::core::StackOperation;
use crate::parameters::Parameter;
use crate::template::TemplateSource;

/// A stack tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

/// Converts a tag map into the ordered list the control plane expects.
#[must_use]
pub fn convert_tags(tags: &BTreeMap<String, String>) -> Vec<Tag> {
    tags.iter()
        .map(|(key, value)| Tag {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

/// Builds the execution role ARN for `role_name` in `account_id`.
#[must_use]
pub fn role_arn(account_id: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:role/{role_name}")
}

/// Per-deploy settings that end up in the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackOptions {
    /// Capability tokens acknowledged by the caller.
    pub capabilities: Vec<String>,
    /// Stack tags.
    pub tags: BTreeMap<String, String>,
    /// Name of the role the control plane should assume.
    pub role_name: Option<String>,
}

impl StackOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capabilities.
    #[must_use]
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Sets the execution role name.
    #[must_use]
    pub fn with_role_name(mut self, role_name: impl Into<String>) -> Self {
        self.role_name = Some(role_name.into());
        self
    }
}

/// A complete create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackRequest {
    /// Stack name.
    pub stack_name: String,
    /// Capability tokens.
    pub capabilities: Vec<String>,
    /// Parameters in template declaration order.
    pub parameters: Vec<Parameter>,
    /// Tags.
    pub tags: Vec<Tag>,
    /// Execution role ARN.
    #[serde(rename = "RoleARN", skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    /// Template body or URL.
    #[serde(flatten)]
    pub template: TemplateSource,
}

/// Composes stack requests.
#[derive(Clone, Default)]
pub struct StackRequestBuilder {
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl StackRequestBuilder {
    /// Creates a builder without identity lookup; role names are ignored.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder that resolves role names through `identity`.
    #[must_use]
    pub fn with_identity(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Resolves a role name into an ARN.
    ///
    /// Returns `None` when no role is configured, and degrades to `None`
    /// with a warning when the account lookup is unavailable or fails.
    pub async fn resolve_role_arn(&self, role_name: Option<&str>) -> Option<String> {
        let role_name = role_name.filter(|name| !name.is_empty())?;
        let Some(identity) = &self.identity else {
            warn!(role = role_name, "No identity provider configured, deploying without a role");
            return None;
        };

        match identity.account_id().await {
            Ok(account_id) => Some(role_arn(&account_id, role_name)),
            Err(e) => {
                warn!(role = role_name, error = %e, "Account lookup failed, deploying without a role");
                None
            }
        }
    }

    /// Builds the request for `operation`.
    ///
    /// Capabilities, tags and the execution role come from the operation.
    pub async fn build(
        &self,
        operation: &StackOperation,
        template: TemplateSource,
        parameters: Vec<Parameter>,
    ) -> StackRequest {
        let stack_name = operation.stack_name();
        let role_arn = self.resolve_role_arn(operation.role_name()).await;
        debug!(stack = stack_name, role_arn = role_arn.as_deref(), "Stack request built");

        StackRequest {
            stack_name: stack_name.to_string(),
            capabilities: operation.capabilities().to_vec(),
            parameters,
            tags: convert_tags(operation.tags()),
            role_arn,
            template,
        }
    }
}

impl std::fmt::Debug for StackRequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackRequestBuilder")
            .field("identity", &self.identity.is_some())
            .finish()
    }
}

//! The top-level deploy facade.
//!
//! A [`StackDeployer`] wires template resolution, parameter normalization,
//! request building and event polling together behind the operations a
//! deploy tool exposes: create-or-update, create, update, delete, existence
//! checks, validation, and output lookup.

#[cfg(test)]
mod integration_tests;

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cancellation::CancellationToken;
use crate::client::{ControlPlane, IdentityProvider};
use crate::config::DeployerConfig;
use crate::core::{is_exists_status, PollOutcome, StackAction, StackOperation};
use crate::errors::{ControlPlaneError, Result, StackpilotError};
use crate::events::{LoggingProgressSink, ProgressSink};
use crate::parameters::{ParameterNormalizer, ParameterPayload};
use crate::poller::EventPoller;
use crate::request::{StackOptions, StackRequest, StackRequestBuilder};
use crate::template::{TemplateGenerator, TemplateReference, TemplateResolver};
use crate::utils::{Clock, SystemClock};

/// What to deploy: a stack name, its template, and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploySpec {
    /// Stack name.
    pub stack_name: String,
    /// Template reference.
    pub template: TemplateReference,
    /// User parameters; also the context handed to template generators.
    pub parameters: ParameterPayload,
    /// Per-deploy options; the deployer's configuration applies when unset.
    pub options: Option<StackOptions>,
}

impl DeploySpec {
    /// Creates a spec without parameters.
    #[must_use]
    pub fn new(stack_name: impl Into<String>, template: TemplateReference) -> Self {
        Self {
            stack_name: stack_name.into(),
            template,
            parameters: ParameterPayload::Empty,
            options: None,
        }
    }

    /// Sets the parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: impl Into<ParameterPayload>) -> Self {
        self.parameters = parameters.into();
        self
    }

    /// Sets the per-deploy options.
    #[must_use]
    pub fn with_options(mut self, options: StackOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Deploys stacks against one control plane.
///
/// Operations share no mutable state; any number may run concurrently on
/// the same deployer.
pub struct StackDeployer {
    control_plane: Arc<dyn ControlPlane>,
    sink: Arc<dyn ProgressSink>,
    clock: Arc<dyn Clock>,
    config: DeployerConfig,
    resolver: TemplateResolver,
    normalizer: ParameterNormalizer,
    requests: StackRequestBuilder,
    cancel: Option<Arc<CancellationToken>>,
}

impl StackDeployer {
    /// Creates a deployer with a validated configuration.
    ///
    /// Progress is logged through `tracing` until [`Self::with_sink`]
    /// installs another sink.
    pub fn new(control_plane: Arc<dyn ControlPlane>, config: DeployerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: ParameterNormalizer::new(control_plane.clone()),
            control_plane,
            sink: Arc::new(LoggingProgressSink::default()),
            clock: Arc::new(SystemClock),
            config,
            resolver: TemplateResolver::default(),
            requests: StackRequestBuilder::new(),
            cancel: None,
        })
    }

    /// Resolves execution role names through `identity`.
    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.requests = StackRequestBuilder::with_identity(identity);
        self
    }

    /// Reports progress to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Reads operation start times from `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs template generators with `generator`.
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn TemplateGenerator>) -> Self {
        self.resolver = TemplateResolver::new(generator);
        self
    }

    /// Stops every polling loop of this deployer once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: Arc<CancellationToken>) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DeployerConfig {
        &self.config
    }

    /// Classifies a raw template argument using the configured generator
    /// extensions.
    #[must_use]
    pub fn template_reference(&self, raw: &str) -> TemplateReference {
        TemplateReference::parse(raw, &self.config.generator_extensions)
    }

    /// Creates the stack, or updates it if it already exists.
    pub async fn deploy(&self, spec: &DeploySpec) -> Result<PollOutcome> {
        if self.stack_exists(&spec.stack_name).await {
            self.update(spec).await
        } else {
            self.create(spec).await
        }
    }

    /// Creates a stack and follows it to completion.
    #[instrument(skip_all, fields(stack = %spec.stack_name))]
    pub async fn create(&self, spec: &DeploySpec) -> Result<PollOutcome> {
        let (operation, request) = self.prepare(spec, StackAction::Create).await?;

        info!(operation_id = %operation.operation_id(), "Creating stack");
        self.control_plane
            .create_stack(&request)
            .await
            .map_err(|e| StackpilotError::submission(&spec.stack_name, e))?;

        Ok(self.follow(operation).await)
    }

    /// Updates a stack and follows it to completion.
    ///
    /// An update that would not change the stack succeeds without polling.
    #[instrument(skip_all, fields(stack = %spec.stack_name))]
    pub async fn update(&self, spec: &DeploySpec) -> Result<PollOutcome> {
        let (operation, request) = self.prepare(spec, StackAction::Update).await?;

        info!(operation_id = %operation.operation_id(), "Updating stack");
        match self.control_plane.update_stack(&request).await {
            Ok(_) => Ok(self.follow(operation).await),
            Err(ControlPlaneError::NoUpdates) => {
                info!("No updates are to be performed");
                Ok(PollOutcome::Success)
            }
            Err(e) => Err(StackpilotError::submission(&spec.stack_name, e)),
        }
    }

    /// Deletes a stack and waits until it no longer exists.
    #[instrument(skip(self))]
    pub async fn delete(&self, stack_name: &str) -> Result<PollOutcome> {
        let operation = self.start_operation(stack_name, StackAction::Delete, &StackOptions::new());

        info!(operation_id = %operation.operation_id(), "Deleting stack");
        match self.control_plane.delete_stack(stack_name).await {
            Ok(()) => Ok(self.follow(operation).await),
            Err(e) if e.is_not_found() => {
                info!("Stack already deleted");
                Ok(PollOutcome::Success)
            }
            Err(e) => Err(StackpilotError::submission(stack_name, e)),
        }
    }

    /// Returns true if the stack exists in a deployable state.
    ///
    /// Any lookup error counts as "does not exist".
    pub async fn stack_exists(&self, stack_name: &str) -> bool {
        match self.control_plane.describe_stack(stack_name).await {
            Ok(description) => is_exists_status(&description.stack_status),
            Err(e) => {
                debug!(stack = stack_name, error = %e, "Stack lookup failed, treating as absent");
                false
            }
        }
    }

    /// Resolves a template and asks the control plane to validate it.
    pub async fn validate(
        &self,
        template: &TemplateReference,
        parameters: &ParameterPayload,
    ) -> Result<serde_json::Value> {
        let source = self.resolver.resolve(template, &parameters.to_value()).await?;
        Ok(self.control_plane.validate_template(&source).await?)
    }

    /// Returns all outputs of a stack.
    pub async fn outputs(&self, stack_name: &str) -> Result<BTreeMap<String, String>> {
        Ok(self.control_plane.describe_stack(stack_name).await?.outputs)
    }

    /// Returns one output of a stack, or an empty string if it is not set.
    pub async fn output(&self, stack_name: &str, key: &str) -> Result<String> {
        let mut outputs = self.outputs(stack_name).await?;
        Ok(outputs.remove(key).unwrap_or_default())
    }

    /// Deploys independent stacks concurrently.
    ///
    /// Results are returned in the order of `specs`.
    pub async fn deploy_all(&self, specs: &[DeploySpec]) -> Vec<Result<PollOutcome>> {
        info!(count = specs.len(), "Deploying stacks");
        join_all(specs.iter().map(|spec| self.deploy(spec))).await
    }

    /// Resolves and normalizes, then starts the operation and builds its request.
    async fn prepare(
        &self,
        spec: &DeploySpec,
        action: StackAction,
    ) -> Result<(StackOperation, StackRequest)> {
        let template = self
            .resolver
            .resolve(&spec.template, &spec.parameters.to_value())
            .await?;
        let parameters = self.normalizer.normalize(&template, &spec.parameters).await?;
        let operation = self.start_operation(&spec.stack_name, action, &self.options_for(spec));
        let request = self.requests.build(&operation, template, parameters).await;
        Ok((operation, request))
    }

    fn options_for(&self, spec: &DeploySpec) -> StackOptions {
        let mut options = spec.options.clone().unwrap_or_else(|| {
            StackOptions::new().with_capabilities(self.config.capabilities.iter().cloned())
        });
        if options.role_name.is_none() {
            options.role_name.clone_from(&self.config.role_name);
        }
        options
    }

    fn start_operation(
        &self,
        stack_name: &str,
        action: StackAction,
        options: &StackOptions,
    ) -> StackOperation {
        StackOperation::new(stack_name, action, self.clock.now())
            .with_poll_interval(self.config.poll_interval())
            .with_capabilities(options.capabilities.clone())
            .with_tags(options.tags.clone())
            .with_role_name(options.role_name.clone())
    }

    async fn follow(&self, operation: StackOperation) -> PollOutcome {
        if self.config.no_wait {
            info!(stack = operation.stack_name(), "Submitted, not waiting for completion");
            return PollOutcome::Success;
        }

        let poller = EventPoller::new(self.control_plane.clone(), self.sink.clone(), operation);
        let outcome = poller.run(self.cancel.clone()).await;
        if let PollOutcome::Failure(message) = &outcome {
            warn!(stack = poller.operation().stack_name(), "{message}");
        }
        outcome
    }
}

impl std::fmt::Debug for StackDeployer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackDeployer")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

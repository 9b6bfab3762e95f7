//! In-memory control plane and identity provider for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

use crate::client::{
    ControlPlane, EventPage, IdentityProvider, ParameterDeclaration, StackDescription, StackId,
};
use crate::errors::ControlPlaneError;
use crate::request::StackRequest;
use crate::template::TemplateSource;

type EventResponse = Result<EventPage, ControlPlaneError>;

/// A control plane that replays scripted responses and records calls.
///
/// Each `describe_stack_events` call pops the next scripted response; once
/// the script is exhausted the last response is repeated. With nothing
/// scripted it returns an empty final page.
#[derive(Debug)]
pub struct ScriptedControlPlane {
    event_script: Mutex<VecDeque<EventResponse>>,
    last_event_response: Mutex<Option<EventResponse>>,
    event_delay: Mutex<Option<Duration>>,
    event_calls: Mutex<Vec<Option<String>>>,
    create_result: Mutex<Result<StackId, ControlPlaneError>>,
    update_result: Mutex<Result<StackId, ControlPlaneError>>,
    delete_result: Mutex<Result<(), ControlPlaneError>>,
    parameters: Mutex<Result<Vec<ParameterDeclaration>, ControlPlaneError>>,
    description: Mutex<Option<StackDescription>>,
    validation: Mutex<Result<serde_json::Value, ControlPlaneError>>,
    submitted: Mutex<Vec<StackRequest>>,
    deleted: Mutex<Vec<String>>,
    templates: Mutex<Vec<TemplateSource>>,
}

impl Default for ScriptedControlPlane {
    fn default() -> Self {
        Self {
            event_script: Mutex::new(VecDeque::new()),
            last_event_response: Mutex::new(None),
            event_delay: Mutex::new(None),
            event_calls: Mutex::new(Vec::new()),
            create_result: Mutex::new(Ok("stack-id".to_string())),
            update_result: Mutex::new(Ok("stack-id".to_string())),
            delete_result: Mutex::new(Ok(())),
            parameters: Mutex::new(Ok(Vec::new())),
            description: Mutex::new(None),
            validation: Mutex::new(Ok(serde_json::Value::Object(serde_json::Map::new()))),
            submitted: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            templates: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedControlPlane {
    /// Creates a control plane with no scripted events and no stacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an event page.
    pub fn push_page(&self, page: EventPage) {
        self.event_script.lock().push_back(Ok(page));
    }

    /// Queues an event fetch error.
    pub fn push_event_error(&self, error: ControlPlaneError) {
        self.event_script.lock().push_back(Err(error));
    }

    /// Delays every event fetch by `delay`.
    pub fn set_event_delay(&self, delay: Duration) {
        *self.event_delay.lock() = Some(delay);
    }

    /// Sets the result of `create_stack`.
    pub fn set_create_result(&self, result: Result<StackId, ControlPlaneError>) {
        *self.create_result.lock() = result;
    }

    /// Sets the result of `update_stack`.
    pub fn set_update_result(&self, result: Result<StackId, ControlPlaneError>) {
        *self.update_result.lock() = result;
    }

    /// Sets the result of `delete_stack`.
    pub fn set_delete_result(&self, result: Result<(), ControlPlaneError>) {
        *self.delete_result.lock() = result;
    }

    /// Sets the declared template parameters.
    pub fn set_parameters(&self, declared: Vec<ParameterDeclaration>) {
        *self.parameters.lock() = Ok(declared);
    }

    /// Makes the parameter schema lookup fail.
    pub fn set_parameters_error(&self, error: ControlPlaneError) {
        *self.parameters.lock() = Err(error);
    }

    /// Sets the description returned for the stack; `None` means it does not exist.
    pub fn set_description(&self, description: Option<StackDescription>) {
        *self.description.lock() = description;
    }

    /// Sets the result of `validate_template`.
    pub fn set_validation(&self, result: Result<serde_json::Value, ControlPlaneError>) {
        *self.validation.lock() = result;
    }

    /// Returns the page tokens of every event fetch, in call order.
    #[must_use]
    pub fn event_calls(&self) -> Vec<Option<String>> {
        self.event_calls.lock().clone()
    }

    /// Returns the number of event fetches.
    #[must_use]
    pub fn event_call_count(&self) -> usize {
        self.event_calls.lock().len()
    }

    /// Returns every submitted create or update request.
    #[must_use]
    pub fn submitted(&self) -> Vec<StackRequest> {
        self.submitted.lock().clone()
    }

    /// Returns the names of deleted stacks.
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }

    /// Returns every template passed to schema or validation lookups.
    #[must_use]
    pub fn templates(&self) -> Vec<TemplateSource> {
        self.templates.lock().clone()
    }

    fn next_event_response(&self) -> EventResponse {
        let next = self.event_script.lock().pop_front();
        let mut last = self.last_event_response.lock();
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last.clone().unwrap_or_else(|| Ok(EventPage::default())),
        }
    }
}

#[async_trait]
impl ControlPlane for ScriptedControlPlane {
    async fn create_stack(&self, request: &StackRequest) -> Result<StackId, ControlPlaneError> {
        self.submitted.lock().push(request.clone());
        self.create_result.lock().clone()
    }

    async fn update_stack(&self, request: &StackRequest) -> Result<StackId, ControlPlaneError> {
        self.submitted.lock().push(request.clone());
        self.update_result.lock().clone()
    }

    async fn delete_stack(&self, stack_name: &str) -> Result<(), ControlPlaneError> {
        self.deleted.lock().push(stack_name.to_string());
        self.delete_result.lock().clone()
    }

    async fn describe_stack_events(
        &self,
        _stack_name: &str,
        page_token: Option<String>,
    ) -> Result<EventPage, ControlPlaneError> {
        self.event_calls.lock().push(page_token);
        let delay = *self.event_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.next_event_response()
    }

    async fn get_template_parameters(
        &self,
        template: &TemplateSource,
    ) -> Result<Vec<ParameterDeclaration>, ControlPlaneError> {
        self.templates.lock().push(template.clone());
        self.parameters.lock().clone()
    }

    async fn describe_stack(&self, stack_name: &str) -> Result<StackDescription, ControlPlaneError> {
        self.description
            .lock()
            .clone()
            .ok_or_else(|| ControlPlaneError::not_found(stack_name))
    }

    async fn validate_template(
        &self,
        template: &TemplateSource,
    ) -> Result<serde_json::Value, ControlPlaneError> {
        self.templates.lock().push(template.clone());
        self.validation.lock().clone()
    }
}

/// An identity provider with a fixed account id, or a fixed failure.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    account: Result<String, ControlPlaneError>,
}

impl StaticIdentity {
    /// Creates a provider returning `account_id`.
    #[must_use]
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account: Ok(account_id.into()),
        }
    }

    /// Creates a provider whose lookup always fails.
    #[must_use]
    pub fn failing(error: ControlPlaneError) -> Self {
        Self { account: Err(error) }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn account_id(&self) -> Result<String, ControlPlaneError> {
        self.account.clone()
    }
}

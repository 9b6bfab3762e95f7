//! # Stackpilot
//!
//! Deploys infrastructure stacks to an infrastructure-as-code control plane
//! and follows each operation's event stream to a single outcome.
//!
//! Stackpilot provides:
//!
//! - **Template resolution**: storage URLs, generator files, inline documents and template files
//! - **Parameter normalization**: user parameters reconciled against the template's declared schema
//! - **Event polling**: deduplicated, paginated, throttle-tolerant tracking of a stack operation
//! - **Progress reporting**: pluggable sinks for the events of a running operation
//! - **Cancellation handling**: cooperative stop of a running polling loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stackpilot::prelude::*;
//!
//! let deployer = StackDeployer::new(control_plane, DeployerConfig::new().from_env()?)?
//!     .with_identity(identity);
//!
//! let template = deployer.template_reference("templates/bucket.yaml");
//! let spec = DeploySpec::new("demo", template).with_parameters(r#"{"BucketName": "demo"}"#);
//!
//! match deployer.deploy(&spec).await? {
//!     PollOutcome::Success => println!("done"),
//!     PollOutcome::Failure(message) => eprintln!("{message}"),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod client;
pub mod config;
pub mod core;
pub mod deployer;
pub mod errors;
pub mod events;
pub mod observability;
pub mod parameters;
pub mod poller;
pub mod request;
pub mod template;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::client::{
        ControlPlane, EventPage, IdentityProvider, ParameterDeclaration, StackDescription,
    };
    pub use crate::config::DeployerConfig;
    pub use crate::core::{PollOutcome, StackAction, StackEvent, StackOperation};
    pub use crate::deployer::{DeploySpec, StackDeployer};
    pub use crate::errors::{
        ControlPlaneError, ParameterSchemaFetchError, StackpilotError, TemplateResolutionError,
    };
    pub use crate::events::{
        CollectingProgressSink, LoggingProgressSink, NoOpProgressSink, ProgressLine, ProgressSink,
    };
    pub use crate::parameters::{Parameter, ParameterNormalizer, ParameterPayload};
    pub use crate::poller::{EventPoller, PollState, RoundResult};
    pub use crate::request::{StackOptions, StackRequest, StackRequestBuilder};
    pub use crate::template::{TemplateReference, TemplateResolver, TemplateSource};
    pub use crate::utils::{Clock, SystemClock, Timestamp};
}

//! Log subscriber setup.
//!
//! The library only emits `tracing` events and spans; binaries embedding it
//! call [`init_tracing`] once at startup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::StackpilotError;

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Builds the event filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a global fmt subscriber.
///
/// With `json` set, each event is written as one JSON object per line.
/// Fails if a global subscriber is already installed.
pub fn init_tracing(json: bool) -> Result<(), StackpilotError> {
    let registry = tracing_subscriber::registry().with(env_filter());
    let result = if json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    result.map_err(|e| StackpilotError::Configuration(format!("tracing already initialized: {e}")))
}

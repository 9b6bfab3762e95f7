//! Deployer configuration.
//!
//! Configuration is an explicit value handed to each
//! [`crate::deployer::StackDeployer`]; nothing here is process-global, so
//! concurrent deployers never share a mutable default.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::StackpilotError;

/// Default interval between event polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Environment variable overriding the poll interval in milliseconds.
pub const ENV_POLL_INTERVAL_MS: &str = "STACKPILOT_POLL_INTERVAL_MS";
/// Environment variable overriding the default capabilities (comma separated).
pub const ENV_CAPABILITIES: &str = "STACKPILOT_CAPABILITIES";
/// Environment variable naming the execution role.
pub const ENV_ROLE_NAME: &str = "STACKPILOT_ROLE_NAME";
/// Environment variable enabling fire-and-forget submissions.
pub const ENV_NO_WAIT: &str = "STACKPILOT_NO_WAIT";

/// Configuration shared by all operations of one deployer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployerConfig {
    /// Interval between event polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Capabilities sent when a deploy does not name its own.
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
    /// File extensions treated as template generators.
    #[serde(default = "default_generator_extensions")]
    pub generator_extensions: Vec<String>,
    /// Execution role name used when a deploy does not name its own.
    #[serde(default)]
    pub role_name: Option<String>,
    /// Return right after submission instead of polling to completion.
    #[serde(default)]
    pub no_wait: bool,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_capabilities() -> Vec<String> {
    vec!["CAPABILITY_IAM".to_string(), "CAPABILITY_NAMED_IAM".to_string()]
}

fn default_generator_extensions() -> Vec<String> {
    vec!["gen".to_string(), "sh".to_string()]
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            capabilities: default_capabilities(),
            generator_extensions: default_generator_extensions(),
            role_name: None,
            no_wait: false,
        }
    }
}

impl DeployerConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the default capabilities.
    #[must_use]
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the generator extensions.
    #[must_use]
    pub fn with_generator_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generator_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the default execution role name.
    #[must_use]
    pub fn with_role_name(mut self, role_name: impl Into<String>) -> Self {
        self.role_name = Some(role_name.into());
        self
    }

    /// Enables or disables waiting for completion.
    #[must_use]
    pub fn with_no_wait(mut self, no_wait: bool) -> Self {
        self.no_wait = no_wait;
        self
    }

    /// Gets the poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Overlays `STACKPILOT_*` environment variables onto this configuration.
    pub fn from_env(self) -> Result<Self, StackpilotError> {
        self.overlay(|key| std::env::var(key).ok())
    }

    fn overlay<F>(mut self, lookup: F) -> Result<Self, StackpilotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = raw.trim().parse().map_err(|_| {
                StackpilotError::Configuration(format!("{ENV_POLL_INTERVAL_MS} must be an integer, got '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup(ENV_CAPABILITIES) {
            self.capabilities = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(raw) = lookup(ENV_ROLE_NAME) {
            self.role_name = Some(raw).filter(|r| !r.is_empty());
        }
        if let Some(raw) = lookup(ENV_NO_WAIT) {
            self.no_wait = matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks the configuration for values that would stall or spin polling.
    pub fn validate(&self) -> Result<(), StackpilotError> {
        if self.poll_interval_ms == 0 {
            return Err(StackpilotError::Configuration(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.generator_extensions.iter().any(String::is_empty) {
            return Err(StackpilotError::Configuration(
                "generator extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

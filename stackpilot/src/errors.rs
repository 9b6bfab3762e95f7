//! Error types for stackpilot.
//!
//! Resolution-phase errors (`TemplateResolutionError`,
//! `ParameterSchemaFetchError`) abort an operation before anything is sent to
//! the control plane. Terminal stack failures observed while polling are not
//! errors; they are reported as [`crate::core::PollOutcome::Failure`].

use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// The main error type for stackpilot operations.
#[derive(Debug, Error)]
pub enum StackpilotError {
    /// The template reference could not be turned into a request body.
    #[error("{0}")]
    TemplateResolution(#[from] TemplateResolutionError),

    /// The declared parameter schema could not be fetched.
    #[error("{0}")]
    ParameterSchema(#[from] ParameterSchemaFetchError),

    /// The control plane rejected the create/update/delete request.
    #[error("Stack submission failed for '{stack}': {source}")]
    Submission {
        /// The stack name.
        stack: String,
        /// The underlying control plane error.
        #[source]
        source: ControlPlaneError,
    },

    /// A read-only control plane call failed.
    #[error("{0}")]
    ControlPlane(#[from] ControlPlaneError),

    /// The configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StackpilotError {
    /// Creates a submission error.
    #[must_use]
    pub fn submission(stack: impl Into<String>, source: ControlPlaneError) -> Self {
        Self::Submission {
            stack: stack.into(),
            source,
        }
    }
}

/// Error raised when a template reference cannot be resolved.
#[derive(Debug, Error)]
pub enum TemplateResolutionError {
    /// The template file could not be read.
    #[error("Failed to read template '{}': {source}", path.display())]
    Read {
        /// The template path.
        path: PathBuf,
        /// The IO error.
        #[source]
        source: std::io::Error,
    },

    /// The generator could not be started or exited unsuccessfully.
    #[error("Template generator '{}' failed: {reason}", path.display())]
    Generator {
        /// The generator path.
        path: PathBuf,
        /// Why the generator failed.
        reason: String,
    },

    /// The generator produced (or exported) something that is not structured data.
    #[error("Template generator '{}' produced invalid output: {reason}", path.display())]
    InvalidOutput {
        /// The generator path.
        path: PathBuf,
        /// The parse error.
        reason: String,
    },

    /// A structured template could not be serialized.
    #[error("Failed to serialize template: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl TemplateResolutionError {
    /// Creates a generator failure.
    #[must_use]
    pub fn generator(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Generator {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid-output failure.
    #[must_use]
    pub fn invalid_output(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidOutput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised when the template's declared parameters cannot be fetched.
#[derive(Debug, Error)]
#[error("Failed to fetch template parameter schema: {source}")]
pub struct ParameterSchemaFetchError {
    /// The underlying control plane error.
    #[source]
    pub source: ControlPlaneError,
}

impl From<ControlPlaneError> for ParameterSchemaFetchError {
    fn from(source: ControlPlaneError) -> Self {
        Self { source }
    }
}

/// Errors returned by a [`crate::client::ControlPlane`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    /// The stack does not exist (the normal end of a delete).
    #[error("Stack [{stack}] does not exist")]
    StackNotFound {
        /// The stack name.
        stack: String,
    },

    /// The API rejected the call because of rate limiting.
    #[error("Rate exceeded")]
    Throttled,

    /// An update was submitted that would not change the stack.
    #[error("No updates are to be performed.")]
    NoUpdates,

    /// The request was rejected as invalid.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other failure.
    #[error("{0}")]
    Transport(String),
}

fn not_exists_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Stack\s+(?:with id\s+)?\[?([^\]\s]+)\]?\s+does not exist")
            .unwrap_or_else(|e| unreachable!("static pattern: {e}"))
    })
}

fn throttling_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Throttling|Rate\s+exceeded")
            .unwrap_or_else(|e| unreachable!("static pattern: {e}"))
    })
}

impl ControlPlaneError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a stack-not-found error.
    #[must_use]
    pub fn not_found(stack: impl Into<String>) -> Self {
        Self::StackNotFound {
            stack: stack.into(),
        }
    }

    /// Maps a raw provider error message onto the error taxonomy.
    ///
    /// For clients that only surface message text, e.g.
    /// `"ValidationError: Stack [demo] does not exist"` or
    /// `"Throttling: Rate exceeded"`.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        if let Some(caps) = not_exists_pattern().captures(message) {
            return Self::not_found(&caps[1]);
        }
        if throttling_pattern().is_match(message) {
            return Self::Throttled;
        }
        if message.contains("No updates are to be performed") {
            return Self::NoUpdates;
        }
        if let Some(rest) = message.strip_prefix("ValidationError:") {
            return Self::Validation(rest.trim().to_string());
        }
        Self::transport(message)
    }

    /// Returns true for rate-limit rejections.
    #[must_use]
    pub const fn is_throttling(&self) -> bool {
        matches!(self, Self::Throttled)
    }

    /// Returns true when the stack is gone.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::StackNotFound { .. })
    }
}

/// Convenience alias for stackpilot results.
pub type Result<T, E = StackpilotError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_not_exists() {
        let err = ControlPlaneError::classify("ValidationError: Stack [demo] does not exist");
        assert_eq!(err, ControlPlaneError::not_found("demo"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_classify_not_exists_with_id() {
        let err = ControlPlaneError::classify("ValidationError: Stack with id demo does not exist");
        assert_eq!(err, ControlPlaneError::not_found("demo"));
    }

    #[test]
    fn test_classify_throttling() {
        let err = ControlPlaneError::classify("Throttling: Rate exceeded");
        assert!(err.is_throttling());
    }

    #[test]
    fn test_classify_no_updates() {
        let err = ControlPlaneError::classify("ValidationError: No updates are to be performed.");
        assert_eq!(err, ControlPlaneError::NoUpdates);
    }

    #[test]
    fn test_classify_validation_and_transport() {
        assert_eq!(
            ControlPlaneError::classify("ValidationError: Template format error"),
            ControlPlaneError::Validation("Template format error".to_string())
        );
        assert_eq!(
            ControlPlaneError::classify("connection reset"),
            ControlPlaneError::transport("connection reset")
        );
    }

    #[test]
    fn test_submission_error_message() {
        let err = StackpilotError::submission("demo", ControlPlaneError::transport("boom"));
        assert_eq!(err.to_string(), "Stack submission failed for 'demo': boom");
    }

    #[test]
    fn test_schema_error_from_control_plane() {
        let err: ParameterSchemaFetchError = ControlPlaneError::Throttled.into();
        assert!(err.to_string().contains("Rate exceeded"));
    }
}

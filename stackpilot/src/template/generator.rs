//! Template generators: files that produce a template from the parameter context.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::TemplateResolutionError;
use crate::utils::parse_structured;

/// Produces a template value from a generator file.
#[async_trait]
pub trait TemplateGenerator: Send + Sync {
    /// Generates the template for `context` (the raw parameter payload).
    async fn generate(&self, path: &Path, context: &Value) -> Result<Value, TemplateResolutionError>;
}

/// Runs executable generators as child processes.
///
/// An executable file is spawned with the context as JSON on stdin; its
/// stdout (JSON or YAML) is the template. A file without execute permission
/// is not callable, so its contents are parsed and used as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessGenerator;

impl ProcessGenerator {
    /// Creates a new process generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn run(path: &Path, context: &Value) -> Result<String, TemplateResolutionError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TemplateResolutionError::generator(path, e.to_string()))?;

        // Feed stdin while collecting output; a generator may exit without
        // reading its input, or fill stdout before it does.
        let input = serde_json::to_vec(context)?;
        let stdin = child.stdin.take();
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(&input).await {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            }
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| TemplateResolutionError::generator(path, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TemplateResolutionError::generator(
                path,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        fed.map_err(|e| TemplateResolutionError::generator(path, e.to_string()))?;

        String::from_utf8(output.stdout)
            .map_err(|e| TemplateResolutionError::invalid_output(path, e.to_string()))
    }
}

#[async_trait]
impl TemplateGenerator for ProcessGenerator {
    async fn generate(&self, path: &Path, context: &Value) -> Result<Value, TemplateResolutionError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| TemplateResolutionError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let text = if is_executable(&metadata) {
            debug!(generator = %path.display(), "Running template generator");
            Self::run(path, context).await?
        } else {
            debug!(generator = %path.display(), "Generator is not executable, using its contents");
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| TemplateResolutionError::Read {
                    path: path.to_path_buf(),
                    source,
                })?
        };

        let value = parse_structured(&text).map_err(|e| TemplateResolutionError::invalid_output(path, e))?;
        if value.is_object() {
            Ok(value)
        } else {
            Err(TemplateResolutionError::invalid_output(path, "expected a mapping"))
        }
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    false
}

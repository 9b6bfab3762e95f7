//! Turns a [`TemplateReference`] into a [`TemplateSource`].

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{ProcessGenerator, TemplateGenerator, TemplateReference, TemplateSource};
use crate::errors::TemplateResolutionError;

/// Resolves template references into request-ready template sources.
#[derive(Clone)]
pub struct TemplateResolver {
    generator: Arc<dyn TemplateGenerator>,
}

impl Default for TemplateResolver {
    fn default() -> Self {
        Self::new(Arc::new(ProcessGenerator::new()))
    }
}

impl TemplateResolver {
    /// Creates a resolver that runs generators with `generator`.
    #[must_use]
    pub fn new(generator: Arc<dyn TemplateGenerator>) -> Self {
        Self { generator }
    }

    /// Resolves `reference`; `context` is handed to template generators.
    ///
    /// Storage URLs are passed through without any local read. Read and
    /// parse failures are fatal for the operation.
    #[instrument(skip_all, fields(kind = reference.kind()))]
    pub async fn resolve(
        &self,
        reference: &TemplateReference,
        context: &Value,
    ) -> Result<TemplateSource, TemplateResolutionError> {
        let source = match reference {
            TemplateReference::Uri(url) => TemplateSource::Url(url.clone()),
            TemplateReference::Generator(path) => {
                let value = self.generator.generate(path, context).await?;
                TemplateSource::Body(serde_json::to_string(&value)?)
            }
            TemplateReference::Inline(value) => TemplateSource::Body(serde_json::to_string(value)?),
            TemplateReference::Text(text) => TemplateSource::Body(text.clone()),
            TemplateReference::Path(path) => {
                let body = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| TemplateResolutionError::Read {
                        path: path.clone(),
                        source,
                    })?;
                TemplateSource::Body(body)
            }
        };

        debug!(
            body_len = source.body().map(str::len),
            url = source.url(),
            "Template resolved"
        );
        Ok(source)
    }
}

impl std::fmt::Debug for TemplateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    #[derive(Debug)]
    struct EchoGenerator;

    #[async_trait]
    impl TemplateGenerator for EchoGenerator {
        async fn generate(&self, _path: &Path, context: &Value) -> Result<Value, TemplateResolutionError> {
            Ok(serde_json::json!({ "Parameters": context }))
        }
    }

    #[tokio::test]
    async fn test_inline_object_round_trip() {
        let template = serde_json::json!({
            "AWSTemplateFormatVersion": "2010-09-09",
            "Resources": {"Bucket": {"Type": "AWS::S3::Bucket", "Properties": {"Tags": [1, 2]}}}
        });
        let source = TemplateResolver::default()
            .resolve(&TemplateReference::inline(template.clone()), &Value::Null)
            .await
            .unwrap();

        let reparsed: Value = serde_json::from_str(source.body().unwrap()).unwrap();
        assert_eq!(reparsed, template);
    }

    #[tokio::test]
    async fn test_uri_passthrough() {
        let url = "https://s3.amazonaws.com/bucket/stack.json";
        let source = TemplateResolver::default()
            .resolve(&TemplateReference::Uri(url.to_string()), &Value::Null)
            .await
            .unwrap();
        assert_eq!(source, TemplateSource::Url(url.to_string()));
    }

    #[tokio::test]
    async fn test_text_verbatim() {
        let yaml = "Resources:\n  Q:\n    Type: AWS::SQS::Queue\n";
        let source = TemplateResolver::default()
            .resolve(&TemplateReference::Text(yaml.to_string()), &Value::Null)
            .await
            .unwrap();
        assert_eq!(source.body(), Some(yaml));
    }

    #[tokio::test]
    async fn test_path_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Resources: {{}}").unwrap();

        let source = TemplateResolver::default()
            .resolve(&TemplateReference::Path(file.path().to_path_buf()), &Value::Null)
            .await
            .unwrap();
        assert_eq!(source.body(), Some("Resources: {}"));
    }

    #[tokio::test]
    async fn test_missing_path_is_resolution_error() {
        let err = TemplateResolver::default()
            .resolve(&TemplateReference::Path(PathBuf::from("/no/such/stack.yml")), &Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateResolutionError::Read { .. }));
    }

    #[tokio::test]
    async fn test_generator_gets_context() {
        let resolver = TemplateResolver::new(Arc::new(EchoGenerator));
        let context = serde_json::json!({"Env": "dev"});
        let source = resolver
            .resolve(&TemplateReference::Generator(PathBuf::from("x.gen")), &context)
            .await
            .unwrap();

        let body: Value = serde_json::from_str(source.body().unwrap()).unwrap();
        assert_eq!(body["Parameters"]["Env"], "dev");
    }
}

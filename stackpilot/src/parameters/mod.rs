//! Parameter normalization.
//!
//! Reconciles user-supplied parameter values with the parameters a template
//! actually declares. Keys match case-insensitively; the output follows the
//! template's declaration order and casing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::client::{ControlPlane, ParameterDeclaration};
use crate::errors::ParameterSchemaFetchError;
use crate::template::TemplateSource;
use crate::utils::parse_structured;

/// Raw parameter input as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParameterPayload {
    /// No parameters.
    #[default]
    Empty,
    /// Already-structured parameters, normally an object.
    Structured(Value),
    /// JSON or YAML text, e.g. the contents of a parameter file.
    Text(String),
}

impl ParameterPayload {
    /// Returns the payload as structured data.
    ///
    /// Text that does not parse yields `Value::Null`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Structured(value) => value.clone(),
            Self::Text(text) => parse_structured(text).unwrap_or(Value::Null),
        }
    }

    /// Returns the user's values keyed by lower-cased parameter key.
    ///
    /// Anything other than a non-empty object is an empty set.
    #[must_use]
    pub fn user_values(&self) -> HashMap<String, String> {
        match self.to_value() {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), coerce_to_string(&v)))
                .collect(),
            _ => HashMap::new(),
        }
    }
}

impl From<Value> for ParameterPayload {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl From<String> for ParameterPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ParameterPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Converts a parameter value into the string form used on the wire.
#[must_use]
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(coerce_to_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// A parameter in a stack request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    /// Parameter key in the template's casing.
    pub parameter_key: String,
    /// Parameter value; absent means the control plane applies its own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_value: Option<String>,
}

impl Parameter {
    /// Creates a parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            parameter_key: key.into(),
            parameter_value: value,
        }
    }
}

/// Reconciles user values against declarations, in declaration order.
///
/// For each declared key: the user's value, else the declared default, else
/// no value. Undeclared user keys are dropped.
#[must_use]
pub fn reconcile(declared: &[ParameterDeclaration], user_values: &HashMap<String, String>) -> Vec<Parameter> {
    declared
        .iter()
        .map(|decl| {
            let value = user_values
                .get(&decl.parameter_key.to_lowercase())
                .cloned()
                .or_else(|| decl.default_value.clone());
            Parameter::new(decl.parameter_key.clone(), value)
        })
        .collect()
}

/// Normalizes parameters against a template's declared schema.
#[derive(Clone)]
pub struct ParameterNormalizer {
    control_plane: Arc<dyn ControlPlane>,
}

impl ParameterNormalizer {
    /// Creates a normalizer that reads schemas from `control_plane`.
    #[must_use]
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    /// Produces the ordered parameter list for `template`.
    #[instrument(skip_all)]
    pub async fn normalize(
        &self,
        template: &TemplateSource,
        payload: &ParameterPayload,
    ) -> Result<Vec<Parameter>, ParameterSchemaFetchError> {
        let user_values = payload.user_values();
        let declared = self.control_plane.get_template_parameters(template).await?;

        for key in user_values.keys() {
            if !declared.iter().any(|d| d.parameter_key.to_lowercase() == *key) {
                debug!(parameter = %key, "Dropping parameter not declared by template");
            }
        }

        let parameters = reconcile(&declared, &user_values);
        debug!(declared = declared.len(), supplied = user_values.len(), "Parameters normalized");
        Ok(parameters)
    }
}

impl std::fmt::Debug for ParameterNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterNormalizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockControlPlane;
    use crate::errors::ControlPlaneError;
    use pretty_assertions::assert_eq;

    fn body() -> TemplateSource {
        TemplateSource::Body("{}".to_string())
    }

    #[tokio::test]
    async fn test_demo_scenario() {
        let mut control_plane = MockControlPlane::new();
        control_plane.expect_get_template_parameters().times(1).returning(|_| {
            Ok(vec![
                ParameterDeclaration::required("ImageId"),
                ParameterDeclaration::with_default("VpcId", "vpc-1"),
            ])
        });

        let normalizer = ParameterNormalizer::new(Arc::new(control_plane));
        let payload = ParameterPayload::from(serde_json::json!({"imageid": "ami-9"}));
        let params = normalizer.normalize(&body(), &payload).await.unwrap();

        assert_eq!(
            params,
            vec![
                Parameter::new("ImageId", Some("ami-9".to_string())),
                Parameter::new("VpcId", Some("vpc-1".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_schema_failure_is_fatal() {
        let mut control_plane = MockControlPlane::new();
        control_plane
            .expect_get_template_parameters()
            .returning(|_| Err(ControlPlaneError::transport("access denied")));

        let normalizer = ParameterNormalizer::new(Arc::new(control_plane));
        let err = normalizer
            .normalize(&body(), &ParameterPayload::Empty)
            .await
            .unwrap_err();

        assert_eq!(err.source, ControlPlaneError::transport("access denied"));
    }

    #[test]
    fn test_missing_without_default_is_omitted() {
        let declared = vec![ParameterDeclaration::required("KeyName")];
        let params = reconcile(&declared, &HashMap::new());
        assert_eq!(params, vec![Parameter::new("KeyName", None)]);

        let json = serde_json::to_value(&params[0]).unwrap();
        assert_eq!(json, serde_json::json!({"ParameterKey": "KeyName"}));
    }

    #[test]
    fn test_undeclared_keys_dropped() {
        let declared = vec![ParameterDeclaration::required("Env")];
        let user: HashMap<String, String> = [("env", "prod"), ("unused", "x")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let params = reconcile(&declared, &user);
        assert_eq!(params, vec![Parameter::new("Env", Some("prod".to_string()))]);
    }

    #[test]
    fn test_text_payload_yaml_and_coercion() {
        let payload = ParameterPayload::from("Port: 8080\nDebug: true\nSubnets:\n  - a\n  - b\n");
        let values = payload.user_values();

        assert_eq!(values.get("port").map(String::as_str), Some("8080"));
        assert_eq!(values.get("debug").map(String::as_str), Some("true"));
        assert_eq!(values.get("subnets").map(String::as_str), Some("a,b"));
    }

    #[test]
    fn test_unparseable_or_non_object_payload_is_empty() {
        assert!(ParameterPayload::from("key: [unclosed\n").user_values().is_empty());
        assert!(ParameterPayload::from("just a string").user_values().is_empty());
        assert!(ParameterPayload::from(serde_json::json!([1, 2])).user_values().is_empty());
        assert!(ParameterPayload::from(serde_json::json!({})).user_values().is_empty());
        assert!(ParameterPayload::Empty.user_values().is_empty());
    }

    #[test]
    fn test_user_value_beats_default() {
        let declared = vec![ParameterDeclaration::with_default("VpcId", "vpc-1")];
        let user: HashMap<String, String> = [("vpcid".to_string(), "vpc-2".to_string())].into_iter().collect();
        assert_eq!(
            reconcile(&declared, &user),
            vec![Parameter::new("VpcId", Some("vpc-2".to_string()))]
        );
    }
}

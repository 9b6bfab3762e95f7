//! Detection and parsing of JSON/YAML text.

use serde_json::Value;

/// Parses text as JSON, falling back to YAML.
pub fn parse_structured(text: &str) -> Result<Value, String> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str(text)
            .map_err(|yaml_err| format!("not JSON ({json_err}) and not YAML ({yaml_err})")),
    }
}

/// Returns true if the text parses as JSON.
#[must_use]
pub fn is_json_text(text: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()
}

/// Returns true if the text parses as YAML and spans more than one line.
///
/// A single line such as `template.yml` is valid YAML (a scalar), so one-line
/// input is never taken as an inline document.
#[must_use]
pub fn is_multiline_yaml_text(text: &str) -> bool {
    text.contains(['\n', '\r']) && serde_yaml::from_str::<serde_yaml::Value>(text).is_ok()
}

/// Returns true if the text is an inline JSON or YAML document.
#[must_use]
pub fn is_inline_document(text: &str) -> bool {
    is_json_text(text) || is_multiline_yaml_text(text)
}

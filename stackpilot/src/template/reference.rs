//! Template references and request-ready template sources.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::utils::is_inline_document;

fn remote_storage_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"https://s3.+amazonaws\.com").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
    })
}

/// Where a template comes from.
///
/// Raw user input is classified once by [`TemplateReference::parse`]; the
/// resolver then matches on the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateReference {
    /// A template hosted in provider object storage; passed by URL.
    Uri(String),
    /// An executable (or static) template generator file.
    Generator(PathBuf),
    /// An already-structured template.
    Inline(serde_json::Value),
    /// Inline JSON or YAML text.
    Text(String),
    /// A template file on disk.
    Path(PathBuf),
}

impl TemplateReference {
    /// Classifies a raw template argument.
    ///
    /// Order matters: a storage URL wins over everything, a generator
    /// extension wins over inline text, and anything that is not an inline
    /// document is taken as a file path.
    #[must_use]
    pub fn parse(raw: &str, generator_extensions: &[String]) -> Self {
        if remote_storage_pattern().is_match(raw) {
            return Self::Uri(raw.to_string());
        }
        if has_generator_extension(raw, generator_extensions) {
            return Self::Generator(PathBuf::from(raw));
        }
        if is_inline_document(raw) {
            return Self::Text(raw.to_string());
        }
        Self::Path(PathBuf::from(raw))
    }

    /// Wraps an already-structured template.
    #[must_use]
    pub const fn inline(value: serde_json::Value) -> Self {
        Self::Inline(value)
    }

    /// Returns a short description for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Uri(_) => "uri",
            Self::Generator(_) => "generator",
            Self::Inline(_) => "inline",
            Self::Text(_) => "text",
            Self::Path(_) => "path",
        }
    }
}

impl From<serde_json::Value> for TemplateReference {
    fn from(value: serde_json::Value) -> Self {
        Self::Inline(value)
    }
}

fn has_generator_extension(raw: &str, extensions: &[String]) -> bool {
    Path::new(raw)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.trim_start_matches('.') == ext))
}

/// A request-ready template: either the body itself or a storage URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSource {
    /// Inline template body.
    #[serde(rename = "TemplateBody")]
    Body(String),
    /// URL of a template in provider object storage.
    #[serde(rename = "TemplateURL")]
    Url(String),
}

impl TemplateSource {
    /// Returns the inline body, if this is one.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Body(body) => Some(body),
            Self::Url(_) => None,
        }
    }

    /// Returns the storage URL, if this is one.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Body(_) => None,
            Self::Url(url) => Some(url),
        }
    }
}

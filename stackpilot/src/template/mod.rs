//! Template resolution.
//!
//! This module provides:
//! - `TemplateReference`, the classified form of a user's template argument
//! - `TemplateSource`, the body or URL placed in a stack request
//! - `TemplateResolver` and the `TemplateGenerator` seam for generator files

mod generator;
mod reference;
mod resolver;

pub use generator::{ProcessGenerator, TemplateGenerator};
pub use reference::{TemplateReference, TemplateSource};
pub use resolver::TemplateResolver;

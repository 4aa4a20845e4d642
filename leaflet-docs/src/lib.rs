//! Leaflet Docs - model-assisted analysis and documentation output
//!
//! Takes the inventory of a project, asks a language model to describe it and
//! renders the result as JSON, Markdown, HTML and a set of Markdown templates.

pub mod ai;
pub mod gemini;
pub mod generator;
pub mod prompts;
pub mod render;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use ai::{AnalyzerProvider, GeminiProvider, SemanticAnalyzer};
pub use gemini::GeminiClient;
pub use generator::DocumentationGenerator;
pub use prompts::{build_analysis_prompt, build_documentation_prompt, parse_analysis_response};
pub use render::{markdown_to_html, render_html_page};
pub use templates::format_directory_tree;
pub use types::*;

//! Prompt construction and model response parsing

use crate::types::{AiInsights, ProjectAnalysis};
use leaflet_core::{DocumentationConfig, LeafletError, LeafletResult};
use leaflet_inventory::FileStructure;
use serde::Serialize;
use tracing::{debug, warn};

fn pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        warn!(error = %e, "Could not serialize prompt context");
        "{}".to_string()
    })
}

const ANALYSIS_SCHEMA: &str = r#"{
  "projectName": "string",
  "description": "detailed description of what this project does",
  "technology": ["technologies and frameworks used"],
  "entryPoints": ["main entry points of the application"],
  "dependencies": [
    {
      "name": "dependency name",
      "version": "version string",
      "type": "production|development|peer",
      "description": "what this dependency is used for"
    }
  ],
  "documentation": [
    {
      "type": "readme|api|setup|contributing|inline",
      "title": "section title",
      "content": "detailed content for this section",
      "priority": 1,
      "files": ["relevant files"]
    }
  ]
}"#;

/// Prompt asking the model for a JSON description of the project
pub fn build_analysis_prompt(structure: &FileStructure, source_sample: &str) -> String {
    format!(
        "You are an expert software engineer reviewing a codebase. Study the project \
structure and the source sample below and answer with a single JSON object and nothing else.

Project structure:
{structure}

Source sample:
{source_sample}

The JSON object must have this shape (priority ranges from 1, most important, to 5):
{ANALYSIS_SCHEMA}

Answer with the JSON object only. No markdown fences, no commentary.
",
        structure = pretty_json(structure),
    )
}

/// Prompt asking the model for prose documentation of an analyzed project
pub fn build_documentation_prompt(
    analysis: &ProjectAnalysis,
    config: &DocumentationConfig,
) -> String {
    let mut focus = vec![
        "what the project does and why it exists",
        "installation and setup",
        "usage examples",
        "project layout and architecture",
        "how to contribute",
    ];
    if config.include_api_docs {
        focus.insert(2, "the public API and its key functions");
    }
    if config.include_setup_guide {
        focus.push("a step-by-step setup guide including configuration");
    }
    if config.include_inline {
        focus.push("suggested inline comments for the most important code");
    }
    let focus = focus
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Write Markdown documentation for the project described by this analysis.

Project analysis:
{analysis}

Cover:
{focus}

Write in a {tone} tone with a {verbosity} level of detail.
",
        analysis = pretty_json(analysis),
        tone = config.tone,
        verbosity = config.verbosity,
    )
}

/// Pull the JSON object out of a model reply.
///
/// Markdown fences are stripped and everything between the first `{` and the
/// last `}` is parsed.
pub fn parse_analysis_response(response: &str) -> LeafletResult<AiInsights> {
    let mut cleaned = response.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = cleaned.strip_prefix(fence) {
            cleaned = rest.trim_start();
            cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim_end();
            break;
        }
    }

    let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) else {
        debug!(response = %truncate(response, 500), "Model reply without JSON");
        return Err(LeafletError::ai("No JSON found in model response", None));
    };
    if end < start {
        return Err(LeafletError::ai("No JSON found in model response", None));
    }

    serde_json::from_str(&cleaned[start..=end]).map_err(|e| {
        debug!(response = %truncate(response, 500), "Unparseable model reply");
        LeafletError::ai(format!("Failed to parse model response: {e}"), None)
    })
}

fn truncate(text: &str, max: usize) -> &str {
    let mut end = max.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

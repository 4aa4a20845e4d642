//! Source sampling for model prompts
//!
//! Concatenates source files, each behind a `// File:` header, until a byte
//! budget on file content is used up. Headers do not count toward the budget.

use crate::model::{relative_path, ScanWarning};
use leaflet_core::CODE_EXTENSIONS;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether `path` has one of the recognised source-code extensions
pub fn is_code_file(path: &Path) -> bool {
    let key = crate::stats::extension_key(path);
    !key.is_empty() && CODE_EXTENSIONS.contains(&key.as_str())
}

/// One file included in a sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampledFile {
    pub relative_path: String,
    pub bytes: usize,
    pub partial: bool,
}

/// Result of sampling a set of files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSample {
    pub text: String,
    /// File content bytes in `text`, never more than the budget
    pub content_bytes: usize,
    pub files: Vec<SampledFile>,
    /// Whether a file had to be cut short
    pub truncated: bool,
    #[serde(skip)]
    pub warnings: Vec<ScanWarning>,
}

impl SourceSample {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

fn floor_char_boundary(text: &str, max: usize) -> usize {
    let mut end = max.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Builds budgeted source samples relative to a project root
#[derive(Debug, Clone)]
pub struct SourceSampler {
    root: PathBuf,
    budget: usize,
}

impl SourceSampler {
    pub fn new(root: impl Into<PathBuf>, budget: usize) -> Self {
        Self {
            root: root.into(),
            budget,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Sample `files` in the given order.
    ///
    /// Files are read one at a time and reading stops as soon as the budget is
    /// reached, so nothing past the cut-off is ever opened. Unreadable files
    /// are skipped.
    pub async fn sample(&self, files: &[PathBuf]) -> SourceSample {
        let mut sample = SourceSample::default();

        for path in files {
            if sample.content_bytes >= self.budget {
                break;
            }

            let content = match tokio::fs::read_to_string(path).await {
                Ok(content) => content,
                Err(e) => {
                    sample.warnings.push(ScanWarning::unreadable(path, e));
                    continue;
                }
            };

            let display = relative_path(&self.root, path)
                .unwrap_or_else(|| path.display().to_string());
            let remaining = self.budget - sample.content_bytes;

            if content.len() <= remaining {
                sample.text.push_str(&format!("\n// File: {display}\n"));
                sample.text.push_str(&content);
                sample.content_bytes += content.len();
                sample.files.push(SampledFile {
                    relative_path: display,
                    bytes: content.len(),
                    partial: false,
                });
            } else {
                let end = floor_char_boundary(&content, remaining);
                sample.text.push_str(&format!("\n// File: {display} (partial)\n"));
                sample.text.push_str(&content[..end]);
                sample.content_bytes += end;
                sample.files.push(SampledFile {
                    relative_path: display,
                    bytes: end,
                    partial: true,
                });
                sample.truncated = true;
                break;
            }
        }

        debug!(
            files = sample.files.len(),
            content_bytes = sample.content_bytes,
            budget = self.budget,
            truncated = sample.truncated,
            "Built source sample"
        );

        sample
    }
}

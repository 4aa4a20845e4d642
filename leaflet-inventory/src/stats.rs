//! Line counting and per-extension breakdown

use crate::model::ScanWarning;
use indexmap::IndexMap;
use leaflet_core::process_in_order;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum number of files read concurrently
pub const DEFAULT_READ_CONCURRENCY: usize = 16;

/// Aggregated counts for a list of files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileStats {
    pub total_files: usize,
    pub total_lines: usize,
    pub language_breakdown: IndexMap<String, usize>,
    pub warnings: Vec<ScanWarning>,
}

/// Lines in `content`: one more than the number of newline characters
pub fn count_lines(content: &str) -> usize {
    content.bytes().filter(|&b| b == b'\n').count() + 1
}

/// Lower-cased extension with a leading dot, or `""` when there is none
pub fn extension_key(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Reads files and sums their line counts by extension
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    concurrency: usize,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            concurrency: DEFAULT_READ_CONCURRENCY,
        }
    }

    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Count lines for every file in `files`.
    ///
    /// Unreadable or non-UTF-8 files still count toward `total_files` but
    /// contribute no lines and no breakdown entry. This mismatch between file
    /// and line totals is intentional: `total_files` means paths examined, not
    /// paths read. Keep it; do not make the two counts agree.
    ///
    /// Breakdown keys appear in the order of `files`, regardless of which
    /// reads finish first.
    pub async fn aggregate(&self, files: &[PathBuf]) -> FileStats {
        let counted = process_in_order(files.to_vec(), self.concurrency, |path| async move {
            let lines = tokio::fs::read_to_string(&path)
                .await
                .map(|content| count_lines(&content));
            (path, lines)
        })
        .await;

        let mut stats = FileStats {
            total_files: files.len(),
            ..FileStats::default()
        };

        for (path, lines) in counted {
            match lines {
                Ok(lines) => {
                    stats.total_lines += lines;
                    *stats
                        .language_breakdown
                        .entry(extension_key(&path))
                        .or_insert(0) += lines;
                }
                Err(e) => stats.warnings.push(ScanWarning::unreadable(&path, e)),
            }
        }

        debug!(
            total_files = stats.total_files,
            total_lines = stats.total_lines,
            languages = stats.language_breakdown.len(),
            "Aggregated file statistics"
        );

        stats
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WarningKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn line_counting_matches_newline_split() {
        assert_eq!(count_lines(""), 1);
        assert_eq!(count_lines("one"), 1);
        assert_eq!(count_lines("a\nb\nc"), 3);
        assert_eq!(count_lines("a\nb\n"), 3);
        assert_eq!(count_lines("a\r\nb"), 2);
    }

    #[test]
    fn extension_keys_are_lowercase_with_dot() {
        assert_eq!(extension_key(Path::new("src/Main.RS")), ".rs");
        assert_eq!(extension_key(Path::new("archive.tar.gz")), ".gz");
        assert_eq!(extension_key(Path::new("Makefile")), "");
        assert_eq!(extension_key(Path::new(".gitignore")), "");
    }

    #[tokio::test]
    async fn aggregates_in_input_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let files = vec![root.join("b.ts"), root.join("a.rs"), root.join("c.ts")];
        fs::write(&files[0], "x\ny").unwrap();
        fs::write(&files[1], "fn main() {}\n").unwrap();
        fs::write(&files[2], "z").unwrap();

        let stats = StatsAggregator::new().aggregate(&files).await;

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_lines, 5);
        let keys: Vec<_> = stats.language_breakdown.keys().cloned().collect();
        assert_eq!(keys, vec![".ts", ".rs"]);
        assert_eq!(stats.language_breakdown[".ts"], 3);
        assert_eq!(stats.language_breakdown[".rs"], 2);
    }

    #[tokio::test]
    async fn unreadable_files_count_but_add_no_lines() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let good = root.join("ok.md");
        let binary = root.join("image.png");
        let missing = root.join("gone.txt");
        fs::write(&good, "# title\n\ntext").unwrap();
        fs::write(&binary, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let stats = StatsAggregator::with_concurrency(2)
            .aggregate(&[good, binary, missing])
            .await;

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_lines, 3);
        assert_eq!(stats.language_breakdown.len(), 1);
        assert!(!stats.language_breakdown.contains_key(".png"));
        assert_eq!(stats.warnings.len(), 2);
        assert!(stats
            .warnings
            .iter()
            .all(|w| w.kind == WarningKind::ReadFailure));
        assert!(stats.warnings[1].message.starts_with("Could not read file"));
        assert!(stats.warnings[1].message.contains("gone.txt"));
    }
}

//! Project analyzer - builds the full inventory for one project root

use crate::matcher::{MatchedFiles, PathMatcher};
use crate::metadata::MetadataReader;
use crate::model::{FileStructure, ProjectInventory};
use crate::sampler::{is_code_file, SourceSample, SourceSampler};
use crate::stats::{StatsAggregator, DEFAULT_READ_CONCURRENCY};
use crate::tree::build_tree;
use leaflet_core::performance::measure_async;
use leaflet_core::{log_operation_start, log_operation_success, LeafletError, LeafletResult};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Absolute, lexically normalized form of `root`. Symlinks are left alone.
fn absolute_root(root: &Path) -> LeafletResult<PathBuf> {
    let joined = if root.is_absolute() {
        root.to_path_buf()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| LeafletError::invalid_root(root, &e.to_string()))?;
        cwd.join(root)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Inventory entry point for a single project directory
#[derive(Debug, Clone)]
pub struct ProjectAnalyzer {
    root: PathBuf,
    matcher: PathMatcher,
    read_concurrency: usize,
}

impl ProjectAnalyzer {
    /// Analyzer using the built-in ignore list
    pub fn new<P: AsRef<Path>>(root: P) -> LeafletResult<Self> {
        Self::with_matcher(root, PathMatcher::new())
    }

    /// Analyzer using the built-in ignore list plus `extra_patterns`
    pub fn with_ignore_patterns<P: AsRef<Path>>(
        root: P,
        extra_patterns: &[String],
    ) -> LeafletResult<Self> {
        Self::with_matcher(root, PathMatcher::with_patterns(extra_patterns)?)
    }

    /// `root` is made absolute and `.`/`..` are folded away, so the tree root
    /// is named after the directory itself
    pub fn with_matcher<P: AsRef<Path>>(root: P, matcher: PathMatcher) -> LeafletResult<Self> {
        Ok(Self {
            root: absolute_root(root.as_ref())?,
            matcher,
            read_concurrency: DEFAULT_READ_CONCURRENCY,
        })
    }

    pub fn with_read_concurrency(mut self, read_concurrency: usize) -> Self {
        self.read_concurrency = read_concurrency.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root on the blocking pool
    pub async fn list_files(&self) -> LeafletResult<MatchedFiles> {
        let matcher = self.matcher.clone();
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || matcher.enumerate(&root))
            .await
            .map_err(|e| LeafletError::internal(format!("file walk panicked: {e}"), "inventory"))?
    }

    /// Build the directory tree, statistics and metadata for the root.
    ///
    /// The file list is taken once and shared by the tree and the statistics,
    /// so both always describe the same set of files.
    pub async fn analyze_project(&self) -> LeafletResult<ProjectInventory> {
        let started = Instant::now();
        log_operation_start!("analyze_project", root = %self.root.display());

        let MatchedFiles {
            files,
            mut warnings,
        } = measure_async("inventory.walk", self.list_files()).await?;

        let (root_node, tree_warnings) = build_tree(&self.root, &files);
        warnings.extend(tree_warnings);

        let aggregator = StatsAggregator::with_concurrency(self.read_concurrency);
        let stats = measure_async("inventory.stats", aggregator.aggregate(&files)).await;
        warnings.extend(stats.warnings);

        let metadata = measure_async("inventory.metadata", MetadataReader::new(&self.root).read()).await;

        let inventory = ProjectInventory {
            file_structure: FileStructure {
                root: root_node,
                total_files: stats.total_files,
                total_lines: stats.total_lines,
                language_breakdown: stats.language_breakdown,
            },
            metadata,
            warnings,
        };

        log_operation_success!(
            "analyze_project",
            duration_ms = started.elapsed().as_millis() as u64,
            total_files = inventory.file_structure.total_files,
            total_lines = inventory.file_structure.total_lines,
            warnings = inventory.warnings.len()
        );

        Ok(inventory)
    }

    /// Source files of the project, in walk order
    pub async fn code_files(&self) -> LeafletResult<Vec<PathBuf>> {
        let matched = self.list_files().await?;
        Ok(matched
            .files
            .into_iter()
            .filter(|path| is_code_file(path))
            .collect())
    }

    /// Concatenated source text of at most `budget` content bytes
    pub async fn source_sample(&self, budget: usize) -> LeafletResult<SourceSample> {
        let files = self.code_files().await?;
        info!(
            root = %self.root.display(),
            candidates = files.len(),
            budget,
            "Sampling source files"
        );

        Ok(SourceSampler::new(&self.root, budget).sample(&files).await)
    }
}

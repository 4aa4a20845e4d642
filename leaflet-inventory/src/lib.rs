//! Leaflet Inventory - file discovery and project structure
//!
//! Walks a project root, applies the ignore list, builds the directory tree,
//! counts lines per extension, samples source text for prompts and reads
//! project metadata. Also imports remote repositories and local directories
//! into a scratch area before analysis.

pub mod analyzer;
pub mod importer;
pub mod matcher;
pub mod metadata;
pub mod model;
pub mod sampler;
pub mod stats;
pub mod tree;

pub use analyzer::ProjectAnalyzer;
pub use importer::{extract_repo_name, RepoImporter, DEFAULT_TEMP_MAX_AGE};
pub use matcher::{MatchedFiles, PathMatcher};
pub use metadata::{parse_cargo_toml, parse_package_json, ManifestInfo, MetadataReader};
pub use model::*;
pub use sampler::{is_code_file, SampledFile, SourceSample, SourceSampler};
pub use stats::{count_lines, extension_key, FileStats, StatsAggregator};
pub use tree::{build_tree, TreeBuilder};

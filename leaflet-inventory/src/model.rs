//! Inventory data model
//!
//! Everything here is created fresh for one inventory run and handed to the
//! caller by value; nothing is shared between runs.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use leaflet_core::LeafletError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Whether a tree node is a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// One node of the project directory tree
///
/// A file node never has children. A directory node always has a (possibly
/// empty) children list, ordered by first appearance in the file listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(rename = "path")]
    pub full_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<DirectoryNode>>,
}

impl DirectoryNode {
    pub fn file(name: impl Into<String>, full_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            full_path: full_path.into(),
            children: None,
        }
    }

    pub fn directory(
        name: impl Into<String>,
        full_path: impl Into<PathBuf>,
        children: Vec<DirectoryNode>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            full_path: full_path.into(),
            children: Some(children),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Children in first-seen order; always empty for files
    pub fn children(&self) -> &[DirectoryNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Pre-order traversal yielding `(depth, node)`, root at depth 0.
    ///
    /// Uses an explicit stack so very deep trees cannot overflow the call stack.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }

    /// Number of file leaves under this node
    pub fn file_count(&self) -> usize {
        self.walk().filter(|(_, node)| node.is_file()).count()
    }

    /// Find the node with the given absolute path
    pub fn find(&self, path: &Path) -> Option<&DirectoryNode> {
        self.walk()
            .map(|(_, node)| node)
            .find(|node| node.full_path == path)
    }

    /// Direct child by name
    pub fn child(&self, name: &str) -> Option<&DirectoryNode> {
        self.children().iter().find(|child| child.name == name)
    }
}

/// Iterator returned by [`DirectoryNode::walk`]
pub struct Walk<'a> {
    stack: Vec<(usize, &'a DirectoryNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a DirectoryNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        for child in node.children().iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

/// Tree plus aggregate statistics for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStructure {
    pub root: DirectoryNode,
    /// Number of paths examined, including files that could not be read
    pub total_files: usize,
    /// Lines of all files that could be read
    pub total_lines: usize,
    /// Extension (".rs", "" when none) to line count, in first-seen order
    pub language_breakdown: IndexMap<String, usize>,
}

/// Descriptive metadata about the project root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub has_version_control: bool,
}

pub const DEFAULT_PROJECT_VERSION: &str = "1.0.0";

/// Why a path was skipped during an inventory run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    Symlink,
    PermissionDenied,
    Io,
    ReadFailure,
    OutsideRoot,
    PathConflict,
}

/// A non-fatal problem recorded while scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub kind: WarningKind,
    pub message: String,
}

impl ScanWarning {
    pub fn new(path: impl Into<PathBuf>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Warning for a file whose content could not be read, logged on creation
    pub fn unreadable(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref();
        let error = LeafletError::file_read(path, source);
        error.log();
        Self::new(path, WarningKind::ReadFailure, error.to_string())
    }
}

/// Combined result of one inventory run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInventory {
    pub file_structure: FileStructure,
    pub metadata: ProjectMetadata,
    #[serde(default)]
    pub warnings: Vec<ScanWarning>,
}

/// `/`-separated path of `path` relative to `root`, or `None` if outside it
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

//! Directory tree construction from a flat file list

use crate::model::{DirectoryNode, NodeKind, ScanWarning, WarningKind};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

struct ArenaNode {
    name: String,
    kind: NodeKind,
    full_path: PathBuf,
    children: Vec<usize>,
}

/// Incremental tree builder.
///
/// Nodes live in an arena indexed by their full path, so each distinct path is
/// created once no matter how many files share it. A child is always pushed
/// after its parent, which lets [`TreeBuilder::finish`] assemble the nested
/// tree bottom-up without recursion.
pub struct TreeBuilder {
    root: PathBuf,
    nodes: Vec<ArenaNode>,
    index: HashMap<PathBuf, usize>,
    warnings: Vec<ScanWarning>,
}

impl TreeBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        let mut index = HashMap::new();
        index.insert(root.clone(), 0);

        Self {
            nodes: vec![ArenaNode {
                name,
                kind: NodeKind::Directory,
                full_path: root.clone(),
                children: Vec::new(),
            }],
            root,
            index,
            warnings: Vec::new(),
        }
    }

    /// Add one file path, creating intermediate directories as needed.
    pub fn insert(&mut self, path: &Path) {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            self.skip(path, WarningKind::OutsideRoot, "path is not under the project root");
            return;
        };

        let segments: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(segment) => Some(segment),
                _ => None,
            })
            .collect();
        if segments.is_empty() {
            self.skip(path, WarningKind::OutsideRoot, "path names the project root itself");
            return;
        }

        let last = segments.len() - 1;
        let mut parent = 0;
        let mut current = self.root.clone();

        for (position, segment) in segments.into_iter().enumerate() {
            current.push(segment);
            let kind = if position == last {
                NodeKind::File
            } else {
                NodeKind::Directory
            };

            let idx = match self.index.get(&current) {
                Some(&idx) => {
                    if self.nodes[idx].kind != kind {
                        self.skip(
                            path,
                            WarningKind::PathConflict,
                            "path is both a file and a directory",
                        );
                        return;
                    }
                    idx
                }
                None => {
                    let idx = self.nodes.len();
                    self.nodes.push(ArenaNode {
                        name: segment.to_string_lossy().into_owned(),
                        kind,
                        full_path: current.clone(),
                        children: Vec::new(),
                    });
                    self.nodes[parent].children.push(idx);
                    self.index.insert(current.clone(), idx);
                    idx
                }
            };
            parent = idx;
        }
    }

    fn skip(&mut self, path: &Path, kind: WarningKind, message: &str) {
        warn!(path = %path.display(), message, "Skipping path while building tree");
        self.warnings.push(ScanWarning::new(path, kind, message));
    }

    /// Assemble the nested tree and return it with any skipped paths.
    pub fn finish(self) -> (DirectoryNode, Vec<ScanWarning>) {
        let mut built: Vec<Option<DirectoryNode>> = Vec::with_capacity(self.nodes.len());
        built.resize_with(self.nodes.len(), || None);

        for (idx, node) in self.nodes.into_iter().enumerate().rev() {
            let assembled = match node.kind {
                NodeKind::File => DirectoryNode::file(node.name, node.full_path),
                NodeKind::Directory => {
                    let children = node
                        .children
                        .iter()
                        .filter_map(|&child| built[child].take())
                        .collect();
                    DirectoryNode::directory(node.name, node.full_path, children)
                }
            };
            built[idx] = Some(assembled);
        }

        let root = built
            .into_iter()
            .next()
            .flatten()
            .unwrap_or_else(|| DirectoryNode::directory(String::new(), self.root, Vec::new()));
        (root, self.warnings)
    }
}

/// Build the tree for `files` under `root`.
pub fn build_tree<P: AsRef<Path>>(root: &Path, files: &[P]) -> (DirectoryNode, Vec<ScanWarning>) {
    let mut builder = TreeBuilder::new(root);
    for file in files {
        builder.insert(file.as_ref());
    }
    builder.finish()
}

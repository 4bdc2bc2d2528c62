use std::collections::HashMap;
use std::path::PathBuf;

/// One directory level of the scanned tree.
///
/// `files` holds paths relative to the root directory; `dirs` maps a child
/// directory name to its own level. Neither is ordered here, ordering is
/// applied when the tree is rendered.
#[derive(Debug, Default)]
pub struct TreeNode {
    pub files: Vec<PathBuf>,
    pub dirs: HashMap<String, TreeNode>,
}

impl TreeNode {
    /// Returns true when no document exists anywhere below this level.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.values().all(TreeNode::is_empty)
    }

    /// Total number of documents below this level.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.dirs.values().map(TreeNode::file_count).sum::<usize>()
    }
}

/// Query of the view endpoint. A repeated `file` parameter keeps its first value.
#[derive(Debug, Default, PartialEq)]
pub struct ViewQuery {
    pub file: Option<String>,
}

impl ViewQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let file = pairs
            .into_iter()
            .find(|(key, _)| key == "file")
            .map(|(_, value)| value);
        Self { file }
    }
}

/// A requested document that passed validation.
#[derive(Debug)]
pub struct ResolvedDocument {
    /// Canonical absolute path on disk.
    pub full_path: PathBuf,
    /// Path relative to the root directory.
    pub rel_path: PathBuf,
}

impl ResolvedDocument {
    /// Relative path with forward-slash separators.
    pub fn rel_str(&self) -> String {
        to_slash(&self.rel_path)
    }

    pub fn file_name(&self) -> String {
        self.rel_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Joins the components of a relative path with `/` regardless of platform.
pub fn to_slash(path: &std::path::Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

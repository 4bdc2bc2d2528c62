use crate::error::AppError;
use crate::models::{ResolvedDocument, TreeNode};
use ignore::WalkBuilder;
use log::{debug, warn};
use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};
use tokio::fs as tokio_fs;

/// Extensions (lowercase, without the dot) of documents that can be viewed.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["md", "markdown"];

pub fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .map_or(false, |ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Walks `root` and collects every document into a tree keyed by directory name.
///
/// No ignore rules are applied and directory symlinks are not followed. An
/// unreadable root is an error; entries below it that cannot be read are
/// logged and skipped.
pub fn build_tree(root: &Path) -> Result<TreeNode, ignore::Error> {
    debug!("Building document tree for directory: {}", root.display());
    std::fs::read_dir(root)?;
    let mut tree = TreeNode::default();

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under '{}': {}", root.display(), e);
                continue;
            }
        };
        let is_file = match entry.file_type() {
            Some(ft) if ft.is_file() => true,
            Some(ft) if ft.is_symlink() => entry.path().is_file(),
            _ => false,
        };
        if !is_file || !has_allowed_extension(entry.path()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        insert_file(&mut tree, rel.to_path_buf());
    }

    Ok(tree)
}

pub(crate) fn insert_file(tree: &mut TreeNode, rel: PathBuf) {
    let mut current = tree;
    if let Some(parent) = rel.parent() {
        for part in parent.components() {
            let name = part.as_os_str().to_string_lossy().to_string();
            current = current.dirs.entry(name).or_default();
        }
    }
    current.files.push(rel);
}

/// Rejects absolute paths and any `..` segment before touching the filesystem.
pub fn validate_relative(requested: &str) -> Result<PathBuf, AppError> {
    let path = Path::new(requested);
    if path.is_absolute() || path.has_root() {
        return Err(AppError::InvalidPath);
    }
    let escapes = path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir));
    if escapes {
        return Err(AppError::InvalidPath);
    }
    Ok(path.to_path_buf())
}

/// Turns a requested relative path into a readable document under `base_dir`.
///
/// Checks run in a fixed order: shape of the path (400), existence as a
/// regular file (404), then extension (400). `base_dir` must be canonical.
pub async fn resolve_document(base_dir: &Path, requested: &str) -> Result<ResolvedDocument, AppError> {
    let rel = validate_relative(requested)?;
    let not_found = || AppError::NotFound(rel.to_string_lossy().to_string());

    let candidate = base_dir.join(&rel).clean();
    let full_path = match tokio_fs::canonicalize(&candidate).await {
        Ok(p) => p,
        Err(e) => {
            debug!("Could not resolve '{}': {}", candidate.display(), e);
            return Err(not_found());
        }
    };
    let is_file = tokio_fs::metadata(&full_path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(not_found());
    }

    if !has_allowed_extension(&full_path) {
        return Err(AppError::DisallowedExtension);
    }

    // A link inside the root may still point outside of it.
    let rel_path = full_path
        .strip_prefix(base_dir)
        .map_err(|_| AppError::InvalidPath)?
        .to_path_buf();

    Ok(ResolvedDocument { full_path, rel_path })
}

pub async fn read_document(doc: &ResolvedDocument) -> Result<String, AppError> {
    debug!("Reading file: {}", doc.full_path.display());
    Ok(tokio_fs::read_to_string(&doc.full_path).await?)
}

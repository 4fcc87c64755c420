use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, Result};
use crate::fs::tree::{join_path, TreeNode};

/// Directory names that are never descended into, compared case-insensitively.
pub const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", ".hg", ".svn", ".idea", ".vscode"];

/// File extensions recognized as viewable documents.
pub const DOCUMENT_EXTENSIONS: &[&str] = &[".md", ".mdx", ".markdown"];

/// Lists the immediate children of a directory in the tree.
pub trait Loader {
    /// `path` is root-relative and slash-separated; `""` is the root.
    fn list(&mut self, path: &str) -> Result<Vec<TreeNode>>;
}

/// Check whether a directory name is on the skip list.
pub fn should_skip_dir(name: &str) -> bool {
    let lower = name.to_lowercase();
    SKIPPED_DIRS.iter().any(|skip| *skip == lower)
}

/// Check whether a file name carries a document extension.
pub fn is_document(name: &str) -> bool {
    let lower = name.to_lowercase();
    DOCUMENT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Loader backed by the real filesystem.
///
/// Only directories whose subtree holds at least one document are listed.
/// That answer is memoized per directory for the lifetime of the loader.
pub struct FsLoader {
    root: PathBuf,
    cache: HashMap<String, bool>,
}

impl FsLoader {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            cache: HashMap::new(),
        }
    }

    fn abs(&self, rel_path: &str) -> PathBuf {
        if rel_path.is_empty() {
            return self.root.clone();
        }
        rel_path
            .split('/')
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    /// Memoized answer for `rel_path`, if it has been computed.
    pub fn cached(&self, rel_path: &str) -> Option<bool> {
        self.cache.get(rel_path).copied()
    }

    /// Report whether the subtree at `rel_path` contains at least one document.
    ///
    /// Stops at the first document found. Every directory whose answer is
    /// settled along the way is cached, not just `rel_path`.
    pub fn has_documents(&mut self, rel_path: &str) -> Result<bool> {
        if let Some(cached) = self.cached(rel_path) {
            return Ok(cached);
        }

        for entry in fs::read_dir(self.abs(rel_path))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type()?.is_dir() {
                if should_skip_dir(&name) {
                    continue;
                }
                if self.has_documents(&join_path(rel_path, &name))? {
                    self.cache.insert(rel_path.to_string(), true);
                    return Ok(true);
                }
                continue;
            }
            if is_document(&name) {
                self.cache.insert(rel_path.to_string(), true);
                return Ok(true);
            }
        }

        debug!(path = rel_path, "no documents in subtree");
        self.cache.insert(rel_path.to_string(), false);
        Ok(false)
    }
}

impl Loader for FsLoader {
    fn list(&mut self, rel_path: &str) -> Result<Vec<TreeNode>> {
        let dir = self.abs(rel_path);
        if !fs::metadata(&dir)?.is_dir() {
            return Err(AppError::NotADirectory(dir));
        }

        let mut nodes = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let child_path = join_path(rel_path, &name);
            if entry.file_type()?.is_dir() {
                if should_skip_dir(&name) || !self.has_documents(&child_path)? {
                    continue;
                }
                nodes.push(TreeNode::directory(name, child_path));
                continue;
            }
            if is_document(&name) {
                nodes.push(TreeNode::file(name, child_path));
            }
        }
        debug!(path = rel_path, count = nodes.len(), "listed directory");
        Ok(nodes)
    }
}

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::fs::loader::{is_document, should_skip_dir};
use crate::fs::tree::{join_path, TreeNode};

/// Build a complete tree from root-relative, slash-separated document paths.
///
/// Intermediate directories are created on demand. If a node with the same
/// name already exists where a file would go, the first one wins.
pub fn build(root_name: &str, files: &[String]) -> TreeNode {
    let mut root = TreeNode::root(root_name);

    for rel in files {
        let parts: Vec<&str> = rel.split('/').collect();
        let Some((file_name, dirs)) = parts.split_last() else {
            continue;
        };
        let mut current = &mut root;
        let mut current_path = String::new();

        for part in dirs {
            current_path = join_path(&current_path, part);
            let idx = child_index(current, part).unwrap_or_else(|| {
                current.add_child(TreeNode::directory(*part, current_path.clone()));
                current.children.len() - 1
            });
            current = &mut current.children[idx];
        }

        if current.child_by_name(file_name).is_some() {
            continue;
        }
        current.add_child(TreeNode::file(*file_name, join_path(&current_path, file_name)));
    }

    root.sort_recursive();
    root
}

/// Build a tree holding exactly `paths`, as used by tag filtering.
///
/// Paths are trimmed of leading and trailing slashes and empty ones skipped.
/// When a path ends on a node that already exists, that node becomes a file.
pub fn build_filtered(root_name: &str, paths: &[String]) -> TreeNode {
    let mut root = TreeNode::root(root_name);
    for rel in paths {
        let trimmed = rel.trim_matches('/');
        if trimmed.is_empty() {
            continue;
        }
        insert_path(&mut root, trimmed);
    }
    root.sort_recursive();
    root
}

fn insert_path(root: &mut TreeNode, rel: &str) {
    let parts: Vec<&str> = rel.split('/').collect();
    let mut current = root;
    let mut parent_path = String::new();

    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        let child_path = join_path(&parent_path, part);
        let idx = child_index(current, part).unwrap_or_else(|| {
            let node = if is_last {
                TreeNode::file(*part, child_path.clone())
            } else {
                TreeNode::directory(*part, child_path.clone())
            };
            current.add_child(node);
            current.children.len() - 1
        });
        let child = &mut current.children[idx];
        if is_last {
            child.make_file();
        } else if !child.is_dir {
            child.is_dir = true;
        }
        current = child;
        parent_path = child_path;
    }
}

fn child_index(node: &TreeNode, name: &str) -> Option<usize> {
    node.children.iter().position(|c| c.name == name)
}

/// Recursively collect every document under `root` as a relative path,
/// sorted case-insensitively. Skip-listed directories are pruned below the root.
pub fn collect_documents(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    collect_into(root, "", &mut files)?;
    files.sort_by_key(|f| f.to_lowercase());
    Ok(files)
}

fn collect_into(dir: &Path, rel: &str, files: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.file_type()?.is_dir() {
            if should_skip_dir(&name) {
                continue;
            }
            collect_into(&entry.path(), &join_path(rel, &name), files)?;
        } else if is_document(&name) {
            files.push(join_path(rel, &name));
        }
    }
    Ok(())
}

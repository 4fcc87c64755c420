use std::collections::{BTreeMap, HashSet};
use std::io::{BufRead, Write};
use std::path::Path;

use tracing::debug;

use crate::document::read_file;
use crate::error::{AppError, Result};
use crate::fs::build::collect_documents;

/// Tags found in document front matter, each mapped to the documents carrying it.
#[derive(Debug, Default)]
pub struct TagIndex {
    files_by_tag: BTreeMap<String, Vec<String>>,
}

impl TagIndex {
    /// Record that `file` carries `tag`. Duplicate pairs are ignored.
    pub fn add(&mut self, tag: &str, file: &str) {
        let files = self.files_by_tag.entry(tag.to_string()).or_default();
        if !files.iter().any(|f| f == file) {
            files.push(file.to_string());
        }
    }

    /// Sort every file list.
    pub fn finalize(&mut self) {
        for files in self.files_by_tag.values_mut() {
            files.sort();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files_by_tag.is_empty()
    }

    /// Tags in sorted order.
    pub fn tags(&self) -> Vec<&str> {
        self.files_by_tag.keys().map(String::as_str).collect()
    }

    pub fn files(&self, tag: &str) -> &[String] {
        self.files_by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Trim, drop empties and de-duplicate, keeping first-occurrence order.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for tag in raw {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
            continue;
        }
        tags.push(trimmed.to_string());
    }
    tags
}

fn split_joined(joined: &str) -> Vec<String> {
    normalize_tags(joined.split(','))
}

/// Return the body of a front-matter block fenced by `fence`, if the document opens with one.
fn fenced_block<'a>(content: &'a str, fence: &str) -> Option<&'a str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != fence {
        return None;
    }
    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == fence {
            return Some(&content[start..offset]);
        }
        offset += line.len();
    }
    None
}

/// Extract the `tags` entry of a document's YAML (`---`) or TOML (`+++`) front matter.
///
/// A document without front matter, or whose front matter has no `tags`, yields no tags.
pub fn parse_front_matter_tags(content: &str) -> Result<Vec<String>> {
    if let Some(block) = fenced_block(content, "---") {
        let value: serde_yaml::Value =
            serde_yaml::from_str(block).map_err(|e| AppError::FrontMatter(e.to_string()))?;
        return Ok(match value.get("tags") {
            Some(serde_yaml::Value::Sequence(items)) => {
                normalize_tags(items.iter().filter_map(serde_yaml::Value::as_str))
            }
            Some(serde_yaml::Value::String(joined)) => split_joined(joined),
            _ => Vec::new(),
        });
    }
    if let Some(block) = fenced_block(content, "+++") {
        let value: toml::Table =
            toml::from_str(block).map_err(|e| AppError::FrontMatter(e.to_string()))?;
        return Ok(match value.get("tags") {
            Some(toml::Value::Array(items)) => {
                normalize_tags(items.iter().filter_map(toml::Value::as_str))
            }
            Some(toml::Value::String(joined)) => split_joined(joined),
            _ => Vec::new(),
        });
    }
    Ok(Vec::new())
}

fn read_tags(path: &Path) -> Result<Vec<String>> {
    let content = read_file(path)?;
    parse_front_matter_tags(&content).map_err(|e| match e {
        AppError::FrontMatter(msg) => {
            AppError::FrontMatter(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Index every document under `root` by its front-matter tags.
pub fn build_directory_index(root: &Path) -> Result<TagIndex> {
    let mut index = TagIndex::default();
    for rel in collect_documents(root)? {
        let path = rel.split('/').fold(root.to_path_buf(), |acc, p| acc.join(p));
        let tags = read_tags(&path)?;
        debug!(file = %rel, count = tags.len(), "read front matter");
        for tag in &tags {
            index.add(tag, &rel);
        }
    }
    index.finalize();
    Ok(index)
}

/// Index a single document, listing it under `display` for each of its tags.
pub fn build_file_index(path: &Path, display: &str) -> Result<TagIndex> {
    let mut index = TagIndex::default();
    for tag in read_tags(path)? {
        index.add(&tag, display);
    }
    index.finalize();
    Ok(index)
}

pub fn print_menu<W: Write>(index: &TagIndex, out: &mut W) -> Result<()> {
    writeln!(out, "Tags found:")?;
    for (i, tag) in index.tags().iter().enumerate() {
        writeln!(out, "  {}) {} ({} files)", i + 1, tag, index.files(tag).len())?;
    }
    writeln!(out, "  0) Cancel")?;
    Ok(())
}

/// Ask for a menu number until a valid one is entered.
///
/// Returns the 0-based choice, or `None` when the user enters 0 or input ends.
pub fn prompt_selection<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    limit: usize,
) -> Result<Option<usize>> {
    loop {
        write!(out, "Enter a number (0 to cancel): ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let value = line.trim();
        if value.is_empty() {
            writeln!(out, "Input is empty. Please enter a number.")?;
            continue;
        }
        match value.parse::<usize>() {
            Ok(0) => return Ok(None),
            Ok(choice) if choice <= limit => return Ok(Some(choice - 1)),
            Ok(_) => writeln!(out, "No such entry.")?,
            Err(_) => writeln!(out, "Please enter a number.")?,
        }
    }
}

use std::cmp::Ordering;

use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::error::Result;
use crate::fs::loader::Loader;
use crate::viewport::Viewport;

/// A node in the document tree.
///
/// A node owns its children. The link back to the parent is the parent's
/// root-relative path, which is only ever used to look the parent up again.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    /// Slash-joined path relative to the root; empty for the root itself.
    pub path: String,
    pub is_dir: bool,
    pub is_open: bool,
    pub parent: Option<String>,
    pub children: Vec<TreeNode>,
    loaded: bool,
}

impl TreeNode {
    /// Create the root node. It is always an open directory.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: String::new(),
            is_dir: true,
            is_open: true,
            parent: None,
            children: Vec::new(),
            loaded: false,
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: true,
            is_open: false,
            parent: None,
            children: Vec::new(),
            loaded: false,
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: false,
            is_open: false,
            parent: None,
            children: Vec::new(),
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Return the child with exactly this name.
    pub fn child_by_name(&self, name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_by_name_mut(&mut self, name: &str) -> Option<&mut TreeNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Attach a child, pointing its parent link at this node.
    ///
    /// Sorting is applied separately via `sort_children` / `sort_recursive`.
    pub fn add_child(&mut self, mut child: TreeNode) -> &mut TreeNode {
        child.parent = Some(self.path.clone());
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Turn this node into a file. A file is never open and has no children.
    pub fn make_file(&mut self) {
        self.is_dir = false;
        self.is_open = false;
        self.children.clear();
    }

    /// Sort immediate children: directories first, then by lowercase name.
    pub fn sort_children(&mut self) {
        self.children.sort_by(compare_nodes);
    }

    /// Sort children at every level of this subtree.
    pub fn sort_recursive(&mut self) {
        if self.children.is_empty() {
            return;
        }
        self.sort_children();
        for child in &mut self.children {
            child.sort_recursive();
        }
    }

    /// Lazily populate a directory's children from `loader`.
    ///
    /// A no-op for files, already loaded nodes, and trees without a loader.
    /// On error the node stays unloaded so a later call can retry.
    pub fn ensure_loaded(&mut self, loader: &mut Option<Box<dyn Loader>>) -> Result<()> {
        let Some(loader) = loader.as_mut() else {
            return Ok(());
        };
        if !self.is_dir || self.is_loaded() {
            return Ok(());
        }

        let children = loader.list(&self.path)?;
        debug!(path = %self.path, count = children.len(), "loaded directory");
        self.children.clear();
        for child in children {
            self.add_child(child);
        }
        self.sort_children();
        self.loaded = true;
        Ok(())
    }

    /// Find a node in this subtree by its root-relative path.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        if path.is_empty() {
            return Some(self);
        }
        let mut current = self;
        for part in path.split('/') {
            current = current.child_by_name(part)?;
        }
        Some(current)
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut TreeNode> {
        if path.is_empty() {
            return Some(self);
        }
        let mut current = self;
        for part in path.split('/') {
            current = current.child_by_name_mut(part)?;
        }
        Some(current)
    }
}

/// Directories before files, then case-insensitive by name.
pub fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Join a root-relative base path and a segment with `/`.
pub fn join_path(base: &str, part: &str) -> String {
    if base.is_empty() {
        part.to_string()
    } else {
        format!("{}/{}", base, part)
    }
}

/// A tree root plus the loader (if any) that populates it on demand.
pub struct DocTree {
    pub root: TreeNode,
    loader: Option<Box<dyn Loader>>,
}

impl DocTree {
    /// A tree whose directories are listed on first expansion.
    pub fn lazy(root_name: impl Into<String>, loader: Box<dyn Loader>) -> Self {
        Self {
            root: TreeNode::root(root_name),
            loader: Some(loader),
        }
    }

    /// A fully built tree that never loads anything.
    pub fn eager(root: TreeNode) -> Self {
        Self { root, loader: None }
    }

    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        self.root.find(path)
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut TreeNode> {
        self.root.find_mut(path)
    }

    /// Load the node at `path` if needed. Unknown paths are ignored.
    pub fn ensure_loaded(&mut self, path: &str) -> Result<()> {
        match self.root.find_mut(path) {
            Some(node) => node.ensure_loaded(&mut self.loader),
            None => Ok(()),
        }
    }

    /// Open every directory along `path`, loading each level on the way down.
    pub fn expand_path(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            return Ok(());
        }
        self.root.is_open = true;
        let loader = &mut self.loader;
        let mut current = &mut self.root;
        for part in path.split('/') {
            current.ensure_loaded(loader)?;
            let Some(child) = current.child_by_name_mut(part) else {
                return Ok(());
            };
            if child.is_dir {
                child.is_open = true;
            }
            current = child;
        }
        Ok(())
    }
}

/// One visible row of the tree panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatLine {
    pub path: String,
    pub is_dir: bool,
    pub is_open: bool,
    pub depth: usize,
    pub label: String,
}

/// What activating the selected row asks the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Tree structure or selection changed; nothing else to do.
    Navigated,
    /// The selected row is a document that should be opened.
    OpenFile(String),
    /// Nothing is selected.
    Nothing,
}

/// State for the tree panel: the tree, its visible rows and the selection.
pub struct TreeState {
    pub tree: DocTree,
    pub flat_lines: Vec<FlatLine>,
    pub selected_index: usize,
    /// Widest label in `flat_lines`, in display columns.
    pub max_label_width: usize,
    pub view: Viewport,
}

impl TreeState {
    pub fn new(tree: DocTree) -> Self {
        Self {
            tree,
            flat_lines: Vec::new(),
            selected_index: 0,
            max_label_width: 0,
            view: Viewport::default(),
        }
    }

    /// Rebuild the visible rows with a depth-first walk over open directories.
    ///
    /// Open directories are loaded before descending. A failed load keeps the
    /// directory's own row, skips its subtree, and is reported once the walk
    /// has finished.
    pub fn flatten(&mut self) -> Result<()> {
        let mut lines = Vec::new();
        let mut max_width = 0;
        let mut first_error = None;
        let DocTree { root, loader } = &mut self.tree;
        Self::flatten_node(root, loader, 0, &mut lines, &mut max_width, &mut first_error);

        self.flat_lines = lines;
        self.max_label_width = max_width;
        self.view.set_total_lines(self.flat_lines.len());
        self.clamp_selection();
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn flatten_node(
        node: &mut TreeNode,
        loader: &mut Option<Box<dyn Loader>>,
        depth: usize,
        lines: &mut Vec<FlatLine>,
        max_width: &mut usize,
        first_error: &mut Option<crate::error::AppError>,
    ) {
        let label = format_label(&node.name, node.is_dir, node.is_open, depth);
        *max_width = (*max_width).max(label.width());
        lines.push(FlatLine {
            path: node.path.clone(),
            is_dir: node.is_dir,
            is_open: node.is_open,
            depth,
            label,
        });

        if !(node.is_dir && node.is_open) {
            return;
        }
        if let Err(e) = node.ensure_loaded(loader) {
            first_error.get_or_insert(e);
            return;
        }
        for child in &mut node.children {
            Self::flatten_node(child, loader, depth + 1, lines, max_width, first_error);
        }
    }

    fn clamp_selection(&mut self) {
        if self.flat_lines.is_empty() {
            self.selected_index = 0;
        } else if self.selected_index >= self.flat_lines.len() {
            self.selected_index = self.flat_lines.len() - 1;
        }
    }

    pub fn selected_line(&self) -> Option<&FlatLine> {
        self.flat_lines.get(self.selected_index)
    }

    pub fn index_for_path(&self, path: &str) -> Option<usize> {
        self.flat_lines.iter().position(|line| line.path == path)
    }

    /// Select the row for `path`, or keep a clamped index if it is gone.
    fn reselect(&mut self, path: &str) {
        match self.index_for_path(path) {
            Some(idx) => self.selected_index = idx,
            None => self.clamp_selection(),
        }
        self.ensure_selection_visible();
    }

    /// Move the selection by `delta` rows, clamping at both ends.
    pub fn move_selection(&mut self, delta: isize) {
        if self.flat_lines.is_empty() {
            return;
        }
        let last = self.flat_lines.len() - 1;
        self.selected_index = self.selected_index.saturating_add_signed(delta).min(last);
        self.ensure_selection_visible();
    }

    pub fn select_first(&mut self) {
        if self.flat_lines.is_empty() {
            return;
        }
        self.selected_index = 0;
        self.ensure_selection_visible();
    }

    pub fn select_last(&mut self) {
        if self.flat_lines.is_empty() {
            return;
        }
        self.selected_index = self.flat_lines.len() - 1;
        self.ensure_selection_visible();
    }

    /// Scroll the tree panel just enough to show the selected row.
    pub fn ensure_selection_visible(&mut self) {
        if self.flat_lines.is_empty() {
            return;
        }
        self.view.ensure_visible(self.selected_index);
    }

    /// Expand every ancestor of `path`, rebuild, and select its row.
    pub fn refresh_with_selection(&mut self, path: &str) -> Result<()> {
        self.tree.ensure_loaded("")?;
        let expanded = self.tree.expand_path(path);
        let flattened = self.flatten();
        self.reselect(path);
        expanded.and(flattened)
    }

    /// Open a closed directory, step into an open one, or report a file to open.
    pub fn expand_or_descend(&mut self) -> Result<Activation> {
        let Some(line) = self.selected_line() else {
            return Ok(Activation::Nothing);
        };
        let path = line.path.clone();
        if !line.is_dir {
            return Ok(Activation::OpenFile(path));
        }

        if !line.is_open {
            if let Some(node) = self.tree.find_mut(&path) {
                node.is_open = true;
            }
            if let Err(e) = self.tree.ensure_loaded(&path) {
                if let Some(node) = self.tree.find_mut(&path) {
                    node.is_open = false;
                }
                return Err(e);
            }
            self.refresh_with_selection(&path)?;
            return Ok(Activation::Navigated);
        }

        self.tree.ensure_loaded(&path)?;
        let has_children = self
            .tree
            .find(&path)
            .is_some_and(|node| !node.children.is_empty());
        if has_children {
            self.move_selection(1);
        }
        Ok(Activation::Navigated)
    }

    /// Close an open directory, or move the selection up to the parent.
    pub fn collapse_or_ascend(&mut self) -> Result<()> {
        let Some(line) = self.selected_line() else {
            return Ok(());
        };
        let path = line.path.clone();

        if line.is_dir && line.is_open {
            if let Some(node) = self.tree.find_mut(&path) {
                node.is_open = false;
            }
            let flattened = self.flatten();
            self.reselect(&path);
            return flattened;
        }

        let parent = self.tree.find(&path).and_then(|node| node.parent.clone());
        match parent {
            Some(parent) => self.refresh_with_selection(&parent),
            None => Ok(()),
        }
    }
}

/// Render the tree-panel label for a node at `depth`.
///
/// The root shows as `name/`; deeper rows are indented two columns per level
/// with a `+`/`-` marker on directories.
pub fn format_label(name: &str, is_dir: bool, is_open: bool, depth: usize) -> String {
    if depth == 0 {
        return format!("{}/", name);
    }
    let indent = "  ".repeat(depth - 1);
    let indicator = match (is_dir, is_open) {
        (true, true) => "- ",
        (true, false) => "+ ",
        (false, _) => "  ",
    };
    let suffix = if is_dir { "/" } else { "" };
    format!("{}{}{}{}", indent, indicator, name, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// In-memory loader that counts how often each path is listed.
    struct MapLoader {
        entries: HashMap<String, Vec<(String, bool)>>,
        calls: Rc<RefCell<Vec<String>>>,
        fail: Rc<RefCell<bool>>,
    }

    impl Loader for MapLoader {
        fn list(&mut self, path: &str) -> Result<Vec<TreeNode>> {
            self.calls.borrow_mut().push(path.to_string());
            if *self.fail.borrow() {
                return Err(AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "denied",
                )));
            }
            Ok(self
                .entries
                .get(path)
                .map(|list| {
                    list.iter()
                        .map(|(name, is_dir)| {
                            let child_path = join_path(path, name);
                            if *is_dir {
                                TreeNode::directory(name.clone(), child_path)
                            } else {
                                TreeNode::file(name.clone(), child_path)
                            }
                        })
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    struct Fixture {
        calls: Rc<RefCell<Vec<String>>>,
        fail: Rc<RefCell<bool>>,
    }

    fn lazy_tree() -> (DocTree, Fixture) {
        let mut entries = HashMap::new();
        entries.insert(
            String::new(),
            vec![
                ("zeta.md".to_string(), false),
                ("guides".to_string(), true),
                ("Alpha.md".to_string(), false),
                ("api".to_string(), true),
            ],
        );
        entries.insert(
            "guides".to_string(),
            vec![
                ("setup.md".to_string(), false),
                ("advanced".to_string(), true),
            ],
        );
        entries.insert(
            "guides/advanced".to_string(),
            vec![("tuning.md".to_string(), false)],
        );
        entries.insert("api".to_string(), vec![]);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let fail = Rc::new(RefCell::new(false));
        let loader = MapLoader {
            entries,
            calls: calls.clone(),
            fail: fail.clone(),
        };
        (
            DocTree::lazy("docs", Box::new(loader)),
            Fixture { calls, fail },
        )
    }

    fn lazy_state() -> (TreeState, Fixture) {
        let (tree, fixture) = lazy_tree();
        let mut state = TreeState::new(tree);
        state.view.set_size(30, 10);
        state.refresh_with_selection("").unwrap();
        (state, fixture)
    }

    fn labels(state: &TreeState) -> Vec<&str> {
        state.flat_lines.iter().map(|l| l.label.as_str()).collect()
    }

    fn select(state: &mut TreeState, path: &str) {
        state.selected_index = state.index_for_path(path).expect("row present");
    }

    #[test]
    fn sort_puts_directories_first_case_insensitive() {
        let mut root = TreeNode::root("r");
        root.add_child(TreeNode::file("b.md", "b.md"));
        root.add_child(TreeNode::directory("Zed", "Zed"));
        root.add_child(TreeNode::file("A.md", "A.md"));
        root.add_child(TreeNode::directory("apple", "apple"));
        root.sort_children();
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "Zed", "A.md", "b.md"]);
    }

    #[test]
    fn sort_recursive_reaches_every_level() {
        let mut root = TreeNode::root("r");
        let sub = root.add_child(TreeNode::directory("sub", "sub"));
        sub.add_child(TreeNode::file("y.md", "sub/y.md"));
        sub.add_child(TreeNode::directory("X", "sub/X"));
        root.add_child(TreeNode::file("a.md", "a.md"));
        root.sort_recursive();
        let sub = root.child_by_name("sub").unwrap();
        assert_eq!(sub.children[0].name, "X");
        assert_eq!(sub.children[1].name, "y.md");
    }

    #[test]
    fn child_by_name_is_exact() {
        let mut root = TreeNode::root("r");
        root.add_child(TreeNode::file("Readme.md", "Readme.md"));
        assert!(root.child_by_name("Readme.md").is_some());
        assert!(root.child_by_name("readme.md").is_none());
    }

    #[test]
    fn add_child_sets_parent_path() {
        let mut root = TreeNode::root("r");
        let dir = root.add_child(TreeNode::directory("a", "a"));
        let leaf = dir.add_child(TreeNode::file("b.md", "a/b.md"));
        assert_eq!(leaf.parent.as_deref(), Some("a"));
        assert_eq!(root.find("a").unwrap().parent.as_deref(), Some(""));
        assert!(root.parent.is_none());
    }

    #[test]
    fn make_file_clears_directory_state() {
        let mut node = TreeNode::directory("x", "x");
        node.is_open = true;
        node.add_child(TreeNode::file("y.md", "x/y.md"));
        node.make_file();
        assert!(!node.is_dir);
        assert!(!node.is_open);
        assert!(node.children.is_empty());
    }

    #[test]
    fn ensure_loaded_lists_once() {
        let (mut tree, fixture) = lazy_tree();
        tree.ensure_loaded("").unwrap();
        tree.ensure_loaded("").unwrap();
        assert_eq!(*fixture.calls.borrow(), vec![String::new()]);
        assert!(tree.root.is_loaded());
    }

    #[test]
    fn ensure_loaded_sorts_and_links_children() {
        let (mut tree, _fixture) = lazy_tree();
        tree.ensure_loaded("").unwrap();
        let names: Vec<&str> = tree.root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["api", "guides", "Alpha.md", "zeta.md"]);
        assert!(tree
            .root
            .children
            .iter()
            .all(|c| c.parent.as_deref() == Some("")));
    }

    #[test]
    fn ensure_loaded_failure_allows_retry() {
        let (mut tree, fixture) = lazy_tree();
        *fixture.fail.borrow_mut() = true;
        assert!(tree.ensure_loaded("").is_err());
        assert!(!tree.root.is_loaded());

        *fixture.fail.borrow_mut() = false;
        tree.ensure_loaded("").unwrap();
        assert!(tree.root.is_loaded());
        assert_eq!(fixture.calls.borrow().len(), 2);
    }

    #[test]
    fn ensure_loaded_without_loader_is_noop() {
        let mut root = TreeNode::root("r");
        root.add_child(TreeNode::file("a.md", "a.md"));
        let mut tree = DocTree::eager(root);
        tree.ensure_loaded("").unwrap();
        assert!(!tree.root.is_loaded());
        assert_eq!(tree.root.children.len(), 1);
    }

    #[test]
    fn ensure_loaded_on_file_is_noop() {
        let (mut tree, fixture) = lazy_tree();
        tree.ensure_loaded("").unwrap();
        tree.ensure_loaded("zeta.md").unwrap();
        assert_eq!(fixture.calls.borrow().len(), 1);
    }

    #[test]
    fn find_walks_segments() {
        let (mut tree, _fixture) = lazy_tree();
        tree.expand_path("guides/advanced/tuning.md").unwrap();
        let node = tree.find("guides/advanced/tuning.md").unwrap();
        assert_eq!(node.name, "tuning.md");
        assert!(tree.find("guides/missing").is_none());
        assert!(tree.find("guides").unwrap().is_open);
    }

    #[test]
    fn root_is_always_the_first_row() {
        let (state, _fixture) = lazy_state();
        assert_eq!(
            labels(&state),
            vec!["docs/", "+ api/", "+ guides/", "  Alpha.md", "  zeta.md"]
        );
        assert_eq!(state.flat_lines[0].depth, 0);
        assert_eq!(state.max_label_width, "  Alpha.md".len());
    }

    #[test]
    fn expand_closed_directory_loads_and_keeps_selection() {
        let (mut state, fixture) = lazy_state();
        select(&mut state, "guides");
        assert_eq!(state.expand_or_descend().unwrap(), Activation::Navigated);
        assert_eq!(
            labels(&state),
            vec![
                "docs/",
                "+ api/",
                "- guides/",
                "  + advanced/",
                "    setup.md",
                "  Alpha.md",
                "  zeta.md"
            ]
        );
        assert_eq!(state.selected_line().unwrap().path, "guides");
        assert!(fixture.calls.borrow().contains(&"guides".to_string()));
    }

    #[test]
    fn expand_open_directory_descends_into_first_child() {
        let (mut state, _fixture) = lazy_state();
        select(&mut state, "guides");
        state.expand_or_descend().unwrap();
        state.expand_or_descend().unwrap();
        assert_eq!(state.selected_line().unwrap().path, "guides/advanced");
    }

    #[test]
    fn expand_open_empty_directory_stays_put() {
        let (mut state, _fixture) = lazy_state();
        select(&mut state, "api");
        state.expand_or_descend().unwrap();
        state.expand_or_descend().unwrap();
        assert_eq!(state.selected_line().unwrap().path, "api");
    }

    #[test]
    fn expand_file_requests_open() {
        let (mut state, _fixture) = lazy_state();
        select(&mut state, "zeta.md");
        assert_eq!(
            state.expand_or_descend().unwrap(),
            Activation::OpenFile("zeta.md".to_string())
        );
    }

    #[test]
    fn expand_failure_leaves_directory_closed() {
        let (mut state, fixture) = lazy_state();
        select(&mut state, "guides");
        *fixture.fail.borrow_mut() = true;
        assert!(state.expand_or_descend().is_err());
        assert!(!state.tree.find("guides").unwrap().is_open);
        assert!(!state.tree.find("guides").unwrap().is_loaded());

        *fixture.fail.borrow_mut() = false;
        state.expand_or_descend().unwrap();
        assert!(state.tree.find("guides").unwrap().is_loaded());
    }

    #[test]
    fn collapse_removes_descendants_and_reopen_restores_them() {
        let (mut state, fixture) = lazy_state();
        state.refresh_with_selection("guides/advanced/tuning.md").unwrap();
        let expanded = labels(&state).iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(expanded.contains(&"      tuning.md".to_string()));

        select(&mut state, "guides");
        state.collapse_or_ascend().unwrap();
        assert!(state
            .flat_lines
            .iter()
            .all(|l| !l.path.starts_with("guides/")));
        assert_eq!(state.selected_line().unwrap().path, "guides");

        let calls_before = fixture.calls.borrow().len();
        state.expand_or_descend().unwrap();
        let reopened = labels(&state).iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(reopened, expanded);
        assert_eq!(fixture.calls.borrow().len(), calls_before);
    }

    #[test]
    fn collapse_on_file_ascends_to_parent() {
        let (mut state, _fixture) = lazy_state();
        state.refresh_with_selection("guides/setup.md").unwrap();
        assert_eq!(state.selected_line().unwrap().path, "guides/setup.md");
        state.collapse_or_ascend().unwrap();
        assert_eq!(state.selected_line().unwrap().path, "guides");
        assert!(state.selected_line().unwrap().is_open);
    }

    #[test]
    fn collapse_on_closed_top_level_directory_ascends_to_root() {
        let (mut state, _fixture) = lazy_state();
        select(&mut state, "api");
        state.collapse_or_ascend().unwrap();
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn collapse_root_hides_everything_else() {
        let (mut state, _fixture) = lazy_state();
        state.select_first();
        state.collapse_or_ascend().unwrap();
        assert_eq!(labels(&state), vec!["docs/"]);
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn move_selection_clamps_instead_of_wrapping() {
        let (mut state, _fixture) = lazy_state();
        state.move_selection(-3);
        assert_eq!(state.selected_index, 0);
        state.move_selection(100);
        assert_eq!(state.selected_index, state.flat_lines.len() - 1);
    }

    #[test]
    fn select_first_and_last() {
        let (mut state, _fixture) = lazy_state();
        state.select_last();
        assert_eq!(state.selected_line().unwrap().path, "zeta.md");
        state.select_first();
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn selection_scrolls_tree_view_minimally() {
        let (mut state, _fixture) = lazy_state();
        state.refresh_with_selection("guides/advanced/tuning.md").unwrap();
        state.view.set_size(30, 3);
        state.select_first();
        assert_eq!(state.view.offset(), 0);
        state.move_selection(4);
        assert_eq!(state.view.offset(), 2);
        state.move_selection(-1);
        assert_eq!(state.view.offset(), 2);
        state.move_selection(-3);
        assert_eq!(state.view.offset(), 0);
    }

    #[test]
    fn refresh_with_missing_path_clamps_selection() {
        let (mut state, _fixture) = lazy_state();
        state.selected_index = 99;
        state.refresh_with_selection("nowhere/else.md").unwrap();
        assert_eq!(state.selected_index, state.flat_lines.len() - 1);
    }

    #[test]
    fn format_label_shapes() {
        assert_eq!(format_label("docs", true, true, 0), "docs/");
        assert_eq!(format_label("sub", true, false, 1), "+ sub/");
        assert_eq!(format_label("sub", true, true, 2), "  - sub/");
        assert_eq!(format_label("a.md", false, false, 2), "    a.md");
    }

    #[test]
    fn join_path_handles_root() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", "b.md"), "a/b.md");
    }
}

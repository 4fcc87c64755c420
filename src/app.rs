use std::fmt::Display;
use std::path::{Path, PathBuf};

use ratatui::text::Text;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::document::{compose_display_path, plain_text, read_document, read_file, Renderer};
use crate::error::{AppError, Result};
use crate::fs::build::{build, build_filtered, collect_documents};
use crate::fs::loader::FsLoader;
use crate::fs::tree::{Activation, DocTree, TreeState};
use crate::fs::watcher::{FileWatcher, WatchMessage};
use crate::search::{SearchOutcome, SearchState};
use crate::theme::{resolve_theme, ThemeColors};
use crate::viewport::Viewport;

/// Narrowest the document pane may get while the tree is shown.
pub const MIN_CONTENT_WIDTH: usize = 20;
/// Narrowest tree panel, frame included.
pub const MIN_TREE_PANEL_WIDTH: usize = 18;
/// Columns the tree panel spends on padding and its right border.
pub const TREE_FRAME: usize = 3;
/// Horizontal padding around the document text.
pub const CONTENT_PADDING: usize = 2;
/// Rows reserved for the status bar.
pub const STATUS_HEIGHT: usize = 1;

const SEARCH_INPUT_LIMIT: usize = 256;
const DIRECTORY_HINT: &str = "Select a document in the tree (l / Enter to open, ? for help).";

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tree,
    Content,
}

/// The single status slot shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Error(String),
    Info(String),
}

/// Everything needed to start a browsing session.
pub struct Session {
    pub tree: Option<TreeState>,
    pub raw_content: String,
    pub header_path: String,
    pub root_dir: Option<PathBuf>,
    pub display_root: String,
    pub active_path: Option<PathBuf>,
    /// Tree row to select (and expand towards) on start.
    pub selection_path: String,
    pub focus_tree: bool,
}

fn display_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string())
}

impl Session {
    /// Tree session over a directory, scanned lazily or all at once.
    pub fn directory(root: &Path, eager: bool) -> Result<Self> {
        let display_root = display_name(root);
        let tree = if eager {
            let files = collect_documents(root)?;
            info!(count = files.len(), "scanned documents");
            DocTree::eager(build(&display_root, &files))
        } else {
            DocTree::lazy(display_root.clone(), Box::new(FsLoader::new(root)))
        };
        Ok(Self {
            tree: Some(TreeState::new(tree)),
            raw_content: DIRECTORY_HINT.to_string(),
            header_path: format!("{}/", display_root),
            root_dir: Some(root.to_path_buf()),
            display_root,
            active_path: None,
            selection_path: String::new(),
            focus_tree: true,
        })
    }

    /// Tree session restricted to the documents carrying `tag`.
    pub fn tagged(root: &Path, tag: &str, files: &[String]) -> Result<Self> {
        let first = files
            .first()
            .ok_or_else(|| AppError::InvalidPath(format!("no documents tagged \"{}\"", tag)))?;
        let display_root = display_name(root);
        let tree = DocTree::eager(build_filtered(&display_root, files));
        Ok(Self {
            tree: Some(TreeState::new(tree)),
            raw_content: format!("Select a document tagged \"{}\".", tag),
            header_path: format!("{}/ (tag: {})", display_root, tag),
            root_dir: Some(root.to_path_buf()),
            display_root,
            active_path: None,
            selection_path: first.trim_matches('/').to_string(),
            focus_tree: true,
        })
    }

    /// Single-document session without a tree.
    pub fn file(path: &Path) -> Result<Self> {
        let raw_content = read_file(path)?;
        Ok(Self {
            tree: None,
            raw_content,
            header_path: path.display().to_string(),
            root_dir: path.parent().map(Path::to_path_buf),
            display_root: String::new(),
            active_path: Some(path.to_path_buf()),
            selection_path: String::new(),
            focus_tree: false,
        })
    }
}

/// Width of the tree panel, frame included, for a terminal `total` columns wide.
pub fn compute_tree_width(total: usize, preferred: usize) -> usize {
    let min_panel = MIN_TREE_PANEL_WIDTH.saturating_sub(TREE_FRAME);
    let max_panel = (total / 2).saturating_sub(TREE_FRAME).max(min_panel);
    let mut width = preferred.clamp(min_panel, max_panel) + TREE_FRAME;
    if total.saturating_sub(width) < MIN_CONTENT_WIDTH {
        width = total.saturating_sub(MIN_CONTENT_WIDTH);
    }
    width.min(total)
}

/// Main application state.
///
/// Every mutation happens here, one event at a time, on the control loop.
pub struct App {
    pub tree: Option<TreeState>,
    pub tree_visible: bool,
    pub focus: Focus,
    pub show_help: bool,
    pub should_quit: bool,
    pub content_view: Viewport,
    pub rendered: Text<'static>,
    pub search: SearchState,
    /// Text being typed at the `/` prompt; `None` when the prompt is closed.
    pub search_input: Option<String>,
    /// First key of a two-key sequence, kept for exactly one more key.
    pub pending_key: Option<char>,
    pub status: Option<Status>,
    pub header_path: String,
    pub theme: ThemeColors,
    /// Current tree panel width including its frame; 0 when hidden.
    pub tree_width: usize,
    raw_content: String,
    plain: String,
    renderer: Box<dyn Renderer>,
    watcher: Option<FileWatcher>,
    root_dir: Option<PathBuf>,
    display_root: String,
    active_path: Option<PathBuf>,
    fixed_tree_width: Option<usize>,
    width: usize,
    height: usize,
}

impl App {
    pub fn new(
        session: Session,
        renderer: Box<dyn Renderer>,
        watcher: Option<FileWatcher>,
        config: &AppConfig,
    ) -> Self {
        let tree_visible = session.tree.is_some() && config.tree_visible();
        let focus = if session.focus_tree && tree_visible {
            Focus::Tree
        } else {
            Focus::Content
        };
        let mut app = Self {
            tree: session.tree,
            tree_visible,
            focus,
            show_help: false,
            should_quit: false,
            content_view: Viewport::default(),
            rendered: Text::default(),
            search: SearchState::new(),
            search_input: None,
            pending_key: None,
            status: None,
            header_path: session.header_path,
            theme: resolve_theme(config.theme_scheme(), config.theme.custom.as_ref()),
            tree_width: 0,
            raw_content: session.raw_content,
            plain: String::new(),
            renderer,
            watcher,
            root_dir: session.root_dir,
            display_root: session.display_root,
            active_path: session.active_path,
            fixed_tree_width: config.tree_width().map(usize::from),
            width: 0,
            height: 0,
        };

        if let Some(tree) = app.tree.as_mut() {
            let refreshed = tree.refresh_with_selection(&session.selection_path);
            let empty = tree.tree.root.children.is_empty();
            if let Err(e) = refreshed {
                app.set_error(e);
            } else if empty {
                app.raw_content = format!("No documents found under {}.", app.display_root);
            }
        }
        if let Some(path) = app.active_path.clone() {
            app.start_watching(&path);
        }
        app
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.active_path.as_deref()
    }

    fn set_error(&mut self, err: impl Display) {
        let message = err.to_string();
        warn!(error = %message, "operation failed");
        self.status = Some(Status::Error(message));
    }

    // ── Layout ──────────────────────────────────────────────────────────────

    fn preferred_tree_width(&self) -> usize {
        match (self.fixed_tree_width, self.tree.as_ref()) {
            (Some(width), _) => width,
            (None, Some(tree)) => (tree.max_label_width + 4).max(MIN_TREE_PANEL_WIDTH),
            (None, None) => MIN_TREE_PANEL_WIDTH,
        }
    }

    /// Lay the panes out for a `width` x `height` terminal and re-render.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == 0 || height <= STATUS_HEIGHT {
            return;
        }
        self.width = width;
        self.height = height;

        self.tree_width = if self.tree_visible && self.tree.is_some() {
            compute_tree_width(width, self.preferred_tree_width())
        } else {
            0
        };
        let body_height = height - STATUS_HEIGHT;
        self.content_view
            .set_size(width - self.tree_width, body_height);

        let tree_inner = self.tree_width.saturating_sub(TREE_FRAME);
        if let Some(tree) = self.tree.as_mut() {
            tree.view.set_size(tree_inner, body_height);
            tree.ensure_selection_visible();
        }

        self.render_content();
    }

    fn relayout(&mut self) {
        self.resize(self.width, self.height);
    }

    // ── Rendering & search ─────────────────────────────────────────────────

    /// Re-render the raw document for the current width.
    ///
    /// Success clears the status slot; the previous rendering is kept on failure.
    pub fn render_content(&mut self) -> bool {
        let wrap_width = self.content_view.width.saturating_sub(CONTENT_PADDING);
        match self.renderer.render(&self.raw_content, wrap_width) {
            Ok(text) => {
                self.plain = plain_text(&text);
                self.content_view.set_total_lines(text.lines.len());
                self.rendered = text;
                self.status = None;
                let outcome = self.search.on_content_changed(&self.plain);
                self.apply_search_outcome(outcome);
                true
            }
            Err(e) => {
                self.set_error(e);
                false
            }
        }
    }

    fn apply_search_outcome(&mut self, outcome: SearchOutcome) {
        match outcome {
            SearchOutcome::Found(line) => self.content_view.set_offset(line),
            SearchOutcome::NoMatch => {
                self.status = Some(Status::Info(format!(
                    "No match for \"{}\"",
                    self.search.query()
                )));
            }
            SearchOutcome::Inactive => {}
        }
    }

    /// Open the `/` prompt, prefilled with the previous query.
    pub fn enter_search(&mut self) {
        self.pending_key = None;
        self.search_input = Some(self.search.query().to_string());
    }

    pub fn cancel_search(&mut self) {
        self.search_input = None;
    }

    pub fn push_search_char(&mut self, c: char) {
        if let Some(input) = self.search_input.as_mut() {
            if input.chars().count() < SEARCH_INPUT_LIMIT {
                input.push(c);
            }
        }
    }

    pub fn pop_search_char(&mut self) {
        if let Some(input) = self.search_input.as_mut() {
            input.pop();
        }
    }

    /// Close the prompt and run what was typed. An empty query clears the search.
    pub fn submit_search(&mut self) {
        let Some(input) = self.search_input.take() else {
            return;
        };
        self.perform_search(&input);
    }

    pub fn perform_search(&mut self, query: &str) {
        self.status = None;
        let outcome = self.search.perform(query, &self.plain);
        self.apply_search_outcome(outcome);
    }

    pub fn next_match(&mut self) {
        if let Some(line) = self.search.next_match() {
            self.status = None;
            self.content_view.set_offset(line);
        }
    }

    pub fn previous_match(&mut self) {
        if let Some(line) = self.search.previous_match() {
            self.status = None;
            self.content_view.set_offset(line);
        }
    }

    // ── Focus & panes ──────────────────────────────────────────────────────

    pub fn focus_tree(&mut self) {
        if self.tree_visible && self.tree.is_some() {
            self.focus = Focus::Tree;
        }
    }

    pub fn focus_content(&mut self) {
        self.focus = Focus::Content;
    }

    /// Show or hide the tree panel. Hiding it moves focus to the document.
    pub fn toggle_tree(&mut self) {
        if self.tree.is_none() {
            return;
        }
        self.tree_visible = !self.tree_visible;
        if !self.tree_visible {
            self.focus = Focus::Content;
        }
        self.relayout();
    }

    pub fn tree_focused(&self) -> bool {
        self.focus == Focus::Tree && self.tree_visible && self.tree.is_some()
    }

    // ── Tree navigation ────────────────────────────────────────────────────

    pub fn move_tree_selection(&mut self, delta: isize) {
        if let Some(tree) = self.tree.as_mut() {
            tree.move_selection(delta);
        }
    }

    /// Move the tree selection by half the panel height.
    pub fn tree_half_page(&mut self, down: bool) {
        if let Some(tree) = self.tree.as_mut() {
            let step = tree.view.half_page() as isize;
            tree.move_selection(if down { step } else { -step });
        }
    }

    pub fn tree_select_first(&mut self) {
        if let Some(tree) = self.tree.as_mut() {
            tree.select_first();
        }
    }

    pub fn tree_select_last(&mut self) {
        if let Some(tree) = self.tree.as_mut() {
            tree.select_last();
        }
    }

    /// Expand, descend into, or open the selected row.
    pub fn expand_or_open(&mut self) {
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        match tree.expand_or_descend() {
            Ok(Activation::OpenFile(rel)) => self.open_file(&rel),
            Ok(_) => {}
            Err(e) => self.set_error(e),
        }
    }

    pub fn collapse_or_ascend(&mut self) {
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        if let Err(e) = tree.collapse_or_ascend() {
            self.set_error(e);
        }
    }

    /// Show the document at root-relative `rel` and start watching it.
    pub fn open_file(&mut self, rel: &str) {
        let Some(root) = self.root_dir.as_deref() else {
            return;
        };
        let (path, content) = match read_document(root, rel) {
            Ok(doc) => doc,
            Err(e) => {
                self.set_error(e);
                return;
            }
        };
        info!(path = %path.display(), "opened document");
        self.raw_content = content;
        self.header_path = compose_display_path(&self.display_root, rel);
        self.active_path = Some(path.clone());
        let rendered = self.render_content();
        self.content_view.goto_top();
        if rendered {
            self.start_watching(&path);
        }
    }

    fn start_watching(&mut self, path: &Path) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };
        if let Err(e) = watcher.start_watching(path) {
            self.set_error(e);
        }
    }

    // ── Watch reactor ──────────────────────────────────────────────────────

    /// React to a message from the watcher relay.
    ///
    /// Changes to anything but the watched file are dropped.
    pub fn handle_watch_message(&mut self, message: WatchMessage) {
        match message {
            WatchMessage::Changed { path, kind } => {
                let watched = self
                    .watcher
                    .as_ref()
                    .is_some_and(|watcher| watcher.is_watched(&path));
                if !watched {
                    return;
                }
                info!(path = %path.display(), ?kind, "watched document changed");
                self.reload_active_file();
            }
            WatchMessage::Error(message) => self.set_error(message),
        }
    }

    /// Re-read the open document, keeping the scroll position where possible.
    pub fn reload_active_file(&mut self) {
        let Some(path) = self.active_path.clone() else {
            return;
        };
        let content = match read_file(&path) {
            Ok(content) => content,
            Err(e) => {
                self.set_error(e);
                return;
            }
        };
        let offset = self.content_view.offset();
        self.raw_content = content;
        if self.render_content() {
            self.content_view.set_offset(offset);
        }
    }

    // ── Document scrolling ─────────────────────────────────────────────────

    pub fn scroll_content(&mut self, lines: isize) {
        if lines >= 0 {
            self.content_view.scroll_down(lines.unsigned_abs());
        } else {
            self.content_view.scroll_up(lines.unsigned_abs());
        }
    }

    pub fn content_half_page(&mut self, down: bool) {
        if down {
            self.content_view.half_page_down();
        } else {
            self.content_view.half_page_up();
        }
    }

    pub fn content_page(&mut self, down: bool) {
        let page = self.content_view.height.max(1);
        if down {
            self.content_view.scroll_down(page);
        } else {
            self.content_view.scroll_up(page);
        }
    }
}

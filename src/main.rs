mod app;
mod components;
mod config;
mod document;
mod error;
mod event;
mod fs;
mod handler;
mod logging;
mod search;
mod tags;
mod theme;
mod tui;
mod ui;
mod viewport;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

use crate::app::{App, Session};
use crate::config::AppConfig;
use crate::document::MarkdownRenderer;
use crate::error::{AppError, Result};
use crate::event::{Event, EventHandler};
use crate::fs::watcher::{FileWatcher, WatchMessage};
use crate::tui::{install_panic_hook, Tui};

const TICK_RATE_MS: u64 = 250;

/// A terminal browser for directories of Markdown documents.
#[derive(Parser, Debug)]
#[command(name = "mdnav", version, about)]
struct Cli {
    /// Directory or document to browse (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Scan the whole directory up front instead of on expansion
    #[arg(long)]
    eager: bool,

    /// Do not reload the open document when it changes on disk
    #[arg(long)]
    no_watcher: bool,

    /// Pick a front-matter tag and browse only the documents carrying it
    #[arg(short = 't', long)]
    tags: bool,

    /// Path to a config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Append logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Partial config built from flags; `Some` values override config files.
    fn overrides(&self) -> AppConfig {
        let mut overrides = AppConfig::default();
        if self.eager {
            overrides.tree.scan = Some("eager".to_string());
        }
        if self.no_watcher {
            overrides.watcher.enabled = Some(false);
        }
        overrides.log.file = self
            .log_file
            .clone()
            .or_else(|| std::env::var_os("MDNAV_LOG").map(PathBuf::from));
        overrides
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    logging::init(config.log_file(), config.log_level())?;

    let target = cli.path.canonicalize().map_err(|_| {
        AppError::InvalidPath(format!("{} does not exist", cli.path.display()))
    })?;
    info!(target = %target.display(), "starting");

    let session = if cli.tags {
        match choose_tag_session(&target)? {
            Some(session) => session,
            None => return Ok(()),
        }
    } else if target.is_dir() {
        Session::directory(&target, config.eager_scan())?
    } else {
        Session::file(&target)?
    };

    run(session, &config).await
}

/// Run the tag menu on stdin/stdout. Returns `None` when there is nothing to browse.
fn choose_tag_session(target: &Path) -> Result<Option<Session>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !target.is_dir() {
        let display = target.display().to_string();
        let index = tags::build_file_index(target, &display)?;
        if index.is_empty() {
            writeln!(out, "No tags found in {}.", display)?;
        } else {
            writeln!(out, "Tags in {}:", display)?;
            for tag in index.tags() {
                writeln!(out, "  {}", tag)?;
            }
        }
        return Ok(None);
    }

    let index = tags::build_directory_index(target)?;
    if index.is_empty() {
        writeln!(out, "No tags found under {}.", target.display())?;
        return Ok(None);
    }

    tags::print_menu(&index, &mut out)?;
    let tag_names = index.tags();
    let stdin = io::stdin();
    let choice = tags::prompt_selection(&mut stdin.lock(), &mut out, tag_names.len())?;
    let Some(tag) = choice.and_then(|i| tag_names.get(i).copied()) else {
        return Ok(None);
    };
    info!(tag, files = index.files(tag).len(), "filtering by tag");
    Session::tagged(target, tag, index.files(tag)).map(Some)
}

async fn next_watch_message(rx: &mut Option<mpsc::Receiver<WatchMessage>>) -> Option<WatchMessage> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn run(session: Session, config: &AppConfig) -> Result<()> {
    let renderer = MarkdownRenderer::new(config.syntax_theme_name(), config.tab_width());
    let (watcher, mut watch_rx) = if config.watcher_enabled() {
        let (watcher, rx) = FileWatcher::new();
        (Some(watcher), Some(rx))
    } else {
        (None, None)
    };

    install_panic_hook();
    let mut tui = Tui::new()?;
    let mut app = App::new(session, Box::new(renderer), watcher, config);
    let mut events = EventHandler::new(Duration::from_millis(TICK_RATE_MS));

    let result = event_loop(&mut tui, &mut app, &mut events, &mut watch_rx).await;
    tui.restore()?;
    result
}

async fn event_loop(
    tui: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
    watch_rx: &mut Option<mpsc::Receiver<WatchMessage>>,
) -> Result<()> {
    let (width, height) = tui.size()?;
    app.resize(width as usize, height as usize);

    loop {
        tui.terminal_mut().draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            event = events.next() => match event? {
                Event::Key(key) => handler::handle_key_event(app, key),
                Event::Resize(w, h) => app.resize(w as usize, h as usize),
                Event::Tick => {}
            },
            Some(message) = next_watch_message(watch_rx) => app.handle_watch_message(message),
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

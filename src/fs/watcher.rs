use std::path::{Component, Path, PathBuf};

use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::Result;

/// Pending watch messages the control loop has not drained yet.
pub const WATCH_QUEUE_CAPACITY: usize = 10;

/// Filesystem operations that are relayed to the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Rename,
    Remove,
}

/// Message sent from the watcher relay to the control loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchMessage {
    Changed { path: PathBuf, kind: ChangeKind },
    Error(String),
}

/// Map a raw notify event kind to a relayed kind. Access and metadata-only
/// events are dropped.
pub fn relay_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Create),
        EventKind::Remove(_) => Some(ChangeKind::Remove),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Rename),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(ChangeKind::Write),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Lexically clean a path: drop `.` components and resolve `..` against
/// preceding normal components. The filesystem is never consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Forward relevant raw events to the control loop until either side closes.
///
/// Each path of a multi-path event becomes its own message.
pub async fn relay_events(
    mut raw_rx: mpsc::UnboundedReceiver<notify::Result<notify::Event>>,
    tx: mpsc::Sender<WatchMessage>,
) {
    while let Some(result) = raw_rx.recv().await {
        let messages: Vec<WatchMessage> = match result {
            Ok(event) => match relay_kind(&event.kind) {
                Some(kind) => event
                    .paths
                    .into_iter()
                    .map(|path| WatchMessage::Changed { path, kind })
                    .collect(),
                None => continue,
            },
            Err(e) => {
                warn!(error = %e, "watcher reported an error");
                vec![WatchMessage::Error(e.to_string())]
            }
        };
        for message in messages {
            if tx.send(message).await.is_err() {
                return;
            }
        }
    }
}

/// Watches the directory of the single open document.
///
/// The OS watcher and its relay task are created on first use and live for
/// the rest of the process. Messages arrive on the receiver returned by `new`.
pub struct FileWatcher {
    watcher: Option<RecommendedWatcher>,
    watch_dir: Option<PathBuf>,
    watched_file: Option<PathBuf>,
    tx: mpsc::Sender<WatchMessage>,
}

impl FileWatcher {
    pub fn new() -> (Self, mpsc::Receiver<WatchMessage>) {
        let (tx, rx) = mpsc::channel(WATCH_QUEUE_CAPACITY);
        let watcher = Self {
            watcher: None,
            watch_dir: None,
            watched_file: None,
            tx,
        };
        (watcher, rx)
    }

    /// A watcher that already considers `path` watched, with no OS subscription.
    #[cfg(test)]
    pub fn watching(path: &Path) -> (Self, mpsc::Receiver<WatchMessage>) {
        let (mut watcher, rx) = Self::new();
        let file = normalize_path(path);
        watcher.watch_dir = file.parent().map(Path::to_path_buf);
        watcher.watched_file = Some(file);
        (watcher, rx)
    }

    fn ensure_watcher(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            return Ok(());
        }
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = raw_tx.send(res);
        })?;
        tokio::spawn(relay_events(raw_rx, self.tx.clone()));
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Make `path` the watched file, moving the directory subscription if
    /// the file lives somewhere else than the previous one.
    pub fn start_watching(&mut self, path: &Path) -> Result<()> {
        let file = normalize_path(path);
        self.ensure_watcher()?;
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if self.watch_dir.as_deref() != Some(dir.as_path()) {
            let Some(watcher) = self.watcher.as_mut() else {
                return Ok(());
            };
            if let Some(old) = self.watch_dir.take() {
                if let Err(e) = watcher.unwatch(&old) {
                    warn!(dir = %old.display(), error = %e, "failed to unsubscribe");
                }
            }
            if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
                self.watched_file = None;
                return Err(e.into());
            }
            info!(dir = %dir.display(), "subscribed to directory");
            self.watch_dir = Some(dir);
        }

        self.watched_file = Some(file);
        Ok(())
    }

    #[cfg(test)]
    pub fn watched_file(&self) -> Option<&Path> {
        self.watched_file.as_deref()
    }

    #[cfg(test)]
    pub fn watch_dir(&self) -> Option<&Path> {
        self.watch_dir.as_deref()
    }

    /// Whether an event for `path` concerns the watched file.
    pub fn is_watched(&self, path: &Path) -> bool {
        self.watched_file
            .as_deref()
            .is_some_and(|watched| watched == normalize_path(path))
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from directory listings and file reads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A directory listing was requested for something that is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The document renderer failed.
    #[error("Render error: {0}")]
    Render(String),

    /// The filesystem watcher could not be created or subscribed.
    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Front matter could not be parsed.
    #[error("Front matter error: {0}")]
    FrontMatter(String),

    /// Logging or configuration setup failed.
    #[error("Config error: {0}")]
    Config(String),
}

//! Error types
//!
//! Fatal errors (`RepositoryError`, `OutputError`, `ConfigError`) abort the run.
//! Per-file errors (`ReadError`, `ConversionError`) are recovered where they occur
//! and only ever surface as placeholders or fallbacks in the output.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Path does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Not a git repository: {}", path.display())]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Repository has no working tree (bare repository): {}", path.display())]
    Bare { path: PathBuf },

    #[error("Failed to list files in {}: {source}", path.display())]
    Enumerate {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Repository URL cannot be empty")]
    EmptyUrl,

    #[error("Failed to clone {url}: {source}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("Cannot check out '{reference}': {source}")]
    Ref {
        reference: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to create temporary directory for clone: {0}")]
    TempDir(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("conversion produced no text")]
    Empty,

    #[error("markup remained after conversion")]
    LeftoverMarkup,

    #[error("HTML conversion failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid ignore file {}: {source}", path.display())]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire installer backend.
/// Every module returns `Result<T, InstallerError>`.
#[derive(Debug, Error)]
pub enum InstallerError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("No mirror provided version information")]
    NoMirrors,

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("No installable packages were found in any manifest")]
    EmptyCatalog,

    #[error("Manifest parse error: {0}")]
    ManifestParse(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Destination directory ───────────────────────────
    #[error("Destination directory is not readable: {0:?}")]
    ReadAccess(PathBuf),

    #[error("Destination directory is not writable: {0:?}")]
    WriteAccess(PathBuf),

    #[error("Could not delete from the destination directory: {0:?}")]
    DeleteAccess(PathBuf),

    // ── Proxy ───────────────────────────────────────────
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    // ── Control flow ────────────────────────────────────
    #[error("Operation cancelled")]
    Cancelled,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type InstallerResult<T> = Result<T, InstallerError>;

impl From<std::io::Error> for InstallerError {
    fn from(source: std::io::Error) -> Self {
        InstallerError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

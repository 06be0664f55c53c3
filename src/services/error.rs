use crate::services::format::FormatError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors returned by the diagnostics facility
#[derive(Error, Debug)]
pub enum DiagnosticsError {
    #[error("User data folder could not be resolved")]
    DataFolderUnavailable,

    #[error("Failed to scan diagnostics folders in {path}: {source}")]
    FolderScan {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create diagnostics folder {path}: {source}")]
    FolderCreate {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log format {template:?}: {source}")]
    Format {
        template: String,
        #[source]
        source: FormatError,
    },

    #[error("Diagnostics released")]
    Released,

    #[error("Failed to open diagnostics file for thread {thread_id}: {source}")]
    SinkInit {
        thread_id: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write diagnostics for thread {thread_id}: {source}")]
    SinkWrite {
        thread_id: u64,
        #[source]
        source: std::io::Error,
    },
}

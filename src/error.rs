//! Error type shared by every layer of the crate.
//!
//! Only environment and configuration problems are errors. Lint findings and
//! missing allowlist entries are data and never surface here.

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external program could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A version-control query exited unsuccessfully.
    #[error("`{command}` exited with status {status}")]
    CommandFailed { command: String, status: i32 },

    /// `git log` returned nothing for a file that was reported as changed.
    #[error("no commit history found for {0}")]
    NoHistory(String),

    #[error("unparseable commit date {value:?} for {path}: {source}")]
    CommitDate {
        path: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("failed to read allowlist {path}: {source}")]
    Allowlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report buffer: {0}")]
    ReportBuffer(#[source] std::io::Error),

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("unknown tool {name:?} (available: {available})")]
    UnknownTool { name: String, available: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("GitHub API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

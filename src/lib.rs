//! checkcode: a CI helper that lints changed PHP files and reports on GitHub.
//!
//! Files changed relative to a reference branch are run through one lint
//! tool. Each file is classified as must-pass or exempt from its first-commit
//! date (against a cutoff) and an allowlist of grandfathered paths; the
//! results are rendered as a markdown comment and the exit code gates CI.
//!
//! # Architecture
//!
//! - **[`runner`]**: Process invocation behind the [`runner::CommandRunner`] trait.
//! - **[`vcs`]**: Git queries: changed files, days from the cutoff to a file's first commit.
//! - **[`allowlist`]**: Substring-matched list of grandfathered files.
//! - **[`lint`]**: Tool registry built from configuration, with per-tool output normalizers.
//! - **[`eval`]**: Decision engine: per-file verdicts, failure tally, allowlist additions.
//! - **[`report`]**: Markdown rendering into a scoped temporary buffer.
//! - **[`publish`]**: Stdout preview or GitHub pull request comment.
//! - **[`app`]**: Quick and full run modes.
//! - **[`config`]**: Embedded defaults plus TOML overlays.

/// Grandfathered file list.
pub mod allowlist;
/// Quick and full run modes.
pub mod app;
/// Command-line arguments and validation.
pub mod cli;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Crate error type.
pub mod error;
/// Decision engine: classification and tally.
pub mod eval;
/// Lint tool registry and normalizers.
pub mod lint;
/// Stderr logging setup.
pub mod logging;
/// Report delivery.
pub mod publish;
/// Markdown report rendering.
pub mod report;
/// External process invocation.
pub mod runner;
/// Git queries.
pub mod vcs;

pub use error::{Error, Result};

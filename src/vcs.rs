//! Git queries: which tracked files changed, and when each was first committed.

use chrono::{DateTime, NaiveDate};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::runner::{CommandRunner, display_command};

/// Diff filter class relative to the reference branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffFilter {
    Added,
    Modified,
    AddedOrModified,
}

impl DiffFilter {
    /// The `--diff-filter` letters.
    pub fn as_str(self) -> &'static str {
        match self {
            DiffFilter::Added => "A",
            DiffFilter::Modified => "M",
            DiffFilter::AddedOrModified => "AM",
        }
    }
}

/// Changed files of the tracked extension, split by diff filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len()
    }

    /// Added files in VCS order, then modified files in VCS order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(self.modified.iter())
            .map(String::as_str)
    }
}

/// Git-backed queries against the working tree.
pub struct Vcs<'a> {
    runner: &'a dyn CommandRunner,
    base_branch: String,
    extension: String,
    cutoff: NaiveDate,
}

impl<'a> Vcs<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &Settings) -> Result<Self> {
        Ok(Self {
            runner,
            base_branch: settings.base_branch.clone(),
            extension: settings.extension.clone(),
            cutoff: settings.cutoff()?,
        })
    }

    pub fn cutoff(&self) -> NaiveDate {
        self.cutoff
    }

    fn git(&self, args: Vec<String>) -> Result<String> {
        let output = self.runner.run("git", &args)?;
        if !output.is_success() {
            return Err(Error::CommandFailed {
                command: display_command("git", &args),
                status: output.code.unwrap_or(-1),
            });
        }
        Ok(output.stdout)
    }

    /// Files of the tracked extension that differ from the base branch.
    pub fn changed_files(&self, filter: DiffFilter) -> Result<Vec<String>> {
        let stdout = self.git(vec![
            "diff".into(),
            self.base_branch.clone(),
            "--name-only".into(),
            format!("--diff-filter={}", filter.as_str()),
        ])?;

        Ok(stdout
            .split_whitespace()
            .filter(|path| path.ends_with(&self.extension))
            .map(str::to_string)
            .collect())
    }

    /// Query added then modified files.
    pub fn change_set(&self) -> Result<ChangeSet> {
        Ok(ChangeSet {
            added: self.changed_files(DiffFilter::Added)?,
            modified: self.changed_files(DiffFilter::Modified)?,
        })
    }

    /// Signed whole days from the cutoff date to the file's first commit.
    ///
    /// Negative when the file predates the cutoff. The author's wall-clock
    /// date is used; the timezone offset is discarded.
    pub fn days_since_cutoff(&self, path: &str) -> Result<i64> {
        let stdout = self.git(vec![
            "log".into(),
            "--format=%aD".into(),
            "--".into(),
            path.to_string(),
        ])?;

        // Log is newest-first; the creation commit is the last entry.
        let oldest = stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .ok_or_else(|| Error::NoHistory(path.to_string()))?;

        days_between(self.cutoff, oldest).map_err(|source| Error::CommitDate {
            path: path.to_string(),
            value: oldest.to_string(),
            source,
        })
    }
}

/// Day difference between an RFC 2822 commit date and `cutoff`.
fn days_between(
    cutoff: NaiveDate,
    commit_date: &str,
) -> std::result::Result<i64, chrono::ParseError> {
    let created = DateTime::parse_from_rfc2822(commit_date)?.naive_local().date();
    Ok((created - cutoff).num_days())
}

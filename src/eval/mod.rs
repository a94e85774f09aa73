pub mod verdict;

pub use verdict::{FileVerdict, RequiredStatus, RunTally};

use crate::allowlist::Allowlist;
use crate::error::Result;
use crate::lint::LintTool;
use crate::runner::CommandRunner;
use crate::vcs::Vcs;

/// Classifies changed files against one lint tool.
pub struct DecisionEngine<'a> {
    tool: &'a LintTool,
    runner: &'a dyn CommandRunner,
    vcs: &'a Vcs<'a>,
    allowlist: &'a Allowlist,
}

impl<'a> DecisionEngine<'a> {
    pub fn new(
        tool: &'a LintTool,
        runner: &'a dyn CommandRunner,
        vcs: &'a Vcs<'a>,
        allowlist: &'a Allowlist,
    ) -> Self {
        Self {
            tool,
            runner,
            vcs,
            allowlist,
        }
    }

    /// Lint one file and decide whether it is held to a clean report.
    ///
    /// Any process failure is returned as-is; there is no per-file recovery.
    pub fn classify(&self, path: &str) -> Result<FileVerdict> {
        let raw = self.tool.run(self.runner, path)?;
        let report = self.tool.normalize(&raw);
        let days = self.vcs.days_since_cutoff(path)?;
        let allowlisted = self.allowlist.contains(path);

        let verdict = FileVerdict::new(path, raw, report, days, allowlisted);
        log::info!(
            "{path}: {} ({}, {days} days from cutoff{})",
            if verdict.is_clean { "clean" } else { "findings" },
            verdict.required_status.label(),
            if allowlisted { ", allowlisted" } else { "" },
        );
        Ok(verdict)
    }
}

/// Aggregate failures and collect files that must be added to the allowlist.
///
/// A clean file that predates the cutoff and is not yet allowlisted counts as
/// a failure under its status AND is queued for allowlisting. A dirty file in
/// the same position is only counted, never queued.
pub fn tally<'v>(verdicts: impl IntoIterator<Item = &'v FileVerdict>) -> (RunTally, Vec<String>) {
    let mut counts = RunTally::default();
    let mut additions = Vec::new();

    for verdict in verdicts {
        if !verdict.is_clean {
            counts.record(verdict.required_status);
        } else if verdict.days_since_cutoff < 0 && !verdict.allowlisted {
            additions.push(verdict.path.clone());
            counts.record(verdict.required_status);
        }
    }

    (counts, additions)
}

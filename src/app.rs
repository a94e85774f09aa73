//! Run modes: quick (print raw tool output) and full (report and publish).

use std::io::Write;

use crate::allowlist::Allowlist;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::eval::{self, DecisionEngine, FileVerdict, RunTally};
use crate::lint::ToolRegistry;
use crate::publish::{self, CommentSink, PublishTarget};
use crate::report::{self, ReportContext};
use crate::runner::CommandRunner;
use crate::vcs::{DiffFilter, Vcs};

/// Printed when neither mode finds anything to lint.
pub const NOTHING_TO_CHECK: &str = "No updated or new PHP files";

/// Result of a full-mode run that had files to check.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub verdicts: Vec<FileVerdict>,
    pub tally: RunTally,
    /// Clean pre-cutoff files that must be added to the allowlist.
    pub additions: Vec<String>,
    pub passed: bool,
    /// The rendered report, as printed or posted.
    pub report: String,
}

#[derive(Debug, Clone)]
pub enum FullRun {
    NothingToCheck,
    Completed(RunOutcome),
}

/// Split a `--file` argument into paths on whitespace. Quotes are part of
/// the path.
pub fn split_file_list(files: &str) -> Vec<String> {
    files.split_whitespace().map(str::to_string).collect()
}

/// Line printed after a dry-run report.
pub fn dry_run_summary(passed: bool) -> &'static str {
    if passed { "Test Passed" } else { "Test Failed" }
}

impl FullRun {
    /// Whether CI should succeed. Nothing to check counts as success.
    pub fn succeeded(&self) -> bool {
        match self {
            FullRun::NothingToCheck => true,
            FullRun::Completed(outcome) => outcome.passed,
        }
    }
}

/// Shared state for one invocation.
pub struct App<'a> {
    config: &'a Config,
    registry: &'a ToolRegistry,
    runner: &'a dyn CommandRunner,
}

impl<'a> App<'a> {
    pub fn new(
        config: &'a Config,
        registry: &'a ToolRegistry,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            registry,
            runner,
        }
    }

    /// Run `tool` over explicit files (or the diff) and print raw output.
    pub fn run_quick(&self, tool: &str, files: Option<&str>, out: &mut dyn Write) -> Result<()> {
        let tool = self.registry.get(tool)?;
        let files = match files {
            Some(list) => split_file_list(list),
            None => Vcs::new(self.runner, &self.config.settings)?
                .changed_files(DiffFilter::AddedOrModified)?,
        };

        if files.is_empty() {
            return writeln!(out, "{NOTHING_TO_CHECK}").map_err(Error::Output);
        }

        for file in &files {
            let raw = tool.run(self.runner, file)?;
            writeln!(out, "{file}\n{raw}").map_err(Error::Output)?;
        }
        Ok(())
    }

    /// Classify every changed file, render the report and deliver it.
    ///
    /// Nothing is rendered or published when no tracked files changed. Any
    /// environment failure aborts before publishing.
    pub fn run_full(
        &self,
        tool: &str,
        target: &PublishTarget,
        sink: &dyn CommentSink,
        out: &mut dyn Write,
    ) -> Result<FullRun> {
        let settings = &self.config.settings;
        let tool = self.registry.get(tool)?;
        let vcs = Vcs::new(self.runner, settings)?;

        let changes = vcs.change_set()?;
        if changes.is_empty() {
            return Ok(FullRun::NothingToCheck);
        }
        log::info!(
            "{} added, {} modified {} files",
            changes.added.len(),
            changes.modified.len(),
            settings.extension
        );

        let allowlist = Allowlist::load(&settings.allowlist_file())?;
        let engine = DecisionEngine::new(tool, self.runner, &vcs, &allowlist);
        let verdicts = changes
            .iter()
            .map(|path| engine.classify(path))
            .collect::<Result<Vec<_>>>()?;

        let (tally, additions) = eval::tally(&verdicts);
        let passed = tally.passed(&additions, settings.exempt_findings_fail);

        let ctx = ReportContext {
            tool,
            banner: &settings.banner,
            cutoff: vcs.cutoff(),
            allowlist_name: settings.allowlist_name(),
        };
        let text = report::render(&ctx, &verdicts, &additions)?;
        publish::publish(target, sink, &text, out)?;

        log::info!(
            "{}: {} must-pass failures, {} exempt failures, {} allowlist additions",
            if passed { "passed" } else { "failed" },
            tally.must_pass,
            tally.exempt,
            additions.len()
        );

        Ok(FullRun::Completed(RunOutcome {
            verdicts,
            tally,
            additions,
            passed,
            report: text,
        }))
    }
}

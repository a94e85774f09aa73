//! checkcode: lint changed PHP files and report on GitHub pull requests.
//!
//! Quick mode (default) runs one tool over `--file` or the branch diff and
//! prints raw output. `--update-pr` classifies every changed file against the
//! cutoff date and allowlist, renders a markdown report, and posts it (or
//! prints it with `--dry-run`). The exit code is the CI pass/fail signal.

use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use checkcode::app::{App, FullRun, NOTHING_TO_CHECK, dry_run_summary};
use checkcode::cli::Cli;
use checkcode::config::Config;
use checkcode::lint::ToolRegistry;
use checkcode::logging;
use checkcode::publish::{CommentSink, GitHubClient, PublishTarget, Unauthenticated};
use checkcode::runner::SystemRunner;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(message) = cli.validate() {
        println!("{message}");
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let registry = ToolRegistry::from_config(&config)?;
    let settings = &config.settings;
    let tool = cli.tool_name(settings);

    let runner = SystemRunner;
    let app = App::new(&config, &registry, &runner);
    let mut stdout = std::io::stdout().lock();

    if !cli.update_pr {
        app.run_quick(tool, cli.file.as_deref(), &mut stdout)?;
        return Ok(ExitCode::SUCCESS);
    }

    let target = cli.publish_target(settings);
    let sink: Box<dyn CommentSink> = match (&target, cli.token.as_deref()) {
        (PublishTarget::PullRequest { .. }, Some(token)) => Box::new(
            GitHubClient::new(&settings.api_url, token).context("creating GitHub client")?,
        ),
        _ => Box::new(Unauthenticated),
    };

    let run = app.run_full(tool, &target, sink.as_ref(), &mut stdout)?;
    match &run {
        FullRun::NothingToCheck => println!("{NOTHING_TO_CHECK}"),
        FullRun::Completed(outcome) if cli.dry_run => {
            println!("{}", dry_run_summary(outcome.passed));
        }
        FullRun::Completed(_) => {}
    }

    Ok(if run.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

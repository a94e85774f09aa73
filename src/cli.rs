use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::Settings;
use crate::publish::PublishTarget;

pub const MISSING_CREDENTIALS: &str = "You must provide PR number and git token";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "checkcode",
    version,
    about = "Lint changed PHP files and report the results on a GitHub pull request"
)]
pub struct Cli {
    #[arg(long, help = "Test suite to use: phpcs, phpstan, phpmd [default: phpcs]")]
    pub tool: Option<String>,
    #[arg(long, help = "Override git diff and select a specific file or files (space separated)")]
    pub file: Option<String>,
    #[arg(long, help = "Number of the PR (i.e. 7664)")]
    pub pr: Option<u64>,
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help = "GitHub token to use")]
    pub token: Option<String>,
    #[arg(long, help = "GitHub repo name [default: platform]")]
    pub repo: Option<String>,
    #[arg(long, help = "Attempt to add comment to the PR on GitHub")]
    pub update_pr: bool,
    #[arg(long, help = "Create GitHub report without posting")]
    pub dry_run: bool,
    #[arg(long, help = "Additional configuration overlay (TOML)")]
    pub config: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,
}

impl Cli {
    /// Full mode without dry-run needs both a PR number and a token.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.update_pr && !self.dry_run && (self.pr.is_none() || self.token.is_none()) {
            return Err(MISSING_CREDENTIALS);
        }
        Ok(())
    }

    pub fn tool_name<'a>(&'a self, settings: &'a Settings) -> &'a str {
        self.tool.as_deref().unwrap_or(&settings.default_tool)
    }

    pub fn repo_name<'a>(&'a self, settings: &'a Settings) -> &'a str {
        self.repo.as_deref().unwrap_or(&settings.default_repo)
    }

    /// Where a full-mode report goes. Call after [`Cli::validate`].
    pub fn publish_target(&self, settings: &Settings) -> PublishTarget {
        match (self.dry_run, self.pr) {
            (false, Some(number)) => PublishTarget::PullRequest {
                repo: settings.full_repo(self.repo_name(settings)),
                number,
            },
            _ => PublishTarget::Preview,
        }
    }
}

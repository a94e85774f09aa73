//! Lint tool registry: named tool definitions built from configuration.
//!
//! Each tool is an argument template (with a `FILE` placeholder) plus a
//! [`Normalizer`] that decides what counts as a clean report. The registry is
//! built once at startup and passed by reference; it is never mutated.

/// Per-tool output normalizers (pass-through, clean sentinel, ANSI strip).
pub mod normalize;

use std::collections::BTreeMap;

use crate::config::{Config, NormalizeKind, ToolConfig};
use crate::error::{Error, Result};
use crate::runner::CommandRunner;

/// Token in a tool command that is replaced by the checked path.
pub const FILE_PLACEHOLDER: &str = "FILE";

/// Trait for output post-processing.
///
/// Implementations must be idempotent: normalizing already-normalized text
/// returns it unchanged.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> String;
}

/// A registered lint tool.
pub struct LintTool {
    pub name: String,
    /// Name shown in report headers (e.g. "CodeSniffer").
    pub full_name: String,
    pub enforces_cutoff: bool,
    command: Vec<String>,
    normalizer: Box<dyn Normalizer>,
}

impl std::fmt::Debug for LintTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LintTool")
            .field("name", &self.name)
            .field("full_name", &self.full_name)
            .field("enforces_cutoff", &self.enforces_cutoff)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl LintTool {
    pub fn from_config(name: &str, config: &ToolConfig) -> Result<Self> {
        use normalize::{CleanSentinel, PassThrough, StripAnsi};

        if config.command.is_empty() {
            return Err(Error::Config(format!("tool {name:?} has an empty command")));
        }

        let normalizer: Box<dyn Normalizer> = match config.normalize {
            NormalizeKind::None => Box::new(PassThrough),
            NormalizeKind::StripAnsi => Box::new(StripAnsi),
            NormalizeKind::Sentinel => match &config.clean_sentinel {
                Some(sentinel) => Box::new(CleanSentinel::new(sentinel.clone())),
                None => {
                    return Err(Error::Config(format!(
                        "tool {name:?} uses the sentinel normalizer without clean_sentinel"
                    )));
                }
            },
        };

        Ok(Self {
            name: name.to_string(),
            full_name: config.full_name.clone(),
            enforces_cutoff: config.enforces_cutoff,
            command: config.command.clone(),
            normalizer,
        })
    }

    /// Full argument vector with every placeholder replaced by `path`.
    pub fn command_line(&self, path: &str) -> Vec<String> {
        self.command
            .iter()
            .map(|word| {
                if word == FILE_PLACEHOLDER {
                    path.to_string()
                } else {
                    word.clone()
                }
            })
            .collect()
    }

    /// Run the tool against one file and return its trimmed output.
    ///
    /// Lint tools signal findings through their exit code, so only the
    /// captured text matters here.
    pub fn run(&self, runner: &dyn CommandRunner, path: &str) -> Result<String> {
        let line = self.command_line(path);
        let (program, args) = line
            .split_first()
            .ok_or_else(|| Error::Config(format!("tool {:?} has an empty command", self.name)))?;
        let output = runner.run(program, args)?;
        log::debug!(
            "{} {path}: exit {:?}, {} bytes",
            self.name,
            output.code,
            output.stdout.len()
        );
        Ok(output.stdout)
    }

    /// Tool-specific cleanup; an empty result means the file is clean.
    pub fn normalize(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }
}

/// All configured tools, keyed by name.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: BTreeMap<String, LintTool>,
}

impl ToolRegistry {
    /// Build the registry from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tools = config
            .tools
            .iter()
            .map(|(name, tool)| -> Result<(String, LintTool)> {
                Ok((name.clone(), LintTool::from_config(name, tool)?))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { tools })
    }

    /// Look up a tool by exact name.
    pub fn get(&self, name: &str) -> Result<&LintTool> {
        self.tools.get(name).ok_or_else(|| Error::UnknownTool {
            name: name.to_string(),
            available: self.names().join(", "),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::ScriptedRunner;

    fn registry() -> ToolRegistry {
        ToolRegistry::from_config(&Config::default_config()).unwrap()
    }

    #[test]
    fn default_registry_names() {
        assert_eq!(registry().names(), vec!["phpcs", "phpmd", "phpstan"]);
    }

    #[test]
    fn unknown_tool_lists_alternatives() {
        let err = registry().get("eslint").unwrap_err();
        match err {
            Error::UnknownTool { name, available } => {
                assert_eq!(name, "eslint");
                assert_eq!(available, "phpcs, phpmd, phpstan");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn command_line_substitutes_path() {
        let reg = registry();
        assert_eq!(
            reg.get("phpcs").unwrap().command_line("src/Foo.php"),
            vec!["vendor/bin/phpcs", "--report-width=180", "src/Foo.php"]
        );
        assert_eq!(
            reg.get("phpstan").unwrap().command_line("src/Foo.php"),
            vec!["vendor/bin/phpstan", "analyze", "-l5", "src/Foo.php", "--no-progress"]
        );
    }

    #[test]
    fn only_phpcs_enforces_cutoff() {
        let reg = registry();
        assert!(reg.get("phpcs").unwrap().enforces_cutoff);
        assert!(!reg.get("phpstan").unwrap().enforces_cutoff);
        assert!(!reg.get("phpmd").unwrap().enforces_cutoff);
    }

    #[test]
    fn run_ignores_exit_status() {
        let runner = ScriptedRunner::new().on_status(
            "vendor/bin/phpcs --report-width=180 src/Foo.php",
            "FOUND 1 ERROR AFFECTING 1 LINE",
            2,
        );
        let reg = registry();
        let out = reg.get("phpcs").unwrap().run(&runner, "src/Foo.php").unwrap();
        assert_eq!(out, "FOUND 1 ERROR AFFECTING 1 LINE");
    }

    #[test]
    fn run_missing_binary_is_error() {
        let runner = ScriptedRunner::new();
        let reg = registry();
        assert!(matches!(
            reg.get("phpmd").unwrap().run(&runner, "src/Foo.php"),
            Err(Error::Spawn { .. })
        ));
    }

    #[test]
    fn normalize_dispatches_per_tool() {
        let reg = registry();
        assert_eq!(reg.get("phpstan").unwrap().normalize("[OK] No errors"), "");
        assert_eq!(
            reg.get("phpcs").unwrap().normalize("[OK] No errors"),
            "[OK] No errors"
        );
        assert_eq!(reg.get("phpmd").unwrap().normalize("\x1b[31mbad\x1b[0m"), "bad");
    }

    #[test]
    fn sentinel_without_value_is_config_error() {
        let tool = ToolConfig {
            full_name: "Broken".into(),
            command: vec!["broken".into(), "FILE".into()],
            normalize: NormalizeKind::Sentinel,
            clean_sentinel: None,
            enforces_cutoff: false,
        };
        assert!(matches!(
            LintTool::from_config("broken", &tool),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn empty_command_is_config_error() {
        let tool = ToolConfig {
            full_name: "Empty".into(),
            command: vec![],
            normalize: NormalizeKind::None,
            clean_sentinel: None,
            enforces_cutoff: false,
        };
        assert!(matches!(
            LintTool::from_config("empty", &tool),
            Err(Error::Config(_))
        ));
    }
}

//! External process invocation.
//!
//! Everything that shells out (git queries, lint tools) goes through the
//! [`CommandRunner`] trait so the decision engine can be driven by a scripted
//! fake in tests.

use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Captured result of one process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, lossily decoded and trimmed.
    pub stdout: String,
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            code: Some(0),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Capability to run an external program and capture its output.
pub trait CommandRunner {
    /// Run `program` with `args`, blocking until it exits.
    ///
    /// A non-zero exit status is not an error at this layer; only a failure
    /// to start the program is.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Runs real processes via [`std::process::Command`].
///
/// Standard error is inherited so tool diagnostics stay visible in CI logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        log::debug!("exec: {}", display_command(program, args));
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| Error::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            code: output.status.code(),
        })
    }
}

/// Render a command line for log and error messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(|word| shlex::try_quote(word).map_or_else(|_| word.into(), |q| q.into_owned()))
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    /// Scripted runner keyed by the space-joined command line.
    ///
    /// Unscripted commands behave like a missing binary.
    #[derive(Default)]
    pub struct ScriptedRunner {
        responses: HashMap<String, CommandOutput>,
        pub calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(mut self, command: &str, stdout: &str) -> Self {
            self.responses
                .insert(command.to_string(), CommandOutput::success(stdout));
            self
        }

        pub fn on_status(mut self, command: &str, stdout: &str, code: i32) -> Self {
            self.responses.insert(
                command.to_string(),
                CommandOutput {
                    stdout: stdout.to_string(),
                    code: Some(code),
                },
            );
            self
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
            let line = std::iter::once(program)
                .chain(args.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" ");
            self.calls.borrow_mut().push(line.clone());
            self.responses.get(&line).cloned().ok_or_else(|| Error::Spawn {
                program: program.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, line),
            })
        }
    }
}

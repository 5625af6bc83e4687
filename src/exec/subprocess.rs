//! Subprocess execution behind the [`ToolRunner`] seam

use std::fmt;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::PipelineError;
use crate::utils::tools::{self, ToolInfo};

/// A program and the arguments it is started with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a subprocess execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code, `None` when killed by a signal
    pub exit_code: Option<i32>,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(status: ExitStatus, duration: Duration) -> Self {
        Self {
            success: status.success(),
            exit_code: status.code(),
            duration,
        }
    }
}

/// Run a command to completion with inherited stdin/stdout/stderr
pub fn run_command(invocation: &Invocation) -> Result<CommandResult, PipelineError> {
    debug!(command = %invocation, "spawning");
    let start = Instant::now();

    let status = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| PipelineError::Spawn {
            command: invocation.to_string(),
            source,
        })?;

    let result = CommandResult::from_status(status, start.elapsed());
    debug!(
        command = %invocation,
        code = ?result.exit_code,
        elapsed = ?result.duration,
        "finished"
    );
    Ok(result)
}

/// How the pipeline reaches external tools
pub trait ToolRunner {
    /// Find `program` on PATH
    fn locate(&self, program: &str) -> Option<ToolInfo>;

    /// Run `invocation` synchronously and report how it exited
    fn run(&mut self, invocation: &Invocation) -> Result<CommandResult, PipelineError>;
}

/// [`ToolRunner`] backed by real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for SubprocessRunner {
    fn locate(&self, program: &str) -> Option<ToolInfo> {
        tools::check_tool(program)
    }

    fn run(&mut self, invocation: &Invocation) -> Result<CommandResult, PipelineError> {
        run_command(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new("cargo")
            .arg("clippy")
            .args(["--features", "fast"])
            .args(["--", "-D", "warnings"]);
        assert_eq!(inv.to_string(), "cargo clippy --features fast -- -D warnings");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_success() {
        let result = run_command(&Invocation::new("true")).unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_reports_exit_code() {
        let result = run_command(&Invocation::new("sh").args(["-c", "exit 7"])).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(7));
    }

    #[test]
    fn test_run_command_missing_program_is_spawn_error() {
        let err = run_command(&Invocation::new("mxbuild-no-such-program-4f2a")).unwrap_err();
        match err {
            PipelineError::Spawn { command, .. } => {
                assert_eq!(command, "mxbuild-no-such-program-4f2a")
            }
            other => panic!("expected Spawn, got {:?}", other),
        }
    }
}

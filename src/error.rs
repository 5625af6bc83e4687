//! Error types and helpers for user-friendly error messages
//!
//! Every pipeline failure is fatal. These types carry enough context to
//! print an actionable hint and to pick the process exit status.

use thiserror::Error;

/// A failure that stops the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Required tool/executable not on PATH
    #[error("Missing tool: {tool}")]
    ToolNotFound {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// Token the parser does not recognize
    #[error("Unknown option: {token}")]
    UnknownOption { token: String },

    /// Option that needs a value found none
    #[error("Missing argument for {option}")]
    MissingArgument { option: String },

    /// External tool ran and exited non-zero
    #[error("{step} failed: `{command}` {}", describe_exit(.code))]
    StepFailed {
        step: String,
        command: String,
        code: Option<i32>,
    },

    /// External tool could not be started at all
    #[error("Failed to execute {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Parse error clap renders itself
    #[error("{0}")]
    Usage(clap::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl PipelineError {
    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::ToolNotFound {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Create a step failure from the tool's exit code
    pub fn step_failed(
        step: impl Into<String>,
        command: impl Into<String>,
        code: Option<i32>,
    ) -> Self {
        Self::StepFailed {
            step: step.into(),
            command: command.into(),
            code,
        }
    }

    /// Process exit status for this error
    ///
    /// A failed step hands its own status through; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::StepFailed { code, .. } => match code {
                Some(code) if *code != 0 => *code,
                _ => 1,
            },
            _ => 1,
        }
    }

    /// Hint printed under the error, if any
    pub fn hint(&self) -> Option<String> {
        match self {
            PipelineError::ToolNotFound {
                required_for, hint, ..
            } => Some(format!("Required for: {}\n{}", required_for, hint)),
            PipelineError::UnknownOption { .. } => Some(hints::usage().to_string()),
            PipelineError::MissingArgument { option } => {
                Some(format!("{} expects a value, e.g. {} fast,extra", option, option))
            }
            PipelineError::Spawn { source, .. } => Some(source.to_string()),
            PipelineError::StepFailed { .. } | PipelineError::Usage(_) => None,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        if let PipelineError::Usage(err) = self {
            let _ = err.print();
            return;
        }

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        if let Some(hint) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for missing cargo
    pub fn cargo() -> &'static str {
        "Install the Rust toolchain from https://rustup.rs/ or use your package manager:\n\
         • macOS: brew install rustup && rustup-init\n\
         • Ubuntu: sudo apt install cargo\n\
         • Windows: winget install Rustlang.Rustup"
    }

    /// Get hint for command-line usage
    pub fn usage() -> &'static str {
        "Supported options:\n\
         • --release            build optimized and strip the binary\n\
         • --features <value>   enable the given feature list"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_option_message() {
        let err = PipelineError::UnknownOption {
            token: "--bogus".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown option: --bogus");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_step_failed_keeps_tool_status() {
        let err = PipelineError::step_failed("Tests", "cargo test", Some(101));
        assert_eq!(err.exit_code(), 101);
        assert_eq!(
            err.to_string(),
            "Tests failed: `cargo test` exited with status 101"
        );
    }

    #[test]
    fn test_step_killed_by_signal_exits_one() {
        let err = PipelineError::step_failed("Build", "cargo build", None);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("terminated by a signal"));
    }

    #[test]
    fn test_missing_tool_hint_names_purpose() {
        let err = PipelineError::missing_tool("cargo", "building the project", hints::cargo());
        assert_eq!(err.to_string(), "Missing tool: cargo");
        let hint = err.hint().unwrap();
        assert!(hint.contains("building the project"));
        assert!(hint.contains("rustup"));
    }

    #[test]
    fn test_clap_usage_error_exits_one() {
        let err = PipelineError::Usage(clap::Error::new(clap::error::ErrorKind::TooManyValues));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_missing_argument_exit_code() {
        let err = PipelineError::MissingArgument {
            option: "--features".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "Missing argument for --features");
    }
}

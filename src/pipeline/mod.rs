//! Fail-fast build pipeline
//!
//! ```text
//! Init → ToolChecked → Cleaned → Parsed → Built → Tested → Linted → Formatted → Done
//!   └──────────────── any failure ───────────────────────────────────────→ Failed
//! ```
//!
//! Steps run one at a time with inherited stdio. The first error is returned
//! unchanged and nothing after it runs. Stripping the release binary is the
//! only best-effort step: a missing strip tool or a failed strip is skipped.

pub mod steps;

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::cli::{self, BuildConfig};
use crate::config::Settings;
use crate::error::PipelineError;
use crate::exec::{Invocation, ToolRunner};
use crate::utils::terminal;
use crate::utils::tools::{self, ToolRequirement};

use steps::Step;

/// Where the pipeline currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ToolChecked,
    Cleaned,
    Parsed,
    Built,
    Tested,
    Linted,
    Formatted,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::ToolChecked => "tool-checked",
            Stage::Cleaned => "cleaned",
            Stage::Parsed => "parsed",
            Stage::Built => "built",
            Stage::Tested => "tested",
            Stage::Linted => "linted",
            Stage::Formatted => "formatted",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The binary left by the build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub size: u64,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub config: BuildConfig,
    /// `None` when the expected binary was not found
    pub artifact: Option<Artifact>,
    pub stripped: bool,
}

/// Drives the fixed step sequence through a [`ToolRunner`]
pub struct Pipeline<R> {
    settings: Settings,
    runner: R,
    stage: Stage,
}

impl<R: ToolRunner> Pipeline<R> {
    pub fn new(settings: Settings, runner: R) -> Self {
        Self {
            settings,
            runner,
            stage: Stage::Init,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every step against `args` (program name excluded)
    pub fn run<I, T>(&mut self, args: I) -> Result<PipelineReport, PipelineError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let outcome = self.drive(args);
        if let Err(err) = &outcome {
            debug!(after = %self.stage, %err, "pipeline failed");
            self.stage = Stage::Failed;
        }
        outcome
    }

    fn drive<I, T>(&mut self, args: I) -> Result<PipelineReport, PipelineError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.check_toolchain()?;
        self.advance(Stage::ToolChecked);

        self.run_step(Step::Clean, steps::clean(&self.settings))?;
        self.advance(Stage::Cleaned);

        let config = cli::parse_args(args)?;
        self.advance(Stage::Parsed);

        let stripped = self.build(&config)?;
        self.advance(Stage::Built);

        self.run_step(Step::Test, steps::test(&self.settings, &config))?;
        self.advance(Stage::Tested);

        self.run_step(Step::Lint, steps::lint(&self.settings, &config))?;
        self.advance(Stage::Linted);

        self.run_step(Step::FormatCheck, steps::format_check(&self.settings))?;
        self.advance(Stage::Formatted);

        let artifact = self.report_artifact(&config);
        self.advance(Stage::Done);
        terminal::print_success("all checks passed");

        Ok(PipelineReport {
            config,
            artifact,
            stripped,
        })
    }

    fn advance(&mut self, next: Stage) {
        debug!(from = %self.stage, to = %next, "stage");
        self.stage = next;
    }

    fn check_toolchain(&self) -> Result<(), PipelineError> {
        let toolchain = &self.settings.toolchain;
        let found = tools::check_tool_with_requirement(
            self.runner.locate(toolchain),
            toolchain,
            ToolRequirement::Required,
            "building, testing and linting the project",
        )?;

        if let Some(info) = found {
            let description = info
                .version
                .unwrap_or_else(|| info.path.display().to_string());
            terminal::print_info(&format!("Using {}", description));
        }
        Ok(())
    }

    fn run_step(&mut self, step: Step, invocation: Invocation) -> Result<(), PipelineError> {
        let command = invocation.to_string();
        terminal::print_step(step.label(), &command);

        let result = self.runner.run(&invocation)?;
        if result.success {
            info!(%step, elapsed = ?result.duration, "step passed");
            Ok(())
        } else {
            Err(PipelineError::step_failed(step.label(), command, result.exit_code))
        }
    }

    /// Build, then strip when releasing. Returns whether the binary was stripped.
    fn build(&mut self, config: &BuildConfig) -> Result<bool, PipelineError> {
        self.run_step(Step::Build, steps::build(&self.settings, config))?;

        if !config.release {
            return Ok(false);
        }
        Ok(self.strip_artifact(config))
    }

    fn strip_artifact(&mut self, config: &BuildConfig) -> bool {
        let strip = &self.settings.strip;
        let found = tools::check_tool_with_requirement(
            self.runner.locate(strip),
            strip,
            ToolRequirement::Optional,
            "stripping release binaries",
        );
        if !matches!(found, Ok(Some(_))) {
            return false;
        }

        let artifact = self.settings.artifact_path(config.profile());
        if !artifact.is_file() {
            debug!(path = %artifact.display(), "nothing to strip");
            return false;
        }

        let invocation = steps::strip(&self.settings, &artifact);
        match self.run_step(Step::Strip, invocation) {
            Ok(()) => true,
            Err(err) => {
                terminal::print_warning(&format!("{}; continuing with unstripped binary", err));
                false
            }
        }
    }

    fn report_artifact(&self, config: &BuildConfig) -> Option<Artifact> {
        let path = self.settings.artifact_path(config.profile());
        let metadata = std::fs::metadata(&path).ok().filter(|m| m.is_file())?;

        let artifact = Artifact {
            size: metadata.len(),
            path,
        };
        terminal::print_success(&format!(
            "Binary: {} ({}, {} bytes)",
            artifact.path.display(),
            terminal::format_size(artifact.size),
            artifact.size
        ));
        Some(artifact)
    }
}

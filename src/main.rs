//! mxbuild - fail-fast build pipeline for a Cargo binary project
//!
//! Checks the toolchain, purges old artifacts, then builds, tests, lints and
//! format-checks the project in a fixed order, stopping at the first failure.
//!
//! ## Architecture
//!
//! ```text
//! argv → cli::parse_args → BuildConfig ─┐
//! mxbuild.toml → config::Settings ──────┴→ pipeline::Pipeline → exec::ToolRunner → cargo/strip
//! ```

mod cli;
mod config;
mod error;
mod exec;
mod logging;
mod pipeline;
mod utils;

use anyhow::Result;

use config::Settings;
use error::PipelineError;
use exec::SubprocessRunner;
use pipeline::Pipeline;

fn main() {
    logging::init();

    if let Err(err) = run() {
        std::process::exit(report_failure(&err));
    }
}

fn run() -> Result<()> {
    let settings = Settings::load()?;
    let mut pipeline = Pipeline::new(settings, SubprocessRunner::new());
    pipeline.run(std::env::args_os().skip(1))?;
    Ok(())
}

/// Print the error the way its kind asks for and return the process status
fn report_failure(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<PipelineError>() {
        Some(pipeline_err) => {
            pipeline_err.display_with_hints();
            pipeline_err.exit_code()
        }
        None => {
            utils::terminal::print_error(&format!("{:#}", err));
            1
        }
    }
}

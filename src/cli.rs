//! CLI argument parsing using clap derive macros
//!
//! The parser is pure: it turns the token list into a [`BuildConfig`] or a
//! [`PipelineError`] and never exits the process. Only `--release`,
//! `--features <value>` and `--features=<value>` are accepted; any other
//! token, `--help` and `--` included, is an unknown option.

use std::ffi::OsString;
use std::fmt;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};

use crate::error::PipelineError;

/// MXBUILD - build, test, lint and format-check a Cargo project
///
/// Steps run in a fixed order and stop at the first failure.
#[derive(Parser, Debug)]
#[command(name = "mxbuild")]
#[command(about, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Build in release mode and strip the resulting binary
    #[arg(long, action = ArgAction::Count)]
    pub release: u8,

    /// Features to enable, e.g. `fast,extra` (repeatable)
    #[arg(
        long,
        value_name = "FEATURES",
        action = ArgAction::Append,
        allow_hyphen_values = true
    )]
    pub features: Vec<String>,
}

/// One flag forwarded to the toolchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildFlag {
    /// `--release`
    Release,
    /// `--features <value>`
    Features(String),
}

impl BuildFlag {
    /// Argv tokens for this flag
    pub fn to_args(&self) -> Vec<String> {
        match self {
            BuildFlag::Release => vec!["--release".to_string()],
            BuildFlag::Features(value) => vec!["--features".to_string(), value.clone()],
        }
    }
}

impl fmt::Display for BuildFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildFlag::Release => write!(f, "--release"),
            BuildFlag::Features(value) => write!(f, "--features {}", value),
        }
    }
}

/// Build mode and flags parsed from the command line
///
/// `release` is true exactly when `--release` was given. `extra_flags`
/// keeps every flag in the order it was typed, duplicates included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    pub release: bool,
    pub extra_flags: Vec<BuildFlag>,
}

impl BuildConfig {
    /// Cargo profile directory name
    pub fn profile(&self) -> &'static str {
        if self.release {
            "release"
        } else {
            "debug"
        }
    }

    /// Argv tokens for the toolchain: `--release` once, then features in order
    pub fn toolchain_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.release {
            args.extend(BuildFlag::Release.to_args());
        }
        args.extend(self.feature_args());
        args
    }

    /// Only the `--features` flags as argv tokens
    pub fn feature_args(&self) -> Vec<String> {
        self.extra_flags
            .iter()
            .filter(|flag| matches!(flag, BuildFlag::Features(_)))
            .flat_map(BuildFlag::to_args)
            .collect()
    }
}

/// Parse command-line tokens (program name excluded) into a [`BuildConfig`]
pub fn parse_args<I, T>(args: I) -> Result<BuildConfig, PipelineError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let tokens = normalize_tokens(args.into_iter().map(Into::into))?;
    let argv = std::iter::once(OsString::from("mxbuild")).chain(tokens);

    let matches = Cli::command()
        .try_get_matches_from(argv)
        .map_err(map_clap_error)?;
    let cli = Cli::from_arg_matches(&matches).map_err(map_clap_error)?;

    // clap groups values per argument; argv indices restore typing order.
    // The implicit count default carries an index too, so only typed
    // occurrences are taken.
    let mut positioned: Vec<(usize, BuildFlag)> = Vec::new();
    if matches.value_source("release") == Some(ValueSource::CommandLine) {
        if let Some(indices) = matches.indices_of("release") {
            positioned.extend(indices.map(|idx| (idx, BuildFlag::Release)));
        }
    }
    if let Some(indices) = matches.indices_of("features") {
        positioned.extend(
            indices
                .zip(cli.features)
                .map(|(idx, value)| (idx, BuildFlag::Features(value))),
        );
    }
    positioned.sort_by_key(|(idx, _)| *idx);

    let config = BuildConfig {
        release: cli.release > 0,
        extra_flags: positioned.into_iter().map(|(_, flag)| flag).collect(),
    };
    tracing::debug!(?config, "parsed build configuration");
    Ok(config)
}

/// Check tokens left to right against the accepted grammar
///
/// Stops at the first token that is not `--release`, `--features <value>`
/// or `--features=<value>`, reporting it verbatim. Each features pair is
/// rewritten as `--features=<value>` so clap never has to guess whether a
/// value starting with `-` is an option.
fn normalize_tokens<I>(tokens: I) -> Result<Vec<OsString>, PipelineError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut normalized = Vec::new();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        let text = token.to_str().map(str::to_owned);
        match text.as_deref() {
            Some(RELEASE_FLAG) => normalized.push(token),
            Some(FEATURES_FLAG) => {
                let value = tokens
                    .next()
                    .filter(|value| !value.is_empty())
                    .ok_or_else(missing_features_value)?;
                let mut joined = OsString::from(FEATURES_PREFIX);
                joined.push(&value);
                normalized.push(joined);
            }
            Some(FEATURES_PREFIX) => return Err(missing_features_value()),
            Some(other) if other.starts_with(FEATURES_PREFIX) => normalized.push(token),
            _ => {
                return Err(PipelineError::UnknownOption {
                    token: token.to_string_lossy().into_owned(),
                })
            }
        }
    }

    Ok(normalized)
}

const RELEASE_FLAG: &str = "--release";
const FEATURES_FLAG: &str = "--features";
const FEATURES_PREFIX: &str = "--features=";

fn missing_features_value() -> PipelineError {
    PipelineError::MissingArgument {
        option: FEATURES_FLAG.to_string(),
    }
}

/// Errors clap can still raise on already-normalized tokens
fn map_clap_error(err: clap::Error) -> PipelineError {
    match (err.kind(), invalid_arg(&err)) {
        (ErrorKind::UnknownArgument, Some(token)) => PipelineError::UnknownOption { token },
        _ => PipelineError::Usage(err),
    }
}

fn invalid_arg(err: &clap::Error) -> Option<String> {
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => Some(arg.clone()),
        _ => None,
    }
}

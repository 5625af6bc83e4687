//! Fixed command lines for each pipeline step

use std::fmt;
use std::path::Path;

use crate::cli::BuildConfig;
use crate::config::Settings;
use crate::exec::Invocation;

/// A pipeline step that runs an external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Clean,
    Build,
    Strip,
    Test,
    Lint,
    FormatCheck,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::Clean => "Clean",
            Step::Build => "Build",
            Step::Strip => "Strip",
            Step::Test => "Tests",
            Step::Lint => "Clippy",
            Step::FormatCheck => "Format check",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `<toolchain> clean`
pub fn clean(settings: &Settings) -> Invocation {
    Invocation::new(&settings.toolchain).arg("clean")
}

/// `<toolchain> build [--release] [--features X]...`
pub fn build(settings: &Settings, config: &BuildConfig) -> Invocation {
    Invocation::new(&settings.toolchain)
        .arg("build")
        .args(config.toolchain_args())
}

/// `<strip> <artifact>`
pub fn strip(settings: &Settings, artifact: &Path) -> Invocation {
    Invocation::new(&settings.strip).arg(artifact.to_string_lossy())
}

/// `<toolchain> test [--release] [--features X]...`
pub fn test(settings: &Settings, config: &BuildConfig) -> Invocation {
    Invocation::new(&settings.toolchain)
        .arg("test")
        .args(config.toolchain_args())
}

/// `<toolchain> clippy --all-targets [--features X]... -- -D warnings`
///
/// Warnings are promoted to errors so any finding fails the step.
pub fn lint(settings: &Settings, config: &BuildConfig) -> Invocation {
    Invocation::new(&settings.toolchain)
        .args(["clippy", "--all-targets"])
        .args(config.feature_args())
        .args(["--", "-D", "warnings"])
}

/// `<toolchain> fmt --all -- --check`, never rewrites files
pub fn format_check(settings: &Settings) -> Invocation {
    Invocation::new(&settings.toolchain).args(["fmt", "--all", "--", "--check"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::BuildFlag;

    fn release_with_features() -> BuildConfig {
        BuildConfig {
            release: true,
            extra_flags: vec![BuildFlag::Release, BuildFlag::Features("fast,extra".into())],
        }
    }

    #[test]
    fn test_debug_build_has_no_extra_args() {
        let inv = build(&Settings::default(), &BuildConfig::default());
        assert_eq!(inv.to_string(), "cargo build");
    }

    #[test]
    fn test_release_build_and_test_forward_flags() {
        let settings = Settings::default();
        let config = release_with_features();
        assert_eq!(
            build(&settings, &config).to_string(),
            "cargo build --release --features fast,extra"
        );
        assert_eq!(
            test(&settings, &config).to_string(),
            "cargo test --release --features fast,extra"
        );
    }

    #[test]
    fn test_lint_denies_warnings_and_skips_release() {
        let inv = lint(&Settings::default(), &release_with_features());
        assert_eq!(
            inv.to_string(),
            "cargo clippy --all-targets --features fast,extra -- -D warnings"
        );
    }

    #[test]
    fn test_format_check_and_clean() {
        let settings = Settings::default();
        assert_eq!(format_check(&settings).to_string(), "cargo fmt --all -- --check");
        assert_eq!(clean(&settings).to_string(), "cargo clean");
    }

    #[test]
    fn test_strip_uses_configured_tool() {
        let settings = Settings {
            strip: "llvm-strip".to_string(),
            ..Settings::default()
        };
        let inv = strip(&settings, Path::new("target/release/memexia"));
        assert_eq!(inv.program, "llvm-strip");
        assert_eq!(inv.args, vec!["target/release/memexia"]);
    }

    #[test]
    fn test_step_labels() {
        assert_eq!(Step::Test.to_string(), "Tests");
        assert_eq!(Step::FormatCheck.label(), "Format check");
    }
}

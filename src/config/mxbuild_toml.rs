//! mxbuild.toml settings
//!
//! Every key is optional; a missing file means all defaults.
//!
//! ```toml
//! binary = "memexia"
//! toolchain = "cargo"
//! strip = "strip"
//! target_dir = "target"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings file looked up in the working directory
pub const SETTINGS_FILE: &str = "mxbuild.toml";

/// Tool names and paths the pipeline works with
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Binary produced by the build, under `<target_dir>/<profile>/`
    pub binary: String,

    /// Required build toolchain (build, clean, test, clippy, fmt)
    pub toolchain: String,

    /// Optional binary-stripping tool used for release builds
    pub strip: String,

    /// Artifact root, relative to the working directory
    pub target_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            binary: "memexia".to_string(),
            toolchain: "cargo".to_string(),
            strip: "strip".to_string(),
            target_dir: PathBuf::from("target"),
        }
    }
}

impl Settings {
    /// Load `mxbuild.toml` from the working directory, or defaults if absent
    pub fn load() -> Result<Self> {
        let path = Path::new(SETTINGS_FILE);
        if path.exists() {
            Self::load_from_path(path)
        } else {
            tracing::debug!("no {} found, using defaults", SETTINGS_FILE);
            Ok(Self::default())
        }
    }

    /// Load settings from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parse settings from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).context("Failed to parse mxbuild.toml")?;

        if settings.binary.trim().is_empty() {
            anyhow::bail!("`binary` must not be empty");
        }
        if settings.toolchain.trim().is_empty() {
            anyhow::bail!("`toolchain` must not be empty");
        }

        Ok(settings)
    }

    /// Where the build leaves the binary for `profile` (`debug`/`release`)
    pub fn artifact_path(&self, profile: &str) -> PathBuf {
        self.target_dir
            .join(profile)
            .join(format!("{}{}", self.binary, std::env::consts::EXE_SUFFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_gives_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.toolchain, "cargo");
        assert_eq!(settings.binary, "memexia");
    }

    #[test]
    fn test_parse_partial_overrides() {
        let settings = Settings::parse(
            r#"
binary = "tool"
target_dir = "out"
"#,
        )
        .unwrap();
        assert_eq!(settings.binary, "tool");
        assert_eq!(settings.target_dir, PathBuf::from("out"));
        assert_eq!(settings.strip, "strip");
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(Settings::parse("bianry = \"typo\"").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_toolchain() {
        let err = Settings::parse("toolchain = \"\"").unwrap_err();
        assert!(err.to_string().contains("toolchain"));
    }

    #[test]
    fn test_artifact_path() {
        let settings = Settings::default();
        let path = settings.artifact_path("release");
        assert!(path.starts_with("target/release"));
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("memexia{}", std::env::consts::EXE_SUFFIX)
        );
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "toolchain = \"true\"\n").unwrap();

        let settings = Settings::load_from_path(&path).unwrap();
        assert_eq!(settings.toolchain, "true");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_from_path(dir.path().join("nope.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read configuration"));
    }
}

//! Tool detection with required/optional semantics
//!
//! A missing required tool stops the pipeline with an install hint. A
//! missing optional tool is simply absent; callers skip the work it would do.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;
use which::which;

use crate::error::{hints, PipelineError};

/// Tool detection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Path to the tool executable
    pub path: PathBuf,
    /// First line of `--version` output (if available)
    pub version: Option<String>,
}

/// Tool requirement level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRequirement {
    /// Tool is required for the operation
    Required,
    /// Tool is optional, operation can proceed without it
    Optional,
}

/// Check if a tool exists and return its information
pub fn check_tool(tool_name: &str) -> Option<ToolInfo> {
    match which(tool_name) {
        Ok(path) => {
            let version = get_tool_version(tool_name);
            debug!(tool = tool_name, path = %path.display(), ?version, "found tool");
            Some(ToolInfo {
                name: tool_name.to_string(),
                path,
                version,
            })
        }
        Err(err) => {
            debug!(tool = tool_name, %err, "tool not on PATH");
            None
        }
    }
}

/// Get tool version by running `tool --version`
fn get_tool_version(tool_name: &str) -> Option<String> {
    let output = Command::new(tool_name).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout);
    version
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

/// Apply a requirement level to a lookup result
///
/// Required and absent is an error; optional and absent is `Ok(None)`.
pub fn check_tool_with_requirement(
    found: Option<ToolInfo>,
    tool_name: &str,
    requirement: ToolRequirement,
    required_for: &str,
) -> Result<Option<ToolInfo>, PipelineError> {
    match (found, requirement) {
        (Some(info), _) => Ok(Some(info)),
        (None, ToolRequirement::Required) => Err(PipelineError::missing_tool(
            tool_name,
            required_for,
            get_tool_hint(tool_name),
        )),
        (None, ToolRequirement::Optional) => {
            debug!(tool = tool_name, required_for, "optional tool missing, skipping");
            Ok(None)
        }
    }
}

/// Get installation hint for a tool
fn get_tool_hint(tool_name: &str) -> &'static str {
    match tool_name {
        "cargo" => hints::cargo(),
        _ => "Install this tool and ensure it's in your PATH",
    }
}

//! Command execution primitives with consistent error handling.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

impl CapturedOutput {
    /// Stderr if non-empty, otherwise stdout. For failure diagnostics.
    pub fn error_text(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Run a complete shell command via `sh -c` in a directory, capturing output.
///
/// Environment entries are applied to the child process only. A non-zero
/// exit is not an error here: callers decide what failure means.
pub fn run_shell(command: &str, dir: &Path, envs: &[(String, String)]) -> Result<CapturedOutput> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command).current_dir(dir);
    for (key, value) in envs {
        cmd.env(key, value);
    }

    let output = cmd.output().map_err(|e| {
        Error::internal_io(
            format!("Failed to run command: {}", e),
            Some(command.to_string()),
        )
    })?;

    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Run a program directly (no shell) in a directory, capturing output.
pub fn run_program(
    program: &str,
    args: &[&str],
    dir: &Path,
    context: &str,
) -> Result<CapturedOutput> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| {
            Error::internal_io(
                format!("Failed to run {}: {}", context, e),
                Some(context.to_string()),
            )
        })?;

    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

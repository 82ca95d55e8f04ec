//! Fetch step: clone the source tree at the triggering revision,
//! resolving nested sub-repository references recursively.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::ExecutionContext;
use crate::error::{CommandFailedDetails, Error, Result};
use crate::utils::command::{run_program, CapturedOutput};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutput {
    pub repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
}

pub fn fetch(
    repository: &str,
    revision: Option<&str>,
    ctx: &ExecutionContext,
) -> Result<FetchOutput> {
    let source_dir = ctx.source_dir();
    let dest = source_dir.to_string_lossy().to_string();

    log_status!("fetch", "Cloning {}", repository);
    let clone = run_program(
        "git",
        &["clone", "--recurse-submodules", repository, &dest],
        ctx.workdir(),
        "git clone",
    )?;
    if !clone.success {
        return Err(classify_clone_failure(repository, &clone));
    }

    if let Some(revision) = revision {
        log_status!("fetch", "Checking out {}", revision);
        let checkout = run_program(
            "git",
            &["checkout", revision],
            &source_dir,
            "git checkout",
        )?;
        if !checkout.success {
            return Err(Error::fetch_checkout_failed(
                revision,
                command_details("git checkout", &checkout),
            ));
        }
    }

    // Backstop: sub-repository pointers can differ per revision, and clone
    // does not retry partially-initialized submodules.
    let submodules = run_program(
        "git",
        &["submodule", "update", "--init", "--recursive"],
        &source_dir,
        "git submodule update",
    )?;
    if !submodules.success {
        return Err(Error::fetch_submodule_failed(command_details(
            "git submodule update --init --recursive",
            &submodules,
        )));
    }

    Ok(FetchOutput {
        repository: repository.to_string(),
        revision: revision.map(|r| r.to_string()),
        path: dest,
        head: head_commit(&source_dir),
    })
}

fn classify_clone_failure(repository: &str, output: &CapturedOutput) -> Error {
    let details = command_details("git clone --recurse-submodules", output);
    if output.stderr.to_lowercase().contains("submodule") {
        Error::fetch_submodule_failed(details)
    } else {
        Error::fetch_clone_failed(repository, details)
    }
}

fn command_details(command: &str, output: &CapturedOutput) -> CommandFailedDetails {
    CommandFailedDetails {
        command: command.to_string(),
        exit_code: output.exit_code,
        stdout: output.stdout.clone(),
        stderr: output.stderr.clone(),
    }
}

fn head_commit(source_dir: &Path) -> Option<String> {
    let output = run_program("git", &["rev-parse", "HEAD"], source_dir, "git rev-parse").ok()?;
    output
        .success
        .then(|| output.stdout.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::process::Command;

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args([
                "-c",
                "user.email=test@example.com",
                "-c",
                "user.name=test",
            ])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    fn fixture_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q", "-b", "main"]);
        fs::write(dir.path().join("README"), "fixture\n").unwrap();
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "initial"]);
        dir
    }

    #[test]
    fn clones_a_local_repository() {
        let repo = fixture_repo();
        let ctx = ExecutionContext::new().unwrap();

        let output = fetch(&repo.path().to_string_lossy(), None, &ctx).unwrap();
        assert!(ctx.source_dir().join("README").exists());
        assert!(output.head.is_some());
        assert!(output.revision.is_none());
    }

    #[test]
    fn unreachable_repository_is_a_fetch_error() {
        let ctx = ExecutionContext::new().unwrap();
        let missing = ctx.workdir().join("no-such-repo");

        let err = fetch(&missing.to_string_lossy(), None, &ctx).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::FetchCloneFailed);
        assert_eq!(err.retryable, Some(false));
    }

    #[test]
    fn unknown_revision_is_a_checkout_error() {
        let repo = fixture_repo();
        let ctx = ExecutionContext::new().unwrap();

        let err = fetch(
            &repo.path().to_string_lossy(),
            Some("no-such-revision"),
            &ctx,
        )
        .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::FetchCheckoutFailed);
    }

    #[test]
    fn submodule_text_in_stderr_classifies_as_submodule_failure() {
        let output = CapturedOutput {
            stdout: String::new(),
            stderr: "fatal: could not fetch submodule 'vendor/lib'".to_string(),
            success: false,
            exit_code: 128,
        };
        let err = classify_clone_failure("https://example.com/repo.git", &output);
        assert_eq!(err.code, crate::ErrorCode::FetchSubmoduleFailed);
    }
}

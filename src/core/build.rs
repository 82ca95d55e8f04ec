//! Build step: invoke the external packaging command and record the
//! produced artifact reference.

use serde::{Deserialize, Serialize};

use crate::context::{self, ArtifactRef, ExecutionContext};
use crate::error::{CommandFailedDetails, Error, Result};
use crate::utils::artifact::resolve_artifact_path;
use crate::utils::command::{run_shell, CapturedOutput};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    pub build_command: String,
    pub artifact: ArtifactRef,
    #[serde(flatten)]
    pub output: CapturedOutput,
}

/// Run the packaging command in the fetched tree and resolve the artifact.
///
/// The command is a black box: a non-zero exit is a terminal build failure,
/// and no retry happens. On success the artifact must exist and be non-empty
/// before it is recorded for the publish step.
pub fn build(
    build_command: &str,
    artifact_pattern: &str,
    ctx: &ExecutionContext,
) -> Result<BuildOutput> {
    let source_dir = ctx.source_dir();
    if !source_dir.is_dir() {
        return Err(Error::internal_unexpected(
            "Build step ran without a fetched source tree",
        ));
    }

    log_status!("build", "Running packaging command: {}", build_command);
    let output = run_shell(build_command, &source_dir, &[])?;
    if !output.success {
        return Err(Error::build_command_failed(CommandFailedDetails {
            command: build_command.to_string(),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        }));
    }

    let artifact_path = resolve_artifact_path(artifact_pattern, &source_dir)?;
    let artifact = context::describe_artifact(&artifact_path)?;
    log_status!(
        "build",
        "Packaged {} ({} bytes)",
        artifact.path.display(),
        artifact.size_bytes
    );

    ctx.store_artifact(artifact.clone())?;

    Ok(BuildOutput {
        build_command: build_command.to_string(),
        artifact,
        output,
    })
}

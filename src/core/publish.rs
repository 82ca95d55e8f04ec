//! Publish step: hand the built artifact to the external distribution
//! command, targeting the configured release channel.
//!
//! The credential is resolved at publish time only, injected into the child
//! process environment, and redacted from every diagnostic surface.

use serde::{Deserialize, Serialize};

use crate::config::{CredentialSource, JobConfig};
use crate::context::{ArtifactRef, ExecutionContext};
use crate::error::{CommandFailedDetails, Error, Result};
use crate::keychain;
use crate::utils::command::{run_shell, CapturedOutput};
use crate::utils::shell;

/// Environment variable the resolved credential is always exported under.
pub const CREDENTIAL_ENV: &str = "SKIFF_STORE_CREDENTIAL";

const AUTH_MARKERS: &[&str] = &[
    "unauthorized",
    "authentication",
    "forbidden",
    "invalid credential",
    "login required",
    "not logged in",
    "401",
    "403",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutput {
    pub channel: String,
    pub artifact: ArtifactRef,
    pub publish_command: String,
    #[serde(flatten)]
    pub output: CapturedOutput,
}

pub fn publish(config: &JobConfig, ctx: &ExecutionContext) -> Result<PublishOutput> {
    // Fail closed before touching the store: the artifact must exist and
    // be non-empty.
    let artifact = ctx.require_artifact()?;

    let credential = resolve_credential(&config.credential)?;

    let command = shell::render_publish_command(
        &config.publish_command,
        &artifact.path.to_string_lossy(),
        &config.channel,
    );

    let mut envs = vec![(CREDENTIAL_ENV.to_string(), credential.clone())];
    if let Some(env_name) = &config.credential.env {
        if env_name != CREDENTIAL_ENV {
            envs.push((env_name.clone(), credential.clone()));
        }
    }

    log_status!(
        "publish",
        "Uploading {} to channel '{}'",
        artifact.path.display(),
        config.channel
    );
    let output = redacted(run_shell(&command, ctx.workdir(), &envs)?, &credential);

    if !output.success {
        return Err(classify_publish_failure(&command, output));
    }

    Ok(PublishOutput {
        channel: config.channel.clone(),
        artifact,
        publish_command: command,
        output,
    })
}

/// Resolve the store login token: keychain entry first, then the configured
/// environment variable. Absence is an authentication failure of the publish
/// step, not a config error: the job is runnable, the store would reject it.
fn resolve_credential(source: &CredentialSource) -> Result<String> {
    if let Some(id) = &source.keychain_id {
        if let Some(value) = keychain::get(id)? {
            return Ok(value);
        }
    }

    if let Some(env_name) = &source.env {
        if let Ok(value) = std::env::var(env_name) {
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }

    let mut err = Error::publish_auth_failed(
        "No store credential available",
        serde_json::json!({
            "keychainId": source.keychain_id,
            "env": source.env,
        }),
    );
    if let Some(id) = &source.keychain_id {
        err = err.with_hint(format!("Store a credential: skiff credential set {}", id));
    }
    if let Some(env_name) = &source.env {
        err = err.with_hint(format!("Or export {} before running", env_name));
    }
    if source.keychain_id.is_none() && source.env.is_none() {
        err = err.with_hint("Configure \"credential\" in skiff.json with a keychainId or env");
    }
    Err(err)
}

fn classify_publish_failure(command: &str, output: CapturedOutput) -> Error {
    let haystack = format!("{}\n{}", output.stdout, output.stderr).to_lowercase();
    let details = CommandFailedDetails {
        command: command.to_string(),
        exit_code: output.exit_code,
        stdout: output.stdout,
        stderr: output.stderr,
    };

    if AUTH_MARKERS.iter().any(|m| haystack.contains(m)) {
        let details = serde_json::to_value(&details)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));
        Error::publish_auth_failed("Store rejected the credential", details)
    } else {
        Error::publish_upload_failed(details)
    }
}

/// Scrub any echo of the credential out of captured command output.
fn redacted(mut output: CapturedOutput, credential: &str) -> CapturedOutput {
    if credential.is_empty() {
        return output;
    }
    output.stdout = output.stdout.replace(credential, "[redacted]");
    output.stderr = output.stderr.replace(credential, "[redacted]");
    output
}

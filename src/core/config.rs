//! Job configuration.
//!
//! A job is described by a JSON file (`skiff.json` by default): where to
//! fetch from, how to package, and how to publish. The external build and
//! publish actions are opaque commands; skiff only owns their ordering and
//! the artifact handoff between them.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "skiff.json";
pub const DEFAULT_CHANNEL: &str = "edge";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    /// Repository URL the fetch step clones.
    pub repository: String,
    /// Revision to check out; HEAD of the default branch when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// External packaging command, run in the fetched tree.
    pub build_command: String,
    /// Glob resolving the packaged artifact, relative to the fetched tree.
    pub artifact_pattern: String,
    /// External publish command template. `{{artifact}}` and `{{channel}}`
    /// are expanded (shell-quoted) before execution.
    pub publish_command: String,
    /// Distribution track to publish to.
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default)]
    pub credential: CredentialSource,
}

/// Where the publish step finds the store login token.
///
/// The keychain entry is tried first, then the environment variable. The
/// resolved value is injected into the publish command's environment only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keychain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

pub fn load(path: Option<&str>) -> Result<JobConfig> {
    let raw_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    let expanded = shellexpand::tilde(raw_path).to_string();
    let path = PathBuf::from(&expanded);

    let content = fs::read_to_string(&path).map_err(|e| {
        Error::internal_io(
            format!("Cannot read config '{}': {}", expanded, e),
            Some(expanded.clone()),
        )
        .with_hint("Run 'skiff config init' to create a starter skiff.json")
    })?;

    let config: JobConfig =
        serde_json::from_str(&content).map_err(|e| Error::config_invalid_json(&expanded, e))?;

    validate(&config, &expanded)?;
    Ok(config)
}

fn validate(config: &JobConfig, path: &str) -> Result<()> {
    let required = [
        ("repository", &config.repository),
        ("buildCommand", &config.build_command),
        ("artifactPattern", &config.artifact_pattern),
        ("publishCommand", &config.publish_command),
    ];
    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(Error::config_missing_key(key, Some(path.to_string())));
        }
    }

    // Store track labels: lowercase alphanumerics and dashes, letter first.
    let channel_re = Regex::new(r"^[a-z][a-z0-9-]*$")
        .map_err(|e| Error::internal_unexpected(e.to_string()))?;
    if !channel_re.is_match(&config.channel) {
        return Err(Error::config_invalid_value(
            "channel",
            Some(config.channel.clone()),
            "Channel must be lowercase alphanumeric with dashes, starting with a letter",
        ));
    }

    Ok(())
}

/// Starter config written by `skiff config init`.
pub fn template() -> JobConfig {
    JobConfig {
        repository: "https://example.com/org/project.git".to_string(),
        revision: None,
        build_command: "make package".to_string(),
        artifact_pattern: "dist/*.tar.gz".to_string(),
        publish_command: "store-cli upload {{artifact}} --release={{channel}}".to_string(),
        channel: DEFAULT_CHANNEL.to_string(),
        credential: CredentialSource {
            keychain_id: None,
            env: Some("STORE_LOGIN".to_string()),
        },
    }
}

pub fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::validation_invalid_argument(
            "path",
            format!("'{}' already exists", path.display()),
            None,
            Some(vec!["Pass --force to overwrite".to_string()]),
        ));
    }

    let content = serde_json::to_string_pretty(&template())
        .map_err(|e| Error::internal_json(e.to_string(), Some("config template".to_string())))?;
    fs::write(path, content + "\n")
        .map_err(|e| Error::internal_io(e.to_string(), Some(path.display().to_string())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> String {
        let path = dir.join("skiff.json");
        fs::write(&path, body).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn loads_a_complete_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "repository": "https://example.com/repo.git",
                "buildCommand": "make package",
                "artifactPattern": "dist/*.snap",
                "publishCommand": "store-cli upload {{artifact}} --release={{channel}}",
                "channel": "stable",
                "credential": { "env": "STORE_LOGIN" }
            }"#,
        );

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.channel, "stable");
        assert_eq!(config.credential.env.as_deref(), Some("STORE_LOGIN"));
        assert!(config.revision.is_none());
    }

    #[test]
    fn channel_defaults_to_edge() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "repository": "https://example.com/repo.git",
                "buildCommand": "make package",
                "artifactPattern": "dist/*.snap",
                "publishCommand": "store-cli upload {{artifact}}"
            }"#,
        );

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.channel, DEFAULT_CHANNEL);
    }

    #[test]
    fn empty_required_key_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "repository": "https://example.com/repo.git",
                "buildCommand": "",
                "artifactPattern": "dist/*.snap",
                "publishCommand": "store-cli upload {{artifact}}"
            }"#,
        );

        let err = load(Some(&path)).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ConfigMissingKey);
        assert_eq!(err.details["key"], "buildCommand");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "{ not json");
        let err = load(Some(&path)).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ConfigInvalidJson);
    }

    #[test]
    fn invalid_channel_label_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "repository": "https://example.com/repo.git",
                "buildCommand": "make package",
                "artifactPattern": "dist/*.snap",
                "publishCommand": "store-cli upload {{artifact}}",
                "channel": "Edge Channel"
            }"#,
        );

        let err = load(Some(&path)).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn template_round_trips_through_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skiff.json");
        write_template(&path, false).unwrap();

        let config = load(Some(&path.to_string_lossy())).unwrap();
        assert_eq!(config.channel, DEFAULT_CHANNEL);

        let err = write_template(&path, false).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ValidationInvalidArgument);
        write_template(&path, true).unwrap();
    }
}

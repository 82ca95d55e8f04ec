use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,
    ValidationInvalidJson,

    FetchCloneFailed,
    FetchCheckoutFailed,
    FetchSubmoduleFailed,

    BuildCommandFailed,
    BuildArtifactMissing,
    BuildArtifactEmpty,

    PublishAuthFailed,
    PublishUploadFailed,

    KeychainUnavailable,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::FetchCloneFailed => "fetch.clone_failed",
            ErrorCode::FetchCheckoutFailed => "fetch.checkout_failed",
            ErrorCode::FetchSubmoduleFailed => "fetch.submodule_failed",

            ErrorCode::BuildCommandFailed => "build.command_failed",
            ErrorCode::BuildArtifactMissing => "build.artifact_missing",
            ErrorCode::BuildArtifactEmpty => "build.artifact_empty",

            ErrorCode::PublishAuthFailed => "publish.auth_failed",
            ErrorCode::PublishUploadFailed => "publish.upload_failed",

            ErrorCode::KeychainUnavailable => "keychain.unavailable",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }

    /// Whether this code belongs to a pipeline step failure (fetch, build, publish).
    pub fn is_step_failure(&self) -> bool {
        matches!(
            self,
            ErrorCode::FetchCloneFailed
                | ErrorCode::FetchCheckoutFailed
                | ErrorCode::FetchSubmoduleFailed
                | ErrorCode::BuildCommandFailed
                | ErrorCode::BuildArtifactMissing
                | ErrorCode::BuildArtifactEmpty
                | ErrorCode::PublishAuthFailed
                | ErrorCode::PublishUploadFailed
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDetails {
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let details = serde_json::to_value(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
            tried,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });

        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        let details = serde_json::to_value(ConfigMissingKeyDetails {
            key: key.into(),
            path,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration key",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = serde_json::to_value(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let problem = problem.into();
        let details = serde_json::json!({
            "key": key.into(),
            "value": value,
            "problem": problem,
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    fn step_failed(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        // Step failures are terminal by contract: no retry, no remediation.
        let mut err = Self::new(code, message, details);
        err.retryable = Some(false);
        err
    }

    pub fn fetch_clone_failed(repository: impl Into<String>, details: CommandFailedDetails) -> Self {
        let repository = repository.into();
        let details =
            serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::step_failed(
            ErrorCode::FetchCloneFailed,
            format!("Failed to clone '{}'", repository),
            details,
        )
    }

    pub fn fetch_checkout_failed(revision: impl Into<String>, details: CommandFailedDetails) -> Self {
        let revision = revision.into();
        let details =
            serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::step_failed(
            ErrorCode::FetchCheckoutFailed,
            format!("Failed to check out revision '{}'", revision),
            details,
        )
    }

    pub fn fetch_submodule_failed(details: CommandFailedDetails) -> Self {
        let details =
            serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::step_failed(
            ErrorCode::FetchSubmoduleFailed,
            "Failed to resolve nested sub-repositories",
            details,
        )
    }

    pub fn build_command_failed(details: CommandFailedDetails) -> Self {
        let details =
            serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::step_failed(
            ErrorCode::BuildCommandFailed,
            "Packaging command failed",
            details,
        )
    }

    pub fn build_artifact_missing(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let details = serde_json::to_value(ArtifactDetails {
            pattern: pattern.clone(),
            path: None,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::step_failed(
            ErrorCode::BuildArtifactMissing,
            format!("No build artifact matches '{}'", pattern),
            details,
        )
    }

    pub fn build_artifact_empty(path: impl Into<String>) -> Self {
        let path = path.into();
        let details = serde_json::to_value(ArtifactDetails {
            pattern: path.clone(),
            path: Some(path.clone()),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::step_failed(
            ErrorCode::BuildArtifactEmpty,
            format!("Build artifact '{}' is empty", path),
            details,
        )
    }

    pub fn publish_auth_failed(message: impl Into<String>, details: Value) -> Self {
        Self::step_failed(ErrorCode::PublishAuthFailed, message, details)
    }

    pub fn publish_upload_failed(details: CommandFailedDetails) -> Self {
        let details =
            serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::step_failed(
            ErrorCode::PublishUploadFailed,
            "Store upload failed",
            details,
        )
    }

    pub fn keychain_unavailable(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::KeychainUnavailable,
            "Keychain error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::to_value(InternalIoErrorDetails {
            error: error.into(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": error.into(),
            "context": context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::internal_unexpected(message)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

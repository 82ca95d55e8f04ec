//! Ephemeral per-run execution context.
//!
//! Each trigger gets a single-use context: a unique run id, a temporary
//! working directory that is removed when the context is dropped, and the
//! artifact reference handed from the build step to the publish step.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Reference to the packaged build artifact, recorded by the build step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRef {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
}

pub struct ExecutionContext {
    pub run_id: String,
    workdir: tempfile::TempDir,
    artifact: Mutex<Option<ArtifactRef>>,
}

impl ExecutionContext {
    pub fn new() -> Result<Self> {
        let workdir = tempfile::Builder::new()
            .prefix("skiff-run-")
            .tempdir()
            .map_err(|e| {
                Error::internal_io(e.to_string(), Some("create run workdir".to_string()))
            })?;

        Ok(Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            workdir,
            artifact: Mutex::new(None),
        })
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Directory the fetch step clones into.
    pub fn source_dir(&self) -> PathBuf {
        self.workdir.path().join("source")
    }

    pub fn store_artifact(&self, artifact: ArtifactRef) -> Result<()> {
        let mut slot = self
            .artifact
            .lock()
            .map_err(|_| Error::internal_unexpected("Failed to lock artifact slot"))?;
        *slot = Some(artifact);
        Ok(())
    }

    /// The publish gate: the artifact reference must have been recorded and
    /// must still name a non-empty file. Fails closed otherwise.
    pub fn require_artifact(&self) -> Result<ArtifactRef> {
        let slot = self
            .artifact
            .lock()
            .map_err(|_| Error::internal_unexpected("Failed to lock artifact slot"))?;

        let artifact = slot.clone().ok_or_else(|| {
            Error::build_artifact_missing("no artifact reference was recorded by the build step")
        })?;

        let metadata = fs::metadata(&artifact.path)
            .map_err(|_| Error::build_artifact_missing(artifact.path.display().to_string()))?;
        if metadata.len() == 0 {
            return Err(Error::build_artifact_empty(
                artifact.path.display().to_string(),
            ));
        }

        Ok(artifact)
    }
}

/// Stat and digest a produced artifact, enforcing the non-empty invariant.
pub fn describe_artifact(path: &Path) -> Result<ArtifactRef> {
    let metadata = fs::metadata(path)
        .map_err(|_| Error::build_artifact_missing(path.display().to_string()))?;
    if !metadata.is_file() || metadata.len() == 0 {
        return Err(Error::build_artifact_empty(path.display().to_string()));
    }

    let mut file = fs::File::open(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(path.display().to_string())))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = file
            .read(&mut buf)
            .map_err(|e| Error::internal_io(e.to_string(), Some(path.display().to_string())))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(ArtifactRef {
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
        sha256: format!("{:x}", hasher.finalize()),
    })
}

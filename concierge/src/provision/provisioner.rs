//! The seam to the external provisioning API.
//!
//! [`Provisioner`] takes a finished [`StackSpec`] and returns a [`StackHandle`]. The cloud API
//! itself is out of scope; [`ManifestProvisioner`] writes the request to disk for an external
//! deploy step, and [`MockProvisioner`] records requests for tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::spec::StackSpec;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize stack spec: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("provisioning rejected: {0}")]
    Rejected(String),
}

/// Handle for a provisioned (or synthesized) stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackHandle {
    pub stack_name: String,
    /// Where the stack lives: a manifest path or a provider identifier.
    pub location: String,
}

/// Creates the resources described by a spec.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn provision(&self, spec: &StackSpec) -> Result<StackHandle, ProvisionError>;
}

/// Writes `<out_dir>/<stack_name>.json` (pretty-printed) and returns its path as the handle.
pub struct ManifestProvisioner {
    out_dir: PathBuf,
}

impl ManifestProvisioner {
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    /// Manifest path for a given stack name.
    pub fn manifest_path(&self, stack_name: &str) -> PathBuf {
        self.out_dir.join(format!("{}.json", stack_name))
    }
}

#[async_trait]
impl Provisioner for ManifestProvisioner {
    async fn provision(&self, spec: &StackSpec) -> Result<StackHandle, ProvisionError> {
        let body = serde_json::to_string_pretty(spec)?;
        let path = self.manifest_path(&spec.stack_name);
        let io_err = |source| ProvisionError::Io {
            path: path.display().to_string(),
            source,
        };
        tokio::fs::create_dir_all(&self.out_dir).await.map_err(io_err)?;
        tokio::fs::write(&path, format!("{}\n", body)).await.map_err(io_err)?;
        tracing::info!(stack = %spec.stack_name, path = %path.display(), "wrote stack manifest");
        Ok(StackHandle {
            stack_name: spec.stack_name.clone(),
            location: path.display().to_string(),
        })
    }
}

/// Records every spec it receives; optionally rejects them all.
#[derive(Default)]
pub struct MockProvisioner {
    received: Mutex<Vec<StackSpec>>,
    reject_with: Option<String>,
}

impl MockProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provisioner that fails every call with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            reject_with: Some(reason.into()),
        }
    }

    /// Specs received so far, in call order.
    pub fn received(&self) -> Vec<StackSpec> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Provisioner for MockProvisioner {
    async fn provision(&self, spec: &StackSpec) -> Result<StackHandle, ProvisionError> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(spec.clone());
        match &self.reject_with {
            Some(reason) => Err(ProvisionError::Rejected(reason.clone())),
            None => Ok(StackHandle {
                stack_name: spec.stack_name.clone(),
                location: format!("mock://{}", spec.stack_name),
            }),
        }
    }
}

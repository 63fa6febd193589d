//! Structured documents read from YAML files.
//!
//! [`read_document`] is the single entry point for disk access. A missing file is an expected
//! state (optional overlays such as a post-processing prompt) and yields `Ok(None)` with a
//! warning; a file that exists but does not parse is always an error. Callers that need the
//! file use [`require_document`], which turns absence into [`LoadError::MissingRequired`].

use std::path::Path;

use serde::de::DeserializeOwned;

/// An untyped tree of mappings, sequences and scalars. Consumers impose the schema.
pub type Document = serde_yaml::Value;

/// Error when reading a structured document or adapting it to a typed shape.
///
/// Every variant names the offending file so the message is actionable on its own.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("required file not found: {path}")]
    MissingRequired { path: String },
    #[error("failed to read {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse YAML in {path}: {message}")]
    ParseYaml { path: String, message: String },
    #[error("invalid document {path}: {message}")]
    Invalid { path: String, message: String },
}

impl LoadError {
    /// Path of the file the error is about.
    pub fn path(&self) -> &str {
        match self {
            LoadError::MissingRequired { path }
            | LoadError::ReadFile { path, .. }
            | LoadError::ParseYaml { path, .. }
            | LoadError::Invalid { path, .. } => path,
        }
    }
}

/// Reads and parses `path`; `Ok(None)` when it does not exist. Logs nothing about absence.
fn read_if_present(path: &Path) -> Result<Option<Document>, LoadError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LoadError::ReadFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };
    let doc: Document = serde_yaml::from_str(&content).map_err(|e| LoadError::ParseYaml {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "read structured document");
    Ok(Some(doc))
}

/// Reads and parses the optional YAML file at `path`.
///
/// Returns `Ok(None)` with a warning when the file does not exist. No caching: every call hits
/// the filesystem.
pub fn read_document(path: &Path) -> Result<Option<Document>, LoadError> {
    let doc = read_if_present(path)?;
    if doc.is_none() {
        tracing::warn!(path = %path.display(), "structured document not found, continuing without it");
    }
    Ok(doc)
}

/// Like [`read_document`], but absence is [`LoadError::MissingRequired`] and is not logged.
pub fn require_document(path: &Path) -> Result<Document, LoadError> {
    read_if_present(path)?.ok_or_else(|| LoadError::MissingRequired {
        path: path.display().to_string(),
    })
}

/// Reinterprets `doc` (read from `path`) as `T`. Shape mismatches become [`LoadError::Invalid`].
pub fn from_document<T: DeserializeOwned>(path: &Path, doc: Document) -> Result<T, LoadError> {
    serde_yaml::from_value(doc).map_err(|e| LoadError::Invalid {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

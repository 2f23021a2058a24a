//! Error handling for extpack.
//!
//! This module provides:
//! - [`PackError`]: The main error enum for all extpack operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Error shape used by robot mode output

mod codes;

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::pipeline::Step;

pub use codes::ErrorCode;

/// Main error type for extpack operations.
#[derive(Error, Debug)]
pub enum PackError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Source directory not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Path cannot be stored in archive: {}", .0.display())]
    InvalidEntryPath(PathBuf),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid glob pattern {pattern}: {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("Missing credential: environment variable {0} is unset or empty")]
    MissingCredential(String),

    #[error("Signing tool unavailable: {0}")]
    SignerUnavailable(String),

    #[error("Signing tool failed ({}): {stderr}", exit_label(.code))]
    SignerFailed { code: Option<i32>, stderr: String },

    #[error("No such file: nothing matches {pattern} in {}", .dir.display())]
    ArtifactNotFound { pattern: String, dir: PathBuf },

    #[error("Ambiguous artifact: {} files match {pattern}", .candidates.len())]
    AmbiguousArtifact {
        pattern: String,
        candidates: Vec<PathBuf>,
    },

    #[error("{step} failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: Box<PackError>,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}"))
}

impl PackError {
    /// Get the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::SourceMissing(_) => ErrorCode::SourceMissing,
            Self::InvalidEntryPath(_) => ErrorCode::InvalidEntryPath,
            Self::Archive(_) => ErrorCode::ArchiveFailed,
            Self::Pattern { .. } => ErrorCode::PatternInvalid,
            Self::MissingCredential(_) => ErrorCode::CredentialMissing,
            Self::SignerUnavailable(_) => ErrorCode::SignerUnavailable,
            Self::SignerFailed { .. } => ErrorCode::SignerFailed,
            Self::ArtifactNotFound { .. } => ErrorCode::ArtifactNotFound,
            Self::AmbiguousArtifact { .. } => ErrorCode::ArtifactAmbiguous,
            Self::Step { source, .. } => source.code(),
        }
    }

    /// Process exit code for this error.
    ///
    /// A failing signing tool's own exit code is passed through; everything
    /// else exits with 1.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::SignerFailed { code: Some(code), .. } => {
                u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1)
            }
            Self::Step { source, .. } => source.exit_code(),
            _ => 1,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::SourceMissing(path) => Some(serde_json::json!({ "source_dir": path })),
            Self::MissingCredential(var) => Some(serde_json::json!({ "env_var": var })),
            Self::SignerFailed { code, .. } => Some(serde_json::json!({ "exit_code": code })),
            Self::ArtifactNotFound { pattern, dir } => {
                Some(serde_json::json!({ "pattern": pattern, "dir": dir }))
            }
            Self::AmbiguousArtifact {
                pattern,
                candidates,
            } => Some(serde_json::json!({ "pattern": pattern, "candidates": candidates })),
            Self::Step { step, source } => {
                let mut ctx = source.context().unwrap_or_else(|| serde_json::json!({}));
                if let Some(map) = ctx.as_object_mut() {
                    map.insert("step".to_string(), Value::from(step.name()));
                }
                Some(ctx)
            }
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_pack_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "ARTIFACT_NOT_FOUND")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 501)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "sign", "install")
    pub category: String,
}

impl StructuredError {
    #[must_use]
    pub fn from_pack_error(err: &PackError) -> Self {
        let code = err.code();
        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion: code.suggestion().to_string(),
            context: err.context(),
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&PackError> for StructuredError {
    fn from(err: &PackError) -> Self {
        Self::from_pack_error(err)
    }
}

/// Result type alias using PackError.
pub type Result<T> = std::result::Result<T, PackError>;

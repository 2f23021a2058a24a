//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Source/pack errors
//! - 2xx: Clean errors
//! - 3xx: Config errors
//! - 4xx: Sign errors
//! - 5xx: Install errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `SourceMissing` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Source/pack errors (1xx)
    // ========================================
    /// E101: Source directory is missing or not a directory
    SourceMissing,
    /// E102: A source path cannot be stored in the archive
    InvalidEntryPath,
    /// E103: Writing the archive failed
    ArchiveFailed,

    // ========================================
    // Clean errors (2xx)
    // ========================================
    /// E201: Glob pattern could not be parsed or walked
    PatternInvalid,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file has invalid syntax or values
    ConfigInvalid,

    // ========================================
    // Sign errors (4xx)
    // ========================================
    /// E401: Credential environment variable is unset or empty
    CredentialMissing,
    /// E402: Signing tool could not be found or started
    SignerUnavailable,
    /// E403: Signing tool exited non-zero
    SignerFailed,

    // ========================================
    // Install errors (5xx)
    // ========================================
    /// E501: No signed artifact matched the pattern
    ArtifactNotFound,
    /// E502: More than one signed artifact matched the pattern
    ArtifactAmbiguous,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E905: Serialization failed
    SerializationError,
    /// E906: File operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric code.
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::SourceMissing => 101,
            Self::InvalidEntryPath => 102,
            Self::ArchiveFailed => 103,

            Self::PatternInvalid => 201,

            Self::ConfigInvalid => 301,

            Self::CredentialMissing => 401,
            Self::SignerUnavailable => 402,
            Self::SignerFailed => 403,

            Self::ArtifactNotFound => 501,
            Self::ArtifactAmbiguous => 502,

            Self::SerializationError => 905,
            Self::IoError => 906,
        }
    }

    /// Get the code string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Actionable recovery hint.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::SourceMissing => "Check `paths.source_dir` in extpack.toml, or run from the extension project root with -C",
            Self::InvalidEntryPath => "Rename files whose names are not valid UTF-8",
            Self::ArchiveFailed => "Check disk space and write permissions on the output directory",

            Self::PatternInvalid => "Fix the glob syntax in `clean.pattern` or `install.artifact_pattern`",

            Self::ConfigInvalid => "Run `extpack config` to see current values. Check TOML syntax in config file",

            Self::CredentialMissing => "Export the signing credentials, e.g. `export API_KEY=... API_SECRET=...`",
            Self::SignerUnavailable => "Install the signing tool or point `sign.command` at it",
            Self::SignerFailed => "Inspect the signing tool output above; credentials may be invalid or the version already signed",

            Self::ArtifactNotFound => "Run `extpack sign` first, or check `install.artifact_pattern` against the signing tool's output name",
            Self::ArtifactAmbiguous => "Run `extpack clean` to remove stale artifacts, then sign again",

            Self::SerializationError => "The data format may be corrupted. Check input data for validity",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Whether the user can act to fix this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SerializationError)
    }

    /// Category label for grouping.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "pack",
            2 => "clean",
            3 => "config",
            4 => "sign",
            5 => "install",
            _ => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}

//! External signing tool integration.
//!
//! The signer is an opaque process: it receives the API credentials and the
//! unsigned archive, and leaves a signed artifact somewhere in its working
//! directory. Its output name is never predicted; `install` finds it by glob.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::info;

use crate::config::SignConfig;
use crate::error::{PackError, Result};

const REDACTED: &str = "***";

/// API credentials read from the environment at sign time.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    #[must_use]
    pub const fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }

    /// Read both credentials through `env`; unset or blank values fail.
    pub fn from_lookup<F>(key_var: &str, secret_var: &str, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| {
            env(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| PackError::MissingCredential(var.to_string()))
        };
        Ok(Self::new(read(key_var)?, read(secret_var)?))
    }

    /// Mask any credential echoed back in `text`.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        [&self.api_secret, &self.api_key]
            .into_iter()
            .filter(|secret| !secret.is_empty())
            .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), REDACTED))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &REDACTED)
            .field("api_secret", &REDACTED)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignReport {
    /// Command line with credentials masked.
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
}

/// Runs the signing tool in a fixed working directory.
#[derive(Debug, Clone)]
pub struct Signer {
    command: String,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl Signer {
    pub fn new(command: impl Into<String>, args: Vec<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args,
            work_dir: work_dir.into(),
        }
    }

    /// Create a signer from config, running inside `work_dir`.
    pub fn from_config(config: &SignConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self::new(config.command.clone(), config.args.clone(), work_dir)
    }

    /// Locate the executable.
    ///
    /// Paths with a separator resolve against the working directory, bare
    /// names against `PATH`. The result is absolute, since the child starts
    /// in the working directory rather than ours.
    pub fn resolve_program(&self) -> Result<PathBuf> {
        let raw = Path::new(&self.command);
        if raw.components().count() == 1 && !raw.is_absolute() {
            return which::which(&self.command)
                .map_err(|err| PackError::SignerUnavailable(format!("{}: {err}", self.command)));
        }

        let path = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.work_dir.join(raw)
        };
        if path.is_file() {
            Ok(std::path::absolute(&path)?)
        } else {
            Err(PackError::SignerUnavailable(format!(
                "{} does not exist",
                path.display()
            )))
        }
    }

    /// Argument list with placeholders filled in.
    fn render_args(&self, credentials: Option<&Credentials>, input: &str) -> Vec<String> {
        let (key, secret) = credentials.map_or((REDACTED, REDACTED), |c| {
            (c.api_key.as_str(), c.api_secret.as_str())
        });
        let values = [("{api_key}", key), ("{api_secret}", secret), ("{input}", input)];
        self.args
            .iter()
            .map(|arg| fill_placeholders(arg, &values))
            .collect()
    }

    /// Loggable command line for signing `input`.
    #[must_use]
    pub fn display_command(&self, input: &Path) -> String {
        let mut parts = vec![self.command.clone()];
        parts.extend(self.render_args(None, &self.input_arg(input)));
        parts.join(" ")
    }

    fn input_arg(&self, input: &Path) -> String {
        input
            .strip_prefix(&self.work_dir)
            .unwrap_or(input)
            .to_string_lossy()
            .into_owned()
    }

    /// Run the signing tool on `input`.
    pub fn sign(&self, credentials: &Credentials, input: &Path) -> Result<SignReport> {
        if !input.is_file() {
            return Err(PackError::ArtifactNotFound {
                pattern: input
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                dir: input.parent().map(Path::to_path_buf).unwrap_or_default(),
            });
        }

        let program = self.resolve_program()?;
        let input_arg = self.input_arg(input);
        let command = self.display_command(input);
        info!(command = %command, work_dir = %self.work_dir.display(), "running signing tool");

        let output = Command::new(&program)
            .args(self.render_args(Some(credentials), &input_arg))
            .current_dir(&self.work_dir)
            .output()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    PackError::SignerUnavailable(format!("{}: {err}", program.display()))
                }
                _ => PackError::Io(err),
            })?;

        let stdout = credentials.redact(String::from_utf8_lossy(&output.stdout).trim());
        for line in stdout.lines() {
            info!(target: "extpack::signer", "{line}");
        }

        if !output.status.success() {
            let stderr = credentials.redact(String::from_utf8_lossy(&output.stderr).trim());
            return Err(PackError::SignerFailed {
                code: output.status.code(),
                stderr: if stderr.is_empty() { stdout } else { stderr },
            });
        }

        Ok(SignReport {
            command,
            exit_code: output.status.code().unwrap_or_default(),
            stdout,
        })
    }
}

/// Replace placeholders in one pass over `template`.
///
/// Substituted values are never rescanned, so a credential containing
/// `{input}` is passed through verbatim.
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some((name, value)) = values.iter().find(|(name, _)| tail.starts_with(*name)) {
            out.push_str(value);
            rest = &tail[name.len()..];
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

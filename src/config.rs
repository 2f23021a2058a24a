use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};

/// File name of the per-project config.
pub const PROJECT_CONFIG_FILE: &str = "extpack.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub clean: CleanConfig,
    #[serde(default)]
    pub sign: SignConfig,
    #[serde(default)]
    pub install: InstallConfig,
}

impl Config {
    /// Load config layers for a project rooted at `project_root`.
    ///
    /// An explicit path (argument or `EXTPACK_CONFIG`) replaces the global and
    /// project files; environment overrides always apply last.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        Self::load_with_env(explicit_path, project_root, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an injectable environment lookup.
    pub fn load_with_env<F>(explicit_path: Option<&Path>, project_root: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env("EXTPACK_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            let path = if path.is_relative() {
                project_root.join(path)
            } else {
                path
            };
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                PackError::Config(format!("config file not found: {}", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&project_root.join(PROJECT_CONFIG_FILE))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(env);
        config.validate()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_patch(&dir.join("extpack/config.toml")),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| PackError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| PackError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.clean {
            self.clean.merge(patch);
        }
        if let Some(patch) = patch.sign {
            self.sign.merge(patch);
        }
        if let Some(patch) = patch.install {
            self.install.merge(patch);
        }
    }

    fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = non_empty("EXTPACK_SOURCE_DIR") {
            self.paths.source_dir = PathBuf::from(value);
        }
        if let Some(value) = non_empty("EXTPACK_DIST_DIR") {
            self.paths.dist_dir = PathBuf::from(value);
        }
        if let Some(value) = non_empty("EXTPACK_ARCHIVE_NAME") {
            self.paths.archive_name = value;
        }
        if let Some(value) = non_empty("EXTPACK_CLEAN_PATTERN") {
            self.clean.pattern = value;
        }
        if let Some(value) = non_empty("EXTPACK_SIGN_COMMAND") {
            self.sign.command = value;
        }
        if let Some(value) = non_empty("EXTPACK_API_KEY_ENV") {
            self.sign.api_key_env = value;
        }
        if let Some(value) = non_empty("EXTPACK_API_SECRET_ENV") {
            self.sign.api_secret_env = value;
        }
        if let Some(value) = non_empty("EXTPACK_ARTIFACT_PATTERN") {
            self.install.artifact_pattern = value;
        }
        if let Some(value) = non_empty("EXTPACK_INSTALL_DEST") {
            self.install.destination = PathBuf::from(value);
        }
    }

    /// Reject values no step could run with.
    pub fn validate(&self) -> Result<()> {
        let name = self.paths.archive_name.trim();
        if name.is_empty() {
            return Err(PackError::Config("paths.archive_name is empty".to_string()));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(PackError::Config(format!(
                "paths.archive_name must be a file name, got {name}"
            )));
        }
        validate_pattern("clean.pattern", &self.clean.pattern)?;
        validate_pattern("install.artifact_pattern", &self.install.artifact_pattern)?;
        if self.sign.command.trim().is_empty() {
            return Err(PackError::Config("sign.command is empty".to_string()));
        }
        if self.install.destination.as_os_str().is_empty() {
            return Err(PackError::Config("install.destination is empty".to_string()));
        }
        Ok(())
    }

    /// Render as TOML, e.g. for `extpack init`.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|err| PackError::Config(format!("serialize config: {err}")))
    }

    /// Absolute layout of every path the steps touch.
    #[must_use]
    pub fn resolve(&self, project_root: &Path) -> ResolvedPaths {
        let dist_dir = project_root.join(&self.paths.dist_dir);
        ResolvedPaths {
            source_dir: project_root.join(&self.paths.source_dir),
            archive: dist_dir.join(&self.paths.archive_name),
            destination: project_root.join(&self.install.destination),
            dist_dir,
        }
    }
}

/// Paths joined onto the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    pub source_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub archive: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_archive_name() -> String {
    "cssxfire_unsigned.xpi".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            dist_dir: default_dist_dir(),
            archive_name: default_archive_name(),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.source_dir {
            self.source_dir = value;
        }
        if let Some(value) = patch.dist_dir {
            self.dist_dir = value;
        }
        if let Some(value) = patch.archive_name {
            self.archive_name = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Glob, relative to the dist directory.
    #[serde(default = "default_artifact_pattern")]
    pub pattern: String,
}

fn default_artifact_pattern() -> String {
    "css_x_fire*-fx.xpi".to_string()
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            pattern: default_artifact_pattern(),
        }
    }
}

impl CleanConfig {
    fn merge(&mut self, patch: CleanPatch) {
        if let Some(value) = patch.pattern {
            self.pattern = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignConfig {
    /// Signing executable. Relative paths with a separator resolve against
    /// the dist directory; bare names are looked up on `PATH`.
    #[serde(default = "default_sign_command")]
    pub command: String,
    /// Argument template. `{api_key}`, `{api_secret}` and `{input}` are
    /// substituted per argument.
    #[serde(default = "default_sign_args")]
    pub args: Vec<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_api_secret_env")]
    pub api_secret_env: String,
}

fn default_sign_command() -> String {
    "../node_modules/.bin/jpm".to_string()
}

fn default_sign_args() -> Vec<String> {
    [
        "sign",
        "--api-key",
        "{api_key}",
        "--api-secret",
        "{api_secret}",
        "--xpi",
        "{input}",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

fn default_api_secret_env() -> String {
    "API_SECRET".to_string()
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            command: default_sign_command(),
            args: default_sign_args(),
            api_key_env: default_api_key_env(),
            api_secret_env: default_api_secret_env(),
        }
    }
}

impl SignConfig {
    fn merge(&mut self, patch: SignPatch) {
        if let Some(value) = patch.command {
            self.command = value;
        }
        if let Some(value) = patch.args {
            self.args = value;
        }
        if let Some(value) = patch.api_key_env {
            self.api_key_env = value;
        }
        if let Some(value) = patch.api_secret_env {
            self.api_secret_env = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Glob locating the signed artifact inside the dist directory.
    #[serde(default = "default_artifact_pattern")]
    pub artifact_pattern: String,
    #[serde(default = "default_destination")]
    pub destination: PathBuf,
}

fn default_destination() -> PathBuf {
    PathBuf::from("../resources/com/github/cssxfire/www/cssxfire.xpi")
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            artifact_pattern: default_artifact_pattern(),
            destination: default_destination(),
        }
    }
}

impl InstallConfig {
    fn merge(&mut self, patch: InstallPatch) {
        if let Some(value) = patch.artifact_pattern {
            self.artifact_pattern = value;
        }
        if let Some(value) = patch.destination {
            self.destination = value;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    paths: Option<PathsPatch>,
    clean: Option<CleanPatch>,
    sign: Option<SignPatch>,
    install: Option<InstallPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PathsPatch {
    source_dir: Option<PathBuf>,
    dist_dir: Option<PathBuf>,
    archive_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CleanPatch {
    pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SignPatch {
    command: Option<String>,
    args: Option<Vec<String>>,
    api_key_env: Option<String>,
    api_secret_env: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InstallPatch {
    artifact_pattern: Option<String>,
    destination: Option<PathBuf>,
}

fn validate_pattern(key: &str, pattern: &str) -> Result<()> {
    if pattern.trim().is_empty() {
        return Err(PackError::Config(format!("{key} is empty")));
    }
    glob::Pattern::new(pattern).map_err(|err| PackError::Pattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })?;
    Ok(())
}

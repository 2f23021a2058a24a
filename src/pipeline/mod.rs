//! Task sequencer: pack, clean, sign, install.
//!
//! Steps always run in canonical order and the chain stops at the first
//! failure. The failing step's error is wrapped in [`PackError::Step`] so the
//! caller knows where the chain stopped; the underlying message and exit code
//! are kept.

pub mod clean;
pub mod install;
pub mod pack;
pub mod sign;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, info_span};

use crate::config::{Config, ResolvedPaths};
use crate::error::{PackError, Result};

pub use clean::CleanReport;
pub use install::InstallReport;
pub use pack::PackReport;
pub use sign::{Credentials, SignReport, Signer};

/// One step of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Zip the source directory into the unsigned archive
    Pack,
    /// Delete stale signed artifacts
    Clean,
    /// Run the external signing tool
    Sign,
    /// Copy the signed artifact to its destination
    Install,
}

impl Step {
    /// Canonical execution order.
    pub const ALL: [Self; 4] = [Self::Pack, Self::Clean, Self::Sign, Self::Install];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pack => "pack",
            Self::Clean => "clean",
            Self::Sign => "sign",
            Self::Install => "install",
        }
    }

    /// Order `steps` canonically and drop duplicates.
    #[must_use]
    pub fn ordered(steps: &[Self]) -> Vec<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|step| steps.contains(step))
            .collect()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a successful step produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepOutcome {
    Pack(PackReport),
    Clean(CleanReport),
    Sign(SignReport),
    Install(InstallReport),
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    #[serde(flatten)]
    pub outcome: StepOutcome,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub steps: Vec<StepReport>,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Runs steps against one project.
pub struct Pipeline {
    config: Config,
    paths: ResolvedPaths,
    env: EnvLookup,
}

impl Pipeline {
    /// Create a pipeline reading credentials from the process environment.
    #[must_use]
    pub fn new(config: Config, project_root: &Path) -> Self {
        let paths = config.resolve(project_root);
        Self {
            config,
            paths,
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Replace the environment lookup used for credentials.
    #[must_use]
    pub fn with_env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        self.env = Box::new(env);
        self
    }

    #[must_use]
    pub const fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    /// Run the full chain.
    pub fn run_all(&self) -> Result<PipelineReport> {
        self.run(&Step::ALL)
    }

    /// Run `steps` in canonical order, stopping at the first failure.
    pub fn run(&self, steps: &[Step]) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        for step in Step::ordered(steps) {
            let span = info_span!("step", step = %step);
            let _guard = span.enter();

            let started = Instant::now();
            info!("starting");
            match self.run_step(step) {
                Ok(outcome) => {
                    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                    info!(duration_ms, "finished");
                    report.steps.push(StepReport {
                        outcome,
                        duration_ms,
                    });
                }
                Err(err) => {
                    error!(error = %err, "step failed; aborting chain");
                    return Err(PackError::Step {
                        step,
                        source: Box::new(err),
                    });
                }
            }
        }

        Ok(report)
    }

    fn run_step(&self, step: Step) -> Result<StepOutcome> {
        match step {
            Step::Pack => {
                pack::pack(&self.paths.source_dir, &self.paths.archive).map(StepOutcome::Pack)
            }
            Step::Clean => {
                clean::clean(&self.paths.dist_dir, &self.config.clean.pattern).map(StepOutcome::Clean)
            }
            Step::Sign => {
                let credentials = Credentials::from_lookup(
                    &self.config.sign.api_key_env,
                    &self.config.sign.api_secret_env,
                    |key| (self.env)(key),
                )?;
                Signer::from_config(&self.config.sign, &self.paths.dist_dir)
                    .sign(&credentials, &self.paths.archive)
                    .map(StepOutcome::Sign)
            }
            Step::Install => install::install(
                &self.paths.dist_dir,
                &self.config.install.artifact_pattern,
                &self.paths.destination,
            )
            .map(StepOutcome::Install),
        }
    }
}

/// Files in `dir` matching a glob `pattern` relative to it, sorted.
///
/// A missing directory yields no matches. Directories never match.
pub fn glob_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let dir_str = dir.to_str().ok_or_else(|| PackError::Pattern {
        pattern: pattern.to_string(),
        reason: format!("directory is not valid UTF-8: {}", dir.display()),
    })?;
    let full = format!("{}/{pattern}", glob::Pattern::escape(dir_str));

    let entries = glob::glob(&full).map_err(|err| PackError::Pattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| PackError::Io(err.into()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

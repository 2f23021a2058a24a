//! Per-invocation context shared by command handlers.

use std::path::PathBuf;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Pipeline;

pub struct AppContext {
    pub project_root: PathBuf,
    pub config: Config,
    pub output_format: OutputFormat,
    pub quiet: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = cli.project_root()?;
        let config = Config::load(cli.config.as_deref(), &project_root)?;
        tracing::debug!(root = %project_root.display(), "loaded config");
        Ok(Self {
            project_root,
            config,
            output_format: cli.output_format(),
            quiet: cli.quiet,
        })
    }

    /// Pipeline over this project's resolved paths.
    #[must_use]
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.config.clone(), &self.project_root)
    }
}

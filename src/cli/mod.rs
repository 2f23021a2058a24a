//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Package, sign and install a browser extension
#[derive(Parser, Debug)]
#[command(name = "extpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// [DEPRECATED] Enable JSON output for machine consumption.
    /// Use --output-format=json or -m instead.
    #[arg(long, global = true, hide = true)]
    pub robot: bool,

    /// Output format (human, json, plain)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress logging and step reports; errors and JSON output still print
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: <project>/extpack.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Extension project root (default: current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Task to run; the whole chain when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Get the effective output format, considering flags for backward compatibility.
    ///
    /// Priority order:
    /// 1. `--output-format` → Explicit format
    /// 2. `--machine` → JSON format (shorthand)
    /// 3. `--robot` → JSON format (deprecated, backward compat)
    /// 4. Default → Human format
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if let Some(fmt) = self.output_format {
            return fmt;
        }
        if self.machine || self.robot {
            return OutputFormat::Json;
        }
        OutputFormat::Human
    }

    /// Absolute project root the config and relative paths resolve against.
    ///
    /// Steps spawn the signer in another working directory, so a relative
    /// `-C` is anchored to the current directory here.
    pub fn project_root(&self) -> std::io::Result<PathBuf> {
        match self.project_dir.as_ref() {
            Some(dir) => std::path::absolute(dir),
            None => std::env::current_dir(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the given steps (default: all) in pack, clean, sign, install order
    Run(commands::run::RunArgs),

    /// Zip the source directory into the unsigned archive
    Pack,

    /// Delete stale signed artifacts from the dist directory
    Clean,

    /// Sign the unsigned archive with the external signing tool
    Sign,

    /// Copy the signed artifact to the install destination
    Install,

    /// Show the effective configuration
    Config,

    /// Write a default extpack.toml into the project root
    Init(commands::init::InitArgs),
}

//! CLI command implementations
//!
//! Each subcommand has its own module with an args struct (when it takes
//! arguments) and a `run()` function.

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;
use crate::pipeline::Step;

pub mod config;
pub mod init;
pub mod run;

/// Dispatch a command to its handler. `None` is the default task.
pub fn run(ctx: &AppContext, command: Option<&Commands>) -> Result<()> {
    match command {
        None => run::run_steps(ctx, &Step::ALL),
        Some(Commands::Run(args)) => run::run(ctx, args),
        Some(Commands::Pack) => run::run_steps(ctx, &[Step::Pack]),
        Some(Commands::Clean) => run::run_steps(ctx, &[Step::Clean]),
        Some(Commands::Sign) => run::run_steps(ctx, &[Step::Sign]),
        Some(Commands::Install) => run::run_steps(ctx, &[Step::Install]),
        Some(Commands::Config) => config::run(ctx),
        Some(Commands::Init(args)) => init::run(ctx, args),
    }
}

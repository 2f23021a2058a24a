//! extpack run - Run steps of the packaging chain.

use clap::Args;

use crate::app::AppContext;
use crate::cli::output;
use crate::error::Result;
use crate::pipeline::Step;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Steps to run (default: all). Always executed in canonical order.
    #[arg(value_enum)]
    pub steps: Vec<Step>,
}

pub fn run(ctx: &AppContext, args: &RunArgs) -> Result<()> {
    if args.steps.is_empty() {
        run_steps(ctx, &Step::ALL)
    } else {
        run_steps(ctx, &args.steps)
    }
}

/// Run `steps` against the project and print the report.
pub fn run_steps(ctx: &AppContext, steps: &[Step]) -> Result<()> {
    let report = ctx.pipeline().run(steps)?;
    output::emit_report(ctx.output_format, ctx.quiet, &report)
}

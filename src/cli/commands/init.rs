//! extpack init - Write a default extpack.toml

use std::path::Path;

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{self, OutputFormat};
use crate::config::{Config, PROJECT_CONFIG_FILE};
use crate::error::Result;
use crate::utils::fs::write_new;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing extpack.toml
    #[arg(long, short)]
    pub force: bool,
}

pub fn run(ctx: &AppContext, args: &InitArgs) -> Result<()> {
    run_without_context(&ctx.project_root, ctx.output_format, args)
}

/// Initialize without loading the existing config, which may be broken.
pub fn run_without_context(project_root: &Path, format: OutputFormat, args: &InitArgs) -> Result<()> {
    let target = project_root.join(PROJECT_CONFIG_FILE);
    let contents = Config::default().to_toml_string()?;
    let written = write_new(&target, &contents, args.force)?;

    if format.is_machine_readable() {
        return output::emit_json(serde_json::json!({
            "path": target,
            "written": written,
        }));
    }

    if written {
        println!("{} Wrote {}", style("✓").green().bold(), target.display());
    } else {
        println!(
            "{} Already exists at {}",
            style("!").yellow(),
            target.display()
        );
        println!("  Use --force to overwrite");
    }
    Ok(())
}

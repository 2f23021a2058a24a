//! extpack config - Show the effective configuration

use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output;
use crate::config::{Config, ResolvedPaths};
use crate::error::Result;

#[derive(Serialize)]
struct ConfigView<'a> {
    project_root: &'a std::path::Path,
    config: &'a Config,
    resolved: ResolvedPaths,
}

pub fn run(ctx: &AppContext) -> Result<()> {
    if ctx.output_format.is_machine_readable() {
        return output::emit_json(ConfigView {
            project_root: &ctx.project_root,
            config: &ctx.config,
            resolved: ctx.config.resolve(&ctx.project_root),
        });
    }

    println!("# project root: {}", ctx.project_root.display());
    print!("{}", ctx.config.to_toml_string()?);
    Ok(())
}

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use console::style;
use serde::Serialize;

use crate::error::{ErrorCode, PackError, Result};
use crate::pipeline::{PipelineReport, StepOutcome, StepReport};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable formatted output with colors (default)
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
    /// Plain text without colors or formatting
    Plain,
}

impl OutputFormat {
    /// Check if this format should use colors
    #[must_use]
    pub const fn use_colors(&self) -> bool {
        matches!(self, Self::Human)
    }

    /// Check if this format is machine-readable
    #[must_use]
    pub const fn is_machine_readable(&self) -> bool {
        matches!(self, Self::Json)
    }
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    Error {
        code: ErrorCode,
        numeric_code: u16,
        message: String,
        suggestion: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
        recoverable: bool,
        category: String,
    },
}

impl From<&PackError> for RobotStatus {
    fn from(err: &PackError) -> Self {
        let structured = err.to_structured();
        Self::Error {
            code: structured.code,
            numeric_code: structured.numeric_code,
            message: structured.message,
            suggestion: structured.suggestion,
            context: structured.context,
            recoverable: structured.recoverable,
            category: structured.category,
        }
    }
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
    }
}

pub fn robot_error(err: &PackError) -> RobotResponse<serde_json::Value> {
    RobotResponse {
        status: RobotStatus::from(err),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data: serde_json::Value::Null,
    }
}

/// Print a successful robot response to stdout.
pub fn emit_json<T: Serialize>(data: T) -> Result<()> {
    let payload = serde_json::to_string_pretty(&robot_ok(data))?;
    println!("{payload}");
    Ok(())
}

/// Report a failure in the requested format.
pub fn emit_error(format: OutputFormat, err: &PackError) {
    match format {
        OutputFormat::Json => {
            let payload = serde_json::to_string_pretty(&robot_error(err)).unwrap_or_default();
            println!("{payload}");
        }
        OutputFormat::Human => {
            eprintln!("{} {err}", style("Error:").red().bold());
            eprintln!("  {}", style(err.code().suggestion()).dim());
        }
        OutputFormat::Plain => {
            eprintln!("Error: {err}");
        }
    }
}

/// Print a pipeline report. Human and plain reports are skipped when `quiet`.
pub fn emit_report(format: OutputFormat, quiet: bool, report: &PipelineReport) -> Result<()> {
    if format.is_machine_readable() {
        return emit_json(report);
    }
    if quiet {
        return Ok(());
    }
    for step in &report.steps {
        let line = step_line(step);
        if format.use_colors() {
            println!("{} {line}", style("✓").green().bold());
        } else {
            println!("ok {line}");
        }
    }
    Ok(())
}

fn step_line(step: &StepReport) -> String {
    let detail = match &step.outcome {
        StepOutcome::Pack(pack) => format!(
            "pack     {} files -> {} ({})",
            pack.files.len(),
            pack.archive.display(),
            human_bytes(pack.bytes)
        ),
        StepOutcome::Clean(clean) => match clean.removed.len() {
            0 => "clean    nothing to remove".to_string(),
            n => format!("clean    removed {n} stale artifact(s)"),
        },
        StepOutcome::Sign(sign) => format!("sign     {}", sign.command),
        StepOutcome::Install(install) => format!(
            "install  {} -> {}",
            install.artifact.display(),
            install.destination.display()
        ),
    };
    format!("{detail} [{} ms]", step.duration_ms)
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut unit = 0;
    let mut scale: u64 = 1;
    while bytes / scale >= 1024 && unit < UNITS.len() - 1 {
        scale *= 1024;
        unit += 1;
    }
    if unit == 0 {
        return format!("{bytes} B");
    }
    // one decimal, truncated
    let tenths = u128::from(bytes) * 10 / u128::from(scale);
    format!("{}.{} {}", tenths / 10, tenths % 10, UNITS[unit])
}

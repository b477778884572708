use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Args;
use fprop_engine::{Report, ReportFormat};
use log::error;

use crate::commands::SettingsArgs;

#[derive(Debug, Args)]
pub struct DetailsArgs {
    /// File to describe
    pub path: PathBuf,

    /// Output format: text, html or json
    #[arg(long, short = 'f', value_name = "FORMAT", default_value = "text")]
    pub format: ReportFormat,

    /// Describe a symlink itself instead of the file it points to
    #[arg(long)]
    pub no_follow: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

pub fn run(args: DetailsArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[details] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: DetailsArgs) -> Result<ExitCode> {
    let config = args.settings.store().current();
    let snapshot = crate::commands::stat_path(&args.path, args.no_follow)
        .with_context(|| format!("failed to read properties of {}", args.path.display()))?;

    let report = Report::from_snapshot(&snapshot, &config);
    print!("{}", report.render(args.format));

    Ok(ExitCode::SUCCESS)
}

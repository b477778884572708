use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Args;
use fprop_engine::summary_text;
use log::{debug, error};

use crate::commands::SettingsArgs;

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// File to summarize
    pub path: PathBuf,

    /// Describe a symlink itself instead of the file it points to
    #[arg(long)]
    pub no_follow: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

pub fn run(args: StatusArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[status] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: StatusArgs) -> Result<ExitCode> {
    let config = args.settings.store().current();
    let snapshot = crate::commands::stat_path(&args.path, args.no_follow)
        .with_context(|| format!("cannot stat {}", args.path.display()))?;

    match summary_text(&snapshot, &config) {
        Some(line) => println!("{line}"),
        None => debug!("Every status-bar field is disabled; nothing to print"),
    }

    Ok(ExitCode::SUCCESS)
}

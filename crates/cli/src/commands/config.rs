use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use log::error;

use crate::commands::SettingsArgs;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Print only the settings file location
    #[arg(long)]
    pub path: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

pub fn run(args: ConfigArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[config] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: ConfigArgs) -> Result<ExitCode> {
    let path = args.settings.path();
    if args.path {
        println!("{}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let store = args.settings.store();
    let json = serde_json::to_string_pretty(&store.current())
        .context("failed to serialize configuration")?;

    eprintln!("[config] settings: {}", path.display());
    eprintln!("[config] platform: {:?}", store.platform());
    println!("{json}");

    Ok(ExitCode::SUCCESS)
}

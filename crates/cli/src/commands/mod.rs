pub mod config;
pub mod details;
pub mod status;
pub mod watch;

use std::{
    io,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use fprop_fs::StatSnapshot;
use fprop_runtime::{ConfigStore, SettingsFile, default_settings_path};
use log::debug;

pub use config::ConfigArgs;
pub use details::DetailsArgs;
pub use status::StatusArgs;
pub use watch::WatchArgs;

#[derive(Parser, Debug)]
#[command(
    name = "fprop",
    version,
    about = "fprop - file properties at a glance",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the status-bar summary for a file.
    ///
    /// Example:
    ///   fprop status Cargo.toml
    Status(StatusArgs),

    /// Print every stat field of a file as a report.
    ///
    /// Example:
    ///   fprop details --format html /etc/hosts > hosts.html
    Details(DetailsArgs),

    /// Show the effective configuration.
    Config(ConfigArgs),

    /// Drive a live status bar from commands on stdin.
    ///
    /// Commands: open <path>, virtual <uri>, close, save [path], details,
    /// reload, quit
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Settings file (defaults to $FPROP_SETTINGS, then the per-user config dir)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,
}

impl SettingsArgs {
    pub fn path(&self) -> PathBuf {
        self.settings.clone().unwrap_or_else(default_settings_path)
    }

    pub fn store(&self) -> ConfigStore {
        let path = self.path();
        debug!("Reading settings from {}", path.display());
        ConfigStore::new(SettingsFile::new(path))
    }
}

/// Stat `path`, or the link itself when `no_follow` is set.
pub fn stat_path(path: &Path, no_follow: bool) -> io::Result<StatSnapshot> {
    if no_follow {
        fprop_fs::lstat(path)
    } else {
        fprop_fs::stat(path)
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

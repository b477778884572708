use std::{
    fmt,
    io::{self, BufRead},
    path::PathBuf,
    process::ExitCode,
    thread,
};

use anyhow::{Context, Result};
use clap::Args;
use crossbeam::channel::{self, Sender};
use fprop_engine::{
    ActiveResource, Event, FsLstat, FsStat, Orchestrator, ReportFormat, StatWorker,
};
use fprop_runtime::CONFIGURATION_SECTION;
use log::{debug, error, info, warn};

use crate::{commands::SettingsArgs, terminal::TerminalHost};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Format used when `details` is requested
    #[arg(long, short = 'f', value_name = "FORMAT", default_value = "text")]
    pub format: ReportFormat,

    /// Describe a symlink itself instead of the file it points to
    #[arg(long)]
    pub no_follow: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

pub fn run(args: WatchArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[watch] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: WatchArgs) -> Result<ExitCode> {
    let store = args.settings.store();
    let worker = if args.no_follow {
        StatWorker::spawn(FsLstat)
    } else {
        StatWorker::spawn(FsStat)
    }
    .context("failed to start stat worker")?;

    let (events_tx, events_rx) = channel::unbounded();
    thread::Builder::new()
        .name("fprop-stdin".to_owned())
        .spawn(move || read_commands(io::stdin().lock(), events_tx))
        .context("failed to start stdin reader")?;

    let host = TerminalHost::new(io::stdout(), io::stderr(), args.format);
    let orchestrator = Orchestrator::new(host, store, worker);
    info!("Watching; type `quit` or close stdin to stop");

    orchestrator.run(events_rx);
    Ok(ExitCode::SUCCESS)
}

/// Turn stdin lines into host events until `quit` or end of input.
fn read_commands(input: impl BufRead, events: Sender<Event>) {
    let mut reader = CommandReader::default();

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read stdin: {e}");
                break;
            }
        };

        match reader.parse(&line) {
            Ok(Some(event)) => {
                let quit = event == Event::Shutdown;
                if events.send(event).is_err() || quit {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("[watch] {e}"),
        }
    }

    debug!("stdin closed");
    let _ = events.send(Event::Shutdown);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown(String),
    MissingArgument(&'static str),
    NothingToSave,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(cmd) => write!(
                f,
                "unknown command {cmd:?} (expected open, virtual, close, save, details, reload or quit)"
            ),
            CommandError::MissingArgument(cmd) => write!(f, "`{cmd}` needs an argument"),
            CommandError::NothingToSave => f.write_str("no file is open"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Plays the editor: remembers which file is open so `save` can default to it.
#[derive(Debug, Default)]
pub struct CommandReader {
    open: Option<PathBuf>,
}

impl CommandReader {
    pub fn parse(&mut self, line: &str) -> Result<Option<Event>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        let event = match cmd {
            "open" => {
                let path = required(rest, "open")?;
                let path = std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path));
                self.open = Some(path.clone());
                Event::ActiveEditorChanged(ActiveResource::File(path))
            }
            "virtual" => {
                let uri = required(rest, "virtual")?;
                self.open = None;
                Event::ActiveEditorChanged(ActiveResource::Virtual(uri.to_owned()))
            }
            "close" => {
                self.open = None;
                Event::ActiveEditorChanged(ActiveResource::None)
            }
            "save" if rest.is_empty() => {
                let path = self.open.clone().ok_or(CommandError::NothingToSave)?;
                Event::DocumentSaved(path)
            }
            "save" => {
                let path = std::path::absolute(rest).unwrap_or_else(|_| PathBuf::from(rest));
                Event::DocumentSaved(path)
            }
            "details" => Event::ViewDetails,
            "reload" => Event::ConfigurationChanged(CONFIGURATION_SECTION.to_owned()),
            "quit" | "exit" => Event::Shutdown,
            other => return Err(CommandError::Unknown(other.to_owned())),
        };

        Ok(Some(event))
    }
}

fn required<'a>(rest: &'a str, cmd: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(cmd))
    } else {
        Ok(rest)
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;

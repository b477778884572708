use std::{
    error::Error,
    fmt,
    path::{Path, PathBuf},
};

use fprop_runtime::Alignment;

use crate::report::Report;

/// Priority hint for the status-bar entries. The left entry uses the
/// negated value so it sits at the far end of its side.
pub const STATUS_BAR_ITEM_PRIORITY: i32 = 1024;

/// Command the status-bar entry runs on click.
pub const VIEW_DETAILS_COMMAND: &str = "file-properties.viewDetails";

/// One physical status-bar entry. Hosts bind an entry to a side when it is
/// created and it stays there.
pub trait StatusBarItem {
    fn set_text(&mut self, text: &str);
    fn set_tooltip(&mut self, tooltip: &str);
    fn set_command(&mut self, command: &str);
    fn show(&mut self);
    fn hide(&mut self);
    fn dispose(&mut self);
}

/// The editor UI primitives the orchestrator drives.
pub trait Host {
    type Item: StatusBarItem;

    fn create_status_bar_item(&mut self, alignment: Alignment, priority: i32) -> Self::Item;

    /// Present a detail report in a read-only panel.
    fn show_report(&mut self, report: &Report);

    /// Append a line to the diagnostic output channel.
    fn append_output(&mut self, line: &str);
}

/// What the active editor tab is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveResource {
    /// No editor has focus.
    #[default]
    None,
    /// An unsaved or otherwise non-file buffer, identified by its URI.
    Virtual(String),
    File(PathBuf),
}

impl ActiveResource {
    pub fn as_file(&self) -> Option<&Path> {
        match self {
            ActiveResource::File(path) => Some(path),
            ActiveResource::None | ActiveResource::Virtual(_) => None,
        }
    }

    /// The filesystem path to stat, or why there is none.
    pub fn resolve(&self) -> Result<PathBuf, ResolveError> {
        match self {
            ActiveResource::File(path) => Ok(path.clone()),
            ActiveResource::None => Err(ResolveError::NoActiveEditor),
            ActiveResource::Virtual(uri) => Err(ResolveError::NotAFile(uri.clone())),
        }
    }
}

/// Expected reasons there is nothing to stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    NoActiveEditor,
    NotAFile(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NoActiveEditor => f.write_str("Active editor is undefined"),
            ResolveError::NotAFile(uri) => {
                write!(f, "Active editor document is not a file: {uri}")
            }
        }
    }
}

impl Error for ResolveError {}

/// Host notifications fed to [`crate::Orchestrator::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ActiveEditorChanged(ActiveResource),
    DocumentSaved(PathBuf),
    /// A settings section (or dotted key) changed.
    ConfigurationChanged(String),
    ViewDetails,
    Shutdown,
}

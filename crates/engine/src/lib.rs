mod host;
mod orchestrator;
mod report;
mod status;
mod summary;
#[cfg(test)]
mod testing;
mod worker;

pub use host::{
    ActiveResource, Event, Host, ResolveError, STATUS_BAR_ITEM_PRIORITY, StatusBarItem,
    VIEW_DETAILS_COMMAND,
};
pub use orchestrator::Orchestrator;
pub use report::{PLACEHOLDER, Report, ReportFormat, ReportRow};
pub use status::DualSidedWidget;
pub use summary::{STATUS_BAR_TOOLTIP, summary_text};
pub use worker::{
    FsLstat, FsStat, Purpose, SHUTDOWN_GRACE, StatCompletion, StatProvider, StatRequest, StatWorker,
};

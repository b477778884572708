use std::{
    ops::ControlFlow,
    path::{Path, PathBuf},
    time::Duration,
};

use crossbeam::channel::{Receiver, RecvTimeoutError, select};
use fprop_runtime::ConfigStore;
use log::{debug, error, info, warn};

use crate::{
    host::{ActiveResource, Event, Host, VIEW_DETAILS_COMMAND},
    report::Report,
    status::DualSidedWidget,
    summary::{STATUS_BAR_TOOLTIP, summary_text},
    worker::{Purpose, StatCompletion, StatRequest, StatWorker},
};

/// Glue between host events, configuration, the stat worker and the widget.
///
/// All state lives on the event-loop thread; only stat calls run elsewhere.
pub struct Orchestrator<H: Host> {
    host: H,
    config: ConfigStore,
    widget: DualSidedWidget<H::Item>,
    worker: StatWorker,
    active: ActiveResource,
    next_ticket: u64,
    /// Ticket of the summary stat whose result may still be shown.
    latest_summary: Option<u64>,
}

impl<H: Host> Orchestrator<H> {
    pub fn new(mut host: H, config: ConfigStore, worker: StatWorker) -> Self {
        let alignment = config.current().status_bar_alignment;
        let widget = DualSidedWidget::create(&mut host, alignment);
        info!("Status bar entry created on the {alignment:?} side");

        let mut orchestrator = Self {
            host,
            config,
            widget,
            worker,
            active: ActiveResource::None,
            next_ticket: 0,
            latest_summary: None,
        };
        orchestrator.refresh();
        orchestrator
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn widget(&self) -> &DualSidedWidget<H::Item> {
        &self.widget
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn active(&self) -> &ActiveResource {
        &self.active
    }

    /// Apply one host event. `Break` means the host asked to shut down.
    pub fn handle(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::ActiveEditorChanged(resource) => {
                self.active = resource;
                self.refresh();
            }
            Event::DocumentSaved(path) => {
                if self.active.as_file() == Some(path.as_path()) {
                    self.refresh();
                }
            }
            Event::ConfigurationChanged(section) => self.configuration_changed(&section),
            Event::ViewDetails => self.view_details(),
            Event::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    /// Re-stat the active file for the status bar, or hide it if there is none.
    pub fn refresh(&mut self) {
        let path = match self.active.resolve() {
            Ok(path) => path,
            Err(reason) => {
                debug!("Hiding status bar: {reason}");
                self.latest_summary = None;
                self.widget.hide();
                return;
            }
        };

        self.latest_summary = self.issue(Purpose::Summary, path);
        if self.latest_summary.is_none() {
            self.widget.hide();
        }
    }

    /// Apply a finished stat.
    pub fn complete(&mut self, completion: StatCompletion) {
        match completion.purpose {
            Purpose::Summary => self.apply_summary(completion),
            Purpose::Details => self.present_details(completion),
        }
    }

    /// Apply every completion that is already available.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.worker.completions().try_recv() {
            self.complete(completion);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for one completion and apply it.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> bool {
        match self.worker.completions().recv_timeout(timeout) {
            Ok(completion) => {
                self.complete(completion);
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                error!("Stat worker stopped unexpectedly");
                false
            }
        }
    }

    /// Serve host events and stat completions until shutdown, then release
    /// the status bar entries and hand the host back.
    pub fn run(mut self, events: Receiver<Event>) -> H {
        let completions = self.worker.completions().clone();

        loop {
            select! {
                recv(events) -> msg => match msg {
                    Ok(event) => {
                        if self.handle(event).is_break() {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                    Err(_) => {
                        debug!("Event channel closed");
                        break;
                    }
                },
                recv(completions) -> msg => match msg {
                    Ok(completion) => self.complete(completion),
                    Err(_) => {
                        error!("Stat worker stopped unexpectedly");
                        break;
                    }
                },
            }
        }

        self.widget.dispose();
        self.host
    }

    fn configuration_changed(&mut self, section: &str) {
        if !self.config.notify_changed(section) {
            return;
        }

        // Content is left alone; the next file event picks up the rest.
        let alignment = self.config.current().status_bar_alignment;
        self.widget.set_alignment(alignment);
    }

    fn view_details(&mut self) {
        match self.active.resolve() {
            Ok(path) => {
                if self.issue(Purpose::Details, path).is_none() {
                    self.report_error("Cannot view details: stat worker is not running");
                }
            }
            Err(reason) => self.report_error(&reason.to_string()),
        }
    }

    fn issue(&mut self, purpose: Purpose, path: PathBuf) -> Option<u64> {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let request = StatRequest {
            ticket,
            purpose,
            path,
        };
        if self.worker.submit(request) {
            Some(ticket)
        } else {
            error!("Stat worker is gone; dropped {purpose:?} request #{ticket}");
            None
        }
    }

    fn is_current(&self, ticket: u64, path: &Path) -> bool {
        self.latest_summary == Some(ticket) && self.active.as_file() == Some(path)
    }

    fn apply_summary(&mut self, completion: StatCompletion) {
        if !self.is_current(completion.ticket, &completion.path) {
            debug!(
                "Discarding stale stat #{} for {}",
                completion.ticket,
                completion.path.display()
            );
            return;
        }
        self.latest_summary = None;

        let snapshot = match completion.result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("Hiding status bar: stat {} failed: {e}", completion.path.display());
                self.widget.hide();
                return;
            }
        };

        match summary_text(&snapshot, &self.config.current()) {
            Some(text) => {
                self.widget.set_text(&text);
                self.widget.set_tooltip(STATUS_BAR_TOOLTIP);
                self.widget.set_command(VIEW_DETAILS_COMMAND);
                self.widget.show();
            }
            None => {
                debug!("Hiding status bar: every field is disabled");
                self.widget.hide();
            }
        }
    }

    fn present_details(&mut self, completion: StatCompletion) {
        match completion.result {
            Ok(snapshot) => {
                let report = Report::from_snapshot(&snapshot, &self.config.current());
                self.host.show_report(&report);
            }
            Err(e) => self.report_error(&format!(
                "Failed to read properties of {}: {e}",
                completion.path.display()
            )),
        }
    }

    fn report_error(&mut self, message: &str) {
        warn!("{message}");
        self.host.append_output(message);
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

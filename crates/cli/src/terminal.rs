//! A [`Host`] that renders the status bar as lines on a terminal.

use std::{cell::RefCell, io::Write, rc::Rc};

use fprop_engine::{Host, Report, ReportFormat, StatusBarItem};
use fprop_runtime::Alignment;
use log::warn;

const HIDDEN: &str = "(status bar hidden)";

#[derive(Debug, Default, Clone)]
struct Entry {
    alignment: Option<Alignment>,
    text: String,
    visible: bool,
    disposed: bool,
}

/// Everything the terminal shows. Entries only write through when the
/// composed status line actually changes.
struct Screen<W: Write> {
    out: W,
    entries: Vec<Entry>,
    last_line: Option<String>,
}

impl<W: Write> Screen<W> {
    fn status_line(&self) -> String {
        let shown: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.visible && !e.disposed)
            .map(|e| match e.alignment {
                Some(Alignment::Left) => format!("{} <", e.text),
                Some(Alignment::Right) | None => format!("> {}", e.text),
            })
            .collect();

        if shown.is_empty() {
            HIDDEN.to_owned()
        } else {
            shown.join("  ")
        }
    }

    fn redraw(&mut self) {
        let line = self.status_line();
        if self.last_line.as_deref() == Some(line.as_str()) {
            return;
        }

        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!("Failed to draw status line: {e}");
        }
        self.last_line = Some(line);
    }

    fn write_block(&mut self, block: &str) {
        let result = self
            .out
            .write_all(block.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!("Failed to write report: {e}");
        }
    }
}

pub struct TerminalItem<W: Write> {
    index: usize,
    screen: Rc<RefCell<Screen<W>>>,
}

impl<W: Write> TerminalItem<W> {
    fn update(&mut self, f: impl FnOnce(&mut Entry)) {
        let mut screen = self.screen.borrow_mut();
        f(&mut screen.entries[self.index]);
        screen.redraw();
    }
}

impl<W: Write> StatusBarItem for TerminalItem<W> {
    fn set_text(&mut self, text: &str) {
        self.update(|e| e.text = text.to_owned());
    }

    // A terminal has nowhere to hover or click.
    fn set_tooltip(&mut self, _tooltip: &str) {}

    fn set_command(&mut self, _command: &str) {}

    fn show(&mut self) {
        self.update(|e| e.visible = true);
    }

    fn hide(&mut self) {
        self.update(|e| e.visible = false);
    }

    fn dispose(&mut self) {
        self.update(|e| {
            e.visible = false;
            e.disposed = true;
        });
    }
}

/// Status line and reports go to `out`, diagnostics to `diag`.
pub struct TerminalHost<W: Write, E: Write> {
    screen: Rc<RefCell<Screen<W>>>,
    diag: E,
    report_format: ReportFormat,
}

impl<W: Write, E: Write> TerminalHost<W, E> {
    pub fn new(out: W, diag: E, report_format: ReportFormat) -> Self {
        Self {
            screen: Rc::new(RefCell::new(Screen {
                out,
                entries: Vec::new(),
                last_line: None,
            })),
            diag,
            report_format,
        }
    }
}

impl<W: Write, E: Write> Host for TerminalHost<W, E> {
    type Item = TerminalItem<W>;

    fn create_status_bar_item(&mut self, alignment: Alignment, _priority: i32) -> TerminalItem<W> {
        let mut screen = self.screen.borrow_mut();
        screen.entries.push(Entry {
            alignment: Some(alignment),
            ..Entry::default()
        });

        TerminalItem {
            index: screen.entries.len() - 1,
            screen: Rc::clone(&self.screen),
        }
    }

    fn show_report(&mut self, report: &Report) {
        let mut block = report.render(self.report_format);
        if !block.ends_with('\n') {
            block.push('\n');
        }
        self.screen.borrow_mut().write_block(&block);
    }

    fn append_output(&mut self, line: &str) {
        if let Err(e) = writeln!(self.diag, "[file-properties] {line}") {
            warn!("Failed to write diagnostic line: {e}");
        }
    }
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;

use fprop_runtime::Alignment;

use crate::host::{Host, STATUS_BAR_ITEM_PRIORITY, StatusBarItem};

fn slot(alignment: Alignment) -> usize {
    match alignment {
        Alignment::Left => 0,
        Alignment::Right => 1,
    }
}

/// One logical status-bar entry that can move between sides.
///
/// Hosts fix an entry's side at creation, so this owns one entry per side and
/// transplants the displayed content when the alignment changes. At most one
/// of the two entries is visible at any time, and the visible one always
/// shows the last text/tooltip/command set here.
pub struct DualSidedWidget<I: StatusBarItem> {
    items: [I; 2],
    alignment: Alignment,
    visible: bool,
    disposed: bool,
    text: String,
    tooltip: String,
    command: String,
}

impl<I: StatusBarItem> DualSidedWidget<I> {
    /// Wrap two existing entries. Both start hidden.
    pub fn new(left: I, right: I, alignment: Alignment) -> Self {
        let mut widget = Self {
            items: [left, right],
            alignment,
            visible: false,
            disposed: false,
            text: String::new(),
            tooltip: String::new(),
            command: String::new(),
        };
        widget.items.iter_mut().for_each(StatusBarItem::hide);
        widget
    }

    /// Create both entries through `host`.
    pub fn create<H>(host: &mut H, alignment: Alignment) -> Self
    where
        H: Host<Item = I>,
    {
        let left = host.create_status_bar_item(Alignment::Left, -STATUS_BAR_ITEM_PRIORITY);
        let right = host.create_status_bar_item(Alignment::Right, STATUS_BAR_ITEM_PRIORITY);
        Self::new(left, right, alignment)
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        if alignment == self.alignment {
            return;
        }

        let old = slot(self.alignment);
        let new = slot(alignment);
        self.alignment = alignment;

        if self.disposed {
            return;
        }

        let target = &mut self.items[new];
        target.set_text(&self.text);
        target.set_tooltip(&self.tooltip);
        target.set_command(&self.command);

        // Hide before show: the two entries are never visible together.
        self.items[old].hide();
        if self.visible {
            self.items[new].show();
        }
    }

    pub fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
        if !self.disposed {
            self.current_mut().set_text(text);
        }
    }

    pub fn set_tooltip(&mut self, tooltip: &str) {
        tooltip.clone_into(&mut self.tooltip);
        if !self.disposed {
            self.current_mut().set_tooltip(tooltip);
        }
    }

    pub fn set_command(&mut self, command: &str) {
        command.clone_into(&mut self.command);
        if !self.disposed {
            self.current_mut().set_command(command);
        }
    }

    /// Show the current entry. The other one is hidden first in case
    /// anything outside this widget made it visible.
    pub fn show(&mut self) {
        if self.disposed {
            return;
        }

        let current = slot(self.alignment);
        self.items[1 - current].hide();
        self.items[current].show();
        self.visible = true;
    }

    pub fn hide(&mut self) {
        if self.disposed {
            return;
        }

        self.items.iter_mut().for_each(StatusBarItem::hide);
        self.visible = false;
    }

    /// Release both entries. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.items.iter_mut().for_each(StatusBarItem::dispose);
        self.disposed = true;
        self.visible = false;
    }

    fn current_mut(&mut self) -> &mut I {
        &mut self.items[slot(self.alignment)]
    }
}

impl<I: StatusBarItem> Drop for DualSidedWidget<I> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

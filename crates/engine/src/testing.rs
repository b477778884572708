//! Recording host doubles shared by the engine's unit tests.

use std::{cell::RefCell, rc::Rc};

use fprop_runtime::Alignment;

use crate::host::{Host, StatusBarItem};
use crate::report::Report;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemState {
    pub alignment: Alignment,
    pub priority: i32,
    pub text: String,
    pub tooltip: String,
    pub command: String,
    pub visible: bool,
    pub dispose_calls: u32,
}

/// Visibility of every entry created by one host, plus the worst case seen.
#[derive(Debug, Default)]
pub struct Board {
    pub items: Vec<ItemState>,
    pub max_visible: usize,
}

impl Board {
    fn visible_count(&self) -> usize {
        self.items.iter().filter(|s| s.visible).count()
    }
}

pub struct FakeItem {
    index: usize,
    board: Rc<RefCell<Board>>,
}

impl FakeItem {
    fn update(&mut self, f: impl FnOnce(&mut ItemState)) {
        let mut board = self.board.borrow_mut();
        f(&mut board.items[self.index]);
        let visible = board.visible_count();
        board.max_visible = board.max_visible.max(visible);
    }
}

impl StatusBarItem for FakeItem {
    fn set_text(&mut self, text: &str) {
        self.update(|s| s.text = text.to_owned());
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.update(|s| s.tooltip = tooltip.to_owned());
    }

    fn set_command(&mut self, command: &str) {
        self.update(|s| s.command = command.to_owned());
    }

    fn show(&mut self) {
        self.update(|s| s.visible = true);
    }

    fn hide(&mut self) {
        self.update(|s| s.visible = false);
    }

    fn dispose(&mut self) {
        self.update(|s| {
            s.visible = false;
            s.dispose_calls += 1;
        });
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub board: Rc<RefCell<Board>>,
    pub reports: Vec<Report>,
    pub output: Vec<String>,
}

impl FakeHost {
    pub fn item(&self, alignment: Alignment) -> ItemState {
        self.board
            .borrow()
            .items
            .iter()
            .find(|s| s.alignment == alignment)
            .cloned()
            .expect("item for alignment")
    }

    pub fn visible_items(&self) -> Vec<ItemState> {
        self.board
            .borrow()
            .items
            .iter()
            .filter(|s| s.visible)
            .cloned()
            .collect()
    }

    /// Flip an entry visible behind the widget's back.
    pub fn force_visible(&self, alignment: Alignment) {
        let mut board = self.board.borrow_mut();
        board
            .items
            .iter_mut()
            .filter(|s| s.alignment == alignment)
            .for_each(|s| s.visible = true);
    }

    pub fn max_visible(&self) -> usize {
        self.board.borrow().max_visible
    }
}

impl Host for FakeHost {
    type Item = FakeItem;

    fn create_status_bar_item(&mut self, alignment: Alignment, priority: i32) -> FakeItem {
        let mut board = self.board.borrow_mut();
        board.items.push(ItemState {
            alignment,
            priority,
            text: String::new(),
            tooltip: String::new(),
            command: String::new(),
            visible: false,
            dispose_calls: 0,
        });

        FakeItem {
            index: board.items.len() - 1,
            board: Rc::clone(&self.board),
        }
    }

    fn show_report(&mut self, report: &Report) {
        self.reports.push(report.clone());
    }

    fn append_output(&mut self, line: &str) {
        self.output.push(line.to_owned());
    }
}

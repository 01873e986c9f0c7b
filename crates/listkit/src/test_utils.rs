//! Fixtures for tests of this crate and of crates built on it (enable the
//! `test_utils` feature).

use crate::filter::{FilterKey, Filterable, Matcher};
use crate::observer::ListObserver;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Read side of a [`RecordingObserver`].
#[derive(Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<String>>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// Records every callback as a short line such as `"added a@0"`,
/// `"state a@0 0->1"` or `"redraw"`.
pub struct RecordingObserver {
    log: EventLog,
}

impl RecordingObserver {
    pub fn new() -> (Self, EventLog) {
        let log = EventLog::default();
        (Self { log: log.clone() }, log)
    }

    fn push(&self, event: String) {
        self.log.events.borrow_mut().push(event);
    }
}

impl<T: fmt::Display> ListObserver<T> for RecordingObserver {
    fn on_item_added(&mut self, item: &T, index: usize) {
        self.push(format!("added {}@{}", item, index));
    }

    fn on_item_removed(&mut self, item: &T, index: usize) {
        self.push(format!("removed {}@{}", item, index));
    }

    fn on_item_replaced(&mut self, previous: &T, item: &T, index: usize) {
        self.push(format!("replaced {}->{}@{}", previous, item, index));
    }

    fn on_item_enabled(&mut self, item: &T, index: usize) {
        self.push(format!("enabled {}@{}", item, index));
    }

    fn on_item_disabled(&mut self, item: &T, index: usize) {
        self.push(format!("disabled {}@{}", item, index));
    }

    fn on_state_changed(&mut self, item: &T, index: usize, previous: usize, state: usize) {
        self.push(format!("state {}@{} {}->{}", item, index, previous, state));
    }

    fn on_item_selected(&mut self, item: &T, index: usize) {
        self.push(format!("selected {}@{}", item, index));
    }

    fn on_item_unselected(&mut self, item: &T, index: usize) {
        self.push(format!("unselected {}@{}", item, index));
    }

    fn on_filter_applied(
        &mut self,
        filter: &FilterKey,
        _matcher: Option<&Matcher<T>>,
        visible: &[usize],
        previous: &[usize],
    ) {
        self.push(format!(
            "filter applied {} {:?} -> {:?}",
            filter, previous, visible
        ));
    }

    fn on_filter_reset(&mut self, filter: &FilterKey, visible: &[usize], previous: &[usize]) {
        self.push(format!("filter reset {} {:?} -> {:?}", filter, previous, visible));
    }

    fn on_redraw(&mut self) {
        self.push("redraw".to_string());
    }
}

/// [`Fruit`] filter flag: match the color instead of the name.
pub const FLAG_BY_COLOR: u32 = 1;

/// Filterable sample data. Queries match case-insensitively on the name, or
/// on the color with [`FLAG_BY_COLOR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fruit {
    pub name: String,
    pub color: String,
}

impl Fruit {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
        }
    }

    pub fn basket() -> Vec<Fruit> {
        vec![
            Fruit::new("Apple", "red"),
            Fruit::new("Banana", "yellow"),
            Fruit::new("Cherry", "red"),
            Fruit::new("Lemon", "yellow"),
            Fruit::new("Lime", "green"),
        ]
    }
}

impl fmt::Display for Fruit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Filterable for Fruit {
    fn matches(&self, query: &str, flags: u32) -> bool {
        let field = if flags & FLAG_BY_COLOR != 0 {
            &self.color
        } else {
            &self.name
        };
        field.to_lowercase().contains(&query.to_lowercase())
    }
}

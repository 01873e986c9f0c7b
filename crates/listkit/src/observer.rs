//! # Change Notifications
//!
//! Every layer reports its transitions through [`ListObserver`]. All methods
//! default to no-ops so an observer only implements what it cares about.
//!
//! Callbacks run synchronously inside the mutating call, in registration
//! order. Cross-layer reconciliation (for example the selection layer
//! reacting to a disabled item) happens inside the same call, so an observer
//! sees the cascade as a sequence of callbacks followed by a single
//! [`ListObserver::on_redraw`] when `notify_on_change` is set.
//!
//! Indices passed to callbacks are master indices. Visible subsets are
//! ascending lists of master indices.

use crate::filter::{FilterKey, Matcher};

pub trait ListObserver<T> {
    fn on_item_added(&mut self, _item: &T, _index: usize) {}

    fn on_item_removed(&mut self, _item: &T, _index: usize) {}

    fn on_item_replaced(&mut self, _previous: &T, _item: &T, _index: usize) {}

    fn on_item_enabled(&mut self, _item: &T, _index: usize) {}

    fn on_item_disabled(&mut self, _item: &T, _index: usize) {}

    fn on_state_changed(&mut self, _item: &T, _index: usize, _previous: usize, _state: usize) {}

    fn on_item_selected(&mut self, _item: &T, _index: usize) {}

    fn on_item_unselected(&mut self, _item: &T, _index: usize) {}

    /// `matcher` is `Some` when the caller supplied one for this filter.
    fn on_filter_applied(
        &mut self,
        _filter: &FilterKey,
        _matcher: Option<&Matcher<T>>,
        _visible: &[usize],
        _previous: &[usize],
    ) {
    }

    fn on_filter_reset(&mut self, _filter: &FilterKey, _visible: &[usize], _previous: &[usize]) {}

    /// The whole list should be redrawn. Fired once at the end of a mutating
    /// call, never per item.
    fn on_redraw(&mut self) {}
}

/// Handle returned by `add_observer`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub(crate) struct Observers<T> {
    next_id: u64,
    entries: Vec<(ObserverId, Box<dyn ListObserver<T>>)>,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Observers<T> {
    pub(crate) fn add(&mut self, observer: Box<dyn ListObserver<T>>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut dyn ListObserver<T>),
    {
        for (_, observer) in self.entries.iter_mut() {
            f(observer.as_mut());
        }
    }
}

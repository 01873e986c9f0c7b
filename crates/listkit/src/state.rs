//! Item state layer.
//!
//! Each item carries a state in `0..number_of_states`. Triggering advances it
//! and wraps back to 0 past the maximum. Disabled items keep their state:
//! changes on them are rejected as no-ops.
//!
//! Shrinking `number_of_states` does not rewrite stored states. Reads clamp
//! them to `number_of_states - 1`, so growing the count again restores the
//! original values of items nobody touched in between.

use crate::collection::ListModel;
use crate::error::{check_index, ListError, Result};

impl<T> ListModel<T> {
    pub fn number_of_states(&self) -> usize {
        self.number_of_states
    }

    pub fn set_number_of_states(&mut self, number_of_states: usize) -> Result<()> {
        if number_of_states == 0 {
            return Err(ListError::InvalidArgument(
                "number of states must be at least 1".to_string(),
            ));
        }
        if self.number_of_states != number_of_states {
            tracing::debug!(number_of_states, "Number of states changed");
            self.number_of_states = number_of_states;
            self.redraw();
        }
        Ok(())
    }

    pub fn state(&self, index: usize) -> Result<usize> {
        Ok(self.item(index)?.clamped_state(self.number_of_states))
    }

    /// Current state of every item, in master order.
    pub fn states(&self) -> Vec<usize> {
        self.items
            .iter()
            .map(|item| item.clamped_state(self.number_of_states))
            .collect()
    }

    /// Returns `Ok(false)` when the item is disabled or already in `state`.
    pub fn set_state(&mut self, index: usize, state: usize) -> Result<bool> {
        check_index(index, self.items.len())?;
        self.check_state(state)?;

        let changed = self.apply_state(index, state);
        if changed {
            self.redraw();
        }
        Ok(changed)
    }

    /// Advances the state, wrapping to 0. Returns the previous state, or
    /// `None` if the item is disabled.
    pub fn trigger_state(&mut self, index: usize) -> Result<Option<usize>> {
        check_index(index, self.items.len())?;
        if !self.items[index].is_enabled() {
            tracing::debug!(index, "State of disabled item not triggered");
            return Ok(None);
        }

        let previous = self.items[index].clamped_state(self.number_of_states);
        let next = (previous + 1) % self.number_of_states;
        if self.apply_state(index, next) {
            self.redraw();
        }
        Ok(Some(previous))
    }

    /// Sets `state` on every enabled item. Returns whether any changed.
    pub fn set_all_states(&mut self, state: usize) -> Result<bool> {
        self.check_state(state)?;

        let mut changed = false;
        for index in 0..self.items.len() {
            changed |= self.apply_state(index, state);
        }
        if changed {
            self.redraw();
        }
        Ok(changed)
    }

    /// Triggers every enabled item. Returns whether any changed.
    pub fn trigger_all_states(&mut self) -> bool {
        let mut changed = false;
        for index in 0..self.items.len() {
            let next = (self.items[index].clamped_state(self.number_of_states) + 1)
                % self.number_of_states;
            changed |= self.apply_state(index, next);
        }
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn first_index_with_state(&self, state: usize) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.clamped_state(self.number_of_states) == state)
    }

    pub fn last_index_with_state(&self, state: usize) -> Option<usize> {
        self.items
            .iter()
            .rposition(|item| item.clamped_state(self.number_of_states) == state)
    }

    pub fn count_with_state(&self, state: usize) -> usize {
        self.items
            .iter()
            .filter(|item| item.clamped_state(self.number_of_states) == state)
            .count()
    }

    pub(crate) fn check_state(&self, state: usize) -> Result<()> {
        if state >= self.number_of_states {
            return Err(ListError::InvalidArgument(format!(
                "state {} out of range for {} states",
                state, self.number_of_states
            )));
        }
        Ok(())
    }

    /// Sets the state without a redraw. The index and state must be valid.
    pub(crate) fn apply_state(&mut self, index: usize, state: usize) -> bool {
        let item = &self.items[index];
        if !item.is_enabled() {
            tracing::debug!(index, "State of disabled item not changed");
            return false;
        }
        let previous = item.clamped_state(self.number_of_states);
        if previous == state && item.raw_state() == state {
            return false;
        }

        self.items[index].set_state(state);
        tracing::trace!(index, previous, state, "State changed");
        if previous != state {
            let items = &self.items;
            self.observers
                .notify(|o| o.on_state_changed(items[index].data(), index, previous, state));
        }
        previous != state
    }
}

impl<T: PartialEq> ListModel<T> {
    pub fn item_state(&self, data: &T) -> Result<usize> {
        self.state(self.require(data)?)
    }

    pub fn set_item_state(&mut self, data: &T, state: usize) -> Result<bool> {
        let index = self.require(data)?;
        self.set_state(index, state)
    }
}

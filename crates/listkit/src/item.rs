//! # Items
//!
//! An [`Item`] wraps one piece of caller data with the three per-item
//! dimensions the engine tracks: enablement, a bounded cyclic state, and
//! selection.
//!
//! Items never enforce cross-item rules themselves. "At most one selected"
//! (single choice) and "disabled items are never selected" are owned by the
//! collection's layers, which is why the mutators here are crate-private.
//!
//! ## Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `enabled` | `true` |
//! | `state` | `0` |
//! | `selected` | `false` |
//!
//! The builder methods (`with_enabled`, `with_state`, `with_selected`) let a
//! caller preset them; the collection validates and reconciles presets when
//! the item is inserted (see [`crate::collection::ListModel::insert_item`]).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<T> {
    data: T,
    enabled: bool,
    state: usize,
    selected: bool,
}

impl<T> Item<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            enabled: true,
            state: 0,
            selected: false,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_state(mut self, state: usize) -> Self {
        self.state = state;
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The raw stored state. Layers read it through
    /// [`Item::clamped_state`] because shrinking the number of states does
    /// not rewrite stored values.
    pub fn raw_state(&self) -> usize {
        self.state
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub(crate) fn clamped_state(&self, number_of_states: usize) -> usize {
        self.state.min(number_of_states.saturating_sub(1))
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_state(&mut self, state: usize) {
        self.state = state;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn flags(&self, number_of_states: usize) -> ItemFlags {
        ItemFlags {
            enabled: self.enabled,
            state: self.clamped_state(number_of_states),
            selected: self.selected,
        }
    }
}

/// The per-item state without the data, as exposed across the persistence
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFlags {
    pub enabled: bool,
    pub state: usize,
    pub selected: bool,
}

impl Default for ItemFlags {
    fn default() -> Self {
        Self {
            enabled: true,
            state: 0,
            selected: false,
        }
    }
}

//! Click hooks for an external dispatcher.
//!
//! The dispatcher reports the visible position that was clicked; the model's
//! policy flags decide what the click does:
//!
//! | Flag | Single choice | Multiple choice |
//! |------|---------------|-----------------|
//! | `trigger_selection_on_click` | select the row | toggle the row |
//! | `trigger_state_on_click` | advance the state | advance the state |
//!
//! Clicks on disabled rows change nothing.

use crate::collection::ListModel;
use crate::error::Result;
use crate::selection::ChoiceMode;

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Master index of the clicked row.
    pub index: usize,
    pub selection_changed: bool,
    /// The state before the click, when the click advanced it.
    pub previous_state: Option<usize>,
    /// The new expansion of a clicked group, when the click toggled it.
    pub expanded: Option<bool>,
}

impl ClickOutcome {
    pub fn changed(&self) -> bool {
        self.selection_changed || self.previous_state.is_some() || self.expanded.is_some()
    }
}

impl<T> ListModel<T> {
    pub fn triggers_selection_on_click(&self) -> bool {
        self.trigger_selection_on_click
    }

    pub fn set_trigger_selection_on_click(&mut self, trigger: bool) {
        self.trigger_selection_on_click = trigger;
    }

    pub fn triggers_state_on_click(&self) -> bool {
        self.trigger_state_on_click
    }

    pub fn set_trigger_state_on_click(&mut self, trigger: bool) {
        self.trigger_state_on_click = trigger;
    }

    pub fn on_item_clicked(&mut self, position: usize) -> Result<ClickOutcome> {
        let index = self.master_index(position)?;
        let outcome = self.click_at(index);
        if outcome.changed() {
            self.redraw();
        }
        Ok(outcome)
    }

    /// Applies the click policies to a master index without a redraw.
    pub(crate) fn click_at(&mut self, index: usize) -> ClickOutcome {
        let mut outcome = ClickOutcome {
            index,
            selection_changed: false,
            previous_state: None,
            expanded: None,
        };
        if !self.items[index].is_enabled() {
            tracing::debug!(index, "Click on disabled item ignored");
            return outcome;
        }

        if self.trigger_selection_on_click {
            outcome.selection_changed = match self.choice_mode {
                ChoiceMode::None => false,
                ChoiceMode::Single => self.select_single(index),
                ChoiceMode::Multiple if self.items[index].is_selected() => self.unselect(index),
                ChoiceMode::Multiple => self.select_additional(index),
            };
        }
        if self.trigger_state_on_click {
            let previous = self.items[index].clamped_state(self.number_of_states);
            let next = (previous + 1) % self.number_of_states;
            if self.apply_state(index, next) {
                outcome.previous_state = Some(previous);
            }
        }
        tracing::trace!(index, ?outcome, "Item clicked");
        outcome
    }
}

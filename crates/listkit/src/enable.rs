//! Enable/disable layer.
//!
//! This layer only records and reports the transition. What a disabled item
//! means for the selection is decided by the selection layer, which is run
//! from here as part of the same call.

use crate::collection::ListModel;
use crate::error::{check_index, Result};
use crate::item::Item;

impl<T> ListModel<T> {
    pub fn is_enabled(&self, index: usize) -> Result<bool> {
        Ok(self.item(index)?.is_enabled())
    }

    /// Returns whether the flag changed.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<bool> {
        check_index(index, self.items.len())?;
        let changed = self.apply_enabled(index, enabled);
        if changed {
            self.redraw();
        } else {
            tracing::debug!(index, enabled, "Enable state unchanged");
        }
        Ok(changed)
    }

    /// Flips the flag and returns the resulting value.
    pub fn trigger_enabled(&mut self, index: usize) -> Result<bool> {
        let enabled = !self.is_enabled(index)?;
        self.set_enabled(index, enabled)?;
        Ok(enabled)
    }

    /// Returns whether any item changed. The selection is reconciled once,
    /// after every flag is set.
    pub fn set_all_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.apply_all_enabled(|_| enabled);
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn trigger_all_enabled(&mut self) {
        if self.apply_all_enabled(|enabled| !enabled) {
            self.redraw();
        }
    }

    pub fn first_enabled_index(&self) -> Option<usize> {
        self.items.iter().position(Item::is_enabled)
    }

    pub fn last_enabled_index(&self) -> Option<usize> {
        self.items.iter().rposition(Item::is_enabled)
    }

    pub fn first_disabled_index(&self) -> Option<usize> {
        self.items.iter().position(|item| !item.is_enabled())
    }

    pub fn last_disabled_index(&self) -> Option<usize> {
        self.items.iter().rposition(|item| !item.is_enabled())
    }

    pub fn enabled_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_enabled()).count()
    }

    pub fn disabled_count(&self) -> usize {
        self.items.len() - self.enabled_count()
    }

    pub fn enabled_items(&self) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| item.is_enabled())
            .map(Item::data)
            .collect()
    }

    /// Sets the flag without a redraw. The index must be valid.
    pub(crate) fn apply_enabled(&mut self, index: usize, enabled: bool) -> bool {
        if !self.write_enabled(index, enabled) {
            return false;
        }
        self.on_enabled_changed(index, enabled);
        true
    }

    /// Sets every flag to `target(current)`, then reconciles the selection
    /// once. Disabled items lose their selection as they go.
    fn apply_all_enabled(&mut self, target: impl Fn(bool) -> bool) -> bool {
        let mut changed = false;
        let mut vacated = None;
        for index in 0..self.items.len() {
            let enabled = target(self.items[index].is_enabled());
            if self.write_enabled(index, enabled) {
                changed = true;
                if !enabled && self.unselect(index) {
                    vacated.get_or_insert(index);
                }
            }
        }
        if changed {
            self.on_bulk_enabled_changed(vacated);
        }
        changed
    }

    fn write_enabled(&mut self, index: usize, enabled: bool) -> bool {
        if self.items[index].is_enabled() == enabled {
            return false;
        }
        self.items[index].set_enabled(enabled);
        tracing::trace!(index, enabled, "Enable state changed");

        let items = &self.items;
        if enabled {
            self.observers
                .notify(|o| o.on_item_enabled(items[index].data(), index));
        } else {
            self.observers
                .notify(|o| o.on_item_disabled(items[index].data(), index));
        }
        true
    }
}

impl<T: PartialEq> ListModel<T> {
    pub fn is_item_enabled(&self, data: &T) -> Result<bool> {
        self.is_enabled(self.require(data)?)
    }

    pub fn set_item_enabled(&mut self, data: &T, enabled: bool) -> Result<bool> {
        let index = self.require(data)?;
        self.set_enabled(index, enabled)
    }
}

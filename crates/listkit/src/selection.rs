//! # Selection
//!
//! Selection is a third independent flag per item, constrained by the
//! [`ChoiceMode`]:
//!
//! - **None**: nothing can be selected; selecting is an `IllegalState`.
//! - **Single**: at most one item in the whole collection is selected.
//!   Selecting an item unselects every other one first.
//! - **Multiple**: any subset of enabled items may be selected.
//!
//! In every mode a disabled item is never selected: selecting it is rejected
//! and disabling a selected item clears its selection.
//!
//! ## Auto-Adaptation (single choice)
//!
//! With `adapt_selection_automatically`, single choice keeps a selection
//! alive whenever an enabled, visible item exists:
//!
//! | Event | Reaction |
//! |-------|----------|
//! | item added, nothing visible selected | select the first enabled visible item |
//! | selected item disabled | nearest-enabled search from its index |
//! | selected item removed | nearest-enabled search from the vacated index |
//! | filter applied or reset, nothing visible selected | select the first enabled visible item |
//!
//! The nearest-enabled search alternates one step up and one step down from
//! the vacated index (`i+1, i-1, i+2, i-2, ...`) and selects the first
//! enabled visible item it meets.
//!
//! Triggering the selected item is the one asymmetric case: it clears the
//! selection instead of being a no-op, and auto-adaptation does not undo it.

use crate::collection::ListModel;
use crate::error::{check_index, ListError, Result};
use crate::item::Item;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceMode {
    #[default]
    None,
    Single,
    Multiple,
}

impl<T> ListModel<T> {
    pub fn choice_mode(&self) -> ChoiceMode {
        self.choice_mode
    }

    /// Switching to single keeps only the first selected item; switching to
    /// none clears the selection.
    pub fn set_choice_mode(&mut self, mode: ChoiceMode) {
        if self.choice_mode == mode {
            return;
        }
        tracing::debug!(?mode, "Choice mode changed");
        self.choice_mode = mode;

        match mode {
            ChoiceMode::None => {
                for index in 0..self.items.len() {
                    self.unselect(index);
                }
            }
            ChoiceMode::Single => {
                if let Some(first) = self.selected_index() {
                    for index in first + 1..self.items.len() {
                        self.unselect(index);
                    }
                }
            }
            ChoiceMode::Multiple => {}
        }
        self.reconcile_single_selection();
        self.redraw();
    }

    pub fn is_adapting_selection_automatically(&self) -> bool {
        self.adapt_selection_automatically
    }

    /// Turning adaptation on applies it right away.
    pub fn set_adapt_selection_automatically(&mut self, adapt: bool) {
        if self.adapt_selection_automatically == adapt {
            return;
        }
        self.adapt_selection_automatically = adapt;
        if self.reconcile_single_selection() {
            self.redraw();
        }
    }

    pub fn is_selected(&self, index: usize) -> Result<bool> {
        Ok(self.item(index)?.is_selected())
    }

    /// The selected index in single choice; the first one otherwise.
    pub fn selected_index(&self) -> Option<usize> {
        self.first_selected_index()
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.selected_index().map(|index| self.items[index].data())
    }

    /// Ascending master indices of the selected items.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_selected())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn selected_items(&self) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| item.is_selected())
            .map(Item::data)
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_selected()).count()
    }

    pub fn first_selected_index(&self) -> Option<usize> {
        self.items.iter().position(Item::is_selected)
    }

    pub fn last_selected_index(&self) -> Option<usize> {
        self.items.iter().rposition(Item::is_selected)
    }

    pub fn first_unselected_index(&self) -> Option<usize> {
        self.items.iter().position(|item| !item.is_selected())
    }

    pub fn last_unselected_index(&self) -> Option<usize> {
        self.items.iter().rposition(|item| !item.is_selected())
    }

    /// Single choice: selects `index`, unselecting any other item. Returns
    /// `Ok(false)` if the item is disabled or already selected.
    pub fn select(&mut self, index: usize) -> Result<bool> {
        check_index(index, self.items.len())?;
        self.require_mode(ChoiceMode::Single, "select")?;

        let changed = self.select_single(index);
        if changed {
            self.redraw();
        }
        Ok(changed)
    }

    /// Multiple choice: sets the selection flag of `index`. Selecting a
    /// disabled item is rejected with `Ok(false)`.
    pub fn set_selected(&mut self, index: usize, selected: bool) -> Result<bool> {
        check_index(index, self.items.len())?;
        self.require_mode(ChoiceMode::Multiple, "set_selected")?;

        let changed = if selected {
            self.select_additional(index)
        } else {
            self.unselect(index)
        };
        if changed {
            self.redraw();
        }
        Ok(changed)
    }

    /// Selects an unselected item or unselects a selected one. Returns
    /// whether the selection changed.
    pub fn trigger_selection(&mut self, index: usize) -> Result<bool> {
        check_index(index, self.items.len())?;
        let changed = match self.choice_mode {
            ChoiceMode::None => {
                return Err(ListError::IllegalState(
                    "trigger_selection requires a choice mode".to_string(),
                ))
            }
            _ if self.items[index].is_selected() => self.unselect(index),
            ChoiceMode::Single => self.select_single(index),
            ChoiceMode::Multiple => self.select_additional(index),
        };
        if changed {
            self.redraw();
        }
        Ok(changed)
    }

    /// Multiple choice: selects every enabled item, or unselects all.
    pub fn set_all_selected(&mut self, selected: bool) -> Result<bool> {
        self.require_mode(ChoiceMode::Multiple, "set_all_selected")?;

        let mut changed = false;
        for index in 0..self.items.len() {
            changed |= if selected {
                self.select_additional(index)
            } else {
                self.unselect(index)
            };
        }
        if changed {
            self.redraw();
        }
        Ok(changed)
    }

    /// Multiple choice: flips every item. Disabled items stay unselected.
    pub fn trigger_all_selections(&mut self) -> Result<bool> {
        self.require_mode(ChoiceMode::Multiple, "trigger_all_selections")?;

        let mut changed = false;
        for index in 0..self.items.len() {
            changed |= if self.items[index].is_selected() {
                self.unselect(index)
            } else {
                self.select_additional(index)
            };
        }
        if changed {
            self.redraw();
        }
        Ok(changed)
    }

    /// Unselects everything, in any mode. Auto-adaptation does not reselect.
    pub fn clear_selection(&mut self) -> bool {
        let mut changed = false;
        for index in 0..self.items.len() {
            changed |= self.unselect(index);
        }
        if changed {
            self.redraw();
        }
        changed
    }

    /// [`ListModel::select`] addressed by visible position.
    pub fn select_visible(&mut self, position: usize) -> Result<bool> {
        let index = self.master_index(position)?;
        self.select(index)
    }

    /// [`ListModel::set_selected`] addressed by visible position. The flag
    /// lives on the master item, so it survives filter resets.
    pub fn set_visible_selected(&mut self, position: usize, selected: bool) -> Result<bool> {
        let index = self.master_index(position)?;
        self.set_selected(index, selected)
    }

    /// An unselectable model drops its selection and can not be selected
    /// again, not even by auto-adaptation. Becoming selectable again
    /// applies auto-adaptation right away.
    pub(crate) fn set_selectable(&mut self, selectable: bool) {
        let regained = selectable && !self.selectable;
        self.selectable = selectable;
        if !selectable {
            self.clear_selection();
        } else if regained && self.reconcile_single_selection() {
            self.redraw();
        }
    }

    fn require_mode(&self, mode: ChoiceMode, operation: &str) -> Result<()> {
        if self.choice_mode != mode {
            return Err(ListError::IllegalState(format!(
                "{} requires {:?} choice mode, current mode is {:?}",
                operation, mode, self.choice_mode
            )));
        }
        Ok(())
    }

    fn notify_selected(&mut self, index: usize) {
        let items = &self.items;
        self.observers
            .notify(|o| o.on_item_selected(items[index].data(), index));
    }

    /// Single-choice selection without a redraw.
    pub(crate) fn select_single(&mut self, index: usize) -> bool {
        let item = &self.items[index];
        if !self.selectable {
            return false;
        }
        if !item.is_enabled() {
            tracing::debug!(index, "Disabled item not selected");
            return false;
        }
        if item.is_selected() {
            tracing::debug!(index, "Item already selected");
            return false;
        }

        for other in 0..self.items.len() {
            if other != index {
                self.unselect(other);
            }
        }
        self.items[index].set_selected(true);
        tracing::trace!(index, "Selected item");
        self.notify_selected(index);
        true
    }

    /// Multiple-choice selection without a redraw.
    pub(crate) fn select_additional(&mut self, index: usize) -> bool {
        let item = &self.items[index];
        if !self.selectable || !item.is_enabled() || item.is_selected() {
            return false;
        }
        self.items[index].set_selected(true);
        tracing::trace!(index, "Selected item");
        self.notify_selected(index);
        true
    }

    pub(crate) fn unselect(&mut self, index: usize) -> bool {
        if !self.items[index].is_selected() {
            return false;
        }
        self.items[index].set_selected(false);
        tracing::trace!(index, "Unselected item");
        let items = &self.items;
        self.observers
            .notify(|o| o.on_item_unselected(items[index].data(), index));
        true
    }

    fn is_selection_candidate(&self, index: usize) -> bool {
        self.items[index].is_enabled() && self.filters.is_visible(index)
    }

    fn adapts_single_selection(&self) -> bool {
        self.choice_mode == ChoiceMode::Single && self.adapt_selection_automatically
    }

    /// Auto-adaptation: if no visible item is selected, select the first
    /// enabled visible one. Returns whether the selection changed.
    pub(crate) fn reconcile_single_selection(&mut self) -> bool {
        if !self.adapts_single_selection() {
            return false;
        }
        let visible = self.filters.visible();
        if visible.iter().any(|&i| self.items[i].is_selected()) {
            return false;
        }
        let candidate = visible
            .iter()
            .copied()
            .find(|&i| self.items[i].is_enabled());
        match candidate {
            Some(index) => self.select_single(index),
            None => false,
        }
    }

    /// Alternates one step up and one step down, starting at `up` and
    /// `down`, and selects the first enabled visible item found.
    fn select_nearest(&mut self, mut up: usize, mut down: Option<usize>) -> bool {
        let len = self.items.len();
        loop {
            let mut scanned = false;
            if up < len {
                scanned = true;
                if self.is_selection_candidate(up) {
                    return self.select_single(up);
                }
                up += 1;
            }
            if let Some(index) = down {
                scanned = true;
                if self.is_selection_candidate(index) {
                    return self.select_single(index);
                }
                down = index.checked_sub(1);
            }
            if !scanned {
                tracing::debug!("No enabled item left to select");
                return false;
            }
        }
    }

    /// Reaction to an enable transition of `index`.
    pub(crate) fn on_enabled_changed(&mut self, index: usize, enabled: bool) {
        if enabled {
            self.reconcile_single_selection();
        } else if self.unselect(index) && self.adapts_single_selection() {
            self.select_nearest(index + 1, index.checked_sub(1));
        }
    }

    /// Reaction to a bulk enable change. `vacated` is the first index whose
    /// selection was cleared by being disabled.
    pub(crate) fn on_bulk_enabled_changed(&mut self, vacated: Option<usize>) {
        if let Some(index) = vacated {
            if self.adapts_single_selection() {
                self.select_nearest(index + 1, index.checked_sub(1));
            }
        }
        self.reconcile_single_selection();
    }

    /// Reaction to the removal of a selected item that was at `index`.
    pub(crate) fn adapt_after_removal(&mut self, index: usize) {
        if self.adapts_single_selection() {
            self.select_nearest(index, index.checked_sub(1));
        }
    }

    /// Reconciles the preset flags of a freshly inserted item.
    pub(crate) fn reconcile_inserted(&mut self, index: usize) {
        if self.items[index].is_selected() {
            self.items[index].set_selected(false);
            match self.choice_mode {
                ChoiceMode::Single => {
                    self.select_single(index);
                }
                ChoiceMode::Multiple => {
                    self.select_additional(index);
                }
                ChoiceMode::None => {}
            }
        }
        self.reconcile_single_selection();
    }
}

impl<T: PartialEq> ListModel<T> {
    pub fn is_item_selected(&self, data: &T) -> Result<bool> {
        self.is_selected(self.require(data)?)
    }

    pub fn select_item(&mut self, data: &T) -> Result<bool> {
        let index = self.require(data)?;
        self.select(index)
    }

    pub fn set_item_selected(&mut self, data: &T, selected: bool) -> Result<bool> {
        let index = self.require(data)?;
        self.set_selected(index, selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingObserver;

    fn single(data: &[&'static str], adapt: bool) -> ListModel<&'static str> {
        let mut model = ListModel::filterable();
        model.set_choice_mode(ChoiceMode::Single);
        model.set_adapt_selection_automatically(adapt);
        model.add_all(data.iter().copied()).unwrap();
        model
    }

    fn multiple(data: &[&'static str]) -> ListModel<&'static str> {
        let mut model = ListModel::filterable();
        model.set_choice_mode(ChoiceMode::Multiple);
        model.add_all(data.iter().copied()).unwrap();
        model
    }

    #[test]
    fn test_single_select_moves_selection() {
        let mut model = single(&["a", "b", "c"], false);
        assert_eq!(model.selected_index(), None);

        assert!(model.select(1).unwrap());
        assert!(model.select(2).unwrap());

        assert_eq!(model.selected_indices(), vec![2]);
        assert_eq!(model.selected_item(), Some(&"c"));
    }

    #[test]
    fn test_single_select_notifies_unselect_before_select() {
        let mut model = single(&["a", "b"], false);
        model.select(0).unwrap();
        let (observer, log) = RecordingObserver::new();
        model.add_observer(Box::new(observer));

        model.select(1).unwrap();

        assert_eq!(log.events(), vec!["unselected a@0", "selected b@1", "redraw"]);
    }

    #[test]
    fn test_selecting_selected_or_disabled_item_is_noop() {
        let mut model = single(&["a", "b"], false);
        model.select(0).unwrap();
        model.set_enabled(1, false).unwrap();

        assert!(!model.select(0).unwrap());
        assert!(!model.select(1).unwrap());
        assert_eq!(model.selected_index(), Some(0));
    }

    #[test]
    fn test_wrong_mode_is_illegal_state() {
        let mut model = single(&["a"], false);
        assert!(matches!(
            model.set_selected(0, true),
            Err(ListError::IllegalState(_))
        ));
        assert!(matches!(
            model.set_all_selected(true),
            Err(ListError::IllegalState(_))
        ));

        let mut model = multiple(&["a"]);
        assert!(matches!(model.select(0), Err(ListError::IllegalState(_))));

        let mut model: ListModel<&str> = ListModel::new();
        model.add("a").unwrap();
        assert!(matches!(
            model.trigger_selection(0),
            Err(ListError::IllegalState(_))
        ));
    }

    #[test]
    fn test_index_errors_win_over_mode_errors() {
        let mut model = multiple(&["a"]);
        assert!(matches!(
            model.select(4),
            Err(ListError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_trigger_selected_item_clears_single_selection() {
        let mut model = single(&["a", "b"], true);
        assert_eq!(model.selected_index(), Some(0));

        assert!(model.trigger_selection(0).unwrap());

        assert_eq!(model.selected_index(), None);
        assert!(model.trigger_selection(1).unwrap());
        assert_eq!(model.selected_index(), Some(1));
    }

    #[test]
    fn test_auto_adapt_selects_first_added_item() {
        let model = single(&["a", "b", "c"], true);
        assert_eq!(model.selected_indices(), vec![0]);
    }

    #[test]
    fn test_auto_adapt_skips_disabled_additions() {
        let mut model = single(&[], true);
        model
            .insert_item(0, Item::new("a").with_enabled(false))
            .unwrap();
        assert_eq!(model.selected_index(), None);

        model.add("b").unwrap();
        assert_eq!(model.selected_index(), Some(1));
    }

    #[test]
    fn test_nearest_search_prefers_ascending_step() {
        let mut model = single(&["0", "1", "2", "3", "4"], true);
        model.set_enabled(1, false).unwrap();
        model.set_enabled(3, false).unwrap();
        model.select(2).unwrap();

        model.set_enabled(2, false).unwrap();

        // 3 disabled, 1 disabled, 4 enabled
        assert_eq!(model.selected_indices(), vec![4]);
    }

    #[test]
    fn test_nearest_search_falls_back_descending() {
        let mut model = single(&["0", "1", "2", "3"], true);
        model.set_enabled(3, false).unwrap();
        model.select(2).unwrap();

        model.set_enabled(2, false).unwrap();

        assert_eq!(model.selected_indices(), vec![1]);
    }

    #[test]
    fn test_nearest_search_without_candidates_leaves_no_selection() {
        let mut model = single(&["0", "1"], true);
        model.set_enabled(1, false).unwrap();

        model.set_enabled(0, false).unwrap();

        assert_eq!(model.selected_index(), None);

        // Enabling an item restores a selection
        model.set_enabled(1, true).unwrap();
        assert_eq!(model.selected_index(), Some(1));
    }

    #[test]
    fn test_disabling_without_adaptation_just_unselects() {
        let mut model = single(&["a", "b"], false);
        model.select(0).unwrap();
        model.set_enabled(0, false).unwrap();
        assert_eq!(model.selected_index(), None);
    }

    #[test]
    fn test_removing_selected_item_selects_nearest() {
        let mut model = single(&["a", "b", "c"], true);
        model.select(1).unwrap();

        model.remove_at(1).unwrap();

        // "c" moved into the vacated slot
        assert_eq!(model.selected_item(), Some(&"c"));

        model.remove_at(1).unwrap();
        assert_eq!(model.selected_item(), Some(&"a"));
    }

    #[test]
    fn test_removing_last_item_empties_selection() {
        let mut model = single(&["a"], true);
        model.remove_at(0).unwrap();
        assert_eq!(model.selected_index(), None);
    }

    #[test]
    fn test_filter_change_reselects_visible_item() {
        let mut model = single(&["apple", "banana", "cherry"], true);
        assert_eq!(model.selected_index(), Some(0));

        model.apply_filter("an", 0, None).unwrap();

        assert_eq!(model.selected_item(), Some(&"banana"));
        assert_eq!(model.selected_count(), 1);
    }

    #[test]
    fn test_enabling_adaptation_applies_it() {
        let mut model = single(&["a", "b"], false);
        assert_eq!(model.selected_index(), None);
        model.set_adapt_selection_automatically(true);
        assert_eq!(model.selected_index(), Some(0));
    }

    #[test]
    fn test_multiple_selection_is_independent() {
        let mut model = multiple(&["x", "y", "z"]);
        assert!(model.set_selected(0, true).unwrap());
        assert!(model.set_selected(2, true).unwrap());
        assert!(!model.set_selected(2, true).unwrap());

        assert_eq!(model.selected_indices(), vec![0, 2]);
        assert_eq!(model.selected_items(), vec![&"x", &"z"]);
        assert_eq!(model.first_unselected_index(), Some(1));
        assert_eq!(model.last_selected_index(), Some(2));
    }

    #[test]
    fn test_multiple_disabling_clears_selection() {
        let mut model = multiple(&["x", "y", "z"]);
        model.set_selected(1, true).unwrap();
        model.set_enabled(1, false).unwrap();

        assert!(!model.is_selected(1).unwrap());
        assert!(!model.set_selected(1, true).unwrap());
    }

    #[test]
    fn test_multiple_bulk_operations() {
        let mut model = multiple(&["x", "y", "z"]);
        model.set_enabled(1, false).unwrap();

        assert!(model.set_all_selected(true).unwrap());
        assert_eq!(model.selected_indices(), vec![0, 2]);

        assert!(model.trigger_all_selections().unwrap());
        assert_eq!(model.selected_count(), 0);

        model.set_selected(0, true).unwrap();
        model.trigger_all_selections().unwrap();
        assert_eq!(model.selected_indices(), vec![2]);

        assert!(model.clear_selection());
        assert_eq!(model.first_selected_index(), None);
    }

    #[test]
    fn test_visible_selection_mutates_master_item() {
        let mut model = multiple(&["apple", "banana", "cherry"]);
        model.apply_filter("e", 0, None).unwrap();

        // Visible: apple, cherry
        model.set_visible_selected(1, true).unwrap();
        model.reset_filter("e", 0);

        assert_eq!(model.selected_items(), vec![&"cherry"]);
    }

    #[test]
    fn test_switching_to_single_keeps_first_selection() {
        let mut model = multiple(&["a", "b", "c"]);
        model.set_selected(1, true).unwrap();
        model.set_selected(2, true).unwrap();

        model.set_choice_mode(ChoiceMode::Single);

        assert_eq!(model.selected_indices(), vec![1]);

        model.set_choice_mode(ChoiceMode::None);
        assert_eq!(model.selected_count(), 0);
    }

    #[test]
    fn test_inserting_preselected_item_takes_single_selection() {
        let mut model = single(&["a", "b"], true);
        assert_eq!(model.selected_index(), Some(0));

        model
            .insert_item(2, Item::new("c").with_selected(true))
            .unwrap();

        assert_eq!(model.selected_indices(), vec![2]);
    }

    #[test]
    fn test_value_based_selection() {
        let mut model = multiple(&["a", "b"]);
        assert!(model.set_item_selected(&"b", true).unwrap());
        assert!(model.is_item_selected(&"b").unwrap());
        assert!(matches!(
            model.select_item(&"zzz"),
            Err(ListError::NoSuchElement(_))
        ));
    }
}

//! # Persistence Boundary
//!
//! The engine does not serialize anything itself. It exposes a
//! [`ListSnapshot`], plain serde data holding everything needed to rebuild
//! the layer state on top of the same item data:
//!
//! - every policy, as a [`ListConfig`]
//! - the per-item flags in master order
//! - the active filter keys in application order
//!
//! Item data is not part of the snapshot. The caller restores the data first
//! (by adding the same items in the same order) and then calls
//! [`ListModel::restore`].
//!
//! ## Atomic Restore
//!
//! Restoring validates the whole snapshot before touching the model: item
//! count, state ranges, selection count against the choice mode, and a
//! matcher for every filter. A rejected snapshot leaves the model unchanged.
//! A selected flag on a disabled item is dropped rather than rejected.
//!
//! Restoring fires filter notifications and one `on_redraw`; per-item flag
//! changes are not reported individually.

use crate::collection::ListModel;
use crate::config::ListConfig;
use crate::error::{ListError, Result};
use crate::filter::{FilterKey, Matcher};
use crate::item::ItemFlags;
use crate::selection::ChoiceMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSnapshot {
    pub config: ListConfig,
    pub items: Vec<ItemFlags>,
    pub filters: Vec<FilterKey>,
}

/// Filter keys of a validated snapshot with the matcher each will use, and
/// whether that matcher was supplied rather than the default.
pub(crate) type PreparedFilters<T> = Vec<(FilterKey, Matcher<T>, bool)>;

impl<T> ListModel<T> {
    /// The current policies.
    pub fn config(&self) -> ListConfig {
        ListConfig {
            allow_duplicates: self.allow_duplicates,
            notify_on_change: self.notify_on_change,
            number_of_states: self.number_of_states,
            choice_mode: self.choice_mode,
            adapt_selection_automatically: self.adapt_selection_automatically,
            trigger_selection_on_click: self.trigger_selection_on_click,
            trigger_state_on_click: self.trigger_state_on_click,
        }
    }

    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            config: self.config(),
            items: self
                .items
                .iter()
                .map(|item| item.flags(self.number_of_states))
                .collect(),
            filters: self.filters.active_filters(),
        }
    }

    /// Restores `snapshot`, re-applying its filters with the default matcher
    /// or the caller-supplied matcher that was active for the same key.
    pub fn restore(&mut self, snapshot: &ListSnapshot) -> Result<()> {
        self.restore_with(snapshot, |_| None)
    }

    /// Like [`ListModel::restore`], asking `resolve` for each filter's
    /// matcher first.
    pub fn restore_with<F>(&mut self, snapshot: &ListSnapshot, resolve: F) -> Result<()>
    where
        F: FnMut(&FilterKey) -> Option<Matcher<T>>,
    {
        let filters = self.prepare_restore(snapshot, resolve)?;
        self.commit_restore(snapshot, filters);
        Ok(())
    }

    /// Validates `snapshot` and resolves a matcher for each of its filters.
    /// Nothing is changed.
    pub(crate) fn prepare_restore<F>(
        &self,
        snapshot: &ListSnapshot,
        mut resolve: F,
    ) -> Result<PreparedFilters<T>>
    where
        F: FnMut(&FilterKey) -> Option<Matcher<T>>,
    {
        self.validate_snapshot(snapshot)?;

        let mut prepared = Vec::with_capacity(snapshot.filters.len());
        for key in &snapshot.filters {
            let (matcher, custom) = match resolve(key) {
                Some(matcher) => (matcher, true),
                None => match self.filters.custom_matcher(key) {
                    Some(matcher) => (matcher.clone(), true),
                    None => match &self.default_matcher {
                        Some(matcher) => (matcher.clone(), false),
                        None => {
                            return Err(ListError::FilteringUnsupported(format!(
                                "no matcher available to restore filter {}",
                                key
                            )))
                        }
                    },
                },
            };
            prepared.push((key.clone(), matcher, custom));
        }
        Ok(prepared)
    }

    /// Applies a snapshot that went through [`ListModel::prepare_restore`].
    pub(crate) fn commit_restore(&mut self, snapshot: &ListSnapshot, filters: PreparedFilters<T>) {
        let config = &snapshot.config;
        self.allow_duplicates = config.allow_duplicates;
        self.notify_on_change = config.notify_on_change;
        self.number_of_states = config.number_of_states;
        self.choice_mode = config.choice_mode;
        self.adapt_selection_automatically = config.adapt_selection_automatically;
        self.trigger_selection_on_click = config.trigger_selection_on_click;
        self.trigger_state_on_click = config.trigger_state_on_click;

        for (item, flags) in self.items.iter_mut().zip(&snapshot.items) {
            item.set_enabled(flags.enabled);
            item.set_state(flags.state);
            item.set_selected(flags.selected && flags.enabled);
        }

        for key in self.filters.active_filters().iter().rev() {
            self.drop_filter(key);
        }
        for (key, matcher, custom) in filters {
            if let Some(previous) = self
                .filters
                .apply(&self.items, key.clone(), matcher.clone(), custom)
            {
                let visible = self.filters.visible();
                let supplied = custom.then_some(&matcher);
                self.observers
                    .notify(|o| o.on_filter_applied(&key, supplied, visible, &previous));
            }
        }
        tracing::debug!(
            items = snapshot.items.len(),
            filters = snapshot.filters.len(),
            "Restored snapshot"
        );

        self.reconcile_single_selection();
        self.redraw();
    }

    /// Checks `snapshot` against the current items without changing
    /// anything.
    pub fn validate_snapshot(&self, snapshot: &ListSnapshot) -> Result<()> {
        snapshot.config.validate()?;
        if snapshot.items.len() != self.items.len() {
            return Err(ListError::InvalidArgument(format!(
                "snapshot holds {} items, collection holds {}",
                snapshot.items.len(),
                self.items.len()
            )));
        }

        let number_of_states = snapshot.config.number_of_states;
        if let Some(index) = snapshot
            .items
            .iter()
            .position(|flags| flags.state >= number_of_states)
        {
            return Err(ListError::InvalidArgument(format!(
                "snapshot state {} at {} out of range for {} states",
                snapshot.items[index].state, index, number_of_states
            )));
        }

        let selected = snapshot
            .items
            .iter()
            .filter(|flags| flags.selected && flags.enabled)
            .count();
        let allowed = match snapshot.config.choice_mode {
            ChoiceMode::None => 0,
            ChoiceMode::Single => 1,
            ChoiceMode::Multiple => usize::MAX,
        };
        if selected > allowed {
            return Err(ListError::InvalidArgument(format!(
                "snapshot selects {} items in {:?} choice mode",
                selected, snapshot.config.choice_mode
            )));
        }
        Ok(())
    }
}

//! # Collection: The Master Store
//!
//! [`ListModel`] owns the master-ordered items and every per-item flag. The
//! four layers (enablement, item state, filtering, selection) are `impl`
//! blocks over the same struct, each in its own module, and read the items
//! only through index-based access. None of them keeps a copy of item data.
//!
//! ```text
//! ┌──────────────────────────── ListModel<T> ────────────────────────────┐
//! │ items: Vec<Item<T>>   (master order, never reordered by filters)     │
//! │                                                                      │
//! │  enable.rs     is_enabled / set_enabled / trigger_enabled ...        │
//! │  state.rs      state / set_state / trigger_state ...                 │
//! │  filter.rs     apply_filter / reset_filter -> visible subset         │
//! │  selection.rs  select / set_selected / auto-adaptation ...           │
//! │                                                                      │
//! │  view.rs / click.rs / snapshot.rs: rendering, click and persistence  │
//! │  boundaries                                                          │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mutation Flow
//!
//! Every mutator validates its arguments first and fails with a
//! [`ListError`] before touching anything. Once it mutates it runs to
//! completion:
//!
//! 1. Update the master items and recompute the visible subset.
//! 2. Notify observers of the primary change (`on_item_added`, ...).
//! 3. Run cross-layer reconciliation (selection auto-adaptation), which may
//!    notify further changes.
//! 4. Fire a single `on_redraw` if `notify_on_change` is set.
//!
//! ## Duplicates
//!
//! Identity is value equality of the data. When duplicates are disallowed
//! (the default) adding an item already present returns `Ok(false)`; this
//! is a policy outcome, not an error.

use crate::config::ListConfig;
use crate::error::{check_index, ListError, Result};
use crate::filter::{filterable_matcher, FilterEngine, Filterable, Matcher};
use crate::item::Item;
use crate::observer::{ListObserver, ObserverId, Observers};
use crate::selection::ChoiceMode;

pub struct ListModel<T> {
    pub(crate) items: Vec<Item<T>>,
    pub(crate) filters: FilterEngine<T>,
    pub(crate) observers: Observers<T>,
    pub(crate) default_matcher: Option<Matcher<T>>,
    pub(crate) allow_duplicates: bool,
    pub(crate) notify_on_change: bool,
    pub(crate) number_of_states: usize,
    pub(crate) choice_mode: ChoiceMode,
    pub(crate) adapt_selection_automatically: bool,
    pub(crate) trigger_selection_on_click: bool,
    pub(crate) trigger_state_on_click: bool,
    /// Cleared by a hierarchy whose selection scope excludes this level.
    pub(crate) selectable: bool,
}

impl<T> Default for ListModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Filterable + 'static> ListModel<T> {
    /// A model whose data matches filter queries on its own.
    pub fn filterable() -> Self {
        let mut model = Self::new();
        model.default_matcher = Some(filterable_matcher());
        model
    }
}

impl<T> ListModel<T> {
    pub fn new() -> Self {
        let defaults = ListConfig::default();
        Self {
            items: Vec::new(),
            filters: FilterEngine::default(),
            observers: Observers::default(),
            default_matcher: None,
            allow_duplicates: defaults.allow_duplicates,
            notify_on_change: defaults.notify_on_change,
            number_of_states: defaults.number_of_states,
            choice_mode: defaults.choice_mode,
            adapt_selection_automatically: defaults.adapt_selection_automatically,
            trigger_selection_on_click: defaults.trigger_selection_on_click,
            trigger_state_on_click: defaults.trigger_state_on_click,
            selectable: true,
        }
    }

    pub fn with_config(config: &ListConfig) -> Result<Self> {
        let mut model = Self::new();
        model.apply_config(config)?;
        Ok(model)
    }

    /// Applies every policy of `config`. The number of states is validated
    /// before anything changes.
    pub fn apply_config(&mut self, config: &ListConfig) -> Result<()> {
        config.validate()?;
        self.allow_duplicates = config.allow_duplicates;
        self.notify_on_change = config.notify_on_change;
        self.trigger_selection_on_click = config.trigger_selection_on_click;
        self.trigger_state_on_click = config.trigger_state_on_click;
        self.set_number_of_states(config.number_of_states)?;
        self.set_choice_mode(config.choice_mode);
        self.set_adapt_selection_automatically(config.adapt_selection_automatically);
        Ok(())
    }

    /// The matcher used by filters applied without an explicit one.
    pub fn set_default_matcher(&mut self, matcher: Option<Matcher<T>>) {
        self.default_matcher = matcher;
    }

    pub fn has_default_matcher(&self) -> bool {
        self.default_matcher.is_some()
    }

    pub fn allows_duplicates(&self) -> bool {
        self.allow_duplicates
    }

    pub fn set_allow_duplicates(&mut self, allow: bool) {
        self.allow_duplicates = allow;
    }

    pub fn notifies_on_change(&self) -> bool {
        self.notify_on_change
    }

    pub fn set_notify_on_change(&mut self, notify: bool) {
        self.notify_on_change = notify;
    }

    pub fn add_observer(&mut self, observer: Box<dyn ListObserver<T>>) -> ObserverId {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.item(index).map(Item::data)
    }

    pub fn item(&self, index: usize) -> Result<&Item<T>> {
        check_index(index, self.items.len())?;
        Ok(&self.items[index])
    }

    /// All data in master order, regardless of active filters.
    pub fn all_items(&self) -> Vec<&T> {
        self.items.iter().map(Item::data).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().map(Item::data)
    }

    /// Iterates master order starting at `index`. `index == len()` yields an
    /// empty iterator.
    pub fn iter_from(&self, index: usize) -> Result<impl Iterator<Item = &T> + '_> {
        if index > self.items.len() {
            return Err(ListError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items[index..].iter().map(Item::data))
    }

    /// Removes the item at `index` and returns its data.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        check_index(index, self.items.len())?;

        let removed = self.items.remove(index);
        self.filters.refresh(&self.items);
        tracing::trace!(index, "Removed item");
        self.observers
            .notify(|o| o.on_item_removed(removed.data(), index));

        if removed.is_selected() {
            self.adapt_after_removal(index);
        }
        self.redraw();
        Ok(removed.into_data())
    }

    /// Removes every item. Active filters stay applied.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let removed = std::mem::take(&mut self.items);
        self.filters.refresh(&self.items);
        for (index, item) in removed.iter().enumerate().rev() {
            self.observers.notify(|o| o.on_item_removed(item.data(), index));
        }
        tracing::debug!(count = removed.len(), "Cleared collection");
        self.redraw();
    }

    pub(crate) fn redraw(&mut self) {
        if self.notify_on_change {
            self.observers.notify(|o| o.on_redraw());
        }
    }
}

impl<T: PartialEq> ListModel<T> {
    pub fn contains(&self, data: &T) -> bool {
        self.index_of(data).is_some()
    }

    pub fn index_of(&self, data: &T) -> Option<usize> {
        self.items.iter().position(|item| item.data() == data)
    }

    pub fn last_index_of(&self, data: &T) -> Option<usize> {
        self.items.iter().rposition(|item| item.data() == data)
    }

    /// Appends `data`. Returns `Ok(false)` if duplicates are disallowed and
    /// the data is already present.
    pub fn add(&mut self, data: T) -> Result<bool> {
        let index = self.items.len();
        self.insert_item(index, Item::new(data))
    }

    pub fn add_at(&mut self, index: usize, data: T) -> Result<bool> {
        self.insert_item(index, Item::new(data))
    }

    /// Appends every element, skipping rejected duplicates. Returns whether
    /// all of them were added.
    pub fn add_all<I>(&mut self, data: I) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
    {
        let mut all_added = true;
        for value in data {
            all_added &= self.add(value)?;
        }
        Ok(all_added)
    }

    /// Inserts a prepared [`Item`] at `index` (`index == len()` appends).
    ///
    /// Preset flags are reconciled with the layers: a disabled item can not
    /// be selected, and in single choice a selected item takes the selection
    /// over from whichever item held it.
    pub fn insert_item(&mut self, index: usize, mut item: Item<T>) -> Result<bool> {
        if index > self.items.len() {
            return Err(ListError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        if item.raw_state() >= self.number_of_states {
            return Err(ListError::InvalidArgument(format!(
                "state {} out of range for {} states",
                item.raw_state(),
                self.number_of_states
            )));
        }
        if !self.allow_duplicates && self.contains(item.data()) {
            tracing::debug!(index, "Duplicate item not added");
            return Ok(false);
        }

        if item.is_selected() && (!item.is_enabled() || self.choice_mode == ChoiceMode::None) {
            item.set_selected(false);
        }
        self.items.insert(index, item);
        self.filters.refresh(&self.items);
        tracing::trace!(index, "Added item");

        let items = &self.items;
        self.observers
            .notify(|o| o.on_item_added(items[index].data(), index));

        self.reconcile_inserted(index);
        self.redraw();
        Ok(true)
    }

    pub fn remove(&mut self, data: &T) -> Result<bool> {
        match self.index_of(data) {
            Some(index) => {
                self.remove_at(index)?;
                Ok(true)
            }
            None => {
                tracing::debug!("Item to remove not found");
                Ok(false)
            }
        }
    }

    /// Removes every listed item that is present. Returns whether all of them
    /// were found.
    pub fn remove_all<'a, I>(&mut self, data: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut all_removed = true;
        for value in data {
            all_removed &= self.remove(value)?;
        }
        Ok(all_removed)
    }

    /// Replaces the data at `index`, keeping the slot's flags. Returns the
    /// previous data.
    pub fn replace_at(&mut self, index: usize, data: T) -> Result<T> {
        check_index(index, self.items.len())?;
        if !self.allow_duplicates
            && self
                .items
                .iter()
                .enumerate()
                .any(|(i, item)| i != index && *item.data() == data)
        {
            return Err(ListError::InvalidArgument(
                "replacement duplicates an item already in the collection".to_string(),
            ));
        }

        let previous = std::mem::replace(self.items[index].data_mut(), data);
        self.filters.refresh(&self.items);
        tracing::trace!(index, "Replaced item");

        let items = &self.items;
        self.observers
            .notify(|o| o.on_item_replaced(&previous, items[index].data(), index));

        self.reconcile_single_selection();
        self.redraw();
        Ok(previous)
    }

    /// Master index of `data`, or `NoSuchElement`.
    pub(crate) fn require(&self, data: &T) -> Result<usize> {
        self.index_of(data).ok_or_else(|| {
            ListError::NoSuchElement("item is not part of the collection".to_string())
        })
    }
}

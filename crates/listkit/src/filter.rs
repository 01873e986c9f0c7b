//! # Filtering
//!
//! The filter engine never reorders or removes master data. It keeps an
//! ordered set of applied filters and the resulting *visible subset*: the
//! ascending master indices that pass every active filter.
//!
//! ## Filter Keys
//!
//! A filter is identified by its [`FilterKey`], the `(query, flags)` pair.
//! Applying a key that is already active is a no-op; callers that want to
//! re-filter after changing data must reset the key first and apply it again.
//! Insertion order of active keys is preserved and observable through
//! [`FilterEngine::active_filters`].
//!
//! ## Matching
//!
//! A match is decided either by the data itself, through the [`Filterable`]
//! trait, or by a [`Matcher`] passed when the filter is applied. The matcher
//! used for a key is stored with it, so resetting one filter can replay the
//! remaining ones against the master order.
//!
//! ## Composition
//!
//! ```text
//! visible = { i in master order : for every active filter f, f.matches(master[i]) }
//! ```
//!
//! Applying narrows the current visible subset. Resetting recomputes the
//! subset from the master order using the remaining filters, since a removed
//! filter may have been the only one hiding an item.

use crate::collection::ListModel;
use crate::error::{ListError, Result};
use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Reserved flag of the synthetic filter that hides groups without visible
/// children. Its key is `("", FLAG_FILTER_EMPTY_GROUPS)`.
pub const FLAG_FILTER_EMPTY_GROUPS: u32 = 1 << 31;

/// External match predicate: `(data, query, flags) -> matches`.
pub type Matcher<T> = Rc<dyn Fn(&T, &str, u32) -> bool>;

/// Data that knows how to match a filter query.
pub trait Filterable {
    fn matches(&self, query: &str, flags: u32) -> bool;
}

impl Filterable for String {
    fn matches(&self, query: &str, _flags: u32) -> bool {
        self.contains(query)
    }
}

impl Filterable for &str {
    fn matches(&self, query: &str, _flags: u32) -> bool {
        self.contains(query)
    }
}

/// Builds a matcher that delegates to the data's own [`Filterable`] impl.
pub fn filterable_matcher<T: Filterable + 'static>() -> Matcher<T> {
    Rc::new(|data: &T, query: &str, flags: u32| data.matches(query, flags))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterKey {
    pub query: String,
    pub flags: u32,
}

impl FilterKey {
    pub fn new(query: impl Into<String>, flags: u32) -> Self {
        Self {
            query: query.into(),
            flags,
        }
    }

    /// The key of the synthetic empty-group filter.
    pub fn empty_groups() -> Self {
        Self::new("", FLAG_FILTER_EMPTY_GROUPS)
    }

    pub fn is_reserved(&self) -> bool {
        *self == Self::empty_groups()
    }

    fn is(&self, query: &str, flags: u32) -> bool {
        self.query == query && self.flags == flags
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" (flags {:#x})", self.query, self.flags)
    }
}

struct AppliedFilter<T> {
    key: FilterKey,
    matcher: Matcher<T>,
    custom: bool,
}

impl<T> AppliedFilter<T> {
    fn matches(&self, data: &T) -> bool {
        (self.matcher)(data, &self.key.query, self.key.flags)
    }
}

pub struct FilterEngine<T> {
    applied: Vec<AppliedFilter<T>>,
    visible: Vec<usize>,
}

impl<T> Default for FilterEngine<T> {
    fn default() -> Self {
        Self {
            applied: Vec::new(),
            visible: Vec::new(),
        }
    }
}

impl<T> FilterEngine<T> {
    pub fn is_filtered(&self) -> bool {
        !self.applied.is_empty()
    }

    pub fn is_applied(&self, query: &str, flags: u32) -> bool {
        self.applied.iter().any(|f| f.key.is(query, flags))
    }

    /// Active filter keys in the order they were applied.
    pub fn active_filters(&self) -> Vec<FilterKey> {
        self.applied.iter().map(|f| f.key.clone()).collect()
    }

    /// Ascending master indices of the visible items.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.binary_search(&index).is_ok()
    }

    /// Position of a master index inside the visible subset.
    pub fn visible_position(&self, index: usize) -> Option<usize> {
        self.visible.binary_search(&index).ok()
    }

    /// The caller-supplied matcher stored for `key`, if any.
    pub(crate) fn custom_matcher(&self, key: &FilterKey) -> Option<&Matcher<T>> {
        self.applied
            .iter()
            .find(|f| f.key == *key && f.custom)
            .map(|f| &f.matcher)
    }

    /// Adds a filter and narrows the visible subset. Returns the previous
    /// subset, or `None` if the key was already active.
    pub(crate) fn apply(
        &mut self,
        items: &[Item<T>],
        key: FilterKey,
        matcher: Matcher<T>,
        custom: bool,
    ) -> Option<Vec<usize>> {
        if self.is_applied(&key.query, key.flags) {
            return None;
        }

        let filter = AppliedFilter {
            key,
            matcher,
            custom,
        };
        let narrowed: Vec<usize> = self
            .visible
            .iter()
            .copied()
            .filter(|&i| filter.matches(items[i].data()))
            .collect();
        self.applied.push(filter);

        Some(std::mem::replace(&mut self.visible, narrowed))
    }

    /// Removes a filter and replays the remaining ones against the master
    /// order. Returns the previous subset, or `None` if the key was not active.
    pub(crate) fn reset(
        &mut self,
        items: &[Item<T>],
        query: &str,
        flags: u32,
    ) -> Option<Vec<usize>> {
        let position = self.applied.iter().position(|f| f.key.is(query, flags))?;
        self.applied.remove(position);

        let recomputed = self.compute(items);
        Some(std::mem::replace(&mut self.visible, recomputed))
    }

    /// Recomputes the visible subset after the master order changed.
    /// Returns whether the subset differs from before.
    pub(crate) fn refresh(&mut self, items: &[Item<T>]) -> bool {
        let recomputed = self.compute(items);
        if recomputed == self.visible {
            return false;
        }
        self.visible = recomputed;
        true
    }

    fn compute(&self, items: &[Item<T>]) -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.applied.iter().all(|f| f.matches(item.data())))
            .map(|(i, _)| i)
            .collect()
    }
}

impl<T> ListModel<T> {
    pub fn is_filtered(&self) -> bool {
        self.filters.is_filtered()
    }

    pub fn is_filter_applied(&self, query: &str, flags: u32) -> bool {
        self.filters.is_applied(query, flags)
    }

    pub fn active_filters(&self) -> Vec<FilterKey> {
        self.filters.active_filters()
    }

    /// Adds the filter `(query, flags)` and returns the new visible subset,
    /// or `Ok(None)` if that key is already active.
    ///
    /// Without an explicit `matcher` the model's default matcher is used;
    /// with neither, the call fails with `FilteringUnsupported`.
    pub fn apply_filter(
        &mut self,
        query: &str,
        flags: u32,
        matcher: Option<Matcher<T>>,
    ) -> Result<Option<Vec<usize>>> {
        let applied = self.apply_filter_key(FilterKey::new(query, flags), matcher)?;
        if applied {
            self.redraw();
            Ok(Some(self.filters.visible().to_vec()))
        } else {
            Ok(None)
        }
    }

    /// Removes the filter `(query, flags)`. Returns `false` if it was not
    /// active.
    pub fn reset_filter(&mut self, query: &str, flags: u32) -> bool {
        let reset = self.reset_filter_key(&FilterKey::new(query, flags));
        if reset {
            self.redraw();
        }
        reset
    }

    /// Removes every active filter, most recent first.
    pub fn reset_all_filters(&mut self) -> bool {
        let mut reset = false;
        for key in self.filters.active_filters().iter().rev() {
            reset |= self.reset_filter_key(key);
        }
        if reset {
            self.redraw();
        }
        reset
    }

    /// Applies a filter without a redraw.
    pub(crate) fn apply_filter_key(
        &mut self,
        key: FilterKey,
        matcher: Option<Matcher<T>>,
    ) -> Result<bool> {
        if self.filters.is_applied(&key.query, key.flags) {
            tracing::debug!(filter = %key, "Filter already applied");
            return Ok(false);
        }
        let custom = matcher.is_some();
        let matcher = matcher
            .or_else(|| self.default_matcher.clone())
            .ok_or_else(|| {
                ListError::FilteringUnsupported(format!(
                    "no matcher available for filter {}",
                    key
                ))
            })?;

        let Some(previous) = self
            .filters
            .apply(&self.items, key.clone(), matcher.clone(), custom)
        else {
            return Ok(false);
        };
        let visible = self.filters.visible();
        tracing::debug!(filter = %key, visible = visible.len(), "Applied filter");
        let supplied = custom.then_some(&matcher);
        self.observers
            .notify(|o| o.on_filter_applied(&key, supplied, visible, &previous));

        self.reconcile_single_selection();
        Ok(true)
    }

    /// Resets a filter without a redraw.
    pub(crate) fn reset_filter_key(&mut self, key: &FilterKey) -> bool {
        if !self.drop_filter(key) {
            return false;
        }
        self.reconcile_single_selection();
        true
    }

    /// Removes a filter and notifies, leaving the selection alone.
    pub(crate) fn drop_filter(&mut self, key: &FilterKey) -> bool {
        let Some(previous) = self.filters.reset(&self.items, &key.query, key.flags) else {
            tracing::debug!(filter = %key, "Filter not applied");
            return false;
        };
        let visible = self.filters.visible();
        tracing::debug!(filter = %key, visible = visible.len(), "Reset filter");
        self.observers
            .notify(|o| o.on_filter_reset(key, visible, &previous));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(data: &[&'static str]) -> Vec<Item<&'static str>> {
        data.iter().map(|d| Item::new(*d)).collect()
    }

    fn engine(items: &[Item<&'static str>]) -> FilterEngine<&'static str> {
        let mut engine = FilterEngine::default();
        engine.refresh(items);
        engine
    }

    #[test]
    fn test_unfiltered_engine_shows_everything() {
        let items = items(&["apple", "banana", "cherry"]);
        let engine = engine(&items);
        assert!(!engine.is_filtered());
        assert_eq!(engine.visible(), &[0, 1, 2]);
    }

    #[test]
    fn test_apply_narrows_and_returns_previous() {
        let items = items(&["apple", "banana", "cherry"]);
        let mut engine = engine(&items);

        let previous = engine.apply(&items, FilterKey::new("an", 0), filterable_matcher(), false);

        assert_eq!(previous, Some(vec![0, 1, 2]));
        assert_eq!(engine.visible(), &[1]);
        assert!(engine.is_applied("an", 0));
        assert!(!engine.is_applied("an", 1));
    }

    #[test]
    fn test_apply_same_key_twice_is_noop() {
        let items = items(&["apple", "banana"]);
        let mut engine = engine(&items);
        engine.apply(&items, FilterKey::new("a", 0), filterable_matcher(), false);

        let again = engine.apply(&items, FilterKey::new("a", 0), filterable_matcher(), false);

        assert_eq!(again, None);
        assert_eq!(engine.active_filters().len(), 1);
    }

    #[test]
    fn test_same_query_with_other_flags_is_a_distinct_filter() {
        let items = items(&["apple", "banana"]);
        let mut engine = engine(&items);
        engine.apply(&items, FilterKey::new("a", 0), filterable_matcher(), false);
        let second = engine.apply(&items, FilterKey::new("a", 1), filterable_matcher(), false);

        assert!(second.is_some());
        assert_eq!(
            engine.active_filters(),
            vec![FilterKey::new("a", 0), FilterKey::new("a", 1)]
        );
    }

    #[test]
    fn test_reset_replays_remaining_filters() {
        let items = items(&["apple", "apricot", "banana", "cherry"]);
        let mut engine = engine(&items);
        engine.apply(&items, FilterKey::new("a", 0), filterable_matcher(), false);
        engine.apply(&items, FilterKey::new("p", 0), filterable_matcher(), false);
        assert_eq!(engine.visible(), &[0, 1]);

        let previous = engine.reset(&items, "p", 0);

        assert_eq!(previous, Some(vec![0, 1]));
        assert_eq!(engine.visible(), &[0, 1, 2]);
        assert_eq!(engine.active_filters(), vec![FilterKey::new("a", 0)]);
    }

    #[test]
    fn test_reset_unknown_key_is_noop() {
        let items = items(&["apple"]);
        let mut engine = engine(&items);
        assert_eq!(engine.reset(&items, "zzz", 0), None);
        assert_eq!(engine.visible(), &[0]);
    }

    #[test]
    fn test_reset_last_filter_restores_master_order() {
        let items = items(&["apple", "banana", "cherry"]);
        let mut engine = engine(&items);
        engine.apply(&items, FilterKey::new("ch", 0), filterable_matcher(), false);
        engine.reset(&items, "ch", 0);

        assert!(!engine.is_filtered());
        assert_eq!(engine.visible(), &[0, 1, 2]);
    }

    #[test]
    fn test_custom_matcher_uses_flags() {
        let items = items(&["Apple", "apple", "APPLE"]);
        let mut engine = engine(&items);
        let case_insensitive: Matcher<&'static str> =
            Rc::new(|data: &&'static str, query: &str, flags: u32| {
                if flags & 1 == 1 {
                    data.to_lowercase().contains(&query.to_lowercase())
                } else {
                    data.contains(query)
                }
            });

        engine.apply(&items, FilterKey::new("apple", 1), case_insensitive, true);

        assert_eq!(engine.visible(), &[0, 1, 2]);
        assert!(engine
            .custom_matcher(&FilterKey::new("apple", 1))
            .is_some());
    }

    #[test]
    fn test_refresh_reports_changes() {
        let mut items = items(&["apple", "banana"]);
        let mut engine = engine(&items);
        engine.apply(&items, FilterKey::new("an", 0), filterable_matcher(), false);

        items.push(Item::new("mango"));
        assert!(engine.refresh(&items));
        assert_eq!(engine.visible(), &[1, 2]);
        assert!(!engine.refresh(&items));
    }

    #[test]
    fn test_reserved_key() {
        assert!(FilterKey::empty_groups().is_reserved());
        assert!(!FilterKey::new("", 0).is_reserved());
        assert_eq!(FilterKey::new("x", 2).to_string(), "\"x\" (flags 0x2)");
    }

    #[test]
    fn test_visible_position_maps_master_indices() {
        let items = items(&["apple", "banana", "cherry"]);
        let mut engine = engine(&items);
        engine.apply(&items, FilterKey::new("e", 0), filterable_matcher(), false);

        assert_eq!(engine.visible(), &[0, 2]);
        assert_eq!(engine.visible_position(2), Some(1));
        assert_eq!(engine.visible_position(1), None);
        assert!(engine.is_visible(0));
        assert!(!engine.is_visible(1));
    }

    #[test]
    fn test_model_without_matcher_rejects_filters() {
        let mut model: ListModel<u32> = ListModel::new();
        model.add(1).unwrap();

        assert!(matches!(
            model.apply_filter("1", 0, None),
            Err(ListError::FilteringUnsupported(_))
        ));
        assert!(!model.is_filtered());

        let odd: Matcher<u32> = Rc::new(|data: &u32, _query: &str, _flags: u32| data % 2 == 1);
        assert_eq!(model.apply_filter("odd", 0, Some(odd)).unwrap(), Some(vec![0]));
    }

    #[test]
    fn test_model_filter_notifies_and_redraws() {
        let mut model = ListModel::filterable();
        model.add_all(["apple", "banana"]).unwrap();
        let (observer, log) = crate::test_utils::RecordingObserver::new();
        model.add_observer(Box::new(observer));

        assert_eq!(model.apply_filter("an", 0, None).unwrap(), Some(vec![1]));
        assert_eq!(model.apply_filter("an", 0, None).unwrap(), None);
        assert!(model.reset_filter("an", 0));
        assert!(!model.reset_filter("an", 0));

        assert_eq!(
            log.events(),
            vec![
                "filter applied \"an\" (flags 0x0) [0, 1] -> [1]",
                "redraw",
                "filter reset \"an\" (flags 0x0) [1] -> [0, 1]",
                "redraw"
            ]
        );
    }

    #[test]
    fn test_model_mutations_keep_filters_consistent() {
        let mut model = ListModel::filterable();
        model.add_all(["apple", "banana"]).unwrap();
        model.apply_filter("an", 0, None).unwrap();

        model.add("mango").unwrap();
        model.add_at(0, "kiwi").unwrap();

        assert_eq!(model.filters.visible(), &[2, 3]);
        assert_eq!(model.all_items(), vec![&"kiwi", &"apple", &"banana", &"mango"]);
    }

    #[test]
    fn test_reset_all_filters_restores_master_order() {
        let mut model = ListModel::filterable();
        model.add_all(["apple", "banana", "cherry"]).unwrap();
        model.apply_filter("a", 0, None).unwrap();
        model.apply_filter("n", 0, None).unwrap();

        assert!(model.reset_all_filters());

        assert!(model.active_filters().is_empty());
        assert_eq!(model.filters.visible(), &[0, 1, 2]);
    }

    #[test]
    fn test_flagged_keys_compose_with_plain_keys() {
        use crate::test_utils::{Fruit, FLAG_BY_COLOR};

        let mut model = ListModel::filterable();
        model.add_all(Fruit::basket()).unwrap();

        assert_eq!(model.apply_filter("l", 0, None).unwrap(), Some(vec![0, 3, 4]));
        assert_eq!(
            model.apply_filter("YELLOW", FLAG_BY_COLOR, None).unwrap(),
            Some(vec![3])
        );
        assert_eq!(model.visible_items()[0].name, "Lemon");

        assert!(model.reset_filter("l", 0));
        assert_eq!(model.filters.visible(), &[1, 3]);
        // Keys compare exactly even when the matcher ignores case
        assert!(!model.reset_filter("yellow", FLAG_BY_COLOR));
        assert!(model.reset_filter("YELLOW", FLAG_BY_COLOR));
        assert_eq!(model.filters.visible(), &[0, 1, 2, 3, 4]);
    }
}

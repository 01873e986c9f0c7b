//! # Two-Level Hierarchy
//!
//! [`ExpandableList`] is an outer [`ListModel`] of [`Group`]s, each owning an
//! independent child `ListModel`. Every layer works on both levels: groups
//! are enabled, stated, selected and filtered by the outer model, children
//! by their group's model.
//!
//! ```text
//! ExpandableList<G, C>
//! ├── groups: ListModel<Group<G, C>>      group flags, group filters,
//! │   │                                   synthetic empty-group filter
//! │   ├── Group "fruit"  (expanded)
//! │   │   └── children: ListModel<C>      child flags, child filters
//! │   └── Group "vegetables"
//! │       └── children: ListModel<C>
//! └── child template: ListConfig + matcher applied to every new group
//! ```
//!
//! Group and child arguments are master indices: `(group, child)` addresses
//! child `child` of group `group`. The click hooks take visible positions.
//!
//! ## Implicit Propagation
//!
//! | Flag | Effect |
//! |------|--------|
//! | `implicit_enable_propagation` | setting a group's enablement sets all its children to the same value |
//! | `implicit_state_propagation` | setting an enabled group's state sets all its enabled children to the same state |
//!
//! Propagated state is validated against the children's number of states
//! before anything changes.
//!
//! ## Selection Scope
//!
//! [`SelectionScope`] restricts which level may be selected. Selection calls
//! on the other level fail with `IllegalState`; clicks and auto-adaptation
//! there skip selection.
//!
//! ## Empty-Group Filter
//!
//! The synthetic filter with key `("", FLAG_FILTER_EMPTY_GROUPS)` hides groups
//! whose children are all filtered out. It is owned by the engine: callers
//! request it through the `filter_empty_groups` argument of the child filter
//! calls or [`ExpandableList::filter_empty_groups`], never through the group
//! filter calls. While active it is reset and re-applied once after every
//! batch of child filter changes and after every child add/remove, so it
//! always reflects the current child visibility.

use crate::click::ClickOutcome;
use crate::collection::ListModel;
use crate::config::{ExpandableConfig, ListConfig};
use crate::error::{check_index, ListError, Result};
use crate::filter::{filterable_matcher, FilterKey, Filterable, Matcher};
use crate::group::Group;
use crate::observer::{ListObserver, ObserverId};
use crate::selection::ChoiceMode;
use crate::snapshot::ListSnapshot;
use crate::view::Row;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionScope {
    Groups,
    Children,
    #[default]
    GroupsAndChildren,
}

impl SelectionScope {
    pub fn allows_groups(self) -> bool {
        self != Self::Children
    }

    pub fn allows_children(self) -> bool {
        self != Self::Groups
    }
}

/// One rendered row of an expandable list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandableRow<'a, G, C> {
    Group {
        row: Row<'a, G>,
        expanded: bool,
        /// Number of visible children.
        children: usize,
    },
    Child {
        /// Master index of the owning group.
        group: usize,
        row: Row<'a, C>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandableSnapshot {
    pub groups: ListSnapshot,
    /// One per group, in master order.
    pub children: Vec<ListSnapshot>,
    pub expanded: Vec<bool>,
    pub child_config: ListConfig,
    /// Child filters applied to every group, in application order.
    #[serde(default)]
    pub child_filters: Vec<FilterKey>,
    pub selection_scope: SelectionScope,
    pub expand_group_on_click: bool,
    pub implicit_enable_propagation: bool,
    pub implicit_state_propagation: bool,
}

pub struct ExpandableList<G, C> {
    groups: ListModel<Group<G, C>>,
    child_config: ListConfig,
    child_matcher: Option<Matcher<C>>,
    /// Child filters applied to every group, replayed on groups added later.
    child_filters: Vec<(FilterKey, Option<Matcher<C>>)>,
    selection_scope: SelectionScope,
    expand_group_on_click: bool,
    implicit_enable_propagation: bool,
    implicit_state_propagation: bool,
}

impl<G, C> Default for ExpandableList<G, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Filterable + 'static, C: Filterable + 'static> ExpandableList<G, C> {
    /// A list whose group and child data match filter queries on their own.
    pub fn filterable() -> Self {
        let mut list = Self::new();
        list.set_group_matcher(Some(filterable_matcher()));
        list.set_child_matcher(Some(filterable_matcher()));
        list
    }
}

impl<G, C> ExpandableList<G, C> {
    pub fn new() -> Self {
        let defaults = ExpandableConfig::default();
        Self {
            groups: ListModel::new(),
            child_config: defaults.children,
            child_matcher: None,
            child_filters: Vec::new(),
            selection_scope: defaults.selection_scope,
            expand_group_on_click: defaults.expand_group_on_click,
            implicit_enable_propagation: defaults.implicit_enable_propagation,
            implicit_state_propagation: defaults.implicit_state_propagation,
        }
    }

    /// Applies `config` to an empty list. Groups added later get children
    /// configured with `config.children`.
    pub fn with_config(config: &ExpandableConfig) -> Result<Self> {
        config.validate()?;
        let mut list = Self::new();
        list.groups.apply_config(&config.groups)?;
        list.child_config = config.children.clone();
        list.selection_scope = config.selection_scope;
        list.expand_group_on_click = config.expand_group_on_click;
        list.implicit_enable_propagation = config.implicit_enable_propagation;
        list.implicit_state_propagation = config.implicit_state_propagation;
        list.apply_selection_scope();
        Ok(list)
    }

    /// The current policies. Child policies are those of the template.
    pub fn config(&self) -> ExpandableConfig {
        ExpandableConfig {
            groups: self.groups.config(),
            children: self.child_config.clone(),
            selection_scope: self.selection_scope,
            expand_group_on_click: self.expand_group_on_click,
            implicit_enable_propagation: self.implicit_enable_propagation,
            implicit_state_propagation: self.implicit_state_propagation,
        }
    }

    /// The outer model, for group-level queries.
    pub fn groups(&self) -> &ListModel<Group<G, C>> {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group(&self, group: usize) -> Result<&G> {
        Ok(self.groups.get(group)?.data())
    }

    pub fn children(&self, group: usize) -> Result<&ListModel<C>> {
        Ok(self.groups.get(group)?.children())
    }

    pub fn child(&self, group: usize, child: usize) -> Result<&C> {
        self.children(group)?.get(child)
    }

    pub fn child_count(&self, group: usize) -> Result<usize> {
        Ok(self.children(group)?.len())
    }

    pub(crate) fn children_mut(&mut self, group: usize) -> Result<&mut ListModel<C>> {
        check_index(group, self.groups.items.len())?;
        Ok(self.groups.items[group].data_mut().children_mut())
    }

    fn each_children_mut(&mut self) -> impl Iterator<Item = &mut ListModel<C>> + '_ {
        self.groups
            .items
            .iter_mut()
            .map(|item| item.data_mut().children_mut())
    }

    pub fn add_group_observer(
        &mut self,
        observer: Box<dyn ListObserver<Group<G, C>>>,
    ) -> ObserverId {
        self.groups.add_observer(observer)
    }

    pub fn remove_group_observer(&mut self, id: ObserverId) -> bool {
        self.groups.remove_observer(id)
    }

    pub fn add_child_observer(
        &mut self,
        group: usize,
        observer: Box<dyn ListObserver<C>>,
    ) -> Result<ObserverId> {
        Ok(self.children_mut(group)?.add_observer(observer))
    }

    pub fn selection_scope(&self) -> SelectionScope {
        self.selection_scope
    }

    /// Clears the selection of a level the new scope excludes.
    pub fn set_selection_scope(&mut self, scope: SelectionScope) {
        if self.selection_scope == scope {
            return;
        }
        tracing::debug!(?scope, "Selection scope changed");
        self.selection_scope = scope;
        self.apply_selection_scope();
    }

    fn apply_selection_scope(&mut self) {
        let scope = self.selection_scope;
        self.groups.set_selectable(scope.allows_groups());
        for children in self.each_children_mut() {
            children.set_selectable(scope.allows_children());
        }
    }

    pub fn expands_group_on_click(&self) -> bool {
        self.expand_group_on_click
    }

    pub fn set_expand_group_on_click(&mut self, expand: bool) {
        self.expand_group_on_click = expand;
    }

    pub fn has_implicit_enable_propagation(&self) -> bool {
        self.implicit_enable_propagation
    }

    pub fn set_implicit_enable_propagation(&mut self, propagate: bool) {
        self.implicit_enable_propagation = propagate;
    }

    pub fn has_implicit_state_propagation(&self) -> bool {
        self.implicit_state_propagation
    }

    pub fn set_implicit_state_propagation(&mut self, propagate: bool) {
        self.implicit_state_propagation = propagate;
    }

    // Enablement

    pub fn is_group_enabled(&self, group: usize) -> Result<bool> {
        self.groups.is_enabled(group)
    }

    pub fn is_child_enabled(&self, group: usize, child: usize) -> Result<bool> {
        self.children(group)?.is_enabled(child)
    }

    /// Sets the group's flag and, with implicit propagation, every child's.
    /// Children follow even when the group flag was already set.
    pub fn set_group_enabled(&mut self, group: usize, enabled: bool) -> Result<bool> {
        let mut changed = self.groups.set_enabled(group, enabled)?;
        if self.implicit_enable_propagation {
            changed |= self.children_mut(group)?.set_all_enabled(enabled);
        }
        Ok(changed)
    }

    pub fn trigger_group_enabled(&mut self, group: usize) -> Result<bool> {
        let enabled = !self.groups.is_enabled(group)?;
        self.set_group_enabled(group, enabled)?;
        Ok(enabled)
    }

    pub fn set_all_groups_enabled(&mut self, enabled: bool) -> bool {
        let mut changed = self.groups.set_all_enabled(enabled);
        if self.implicit_enable_propagation {
            for children in self.each_children_mut() {
                changed |= children.set_all_enabled(enabled);
            }
        }
        changed
    }

    pub fn set_child_enabled(&mut self, group: usize, child: usize, enabled: bool) -> Result<bool> {
        self.children_mut(group)?.set_enabled(child, enabled)
    }

    pub fn trigger_child_enabled(&mut self, group: usize, child: usize) -> Result<bool> {
        self.children_mut(group)?.trigger_enabled(child)
    }

    pub fn set_all_children_enabled(&mut self, group: usize, enabled: bool) -> Result<bool> {
        Ok(self.children_mut(group)?.set_all_enabled(enabled))
    }

    // Item state

    pub fn number_of_group_states(&self) -> usize {
        self.groups.number_of_states()
    }

    pub fn set_number_of_group_states(&mut self, number_of_states: usize) -> Result<()> {
        self.groups.set_number_of_states(number_of_states)
    }

    pub fn number_of_child_states(&self) -> usize {
        self.child_config.number_of_states
    }

    /// Applies to the template and to every existing group.
    pub fn set_number_of_child_states(&mut self, number_of_states: usize) -> Result<()> {
        if number_of_states == 0 {
            return Err(ListError::InvalidArgument(
                "number of states must be at least 1".to_string(),
            ));
        }
        self.child_config.number_of_states = number_of_states;
        for children in self.each_children_mut() {
            children.set_number_of_states(number_of_states)?;
        }
        Ok(())
    }

    pub fn group_state(&self, group: usize) -> Result<usize> {
        self.groups.state(group)
    }

    pub fn child_state(&self, group: usize, child: usize) -> Result<usize> {
        self.children(group)?.state(child)
    }

    fn propagates_state_to(&self, group: usize) -> bool {
        self.implicit_state_propagation && self.groups.items[group].is_enabled()
    }

    /// Sets the group's state and, with implicit propagation, every child's.
    pub fn set_group_state(&mut self, group: usize, state: usize) -> Result<bool> {
        check_index(group, self.groups.len())?;
        self.groups.check_state(state)?;
        let propagate = self.propagates_state_to(group);
        if propagate {
            self.children(group)?.check_state(state)?;
        }

        let mut changed = self.groups.set_state(group, state)?;
        if propagate {
            changed |= self.children_mut(group)?.set_all_states(state)?;
        }
        Ok(changed)
    }

    /// Advances the group's state. Returns the previous state, or `None` if
    /// the group is disabled.
    pub fn trigger_group_state(&mut self, group: usize) -> Result<Option<usize>> {
        check_index(group, self.groups.len())?;
        if !self.propagates_state_to(group) {
            return self.groups.trigger_state(group);
        }

        let next = (self.groups.state(group)? + 1) % self.groups.number_of_states();
        self.children(group)?.check_state(next)?;
        let previous = self.groups.trigger_state(group)?;
        self.children_mut(group)?.set_all_states(next)?;
        Ok(previous)
    }

    pub fn set_all_group_states(&mut self, state: usize) -> Result<bool> {
        self.groups.check_state(state)?;
        let targets: Vec<usize> = (0..self.groups.len())
            .filter(|&group| self.propagates_state_to(group))
            .collect();
        for &group in &targets {
            self.children(group)?.check_state(state)?;
        }

        let mut changed = self.groups.set_all_states(state)?;
        for group in targets {
            changed |= self.children_mut(group)?.set_all_states(state)?;
        }
        Ok(changed)
    }

    pub fn set_child_state(&mut self, group: usize, child: usize, state: usize) -> Result<bool> {
        self.children_mut(group)?.set_state(child, state)
    }

    pub fn trigger_child_state(&mut self, group: usize, child: usize) -> Result<Option<usize>> {
        self.children_mut(group)?.trigger_state(child)
    }

    pub fn set_all_child_states(&mut self, group: usize, state: usize) -> Result<bool> {
        self.children_mut(group)?.set_all_states(state)
    }

    // Selection

    fn require_group_scope(&self) -> Result<()> {
        if !self.selection_scope.allows_groups() {
            return Err(ListError::IllegalState(format!(
                "groups are not selectable in {:?} scope",
                self.selection_scope
            )));
        }
        Ok(())
    }

    fn require_child_scope(&self) -> Result<()> {
        if !self.selection_scope.allows_children() {
            return Err(ListError::IllegalState(format!(
                "children are not selectable in {:?} scope",
                self.selection_scope
            )));
        }
        Ok(())
    }

    pub fn group_choice_mode(&self) -> ChoiceMode {
        self.groups.choice_mode()
    }

    pub fn set_group_choice_mode(&mut self, mode: ChoiceMode) {
        self.groups.set_choice_mode(mode);
    }

    pub fn child_choice_mode(&self) -> ChoiceMode {
        self.child_config.choice_mode
    }

    /// Applies to the template and to every existing group. Each group
    /// keeps its own selection: single choice allows one selected child per
    /// group.
    pub fn set_child_choice_mode(&mut self, mode: ChoiceMode) {
        self.child_config.choice_mode = mode;
        for children in self.each_children_mut() {
            children.set_choice_mode(mode);
        }
    }

    pub fn is_group_selected(&self, group: usize) -> Result<bool> {
        self.groups.is_selected(group)
    }

    pub fn is_child_selected(&self, group: usize, child: usize) -> Result<bool> {
        self.children(group)?.is_selected(child)
    }

    pub fn selected_group_indices(&self) -> Vec<usize> {
        self.groups.selected_indices()
    }

    /// `(group, child)` pairs of every selected child, in master order.
    pub fn selected_children(&self) -> Vec<(usize, usize)> {
        self.groups
            .items
            .iter()
            .enumerate()
            .flat_map(|(group, item)| {
                item.data()
                    .children()
                    .selected_indices()
                    .into_iter()
                    .map(move |child| (group, child))
            })
            .collect()
    }

    pub fn select_group(&mut self, group: usize) -> Result<bool> {
        self.require_group_scope()?;
        self.groups.select(group)
    }

    pub fn set_group_selected(&mut self, group: usize, selected: bool) -> Result<bool> {
        self.require_group_scope()?;
        self.groups.set_selected(group, selected)
    }

    pub fn trigger_group_selection(&mut self, group: usize) -> Result<bool> {
        self.require_group_scope()?;
        self.groups.trigger_selection(group)
    }

    pub fn select_child(&mut self, group: usize, child: usize) -> Result<bool> {
        self.require_child_scope()?;
        self.children_mut(group)?.select(child)
    }

    pub fn set_child_selected(
        &mut self,
        group: usize,
        child: usize,
        selected: bool,
    ) -> Result<bool> {
        self.require_child_scope()?;
        self.children_mut(group)?.set_selected(child, selected)
    }

    pub fn trigger_child_selection(&mut self, group: usize, child: usize) -> Result<bool> {
        self.require_child_scope()?;
        self.children_mut(group)?.trigger_selection(child)
    }

    /// Unselects every group and every child.
    pub fn clear_selection(&mut self) -> bool {
        let mut changed = self.groups.clear_selection();
        for children in self.each_children_mut() {
            changed |= children.clear_selection();
        }
        changed
    }

    // Expansion

    pub fn is_group_expanded(&self, group: usize) -> Result<bool> {
        Ok(self.groups.get(group)?.is_expanded())
    }

    pub fn set_group_expanded(&mut self, group: usize, expanded: bool) -> Result<bool> {
        check_index(group, self.groups.len())?;
        let changed = self.apply_expanded(group, expanded);
        if changed {
            self.groups.redraw();
        }
        Ok(changed)
    }

    pub fn expand_group(&mut self, group: usize) -> Result<bool> {
        self.set_group_expanded(group, true)
    }

    pub fn collapse_group(&mut self, group: usize) -> Result<bool> {
        self.set_group_expanded(group, false)
    }

    /// Flips the expansion and returns the resulting value.
    pub fn trigger_group_expansion(&mut self, group: usize) -> Result<bool> {
        let expanded = !self.is_group_expanded(group)?;
        self.set_group_expanded(group, expanded)?;
        Ok(expanded)
    }

    pub fn expand_all(&mut self) -> bool {
        self.set_all_expanded(true)
    }

    pub fn collapse_all(&mut self) -> bool {
        self.set_all_expanded(false)
    }

    fn set_all_expanded(&mut self, expanded: bool) -> bool {
        let mut changed = false;
        for group in 0..self.groups.len() {
            changed |= self.apply_expanded(group, expanded);
        }
        if changed {
            self.groups.redraw();
        }
        changed
    }

    fn apply_expanded(&mut self, group: usize, expanded: bool) -> bool {
        let entry = self.groups.items[group].data_mut();
        if entry.is_expanded() == expanded {
            return false;
        }
        entry.set_expanded(expanded);
        tracing::trace!(group, expanded, "Group expansion changed");
        true
    }

    // Filtering

    pub fn is_filtering_empty_groups(&self) -> bool {
        let key = FilterKey::empty_groups();
        self.groups.is_filter_applied(&key.query, key.flags)
    }

    pub fn is_group_filter_applied(&self, query: &str, flags: u32) -> bool {
        self.groups.is_filter_applied(query, flags)
    }

    /// Caller-applied group filters, without the synthetic one.
    pub fn active_group_filters(&self) -> Vec<FilterKey> {
        self.groups
            .active_filters()
            .into_iter()
            .filter(|key| !key.is_reserved())
            .collect()
    }

    fn reject_reserved(query: &str, flags: u32) -> Result<()> {
        if FilterKey::new(query, flags).is_reserved() {
            return Err(ListError::InvalidArgument(
                "the empty-group filter key is reserved".to_string(),
            ));
        }
        Ok(())
    }

    pub fn reset_group_filter(&mut self, query: &str, flags: u32) -> Result<bool> {
        Self::reject_reserved(query, flags)?;
        Ok(self.groups.reset_filter(query, flags))
    }

    /// Removes the synthetic empty-group filter.
    pub fn reset_empty_group_filter(&mut self) -> bool {
        let reset = self.groups.reset_filter_key(&FilterKey::empty_groups());
        if reset {
            self.groups.redraw();
        }
        reset
    }

    // Rendering and clicks

    /// Visible groups, each followed by its visible children when expanded.
    pub fn rows(&self) -> Vec<ExpandableRow<'_, G, C>> {
        let mut rows = Vec::new();
        for row in self.groups.rows() {
            let group = row.data;
            rows.push(ExpandableRow::Group {
                row: Row {
                    data: group.data(),
                    index: row.index,
                    enabled: row.enabled,
                    state: row.state,
                    selected: row.selected,
                    filtered: row.filtered,
                },
                expanded: group.is_expanded(),
                children: group.children().visible_len(),
            });
            if group.is_expanded() {
                rows.extend(
                    group
                        .children()
                        .rows()
                        .map(|child| ExpandableRow::Child {
                            group: row.index,
                            row: child,
                        }),
                );
            }
        }
        rows
    }

    /// Click on the group at visible `position`. Besides the item policies,
    /// an enabled group toggles its expansion when `expand_group_on_click`
    /// is set. A state advanced by the click propagates like
    /// [`ExpandableList::set_group_state`], and fails the same way before
    /// anything changes when the children can not hold the new state.
    pub fn on_group_clicked(&mut self, position: usize) -> Result<ClickOutcome> {
        let group = self.groups.master_index(position)?;
        let propagate = self.groups.triggers_state_on_click() && self.propagates_state_to(group);
        if propagate {
            let next = (self.groups.state(group)? + 1) % self.groups.number_of_states();
            self.children(group)?.check_state(next)?;
        }

        let mut outcome = self.groups.click_at(group);
        if self.expand_group_on_click && self.groups.items[group].is_enabled() {
            let expanded = !self.groups.items[group].data().is_expanded();
            self.apply_expanded(group, expanded);
            outcome.expanded = Some(expanded);
        }
        if propagate && outcome.previous_state.is_some() {
            let state = self.groups.state(group)?;
            self.children_mut(group)?.set_all_states(state)?;
        }

        if outcome.changed() {
            self.groups.redraw();
        }
        Ok(outcome)
    }

    /// Click on a child, both arguments being visible positions.
    pub fn on_child_clicked(
        &mut self,
        group_position: usize,
        child_position: usize,
    ) -> Result<ClickOutcome> {
        let group = self.groups.master_index(group_position)?;
        let children = self.children_mut(group)?;
        let child = children.master_index(child_position)?;

        let outcome = children.click_at(child);
        if outcome.changed() {
            children.redraw();
        }
        Ok(outcome)
    }

    pub fn snapshot(&self) -> ExpandableSnapshot {
        ExpandableSnapshot {
            groups: self.groups.snapshot(),
            children: self
                .groups
                .items
                .iter()
                .map(|item| item.data().children().snapshot())
                .collect(),
            expanded: self
                .groups
                .items
                .iter()
                .map(|item| item.data().is_expanded())
                .collect(),
            child_config: self.child_config.clone(),
            child_filters: self.child_filters.iter().map(|(key, _)| key.clone()).collect(),
            selection_scope: self.selection_scope,
            expand_group_on_click: self.expand_group_on_click,
            implicit_enable_propagation: self.implicit_enable_propagation,
            implicit_state_propagation: self.implicit_state_propagation,
        }
    }
}

impl<G: 'static, C: 'static> ExpandableList<G, C> {
    /// The matcher used by group filters applied without an explicit one.
    pub fn set_group_matcher(&mut self, matcher: Option<Matcher<G>>) {
        self.groups
            .set_default_matcher(matcher.map(Self::wrap_group_matcher));
    }

    /// The default matcher of every group's children, present and future.
    pub fn set_child_matcher(&mut self, matcher: Option<Matcher<C>>) {
        for children in self.each_children_mut() {
            children.set_default_matcher(matcher.clone());
        }
        self.child_matcher = matcher;
    }

    fn wrap_group_matcher(matcher: Matcher<G>) -> Matcher<Group<G, C>> {
        Rc::new(move |group: &Group<G, C>, query: &str, flags: u32| {
            matcher(group.data(), query, flags)
        })
    }

    fn empty_group_matcher() -> Matcher<Group<G, C>> {
        Rc::new(|group: &Group<G, C>, _query: &str, _flags: u32| {
            group.children().visible_len() > 0
        })
    }

    pub fn apply_group_filter(
        &mut self,
        query: &str,
        flags: u32,
        matcher: Option<Matcher<G>>,
    ) -> Result<Option<Vec<usize>>> {
        Self::reject_reserved(query, flags)?;
        self.groups
            .apply_filter(query, flags, matcher.map(Self::wrap_group_matcher))
    }

    /// Applies the synthetic empty-group filter, or re-applies it if it is
    /// already active.
    pub fn filter_empty_groups(&mut self) -> Result<bool> {
        self.sync_empty_group_filter(true)
    }

    /// Re-applies the synthetic filter if it is active, or applies it if
    /// `force` is set. Returns whether it ended up applied.
    fn sync_empty_group_filter(&mut self, force: bool) -> Result<bool> {
        let key = FilterKey::empty_groups();
        let active = self.groups.is_filter_applied(&key.query, key.flags);
        if !active && !force {
            return Ok(false);
        }

        if active {
            self.groups.drop_filter(&key);
        }
        let applied = self
            .groups
            .apply_filter_key(key, Some(Self::empty_group_matcher()))?;
        self.groups.redraw();
        Ok(applied)
    }

    fn check_child_matcher(&self, matcher: &Option<Matcher<C>>) -> Result<()> {
        if matcher.is_none() && self.child_matcher.is_none() {
            return Err(ListError::FilteringUnsupported(
                "no matcher available for child filters".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies a child filter to every group, including groups added
    /// later, then recomputes the empty-group filter once if it is active or
    /// `filter_empty_groups` is set. Returns whether any group applied it.
    pub fn apply_child_filter(
        &mut self,
        filter_empty_groups: bool,
        query: &str,
        flags: u32,
        matcher: Option<Matcher<C>>,
    ) -> Result<bool> {
        self.check_child_matcher(&matcher)?;

        let key = FilterKey::new(query, flags);
        let mut applied = false;
        for children in self.each_children_mut() {
            if children.apply_filter_key(key.clone(), matcher.clone())? {
                children.redraw();
                applied = true;
            }
        }
        if !self.child_filters.iter().any(|(active, _)| *active == key) {
            self.child_filters.push((key, matcher));
        }
        self.sync_empty_group_filter(filter_empty_groups)?;
        Ok(applied)
    }

    /// Applies a child filter to one group only. Groups added later do not
    /// inherit it.
    pub fn apply_child_filter_in(
        &mut self,
        group: usize,
        filter_empty_groups: bool,
        query: &str,
        flags: u32,
        matcher: Option<Matcher<C>>,
    ) -> Result<Option<Vec<usize>>> {
        let visible = self.children_mut(group)?.apply_filter(query, flags, matcher)?;
        self.sync_empty_group_filter(filter_empty_groups)?;
        Ok(visible)
    }

    /// Resets a child filter in every group, then recomputes the empty-group
    /// filter once.
    pub fn reset_child_filter(
        &mut self,
        filter_empty_groups: bool,
        query: &str,
        flags: u32,
    ) -> Result<bool> {
        let key = FilterKey::new(query, flags);
        let mut reset = false;
        for children in self.each_children_mut() {
            if children.reset_filter_key(&key) {
                children.redraw();
                reset = true;
            }
        }
        self.child_filters.retain(|(active, _)| *active != key);
        self.sync_empty_group_filter(filter_empty_groups)?;
        Ok(reset)
    }

    pub fn reset_child_filter_in(
        &mut self,
        group: usize,
        filter_empty_groups: bool,
        query: &str,
        flags: u32,
    ) -> Result<bool> {
        let reset = self.children_mut(group)?.reset_filter(query, flags);
        self.sync_empty_group_filter(filter_empty_groups)?;
        Ok(reset)
    }

    /// Restores `snapshot` onto the same groups and children. Everything is
    /// validated first; children are restored before the groups so the
    /// empty-group filter sees the restored child visibility.
    pub fn restore(&mut self, snapshot: &ExpandableSnapshot) -> Result<()> {
        let count = self.groups.len();
        if snapshot.children.len() != count || snapshot.expanded.len() != count {
            return Err(ListError::InvalidArgument(format!(
                "snapshot holds {} child lists and {} expansion flags for {} groups",
                snapshot.children.len(),
                snapshot.expanded.len(),
                count
            )));
        }
        snapshot.child_config.validate()?;

        let synthetic = Self::empty_group_matcher();
        let group_filters = self.groups.prepare_restore(&snapshot.groups, |key| {
            key.is_reserved().then(|| synthetic.clone())
        })?;
        let mut child_filters = Vec::with_capacity(count);
        for (item, child) in self.groups.items.iter().zip(&snapshot.children) {
            child_filters.push(item.data().children().prepare_restore(child, |_| None)?);
        }
        let mut template = Vec::with_capacity(snapshot.child_filters.len());
        for key in &snapshot.child_filters {
            let matcher = self
                .child_filters
                .iter()
                .find(|(active, _)| active == key)
                .and_then(|(_, matcher)| matcher.clone());
            self.check_child_matcher(&matcher)?;
            template.push((key.clone(), matcher));
        }

        self.child_config = snapshot.child_config.clone();
        self.child_filters = template;
        self.selection_scope = snapshot.selection_scope;
        self.expand_group_on_click = snapshot.expand_group_on_click;
        self.implicit_enable_propagation = snapshot.implicit_enable_propagation;
        self.implicit_state_propagation = snapshot.implicit_state_propagation;

        let children = snapshot.children.iter().zip(&snapshot.expanded);
        for ((item, (child, &expanded)), filters) in
            self.groups.items.iter_mut().zip(children).zip(child_filters)
        {
            let group = item.data_mut();
            group.children_mut().commit_restore(child, filters);
            group.set_expanded(expanded);
        }
        self.groups.commit_restore(&snapshot.groups, group_filters);
        self.apply_selection_scope();
        Ok(())
    }
}

impl<G: PartialEq + 'static, C: PartialEq + 'static> ExpandableList<G, C> {
    fn new_children(&self) -> Result<ListModel<C>> {
        let mut children = ListModel::with_config(&self.child_config)?;
        children.set_default_matcher(self.child_matcher.clone());
        children.selectable = self.selection_scope.allows_children();
        for (key, matcher) in &self.child_filters {
            children.apply_filter_key(key.clone(), matcher.clone())?;
        }
        Ok(children)
    }

    pub fn group_index_of(&self, data: &G) -> Option<usize> {
        self.groups.iter().position(|group| group.data() == data)
    }

    fn require_group(&self, data: &G) -> Result<usize> {
        self.group_index_of(data).ok_or_else(|| {
            ListError::NoSuchElement("group is not part of the list".to_string())
        })
    }

    pub fn child_index_of(&self, group: usize, data: &C) -> Result<Option<usize>> {
        Ok(self.children(group)?.index_of(data))
    }

    /// Appends an empty group. Returns `Ok(false)` for a rejected duplicate.
    pub fn add_group(&mut self, data: G) -> Result<bool> {
        let index = self.groups.len();
        self.add_group_at(index, data)
    }

    pub fn add_group_at(&mut self, index: usize, data: G) -> Result<bool> {
        let children = self.new_children()?;
        self.groups.add_at(index, Group::new(data, children))
    }

    /// Appends a group together with its children.
    pub fn add_group_with<I>(&mut self, data: G, children: I) -> Result<bool>
    where
        I: IntoIterator<Item = C>,
    {
        let mut model = self.new_children()?;
        model.add_all(children)?;
        let index = self.groups.len();
        self.groups.add_at(index, Group::new(data, model))
    }

    /// Removes a group with all its children and returns its data.
    pub fn remove_group_at(&mut self, group: usize) -> Result<G> {
        Ok(self.groups.remove_at(group)?.into_data())
    }

    pub fn remove_group(&mut self, data: &G) -> Result<bool> {
        match self.group_index_of(data) {
            Some(group) => {
                self.remove_group_at(group)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn add_child(&mut self, group: usize, data: C) -> Result<bool> {
        let index = self.child_count(group)?;
        self.add_child_at(group, index, data)
    }

    pub fn add_child_at(&mut self, group: usize, index: usize, data: C) -> Result<bool> {
        let added = self.children_mut(group)?.add_at(index, data)?;
        if added {
            self.sync_empty_group_filter(false)?;
        }
        Ok(added)
    }

    /// Appends a child to the group equal to `group`, or fails with
    /// `NoSuchElement`.
    pub fn add_child_to(&mut self, group: &G, data: C) -> Result<bool> {
        let group = self.require_group(group)?;
        self.add_child(group, data)
    }

    pub fn remove_child_at(&mut self, group: usize, child: usize) -> Result<C> {
        let removed = self.children_mut(group)?.remove_at(child)?;
        self.sync_empty_group_filter(false)?;
        Ok(removed)
    }

    pub fn remove_child(&mut self, group: usize, data: &C) -> Result<bool> {
        let removed = self.children_mut(group)?.remove(data)?;
        if removed {
            self.sync_empty_group_filter(false)?;
        }
        Ok(removed)
    }

    pub fn replace_child_at(&mut self, group: usize, child: usize, data: C) -> Result<C> {
        let previous = self.children_mut(group)?.replace_at(child, data)?;
        self.sync_empty_group_filter(false)?;
        Ok(previous)
    }
}

//! Groups of a two-level hierarchy.
//!
//! A [`Group`] is the data of one row of the outer collection: the group's
//! own data plus an exclusively owned child [`ListModel`] with its own
//! layers. The group's enable/state/selection flags live on the outer
//! collection's item, like any other item's.

use crate::collection::ListModel;
use std::fmt;

pub struct Group<G, C> {
    data: G,
    children: ListModel<C>,
    expanded: bool,
}

impl<G, C> Group<G, C> {
    pub(crate) fn new(data: G, children: ListModel<C>) -> Self {
        Self {
            data,
            children,
            expanded: false,
        }
    }

    pub fn data(&self) -> &G {
        &self.data
    }

    pub fn into_data(self) -> G {
        self.data
    }

    pub fn children(&self) -> &ListModel<C> {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut ListModel<C> {
        &mut self.children
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub(crate) fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }
}

/// Groups are identified by their data alone.
impl<G: PartialEq, C> PartialEq for Group<G, C> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<G: fmt::Display, C> fmt::Display for Group<G, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.data.fmt(f)
    }
}

impl<G: fmt::Debug, C> fmt::Debug for Group<G, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("data", &self.data)
            .field("children", &self.children.len())
            .field("expanded", &self.expanded)
            .finish()
    }
}

//! Rendering boundary.
//!
//! A renderer addresses rows by *visible* position. Each [`Row`] carries the
//! resolved data plus every flag a decorator needs, so the renderer never
//! has to know about the layers behind it.

use crate::collection::ListModel;
use crate::error::{ListError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<'a, T> {
    pub data: &'a T,
    pub index: usize,
    pub enabled: bool,
    pub state: usize,
    pub selected: bool,
    /// Whether the owning model has any filter applied.
    pub filtered: bool,
}

impl<T> ListModel<T> {
    pub fn visible_len(&self) -> usize {
        self.filters.visible().len()
    }

    /// Ascending master indices of the visible items.
    pub fn visible_indices(&self) -> &[usize] {
        self.filters.visible()
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.filters.is_visible(index)
    }

    /// Master index of the row at `position`.
    pub fn master_index(&self, position: usize) -> Result<usize> {
        self.filters
            .visible()
            .get(position)
            .copied()
            .ok_or(ListError::IndexOutOfRange {
                index: position,
                len: self.visible_len(),
            })
    }

    /// Visible position of a master index, or `None` if it is filtered out.
    pub fn visible_position(&self, index: usize) -> Option<usize> {
        self.filters.visible_position(index)
    }

    pub fn visible_items(&self) -> Vec<&T> {
        self.filters
            .visible()
            .iter()
            .map(|&i| self.items[i].data())
            .collect()
    }

    pub fn row(&self, position: usize) -> Result<Row<'_, T>> {
        let index = self.master_index(position)?;
        Ok(self.row_at(index))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_, T>> + '_ {
        self.filters.visible().iter().map(|&i| self.row_at(i))
    }

    fn row_at(&self, index: usize) -> Row<'_, T> {
        let item = &self.items[index];
        Row {
            data: item.data(),
            index,
            enabled: item.is_enabled(),
            state: item.clamped_state(self.number_of_states),
            selected: item.is_selected(),
            filtered: self.filters.is_filtered(),
        }
    }
}

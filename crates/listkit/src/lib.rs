//! # Listkit Architecture
//!
//! Listkit is the **state engine behind list widgets**. It owns an ordered
//! collection of caller data and keeps four per-item concerns consistent
//! with each other: enablement, a bounded cyclic state, selection and
//! filtering. It does not render anything; a renderer reads rows from it and
//! reports clicks back.
//!
//! ## The Layered Model
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Boundaries (view.rs, click.rs, snapshot.rs)                 │
//! │  - Rows per visible position, click hooks, persistence data  │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Layers (enable.rs, state.rs, filter.rs, selection.rs)       │
//! │  - impl blocks over ListModel, master-index based            │
//! │  - Selection reconciles itself with the other three          │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Collection (collection.rs, item.rs)                         │
//! │  - Master-ordered items, never reordered by filters          │
//! │  - Observer notifications for every transition               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`ExpandableList`] stacks two of these: a model of groups, each owning a
//! model of children, plus implicit propagation and an engine-owned filter
//! hiding empty groups.
//!
//! ## Master and Visible Indices
//!
//! Layer operations take **master** indices: positions in the full,
//! unfiltered order. Filtering only computes the **visible subset**, the
//! ascending master indices that pass every active filter. Rendering and
//! click hooks take visible positions and translate them with
//! [`ListModel::master_index`]. Since flags live on master items, a change
//! made through a visible row survives any filter reset.
//!
//! ## Errors and No-ops
//!
//! Contract violations (bad index, state out of range, unknown item, missing
//! matcher, wrong choice mode) fail with a [`ListError`] before anything is
//! mutated. Policy no-ops (re-applying an active filter, selecting a
//! disabled item) return `Ok(false)`/`Ok(None)` and are reported only as
//! `tracing` debug events.
//!
//! ## Module Overview
//!
//! - [`collection`]: [`ListModel`], the master store and CRUD
//! - [`item`]: [`Item`] and its flags
//! - [`enable`], [`state`], [`filter`], [`selection`]: the layers
//! - [`observer`]: change notifications
//! - [`view`], [`click`], [`snapshot`]: rendering, click and persistence boundaries
//! - [`group`], [`expandable`]: the two-level hierarchy
//! - [`config`]: policies loadable from TOML
//! - [`error`]: error types

pub mod click;
pub mod collection;
pub mod config;
pub mod enable;
pub mod error;
pub mod expandable;
pub mod filter;
pub mod group;
pub mod item;
pub mod observer;
pub mod selection;
pub mod snapshot;
pub mod state;
pub mod view;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use click::ClickOutcome;
pub use collection::ListModel;
pub use config::{ExpandableConfig, ListConfig};
pub use error::{ListError, Result};
pub use expandable::{ExpandableList, ExpandableRow, ExpandableSnapshot, SelectionScope};
pub use filter::{filterable_matcher, FilterKey, Filterable, Matcher, FLAG_FILTER_EMPTY_GROUPS};
pub use group::Group;
pub use item::{Item, ItemFlags};
pub use observer::{ListObserver, ObserverId};
pub use selection::ChoiceMode;
pub use snapshot::ListSnapshot;
pub use view::Row;

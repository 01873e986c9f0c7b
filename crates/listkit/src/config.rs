//! # Configuration
//!
//! Engine policies are plain data managed by [`confique`], so they can be
//! loaded from TOML files as well as built in code.
//!
//! ## Resolution
//!
//! [`ListConfig::load`] layers, in priority order:
//! 1. **The given TOML file**, if present.
//! 2. **Compiled Defaults**: built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `allow_duplicates` | `false` | Whether equal data may be added twice |
//! | `notify_on_change` | `true` | Fire `on_redraw` after each mutating call |
//! | `number_of_states` | `1` | Size of the cyclic per-item state |
//! | `choice_mode` | `none` | `none`, `single` or `multiple` |
//! | `adapt_selection_automatically` | `true` | Keep a single-choice selection alive |
//! | `trigger_selection_on_click` | `true` | Clicks change the selection |
//! | `trigger_state_on_click` | `false` | Clicks advance the item state |
//!
//! [`ExpandableConfig`] nests one `ListConfig` for the groups and one applied
//! to every group's children:
//!
//! ```toml
//! selection_scope = "children"
//! implicit_enable_propagation = true
//!
//! [groups]
//! choice_mode = "single"
//!
//! [children]
//! choice_mode = "multiple"
//! number_of_states = 3
//! ```

use crate::error::{ListError, Result};
use crate::expandable::SelectionScope;
use crate::selection::ChoiceMode;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Policies of a single [`crate::collection::ListModel`].
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    #[config(default = false)]
    pub allow_duplicates: bool,

    #[config(default = true)]
    pub notify_on_change: bool,

    /// Must be at least 1.
    #[config(default = 1)]
    pub number_of_states: usize,

    #[config(default = "none")]
    pub choice_mode: ChoiceMode,

    #[config(default = true)]
    pub adapt_selection_automatically: bool,

    #[config(default = true)]
    pub trigger_selection_on_click: bool,

    #[config(default = false)]
    pub trigger_state_on_click: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            allow_duplicates: false,
            notify_on_change: true,
            number_of_states: 1,
            choice_mode: ChoiceMode::None,
            adapt_selection_automatically: true,
            trigger_selection_on_click: true,
            trigger_state_on_click: false,
        }
    }
}

impl ListConfig {
    /// Loads the config from a TOML file, falling back to defaults for
    /// missing keys.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::builder().file(path.as_ref()).load()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.number_of_states == 0 {
            return Err(ListError::InvalidArgument(
                "number_of_states must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Policies of a [`crate::expandable::ExpandableList`].
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExpandableConfig {
    #[config(nested)]
    pub groups: ListConfig,

    /// Applied to the child collection of every group added afterwards.
    #[config(nested)]
    pub children: ListConfig,

    #[config(default = "groups_and_children")]
    pub selection_scope: SelectionScope,

    #[config(default = true)]
    pub expand_group_on_click: bool,

    /// Mirror group enablement onto its children.
    #[config(default = false)]
    pub implicit_enable_propagation: bool,

    /// Mirror group state onto its children.
    #[config(default = false)]
    pub implicit_state_propagation: bool,
}

impl Default for ExpandableConfig {
    fn default() -> Self {
        Self {
            groups: ListConfig::default(),
            children: ListConfig::default(),
            selection_scope: SelectionScope::GroupsAndChildren,
            expand_group_on_click: true,
            implicit_enable_propagation: false,
            implicit_state_propagation: false,
        }
    }
}

impl ExpandableConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::builder().file(path.as_ref()).load()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.groups.validate()?;
        self.children.validate()
    }
}

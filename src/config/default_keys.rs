//! Default keybindings
//!
//! Used when no user configuration is present; user `[keys]` tables are merged on top.

use std::collections::HashMap;

use super::keys::{KeyCombo, KeyContext, KeybindingConfig};
use crate::ui::action::Action;

/// Helper to insert a keybinding
fn bind(map: &mut HashMap<KeyCombo, Action>, key: &str, action: Action) {
    if let Ok(combo) = key.parse() {
        map.insert(combo, action);
    }
}

/// Create the default keybindings configuration
pub fn default_keybindings() -> KeybindingConfig {
    let mut config = KeybindingConfig::new();

    // ========== Global ==========
    bind(&mut config.global, "C-c", Action::Quit);
    bind(&mut config.global, "q", Action::Quit);
    bind(&mut config.global, "r", Action::Refresh);
    bind(&mut config.global, "w", Action::DismissWarnings);
    bind(&mut config.global, "X", Action::ClearStoppedAgents);
    bind(&mut config.global, "<Tab>", Action::FocusNext);

    // ========== Selection columns ==========
    let matrix = config.context.entry(KeyContext::Matrix).or_default();
    bind(matrix, "j", Action::SelectNext);
    bind(matrix, "<Down>", Action::SelectNext);
    bind(matrix, "k", Action::SelectPrev);
    bind(matrix, "<Up>", Action::SelectPrev);
    bind(matrix, "<CR>", Action::Confirm);
    bind(matrix, "l", Action::Confirm);
    bind(matrix, "<Esc>", Action::Cancel);
    bind(matrix, "h", Action::Cancel);
    bind(matrix, "<BS>", Action::Cancel);

    // ========== Sidebar ==========
    let sidebar = config.context.entry(KeyContext::Sidebar).or_default();
    bind(sidebar, "j", Action::SelectNext);
    bind(sidebar, "<Down>", Action::SelectNext);
    bind(sidebar, "k", Action::SelectPrev);
    bind(sidebar, "<Up>", Action::SelectPrev);
    bind(sidebar, "<CR>", Action::Confirm);
    bind(sidebar, "l", Action::Expand);
    bind(sidebar, "<Right>", Action::Expand);
    bind(sidebar, "h", Action::Collapse);
    bind(sidebar, "<Left>", Action::Collapse);
    bind(sidebar, "x", Action::ClearAgent);
    bind(sidebar, "<Esc>", Action::Cancel);

    // ========== Confirm screen ==========
    let confirm = config.context.entry(KeyContext::Confirm).or_default();
    bind(confirm, "<CR>", Action::Confirm);
    bind(confirm, "y", Action::Confirm);
    bind(confirm, "<Esc>", Action::Cancel);
    bind(confirm, "n", Action::Cancel);

    // ========== Session output ==========
    let output = config.context.entry(KeyContext::Output).or_default();
    bind(output, "<Esc>", Action::Cancel);
    bind(output, "x", Action::ClearAgent);

    config
}

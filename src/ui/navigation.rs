//! Focus movement across the selection columns
//!
//! Advancing or retreating never lands on a disabled column and never moves focus when
//! no enabled column lies in that direction. The sidebar is only reachable through the
//! tab cycle.

use crate::ui::events::FocusColumn;

/// Which selection columns are currently disabled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisabledColumns([bool; 4]);

impl DisabledColumns {
    pub fn none() -> Self {
        Self::default()
    }

    fn slot(column: FocusColumn) -> Option<usize> {
        FocusColumn::SELECTION.iter().position(|c| *c == column)
    }

    pub fn is_disabled(&self, column: FocusColumn) -> bool {
        Self::slot(column).is_some_and(|i| self.0[i])
    }

    pub fn set(&mut self, column: FocusColumn, disabled: bool) {
        if let Some(i) = Self::slot(column) {
            self.0[i] = disabled;
        }
    }
}

/// First enabled selection column
pub fn first_enabled(disabled: DisabledColumns) -> Option<FocusColumn> {
    FocusColumn::SELECTION
        .into_iter()
        .find(|c| !disabled.is_disabled(*c))
}

/// Nearest enabled selection column after `current`
pub fn next_enabled(current: FocusColumn, disabled: DisabledColumns) -> Option<FocusColumn> {
    FocusColumn::SELECTION
        .into_iter()
        .find(|c| *c > current && !disabled.is_disabled(*c))
}

/// Nearest enabled selection column before `current`; never the sidebar
pub fn prev_enabled(current: FocusColumn, disabled: DisabledColumns) -> Option<FocusColumn> {
    FocusColumn::SELECTION
        .into_iter()
        .rev()
        .find(|c| *c < current && !disabled.is_disabled(*c))
}

pub fn advance(current: FocusColumn, disabled: DisabledColumns) -> FocusColumn {
    if current == FocusColumn::Sidebar {
        return current;
    }
    next_enabled(current, disabled).unwrap_or(current)
}

pub fn retreat(current: FocusColumn, disabled: DisabledColumns) -> FocusColumn {
    if current == FocusColumn::Sidebar {
        return current;
    }
    prev_enabled(current, disabled).unwrap_or(current)
}

/// Tab cycle: sidebar → first enabled column → … → last enabled column → sidebar
pub fn tab_next(current: FocusColumn, disabled: DisabledColumns) -> FocusColumn {
    match current {
        FocusColumn::Sidebar => first_enabled(disabled).unwrap_or(FocusColumn::Sidebar),
        column => next_enabled(column, disabled).unwrap_or(FocusColumn::Sidebar),
    }
}

//! Selectable-list adapters and the column widget that draws them.
//!
//! A [`SelectList`] is a read-only snapshot of one selectable domain (work items,
//! harnesses, models, execution modes) plus a highlight cursor. The reducer replaces the
//! snapshot whenever the underlying data changes; the list never originates data.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget, Wrap},
};

use crate::data::{Harness, WorkItem};

use super::theme::{
    ACCENT_PRIMARY, BORDER_DEFAULT, BORDER_DISABLED, FLASH_BG, SELECTED_BG, SELECTED_BG_DIM,
    TEXT_MUTED, TEXT_PRIMARY,
};

/// Display text for an entry in a selection column
pub trait ListEntry {
    fn label(&self) -> String;

    /// Secondary text shown dimmed after the label
    fn detail(&self) -> Option<String> {
        None
    }
}

impl ListEntry for WorkItem {
    fn label(&self) -> String {
        format!("{} {}", self.id, self.title)
    }

    fn detail(&self) -> Option<String> {
        (!self.status.is_empty()).then(|| format!("P{} {}", self.priority, self.status))
    }
}

impl ListEntry for Harness {
    fn label(&self) -> String {
        self.name.clone()
    }
}

impl ListEntry for String {
    fn label(&self) -> String {
        self.clone()
    }
}

/// Highlight cursor over a snapshot of items
#[derive(Debug, Clone)]
pub struct SelectList<T> {
    items: Vec<T>,
    selected: usize,
}

impl<T> Default for SelectList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
        }
    }
}

impl<T> SelectList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, selected: 0 }
    }

    /// Replace the snapshot, keeping the cursor in range
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = 0;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currently highlighted item
    pub fn selected(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }
}

/// One selection column
pub struct SelectColumn<'a, T> {
    list: &'a SelectList<T>,
    title: &'a str,
    focused: bool,
    disabled: bool,
    /// Pinned value shown when the column is disabled
    value: Option<&'a str>,
    /// Text shown instead of an empty list
    empty_message: &'a str,
    flash: f32,
}

impl<'a, T: ListEntry> SelectColumn<'a, T> {
    pub fn new(list: &'a SelectList<T>, title: &'a str) -> Self {
        Self {
            list,
            title,
            focused: false,
            disabled: false,
            value: None,
            empty_message: "(none)",
            flash: 0.0,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn disabled(mut self, disabled: bool, value: Option<&'a str>) -> Self {
        self.disabled = disabled;
        self.value = value;
        self
    }

    pub fn empty_message(mut self, message: &'a str) -> Self {
        self.empty_message = message;
        self
    }

    pub fn flash(mut self, level: f32) -> Self {
        self.flash = level;
        self
    }

    fn block(&self) -> Block<'a> {
        let border = if self.disabled {
            BORDER_DISABLED
        } else if self.focused {
            ACCENT_PRIMARY
        } else {
            BORDER_DEFAULT
        };
        let mut title = format!(" {} ", self.title);
        if !self.list.is_empty() && !self.disabled {
            title = format!(" {} ({}) ", self.title, self.list.len());
        }
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title)
    }
}

impl<T: ListEntry> Widget for SelectColumn<'_, T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();

        if self.disabled {
            let text = match self.value {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => "—".to_string(),
            };
            Paragraph::new(Line::from(Span::styled(text, Style::default().fg(TEXT_MUTED))))
                .block(block)
                .render(area, buf);
            return;
        }

        if self.list.is_empty() {
            Paragraph::new(Span::styled(
                self.empty_message,
                Style::default().fg(TEXT_MUTED),
            ))
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .list
            .items()
            .iter()
            .map(|item| {
                let mut spans = vec![Span::styled(item.label(), Style::default().fg(TEXT_PRIMARY))];
                if let Some(detail) = item.detail() {
                    spans.push(Span::styled(
                        format!("  {}", detail),
                        Style::default().fg(TEXT_MUTED),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let highlight_bg = if self.focused && self.flash > 0.5 {
            FLASH_BG
        } else if self.focused {
            SELECTED_BG
        } else {
            SELECTED_BG_DIM
        };

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(highlight_bg).add_modifier(Modifier::BOLD))
            .highlight_symbol("› ");

        let mut state = ListState::default().with_selected(Some(self.list.selected_index()));
        StatefulWidget::render(list, area, buf, &mut state);
    }
}

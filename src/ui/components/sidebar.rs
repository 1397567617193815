//! Sidebar component for project/workspace/session navigation

use std::path::Path;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::theme::{ACCENT_PRIMARY, BORDER_DEFAULT, TEXT_MUTED};
use super::tree_view::{ProjectTree, TreeView};

/// Sidebar widget wrapping the project tree
pub struct Sidebar<'a> {
    tree: &'a ProjectTree,
    focused: bool,
    active_workspace: Option<&'a Path>,
    pulse: &'a str,
    title: &'a str,
}

impl<'a> Sidebar<'a> {
    pub fn new(tree: &'a ProjectTree) -> Self {
        Self {
            tree,
            focused: false,
            active_workspace: None,
            pulse: "●",
            title: "⬒ Projects",
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn active_workspace(mut self, path: Option<&'a Path>) -> Self {
        self.active_workspace = path;
        self
    }

    pub fn pulse(mut self, glyph: &'a str) -> Self {
        self.pulse = glyph;
        self
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 10 {
            return;
        }

        let border = if self.focused {
            ACCENT_PRIMARY
        } else {
            BORDER_DEFAULT
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", self.title));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.tree.is_empty() {
            Paragraph::new(Span::styled(
                "Discovering workspaces…",
                Style::default().fg(TEXT_MUTED),
            ))
            .render(inner, buf);
            return;
        }

        TreeView::new(self.tree)
            .focused(self.focused)
            .active_workspace(self.active_workspace)
            .pulse(self.pulse)
            .render(inner, buf);
    }
}

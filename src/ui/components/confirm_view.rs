//! Review screen shown before a launch, and the fatal error screen

use std::path::Path;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::agent::Selection;

use super::theme::{ACCENT_ERROR, ACCENT_PRIMARY, FLASH_BG, TEXT_MUTED, TEXT_PRIMARY};

fn field<'a>(label: &'a str, value: &str) -> Line<'a> {
    let value = if value.is_empty() {
        Span::styled("—", Style::default().fg(TEXT_MUTED))
    } else {
        Span::styled(value.to_string(), Style::default().fg(TEXT_PRIMARY))
    };
    Line::from(vec![
        Span::styled(format!("{:>10}  ", label), Style::default().fg(TEXT_MUTED)),
        value,
    ])
}

/// Fully resolved selection and the workspace it will run in
pub struct ConfirmView<'a> {
    selection: &'a Selection,
    workspace: &'a Path,
    flash: f32,
}

impl<'a> ConfirmView<'a> {
    pub fn new(selection: &'a Selection, workspace: &'a Path) -> Self {
        Self {
            selection,
            workspace,
            flash: 0.0,
        }
    }

    pub fn flash(mut self, level: f32) -> Self {
        self.flash = level;
        self
    }
}

impl Widget for ConfirmView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let item = &self.selection.work_item;
        let lines = vec![
            Line::default(),
            field("ticket", &format!("{} {}", item.id, item.title)),
            field("harness", &self.selection.harness.name),
            field("model", &self.selection.model),
            field("agent", &self.selection.agent),
            field("workspace", &self.workspace.to_string_lossy()),
            Line::default(),
            Line::from(Span::styled(
                "Launch this session?",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
        ];

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT_PRIMARY))
            .title(" Confirm launch ");
        if self.flash > 0.5 {
            block = block.style(Style::default().bg(FLASH_BG));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// Terminal error screen
pub struct ErrorView<'a> {
    message: &'a str,
}

impl<'a> ErrorView<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Widget for ErrorView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::default(),
            Line::from(Span::styled(
                "Something went wrong",
                Style::default()
                    .fg(ACCENT_ERROR)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(self.message.to_string()),
            Line::default(),
            Line::from(Span::styled(
                "Fix the problem and restart.",
                Style::default().fg(TEXT_MUTED),
            )),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(ACCENT_ERROR))
                    .title(" Error "),
            )
            .render(area, buf);
    }
}

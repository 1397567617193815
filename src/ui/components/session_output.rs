use ansi_to_tui::IntoText;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::agent::{AgentStatus, RunningAgent};

use super::theme::{ACCENT_ERROR, ACCENT_PRIMARY, ACCENT_SUCCESS, TEXT_MUTED};

/// Captured output of the viewed session, pinned to the tail
pub struct SessionOutput<'a> {
    agent: &'a RunningAgent,
}

impl<'a> SessionOutput<'a> {
    pub fn new(agent: &'a RunningAgent) -> Self {
        Self { agent }
    }

    /// Decode ANSI escapes, falling back to plain text when the stream is malformed
    fn decode(raw: &str) -> Text<'static> {
        match raw.as_bytes().into_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to decode captured output");
                Text::raw(raw.to_string())
            }
        }
    }
}

impl Widget for SessionOutput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let status_color = match self.agent.status {
            AgentStatus::Running => ACCENT_SUCCESS,
            AgentStatus::Completed => TEXT_MUTED,
            AgentStatus::Failed => ACCENT_ERROR,
        };
        let title = Line::from(vec![
            Span::raw(format!(" {} ", self.agent.display_name)),
            Span::styled(
                format!("[{}] ", self.agent.status.label()),
                Style::default().fg(status_color),
            ),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT_PRIMARY))
            .title(title);

        if self.agent.output.is_empty() {
            let hint = if self.agent.capture.is_some() {
                "Waiting for output…"
            } else {
                "Output capture unavailable for this session"
            };
            Paragraph::new(Span::styled(hint, Style::default().fg(TEXT_MUTED)))
                .block(block)
                .render(area, buf);
            return;
        }

        let text = Self::decode(&self.agent.output);
        let visible = area.height.saturating_sub(2) as usize;
        let scroll = text.lines.len().saturating_sub(visible);
        Paragraph::new(text)
            .block(block)
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
            .render(area, buf);
    }
}

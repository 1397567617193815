//! Top status line: freshness, refresh flag, session counts, latest warning

use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::theme::{ACCENT_PRIMARY, ACCENT_SUCCESS, ACCENT_WARNING, HEADER_BG, TEXT_MUTED};

/// Truncate to a display width, adding "..." when something was cut
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let ellipsis = "...";
    let ellipsis_width = UnicodeWidthStr::width(ellipsis);

    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= ellipsis_width {
        return s.chars().take(max_width).collect();
    }

    let target_width = max_width - ellipsis_width;
    let mut width = 0;
    let mut result = String::new();
    for c in s.chars() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + char_width > target_width {
            break;
        }
        result.push(c);
        width += char_width;
    }
    result.push_str(ellipsis);
    result
}

pub struct StatusHeader<'a> {
    pub last_refreshed: Option<DateTime<Local>>,
    pub just_refreshed: bool,
    pub running: usize,
    pub total: usize,
    pub warnings: &'a [String],
}

impl Widget for StatusHeader<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let freshness = match self.last_refreshed {
            Some(at) => format!("updated {}", at.format("%H:%M:%S")),
            None => "loading…".to_string(),
        };

        let mut spans = vec![
            Span::styled(
                " deckhand ",
                Style::default()
                    .fg(ACCENT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(freshness, Style::default().fg(TEXT_MUTED)),
        ];
        if self.just_refreshed {
            spans.push(Span::styled(
                "  ↻ refreshed",
                Style::default().fg(ACCENT_SUCCESS),
            ));
        }
        if self.total > 0 {
            spans.push(Span::styled(
                format!("  agents {}/{}", self.running, self.total),
                Style::default().fg(TEXT_MUTED),
            ));
        }

        if let Some(last) = self.warnings.last() {
            let used: usize = spans.iter().map(|s| s.width()).sum();
            let label = if self.warnings.len() > 1 {
                format!("  ⚠ ({}) ", self.warnings.len())
            } else {
                "  ⚠ ".to_string()
            };
            let room = (area.width as usize).saturating_sub(used + label.width());
            spans.push(Span::styled(label, Style::default().fg(ACCENT_WARNING)));
            spans.push(Span::styled(
                truncate_to_width(last, room),
                Style::default().fg(ACCENT_WARNING),
            ));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(HEADER_BG))
            .render(area, buf);
    }
}

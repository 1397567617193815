use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::config::{KeyContext, KeybindingConfig};
use crate::ui::action::Action;

use super::theme::{FOOTER_BG, KEY_HINT_BG, TEXT_MUTED, TEXT_PRIMARY};

/// Footer showing the keys bound in the active context
pub struct GlobalFooter {
    hints: Vec<(String, &'static str)>,
}

impl GlobalFooter {
    /// Actions worth advertising in each context, in display order
    fn actions_for(context: KeyContext) -> &'static [Action] {
        match context {
            KeyContext::Matrix => &[
                Action::Confirm,
                Action::Cancel,
                Action::FocusNext,
                Action::Refresh,
                Action::ClearStoppedAgents,
                Action::Quit,
            ],
            KeyContext::Sidebar => &[
                Action::Confirm,
                Action::Expand,
                Action::Collapse,
                Action::ClearAgent,
                Action::FocusNext,
                Action::Quit,
            ],
            KeyContext::Confirm => &[Action::Confirm, Action::Cancel, Action::Quit],
            KeyContext::Output => &[Action::Cancel, Action::ClearAgent, Action::Quit],
            KeyContext::Error | KeyContext::Global => &[Action::Quit],
        }
    }

    pub fn for_context(keys: &KeybindingConfig, context: KeyContext, has_warnings: bool) -> Self {
        let mut hints: Vec<(String, &'static str)> = Self::actions_for(context)
            .iter()
            .filter_map(|action| {
                keys.key_for(*action, context)
                    .map(|key| (key.to_string(), action.hint()))
            })
            .collect();

        if has_warnings && context != KeyContext::Error {
            if let Some(key) = keys.key_for(Action::DismissWarnings, context) {
                hints.push((key.to_string(), Action::DismissWarnings.hint()));
            }
        }

        Self { hints }
    }

    pub fn hints(&self) -> &[(String, &'static str)] {
        &self.hints
    }
}

impl Widget for GlobalFooter {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::raw(" ")];
        for (i, (key, action)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("   "));
            }
            spans.push(Span::styled(
                format!(" {} ", key),
                Style::default().fg(TEXT_PRIMARY).bg(KEY_HINT_BG),
            ));
            spans.push(Span::styled(
                format!(" {}", action),
                Style::default().fg(TEXT_MUTED),
            ));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(FOOTER_BG))
            .render(area, buf);
    }
}

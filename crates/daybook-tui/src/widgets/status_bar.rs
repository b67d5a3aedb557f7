use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::sync::AutoplayState;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let controller = &app.controller;
        let bar = Style::default().bg(theme.bg2);

        let (state_str, state_color) = match controller.autoplay_state() {
            AutoplayState::Running => (" ▶ PLAYING ", theme.playing),
            AutoplayState::Parked => (" ▶ AT START ", theme.playing),
            AutoplayState::Stopped => (" ⏸ PAUSED ", theme.paused),
        };

        let position = match (controller.active_entry(), controller.current_index()) {
            (Some(entry), Some(index)) => {
                format!(" {} | {}/{}", entry.key(), index + 1, controller.diary().len())
            }
            _ => " No entries".to_string(),
        };

        let mut spans = vec![
            Span::styled(
                state_str,
                bar.fg(theme.bg0).bg(state_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(position, bar.fg(theme.fg0)),
        ];
        if controller.is_scrolling() {
            spans.push(Span::styled(" | SCROLLING", bar.fg(theme.scrolling)));
        }
        if !controller.show_text() {
            spans.push(Span::styled(" | TEXT HIDDEN", bar.fg(theme.grey2)));
        }

        let help_hint = " q:quit space:play/pause t:text j/k:scroll g/G:first/last ";
        let used: usize = spans.iter().map(|s| s.content.width()).sum();
        let padding_len = (area.width as usize).saturating_sub(used + help_hint.width());

        spans.push(Span::styled(" ".repeat(padding_len), bar));
        spans.push(Span::styled(help_hint, bar.fg(theme.grey2)));

        frame.render_widget(Paragraph::new(Line::from(spans)).style(bar), area);
    }
}

use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use daybook_core::{Diary, MonthKey};

use crate::app::App;
use crate::theme::Theme;
use crate::viewport::SECTION_GAP_ROWS;

/// Width needed for the seven day columns plus margins and border
pub const CALENDAR_WIDTH: u16 = 24;

const WEEKDAY_HEADER: &str = " Su Mo Tu We Th Fr Sa";

pub struct CalendarWidget;

impl CalendarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let Some(viewport) = app.viewport() else {
            return;
        };
        let theme = &app.theme;
        let diary = app.controller.diary();
        let active = app.controller.active_entry().map(|e| e.date);

        let mut lines: Vec<Line> = Vec::with_capacity(viewport.content_height() as usize);
        for (i, section) in viewport.sections().iter().enumerate() {
            if i > 0 {
                lines.extend((0..SECTION_GAP_ROWS).map(|_| Line::default()));
            }
            lines.extend(month_lines(diary, section.month, viewport.row_height(), active, theme));
        }

        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(theme.grey0))
            .style(Style::default().bg(theme.bg0));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .scroll((viewport.top_row(), 0));
        frame.render_widget(paragraph, area);
    }
}

/// Title, weekday header and week grid of one month
fn month_lines(
    diary: &Diary,
    month: MonthKey,
    row_height: u16,
    active: Option<NaiveDate>,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        format!(" {}", month),
        Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        WEEKDAY_HEADER,
        Style::default().fg(theme.grey2),
    )));

    let first_weekday = month.first_weekday();
    let days = month.days_in_month();
    for week in 0..month.week_rows() {
        let mut spans = vec![Span::raw(" ")];
        for weekday in 0..7 {
            let cell = week * 7 + weekday;
            let day = (cell + 1).checked_sub(first_weekday).filter(|d| (1..=days).contains(d));
            let date = day.and_then(|d| NaiveDate::from_ymd_opt(month.year, month.month, d));

            let Some(date) = date else {
                spans.push(Span::raw("   "));
                continue;
            };
            let style = if Some(date) == active {
                Style::default()
                    .fg(theme.bg0)
                    .bg(theme.active)
                    .add_modifier(Modifier::BOLD)
            } else if diary.index_of(date).is_some() {
                Style::default().fg(theme.entry_day)
            } else {
                Style::default().fg(theme.grey0)
            };
            spans.push(Span::styled(format!("{:>2}", date.day()), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
        lines.extend((1..row_height).map(|_| Line::default()));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::Entry;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_month_grid_layout() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let diary = Diary::new(vec![Entry::new(date)]).unwrap();
        let lines = month_lines(&diary, MonthKey::of(date), 1, Some(date), &Theme::default());

        // Title, header, five weeks
        assert_eq!(lines.len(), 7);
        assert_eq!(line_text(&lines[0]), " JANUARY, 2025");
        // January 2025 starts on a Wednesday
        assert_eq!(line_text(&lines[2]), "           1  2  3  4 ");
        assert!(line_text(&lines[6]).contains("31"));
    }

    #[test]
    fn test_row_height_pads_weeks() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let diary = Diary::new(vec![Entry::new(date)]).unwrap();
        let lines = month_lines(&diary, MonthKey::of(date), 3, None, &Theme::default());
        assert_eq!(lines.len(), 2 + 5 * 3);
    }
}

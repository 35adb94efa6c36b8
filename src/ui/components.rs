//! Pagination control strip: page-size selector, page label and
//! first/previous/next/last buttons

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::table::PageView;
use crate::theme::Theme;

/// Owned snapshot of the paging state of a [`PageView`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerSummary {
    pub page_label: String,
    pub page_size: usize,
    pub total_rows: usize,
    pub offset: usize,
    pub shown: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PagerSummary {
    pub fn of(view: &PageView<'_>) -> Self {
        Self {
            page_label: view.page_label(),
            page_size: view.page_size,
            total_rows: view.total_rows,
            offset: view.offset,
            shown: view.rows.len(),
            has_previous: view.has_previous(),
            has_next: view.has_next(),
        }
    }

    /// "11-20 of 57", or "0 of 0" when empty
    pub fn range_label(&self) -> String {
        if self.shown == 0 {
            return format!("0 of {}", self.total_rows);
        }
        format!(
            "{}-{} of {}",
            self.offset + 1,
            self.offset + self.shown,
            self.total_rows
        )
    }
}

fn button(label: &str, enabled: bool, theme: &Theme) -> Span<'static> {
    let style = if enabled {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_dim).add_modifier(Modifier::DIM)
    };
    Span::styled(label.to_string(), style)
}

pub fn controls_line(summary: &PagerSummary, options: &[usize], theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled("Rows ", Style::default().fg(theme.text_dim))];

    for &size in options {
        if size == summary.page_size {
            spans.push(Span::styled(
                format!("[{}]", size),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(
                format!(" {} ", size),
                Style::default().fg(theme.text_dim),
            ));
        }
    }

    let sep = || Span::styled(" │ ", Style::default().fg(theme.inactive));

    spans.push(sep());
    spans.push(button("« First", summary.has_previous, theme));
    spans.push(Span::raw("  "));
    spans.push(button("‹ Prev", summary.has_previous, theme));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        summary.page_label.clone(),
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw("  "));
    spans.push(button("Next ›", summary.has_next, theme));
    spans.push(Span::raw("  "));
    spans.push(button("Last »", summary.has_next, theme));
    spans.push(sep());
    spans.push(Span::styled(
        summary.range_label(),
        Style::default().fg(theme.text_dim),
    ));

    Line::from(spans)
}

pub fn draw_controls(f: &mut Frame, area: Rect, summary: &PagerSummary, options: &[usize], theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.inactive));

    let controls = Paragraph::new(controls_line(summary, options, theme))
        .alignment(Alignment::Center)
        .block(block);

    f.render_widget(controls, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(page: usize, page_count: usize, total_rows: usize, shown: usize) -> PagerSummary {
        PagerSummary {
            page_label: format!("Page {} of {}", page, page_count.max(1)),
            page_size: 10,
            total_rows,
            offset: (page - 1) * 10,
            shown,
            has_previous: page > 1,
            has_next: page < page_count,
        }
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_range_label() {
        assert_eq!(summary(3, 3, 25, 5).range_label(), "21-25 of 25");
        assert_eq!(summary(1, 0, 0, 0).range_label(), "0 of 0");
    }

    #[test]
    fn test_buttons_disabled_at_bounds() {
        let theme = Theme::default();
        let first = summary(1, 3, 25, 10);
        let line = controls_line(&first, &[10, 25], &theme);
        let prev = line.spans.iter().find(|s| s.content == "‹ Prev").unwrap();
        let next = line.spans.iter().find(|s| s.content == "Next ›").unwrap();
        assert_eq!(prev.style.fg, Some(theme.text_dim));
        assert_eq!(next.style.fg, Some(theme.accent));
    }

    #[test]
    fn test_controls_text() {
        let theme = Theme::default();
        let line = controls_line(&summary(2, 3, 25, 10), &[10, 25, 50], &theme);
        let rendered = text(&line);
        assert!(rendered.contains("[10]"));
        assert!(rendered.contains(" 25 "));
        assert!(rendered.contains("Page 2 of 3"));
        assert!(rendered.contains("11-20 of 25"));
    }
}

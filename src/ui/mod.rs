mod components;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use unicode_width::UnicodeWidthStr;

use crate::app::{App, Popup};
use crate::table::{Align, Column, PageView};
use crate::theme::Theme;
use components::PagerSummary;

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(4),    // Table
            Constraint::Length(3), // Page controls
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let theme = app.theme.clone();
    let columns = app.table.columns().to_vec();
    let indicators: Vec<Option<&'static str>> =
        columns.iter().map(|c| app.table.indicator(c)).collect();
    let options = app.table.page_size_options().to_vec();

    draw_info_line(f, app, &theme, chunks[0]);

    let summary = {
        let view = app.table.view();
        let header = Header {
            columns: &columns,
            indicators: &indicators,
            cursor: app.column_cursor,
        };
        draw_table(f, &app.title, &header, &view, app.row_cursor, &theme, chunks[1]);
        PagerSummary::of(&view)
    };

    components::draw_controls(f, chunks[2], &summary, &options, &theme);
    draw_footer(f, &theme, chunks[3]);

    match app.popup {
        Popup::None => {}
        Popup::Details => draw_details_popup(f, app, &theme),
        Popup::Help => draw_help_popup(f, &theme),
    }
}

struct Header<'a> {
    columns: &'a [Column],
    indicators: &'a [Option<&'static str>],
    cursor: usize,
}

fn draw_info_line(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(theme.warning)))
    } else {
        let sort = app.table.sort_state();
        let sort_text = match sort.key() {
            Some(key) => format!("sorted by {} ({:?})", key, sort.direction()),
            None => "unsorted".to_string(),
        };
        Line::from(vec![
            Span::styled(app.title.as_str(), Style::default().fg(theme.text)),
            Span::styled(" │ ", Style::default().fg(theme.text_dim)),
            Span::styled(sort_text, Style::default().fg(theme.text_dim)),
        ])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn aligned(text: String, align: Align) -> Line<'static> {
    let line = Line::from(text);
    match align {
        Align::Left => line.left_aligned(),
        Align::Center => line.centered(),
        Align::Right => line.right_aligned(),
    }
}

fn draw_table(
    f: &mut Frame,
    title: &str,
    header: &Header<'_>,
    view: &PageView<'_>,
    row_cursor: usize,
    theme: &Theme,
    area: Rect,
) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ({} rows) ", title, view.total_rows),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.inactive));

    let header_row = Row::new(header.columns.iter().zip(header.indicators).enumerate().map(
        |(i, (col, indicator))| {
            let label = match indicator {
                Some(icon) => format!("{} {}", col.label, icon),
                None => col.label.clone(),
            };
            let mut style = Style::default().fg(theme.header).add_modifier(Modifier::BOLD);
            if i == header.cursor {
                style = style.fg(theme.accent).add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(aligned(label, col.align)).style(style)
        },
    ))
    .bottom_margin(1);

    let rows: Vec<Row> = view
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == row_cursor {
                Style::default().bg(theme.bg_selected).fg(theme.text)
            } else {
                Style::default().fg(theme.text)
            };
            Row::new(
                header
                    .columns
                    .iter()
                    .map(|col| Cell::from(aligned(col.cell(row), col.align))),
            )
            .style(style)
        })
        .collect();

    let widths: Vec<Constraint> = header
        .columns
        .iter()
        .map(|col| match col.width {
            Some(w) => Constraint::Length(w),
            None => Constraint::Fill(1),
        })
        .collect();

    let table = Table::new(rows, widths).header(header_row).block(block);
    f.render_widget(table, area);

    if view.is_empty() {
        // Below the border, header and its margin
        let inner = Rect {
            x: area.x + 1,
            y: area.y + 3,
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(4).min(1),
        };
        let empty = Paragraph::new(Span::styled(
            "No results found",
            Style::default().fg(theme.text_dim),
        ))
        .alignment(Alignment::Center);
        f.render_widget(empty, inner);
    }
}

fn draw_footer(f: &mut Frame, theme: &Theme, area: Rect) {
    let hints = [
        ("←→", "Column"),
        ("Enter", "Sort"),
        ("n/p", "Page"),
        ("g/G", "First/Last"),
        ("+/-", "Rows"),
        ("i", "Details"),
        ("?", "Help"),
        ("q", "Quit"),
    ];

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else if area.width < 90 { 6 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(theme.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(theme.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_details_popup(f: &mut Frame, app: &mut App, theme: &Theme) {
    let Some(cells) = app.selected_row_cells() else {
        return;
    };

    let popup_area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, popup_area);

    let width = cells.iter().map(|(label, _)| label.width()).max().unwrap_or(0);
    let lines: Vec<Line> = cells
        .into_iter()
        .map(|(label, value)| {
            let fill = " ".repeat(width.saturating_sub(label.width()) + 2);
            Line::from(vec![
                Span::styled(format!("  {}{}", label, fill), Style::default().fg(theme.header)),
                Span::styled(value, Style::default().fg(theme.text)),
            ])
        })
        .collect();

    let details = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(" Details ", Style::default().fg(theme.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(details, popup_area);
}

fn draw_help_popup(f: &mut Frame, theme: &Theme) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        ))
    };
    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", key), Style::default().fg(theme.accent)),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Sorting ═══"),
        entry("←/→ h/l", "Move between columns"),
        entry("Enter/s", "Sort column: ascending → descending → off"),
        entry("1-9", "Sort column by position"),
        Line::from(""),
        section("═══ Pages ═══"),
        entry("n PgDn", "Next page"),
        entry("p PgUp", "Previous page"),
        entry("g Home", "First page"),
        entry("G End", "Last page"),
        entry("+/-", "Cycle rows per page (back to page 1)"),
        Line::from(""),
        section("═══ Rows ═══"),
        entry("↑/↓ j/k", "Move within the page"),
        entry("i", "Show all fields of the row"),
        entry("R", "Reload rows from the dataset file"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(theme.text_dim)),
            Span::styled("?", Style::default().fg(theme.accent)),
            Span::styled("/", Style::default().fg(theme.text_dim)),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::styled(" to close", Style::default().fg(theme.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" fleetgrid Help ", Style::default().fg(theme.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{demo, Dataset};
    use crate::table::TableOptions;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app_for(dataset: Dataset) -> App {
        App::new(dataset, TableOptions::default(), Theme::default(), None).unwrap()
    }

    #[test]
    fn test_renders_demo_page() {
        let mut app = app_for(demo::vehicles());
        let screen = render(&mut app, 160, 24);
        assert!(screen.contains("Vehicles (57 rows)"));
        assert!(screen.contains("Plate ⇅"));
        assert!(screen.contains("Page 1 of 6"));
        assert!(screen.contains("1-10 of 57"));
        assert!(screen.contains("FL-100"));
    }

    #[test]
    fn test_sort_indicator_in_header() {
        let mut app = app_for(demo::vehicles());
        app.table.sort("plate");
        let screen = render(&mut app, 160, 24);
        assert!(screen.contains("Plate ▲"));
        app.table.sort("plate");
        let screen = render(&mut app, 160, 24);
        assert!(screen.contains("Plate ▼"));
    }

    #[test]
    fn test_renders_empty_state() {
        let dataset =
            Dataset::from_json(r#"{ "title": "Riders", "columns": [ { "label": "Name", "key": "name" } ] }"#)
                .unwrap();
        let mut app = app_for(dataset);
        let screen = render(&mut app, 100, 16);
        assert!(screen.contains("No results found"));
        assert!(screen.contains("Page 1 of 1"));
        assert!(screen.contains("0 of 0"));
    }

    #[test]
    fn test_renders_popups() {
        let mut app = app_for(demo::vehicles());
        app.popup = Popup::Help;
        assert!(render(&mut app, 120, 40).contains("fleetgrid Help"));

        app.popup = Popup::Details;
        assert!(render(&mut app, 120, 40).contains("Details"));
    }
}

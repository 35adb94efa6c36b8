use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::dataset::Dataset;
use crate::table::{TableOptions, TableState};
use crate::theme::Theme;

/// How long a status message stays in the info line
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Details,
    Help,
}

pub struct App {
    pub title: String,
    pub table: TableState,
    pub theme: Theme,
    pub popup: Popup,

    // Cursor over columns (header) and rows (within the visible page)
    pub column_cursor: usize,
    pub row_cursor: usize,

    // File the rows came from; None for the built-in sample
    pub source: Option<PathBuf>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new(
        dataset: Dataset,
        options: TableOptions,
        theme: Theme,
        source: Option<PathBuf>,
    ) -> Result<Self> {
        let table = TableState::new(dataset.rows, dataset.columns, options)?;
        Ok(Self {
            title: dataset.title,
            table,
            theme,
            popup: Popup::None,
            column_cursor: 0,
            row_cursor: 0,
            source,
            status_message: None,
            status_message_time: None,
        })
    }

    /// Set a status message (auto-clears after a few seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.popup != Popup::None {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('i') | KeyCode::Char('?')
            ) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        match key.code {
            // Column cursor
            KeyCode::Left | KeyCode::Char('h') => {
                self.column_cursor = self.column_cursor.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let last = self.table.columns().len().saturating_sub(1);
                self.column_cursor = (self.column_cursor + 1).min(last);
            }

            // Sorting
            KeyCode::Enter | KeyCode::Char('s') => self.sort_column(self.column_cursor),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.column_cursor = index.min(self.table.columns().len().saturating_sub(1));
                self.sort_column(index);
            }

            // Pages
            KeyCode::Char('n') | KeyCode::PageDown => self.change_page(TableState::next),
            KeyCode::Char('p') | KeyCode::PageUp => self.change_page(TableState::previous),
            KeyCode::Char('g') | KeyCode::Home => self.change_page(TableState::first),
            KeyCode::Char('G') | KeyCode::End => self.change_page(TableState::last),
            KeyCode::Char('+') | KeyCode::Char('=') => self.cycle_page_size(true),
            KeyCode::Char('-') => self.cycle_page_size(false),

            // Row cursor
            KeyCode::Char('j') | KeyCode::Down => {
                let visible = self.table.view().rows.len();
                if self.row_cursor + 1 < visible {
                    self.row_cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.row_cursor = self.row_cursor.saturating_sub(1);
            }

            KeyCode::Char('i') => {
                if !self.table.view().is_empty() {
                    self.popup = Popup::Details;
                }
            }
            KeyCode::Char('R') => self.reload().await?,
            KeyCode::Char('?') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    fn sort_column(&mut self, index: usize) {
        let Some(column) = self.table.columns().get(index) else {
            return;
        };
        if !column.is_sortable() {
            let msg = format!("{} is not sortable", column.label);
            self.set_status(msg);
            return;
        }

        self.table.sort_column(index);
        self.row_cursor = 0;

        let state = self.table.sort_state();
        let msg = match state.key() {
            Some(key) => format!("Sorted by {} ({:?})", key, state.direction()),
            None => "Sort cleared".to_string(),
        };
        self.set_status(msg);
    }

    fn change_page(&mut self, op: fn(&mut TableState)) {
        let before = self.table.page();
        op(&mut self.table);
        if self.table.page() != before {
            self.row_cursor = 0;
        }
    }

    fn cycle_page_size(&mut self, forward: bool) {
        self.table.cycle_page_size(forward);
        self.row_cursor = 0;
        self.set_status(format!("{} rows per page", self.table.page_size()));
    }

    /// Re-read rows from the source file. Page and sort are left as they are.
    pub async fn reload(&mut self) -> Result<()> {
        let Some(path) = self.source.clone() else {
            self.set_status("Sample data has no file to reload");
            return Ok(());
        };

        let rows = Dataset::reload_rows(&path).await?;
        let count = rows.len();
        self.table.set_rows(rows);

        let visible = self.table.view().rows.len();
        self.row_cursor = self.row_cursor.min(visible.saturating_sub(1));
        self.set_status(format!("Reloaded {} rows", count));
        Ok(())
    }

    /// Label/value pairs of the row under the cursor
    pub fn selected_row_cells(&mut self) -> Option<Vec<(String, String)>> {
        let cursor = self.row_cursor;
        let columns = self.table.columns().to_vec();
        let view = self.table.view();
        let row = view.rows.get(cursor)?;

        Some(
            columns
                .iter()
                .map(|c| (c.label.clone(), c.cell(row)))
                .collect(),
        )
    }

    pub fn tick(&mut self) {
        if let Some(at) = self.status_message_time {
            if at.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::demo;
    use crate::table::SortDirection;
    use crossterm::event::KeyModifiers;

    fn demo_app() -> App {
        App::new(demo::vehicles(), TableOptions::default(), Theme::default(), None).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_sort_keys_cycle() {
        let mut app = demo_app();
        app.handle_key(key(KeyCode::Char('4'))).await.unwrap();
        assert_eq!(app.column_cursor, 3);
        assert_eq!(app.table.sort_state().key(), Some("trips"));

        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.table.sort_state().direction(), SortDirection::Descending);

        app.handle_key(key(KeyCode::Char('s'))).await.unwrap();
        assert!(!app.table.sort_state().is_active());
        assert_eq!(app.status_message.as_deref(), Some("Sort cleared"));
    }

    #[tokio::test]
    async fn test_computed_column_reports_not_sortable() {
        let mut app = demo_app();
        app.handle_key(key(KeyCode::Char('2'))).await.unwrap();
        assert!(!app.table.sort_state().is_active());
        assert_eq!(app.status_message.as_deref(), Some("Vehicle is not sortable"));
    }

    #[tokio::test]
    async fn test_page_keys() {
        let mut app = demo_app();
        app.handle_key(key(KeyCode::Char('p'))).await.unwrap();
        assert_eq!(app.table.page(), 1);

        app.handle_key(key(KeyCode::Char('j'))).await.unwrap();
        assert_eq!(app.row_cursor, 1);

        app.handle_key(key(KeyCode::PageDown)).await.unwrap();
        assert_eq!(app.table.page(), 2);
        assert_eq!(app.row_cursor, 0);

        app.handle_key(key(KeyCode::End)).await.unwrap();
        assert_eq!(app.table.page(), 6);
        app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.table.page(), 6);

        app.handle_key(key(KeyCode::Char('+'))).await.unwrap();
        assert_eq!(app.table.page_size(), 25);
        assert_eq!(app.table.page(), 1);
    }

    #[tokio::test]
    async fn test_row_cursor_stays_on_page() {
        let mut app = demo_app();
        for _ in 0..20 {
            app.handle_key(key(KeyCode::Down)).await.unwrap();
        }
        assert_eq!(app.row_cursor, 9);
        app.handle_key(key(KeyCode::Up)).await.unwrap();
        assert_eq!(app.row_cursor, 8);
    }

    #[tokio::test]
    async fn test_details_popup() {
        let mut app = demo_app();
        app.handle_key(key(KeyCode::Char('i'))).await.unwrap();
        assert_eq!(app.popup, Popup::Details);

        let cells = app.selected_row_cells().unwrap();
        assert_eq!(cells.len(), app.table.columns().len());
        assert_eq!(cells[0].0, "Plate");

        // keys are swallowed while a popup is open
        app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.table.page(), 1);
        app.handle_key(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.popup, Popup::None);
    }

    #[tokio::test]
    async fn test_reload_without_source() {
        let mut app = demo_app();
        app.handle_key(key(KeyCode::Char('R'))).await.unwrap();
        assert_eq!(
            app.status_message.as_deref(),
            Some("Sample data has no file to reload")
        );
    }

    #[tokio::test]
    async fn test_reload_keeps_page_and_clamps() {
        let path = std::env::temp_dir().join(format!("fleetgrid-app-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "columns": [ { "label": "Id", "key": "id" } ],
                 "rows": [ {"id": 1}, {"id": 2}, {"id": 3} ] }"#,
        )
        .unwrap();

        let mut app = App::new(
            demo::vehicles(),
            TableOptions::default(),
            Theme::default(),
            Some(path.clone()),
        )
        .unwrap();
        app.handle_key(key(KeyCode::Char('G'))).await.unwrap();
        assert_eq!(app.table.page(), 6);

        let result = app.reload().await;
        let _ = std::fs::remove_file(&path);
        result.unwrap();

        assert_eq!(app.table.page(), 1);
        assert_eq!(app.table.view().total_rows, 3);
        assert_eq!(app.status_message.as_deref(), Some("Reloaded 3 rows"));
    }

    #[test]
    fn test_status_clears_after_timeout() {
        let mut app = demo_app();
        app.status_message = Some("old".to_string());
        app.status_message_time = Some(Instant::now() - STATUS_TIMEOUT);
        app.tick();
        assert!(app.status_message.is_none());
    }
}

mod app;
mod config;
mod dataset;
mod table;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unicode_width::UnicodeWidthStr;

use app::{App, Popup};
use config::AppConfig;
use dataset::Dataset;
use table::TableState;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "fleetgrid")]
#[command(version)]
#[command(about = "Sortable, paginated terminal tables for fleet data")]
struct Args {
    /// JSON dataset to display (the built-in vehicle sample when omitted)
    file: Option<PathBuf>,

    /// Rows per page (overrides the config file)
    #[arg(long)]
    page_size: Option<usize>,

    /// Page to open on (clamped to the available pages)
    #[arg(long)]
    page: Option<usize>,

    /// Field key to sort by
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Print the selected page as plain text and exit
    #[arg(long)]
    print: bool,

    /// Print the selected page as JSON and exit
    #[arg(long, conflicts_with = "print")]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();
    let options = config.table_options(args.page_size);

    let dataset = match &args.file {
        Some(path) => Dataset::load(path)
            .with_context(|| format!("Could not load dataset {}", path.display()))?,
        None => dataset::demo::vehicles(),
    };

    // Handle CLI-only output
    if args.print || args.json {
        let mut table = TableState::new(dataset.rows, dataset.columns, options)?;
        apply_args(&mut table, &args);
        let output = if args.json {
            page_json(&mut table)?
        } else {
            page_text(&mut table)
        };
        println!("{}", output);
        return Ok(());
    }

    let mut app = App::new(dataset, options, Theme::from_config(&config.theme), args.file.clone())?;
    apply_args(&mut app.table, &args);

    run_tui(&mut app).await
}

/// Apply `--sort`, `--desc` and `--page` to a freshly configured table
fn apply_args(table: &mut TableState, args: &Args) {
    if let Some(key) = &args.sort {
        table.sort(key);
        if args.desc {
            table.sort(key);
        }
        if !table.sort_state().is_active() {
            tracing::warn!("Column '{}' is not sortable, ignoring --sort", key);
        }
    }
    if let Some(page) = args.page {
        table.go_to_page(page);
    }
}

/// Plain text rendering of the current page, columns separated by two spaces
fn page_text(table: &mut TableState) -> String {
    let columns = table.columns().to_vec();
    let view = table.view();

    let mut grid: Vec<Vec<String>> = vec![columns.iter().map(|c| c.label.clone()).collect()];
    if view.is_empty() {
        grid.push(vec!["No results found".to_string()]);
    } else {
        grid.extend(
            view.rows
                .iter()
                .map(|row| columns.iter().map(|c| c.cell(row)).collect()),
        );
    }

    let mut widths = vec![0; grid.iter().map(Vec::len).max().unwrap_or(0)];
    for line in &grid {
        for (i, cell) in line.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut out: Vec<String> = grid
        .iter()
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, &width)| pad_to_width(cell, width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect();
    out.push(String::new());
    out.push(view.page_label());
    out.join("\n")
}

/// Left-align `cell` in `width` terminal columns
fn pad_to_width(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.width());
    format!("{}{}", cell, " ".repeat(fill))
}

fn page_json(table: &mut TableState) -> Result<String> {
    let columns = table.columns().to_vec();
    let view = table.view();

    let rows: Vec<serde_json::Value> = view
        .rows
        .iter()
        .map(|row| {
            let cells: serde_json::Map<String, serde_json::Value> = columns
                .iter()
                .map(|c| (c.label.clone(), serde_json::Value::String(c.cell(row))))
                .collect();
            serde_json::Value::Object(cells)
        })
        .collect();

    let output = serde_json::json!({
        "page": view.page,
        "page_count": view.page_count,
        "page_size": view.page_size,
        "total": view.total_rows,
        "rows": rows,
    });

    Ok(serde_json::to_string(&output)?)
}

async fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Keep the UI alive on handler errors (e.g. a failed reload)
                            if let Err(e) = app.handle_key(key).await {
                                tracing::warn!("Key handler failed: {:#}", e);
                                app.status_message = Some(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        app.tick();
    }
}

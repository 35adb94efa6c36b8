//! Row collections and column layouts loaded from JSON files
//!
//! A dataset file looks like:
//!
//! ```json
//! {
//!   "title": "Vehicles",
//!   "columns": [
//!     { "label": "Plate", "key": "plate" },
//!     { "label": "Serviced", "key": "last_service", "format": "date" },
//!     { "label": "Vehicle", "template": "{make} {model}" }
//!   ],
//!   "rows": [ { "plate": "KX-102", "make": "Toyota", "model": "Hiace" } ]
//! }
//! ```

pub mod demo;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::table::value::parse_timestamp;
use crate::table::{Align, Column, Row, Value};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("column '{0}' has neither a key nor a template")]
    EmptyColumn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    #[default]
    Text,
    Date,
    Currency,
    List,
    Status,
}

/// Serializable column description; turned into a [`Column`] at load time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub format: CellFormat,
    /// `{field}` placeholders, e.g. `"{make} {model}"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    title: Option<String>,
    columns: Vec<ColumnSpec>,
    #[serde(default)]
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn from_json(content: &str) -> Result<Self, DatasetError> {
        let raw: RawDataset = serde_json::from_str(content)?;

        let columns = raw
            .columns
            .iter()
            .map(ColumnSpec::to_column)
            .collect::<Result<Vec<_>, _>>()?;

        let rows = raw
            .rows
            .into_iter()
            .map(|obj| coerce_row(Row::from(obj), &raw.columns))
            .collect();

        Ok(Self {
            title: raw.title.unwrap_or_else(|| "Dataset".to_string()),
            columns,
            rows,
        })
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::from_json(&content)?;
        tracing::info!("Loaded {} rows from {}", dataset.rows.len(), path.display());
        Ok(dataset)
    }

    /// Read only the rows of a dataset file, for refreshing a table in place
    pub async fn reload_rows(path: &Path) -> Result<Vec<Row>, DatasetError> {
        let content = tokio::fs::read_to_string(path).await?;
        let dataset = Self::from_json(&content)?;
        tracing::info!("Reloaded {} rows from {}", dataset.rows.len(), path.display());
        Ok(dataset.rows)
    }
}

/// Turn date-formatted text cells into real dates so they sort chronologically
fn coerce_row(mut row: Row, specs: &[ColumnSpec]) -> Row {
    for spec in specs {
        let (Some(key), CellFormat::Date) = (&spec.key, spec.format) else {
            continue;
        };
        let parsed = match row.get(key) {
            Value::Text(s) => parse_timestamp(s),
            _ => None,
        };
        if let Some(dt) = parsed {
            row.set(key.as_str(), dt);
        }
    }
    row
}

impl ColumnSpec {
    pub fn to_column(&self) -> Result<Column, DatasetError> {
        let mut column = match (&self.key, &self.template) {
            (_, Some(template)) => {
                let template = template.clone();
                let mut col = Column::computed(&self.label, move |row| fill_template(&template, row));
                col.key = self.key.clone();
                col
            }
            (Some(key), None) => {
                let col = Column::field(&self.label, key);
                match self.format {
                    // lists and dates already display as joined / formatted text
                    CellFormat::Text | CellFormat::Date | CellFormat::List => col,
                    CellFormat::Currency => {
                        let key = key.clone();
                        col.render_with(move |row| format_currency(row.get(&key)))
                    }
                    CellFormat::Status => {
                        let key = key.clone();
                        col.render_with(move |row| capitalize(&row.get(&key).to_string()))
                    }
                }
            }
            (None, None) => return Err(DatasetError::EmptyColumn(self.label.clone())),
        };

        if let Some(sortable) = self.sortable {
            column = column.sortable(sortable);
        }
        if let Some(width) = self.width {
            column = column.width(width);
        }
        Ok(column.align(self.align))
    }
}

/// Replace `{field}` placeholders with the row's display text
pub fn fill_template(template: &str, row: &Row) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                out.push_str(&row.get(&after[..close]).to_string());
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn format_currency(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("${:.2}", n),
        other => other.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::row::Row;

/// Custom cell renderer for computed or formatted columns
pub type RenderFn = Arc<dyn Fn(&Row) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Describes how one column is labelled, extracted, rendered and sorted
#[derive(Clone)]
pub struct Column {
    pub label: String,
    pub key: Option<String>,
    pub render: Option<RenderFn>,
    /// `None` means sortable whenever a key is present
    pub sortable: Option<bool>,
    pub width: Option<u16>,
    pub align: Align,
}

impl Column {
    /// A column bound to a row field
    pub fn field(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: Some(key.into()),
            render: None,
            sortable: None,
            width: None,
            align: Align::Left,
        }
    }

    /// A column with no field, rendered entirely by `render`
    pub fn computed(
        label: impl Into<String>,
        render: impl Fn(&Row) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            key: None,
            render: Some(Arc::new(render)),
            sortable: None,
            width: None,
            align: Align::Left,
        }
    }

    pub fn render_with(mut self, render: impl Fn(&Row) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Key to sort by, if this column responds to sorting at all
    pub fn sort_key(&self) -> Option<&str> {
        match (&self.key, self.sortable) {
            (Some(_), Some(false)) => None,
            (Some(key), _) => Some(key.as_str()),
            (None, _) => None,
        }
    }

    pub fn is_sortable(&self) -> bool {
        self.sort_key().is_some()
    }

    /// Display text of this column for `row`
    pub fn cell(&self, row: &Row) -> String {
        match (&self.render, &self.key) {
            (Some(render), _) => render(row),
            (None, Some(key)) => row.get(key).to_string(),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("label", &self.label)
            .field("key", &self.key)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("align", &self.align)
            .finish()
    }
}

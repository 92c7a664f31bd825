use std::fmt;
use std::sync::Arc;

use crate::query::Record;

pub type CellRenderer = Arc<dyn Fn(&dyn Record) -> String + Send + Sync>;

/// Column definition: which field to show, under which header and how to render it.
#[derive(Clone)]
pub struct Column {
    key: String,
    header: String,
    sortable: bool,
    cell: Option<CellRenderer>,
}

impl Column {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Column {
            key: key.into(),
            header: header.into(),
            sortable: true,
            cell: None,
        }
    }

    pub fn with_cell<F>(mut self, cell: F) -> Self
    where
        F: Fn(&dyn Record) -> String + Send + Sync + 'static,
    {
        self.cell = Some(Arc::new(cell));
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn render_cell(&self, row: &dyn Record) -> String {
        match &self.cell {
            Some(cell) => cell(row),
            None => row
                .field(&self.key)
                .map(|value| value.to_string())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("cell", &self.cell.as_ref().map(|_| "custom"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_and_custom_cells() {
        let row = json!({"name": "Alice", "visits": 3});
        let row = row.as_object().unwrap();

        let name = Column::new("name", "Name");
        assert_eq!(name.render_cell(row), "Alice");
        assert!(name.is_sortable());

        let visits = Column::new("visits", "Visits")
            .with_cell(|r| format!("{} visits", r.field("visits").unwrap()))
            .not_sortable();
        assert_eq!(visits.render_cell(row), "3 visits");
        assert!(!visits.is_sortable());

        assert_eq!(Column::new("missing", "Missing").render_cell(row), "");
    }
}

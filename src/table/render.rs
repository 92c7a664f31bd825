use std::fmt::Write;

use serde::Serialize;

use crate::error::DataTableError;
use crate::query::{Direction, PageInfo, Record};
use crate::templates::{self, TABLE_TEMPLATE};

use super::column::Column;
use super::sort::SortDescriptor;

pub const EMPTY_MESSAGE: &str = "No results found.";
pub const SEARCH_PLACEHOLDER: &str = "Search records...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub sorted: Option<Direction>,
}

impl HeaderCell {
    pub fn indicator(&self) -> &'static str {
        match self.sorted {
            Some(Direction::Asc) => "↑",
            Some(Direction::Desc) => "↓",
            None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Rows(Vec<Vec<String>>),
    /// A single placeholder row spanning every column.
    Empty { colspan: usize, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub summary: String,
    pub previous_disabled: bool,
    pub next_disabled: bool,
}

/// Render model of a table: search box, headers, body and pagination controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub search: String,
    pub headers: Vec<HeaderCell>,
    pub body: TableBody,
    pub footer: Footer,
}

pub fn render_table<R: Record>(
    columns: &[Column],
    rows: &[R],
    page_info: &PageInfo,
    sorting: Option<&SortDescriptor>,
    search: &str,
) -> RenderedTable {
    let headers = columns
        .iter()
        .map(|column| HeaderCell {
            key: column.key().to_string(),
            label: column.header().to_string(),
            sortable: column.is_sortable(),
            sorted: sorting
                .filter(|s| s.column == column.key())
                .map(|s| s.direction),
        })
        .collect();

    let body = match rows.is_empty() {
        true => TableBody::Empty {
            colspan: columns.len(),
            message: EMPTY_MESSAGE.to_string(),
        },
        false => TableBody::Rows(
            rows.iter()
                .map(|row| columns.iter().map(|c| c.render_cell(row)).collect())
                .collect(),
        ),
    };

    RenderedTable {
        search: search.to_string(),
        headers,
        body,
        footer: Footer {
            summary: format!(
                "Page {} of {} | {} total",
                page_info.current_page, page_info.last_page, page_info.total
            ),
            previous_disabled: !page_info.has_previous(),
            next_disabled: !page_info.has_next(),
        },
    }
}

#[derive(Serialize)]
struct HtmlHeader<'a> {
    key: &'a str,
    label: &'a str,
    sortable: bool,
    indicator: &'static str,
}

#[derive(Serialize)]
struct HtmlTable<'a> {
    placeholder: &'static str,
    search: &'a str,
    headers: Vec<HtmlHeader<'a>>,
    rows: &'a [Vec<String>],
    colspan: usize,
    empty_message: Option<&'a str>,
    summary: &'a str,
    previous_disabled: bool,
    next_disabled: bool,
}

impl RenderedTable {
    pub fn to_html(&self) -> Result<String, DataTableError> {
        let (rows, colspan, empty_message) = match &self.body {
            TableBody::Rows(rows) => (rows.as_slice(), 0, None),
            TableBody::Empty { colspan, message } => (&[][..], *colspan, Some(message.as_str())),
        };

        let context = HtmlTable {
            placeholder: SEARCH_PLACEHOLDER,
            search: &self.search,
            headers: self
                .headers
                .iter()
                .map(|h| HtmlHeader {
                    key: &h.key,
                    label: &h.label,
                    sortable: h.sortable,
                    indicator: h.indicator(),
                })
                .collect(),
            rows,
            colspan,
            empty_message,
            summary: &self.footer.summary,
            previous_disabled: self.footer.previous_disabled,
            next_disabled: self.footer.next_disabled,
        };
        templates::render(TABLE_TEMPLATE, &context)
    }

    /// Plain-text rendering for terminals, one padded column per field.
    pub fn to_text(&self) -> String {
        let labels: Vec<String> = self
            .headers
            .iter()
            .map(|h| format!("{}{}", h.label, h.indicator()))
            .collect();

        let mut widths: Vec<usize> = labels.iter().map(|l| l.chars().count()).collect();
        if let TableBody::Rows(rows) = &self.body {
            for row in rows {
                for (i, cell) in row.iter().enumerate() {
                    if let Some(width) = widths.get_mut(i) {
                        *width = (*width).max(cell.chars().count());
                    }
                }
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        let _ = writeln!(out, "Search: {}", self.search);
        let _ = writeln!(out, "{}", line(labels.as_slice()));
        let rule_width = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 3;
        let _ = writeln!(out, "{}", "-".repeat(rule_width));

        match &self.body {
            TableBody::Rows(rows) => {
                for row in rows {
                    let _ = writeln!(out, "{}", line(row.as_slice()));
                }
            }
            TableBody::Empty { message, .. } => {
                let _ = writeln!(out, "{}", message);
            }
        }

        let previous = match self.footer.previous_disabled {
            true => "(prev)",
            false => "[prev]",
        };
        let next = match self.footer.next_disabled {
            true => "(next)",
            false => "[next]",
        };
        let _ = write!(out, "{}  {} {}", self.footer.summary, previous, next);
        out
    }
}

use std::marker::PhantomData;

use log::{debug, Level};
use logging_timer::timer;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

use crate::collate::{LOWER_FN, NOCASE_COLLATION};
use crate::error::DataTableError;

use super::handle::{QueryHandle, CREATED_AT};
use super::page::Paginated;
use super::request::Direction;

/// A table that `SqlQuery` can list. Column names double as the set of fields the
/// query will accept; anything else is ignored.
pub trait SqlTable: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Columns holding text, ordered with the case-insensitive collation.
    const TEXT_COLUMNS: &'static [&'static str];

    /// Builds a row from the columns selected in `COLUMNS` order.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Query handle that renders to a single SQLite statement.
///
/// Ties in the requested order fall back to `rowid`, which keeps paging stable.
pub struct SqlQuery<'c, T> {
    conn: &'c Connection,
    wheres: Vec<String>,
    params: Vec<Value>,
    orders: Vec<String>,
    _table: PhantomData<T>,
}

impl<'c, T: SqlTable> SqlQuery<'c, T> {
    pub fn new(conn: &'c Connection) -> Self {
        SqlQuery {
            conn,
            wheres: Vec::new(),
            params: Vec::new(),
            orders: Vec::new(),
            _table: PhantomData,
        }
    }

    fn known_column(field: &str) -> Option<&'static str> {
        T::COLUMNS.iter().copied().find(|c| *c == field)
    }

    fn where_clause(&self) -> String {
        match self.wheres.is_empty() {
            true => String::new(),
            false => format!("\nWHERE {}", self.wheres.join(" AND ")),
        }
    }

    fn order_clause(&self) -> String {
        let mut order_clause = "\nORDER BY ".to_string();
        for order in &self.orders {
            order_clause.push_str(order);
            order_clause.push_str(", ");
        }
        order_clause.push_str("rowid ASC");
        order_clause
    }

    fn select_list() -> String {
        T::COLUMNS
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn count(&self) -> Result<u64, DataTableError> {
        let sql = format!(
            "SELECT COUNT(*) FROM \"{}\"{}",
            T::TABLE,
            self.where_clause()
        );
        debug!("Count query: {}", sql);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(self.params.iter()), |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

impl<'c, T: SqlTable> QueryHandle for SqlQuery<'c, T> {
    type Item = T;

    fn where_any_like(mut self, fields: &[&str], needle: &str) -> Self {
        let columns: Vec<&'static str> = fields
            .iter()
            .filter_map(|f| Self::known_column(f))
            .collect();

        if columns.is_empty() {
            self.wheres.push("0".to_string());
            return self;
        }

        let needle = needle.to_lowercase();
        let clauses: Vec<String> = columns
            .iter()
            .map(|c| format!("instr({LOWER_FN}(\"{c}\"), ?) > 0"))
            .collect();
        for _ in &columns {
            self.params.push(Value::Text(needle.clone()));
        }
        self.wheres.push(format!("({})", clauses.join(" OR ")));
        self
    }

    fn order_by(mut self, field: &str, direction: Direction) -> Self {
        if let Some(column) = Self::known_column(field) {
            let collate = match T::TEXT_COLUMNS.contains(&column) {
                true => format!(" COLLATE {NOCASE_COLLATION}"),
                false => String::new(),
            };
            self.orders
                .push(format!("\"{}\"{} {}", column, collate, direction.as_sql()));
        }
        self
    }

    fn order_by_default(self) -> Self {
        self.order_by(CREATED_AT, Direction::Desc)
    }

    fn paginate(self, per_page: u32, page: u32) -> Result<Paginated<T>, DataTableError> {
        let _tmr = timer!(Level::Trace; "SqlQuery.paginate", "table={} page={}", T::TABLE, page);

        let per_page = per_page.max(1);
        let page = page.max(1);
        let total = self.count()?;

        let sql = format!(
            "SELECT {} FROM \"{}\"{}{}\nLIMIT ? OFFSET ?",
            Self::select_list(),
            T::TABLE,
            self.where_clause(),
            self.order_clause()
        );
        debug!("Page query: {}", sql);

        let offset = i64::from(page - 1).saturating_mul(i64::from(per_page));
        let mut params = self.params.clone();
        params.push(Value::Integer(i64::from(per_page)));
        params.push(Value::Integer(offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| T::from_row(row))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }

        Ok(Paginated {
            items,
            current_page: page,
            last_page: Paginated::<T>::last_page_for(total, per_page),
            total,
            per_page,
        })
    }
}

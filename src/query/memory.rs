use std::cmp::Ordering;

use crate::error::DataTableError;

use super::field::{FieldValue, Record};
use super::handle::{QueryHandle, CREATED_AT};
use super::page::Paginated;
use super::request::Direction;

/// Query handle over rows held in memory. Sorting is stable, so ties keep the
/// original row order.
#[derive(Debug, Clone)]
pub struct MemoryQuery<R> {
    rows: Vec<R>,
    searches: Vec<(Vec<String>, String)>,
    orders: Vec<(String, Direction)>,
}

impl<R: Record + Clone> MemoryQuery<R> {
    pub fn new(rows: Vec<R>) -> Self {
        MemoryQuery {
            rows,
            searches: Vec::new(),
            orders: Vec::new(),
        }
    }

    fn matches(&self, row: &R) -> bool {
        self.searches.iter().all(|(fields, needle)| {
            fields.iter().any(|field| {
                row.field(field)
                    .map(|value| value.contains_ci(needle))
                    .unwrap_or(false)
            })
        })
    }

    fn compare(&self, a: &R, b: &R) -> Ordering {
        for (field, direction) in &self.orders {
            let left = a.field(field).unwrap_or(FieldValue::Null);
            let right = b.field(field).unwrap_or(FieldValue::Null);
            let ord = match direction {
                Direction::Asc => left.compare(&right),
                Direction::Desc => right.compare(&left),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Filters and orders without paging.
    pub fn get(self) -> Vec<R> {
        let mut rows: Vec<R> = self
            .rows
            .iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| self.compare(a, b));
        rows
    }
}

impl<R: Record + Clone> QueryHandle for MemoryQuery<R> {
    type Item = R;

    fn where_any_like(mut self, fields: &[&str], needle: &str) -> Self {
        self.searches.push((
            fields.iter().map(|f| f.to_string()).collect(),
            needle.to_lowercase(),
        ));
        self
    }

    fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.orders.push((field.to_string(), direction));
        self
    }

    fn order_by_default(self) -> Self {
        self.order_by(CREATED_AT, Direction::Desc)
    }

    fn paginate(self, per_page: u32, page: u32) -> Result<Paginated<R>, DataTableError> {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let rows = self.get();
        let total = rows.len() as u64;
        let offset = (page as usize - 1).saturating_mul(per_page as usize);

        Ok(Paginated {
            items: rows.into_iter().skip(offset).take(per_page as usize).collect(),
            current_page: page,
            last_page: Paginated::<R>::last_page_for(total, per_page),
            total,
            per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn rows() -> Vec<Map<String, Value>> {
        [
            json!({"name": "Alice", "age": 30, "created_at": 3}),
            json!({"name": "bob", "age": 25, "created_at": 1}),
            json!({"name": "Carol", "age": 30, "created_at": 2}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
    }

    fn names(rows: &[Map<String, Value>]) -> Vec<&str> {
        rows.iter().map(|r| r["name"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let result = MemoryQuery::new(rows()).where_any_like(&["name"], "A").get();
        assert_eq!(names(&result), vec!["Alice", "Carol"]);
    }

    #[test]
    fn test_unknown_search_field_matches_nothing() {
        let result = MemoryQuery::new(rows()).where_any_like(&["nope"], "a").get();
        assert!(result.is_empty());
    }

    #[test]
    fn test_default_order_is_newest_first() {
        let result = MemoryQuery::new(rows()).order_by_default().get();
        assert_eq!(names(&result), vec!["Alice", "Carol", "bob"]);
    }

    #[test]
    fn test_ties_keep_row_order() {
        let result = MemoryQuery::new(rows())
            .order_by("age", Direction::Desc)
            .get();
        assert_eq!(names(&result), vec!["Alice", "Carol", "bob"]);
    }

    #[test]
    fn test_page_beyond_last_is_empty() {
        let page = MemoryQuery::new(rows()).paginate(2, 5).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 5);
        assert_eq!(page.last_page, 2);
        assert_eq!(page.total, 3);
    }
}

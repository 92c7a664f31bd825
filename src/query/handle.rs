use crate::error::DataTableError;

use super::page::Paginated;
use super::request::Direction;

/// Field that `order_by_default` sorts on, newest first.
pub const CREATED_AT: &str = "created_at";

/// A chainable collection query: the storage capability the data table service drives.
///
/// Implementations ignore field names they do not know rather than failing.
pub trait QueryHandle: Sized {
    type Item;

    /// Keeps rows where any of `fields` contains `needle`, case-insensitively.
    fn where_any_like(self, fields: &[&str], needle: &str) -> Self;

    fn order_by(self, field: &str, direction: Direction) -> Self;

    /// Newest-created rows first.
    fn order_by_default(self) -> Self;

    fn paginate(self, per_page: u32, page: u32) -> Result<Paginated<Self::Item>, DataTableError>;
}

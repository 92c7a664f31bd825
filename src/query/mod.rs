//! Server side of the data table: turns URL parameters into a filtered, sorted page.

pub mod field;
pub mod handle;
pub mod memory;
pub mod page;
pub mod request;
pub mod service;
pub mod sql;

pub use field::{FieldValue, Record};
pub use handle::QueryHandle;
pub use memory::MemoryQuery;
pub use page::{PageInfo, PageLinks, PageResult, Paginated, TableProps};
pub use request::{Direction, TableParams, TableRequest};
pub use service::DataTableService;
pub use sql::{SqlQuery, SqlTable};

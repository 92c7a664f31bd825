use crate::db::Database;
use crate::query::DataTableService;

/// Shared application state passed to all Axum handlers via `.with_state()`.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub service: DataTableService,
}

impl AppState {
    pub fn new(db: Database, service: DataTableService) -> Self {
        Self { db, service }
    }
}

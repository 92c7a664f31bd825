use std::fs;
use std::path::Path;
use std::time::Duration;

use log::info;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;

use crate::collate;
use crate::error::DataTableError;

pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const SCHEMA_VERSION: &str = "1";
const POOL_SIZE: u32 = 8;

const CREATE_SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_users_created_at ON users (created_at);

    INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', '1');
";

/// Pooled handle to the SQLite database. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self, DataTableError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path)
            .with_init(|conn| {
                conn.busy_timeout(Duration::from_secs(5))?;
                collate::register(conn)
            });
        let pool = Pool::builder().max_size(POOL_SIZE).build(manager)?;

        let db = Self { pool };
        db.ensure_schema()?;

        info!("Database opened at: {}", db_path.display());
        Ok(db)
    }

    pub fn get_connection(&self) -> Result<PooledConnection, DataTableError> {
        Ok(self.pool.get()?)
    }

    fn ensure_schema(&self) -> Result<(), DataTableError> {
        let conn = self.get_connection()?;

        let table_exists: bool = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='meta'",
                [],
                |row| row.get::<_, i32>(0),
            )
            .map(|count| count > 0)?;

        if !table_exists {
            info!("Creating database schema (version {})", SCHEMA_VERSION);
            conn.execute_batch(CREATE_SCHEMA_SQL)?;
            return Ok(());
        }

        let stored_version: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match stored_version.as_deref() {
            Some(SCHEMA_VERSION) => Ok(()),
            Some(other) => Err(DataTableError::Error(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, other
            ))),
            None => Err(DataTableError::Error("Schema version missing".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_schema() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("nested").join("test.db")).unwrap();
        let conn = db.get_connection().unwrap();

        let version: String = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        let users: i64 = conn
            .query_row("SELECT count(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users, 0);
    }

    #[test]
    fn test_reopen_existing_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        drop(Database::open(&path).unwrap());
        assert!(Database::open(&path).is_ok());
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        {
            let db = Database::open(&path).unwrap();
            db.get_connection()
                .unwrap()
                .execute(
                    "UPDATE meta SET value = '99' WHERE key = 'schema_version'",
                    [],
                )
                .unwrap();
        }

        match Database::open(&path) {
            Err(DataTableError::Error(msg)) => assert!(msg.contains("mismatch")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected schema version mismatch"),
        }
    }
}

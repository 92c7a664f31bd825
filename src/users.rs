use chrono::{DateTime, Duration, Utc};
use log::info;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::DataTableError;
use crate::query::{
    DataTableService, FieldValue, PageResult, Record, SqlQuery, SqlTable, TableRequest,
};
use crate::table::Column;

/// Page component rendered for the users listing.
pub const USERS_COMPONENT: &str = "Users/Index";
pub const USERS_PATH: &str = "/users";

pub const SEARCHABLE: &[&str] = &["name", "email"];
pub const SORTABLE: &[&str] = &["name", "email", "created_at"];

const FIRST_NAMES: [&str; 12] = [
    "Alice", "bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi", "Ivan", "Judy",
    "Mallory", "Oscar",
];
const LAST_NAMES: [&str; 6] = ["Anders", "Baker", "Chen", "Diaz", "Evans", "Fischer"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl SqlTable for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email", "created_at"];
    const TEXT_COLUMNS: &'static [&'static str] = &["name", "email"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let secs: i64 = row.get(3)?;
        let created_at = DateTime::from_timestamp(secs, 0)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, secs))?;
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            created_at,
        })
    }
}

impl Record for User {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Integer(self.id)),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "email" => Some(FieldValue::Text(self.email.clone())),
            "created_at" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

impl User {
    pub fn insert(
        conn: &Connection,
        name: &str,
        email: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, DataTableError> {
        conn.execute(
            "INSERT INTO users (name, email, created_at) VALUES (?, ?, ?)",
            params![name, email, created_at.timestamp()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Inserts `count` demo users, the newest created at `now` and each following one
    /// an hour earlier.
    pub fn seed(db: &Database, count: u32, now: DateTime<Utc>) -> Result<u32, DataTableError> {
        let mut conn = db.get_connection()?;
        let tx = conn.transaction()?;

        for i in 0..count {
            let first = FIRST_NAMES[i as usize % FIRST_NAMES.len()];
            let last = LAST_NAMES[(i as usize / FIRST_NAMES.len()) % LAST_NAMES.len()];
            let name = format!("{first} {last}");
            let email = format!(
                "{}.{}{}@example.com",
                first.to_lowercase(),
                last.to_lowercase(),
                i
            );
            User::insert(&tx, &name, &email, now - Duration::hours(i64::from(i)))?;
        }

        tx.commit()?;
        info!("Seeded {} users", count);
        Ok(count)
    }

    /// Runs the users listing query for one table request.
    pub fn list_page(
        db: &Database,
        service: &DataTableService,
        request: &TableRequest,
    ) -> Result<PageResult<User>, DataTableError> {
        let conn = db.get_connection()?;
        let query = service.apply_filters(SqlQuery::<User>::new(&conn), request, SEARCHABLE, SORTABLE);
        service.paginate(query, request)
    }
}

fn format_created(value: Option<FieldValue>) -> String {
    match value {
        Some(FieldValue::Timestamp(ts)) => ts.format("%Y-%m-%d").to_string(),
        Some(FieldValue::Text(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or(s),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

pub fn user_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name"),
        Column::new("email", "Email"),
        Column::new("created_at", "Created").with_cell(|row| format_created(row.field("created_at"))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Direction, TableParams};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
    }

    fn database() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("users.db")).unwrap();
        (dir, db)
    }

    fn list(db: &Database, params: TableParams) -> PageResult<User> {
        let request = TableRequest::from_params(USERS_PATH, &params);
        User::list_page(db, &DataTableService::default(), &request).unwrap()
    }

    fn names(result: &PageResult<User>) -> Vec<&str> {
        result.items.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn test_search_scenario_against_sqlite() {
        let (_dir, db) = database();
        let conn = db.get_connection().unwrap();
        User::insert(&conn, "Alice", "a1@example.com", now()).unwrap();
        User::insert(&conn, "bob", "b@example.com", now() - Duration::hours(1)).unwrap();
        User::insert(&conn, "Carol", "c@example.com", now() - Duration::hours(2)).unwrap();

        let request = TableRequest::from_params(
            USERS_PATH,
            &TableParams {
                search: Some("a".into()),
                ..Default::default()
            },
        );
        let service = DataTableService::default();
        let query = service.apply_filters(SqlQuery::<User>::new(&conn), &request, &["name"], SORTABLE);
        let result = service.paginate(query, &request).unwrap();
        assert_eq!(names(&result), vec!["Alice", "Carol"]);
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let (_dir, db) = database();
        let conn = db.get_connection().unwrap();
        User::insert(&conn, "Émile Zola", "emile@example.com", now()).unwrap();
        User::insert(&conn, "Ödön Horváth", "odon@example.com", now()).unwrap();

        for needle in ["émile", "ÉMILE", "horvÁth"] {
            let result = list(
                &db,
                TableParams {
                    search: Some(needle.into()),
                    ..Default::default()
                },
            );
            assert_eq!(result.page_info.total, 1, "search for {needle}");
        }
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let (_dir, db) = database();
        let conn = db.get_connection().unwrap();
        User::insert(&conn, "Zed", "z@example.com", now()).unwrap();
        User::insert(&conn, "bob", "b@example.com", now()).unwrap();
        User::insert(&conn, "Alice", "a@example.com", now()).unwrap();

        let result = list(
            &db,
            TableParams {
                sort: Some("name".into()),
                direction: Some("asc".into()),
                ..Default::default()
            },
        );
        assert_eq!(names(&result), vec!["Alice", "bob", "Zed"]);
    }

    #[test]
    fn test_seed_and_default_order() {
        let (_dir, db) = database();
        assert_eq!(User::seed(&db, 25, now()).unwrap(), 25);

        let result = list(&db, TableParams::default());
        assert_eq!(result.page_info.total, 25);
        assert_eq!(result.page_info.last_page, 3);
        assert_eq!(result.items.len(), 10);
        assert_eq!(result.items[0].created_at, now());
        for pair in result.items.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn test_sort_and_page_links() {
        let (_dir, db) = database();
        User::seed(&db, 25, now()).unwrap();

        let result = list(
            &db,
            TableParams {
                search: Some("example".into()),
                sort: Some("email".into()),
                direction: Some("asc".into()),
                page: Some(3),
            },
        );
        assert_eq!(result.items.len(), 5);
        assert_eq!(result.page_info.current_page, 3);
        assert_eq!(result.links.next, None);
        assert_eq!(
            result.links.prev.as_deref(),
            Some("/users?search=example&sort=email&direction=asc&page=2")
        );

        let emails: Vec<&str> = result.items.iter().map(|u| u.email.as_str()).collect();
        let mut sorted = emails.clone();
        sorted.sort();
        assert_eq!(emails, sorted);
    }

    #[test]
    fn test_unknown_sort_uses_default_order() {
        let (_dir, db) = database();
        User::seed(&db, 5, now()).unwrap();

        let unknown = list(
            &db,
            TableParams {
                sort: Some("id; DROP TABLE users".into()),
                direction: Some(Direction::Asc.to_string()),
                ..Default::default()
            },
        );
        let default = list(&db, TableParams::default());
        assert_eq!(unknown.items, default.items);
    }

    #[test]
    fn test_created_cell_formats_date() {
        let user = User {
            id: 1,
            name: "Alice".into(),
            email: "alice@example.com".into(),
            created_at: now(),
        };
        let columns = user_columns();
        assert_eq!(columns[2].render_cell(&user), "2025-01-15");

        let json = serde_json::to_value(&user).unwrap();
        let row = json.as_object().unwrap();
        assert_eq!(columns[2].render_cell(row), "2025-01-15");
        assert_eq!(columns[0].render_cell(row), "Alice");
    }
}

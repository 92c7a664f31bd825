//! Case-insensitive text handling shared by SQLite and the in-memory query handle.
//!
//! SQLite's built-in `LIKE` and `NOCASE` only fold ASCII, so each connection gets a
//! Unicode-aware lowercase function and collation registered on open.

use std::cmp::Ordering;

use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

/// SQL scalar: `unicode_lower(text)`.
pub const LOWER_FN: &str = "unicode_lower";
/// SQL collation used when ordering text columns.
pub const NOCASE_COLLATION: &str = "unicode_nocase";

/// Orders text ignoring case, falling back to byte order so that values differing
/// only in case still sort deterministically.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn register(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let lowered = match ctx.get_raw(0) {
                ValueRef::Null | ValueRef::Blob(_) => None,
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(r) => Some(r.to_string()),
                ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).to_lowercase()),
            };
            Ok(lowered)
        },
    )?;
    conn.create_collation(NOCASE_COLLATION, compare_text)
}

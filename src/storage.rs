//! SQLite storage: config keys and persisted JSON documents.
//! Thread-local so each thread (e.g. each test thread) has its own DB; the
//! host app drives the core from a single thread.

use crate::error::CoreError;
use crate::rust_log;
use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::path::Path;

/// Name of the ledger document (`{"M/D/YYYY": {total, categories: [...]}}`).
pub const DOC_DAILY_EXPENSES: &str = "dailyExpenses";
/// Name of the category registry document (`[{label, icon}, ...]`).
pub const DOC_CATEGORIES: &str = "categories";

thread_local! {
    static DB: RefCell<Option<Connection>> = RefCell::new(None);
}

/// True if the current thread has called init() successfully.
pub fn is_ready() -> bool {
    DB.with(|cell| cell.borrow().is_some())
}

pub fn init(path: &str) -> Result<(), CoreError> {
    let path_obj = Path::new(path);
    std::fs::create_dir_all(path_obj).map_err(|e| CoreError::Persistence(e.to_string()))?;
    let db_path = path_obj.join("gastos.db");
    rust_log!("[gastos_rs] storage::init path={:?} db={:?}", path, db_path);
    let conn = Connection::open(&db_path)?;
    create_tables(&conn)?;
    DB.with(|cell| *cell.borrow_mut() = Some(conn));
    rust_log!("[gastos_rs] storage::init OK");
    Ok(())
}

fn create_tables(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config (key TEXT PRIMARY KEY, value TEXT);
        CREATE TABLE IF NOT EXISTS documents (
            name TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn with_db<F, T>(f: F) -> Result<T, CoreError>
where
    F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
{
    DB.with(|cell| {
        let borrow = cell.borrow();
        let conn = borrow
            .as_ref()
            .ok_or_else(|| CoreError::State("Storage not initialized".to_string()))?;
        f(conn).map_err(CoreError::from)
    })
}

// Config
pub fn config_get(key: &str) -> Result<Option<String>, CoreError> {
    with_db(|conn| {
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }
        Ok(None)
    })
}

pub fn config_set(key: &str, value: &str) -> Result<(), CoreError> {
    with_db(|conn| {
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    })
}

pub fn config_remove(key: &str) -> Result<(), CoreError> {
    with_db(|conn| {
        conn.execute("DELETE FROM config WHERE key = ?1", params![key])?;
        Ok(())
    })
}

// Documents
pub fn doc_get(name: &str) -> Result<Option<String>, CoreError> {
    with_db(|conn| {
        let mut stmt = conn.prepare("SELECT body FROM documents WHERE name = ?1")?;
        let mut rows = stmt.query(params![name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }
        Ok(None)
    })
}

pub fn doc_set(name: &str, body: &str) -> Result<(), CoreError> {
    let updated_at = chrono::Utc::now().to_rfc3339();
    with_db(|conn| {
        conn.execute(
            r#"
            INSERT INTO documents (name, body, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET body = ?2, updated_at = ?3
            "#,
            params![name, body, updated_at],
        )?;
        Ok(())
    })
}

pub fn doc_remove(name: &str) -> Result<(), CoreError> {
    with_db(|conn| {
        conn.execute("DELETE FROM documents WHERE name = ?1", params![name])?;
        Ok(())
    })
}

pub fn clear_all() -> Result<(), CoreError> {
    with_db(|conn| {
        conn.execute_batch(
            r#"
            DELETE FROM documents;
            DELETE FROM config;
            "#,
        )?;
        Ok(())
    })
}

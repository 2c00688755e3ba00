use crate::errors::{AppError, AppResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub type DbPool = Arc<Mutex<Connection>>;

const SCHEMA: &str = include_str!("../migrations/001_init.sql");

pub fn init_db(data_dir: &Path) -> AppResult<DbPool> {
    std::fs::create_dir_all(data_dir)?;
    let db_path = data_dir.join("quant_desk.db");
    let conn = Connection::open(&db_path)?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;")?;
    conn.execute_batch(SCHEMA)?;

    tracing::info!("database initialized at {}", db_path.display());
    Ok(Arc::new(Mutex::new(conn)))
}

/// Fresh schema in memory. Used by tests and throwaway runs.
pub fn open_in_memory() -> AppResult<DbPool> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    conn.execute_batch(SCHEMA)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Fixed-width UTC timestamps so TEXT comparison in SQL orders correctly.
fn ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn lock(db: &DbPool) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
    db.lock().map_err(|e| AppError::Database(format!("lock poisoned: {e}")))
}

// ── Users ──

/// Returns false when the username is already taken.
pub fn insert_user(db: &DbPool, username: &str, password_hash: &str, now: DateTime<Utc>) -> AppResult<bool> {
    let conn = lock(db)?;
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![username, password_hash, ts(now)],
    )?;
    Ok(inserted == 1)
}

pub fn get_password_hash(db: &DbPool, username: &str) -> AppResult<Option<String>> {
    let conn = lock(db)?;
    let hash = conn
        .query_row(
            "SELECT password_hash FROM users WHERE username = ?1",
            rusqlite::params![username],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(hash)
}

// ── Sessions ──

pub fn insert_session(db: &DbPool, token: &str, username: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
    let conn = lock(db)?;
    conn.execute(
        "INSERT INTO sessions (token, username, expires_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![token, username, ts(expires_at)],
    )?;
    Ok(())
}

/// Username owning a live session. Expired and unknown tokens both yield None.
pub fn session_user(db: &DbPool, token: &str, now: DateTime<Utc>) -> AppResult<Option<String>> {
    let conn = lock(db)?;
    let user = conn
        .query_row(
            "SELECT s.username FROM sessions s JOIN users u ON u.username = s.username
             WHERE s.token = ?1 AND s.expires_at > ?2",
            rusqlite::params![token, ts(now)],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(user)
}

pub fn purge_expired_sessions(db: &DbPool, now: DateTime<Utc>) -> AppResult<usize> {
    let conn = lock(db)?;
    let removed = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= ?1",
        rusqlite::params![ts(now)],
    )?;
    Ok(removed)
}

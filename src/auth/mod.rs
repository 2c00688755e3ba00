pub mod password;

use crate::db::{self, DbPool};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};

const MAX_USERNAME_LEN: usize = 64;

/// Hashing cost and session lifetime applied to register/login.
#[derive(Debug, Clone, Copy)]
pub struct AuthSettings {
    pub hash_cost: u32,
    pub token_ttl_hours: i64,
}

/// Bearer credential handed back on register/login.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub username: String,
}

/// Create the account and sign it in.
pub fn register(
    db: &DbPool,
    username: &str,
    password: &str,
    settings: AuthSettings,
    now: DateTime<Utc>,
) -> AppResult<TokenResponse> {
    let username = validate_credentials(username, password)?;

    let hash = password::hash_password(password, settings.hash_cost)?;
    if !db::insert_user(db, username, &hash, now)? {
        return Err(AppError::Conflict("User already exists".into()));
    }

    tracing::info!(username = %username, "user registered");
    issue_token(db, username, settings.token_ttl_hours, now)
}

/// Unknown usernames cost one hash like a wrong password does.
pub fn login(
    db: &DbPool,
    username: &str,
    password: &str,
    settings: AuthSettings,
    now: DateTime<Utc>,
) -> AppResult<TokenResponse> {
    let username = username.trim();
    let verified = match db::get_password_hash(db, username)? {
        Some(stored) => password::verify_password(password, &stored),
        None => password::reject_unknown_user(password, settings.hash_cost),
    };
    if !verified {
        tracing::warn!(username = %username, "login rejected");
        return Err(AppError::Auth("Invalid credentials".into()));
    }

    tracing::info!(username = %username, "user logged in");
    issue_token(db, username, settings.token_ttl_hours, now)
}

/// Resolve a bearer token to its username.
pub fn authenticate(db: &DbPool, token: &str, now: DateTime<Utc>) -> AppResult<String> {
    db::session_user(db, token, now)?
        .ok_or_else(|| AppError::Auth("Could not validate credentials".into()))
}

fn issue_token(db: &DbPool, username: &str, ttl_hours: i64, now: DateTime<Utc>) -> AppResult<TokenResponse> {
    let purged = db::purge_expired_sessions(db, now)?;
    if purged > 0 {
        tracing::debug!(purged, "expired sessions removed");
    }

    let token = format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple());
    db::insert_session(db, &token, username, now + Duration::hours(ttl_hours))?;

    Ok(TokenResponse {
        access_token: token,
        token_type: "bearer",
        username: username.to_string(),
    })
}

fn validate_credentials<'a>(username: &'a str, password: &str) -> AppResult<&'a str> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::InvalidRequest("Username and password are required".into()));
    }
    if username.len() > MAX_USERNAME_LEN || password.len() > password::MAX_PASSWORD_BYTES {
        return Err(AppError::InvalidRequest("Username or password too long".into()));
    }
    Ok(username)
}

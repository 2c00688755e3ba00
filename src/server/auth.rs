use super::run_blocking;
use crate::auth;
use crate::errors::AppError;
use crate::state::{AppState, PerfCounters};
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use std::sync::Arc;

/// Username behind a valid `Authorization: Bearer <token>` header.
/// Rejects with 401 before the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            PerfCounters::bump(&state.counters.auth_failures);
            return Err(AppError::Auth("Not authenticated".into()));
        };

        let db = state.db.clone();
        let token = token.to_string();
        let lookup = run_blocking(move || auth::authenticate(&db, &token, chrono::Utc::now())).await;

        match lookup {
            Ok(username) => Ok(AuthUser(username)),
            Err(e) => {
                if matches!(e, AppError::Auth(_)) {
                    PerfCounters::bump(&state.counters.auth_failures);
                }
                Err(e)
            }
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

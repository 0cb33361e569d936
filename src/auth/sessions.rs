// src/auth/sessions.rs
use crate::auth::token::{issue_token, presented_hash};
use crate::db::auth as db_auth;
use crate::errors::ServerError;
use rusqlite::Connection;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
    pub email: String,
}

pub fn create_session(conn: &Connection, user_id: i64, now: i64) -> Result<String, ServerError> {
    let token = issue_token();
    db_auth::insert_session(conn, user_id, &token.hash, now, now + SESSION_TTL_SECS)?;
    Ok(token.raw)
}

pub fn load_user_from_session(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<SessionUser>, ServerError> {
    let Some(hash) = presented_hash(raw_token) else {
        return Ok(None);
    };
    Ok(db_auth::find_session_user(conn, &hash, now)?
        .map(|(user_id, email)| SessionUser { user_id, email }))
}

pub fn revoke_session(conn: &Connection, raw_token: &str, now: i64) -> Result<(), ServerError> {
    match presented_hash(raw_token) {
        Some(hash) => db_auth::revoke_session(conn, &hash, now),
        None => Ok(()),
    }
}

/// `Set-Cookie` value for a fresh session.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECS}")
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Pulls the session token out of a `Cookie` header.
pub fn session_token_from_cookie(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|v| !v.is_empty())
}

// src/auth/magic.rs
use crate::errors::ServerError;
use rusqlite::Connection;

use crate::auth::token::{issue_token, presented_hash};
use crate::db::auth as db_auth;

#[derive(Debug, Clone)]
pub struct MagicLinkConfig {
    /// TTL for magic links in seconds.
    pub ttl_secs: i64,
    /// Origin prepended to emailed links, e.g. "https://laundryfinder.example".
    pub public_url: String,
    pub magic_path: String,
}

impl Default for MagicLinkConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 15 * 60,
            public_url: String::new(),
            magic_path: "/auth/magic".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedMagicLink {
    pub email: String,
    pub user_id: i64,
    /// Raw token; only its hash is stored.
    pub token: String,
    pub expires_at: i64,
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct RedeemedMagicLink {
    pub user_id: i64,
    pub email: String,
}

pub struct MagicLinkService {
    cfg: MagicLinkConfig,
}

impl MagicLinkService {
    pub fn new(cfg: MagicLinkConfig) -> Self {
        Self { cfg }
    }

    /// Trim + lowercase, minimal sanity check.
    pub fn normalize_email(email: &str) -> Result<String, ServerError> {
        let e = email.trim().to_lowercase();
        let valid = match e.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !e.contains(' ')
            }
            None => false,
        };
        if !valid {
            return Err(ServerError::BadRequest("invalid email".into()));
        }
        Ok(e)
    }

    fn build_link(&self, token: &str) -> String {
        let base = self.cfg.public_url.trim_end_matches('/');
        format!("{base}{}?token={token}", self.cfg.magic_path)
    }

    /// Owners sign up and sign in through the same link: the user row is
    /// created on first request and only the token hash is persisted.
    pub fn request_link(
        &self,
        conn: &Connection,
        email: &str,
        now: i64,
    ) -> Result<IssuedMagicLink, ServerError> {
        let email = Self::normalize_email(email)?;
        let user_id = db_auth::get_or_create_user(conn, &email, now)?;

        let token = issue_token();
        let expires_at = now + self.cfg.ttl_secs;
        db_auth::insert_magic_link(conn, user_id, &token.hash, now, expires_at)?;

        Ok(IssuedMagicLink {
            link: self.build_link(&token.raw),
            email,
            user_id,
            token: token.raw,
            expires_at,
        })
    }

    pub fn redeem(
        &self,
        conn: &Connection,
        token: &str,
        now: i64,
    ) -> Result<RedeemedMagicLink, ServerError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServerError::BadRequest("missing token".into()));
        }

        let invalid = || ServerError::Unauthorized("invalid or expired link".into());
        let hash = presented_hash(token).ok_or_else(invalid)?;
        let user_id = db_auth::consume_magic_link(conn, &hash, now)?.ok_or_else(invalid)?;

        let email = db_auth::get_user_email(conn, user_id)?.ok_or(ServerError::NotFound)?;
        db_auth::touch_last_login(conn, user_id, now)?;

        Ok(RedeemedMagicLink { user_id, email })
    }
}

// src/db/magic_auth.rs
//
// Sign-in flow glue: magic-link issue/redeem plus session creation, run on
// the worker's connection.

use crate::auth::magic::{IssuedMagicLink, MagicLinkConfig, MagicLinkService};
use crate::auth::sessions::{self, SessionUser};
use crate::db::connection::Database;
use crate::errors::ServerError;

pub fn request_magic_link(
    db: &Database,
    cfg: &MagicLinkConfig,
    email: &str,
    now: i64,
) -> Result<IssuedMagicLink, ServerError> {
    let svc = MagicLinkService::new(cfg.clone());
    db.with_conn(|conn| svc.request_link(conn, email, now))
}

/// Redeems a single-use token and opens a session.
/// Returns the raw session token for the cookie.
pub fn redeem_magic_link(
    db: &Database,
    cfg: &MagicLinkConfig,
    token: &str,
    now: i64,
) -> Result<(String, SessionUser), ServerError> {
    let svc = MagicLinkService::new(cfg.clone());

    db.with_conn(|conn| {
        let redeemed = svc.redeem(conn, token, now)?;
        let session_token = sessions::create_session(conn, redeemed.user_id, now)?;
        Ok((
            session_token,
            SessionUser {
                user_id: redeemed.user_id,
                email: redeemed.email,
            },
        ))
    })
}

pub fn current_user(
    db: &Database,
    session_token: Option<&str>,
    now: i64,
) -> Result<Option<SessionUser>, ServerError> {
    let Some(token) = session_token else {
        return Ok(None);
    };
    db.with_conn(|conn| sessions::load_user_from_session(conn, token, now))
}

pub fn sign_out(db: &Database, session_token: &str, now: i64) -> Result<(), ServerError> {
    db.with_conn(|conn| sessions::revoke_session(conn, session_token, now))
}

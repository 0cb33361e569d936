// src/db/auth.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::token::TokenHash;
use crate::errors::ServerError;

/// Id of the owner account for `email`, creating it on first sight.
/// `email` must already be normalized.
pub fn get_or_create_user(conn: &Connection, email: &str, now: i64) -> Result<i64, ServerError> {
    conn.query_row(
        "insert into users (email, created_at) values (?1, ?2)
         on conflict(email) do update set email = excluded.email
         returning id",
        params![email, now],
        |row| row.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("upsert owner failed: {e}")))
}

pub fn get_user_email(conn: &Connection, user_id: i64) -> Result<Option<String>, ServerError> {
    conn.query_row(
        "select email from users where id = ?",
        params![user_id],
        |r| r.get(0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user email failed: {e}")))
}

pub fn touch_last_login(conn: &Connection, user_id: i64, now: i64) -> Result<(), ServerError> {
    conn.execute(
        "update users set last_login_at = ? where id = ?",
        params![now, user_id],
    )
    .map_err(|e| ServerError::DbError(format!("update last_login_at failed: {e}")))?;
    Ok(())
}

pub fn insert_magic_link(
    conn: &Connection,
    user_id: i64,
    token_hash: &TokenHash,
    created_at: i64,
    expires_at: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "insert into magic_links (user_id, token_hash, created_at, expires_at) values (?, ?, ?, ?)",
        params![user_id, &token_hash[..], created_at, expires_at],
    )
    .map_err(|e| ServerError::DbError(format!("insert magic link failed: {e}")))?;
    Ok(())
}

/// Marks a live, unused link as used and returns its owner. A single
/// conditional update, so two concurrent redemptions cannot both win.
pub fn consume_magic_link(
    conn: &Connection,
    token_hash: &TokenHash,
    now: i64,
) -> Result<Option<i64>, ServerError> {
    conn.query_row(
        "update magic_links set used_at = ?2
         where token_hash = ?1 and used_at is null and expires_at > ?2
         returning user_id",
        params![&token_hash[..], now],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("consume magic link failed: {e}")))
}

pub fn insert_session(
    conn: &Connection,
    user_id: i64,
    token_hash: &TokenHash,
    created_at: i64,
    expires_at: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "insert into sessions (user_id, token_hash, created_at, expires_at) values (?, ?, ?, ?)",
        params![user_id, &token_hash[..], created_at, expires_at],
    )
    .map_err(|e| ServerError::DbError(format!("create session failed: {e}")))?;
    Ok(())
}

/// Live session lookup: unexpired and not revoked.
pub fn find_session_user(
    conn: &Connection,
    token_hash: &TokenHash,
    now: i64,
) -> Result<Option<(i64, String)>, ServerError> {
    conn.query_row(
        r#"
        select u.id, u.email
        from sessions s
        join users u on u.id = s.user_id
        where s.token_hash = ?
          and s.expires_at > ?
          and s.revoked_at is null
        "#,
        params![&token_hash[..], now],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("session lookup failed: {e}")))
}

pub fn revoke_session(
    conn: &Connection,
    token_hash: &TokenHash,
    now: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "update sessions set revoked_at = ? where token_hash = ? and revoked_at is null",
        params![now, &token_hash[..]],
    )
    .map_err(|e| ServerError::DbError(format!("revoke session failed: {e}")))?;
    Ok(())
}

/// Deletes used or expired sign-in links and dead sessions. Returns rows removed.
pub fn purge_stale_auth(conn: &Connection, now: i64) -> Result<usize, ServerError> {
    let links = conn
        .execute(
            "delete from magic_links where used_at is not null or expires_at <= ?",
            params![now],
        )
        .map_err(|e| ServerError::DbError(format!("purge magic links failed: {e}")))?;
    let sessions = conn
        .execute(
            "delete from sessions where revoked_at is not null or expires_at <= ?",
            params![now],
        )
        .map_err(|e| ServerError::DbError(format!("purge sessions failed: {e}")))?;
    Ok(links + sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::hash_token;
    use crate::tests::utils::init_test_db;

    #[test]
    fn get_or_create_user_is_idempotent() {
        let (_dir, db) = init_test_db();
        let (id1, id2) = db
            .with_conn(|conn| {
                let a = get_or_create_user(conn, "test@example.com", 1000)?;
                let b = get_or_create_user(conn, "test@example.com", 1001)?;
                Ok((a, b))
            })
            .unwrap();
        assert_eq!(id1, id2);
        let email = db.with_conn(|conn| get_user_email(conn, id1)).unwrap();
        assert_eq!(email.as_deref(), Some("test@example.com"));
    }

    #[test]
    fn sign_in_link_is_single_use_and_expires() {
        let (_dir, db) = init_test_db();
        let live = hash_token("live");
        let stale = hash_token("stale");

        let (owner, first, second, late) = db
            .with_conn(|conn| {
                let owner = get_or_create_user(conn, "c@d.com", 1000)?;
                insert_magic_link(conn, owner, &live, 1000, 1900)?;
                insert_magic_link(conn, owner, &stale, 1000, 1010)?;
                let first = consume_magic_link(conn, &live, 1001)?;
                let second = consume_magic_link(conn, &live, 1002)?;
                let late = consume_magic_link(conn, &stale, 1011)?;
                Ok((owner, first, second, late))
            })
            .unwrap();

        assert_eq!(first, Some(owner));
        assert_eq!(second, None);
        assert_eq!(late, None);
    }

    #[test]
    fn revoked_session_no_longer_resolves() {
        let (_dir, db) = init_test_db();
        let hash = hash_token("session");

        let (before, after) = db
            .with_conn(|conn| {
                let user_id = get_or_create_user(conn, "s@t.com", 10)?;
                insert_session(conn, user_id, &hash, 10, 1000)?;
                let before = find_session_user(conn, &hash, 20)?;
                revoke_session(conn, &hash, 30)?;
                let after = find_session_user(conn, &hash, 40)?;
                Ok((before, after))
            })
            .unwrap();

        assert_eq!(before.map(|(_, email)| email).as_deref(), Some("s@t.com"));
        assert!(after.is_none());
    }

    #[test]
    fn purge_keeps_only_live_rows() {
        let (_dir, db) = init_test_db();
        let removed = db
            .with_conn(|conn| {
                let owner = get_or_create_user(conn, "p@q.com", 1)?;
                insert_magic_link(conn, owner, &hash_token("old-link"), 1, 5)?;
                insert_magic_link(conn, owner, &hash_token("new-link"), 1, 500)?;
                insert_session(conn, owner, &hash_token("old-session"), 1, 5)?;
                insert_session(conn, owner, &hash_token("new-session"), 1, 500)?;
                purge_stale_auth(conn, 100)
            })
            .unwrap();
        assert_eq!(removed, 2);
    }
}

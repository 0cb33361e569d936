// src/db/reviews.rs
use crate::db::laundromats::refresh_rating;
use crate::domain::directory::Review;
use crate::errors::ServerError;
use rusqlite::{params, Connection};

/// Inserts a review and recomputes the listing's rating and review count.
pub fn add_review(
    conn: &mut Connection,
    laundromat_id: i64,
    user_id: i64,
    rating: u8,
    comment: Option<&str>,
    now: i64,
) -> Result<Review, ServerError> {
    let comment = comment.map(str::trim).filter(|c| !c.is_empty());

    let tx = conn
        .transaction()
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    tx.execute(
        "INSERT INTO reviews (laundromat_id, user_id, rating, comment, created_at) VALUES (?, ?, ?, ?, ?)",
        params![laundromat_id, user_id, rating, comment, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert review failed: {e}")))?;
    let id = tx.last_insert_rowid();

    refresh_rating(&tx, laundromat_id, now)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit tx failed: {e}")))?;

    Ok(Review {
        id,
        laundromat_id,
        user_id,
        rating,
        comment: comment.map(str::to_string),
        created_at: now,
    })
}

pub fn list_reviews(conn: &Connection, laundromat_id: i64) -> Result<Vec<Review>, ServerError> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, laundromat_id, user_id, rating, comment, created_at
            FROM reviews
            WHERE laundromat_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map(params![laundromat_id], |row| {
            Ok(Review {
                id: row.get(0)?,
                laundromat_id: row.get(1)?,
                user_id: row.get(2)?,
                rating: row.get(3)?,
                comment: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

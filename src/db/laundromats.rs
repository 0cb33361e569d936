// src/db/laundromats.rs
use crate::db::connection::Database;
use crate::domain::laundromat::{
    Hours, Laundromat, ListingUpdate, NearbyLaundromat, NewLaundromat, LAUNDROMAT_SCHEMA_VERSION,
};
use crate::domain::nearby::{rank_nearby, NearbyQuery, SearchTier};
use crate::errors::ServerError;
use crate::import::normalize::slugify;
use crate::import::ListingStore;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use tracing::debug;

pub const SEARCH_LIMIT: i64 = 50;

const SELECT_LAUNDROMAT: &str = r#"
    SELECT
        id, slug, name,                              -- 0..2
        address, city, state, zip, city_slug,        -- 3..7
        latitude, longitude,                         -- 8..9
        phone, website,                              -- 10..11
        hours, services, description,                -- 12..14
        rating, review_count,                        -- 15..16
        is_premium, is_featured, featured_rank,      -- 17..19
        subscription_expiry, owner_id,               -- 20..21
        created_at, updated_at                       -- 22..23
    FROM laundromats
"#;

fn map_laundromat(row: &Row<'_>) -> rusqlite::Result<Laundromat> {
    let hours_json: Option<String> = row.get(12)?;
    let services_json: String = row.get(13)?;

    Ok(Laundromat {
        schema_version: LAUNDROMAT_SCHEMA_VERSION,
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        address: row.get(3)?,
        city: row.get(4)?,
        state: row.get(5)?,
        zip: row.get(6)?,
        city_slug: row.get(7)?,
        latitude: row.get(8)?,
        longitude: row.get(9)?,
        phone: row.get(10)?,
        website: row.get(11)?,
        // Malformed JSON columns read as empty rather than failing the whole query.
        hours: hours_json.and_then(|h| serde_json::from_str::<Hours>(&h).ok()),
        services: serde_json::from_str::<BTreeSet<String>>(&services_json).unwrap_or_default(),
        description: row.get(14)?,
        rating: row.get(15)?,
        review_count: row.get(16)?,
        is_premium: row.get(17)?,
        is_featured: row.get(18)?,
        featured_rank: row.get(19)?,
        subscription_expiry: row.get(20)?,
        owner_id: row.get(21)?,
        created_at: row.get(22)?,
        updated_at: row.get(23)?,
    })
}

fn query_laundromats<P: rusqlite::Params>(
    conn: &Connection,
    tail: &str,
    params: P,
) -> Result<Vec<Laundromat>, ServerError> {
    let sql = format!("{SELECT_LAUNDROMAT} {tail}");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(format!("prepare laundromat query failed: {e}")))?;

    let rows = stmt
        .query_map(params, map_laundromat)
        .map_err(|e| ServerError::DbError(format!("laundromat query failed: {e}")))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

pub fn city_slug(city: &str, state: &str) -> String {
    slugify(&[city, state])
}

pub fn insert_laundromat(
    conn: &Connection,
    new: &NewLaundromat,
    now: i64,
) -> Result<Laundromat, ServerError> {
    let hours = new.hours.as_ref().map(serde_json::to_string).transpose()?;
    let services = serde_json::to_string(&new.services)?;

    conn.execute(
        r#"
        INSERT INTO laundromats (
            slug, name, address, city, state, zip, city_slug,
            latitude, longitude, phone, website,
            hours, services, description, rating, review_count,
            imported_rating, imported_reviews,
            owner_id, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7,
            ?8, ?9, ?10, ?11,
            ?12, ?13, ?14, ?15, ?16,
            ?15, ?16,
            ?17, ?18, ?18
        )
        "#,
        params![
            new.slug,
            new.name,
            new.address,
            new.city,
            new.state,
            new.zip,
            city_slug(&new.city, &new.state),
            new.latitude,
            new.longitude,
            new.phone,
            new.website,
            hours,
            services,
            new.description,
            new.rating,
            new.review_count,
            new.owner_id,
            now,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert laundromat '{}' failed: {e}", new.slug)))?;

    get_by_id(conn, conn.last_insert_rowid())?.ok_or(ServerError::InternalError)
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Laundromat>, ServerError> {
    Ok(query_laundromats(conn, "WHERE id = ?1", params![id])?
        .into_iter()
        .next())
}

pub fn get_by_slug(conn: &Connection, slug: &str) -> Result<Option<Laundromat>, ServerError> {
    Ok(query_laundromats(conn, "WHERE slug = ?1", params![slug])?
        .into_iter()
        .next())
}

pub fn slug_exists(conn: &Connection, slug: &str) -> Result<bool, ServerError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM laundromats WHERE slug = ?1",
            params![slug],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// `base`, or `base-2`, `base-3`, ... whichever is free first.
pub fn unique_slug(conn: &Connection, base: &str) -> Result<String, ServerError> {
    if !slug_exists(conn, base)? {
        return Ok(base.to_string());
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !slug_exists(conn, &candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

pub fn list_with_coordinates(conn: &Connection) -> Result<Vec<Laundromat>, ServerError> {
    query_laundromats(
        conn,
        "WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
         AND trim(latitude) <> '' AND trim(longitude) <> '' ORDER BY id",
        [],
    )
}

/// Proximity search with the radius / 3x radius / closest fallback.
pub fn find_nearby(
    db: &Database,
    query: &NearbyQuery,
) -> Result<(Vec<NearbyLaundromat>, SearchTier), ServerError> {
    let candidates = db.with_conn(|conn| list_with_coordinates(conn))?;
    let candidate_count = candidates.len();
    let (results, tier) = rank_nearby(candidates, query);

    debug!(
        lat = query.origin.lat,
        lng = query.origin.lng,
        radius = query.radius_miles,
        candidates = candidate_count,
        returned = results.len(),
        tier = tier.as_str(),
        "nearby search"
    );
    Ok((results, tier))
}

/// Case-insensitive match on name, city or ZIP prefix.
pub fn search(conn: &Connection, q: &str) -> Result<Vec<Laundromat>, ServerError> {
    let term = q.trim();
    if term.is_empty() {
        return Ok(Vec::new());
    }
    let like = format!("%{}%", term.replace('%', "").replace('_', ""));
    let prefix = format!("{}%", term.replace('%', "").replace('_', ""));

    query_laundromats(
        conn,
        r#"
        WHERE name LIKE ?1 OR city LIKE ?1 OR zip LIKE ?2
        ORDER BY is_featured DESC, is_premium DESC, rating IS NULL, rating DESC, name
        LIMIT ?3
        "#,
        params![like, prefix, SEARCH_LIMIT],
    )
}

pub fn list_by_city_slug(
    conn: &Connection,
    city_slug: &str,
) -> Result<Vec<Laundromat>, ServerError> {
    query_laundromats(
        conn,
        r#"
        WHERE city_slug = ?1
        ORDER BY is_featured DESC, featured_rank IS NULL, featured_rank,
                 is_premium DESC, rating IS NULL, rating DESC, name, id
        "#,
        params![city_slug],
    )
}

pub fn list_featured(conn: &Connection, limit: i64) -> Result<Vec<Laundromat>, ServerError> {
    query_laundromats(
        conn,
        "WHERE is_featured = 1 ORDER BY featured_rank IS NULL, featured_rank, id LIMIT ?1",
        params![limit],
    )
}

pub fn list_by_owner(conn: &Connection, owner_id: i64) -> Result<Vec<Laundromat>, ServerError> {
    query_laundromats(conn, "WHERE owner_id = ?1 ORDER BY name, id", params![owner_id])
}

pub fn update_listing(
    conn: &Connection,
    id: i64,
    update: &ListingUpdate,
    now: i64,
) -> Result<(), ServerError> {
    let services = update.services.as_ref().map(serde_json::to_string).transpose()?;
    let hours = update.hours.as_ref().map(serde_json::to_string).transpose()?;

    conn.execute(
        r#"
        UPDATE laundromats SET
            phone = COALESCE(?1, phone),
            website = COALESCE(?2, website),
            description = COALESCE(?3, description),
            services = COALESCE(?4, services),
            hours = COALESCE(?5, hours),
            updated_at = ?6
        WHERE id = ?7
        "#,
        params![
            update.phone,
            update.website,
            update.description,
            services,
            hours,
            now,
            id
        ],
    )
    .map_err(|e| ServerError::DbError(format!("update laundromat {id} failed: {e}")))?;
    Ok(())
}

/// Sets the owner of an unowned listing. Returns false if someone already owns it.
pub fn claim_listing(
    conn: &Connection,
    id: i64,
    owner_id: i64,
    now: i64,
) -> Result<bool, ServerError> {
    let updated = conn
        .execute(
            "UPDATE laundromats SET owner_id = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id IS NULL",
            params![owner_id, now, id],
        )
        .map_err(|e| ServerError::DbError(format!("claim laundromat {id} failed: {e}")))?;
    Ok(updated == 1)
}

pub fn set_premium_flags(
    conn: &Connection,
    id: i64,
    is_premium: bool,
    is_featured: bool,
    featured_rank: Option<i64>,
    subscription_expiry: Option<i64>,
    now: i64,
) -> Result<(), ServerError> {
    conn.execute(
        r#"
        UPDATE laundromats SET
            is_premium = ?1, is_featured = ?2, featured_rank = ?3,
            subscription_expiry = ?4, updated_at = ?5
        WHERE id = ?6
        "#,
        params![is_premium, is_featured, featured_rank, subscription_expiry, now, id],
    )
    .map_err(|e| ServerError::DbError(format!("update premium flags for {id} failed: {e}")))?;
    Ok(())
}

pub fn next_featured_rank(conn: &Connection) -> Result<i64, ServerError> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(featured_rank) FROM laundromats WHERE is_featured = 1",
        [],
        |r| r.get(0),
    )?;
    Ok(max.unwrap_or(0) + 1)
}

/// Recomputes `rating` and `review_count` from the imported baseline plus
/// local reviews, weighting each side by its review count.
pub fn refresh_rating(conn: &Connection, id: i64, now: i64) -> Result<(), ServerError> {
    let (base_rating, base_count): (Option<f64>, i64) = conn
        .query_row(
            "SELECT imported_rating, imported_reviews FROM laundromats WHERE id = ?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .map_err(|e| ServerError::DbError(format!("load rating baseline for {id} failed: {e}")))?;
    let (local_sum, local_count): (i64, i64) = conn
        .query_row(
            "SELECT COALESCE(SUM(rating), 0), COUNT(*) FROM reviews WHERE laundromat_id = ?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .map_err(|e| ServerError::DbError(format!("tally reviews for {id} failed: {e}")))?;

    let (rating, review_count) = blend_rating(base_rating, base_count, local_sum, local_count);
    conn.execute(
        "UPDATE laundromats SET rating = ?1, review_count = ?2, updated_at = ?3 WHERE id = ?4",
        params![rating, review_count, now, id],
    )
    .map_err(|e| ServerError::DbError(format!("refresh rating for {id} failed: {e}")))?;
    Ok(())
}

/// An imported count without an imported rating carries no weight.
fn blend_rating(
    base_rating: Option<f64>,
    base_count: i64,
    local_sum: i64,
    local_count: i64,
) -> (Option<f64>, i64) {
    let base_count = if base_rating.is_some() { base_count.max(0) } else { 0 };
    let total = base_count + local_count;
    if total == 0 {
        return (base_rating, base_count);
    }
    let sum = base_rating.unwrap_or(0.0) * base_count as f64 + local_sum as f64;
    let avg = sum / total as f64;
    (Some((avg * 10.0).round() / 10.0), total)
}

impl ListingStore for Database {
    fn create_laundromat(&mut self, new: NewLaundromat) -> Result<Laundromat, ServerError> {
        let now = chrono::Utc::now().timestamp();
        self.with_conn(|conn| insert_laundromat(conn, &new, now))
    }

    fn get_laundry_by_slug(&mut self, slug: &str) -> Result<Option<Laundromat>, ServerError> {
        self.with_conn(|conn| get_by_slug(conn, slug))
    }
}

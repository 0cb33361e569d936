// src/db/directory.rs
//
// City and state rollups, grouped straight from the laundromats table.

use crate::domain::directory::{City, State};
use crate::errors::ServerError;
use crate::geos;
use crate::import::normalize::slugify;
use crate::seo::{CityStats, StateStats};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

const TOP_N: usize = 5;

fn map_city(row: &rusqlite::Row<'_>) -> rusqlite::Result<City> {
    Ok(City {
        name: row.get(0)?,
        state: row.get(1)?,
        slug: row.get(2)?,
        laundry_count: row.get(3)?,
        average_rating: row.get(4)?,
    })
}

const CITY_ROLLUP: &str = r#"
    SELECT
        MIN(city)                  AS name,          -- 0
        state,                                       -- 1
        city_slug,                                   -- 2
        COUNT(*)                   AS laundry_count, -- 3
        ROUND(AVG(rating), 2)      AS avg_rating     -- 4
    FROM laundromats
"#;

pub fn list_states(conn: &Connection) -> Result<Vec<State>, ServerError> {
    let mut stmt = conn
        .prepare("SELECT state, COUNT(*) FROM laundromats GROUP BY state ORDER BY state")
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        let (abbr, count) = r.map_err(|e| ServerError::DbError(e.to_string()))?;
        out.push(state_from_abbr(&abbr, count));
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

fn state_from_abbr(abbr: &str, laundry_count: i64) -> State {
    let name = geos::state_name(abbr).unwrap_or(abbr).to_string();
    State {
        slug: slugify(&[&name]),
        name,
        abbr: abbr.to_uppercase(),
        laundry_count,
    }
}

pub fn get_state(conn: &Connection, abbr: &str) -> Result<Option<State>, ServerError> {
    let abbr = abbr.trim().to_uppercase();
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM laundromats WHERE state = ?1",
        params![abbr],
        |r| r.get(0),
    )?;
    Ok((count > 0).then(|| state_from_abbr(&abbr, count)))
}

pub fn cities_in_state(conn: &Connection, abbr: &str) -> Result<Vec<City>, ServerError> {
    let sql = format!(
        "{CITY_ROLLUP} WHERE state = ?1 GROUP BY city_slug ORDER BY laundry_count DESC, name"
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;
    let rows = stmt
        .query_map(params![abbr.trim().to_uppercase()], map_city)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

pub fn get_city(conn: &Connection, slug: &str) -> Result<Option<City>, ServerError> {
    let sql = format!("{CITY_ROLLUP} WHERE city_slug = ?1 GROUP BY city_slug");
    conn.query_row(&sql, params![slug], map_city)
        .optional()
        .map_err(|e| ServerError::DbError(format!("city rollup failed: {e}")))
}

fn top_counts(counts: HashMap<String, usize>, n: usize) -> Vec<String> {
    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs.into_iter().take(n).map(|(k, _)| k).collect()
}

/// Aggregates feeding the city page copy: counts, rating, top services and ZIPs.
pub fn city_stats(conn: &Connection, slug: &str) -> Result<Option<CityStats>, ServerError> {
    let Some(city) = get_city(conn, slug)? else {
        return Ok(None);
    };
    let listings = crate::db::laundromats::list_by_city_slug(conn, slug)?;

    let mut services: HashMap<String, usize> = HashMap::new();
    let mut zips: HashMap<String, usize> = HashMap::new();
    let mut open_24h = 0;
    for l in &listings {
        for s in &l.services {
            *services.entry(s.clone()).or_default() += 1;
        }
        if let Some(zip) = l.zip.as_ref().filter(|z| !z.is_empty()) {
            *zips.entry(zip.clone()).or_default() += 1;
        }
        let always_open = l.hours.as_ref().is_some_and(|h| {
            !h.is_empty()
                && h.values().all(|v| {
                    matches!(
                        crate::domain::hours::parse_day(v),
                        Some(crate::domain::hours::DaySchedule::AllDay)
                    )
                })
        });
        if always_open {
            open_24h += 1;
        }
    }

    Ok(Some(CityStats {
        state_name: geos::state_name(&city.state).unwrap_or(&city.state).to_string(),
        laundry_count: city.laundry_count,
        average_rating: city.average_rating,
        premium_count: listings.iter().filter(|l| l.is_premium).count() as i64,
        open_24h_count: open_24h,
        top_services: top_counts(services, TOP_N),
        top_zips: top_counts(zips, TOP_N),
        listing_names: listings.iter().take(10).map(|l| (l.name.clone(), l.slug.clone())).collect(),
        city,
    }))
}

pub fn state_stats(conn: &Connection, abbr: &str) -> Result<Option<StateStats>, ServerError> {
    let Some(state) = get_state(conn, abbr)? else {
        return Ok(None);
    };
    let cities = cities_in_state(conn, &state.abbr)?;
    let average_rating: Option<f64> = conn.query_row(
        "SELECT ROUND(AVG(rating), 2) FROM laundromats WHERE state = ?1",
        params![state.abbr],
        |r| r.get(0),
    )?;

    Ok(Some(StateStats {
        city_count: cities.len() as i64,
        top_cities: cities.into_iter().take(TOP_N).collect(),
        average_rating,
        state,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::laundromats::insert_laundromat;
    use crate::tests::utils::{init_test_db, new_listing};

    fn seed(conn: &Connection) -> Result<(), ServerError> {
        let mut a = new_listing("Alpha Wash", "Denver", "CO", None);
        a.rating = Some(4.0);
        a.zip = Some("80202".into());
        a.services = ["Wi-Fi".to_string()].into_iter().collect();
        insert_laundromat(conn, &a, 1)?;

        let mut b = new_listing("Beta Wash", "Denver", "CO", None);
        b.rating = Some(5.0);
        b.zip = Some("80202".into());
        b.services = ["Wi-Fi".to_string(), "Drop-off".to_string()].into_iter().collect();
        insert_laundromat(conn, &b, 1)?;

        insert_laundromat(conn, &new_listing("Gamma Wash", "Boulder", "CO", None), 1)?;
        insert_laundromat(conn, &new_listing("Delta Wash", "Austin", "TX", None), 1)?;
        Ok(())
    }

    #[test]
    fn rolls_up_states_and_cities() {
        let (_dir, db) = init_test_db();
        db.with_conn(|conn| seed(conn)).unwrap();

        let states = db.with_conn(|conn| list_states(conn)).unwrap();
        let names: Vec<&str> = states.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Colorado", "Texas"]);
        assert_eq!(states[0].laundry_count, 3);
        assert_eq!(states[0].slug, "colorado");

        let cities = db.with_conn(|conn| cities_in_state(conn, "co")).unwrap();
        assert_eq!(cities[0].slug, "denver-co");
        assert_eq!(cities[0].laundry_count, 2);
        assert_eq!(cities[0].average_rating, Some(4.5));
    }

    #[test]
    fn unknown_city_is_none() {
        let (_dir, db) = init_test_db();
        db.with_conn(|conn| seed(conn)).unwrap();
        assert!(db.with_conn(|conn| get_city(conn, "atlantis-xx")).unwrap().is_none());
        assert!(db.with_conn(|conn| get_state(conn, "WY")).unwrap().is_none());
    }

    #[test]
    fn city_stats_rank_services_and_zips() {
        let (_dir, db) = init_test_db();
        db.with_conn(|conn| seed(conn)).unwrap();

        let stats = db.with_conn(|conn| city_stats(conn, "denver-co")).unwrap().unwrap();
        assert_eq!(stats.laundry_count, 2);
        assert_eq!(stats.top_services, vec!["Wi-Fi".to_string(), "Drop-off".to_string()]);
        assert_eq!(stats.top_zips, vec!["80202".to_string()]);
        assert_eq!(stats.state_name, "Colorado");
    }
}

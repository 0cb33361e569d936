// src/handlers/api.rs
use crate::db::{directory, laundromats, reviews};
use crate::domain::directory::parse_review_rating;
use crate::domain::hours::is_open_at;
use crate::domain::laundromat::Laundromat;
use crate::domain::nearby::NearbyQuery;
use crate::errors::ServerError;
use crate::handlers::{now_unix, RequestCtx};
use crate::responses::json::json_with_status;
use crate::responses::{json_response, with_header, ResultResp};
use crate::seo;
use crate::state::AppState;
use serde::Serialize;
use serde_json::json;

pub const FEATURED_LIMIT: i64 = 20;
pub const SEARCH_TIER_HEADER: &str = "X-Search-Tier";

/// Listing plus the derived open-now flag (`null` when hours are unknown).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    #[serde(flatten)]
    pub laundromat: Laundromat,
    pub is_currently_open: Option<bool>,
}

pub fn open_now(l: &Laundromat) -> Option<bool> {
    let now = chrono::Local::now().naive_local();
    l.hours.as_ref().and_then(|h| is_open_at(h, now))
}

pub fn nearby(state: &AppState, ctx: &RequestCtx) -> ResultResp {
    let query = NearbyQuery::from_params(&ctx.query)?;
    let (results, tier) = laundromats::find_nearby(&state.db, &query)?;
    with_header(json_response(&results)?, SEARCH_TIER_HEADER, tier.as_str())
}

pub fn search(state: &AppState, ctx: &RequestCtx) -> ResultResp {
    let q = ctx
        .param("q")
        .ok_or_else(|| ServerError::BadRequest("missing parameter: q".into()))?;
    let results = state.db.with_conn(|conn| laundromats::search(conn, q))?;
    json_response(&results)
}

pub fn featured(state: &AppState) -> ResultResp {
    let results = state
        .db
        .with_conn(|conn| laundromats::list_featured(conn, FEATURED_LIMIT))?;
    json_response(&results)
}

pub fn laundromat(state: &AppState, slug: &str) -> ResultResp {
    let l = state
        .db
        .with_conn(|conn| laundromats::get_by_slug(conn, slug))?
        .ok_or(ServerError::NotFound)?;
    json_response(&ListingDetail {
        is_currently_open: open_now(&l),
        laundromat: l,
    })
}

pub fn list_reviews(state: &AppState, slug: &str) -> ResultResp {
    let reviews = state.db.with_conn(|conn| {
        let l = laundromats::get_by_slug(conn, slug)?.ok_or(ServerError::NotFound)?;
        reviews::list_reviews(conn, l.id)
    })?;
    json_response(&reviews)
}

/// Accepts either a JSON body `{"rating": 4, "comment": "..."}` or form fields.
pub fn add_review(state: &AppState, ctx: &RequestCtx, slug: &str) -> ResultResp {
    let user = ctx.require_user(state)?;

    let (rating_raw, comment) = match &ctx.json_body {
        Some(body) => (
            body.get("rating")
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .unwrap_or_default(),
            body.get("comment").and_then(|v| v.as_str()).map(str::to_string),
        ),
        None => (
            ctx.field("rating").unwrap_or_default().to_string(),
            ctx.field("comment").map(str::to_string),
        ),
    };
    let rating = parse_review_rating(&rating_raw).ok_or_else(|| {
        ServerError::BadRequest("rating must be a whole number from 1 to 5".into())
    })?;

    let now = now_unix();
    let review = state.db.with_conn(|conn| {
        let l = laundromats::get_by_slug(conn, slug)?.ok_or(ServerError::NotFound)?;
        reviews::add_review(conn, l.id, user.user_id, rating, comment.as_deref(), now)
    })?;
    state.cache.invalidate();
    json_with_status(201, &review)
}

pub fn states(state: &AppState) -> ResultResp {
    let states = state
        .cache
        .states
        .get_or_try_insert("all", || state.db.with_conn(|conn| directory::list_states(conn)))?;
    json_response(&states)
}

pub fn state_cities(state: &AppState, abbr: &str) -> ResultResp {
    let key = abbr.trim().to_uppercase();
    let cities = state.cache.cities_by_state.get_or_try_insert_if(
        &key,
        || state.db.with_conn(|conn| directory::cities_in_state(conn, &key)),
        |cities| !cities.is_empty(),
    )?;
    if cities.is_empty() {
        return Err(ServerError::NotFound);
    }
    json_response(&cities)
}

pub fn city(state: &AppState, slug: &str) -> ResultResp {
    let city = state
        .db
        .with_conn(|conn| directory::get_city(conn, slug))?
        .ok_or(ServerError::NotFound)?;
    json_response(&city)
}

pub fn city_laundromats(state: &AppState, slug: &str) -> ResultResp {
    let listings = state
        .db
        .with_conn(|conn| laundromats::list_by_city_slug(conn, slug))?;
    if listings.is_empty() {
        return Err(ServerError::NotFound);
    }
    json_response(&listings)
}

pub fn city_seo(state: &AppState, slug: &str) -> ResultResp {
    let stats = cached_city_stats(state, slug)?.ok_or(ServerError::NotFound)?;
    json_response(&json!({
        "meta": seo::city_meta(&stats),
        "jsonLd": seo::city_schema(&stats, &state.public_url, chrono::Utc::now()),
    }))
}

pub fn cached_city_stats(
    state: &AppState,
    slug: &str,
) -> Result<Option<seo::CityStats>, ServerError> {
    state
        .cache
        .city_stats
        .get_or_try_insert_if(
            slug,
            || state.db.with_conn(|conn| directory::city_stats(conn, slug)),
            Option::is_some,
        )
}

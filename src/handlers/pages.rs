// src/handlers/pages.rs
use crate::db::{directory, laundromats, reviews};
use crate::errors::ServerError;
use crate::handlers::api::{cached_city_stats, open_now, FEATURED_LIMIT};
use crate::handlers::RequestCtx;
use crate::responses::{html_response, ResultResp};
use crate::seo;
use crate::state::AppState;
use crate::templates::pages::{self, HomeVm, ListingVm};

fn signed_in(state: &AppState, ctx: &RequestCtx) -> Result<bool, ServerError> {
    Ok(ctx.current_user(state)?.is_some())
}

pub fn home(state: &AppState, ctx: &RequestCtx) -> ResultResp {
    let query = ctx.param("q");
    let (results, featured) = state.db.with_conn(|conn| {
        let results = match query {
            Some(q) => laundromats::search(conn, q)?,
            None => Vec::new(),
        };
        Ok((results, laundromats::list_featured(conn, FEATURED_LIMIT)?))
    })?;
    let states = state
        .cache
        .states
        .get_or_try_insert("all", || state.db.with_conn(|conn| directory::list_states(conn)))?;

    html_response(pages::home_page(&HomeVm {
        query,
        results: &results,
        featured: &featured,
        states: &states,
        signed_in: signed_in(state, ctx)?,
    }))
}

pub fn listing(state: &AppState, ctx: &RequestCtx, slug: &str) -> ResultResp {
    let (listing, reviews) = state.db.with_conn(|conn| {
        let l = laundromats::get_by_slug(conn, slug)?.ok_or(ServerError::NotFound)?;
        let r = reviews::list_reviews(conn, l.id)?;
        Ok((l, r))
    })?;

    let meta = seo::listing_meta(&listing);
    let schema = seo::listing_schema(&listing, &state.public_url);
    html_response(pages::listing_page(&ListingVm {
        listing: &listing,
        meta: &meta,
        schema: &schema,
        canonical: format!("{}/laundromats/{}", state.public_url, listing.slug),
        open_now: open_now(&listing),
        reviews: &reviews,
        signed_in: signed_in(state, ctx)?,
    }))
}

pub fn city(state: &AppState, ctx: &RequestCtx, slug: &str) -> ResultResp {
    let stats = cached_city_stats(state, slug)?.ok_or(ServerError::NotFound)?;
    let listings = state
        .db
        .with_conn(|conn| laundromats::list_by_city_slug(conn, slug))?;

    let meta = seo::city_meta(&stats);
    let schema = seo::city_schema(&stats, &state.public_url, chrono::Utc::now());
    html_response(pages::city_page(
        &stats,
        &meta,
        &schema,
        &listings,
        format!("{}/cities/{}", state.public_url, slug),
        signed_in(state, ctx)?,
    ))
}

pub fn state_page(state: &AppState, ctx: &RequestCtx, abbr: &str) -> ResultResp {
    let stats = state
        .db
        .with_conn(|conn| directory::state_stats(conn, abbr))?
        .ok_or(ServerError::NotFound)?;
    let key = stats.state.abbr.clone();
    let cities = state.cache.cities_by_state.get_or_try_insert_if(
        &key,
        || state.db.with_conn(|conn| directory::cities_in_state(conn, &key)),
        |cities| !cities.is_empty(),
    )?;

    let meta = seo::state_meta(&stats);
    let schema = seo::state_schema(&stats, &state.public_url, chrono::Utc::now());
    html_response(pages::state_page(
        &stats,
        &cities,
        &meta,
        &schema,
        format!("{}/states/{}", state.public_url, key.to_lowercase()),
        signed_in(state, ctx)?,
    ))
}

pub fn states_index(state: &AppState, ctx: &RequestCtx) -> ResultResp {
    let states = state
        .cache
        .states
        .get_or_try_insert("all", || state.db.with_conn(|conn| directory::list_states(conn)))?;
    html_response(pages::states_index_page(&states, signed_in(state, ctx)?))
}

pub fn login(state: &AppState) -> ResultResp {
    html_response(pages::login_page(state.magic.ttl_secs / 60))
}

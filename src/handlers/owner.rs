// src/handlers/owner.rs
//
// Sign-in and the owner dashboard.

use crate::auth::sessions::{clear_session_cookie, session_cookie, SessionUser};
use crate::db::laundromats::{self, unique_slug};
use crate::db::{magic_auth, subscriptions};
use crate::domain::laundromat::{Laundromat, ListingUpdate, NewLaundromat};
use crate::domain::subscription::Tier;
use crate::errors::ServerError;
use crate::geos;
use crate::handlers::{now_unix, RequestCtx};
use crate::import::normalize::{
    collapse_whitespace, format_phone, normalize_coordinates, normalize_name,
    normalize_website, normalize_zip, slugify, split_services,
};
use crate::responses::{html_response, redirect, ResultResp};
use crate::state::AppState;
use crate::templates::pages::{self, DashboardVm};
use rusqlite::Connection;
use tracing::{error, info};

pub fn request_link(state: &AppState, ctx: &RequestCtx) -> ResultResp {
    let email = ctx
        .field("email")
        .ok_or_else(|| ServerError::BadRequest("email is required".into()))?;
    let issued = magic_auth::request_magic_link(&state.db, &state.magic, email, now_unix())?;

    state
        .mailer
        .send_sign_in_link(&issued.email, &issued.link)
        .map_err(|e| {
            error!(error = %e, "sending sign-in link failed");
            ServerError::InternalError
        })?;
    info!(user_id = issued.user_id, "sign-in link issued");

    html_response(pages::check_email_content(&issued.email))
}

pub fn redeem_link(state: &AppState, ctx: &RequestCtx) -> ResultResp {
    let token = ctx
        .param("token")
        .ok_or_else(|| ServerError::BadRequest("missing token".into()))?;
    let (session_token, user) =
        magic_auth::redeem_magic_link(&state.db, &state.magic, token, now_unix())?;
    info!(user_id = user.user_id, "owner signed in");
    redirect("/dashboard", Some(&session_cookie(&session_token)))
}

pub fn logout(state: &AppState, ctx: &RequestCtx) -> ResultResp {
    if let Some(token) = &ctx.session_token {
        magic_auth::sign_out(&state.db, token, now_unix())?;
    }
    redirect("/", Some(&clear_session_cookie()))
}

pub fn dashboard(state: &AppState, ctx: &RequestCtx) -> ResultResp {
    let user = ctx.require_user(state)?;
    let listings = state.db.with_conn(|conn| {
        let mut out = Vec::new();
        for l in laundromats::list_by_owner(conn, user.user_id)? {
            let sub = subscriptions::active_subscription(conn, l.id)?;
            out.push((l, sub));
        }
        Ok(out)
    })?;

    html_response(pages::dashboard_page(&DashboardVm {
        email: user.email,
        listings,
    }))
}

fn parse_listing_id(raw: &str) -> Result<i64, ServerError> {
    raw.parse().map_err(|_| ServerError::NotFound)
}

fn owned_listing(
    conn: &Connection,
    id: i64,
    user: &SessionUser,
) -> Result<Laundromat, ServerError> {
    let l = laundromats::get_by_id(conn, id)?.ok_or(ServerError::NotFound)?;
    if l.owner_id != Some(user.user_id) {
        return Err(ServerError::Forbidden);
    }
    Ok(l)
}

fn optional_phone(ctx: &RequestCtx) -> Option<String> {
    ctx.field("phone").and_then(format_phone)
}

fn optional_website(ctx: &RequestCtx) -> Result<Option<String>, ServerError> {
    ctx.field("website")
        .map(|raw| {
            normalize_website(raw)
                .ok_or_else(|| ServerError::BadRequest("website is not a valid URL".into()))
        })
        .transpose()
}

pub fn create_listing(state: &AppState, ctx: &RequestCtx) -> ResultResp {
    let user = ctx.require_user(state)?;
    let required = |name: &str| {
        ctx.field(name)
            .ok_or_else(|| ServerError::BadRequest(format!("{name} is required")))
    };

    let name = normalize_name(required("name")?);
    let address = collapse_whitespace(required("address")?);
    let city = collapse_whitespace(required("city")?);
    let state_code = geos::normalize_state(required("state")?)
        .ok_or_else(|| ServerError::BadRequest("state must be a US state".into()))?
        .to_string();
    let (latitude, longitude) = normalize_coordinates(
        ctx.field("latitude").unwrap_or_default(),
        ctx.field("longitude").unwrap_or_default(),
    );

    let mut new = NewLaundromat {
        name,
        address,
        city,
        state: state_code,
        zip: ctx.field("zip").and_then(normalize_zip),
        latitude,
        longitude,
        phone: optional_phone(ctx),
        website: optional_website(ctx)?,
        services: ctx.field("services").map(split_services).unwrap_or_default(),
        description: ctx.field("description").map(str::to_string),
        owner_id: Some(user.user_id),
        ..NewLaundromat::default()
    };

    let now = now_unix();
    let created = state.db.with_conn(|conn| {
        new.slug = unique_slug(conn, &slugify(&[&new.name, &new.city]))?;
        laundromats::insert_laundromat(conn, &new, now)
    })?;
    state.cache.invalidate();
    info!(id = created.id, slug = %created.slug, owner = user.user_id, "listing created");

    redirect("/dashboard", None)
}

pub fn update_listing(state: &AppState, ctx: &RequestCtx, raw_id: &str) -> ResultResp {
    let user = ctx.require_user(state)?;
    let id = parse_listing_id(raw_id)?;
    let update = ListingUpdate {
        phone: optional_phone(ctx),
        website: optional_website(ctx)?,
        description: ctx.field("description").map(str::to_string),
        services: ctx.field("services").map(split_services),
        hours: None,
    };

    let now = now_unix();
    let (listing, sub) = state.db.with_conn(|conn| {
        owned_listing(conn, id, &user)?;
        laundromats::update_listing(conn, id, &update, now)?;
        let l = laundromats::get_by_id(conn, id)?.ok_or(ServerError::NotFound)?;
        let sub = subscriptions::active_subscription(conn, id)?;
        Ok((l, sub))
    })?;
    state.cache.invalidate();

    if ctx.is_htmx {
        html_response(pages::listing_editor(&listing, sub.as_ref(), Some("Saved.")))
    } else {
        redirect("/dashboard", None)
    }
}

pub fn claim_listing(state: &AppState, ctx: &RequestCtx, raw_id: &str) -> ResultResp {
    let user = ctx.require_user(state)?;
    let id = parse_listing_id(raw_id)?;

    state.db.with_conn(|conn| {
        let l = laundromats::get_by_id(conn, id)?.ok_or(ServerError::NotFound)?;
        if l.owner_id == Some(user.user_id) {
            return Ok(());
        }
        if !laundromats::claim_listing(conn, id, user.user_id, now_unix())? {
            return Err(ServerError::Forbidden);
        }
        Ok(())
    })?;
    info!(id, owner = user.user_id, "listing claimed");

    redirect("/dashboard", None)
}

pub fn subscribe(state: &AppState, ctx: &RequestCtx, raw_id: &str) -> ResultResp {
    let user = ctx.require_user(state)?;
    let id = parse_listing_id(raw_id)?;
    let tier: Tier = ctx
        .field("tier")
        .ok_or_else(|| ServerError::BadRequest("tier is required".into()))?
        .parse()
        .map_err(|_| ServerError::BadRequest("unknown tier".into()))?;
    let auto_renew = ctx.field("auto_renew").is_some();

    let (listing, sub) = state.db.with_conn(|conn| {
        let listing = owned_listing(conn, id, &user)?;
        let sub = subscriptions::activate_subscription(
            conn,
            id,
            user.user_id,
            tier,
            auto_renew,
            now_unix(),
        )?;
        Ok((listing, sub))
    })?;
    state.cache.invalidate();

    if sub.amount_cents > 0 {
        if let Err(e) = state.mailer.send_subscription_receipt(
            &user.email,
            &listing.name,
            tier.label(),
            sub.amount_cents,
        ) {
            error!(error = %e, listing = id, "sending subscription receipt failed");
        }
    }

    redirect("/dashboard", None)
}

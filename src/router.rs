use crate::errors::ServerError;
use crate::handlers::{api, owner, pages, RequestCtx};
use crate::responses::{error_response, stylesheet, ResultResp};
use crate::state::AppState;
use astra::{Request, Response};
use tracing::debug;

/// Entry point for every request. Errors become JSON under `/api/` and HTML pages elsewhere.
pub fn handle(req: Request, state: &AppState) -> Response {
    let wants_json = req.uri().path().starts_with("/api/");
    match route(req, state) {
        Ok(resp) => resp,
        Err(err) => error_response(err, wants_json),
    }
}

fn route(req: Request, state: &AppState) -> ResultResp {
    let ctx = RequestCtx::from_request(req)?;
    debug!(method = %ctx.method, path = %ctx.path, "request");
    let segments = ctx.segments();

    match (ctx.method.as_str(), segments.as_slice()) {
        // JSON API
        ("GET", ["api", "laundromats"]) => api::nearby(state, &ctx),
        ("GET", ["api", "laundromats", "search"]) => api::search(state, &ctx),
        ("GET", ["api", "laundromats", "featured"]) => api::featured(state),
        ("GET", ["api", "laundromats", slug]) => api::laundromat(state, slug),
        ("GET", ["api", "laundromats", slug, "reviews"]) => api::list_reviews(state, slug),
        ("POST", ["api", "laundromats", slug, "reviews"]) => api::add_review(state, &ctx, slug),
        ("GET", ["api", "states"]) => api::states(state),
        ("GET", ["api", "states", abbr, "cities"]) => api::state_cities(state, abbr),
        ("GET", ["api", "cities", slug]) => api::city(state, slug),
        ("GET", ["api", "cities", slug, "laundromats"]) => api::city_laundromats(state, slug),
        ("GET", ["api", "cities", slug, "seo"]) => api::city_seo(state, slug),

        // Public pages
        ("GET", ["static", "main.css"]) => stylesheet(),
        ("GET", []) => pages::home(state, &ctx),
        ("GET", ["laundromats", slug]) => pages::listing(state, &ctx, slug),
        ("GET", ["cities", slug]) => pages::city(state, &ctx, slug),
        ("GET", ["states"]) => pages::states_index(state, &ctx),
        ("GET", ["states", abbr]) => pages::state_page(state, &ctx, abbr),

        // Owner sign-in
        ("GET", ["login"]) => pages::login(state),
        ("POST", ["auth", "request-link"]) => owner::request_link(state, &ctx),
        ("GET", ["auth", "magic"]) => owner::redeem_link(state, &ctx),
        ("POST", ["logout"]) => owner::logout(state, &ctx),

        // Owner dashboard
        ("GET", ["dashboard"]) => owner::dashboard(state, &ctx),
        ("POST", ["dashboard", "listings"]) => owner::create_listing(state, &ctx),
        ("POST", ["dashboard", "listings", id]) => owner::update_listing(state, &ctx, id),
        ("POST", ["dashboard", "listings", id, "claim"]) => owner::claim_listing(state, &ctx, id),
        ("POST", ["dashboard", "listings", id, "subscribe"]) => owner::subscribe(state, &ctx, id),

        _ => Err(ServerError::NotFound),
    }
}

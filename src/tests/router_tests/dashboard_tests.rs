use crate::db::laundromats::{get_by_id, get_by_slug, insert_laundromat};
use crate::domain::laundromat::Laundromat;
use crate::router::handle;
use crate::state::AppState;
use crate::tests::utils::{body_string, form_body, new_listing, signed_in_user, test_state};
use astra::{Body, Response};
use http::{Method, Request};

fn post_form(state: &AppState, uri: &str, session: &str, pairs: &[(&str, &str)]) -> Response {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("Cookie", format!("session={session}"))
        .body(form_body(pairs))
        .unwrap();
    handle(req, state)
}

fn insert(state: &AppState, name: &str, owner: Option<i64>) -> Laundromat {
    state
        .db
        .with_conn(|conn| {
            let mut new = new_listing(name, "Reno", "NV", None);
            new.owner_id = owner;
            insert_laundromat(conn, &new, 1)
        })
        .unwrap()
}

#[test]
fn dashboard_requires_login() {
    let (_dir, state) = test_state();

    let req = Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .body(Body::empty())
        .unwrap();
    let resp = handle(req, &state);

    assert_eq!(resp.status(), 401);
    assert!(body_string(resp).contains("sign in required"));
}

#[test]
fn dashboard_lists_owned_listings() {
    let (_dir, state) = test_state();
    let (user_id, session) = signed_in_user(&state, "dash@example.com");
    insert(&state, "Mine Laundry", Some(user_id));
    insert(&state, "Someone Else Laundry", None);

    let req = Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .header("Cookie", format!("session={session}"))
        .body(Body::empty())
        .unwrap();
    let resp = handle(req, &state);
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("dash@example.com"));
    assert!(body.contains("Mine Laundry"));
    assert!(!body.contains("Someone Else Laundry"));
    assert!(body.contains("Owner edits to contact details and services"));
}

#[test]
fn owner_can_create_a_listing() {
    let (_dir, state) = test_state();
    let (user_id, session) = signed_in_user(&state, "new@example.com");

    let resp = post_form(
        &state,
        "/dashboard/listings",
        &session,
        &[
            ("name", "  fresh   suds "),
            ("address", "12 Virginia St"),
            ("city", "Reno"),
            ("state", "nevada"),
            ("phone", "775.555.0100"),
            ("latitude", "39.5296"),
            ("longitude", "-119.8138"),
        ],
    );
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers().get("Location").unwrap(), "/dashboard");

    let created = state
        .db
        .with_conn(|conn| get_by_slug(conn, "fresh-suds-reno"))
        .unwrap()
        .expect("listing should exist");
    assert_eq!(created.owner_id, Some(user_id));
    assert_eq!(created.state, "NV");
    assert_eq!(created.city_slug, "reno-nv");
    assert_eq!(created.phone.as_deref(), Some("(775) 555-0100"));
}

#[test]
fn create_listing_with_unknown_state_is_bad_request() {
    let (_dir, state) = test_state();
    let (_, session) = signed_in_user(&state, "new@example.com");

    let resp = post_form(
        &state,
        "/dashboard/listings",
        &session,
        &[("name", "X"), ("address", "1 A St"), ("city", "Nowhere"), ("state", "ZZ")],
    );
    assert_eq!(resp.status(), 400);
}

#[test]
fn editing_someone_elses_listing_is_forbidden() {
    let (_dir, state) = test_state();
    let (other_id, _) = signed_in_user(&state, "other@example.com");
    let (_, session) = signed_in_user(&state, "me@example.com");
    let theirs = insert(&state, "Their Laundry", Some(other_id));

    let resp = post_form(
        &state,
        &format!("/dashboard/listings/{}", theirs.id),
        &session,
        &[("phone", "7755550100")],
    );
    assert_eq!(resp.status(), 403);
}

#[test]
fn htmx_edit_returns_the_updated_section() {
    let (_dir, state) = test_state();
    let (user_id, session) = signed_in_user(&state, "me@example.com");
    let mine = insert(&state, "My Laundry", Some(user_id));

    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("/dashboard/listings/{}", mine.id))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("Cookie", format!("session={session}"))
        .header("HX-Request", "true")
        .body(form_body(&[
            ("website", "mylaundry.com"),
            ("services", "Wi-Fi, Drop-off"),
        ]))
        .unwrap();
    let resp = handle(req, &state);
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("Saved."));
    assert!(!body.contains("<html"));

    let updated = state.db.with_conn(|conn| get_by_id(conn, mine.id)).unwrap().unwrap();
    assert!(updated.website.is_some());
    assert!(updated.services.contains("Wi-Fi"));
    assert!(updated.services.contains("Drop-off"));
}

#[test]
fn unowned_listing_can_be_claimed_once() {
    let (_dir, state) = test_state();
    let (first_id, first) = signed_in_user(&state, "first@example.com");
    let (_, second) = signed_in_user(&state, "second@example.com");
    let listing = insert(&state, "Up For Grabs", None);
    let uri = format!("/dashboard/listings/{}/claim", listing.id);

    assert_eq!(post_form(&state, &uri, &first, &[]).status(), 302);
    assert_eq!(post_form(&state, &uri, &second, &[]).status(), 403);

    let claimed = state.db.with_conn(|conn| get_by_id(conn, listing.id)).unwrap().unwrap();
    assert_eq!(claimed.owner_id, Some(first_id));

    assert_eq!(post_form(&state, "/dashboard/listings/9999/claim", &first, &[]).status(), 404);
}

#[test]
fn subscribing_to_featured_promotes_the_listing() {
    let (_dir, state) = test_state();
    let (user_id, session) = signed_in_user(&state, "pay@example.com");
    let mine = insert(&state, "Shiny Laundry", Some(user_id));

    let resp = post_form(
        &state,
        &format!("/dashboard/listings/{}/subscribe", mine.id),
        &session,
        &[("tier", "featured"), ("auto_renew", "1")],
    );
    assert_eq!(resp.status(), 302);

    let promoted = state.db.with_conn(|conn| get_by_id(conn, mine.id)).unwrap().unwrap();
    assert!(promoted.is_premium);
    assert!(promoted.is_featured);
    assert_eq!(promoted.featured_rank, Some(1));

    let bad = post_form(
        &state,
        &format!("/dashboard/listings/{}/subscribe", mine.id),
        &session,
        &[("tier", "platinum")],
    );
    assert_eq!(bad.status(), 400);
}

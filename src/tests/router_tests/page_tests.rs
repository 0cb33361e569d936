use crate::db::laundromats::insert_laundromat;
use crate::router::handle;
use crate::state::AppState;
use crate::tests::utils::{body_string, new_listing, test_state};
use astra::Body;
use http::{Method, Request};

fn get(state: &AppState, uri: &str) -> astra::Response {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    handle(req, state)
}

fn seed(state: &AppState) {
    state
        .db
        .with_conn(|conn| {
            let mut a = new_listing("Alpine Wash", "Denver", "CO", Some(("39.74", "-104.99")));
            a.hours = Some(
                [("Monday".to_string(), "Open 24 hours".to_string())]
                    .into_iter()
                    .collect(),
            );
            insert_laundromat(conn, &a, 1)?;
            insert_laundromat(conn, &new_listing("Bluebird Laundry", "Denver", "CO", None), 1)?;
            Ok(())
        })
        .unwrap();
}

#[test]
fn home_page_searches() {
    let (_dir, state) = test_state();
    seed(&state);

    let resp = get(&state, "/?q=alpine");
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("<!DOCTYPE html>"));
    assert!(body.contains("Alpine Wash"));
    assert!(body.contains("Colorado"));
}

#[test]
fn listing_page_has_json_ld_and_canonical_url() {
    let (_dir, state) = test_state();
    seed(&state);

    let resp = get(&state, "/laundromats/alpine-wash-denver");
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("application/ld+json"));
    assert!(body.contains("http://test.local/laundromats/alpine-wash-denver"));
    assert!(body.contains("Open 24 hours"));
}

#[test]
fn city_and_state_pages_render() {
    let (_dir, state) = test_state();
    seed(&state);

    let city = body_string(get(&state, "/cities/denver-co"));
    assert!(city.contains("Bluebird Laundry"));
    assert!(city.contains("Alpine Wash"));

    let resp = get(&state, "/states/co");
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("/cities/denver-co"));
}

#[test]
fn unknown_pages_are_html_404s() {
    let (_dir, state) = test_state();

    let resp = get(&state, "/laundromats/missing");
    assert_eq!(resp.status(), 404);
    assert!(resp
        .headers()
        .get("Content-Type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    assert_eq!(get(&state, "/no/such/route").status(), 404);
    assert_eq!(get(&state, "/states/wy").status(), 404);
}

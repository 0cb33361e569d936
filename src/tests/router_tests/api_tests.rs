use crate::db::laundromats::insert_laundromat;
use crate::router::handle;
use crate::state::AppState;
use crate::tests::utils::{body_string, new_listing, signed_in_user, test_state};
use astra::Body;
use http::{Method, Request};
use serde_json::Value;

fn seed(state: &AppState) {
    state
        .db
        .with_conn(|conn| {
            // downtown Denver, Capitol Hill and Boulder (~24 mi away)
            let rows = [
                new_listing("Union Wash", "Denver", "CO", Some(("39.7530", "-105.0000"))),
                new_listing("Capitol Suds", "Denver", "CO", Some(("39.7310", "-104.9790"))),
                new_listing(
                    "Pearl Street Laundry",
                    "Boulder",
                    "CO",
                    Some(("40.0176", "-105.2797")),
                ),
                new_listing("Congress Coin", "Austin", "TX", None),
            ];
            for row in &rows {
                insert_laundromat(conn, row, 1)?;
            }
            Ok(())
        })
        .unwrap();
}

fn get(state: &AppState, uri: &str) -> astra::Response {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    handle(req, state)
}

fn json_of(resp: astra::Response) -> Value {
    serde_json::from_str(&body_string(resp)).unwrap()
}

#[test]
fn nearby_orders_by_distance_within_radius() {
    let (_dir, state) = test_state();
    seed(&state);

    let resp = get(&state, "/api/laundromats?lat=39.7392&lng=-104.9903&radius=5");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("X-Search-Tier").unwrap(), "radius");

    let body = json_of(resp);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Capitol Suds");
    let d0 = rows[0]["distance"].as_f64().unwrap();
    let d1 = rows[1]["distance"].as_f64().unwrap();
    assert!(d0 <= d1);
}

#[test]
fn nearby_widens_when_radius_is_empty() {
    let (_dir, state) = test_state();
    seed(&state);

    // two miles east of Pearl Street: empty at 1 mi, found at 3 mi
    let resp = get(&state, "/api/laundromats?lat=40.0176&lng=-105.2420&radius=1");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("X-Search-Tier").unwrap(), "expanded");
    let body = json_of(resp);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let resp = get(&state, "/api/laundromats?lat=45.0&lng=-100.0&radius=1");
    assert_eq!(resp.headers().get("X-Search-Tier").unwrap(), "closest");
    assert_eq!(json_of(resp).as_array().unwrap().len(), 3);
}

#[test]
fn nearby_rejects_bad_parameters_as_json() {
    let (_dir, state) = test_state();

    let resp = get(&state, "/api/laundromats?lng=-104.99&radius=5");
    assert_eq!(resp.status(), 400);
    let body = json_of(resp);
    assert!(body["error"].as_str().unwrap().contains("lat"));

    let resp = get(&state, "/api/laundromats?lat=91&lng=0&radius=5");
    assert_eq!(resp.status(), 400);
}

#[test]
fn listing_lookup_and_missing_slug() {
    let (_dir, state) = test_state();
    seed(&state);

    let resp = get(&state, "/api/laundromats/union-wash-denver");
    assert_eq!(resp.status(), 200);
    let body = json_of(resp);
    assert_eq!(body["name"], "Union Wash");
    assert_eq!(body["citySlug"], "denver-co");
    assert!(body["isCurrentlyOpen"].is_null());

    let resp = get(&state, "/api/laundromats/nope");
    assert_eq!(resp.status(), 404);
    assert_eq!(json_of(resp)["error"], "Not Found");
}

#[test]
fn search_matches_city_names() {
    let (_dir, state) = test_state();
    seed(&state);

    let body = json_of(get(&state, "/api/laundromats/search?q=denver"));
    assert_eq!(body.as_array().unwrap().len(), 2);

    assert_eq!(get(&state, "/api/laundromats/search").status(), 400);
}

#[test]
fn directory_rollups() {
    let (_dir, state) = test_state();
    seed(&state);

    let states = json_of(get(&state, "/api/states"));
    let abbrs: Vec<&str> = states
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["abbr"].as_str().unwrap())
        .collect();
    assert_eq!(abbrs, vec!["CO", "TX"]);

    let cities = json_of(get(&state, "/api/states/co/cities"));
    assert_eq!(cities[0]["slug"], "denver-co");
    assert_eq!(cities[0]["laundryCount"], 2);

    let city = json_of(get(&state, "/api/cities/boulder-co"));
    assert_eq!(city["name"], "Boulder");

    let listings = json_of(get(&state, "/api/cities/denver-co/laundromats"));
    assert_eq!(listings.as_array().unwrap().len(), 2);

    let seo = json_of(get(&state, "/api/cities/denver-co/seo"));
    assert!(seo["meta"]["title"].as_str().unwrap().contains("Denver"));
    assert!(seo["jsonLd"].is_object());

    assert_eq!(get(&state, "/api/cities/atlantis-xx").status(), 404);
    assert_eq!(get(&state, "/api/states/wy/cities").status(), 404);
}

#[test]
fn posting_a_review_needs_a_session() {
    let (_dir, state) = test_state();
    seed(&state);

    let anonymous = Request::builder()
        .method(Method::POST)
        .uri("/api/laundromats/union-wash-denver/reviews")
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"rating": 5}"#))
        .unwrap();
    assert_eq!(handle(anonymous, &state).status(), 401);

    let (_, token) = signed_in_user(&state, "reviewer@example.com");
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/laundromats/union-wash-denver/reviews")
        .header("Content-Type", "application/json")
        .header("Cookie", format!("session={token}"))
        .body(Body::from(r#"{"rating": 4, "comment": "Plenty of dryers"}"#))
        .unwrap();
    let resp = handle(req, &state);
    assert_eq!(resp.status(), 201);
    assert_eq!(json_of(resp)["rating"], 4);

    let listing = json_of(get(&state, "/api/laundromats/union-wash-denver"));
    assert_eq!(listing["reviewCount"], 1);
    assert_eq!(listing["rating"], 4.0);

    let reviews = json_of(get(&state, "/api/laundromats/union-wash-denver/reviews"));
    assert_eq!(reviews[0]["comment"], "Plenty of dryers");
}

#[test]
fn review_rating_out_of_range_is_rejected() {
    let (_dir, state) = test_state();
    seed(&state);
    let (_, token) = signed_in_user(&state, "reviewer@example.com");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/laundromats/union-wash-denver/reviews")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("Cookie", format!("session={token}"))
        .body(Body::from("rating=9"))
        .unwrap();
    assert_eq!(handle(req, &state).status(), 400);
}

#[test]
fn unknown_cities_and_states_leave_the_cache_empty() {
    let (_dir, state) = test_state();
    seed(&state);

    for i in 0..200 {
        assert_eq!(get(&state, &format!("/api/cities/nowhere-{i}/seo")).status(), 404);
        assert_eq!(get(&state, &format!("/cities/nowhere-{i}")).status(), 404);
    }
    assert_eq!(get(&state, "/api/states/ZZ/cities").status(), 404);
    assert_eq!(state.cache.city_stats.len(), 0);
    assert_eq!(state.cache.cities_by_state.len(), 0);

    assert_eq!(get(&state, "/api/cities/denver-co/seo").status(), 200);
    assert_eq!(state.cache.city_stats.len(), 1);
}

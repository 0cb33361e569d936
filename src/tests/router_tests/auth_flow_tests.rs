use crate::auth::magic::MagicLinkService;
use crate::router::handle;
use crate::state::AppState;
use crate::tests::utils::{body_string, form_body, test_state};
use astra::Body;
use http::{Method, Request};

fn issue_magic_token(state: &AppState, email: &str) -> String {
    state
        .db
        .with_conn(|conn| {
            let svc = MagicLinkService::new(state.magic.clone());
            let issued = svc.request_link(conn, email, chrono::Utc::now().timestamp())?;
            Ok(issued.token)
        })
        .unwrap()
}

#[test]
fn login_page_loads_successfully() {
    let (_dir, state) = test_state();

    let req = Request::builder()
        .method(Method::GET)
        .uri("/login")
        .body(Body::empty())
        .unwrap();

    let resp = handle(req, &state);
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Sign in"));
    assert!(body.contains("action=\"/auth/request-link\""));
    assert!(body.contains("expire after 15 minutes"));
}

#[test]
fn request_link_returns_partial_html_for_htmx() {
    let (_dir, state) = test_state();
    let email = "owner@example.com";

    let req = Request::builder()
        .method(Method::POST)
        .uri("/auth/request-link")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("HX-Request", "true")
        .body(form_body(&[("email", email)]))
        .unwrap();

    let resp = handle(req, &state);
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Sign-in link sent to"));
    assert!(body.contains(email));
    // partial only, so HTMX can swap it into the form
    assert!(!body.contains("<!DOCTYPE html>"));
    assert!(!body.contains("<html"));
}

#[test]
fn request_link_rejects_bad_email() {
    let (_dir, state) = test_state();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/auth/request-link")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(form_body(&[("email", "not-an-email")]))
        .unwrap();

    assert_eq!(handle(req, &state).status(), 400);
}

#[test]
fn magic_link_sets_session_and_is_single_use() {
    let (_dir, state) = test_state();
    let token = issue_magic_token(&state, "owner@example.com");

    let redeem = || {
        Request::builder()
            .method(Method::GET)
            .uri(format!("/auth/magic?token={token}"))
            .body(Body::empty())
            .unwrap()
    };

    let resp = handle(redeem(), &state);
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers().get("Location").unwrap(), "/dashboard");
    let cookie = resp
        .headers()
        .get("Set-Cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    let again = handle(redeem(), &state);
    assert_eq!(again.status(), 401);
    assert!(body_string(again).contains("invalid or expired link"));
}

#[test]
fn logout_revokes_the_session() {
    let (_dir, state) = test_state();
    let token = issue_magic_token(&state, "owner@example.com");

    let resp = handle(
        Request::builder()
            .method(Method::GET)
            .uri(format!("/auth/magic?token={token}"))
            .body(Body::empty())
            .unwrap(),
        &state,
    );
    let set_cookie = resp.headers().get("Set-Cookie").unwrap().to_str().unwrap();
    let session = set_cookie.split(';').next().unwrap().to_string();

    let logout = Request::builder()
        .method(Method::POST)
        .uri("/logout")
        .header("Cookie", session.as_str())
        .body(Body::empty())
        .unwrap();
    let resp = handle(logout, &state);
    assert_eq!(resp.status(), 302);
    assert!(resp
        .headers()
        .get("Set-Cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let dashboard = Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .header("Cookie", session.as_str())
        .body(Body::empty())
        .unwrap();
    assert_eq!(handle(dashboard, &state).status(), 401);
}

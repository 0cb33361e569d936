use crate::config::AppConfig;
use crate::db::auth::get_or_create_user;
use crate::db::connection::{init_db, Database};
use crate::domain::laundromat::NewLaundromat;
use crate::import::normalize::slugify;
use crate::state::AppState;
use astra::{Body, Response};
use std::io::Read;
use tempfile::TempDir;

/// Fresh SQLite file with the production schema. Keep the `TempDir` alive for
/// as long as the database is used.
pub fn init_test_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
    let db = Database::new(dir.path().join("test.sqlite3"));

    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    (dir, db)
}

pub fn test_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
    let cfg = AppConfig {
        db_path: dir.path().join("app.sqlite3"),
        public_url: "http://test.local".to_string(),
        ..AppConfig::default()
    };
    let state = AppState::new(&cfg);
    init_db(&state.db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    (dir, state)
}

pub fn new_listing(
    name: &str,
    city: &str,
    state: &str,
    coords: Option<(&str, &str)>,
) -> NewLaundromat {
    NewLaundromat {
        slug: slugify(&[name, city]),
        name: name.to_string(),
        address: "100 Main St".to_string(),
        city: city.to_string(),
        state: state.to_string(),
        latitude: coords.map(|c| c.0.to_string()),
        longitude: coords.map(|c| c.1.to_string()),
        ..NewLaundromat::default()
    }
}

/// Creates a user and a live session for them, returning (user_id, raw session token).
pub fn signed_in_user(state: &AppState, email: &str) -> (i64, String) {
    state
        .db
        .with_conn(|conn| {
            let user_id = get_or_create_user(conn, email, 1)?;
            let now = chrono::Utc::now().timestamp();
            let token = crate::auth::sessions::create_session(conn, user_id, now)?;
            Ok((user_id, token))
        })
        .unwrap()
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn form_body(pairs: &[(&str, &str)]) -> Body {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    Body::from(encoded)
}

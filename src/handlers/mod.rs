// src/handlers/mod.rs
//
// Request context shared by the handler modules: decoded query string, form
// body and session cookie.

pub mod api;
pub mod owner;
pub mod pages;

use crate::auth::sessions::{session_token_from_cookie, SessionUser};
use crate::db::magic_auth;
use crate::errors::ServerError;
use crate::state::AppState;
use astra::Request;
use std::collections::HashMap;
use std::io::Read;

const MAX_BODY_BYTES: u64 = 64 * 1024;

pub struct RequestCtx {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
    pub json_body: Option<serde_json::Value>,
    pub session_token: Option<String>,
    pub is_htmx: bool,
}

fn decode_pairs(bytes: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(bytes).into_owned().collect()
}

impl RequestCtx {
    pub fn from_request(req: Request) -> Result<Self, ServerError> {
        let method = req.method().as_str().to_string();
        let path = req.uri().path().to_string();
        let query = req
            .uri()
            .query()
            .map(|q| decode_pairs(q.as_bytes()))
            .unwrap_or_default();
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let session_token = header("Cookie")
            .as_deref()
            .and_then(session_token_from_cookie)
            .map(str::to_string);
        let is_htmx = header("HX-Request").is_some_and(|v| v == "true");
        let content_type = header("Content-Type").unwrap_or_default();

        let mut form = HashMap::new();
        let mut json_body = None;
        if method == "POST" {
            let mut raw = Vec::new();
            req.into_body()
                .reader()
                .take(MAX_BODY_BYTES)
                .read_to_end(&mut raw)
                .map_err(|e| ServerError::BadRequest(format!("unreadable body: {e}")))?;

            if content_type.starts_with(mime::APPLICATION_JSON.as_ref()) {
                if !raw.is_empty() {
                    json_body = Some(
                        serde_json::from_slice(&raw)
                            .map_err(|e| ServerError::BadRequest(format!("invalid JSON: {e}")))?,
                    );
                }
            } else {
                form = decode_pairs(&raw);
            }
        }

        Ok(Self {
            method,
            path,
            query,
            form,
            json_body,
            session_token,
            is_htmx,
        })
    }

    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Trimmed, non-empty form field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    pub fn current_user(&self, state: &AppState) -> Result<Option<SessionUser>, ServerError> {
        magic_auth::current_user(&state.db, self.session_token.as_deref(), now_unix())
    }

    pub fn require_user(&self, state: &AppState) -> Result<SessionUser, ServerError> {
        self.current_user(state)?
            .ok_or_else(|| ServerError::Unauthorized("sign in required".into()))
    }
}

pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

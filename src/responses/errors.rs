use crate::errors::ServerError;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;
use tracing::{error, warn};

pub type ResultResp = Result<Response, ServerError>;

/// Turns a handler error into a response: JSON for API callers, an HTML page
/// otherwise. Internal details only go to the log.
pub fn error_response(err: ServerError, wants_json: bool) -> Response {
    let status = err.status();
    match status {
        500 => error!(error = %err, "request failed"),
        401 | 403 => warn!(error = %err, "request rejected"),
        _ => {}
    }

    let message = err.public_message();
    let (content_type, body) = if wants_json {
        (
            mime::APPLICATION_JSON.as_ref(),
            json!({ "error": message }).to_string(),
        )
    } else {
        (
            mime::TEXT_HTML_UTF_8.as_ref(),
            error_page(status, &message).into_string(),
        )
    };

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", content_type)
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}

//! Envelope HTTP handlers.

pub mod decode;
pub mod models;

use axum::response::{IntoResponse, Response};

use crate::app_state::AppState;
use crate::error::Result;

/// Count the request under `route` and turn errors into JSON responses.
fn record(state: &AppState, route: &str, result: Result<Response>) -> Response {
    let resp = result.unwrap_or_else(IntoResponse::into_response);
    state
        .metrics()
        .http_requests
        .inc(&[("route", route), ("status", resp.status().as_str())]);
    resp
}

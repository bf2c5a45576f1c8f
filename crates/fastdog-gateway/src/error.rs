//! Gateway error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fastdog_core::EnvelopeError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("range not satisfiable for {len} bytes")]
    RangeNotSatisfiable { len: usize },
    #[error("bad asset {name}: {reason}")]
    BadAsset { name: String, reason: String },
    #[error("config: {0}")]
    Config(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Stable code used in JSON error bodies and metric labels.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Envelope(e) => e.code().as_str(),
            GatewayError::NotFound(_) => "NOT_FOUND",
            GatewayError::BadRequest(_) => "BAD_REQUEST",
            GatewayError::BodyTooLarge { .. } => "BODY_TOO_LARGE",
            GatewayError::RangeNotSatisfiable { .. } => "RANGE_NOT_SATISFIABLE",
            GatewayError::BadAsset { .. } => "BAD_ASSET",
            GatewayError::Config(_) => "CONFIG",
            GatewayError::Io(_) => "IO",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Envelope(EnvelopeError::PayloadTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Envelope(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            GatewayError::BadAsset { .. } | GatewayError::Config(_) | GatewayError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }

        let mut resp = (
            status,
            Json(ErrorBody {
                error: ErrorDetail {
                    code: self.code(),
                    message: self.to_string(),
                },
            }),
        )
            .into_response();

        if let GatewayError::RangeNotSatisfiable { len } = self {
            if let Ok(v) = format!("bytes */{len}").parse() {
                resp.headers_mut().insert(axum::http::header::CONTENT_RANGE, v);
            }
        }
        resp
    }
}

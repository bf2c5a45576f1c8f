//! `POST /v1/decode`: decode an uploaded envelope.
//!
//! The body is fed chunk by chunk into a `StreamDecoder`, so a bad magic or
//! version is rejected after the first 16 bytes rather than after the upload.

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fastdog_core::envelope::{DecodeStats, StreamDecoder, StreamStatus};
use futures_util::StreamExt;
use serde::Serialize;

use super::record;
use crate::app_state::AppState;
use crate::error::{GatewayError, Result};

#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    pub data: serde_json::Value,
    pub stats: DecodeStats,
}

pub async fn decode(State(state): State<AppState>, body: Body) -> Response {
    let result = decode_body(&state, body).await;
    if let Err(GatewayError::Envelope(e)) = &result {
        state.metrics().decode_errors.inc(&[("code", e.code().as_str())]);
    }
    record(&state, "decode", result.map(|r| Json(r).into_response()))
}

async fn decode_body(state: &AppState, body: Body) -> Result<DecodeResponse> {
    let ctx = state.decoder();
    let limit = state.cfg().gateway.max_body_bytes;
    let started = Instant::now();

    let mut sd = StreamDecoder::new(&ctx);
    let mut stream = body.into_data_stream();
    let mut total = 0usize;

    let decoded = loop {
        match stream.next().await {
            Some(chunk) => {
                let chunk = chunk.map_err(|e| GatewayError::BadRequest(format!("body read failed: {e}")))?;
                total += chunk.len();
                if total > limit {
                    return Err(GatewayError::BodyTooLarge { limit });
                }
                if let StreamStatus::Complete(d) = sd.push(&chunk)? {
                    break d;
                }
            }
            None => break sd.finish()?,
        }
    };

    state
        .metrics()
        .decode_duration
        .observe(&[("backend", ctx.backend_name())], started.elapsed());
    tracing::info!(
        received = total,
        original = decoded.stats.original_size,
        ratio = decoded.stats.compression_ratio,
        "envelope decoded"
    );

    Ok(DecodeResponse {
        data: decoded.value,
        stats: decoded.stats,
    })
}

//! Scene download endpoints.
//!
//! - `GET /v1/models/:name/binary`   : the scene as a FastDog envelope, range aware
//! - `GET /v1/models/:name/info`     : envelope header plus glTF element counts
//! - `GET /v1/models/:name/manifest` : per-part sizes and streaming hints
//! - `GET /v1/cache/stats`         : envelope cache counters
//! - `POST /v1/cache/clear`        : drop cached envelopes and reset counters

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use fastdog_core::envelope::{encode_value, format_info, EncodeOptions, FormatInfo};
use serde::Serialize;

use super::record;
use crate::app_state::AppState;
use crate::assets::scene::StreamingHints;
use crate::assets::{CacheStatus, ModelManifest, SceneSummary, FORMAT_NAME};
use crate::error::{GatewayError, Result};
use crate::transport::{chunked_body, parse_range};

const CACHE_HEADER: &str = "x-fastdog-cache";
const ORIGINAL_SIZE_HEADER: &str = "x-original-size";
const RATIO_HEADER: &str = "x-compression-ratio";
const FORMAT_HEADER: &str = "x-format";

/// An envelope ready to serve.
#[derive(Debug, Clone)]
pub struct LoadedEnvelope {
    pub bytes: Bytes,
    pub status: CacheStatus,
    /// Quoted validator derived from the source file.
    pub etag: String,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(flatten)]
    pub envelope: FormatInfo,
    pub scene: SceneSummary,
}

pub async fn model_binary(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    let result = serve_binary(&state, &name, &headers).await;
    record(&state, "model_binary", result)
}

pub async fn model_info(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let result = describe(&state, &name).await.map(|info| Json(info).into_response());
    record(&state, "model_info", result)
}

pub async fn model_manifest(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let result = manifest(&state, &name).await.map(|m| Json(m).into_response());
    record(&state, "model_manifest", result)
}

pub async fn cache_stats(State(state): State<AppState>) -> Response {
    Json(state.cache().stats()).into_response()
}

pub async fn cache_clear(State(state): State<AppState>) -> Response {
    let cleared = state.cache().clear();
    tracing::info!(cleared, "envelope cache cleared");
    Json(serde_json::json!({ "cleared": cleared })).into_response()
}

/// Load a scene and return its envelope, encoding it on a cache miss.
pub async fn load_envelope(state: &AppState, name: &str) -> Result<LoadedEnvelope> {
    let asset = state.source().load(name).await?;
    let opts = *state.encode_options();
    let (bytes, status) = state
        .cache()
        .get_or_encode(&asset, |raw| encode_scene(name, raw, &opts))?;

    state.metrics().envelope_cache.inc(&[("status", status.as_str())]);
    tracing::info!(model = name, status = status.as_str(), size = bytes.len(), "envelope ready");
    Ok(LoadedEnvelope {
        bytes,
        status,
        etag: asset.fingerprint.etag(),
    })
}

async fn describe(state: &AppState, name: &str) -> Result<ModelInfo> {
    let loaded = load_envelope(state, name).await?;
    let view = state.decoder().decode_view(&loaded.bytes)?;
    Ok(ModelInfo {
        name: name.to_string(),
        envelope: format_info(&loaded.bytes),
        scene: SceneSummary::from_view(&view)?,
    })
}

async fn manifest(state: &AppState, name: &str) -> Result<ModelManifest> {
    let loaded = load_envelope(state, name).await?;
    let view = state.decoder().decode_view(&loaded.bytes)?;
    let scene: serde_json::Value = view.parse()?;
    let stats = view.stats();

    Ok(ModelManifest {
        model_name: name.to_string(),
        format: FORMAT_NAME,
        total_size: loaded.bytes.len(),
        original_size: stats.original_size,
        compression_ratio: stats.compression_ratio,
        parts: ModelManifest::parts_of(&scene),
        streaming: StreamingHints {
            chunk_bytes: state.cfg().gateway.chunk_bytes,
            supports_range: true,
        },
    })
}

/// Re-serialize the scene compactly and wrap it.
fn encode_scene(name: &str, raw: &[u8], opts: &EncodeOptions) -> Result<Bytes> {
    let scene: serde_json::Value = serde_json::from_slice(raw).map_err(|e| GatewayError::BadAsset {
        name: name.to_string(),
        reason: format!("not json: {e}"),
    })?;
    Ok(encode_value(&scene, opts)?)
}

async fn serve_binary(state: &AppState, name: &str, headers: &HeaderMap) -> Result<Response> {
    let LoadedEnvelope { bytes: envelope, status, etag } = load_envelope(state, name).await?;
    let etag_value = HeaderValue::from_str(&etag)
        .map_err(|e| GatewayError::BadRequest(format!("etag: {e}")))?;

    let unchanged = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|t| t.trim() == etag || t.trim() == "*"));
    if unchanged {
        let mut resp = StatusCode::NOT_MODIFIED.into_response();
        resp.headers_mut().insert(header::ETAG, etag_value);
        return Ok(resp);
    }

    let total = envelope.len();
    let info = format_info(&envelope);
    let ratio = if info.original_size == 0 {
        0.0
    } else {
        total as f64 / f64::from(info.original_size)
    };
    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let range = parse_range(range_header, total)?;
    let chunk = state.cfg().gateway.chunk_bytes;

    let (code, body_bytes, content_range) = match range {
        Some(r) => (
            StatusCode::PARTIAL_CONTENT,
            envelope.slice(r.start..=r.end),
            Some(r.content_range(total)),
        ),
        None => (StatusCode::OK, envelope, None),
    };

    state
        .metrics()
        .bytes_served
        .add(&[("route", "model_binary")], body_bytes.len() as u64);

    let mut resp = (code, chunked_body(body_bytes.clone(), chunk)).into_response();
    let h = resp.headers_mut();
    h.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    h.insert(header::CONTENT_LENGTH, HeaderValue::from(body_bytes.len()));
    h.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    h.insert(header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=3600"));
    h.insert(CACHE_HEADER, HeaderValue::from_static(status.as_str()));
    h.insert(header::ETAG, etag_value);
    h.insert(ORIGINAL_SIZE_HEADER, HeaderValue::from(info.original_size));
    h.insert(FORMAT_HEADER, HeaderValue::from_static(FORMAT_NAME));
    if let Ok(v) = HeaderValue::from_str(&format!("{ratio:.2}")) {
        h.insert(RATIO_HEADER, v);
    }
    if let Some(cr) = content_range {
        let v = HeaderValue::from_str(&cr)
            .map_err(|e| GatewayError::BadRequest(format!("content-range: {e}")))?;
        h.insert(header::CONTENT_RANGE, v);
    }
    Ok(resp)
}

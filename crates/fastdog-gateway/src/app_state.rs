//! Shared application state for the FastDog gateway.
//!
//! Owns the decoder context (built once from config, so the inflate backend
//! is fixed for the process), the scene source, the envelope cache and the
//! metrics registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fastdog_core::envelope::{DecoderContext, EncodeOptions};

use crate::assets::{EnvelopeCache, FsSceneSource, SceneSource};
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::obs::GatewayMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    decoder: Arc<DecoderContext>,
    source: Arc<dyn SceneSource>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    encode: EncodeOptions,
    cache: EnvelopeCache,
    metrics: GatewayMetrics,
    draining: AtomicBool,
}

impl AppState {
    /// Build state with a filesystem scene source rooted at `assets.dir`.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        if !cfg.assets.dir.is_dir() {
            tracing::warn!(dir = %cfg.assets.dir.display(), "assets.dir does not exist; model routes will 404");
        }
        let source = Arc::new(FsSceneSource::new(cfg.assets.dir.clone()));
        Ok(Self::with_source(cfg, source))
    }

    pub fn with_source(cfg: GatewayConfig, source: Arc<dyn SceneSource>) -> Self {
        let decoder = Arc::new(DecoderContext::new(cfg.decoder.decoder_options()));
        tracing::info!(backend = decoder.backend_name(), "decoder backend selected");

        Self {
            inner: Arc::new(AppStateInner {
                encode: cfg.decoder.encode_options(),
                cache: EnvelopeCache::new(cfg.assets.max_cache_entries),
                metrics: GatewayMetrics::default(),
                draining: AtomicBool::new(false),
                cfg,
            }),
            decoder,
            source,
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn decoder(&self) -> Arc<DecoderContext> {
        Arc::clone(&self.decoder)
    }

    pub fn source(&self) -> Arc<dyn SceneSource> {
        Arc::clone(&self.source)
    }

    pub fn encode_options(&self) -> &EncodeOptions {
        &self.inner.encode
    }

    pub fn cache(&self) -> &EnvelopeCache {
        &self.inner.cache
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }

    /// Gauge lines appended to `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        let cache = self.cache().stats();
        vec![
            ("fastdog_draining", u64::from(self.is_draining())),
            ("fastdog_envelope_cache_entries", cache.entries as u64),
            ("fastdog_decoder_calls", self.decoder.decode_count()),
        ]
    }
}

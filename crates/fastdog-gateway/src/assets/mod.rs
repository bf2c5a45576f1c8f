//! Scene asset sources and the envelope cache.
//!
//! A scene is either a `.gltf` JSON file that the gateway encodes on demand,
//! or a prebuilt `.fastdog` envelope sitting next to it, served as-is.

pub mod cache;
pub mod scene;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{GatewayError, Result};

pub use cache::{CacheStats, CacheStatus, EnvelopeCache};
pub use scene::{ModelManifest, SceneSummary, FORMAT_NAME};

/// Extension of prebuilt envelopes.
pub const PREBUILT_EXT: &str = "fastdog";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// JSON scene, needs encoding.
    Scene,
    /// Already an envelope.
    Prebuilt,
}

/// Identity of one version of an asset file. Changes when the file does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl Fingerprint {
    /// Strong validator built from modification time and size.
    pub fn etag(&self) -> String {
        let mtime = self
            .modified
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_nanos());
        format!("\"{mtime:x}-{:x}\"", self.len)
    }
}

#[derive(Debug, Clone)]
pub struct SceneAsset {
    pub kind: AssetKind,
    pub fingerprint: Fingerprint,
    pub bytes: Bytes,
}

/// Where scene files come from.
#[async_trait]
pub trait SceneSource: Send + Sync {
    async fn load(&self, name: &str) -> Result<SceneAsset>;
}

/// Reject names that could escape the asset directory.
pub fn check_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.');
    if bad {
        return Err(GatewayError::BadRequest(format!("invalid asset name: {name:?}")));
    }
    Ok(())
}

/// Directory-backed source.
pub struct FsSceneSource {
    dir: PathBuf,
}

impl FsSceneSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read(path: PathBuf, kind: AssetKind) -> Result<SceneAsset> {
        let meta = tokio::fs::metadata(&path).await?;
        let bytes = tokio::fs::read(&path).await?;
        Ok(SceneAsset {
            kind,
            fingerprint: Fingerprint {
                path,
                modified: meta.modified().ok(),
                len: meta.len(),
            },
            bytes: Bytes::from(bytes),
        })
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[async_trait]
impl SceneSource for FsSceneSource {
    async fn load(&self, name: &str) -> Result<SceneAsset> {
        check_name(name)?;
        let scene = self.dir.join(name);

        let prebuilt = scene.with_extension(PREBUILT_EXT);
        if prebuilt != scene && is_file(&prebuilt).await {
            tracing::debug!(path = %prebuilt.display(), "serving prebuilt envelope");
            return Self::read(prebuilt, AssetKind::Prebuilt).await;
        }

        if !is_file(&scene).await {
            return Err(GatewayError::NotFound(format!("model {name}")));
        }
        let kind = if scene.extension().is_some_and(|e| e == PREBUILT_EXT) {
            AssetKind::Prebuilt
        } else {
            AssetKind::Scene
        };
        Self::read(scene, kind).await
    }
}

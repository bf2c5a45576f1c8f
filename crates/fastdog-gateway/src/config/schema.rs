use std::path::PathBuf;

use fastdog_core::envelope::{BackendKind, DecodeLimits, DecoderOptions, EncodeOptions};
use serde::Deserialize;

use crate::error::{GatewayError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub assets: AssetsSection,

    #[serde(default)]
    pub decoder: DecoderSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GatewayError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.assets.validate()?;
        self.decoder.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Largest request body accepted by `POST /v1/decode`.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Response body chunk size for envelope downloads.
    #[serde(default = "default_chunk_bytes")]
    pub chunk_bytes: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_bytes: default_max_body_bytes(),
            chunk_bytes: default_chunk_bytes(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1024..=1024 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(GatewayError::Config(
                "gateway.max_body_bytes must be between 1KiB and 1GiB".into(),
            ));
        }
        if !(1024..=4 * 1024 * 1024).contains(&self.chunk_bytes) {
            return Err(GatewayError::Config(
                "gateway.chunk_bytes must be between 1KiB and 4MiB".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}
fn default_chunk_bytes() -> usize {
    64 * 1024
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsSection {
    /// Directory holding `.gltf` scenes and prebuilt `.fastdog` envelopes.
    #[serde(default = "default_assets_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_max_cache_entries")]
    pub max_cache_entries: usize,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            dir: default_assets_dir(),
            max_cache_entries: default_max_cache_entries(),
        }
    }
}

impl AssetsSection {
    pub fn validate(&self) -> Result<()> {
        if self.dir.as_os_str().is_empty() {
            return Err(GatewayError::Config("assets.dir must not be empty".into()));
        }
        if self.max_cache_entries == 0 {
            return Err(GatewayError::Config(
                "assets.max_cache_entries must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("static/models")
}
fn default_max_cache_entries() -> usize {
    32
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecoderSection {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default = "default_max_decoded_bytes")]
    pub max_decoded_bytes: usize,

    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

impl Default for DecoderSection {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            max_decoded_bytes: default_max_decoded_bytes(),
            compression_level: default_compression_level(),
        }
    }
}

impl DecoderSection {
    pub fn validate(&self) -> Result<()> {
        if self.max_decoded_bytes == 0 {
            return Err(GatewayError::Config(
                "decoder.max_decoded_bytes must be positive".into(),
            ));
        }
        if self.compression_level > 9 {
            return Err(GatewayError::Config(
                "decoder.compression_level must be between 0 and 9".into(),
            ));
        }
        Ok(())
    }

    pub fn decoder_options(&self) -> DecoderOptions {
        DecoderOptions {
            backend: self.backend,
            limits: DecodeLimits {
                max_decoded_bytes: self.max_decoded_bytes,
            },
        }
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            level: self.compression_level,
            ..EncodeOptions::default()
        }
    }
}

fn default_max_decoded_bytes() -> usize {
    DecodeLimits::default().max_decoded_bytes
}
fn default_compression_level() -> u32 {
    6
}

//! Encoded envelope cache keyed by asset fingerprint.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use serde::Serialize;

use super::{AssetKind, Fingerprint, SceneAsset};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Prebuilt envelope, no encoding involved.
    Direct,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Direct => "DIRECT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub max_entries: usize,
    /// hits / total_requests, 0.0 before the first request.
    pub hit_rate: f64,
}

struct CacheEntry {
    envelope: Bytes,
    /// Tick of the last lookup that returned this entry.
    last_used: AtomicU64,
}

/// Bounded envelope cache with least-recently-used eviction.
pub struct EnvelopeCache {
    map: DashMap<Fingerprint, CacheEntry>,
    max_entries: usize,
    clock: AtomicU64,
    total: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EnvelopeCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            map: DashMap::new(),
            max_entries: max_entries.max(1),
            clock: AtomicU64::new(0),
            total: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the envelope for `asset`, encoding it with `encode` on a miss.
    ///
    /// Prebuilt envelopes pass through and count as hits.
    pub fn get_or_encode<F>(&self, asset: &SceneAsset, encode: F) -> Result<(Bytes, CacheStatus)>
    where
        F: FnOnce(&[u8]) -> Result<Bytes>,
    {
        self.total.fetch_add(1, Ordering::Relaxed);

        if asset.kind == AssetKind::Prebuilt {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok((asset.bytes.clone(), CacheStatus::Direct));
        }

        if let Some(hit) = self.map.get(&asset.fingerprint) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            hit.last_used.store(self.tick(), Ordering::Relaxed);
            return Ok((hit.envelope.clone(), CacheStatus::Hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let envelope = encode(&asset.bytes)?;

        self.evict_for_insert(&asset.fingerprint);
        self.map.insert(
            asset.fingerprint.clone(),
            CacheEntry {
                envelope: envelope.clone(),
                last_used: AtomicU64::new(self.tick()),
            },
        );
        Ok((envelope, CacheStatus::Miss))
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Make room for one entry. Older versions of the same file go first,
    /// then the least recently used entries.
    fn evict_for_insert(&self, incoming: &Fingerprint) {
        self.map.retain(|k, _| k.path != incoming.path);
        while self.map.len() >= self.max_entries {
            // Collect the key before removing: removing while iterating deadlocks the shard.
            let victim = self
                .map
                .iter()
                .min_by_key(|e| e.value().last_used.load(Ordering::Relaxed))
                .map(|e| e.key().clone());
            match victim {
                Some(k) => {
                    tracing::debug!(path = %k.path.display(), "evicting cached envelope");
                    self.map.remove(&k);
                }
                None => break,
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        let total_requests = self.total.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);
        CacheStats {
            total_requests,
            hits,
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.map.len(),
            max_entries: self.max_entries,
            hit_rate: if total_requests == 0 { 0.0 } else { hits as f64 / total_requests as f64 },
        }
    }

    /// Drop every entry and reset the counters. Returns the number of entries dropped.
    pub fn clear(&self) -> usize {
        let dropped = self.map.len();
        self.map.clear();
        self.total.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        dropped
    }
}

//! Repeated-decode timing.

use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

use super::decode::DecoderContext;

/// Timings over `iterations` full decodes of one buffer.
///
/// Failed decodes are timed too; `success_rate` tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub iterations: u32,
    #[serde(rename = "total_time_ms", serialize_with = "millis")]
    pub total: Duration,
    #[serde(rename = "avg_time_ms", serialize_with = "millis")]
    pub avg: Duration,
    #[serde(rename = "min_time_ms", serialize_with = "millis")]
    pub min: Duration,
    #[serde(rename = "max_time_ms", serialize_with = "millis")]
    pub max: Duration,
    /// Successful decodes / iterations; 0.0 when nothing ran.
    pub success_rate: f32,
}

fn millis<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

impl DecoderContext {
    /// Decode `data` `iterations` times and report the timings.
    pub fn benchmark(&self, data: &[u8], iterations: u32) -> BenchmarkReport {
        let mut total = Duration::ZERO;
        let mut min = Duration::MAX;
        let mut max = Duration::ZERO;
        let mut successes = 0u32;

        for _ in 0..iterations {
            let started = Instant::now();
            let ok = self.decode(data).is_ok();
            let elapsed = started.elapsed();

            successes += u32::from(ok);
            total += elapsed;
            min = min.min(elapsed);
            max = max.max(elapsed);
        }

        if iterations == 0 {
            return BenchmarkReport {
                iterations,
                total,
                avg: Duration::ZERO,
                min: Duration::ZERO,
                max,
                success_rate: 0.0,
            };
        }

        tracing::debug!(iterations, successes, total_us = total.as_micros() as u64, "decode benchmark done");
        BenchmarkReport {
            iterations,
            total,
            avg: total / iterations,
            min,
            max,
            success_rate: successes as f32 / iterations as f32,
        }
    }
}

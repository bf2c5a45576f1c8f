//! Decoder properties: determinism, failure ordering, limits, zero-copy view.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use fastdog_core::envelope::{
    encode, encode_value, DecodeLimits, DecoderContext, DecoderOptions, EncodeOptions,
};
use fastdog_core::EnvelopeError;
use serde_json::json;

fn scene() -> serde_json::Value {
    json!({
        "asset": { "version": "2.0" },
        "nodes": [{ "mesh": 0, "translation": [1.5, 0.0, -2.25] }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "accessors": [{ "count": 24, "type": "VEC3", "componentType": 5126 }]
    })
}

#[test]
fn round_trip_preserves_structure() {
    let ctx = DecoderContext::default();
    for level in [0, 1, 6, 9] {
        let env = encode_value(&scene(), &EncodeOptions { version: 1, level }).unwrap();
        let decoded = ctx.decode(&env).unwrap();
        assert_eq!(decoded.value, scene(), "level={level}");
    }
}

#[test]
fn decode_is_deterministic() {
    let ctx = DecoderContext::default();
    let env = encode_value(&scene(), &EncodeOptions::default()).unwrap();

    let a = ctx.decode(&env).unwrap();
    let b = ctx.decode(&env).unwrap();
    assert_eq!(a.value, b.value);
    assert_eq!(a.stats.original_size, b.stats.original_size);
    assert_eq!(a.stats.compressed_size, b.stats.compressed_size);
    assert_eq!(a.stats.compression_ratio, b.stats.compression_ratio);
    assert_eq!(ctx.decode_count(), 2);

    let _ = ctx.decode(b"short");
    assert_eq!(ctx.dispose(), 3);
}

#[test]
fn stats_report_ratio_of_compressed_to_original() {
    let ctx = DecoderContext::default();
    let big = json!({ "nodes": vec![json!({ "name": "node" }); 200] });
    let env = encode_value(&big, &EncodeOptions::default()).unwrap();
    let stats = ctx.decode_stats(&env).unwrap();

    let expected = stats.compressed_size as f32 / stats.original_size as f32;
    assert_eq!(stats.compression_ratio, expected);
    assert!(stats.compression_ratio < 1.0);
    assert_eq!(stats.format_version, 1);

    let rendered = serde_json::to_value(stats).unwrap();
    assert!(rendered["decode_time_ms"].is_f64());
}

#[test]
fn every_truncation_below_minimum_is_too_short() {
    let ctx = DecoderContext::default();
    let env = encode(br#"{"meshes":[]}"#, &EncodeOptions::default()).unwrap();
    for k in 0..20 {
        let err = ctx.decode(&env[..k]).unwrap_err();
        assert!(matches!(err, EnvelopeError::FormatTooShort { len, .. } if len == k), "k={k}");
    }
}

#[test]
fn truncation_inside_payload_is_truncated_payload() {
    let ctx = DecoderContext::default();
    let env = encode_value(&scene(), &EncodeOptions::default()).unwrap();
    for k in 20..env.len() {
        let err = ctx.decode(&env[..k]).unwrap_err();
        assert_eq!(err.code().as_str(), "TRUNCATED_PAYLOAD", "k={k}");
    }
}

#[test]
fn any_altered_magic_byte_is_bad_magic() {
    let ctx = DecoderContext::default();
    let env = encode(br#"{"meshes":[]}"#, &EncodeOptions::default()).unwrap();
    for i in 0..8 {
        let mut bad = env.to_vec();
        bad[i] ^= 0x20;
        assert_eq!(ctx.decode(&bad).unwrap_err().code().as_str(), "BAD_MAGIC", "byte={i}");
    }
}

#[test]
fn oversized_compressed_length_is_truncated_payload() {
    let ctx = DecoderContext::default();
    let mut env = encode(br#"{"meshes":[]}"#, &EncodeOptions::default()).unwrap().to_vec();
    env[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
    let err = ctx.decode(&env).unwrap_err();
    assert!(matches!(err, EnvelopeError::TruncatedPayload { declared: u32::MAX, .. }));
}

#[test]
fn trailer_disagreement_is_length_mismatch() {
    let ctx = DecoderContext::default();
    let mut env = encode(br#"{"meshes":[]}"#, &EncodeOptions::default()).unwrap().to_vec();
    let n = env.len();
    env[n - 4..].copy_from_slice(&12u32.to_le_bytes());
    assert_eq!(
        ctx.decode(&env).unwrap_err(),
        EnvelopeError::LengthMismatch { expected: 12, actual: 13 }
    );
}

#[test]
fn declared_size_over_limit_fails_before_inflating() {
    let ctx = DecoderContext::new(DecoderOptions {
        limits: DecodeLimits { max_decoded_bytes: 8 },
        ..Default::default()
    });
    let env = encode(br#"{"meshes":[]}"#, &EncodeOptions::default()).unwrap();
    assert_eq!(ctx.decode(&env).unwrap_err(), EnvelopeError::PayloadTooLarge { limit: 8 });
}

#[test]
fn empty_payload_decodes_to_invalid_json() {
    let ctx = DecoderContext::default();
    let env = encode(b"", &EncodeOptions::default()).unwrap();

    let view = ctx.decode_view(&env).unwrap();
    assert!(view.is_empty());
    assert_eq!(view.stats().compression_ratio, 0.0);
    assert_eq!(ctx.decode(&env).unwrap_err().code().as_str(), "INVALID_PAYLOAD");
}

#[test]
fn view_exposes_inflated_bytes_for_lazy_parsing() {
    let ctx = DecoderContext::default();
    let text = r#"{"meshes":[{"name":"hull"}],"extras":{"lod":3}}"#;
    let env = encode(text.as_bytes(), &EncodeOptions::default()).unwrap();

    let view = ctx.decode_view(&env).unwrap();
    assert_eq!(view.as_bytes(), text.as_bytes());
    assert_eq!(view.as_str().unwrap(), text);
    assert_eq!(view.raw_json().unwrap().get(), text);
    assert_eq!(view.stats().original_size as usize, text.len());

    #[derive(serde::Deserialize)]
    struct Extras {
        lod: u32,
    }
    #[derive(serde::Deserialize)]
    struct Partial {
        extras: Extras,
    }
    let p: Partial = view.parse().unwrap();
    assert_eq!(p.extras.lod, 3);

    let bytes = view.into_bytes();
    assert_eq!(bytes.len(), text.len());
}

#[test]
fn context_is_shareable_across_threads() {
    let ctx = std::sync::Arc::new(DecoderContext::default());
    let env = encode_value(&scene(), &EncodeOptions::default()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctx = std::sync::Arc::clone(&ctx);
            let env = env.clone();
            std::thread::spawn(move || ctx.decode(&env).unwrap().value)
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), scene());
    }
    assert_eq!(ctx.decode_count(), 4);
}

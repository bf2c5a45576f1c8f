//! Chunked reassembly matches one-shot decoding.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use fastdog_core::envelope::{encode_value, DecoderContext, EncodeOptions, StreamDecoder, StreamStatus};
use serde_json::json;

fn envelope() -> bytes::Bytes {
    let scene = json!({ "meshes": [{ "name": "a" }, { "name": "b" }], "nodes": [0, 1, 2] });
    encode_value(&scene, &EncodeOptions::default()).unwrap()
}

fn feed(sd: &mut StreamDecoder<'_>, data: &[u8], chunk: usize) -> Option<serde_json::Value> {
    let mut out = None;
    for piece in data.chunks(chunk) {
        match sd.push(piece).unwrap() {
            StreamStatus::Complete(d) => out = Some(d.value),
            StreamStatus::Pending { progress, .. } => assert!((0.0..1.0).contains(&progress)),
        }
    }
    out
}

#[test]
fn any_chunk_size_matches_one_shot() {
    let ctx = DecoderContext::default();
    let env = envelope();
    let expected = ctx.decode(&env).unwrap().value;

    for chunk in [1, 3, 7, 16, 17, 64, env.len()] {
        let mut sd = StreamDecoder::new(&ctx);
        assert_eq!(feed(&mut sd, &env, chunk), Some(expected.clone()), "chunk={chunk}");
        assert_eq!(sd.buffered(), 0, "chunk={chunk}");
    }
}

#[test]
fn progress_is_known_after_header() {
    let ctx = DecoderContext::default();
    let env = envelope();
    let mut sd = StreamDecoder::new(&ctx);

    match sd.push(&env[..10]).unwrap() {
        StreamStatus::Pending { progress, received, chunks } => {
            assert_eq!(progress, 0.0);
            assert_eq!(received, 10);
            assert_eq!(chunks, 1);
        }
        StreamStatus::Complete(_) => panic!("too early"),
    }
    assert_eq!(sd.expected_size(), None);

    sd.push(&env[10..20]).unwrap();
    assert_eq!(sd.expected_size(), Some(env.len()));
    assert!(sd.progress() > 0.0 && sd.progress() < 1.0);
}

#[test]
fn bad_magic_fails_before_payload_arrives() {
    let ctx = DecoderContext::default();
    let mut env = envelope().to_vec();
    env[0] = b'X';
    let mut sd = StreamDecoder::new(&ctx);

    assert!(matches!(sd.push(&env[..8]), Ok(StreamStatus::Pending { .. })));
    let err = sd.push(&env[8..16]).unwrap_err();
    assert_eq!(err.code().as_str(), "BAD_MAGIC");
}

#[test]
fn rejected_header_leaves_decoder_ready_for_next_envelope() {
    let ctx = DecoderContext::default();
    let good = envelope();
    let mut bad = good.to_vec();
    bad[8] = 7;
    let mut sd = StreamDecoder::new(&ctx);

    let err = sd.push(&bad).unwrap_err();
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
    assert_eq!(sd.buffered(), 0);
    assert_eq!(sd.expected_size(), None);

    match sd.push(&good).unwrap() {
        StreamStatus::Complete(d) => assert_eq!(d.value, ctx.decode(&good).unwrap().value),
        StreamStatus::Pending { .. } => panic!("envelope should complete"),
    }
}

#[test]
fn finish_on_partial_input_reports_one_shot_error() {
    let ctx = DecoderContext::default();
    let env = envelope();

    let mut sd = StreamDecoder::new(&ctx);
    sd.push(&env[..12]).unwrap();
    assert_eq!(sd.finish().unwrap_err().code().as_str(), "FORMAT_TOO_SHORT");

    sd.push(&env[..env.len() - 1]).unwrap();
    assert_eq!(sd.finish().unwrap_err().code().as_str(), "TRUNCATED_PAYLOAD");
}

#[test]
fn trailing_bytes_after_envelope_are_dropped() {
    let ctx = DecoderContext::default();
    let mut data = envelope().to_vec();
    data.extend_from_slice(b"junk");

    let mut sd = StreamDecoder::new(&ctx);
    assert!(matches!(sd.push(&data), Ok(StreamStatus::Complete(_))));
    assert_eq!(sd.buffered(), 0);
    assert_eq!(sd.expected_size(), None);
}

//! Envelope vector tests, run against both inflate backends.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use fastdog_core::envelope::{BackendKind, DecoderContext, DecoderOptions};

use vector_loader::{load, ALL};

fn contexts() -> Vec<DecoderContext> {
    [BackendKind::Streaming, BackendKind::Preallocated]
        .into_iter()
        .map(|backend| DecoderContext::new(DecoderOptions { backend, ..Default::default() }))
        .collect()
}

#[test]
fn decode_vectors() {
    for ctx in contexts() {
        for f in ALL {
            let v = load(f);
            let raw = v.frame.decode();
            let res = ctx.decode(&raw);
            let tag = format!("vector={} backend={}", v.description, ctx.backend_name());

            if let Some(err) = v.expect_error {
                let e = res.expect_err("expected error");
                assert_eq!(e.code().as_str(), err.code, "{tag}");
                continue;
            }

            let decoded = res.expect("expected ok decode");
            let ex = v.expect.expect("missing expect block");
            assert_eq!(decoded.value, ex.value, "{tag}");
            assert_eq!(decoded.stats.format_version, ex.version, "{tag}");
            assert_eq!(decoded.stats.original_size, ex.original_size, "{tag}");
            assert_eq!(decoded.stats.compressed_size, ex.compressed_size, "{tag}");
        }
    }
}

#[test]
fn view_vectors_fail_the_same_way_before_parsing() {
    let ctx = DecoderContext::default();
    for f in ALL {
        let v = load(f);
        let raw = v.frame.decode();
        let parsed = ctx.decode(&raw);
        let viewed = ctx.decode_view(&raw).and_then(|view| view.parse::<serde_json::Value>());

        match (parsed, viewed) {
            (Ok(a), Ok(b)) => assert_eq!(a.value, b, "vector={}", v.description),
            (Err(a), Err(b)) => assert_eq!(a.code(), b.code(), "vector={}", v.description),
            (a, b) => panic!("paths disagree for {}: {a:?} vs {b:?}", v.description),
        }
    }
}

#[test]
fn meshes_scenario() {
    let v = load("envelope_meshes_empty.json");
    let raw = v.frame.decode();
    let ctx = DecoderContext::default();

    let decoded = ctx.decode(&raw).unwrap();
    assert_eq!(decoded.value, serde_json::json!({ "meshes": [] }));
    assert_eq!(decoded.stats.original_size, 13);

    let mut corrupted = raw.clone();
    corrupted[7] = b'2';
    let err = ctx.decode(&corrupted).unwrap_err();
    assert_eq!(err.code().as_str(), "BAD_MAGIC");
    assert!(err.to_string().contains("FASTDOG2"));
}

//! glTF scene descriptions derived from a decoded envelope: element counts
//! for `/info` and a per-part manifest for progressive loaders.

use fastdog_core::envelope::EnvelopeView;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire format name advertised in headers and manifests.
pub const FORMAT_NAME: &str = "fastdog-binary-v1";

/// Top-level glTF arrays, element contents skipped.
#[derive(Debug, Default, Deserialize)]
struct SceneShape {
    #[serde(default)]
    nodes: Vec<IgnoredAny>,
    #[serde(default)]
    meshes: Vec<IgnoredAny>,
    #[serde(default)]
    materials: Vec<IgnoredAny>,
    #[serde(default)]
    textures: Vec<IgnoredAny>,
    #[serde(default)]
    animations: Vec<IgnoredAny>,
    #[serde(default)]
    scenes: Vec<IgnoredAny>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SceneSummary {
    pub nodes: usize,
    pub meshes: usize,
    pub materials: usize,
    pub textures: usize,
    pub animations: usize,
    pub scenes: usize,
}

impl SceneSummary {
    /// Count elements without building the scene tree.
    pub fn from_view(view: &EnvelopeView) -> fastdog_core::Result<Self> {
        let s: SceneShape = view.parse()?;
        Ok(Self {
            nodes: s.nodes.len(),
            meshes: s.meshes.len(),
            materials: s.materials.len(),
            textures: s.textures.len(),
            animations: s.animations.len(),
            scenes: s.scenes.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Geometry,
    Material,
    Texture,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestPart {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PartKind,
    /// Primitive count, geometry parts only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primitives: Option<usize>,
    /// Compact JSON size of the element.
    pub json_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamingHints {
    pub chunk_bytes: usize,
    pub supports_range: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelManifest {
    pub model_name: String,
    pub format: &'static str,
    /// Envelope size on the wire.
    pub total_size: usize,
    pub original_size: u32,
    pub compression_ratio: f32,
    pub parts: Vec<ManifestPart>,
    pub streaming: StreamingHints,
}

impl ModelManifest {
    /// Meshes, then materials, then textures, each in document order.
    pub fn parts_of(scene: &Value) -> Vec<ManifestPart> {
        let mut parts = Vec::new();
        for (key, prefix, kind) in [
            ("meshes", "mesh", PartKind::Geometry),
            ("materials", "material", PartKind::Material),
            ("textures", "texture", PartKind::Texture),
        ] {
            let Some(items) = scene.get(key).and_then(Value::as_array) else {
                continue;
            };
            for (i, item) in items.iter().enumerate() {
                let primitives = (kind == PartKind::Geometry).then(|| {
                    item.get("primitives")
                        .and_then(Value::as_array)
                        .map_or(0, Vec::len)
                });
                parts.push(ManifestPart {
                    name: format!("{prefix}_{i}"),
                    kind,
                    primitives,
                    json_bytes: serde_json::to_vec(item).map_or(0, |v| v.len()),
                });
            }
        }
        parts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fastdog_core::envelope::{encode_value, DecoderContext, EncodeOptions};
    use serde_json::json;

    use super::*;

    #[test]
    fn summary_counts_top_level_arrays() {
        let env = encode_value(
            &json!({
                "nodes": [{}, {}, {}],
                "meshes": [{ "primitives": [] }],
                "scenes": [{ "nodes": [0] }],
                "asset": { "version": "2.0" }
            }),
            &EncodeOptions::default(),
        )
        .unwrap();
        let view = DecoderContext::default().decode_view(&env).unwrap();
        let s = SceneSummary::from_view(&view).unwrap();
        assert_eq!(
            s,
            SceneSummary { nodes: 3, meshes: 1, scenes: 1, ..Default::default() }
        );
    }

    #[test]
    fn parts_follow_document_order() {
        let scene = json!({
            "meshes": [{ "primitives": [{}, {}] }, {}],
            "materials": [{ "name": "steel" }],
            "textures": [{ "source": 0 }]
        });
        let parts = ModelManifest::parts_of(&scene);
        let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["mesh_0", "mesh_1", "material_0", "texture_0"]);
        assert_eq!(parts[0].primitives, Some(2));
        assert_eq!(parts[1].primitives, Some(0));
        assert_eq!(parts[2].primitives, None);
        assert_eq!(parts[2].json_bytes, r#"{"name":"steel"}"#.len());
    }
}

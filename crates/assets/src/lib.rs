//! Model assets: glTF import and background loading.
//!
//! A model is imported into CPU-side [`LoadedModel`] data: flattened mesh
//! primitives with their node transforms baked into a per-mesh matrix. The
//! renderer uploads that data; nothing here touches the GPU.
//!
//! # Invariants
//! - Importing never panics on malformed input; every failure is an [`AssetError`].
//! - A [`LoadHandle`] yields exactly one terminal event (loaded or failed).

mod import;
mod loader;
mod model;

pub use import::{import_file, import_slice};
pub use loader::{LoadEvent, LoadHandle, LoadProgress, ModelLoader};
pub use model::{LoadedModel, MeshData, TextureData};

/// Errors from model import and loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("missing position data for mesh: {0}")]
    MissingPositions(String),
    #[error("glTF document has no scene")]
    NoScene,
    #[error("loader stopped before producing a model")]
    LoaderStopped,
}

pub fn crate_info() -> &'static str {
    "hangar-assets v0.1.0"
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A single triangle in the XY plane, offset by a node translation of +5 Z,
    /// with a base color factor and an embedded base64 buffer.
    pub const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "mesh": 0, "translation": [0.0, 0.0, 5.0] } ],
        "meshes": [ {
            "name": "hull",
            "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 } ]
        } ],
        "materials": [ { "pbrMetallicRoughness": { "baseColorFactor": [0.5, 0.25, 1.0, 1.0] } } ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
        ],
        "buffers": [ {
            "byteLength": 44,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA="
        } ]
    }"#;

    /// The same triangle without the node offset, textured with an embedded
    /// 1x1 PNG whose only texel is (255, 128, 0, 255).
    pub const TEXTURED_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "mesh": 0 } ],
        "meshes": [ {
            "name": "decal",
            "primitives": [ {
                "attributes": { "POSITION": 0, "TEXCOORD_0": 1 },
                "indices": 2,
                "material": 0
            } ]
        } ],
        "materials": [ { "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } } ],
        "textures": [ { "source": 0, "sampler": 0 } ],
        "samplers": [ {} ],
        "images": [ {
            "uri": "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR4nGP438DwHwAGgAJ/EEwb4QAAAABJRU5ErkJggg=="
        } ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2" },
            { "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 24, "target": 34962 },
            { "buffer": 0, "byteOffset": 60, "byteLength": 6, "target": 34963 }
        ],
        "buffers": [ {
            "byteLength": 68,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAABAAIAAAA="
        } ]
    }"#;
}

use std::sync::Arc;

use glam::{Mat4, Vec3};

/// Decoded texture, always 8-bit RGBA in sRGB encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// Single opaque white texel, sampled by meshes without a base color texture.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }
}

/// One triangle-list primitive with its node transform baked in.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Texture coordinates for the base color texture; empty without one.
    pub uvs: Vec<[f32; 2]>,
    /// Linear RGBA from the material's base color factor.
    pub base_color: [f32; 4],
    /// Shared between every primitive that references the same image.
    pub base_color_texture: Option<Arc<TextureData>>,
    /// Transform from mesh space into model (root node) space.
    pub transform: Mat4,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// CPU-side model ready for upload.
#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    pub name: String,
    pub meshes: Vec<MeshData>,
}

impl LoadedModel {
    /// A model with no geometry. The node still exists and can be moved.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meshes: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }

    /// Mark every mesh as both a shadow caster and a shadow receiver.
    pub fn enable_shadows(&mut self) {
        for mesh in &mut self.meshes {
            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
        }
    }

    /// Axis-aligned bounds in model space, or `None` when there is no geometry.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.meshes.iter().flat_map(|mesh| {
            mesh.positions
                .iter()
                .map(move |p| mesh.transform.transform_point3(Vec3::from_array(*p)))
        });
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(transform: Mat4) -> MeshData {
        MeshData {
            name: "quad".into(),
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            indices: vec![0, 1, 2, 2, 3, 0],
            uvs: Vec::new(),
            base_color: [1.0; 4],
            base_color_texture: None,
            transform,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    #[test]
    fn white_texture_is_one_opaque_texel() {
        let white = TextureData::white();
        assert_eq!((white.width, white.height), (1, 1));
        assert_eq!(white.rgba, vec![255, 255, 255, 255]);
    }

    #[test]
    fn empty_model_has_no_bounds() {
        let model = LoadedModel::empty("nothing");
        assert!(model.bounds().is_none());
        assert_eq!(model.vertex_count(), 0);
        assert_eq!(model.triangle_count(), 0);
    }

    #[test]
    fn counts_sum_over_meshes() {
        let model = LoadedModel {
            name: "pair".into(),
            meshes: vec![quad(Mat4::IDENTITY), quad(Mat4::IDENTITY)],
        };
        assert_eq!(model.vertex_count(), 8);
        assert_eq!(model.triangle_count(), 4);
    }

    #[test]
    fn bounds_include_mesh_transforms() {
        let model = LoadedModel {
            name: "offset".into(),
            meshes: vec![
                quad(Mat4::IDENTITY),
                quad(Mat4::from_translation(Vec3::new(-3.0, 0.0, 2.0))),
            ],
        };
        let (min, max) = model.bounds().unwrap();
        assert_eq!(min, Vec3::new(-3.0, 0.0, 0.0));
        assert_eq!(max, Vec3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn enable_shadows_marks_every_mesh() {
        let mut model = LoadedModel {
            name: "shadowed".into(),
            meshes: vec![quad(Mat4::IDENTITY), quad(Mat4::IDENTITY)],
        };
        model.enable_shadows();
        assert!(model.meshes.iter().all(|m| m.cast_shadow && m.receive_shadow));
    }
}

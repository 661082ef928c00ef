use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::{AssetError, LoadedModel, MeshData, TextureData};

/// Import a `.gltf` or `.glb` file. External buffers and images resolve
/// relative to the file.
pub fn import_file(path: impl AsRef<Path>) -> Result<LoadedModel, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let mut model = import_slice(&bytes, path.parent())?;
    named_after_dir(&mut model, path);
    Ok(model)
}

/// Models ship as `<name>/scene.gltf`, so the directory is the useful name.
pub(crate) fn named_after_dir(model: &mut LoadedModel, path: &Path) {
    if let Some(dir) = path.parent().and_then(Path::file_name) {
        model.name = dir.to_string_lossy().into_owned();
    }
}

/// Decoded buffers and images shared by every primitive in a document.
struct Sources {
    buffers: Vec<gltf::buffer::Data>,
    textures: Vec<Option<Arc<TextureData>>>,
}

/// Import glTF JSON or GLB bytes.
///
/// `base` is the directory external buffer URIs resolve against; with `None`
/// only embedded (data URI or GLB blob) buffers can be read.
pub fn import_slice(bytes: &[u8], base: Option<&Path>) -> Result<LoadedModel, AssetError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, base, blob)?;
    // A missing or undecodable image costs the texture, not the model.
    let textures = match gltf::import_images(&document, base, &buffers) {
        Ok(images) => images.iter().map(rgba_texture).collect(),
        Err(e) => {
            tracing::warn!("skipping textures: {e}");
            Vec::new()
        }
    };
    let sources = Sources { buffers, textures };

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::NoScene)?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        visit_node(&node, Mat4::IDENTITY, &sources, &mut meshes)?;
    }

    let model = LoadedModel {
        name: scene.name().unwrap_or("model").to_string(),
        meshes,
    };
    tracing::debug!(
        meshes = model.meshes.len(),
        vertices = model.vertex_count(),
        triangles = model.triangle_count(),
        "imported glTF scene"
    );
    Ok(model)
}

fn visit_node(
    node: &gltf::Node,
    parent: Mat4,
    sources: &Sources,
    meshes: &mut Vec<MeshData>,
) -> Result<(), AssetError> {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let name = mesh.name().unwrap_or("unnamed");
        for (i, primitive) in mesh.primitives().enumerate() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::debug!(mesh = name, mode = ?primitive.mode(), "skipping non-triangle primitive");
                continue;
            }
            meshes.push(read_primitive(
                &primitive,
                sources,
                format!("{name}_{i}"),
                transform,
            )?);
        }
    }

    for child in node.children() {
        visit_node(&child, transform, sources, meshes)?;
    }
    Ok(())
}

fn read_primitive(
    primitive: &gltf::Primitive,
    sources: &Sources,
    name: String,
    transform: Mat4,
) -> Result<MeshData, AssetError> {
    let reader = primitive.reader(|buffer| {
        sources
            .buffers
            .get(buffer.index())
            .map(|d| d.0.as_slice())
    });

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| AssetError::MissingPositions(name.clone()))?
        .collect();

    let indices: Vec<u32> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(iter) => iter.collect(),
        None => vertex_normals(&positions, &indices),
    };

    let pbr = primitive.material().pbr_metallic_roughness();
    let (uvs, base_color_texture) = match pbr.base_color_texture() {
        Some(info) => {
            let uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(info.tex_coord())
                .map(|tc| tc.into_f32().collect())
                .unwrap_or_default();
            let texture = sources
                .textures
                .get(info.texture().source().index())
                .cloned()
                .flatten();
            if uvs.len() == positions.len() && texture.is_some() {
                (uvs, texture)
            } else {
                tracing::debug!(mesh = %name, "base color texture unusable, using factor only");
                (Vec::new(), None)
            }
        }
        None => (Vec::new(), None),
    };

    Ok(MeshData {
        name,
        positions,
        normals,
        indices,
        uvs,
        base_color: pbr.base_color_factor(),
        base_color_texture,
        transform,
        cast_shadow: false,
        receive_shadow: false,
    })
}

/// Expand a decoded glTF image to RGBA8. Formats wider than 8 bits per
/// channel are not supported and leave the mesh untextured.
fn rgba_texture(image: &gltf::image::Data) -> Option<Arc<TextureData>> {
    use gltf::image::Format;

    let rgba: Vec<u8> = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|c| [c[0], c[1], c[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|c| [c[0], c[0], c[0], c[1]])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            tracing::warn!(format = ?other, "unsupported texture format");
            return None;
        }
    };
    Some(Arc::new(TextureData {
        width: image.width,
        height: image.height,
        rgba,
    }))
}

/// Area-weighted vertex normals for meshes that ship without them.
fn vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from_array(positions[a]);
        let n = (Vec3::from_array(positions[b]) - pa).cross(Vec3::from_array(positions[c]) - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{TEXTURED_GLTF, TRIANGLE_GLTF};

    #[test]
    fn imports_embedded_triangle() {
        let model = import_slice(TRIANGLE_GLTF.as_bytes(), None).unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.triangle_count(), 1);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "hull_0");
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.base_color, [0.5, 0.25, 1.0, 1.0]);
        assert!(mesh.uvs.is_empty());
        assert!(mesh.base_color_texture.is_none());
        assert!(!mesh.cast_shadow);
    }

    #[test]
    fn imports_base_color_texture_and_uvs() {
        let model = import_slice(TEXTURED_GLTF.as_bytes(), None).unwrap();
        let mesh = &model.meshes[0];
        assert_eq!(mesh.uvs, vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);

        let texture = mesh.base_color_texture.as_ref().unwrap();
        assert_eq!((texture.width, texture.height), (1, 1));
        assert_eq!(texture.rgba, vec![255, 128, 0, 255]);
    }

    #[test]
    fn rgb_and_gray_images_expand_to_rgba() {
        let rgb = gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        assert_eq!(
            rgba_texture(&rgb).unwrap().rgba,
            vec![10, 20, 30, 255, 40, 50, 60, 255]
        );

        let gray = gltf::image::Data {
            pixels: vec![7],
            format: gltf::image::Format::R8,
            width: 1,
            height: 1,
        };
        assert_eq!(rgba_texture(&gray).unwrap().rgba, vec![7, 7, 7, 255]);
    }

    #[test]
    fn wide_images_are_skipped() {
        let wide = gltf::image::Data {
            pixels: vec![0; 8],
            format: gltf::image::Format::R16G16B16A16,
            width: 1,
            height: 1,
        };
        assert!(rgba_texture(&wide).is_none());
    }

    #[test]
    fn node_translation_is_baked_into_transform() {
        let model = import_slice(TRIANGLE_GLTF.as_bytes(), None).unwrap();
        let (min, max) = model.bounds().unwrap();
        assert_eq!(min, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(max, Vec3::new(1.0, 1.0, 5.0));
    }

    #[test]
    fn missing_normals_are_generated() {
        let model = import_slice(TRIANGLE_GLTF.as_bytes(), None).unwrap();
        for n in &model.meshes[0].normals {
            assert_eq!(*n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn garbage_input_is_an_error() {
        let err = import_slice(b"not a gltf", None).unwrap_err();
        assert!(matches!(err, AssetError::Gltf(_)));
    }

    #[test]
    fn import_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("falcon");
        std::fs::create_dir(&model_dir).unwrap();
        let path = model_dir.join("scene.gltf");
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();

        let model = import_file(&path).unwrap();
        assert_eq!(model.name, "falcon");
        assert_eq!(model.triangle_count(), 1);
    }

    #[test]
    fn import_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_file(dir.path().join("absent.gltf")).unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
    }

    #[test]
    fn bare_file_name_keeps_model_name() {
        let mut model = LoadedModel::empty("model");
        named_after_dir(&mut model, Path::new("scene.gltf"));
        assert_eq!(model.name, "model");

        named_after_dir(&mut model, Path::new("assets/x-wing/scene.glb"));
        assert_eq!(model.name, "x-wing");
    }
}

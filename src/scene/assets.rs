//! Fetching and decoding of the home scene's model and billboard texture

use super::graph::TextureData;
use super::types::{Color, Mat3, Mat4, Side, Vec3};
use crate::error::AssetError;
use crate::gpu::{Mesh, Vertex};
use base64::Engine;
use gloo::net::http::Request;
use gltf::buffer::Source;
use gltf::mesh::Mode;
use std::future::Future;

/// Triangle geometry flattened out of a glTF scene
#[derive(Clone, Debug, PartialEq)]
pub struct ModelData {
    pub mesh: Mesh,
    /// Base color of the first primitive's material
    pub base_color: Color,
    /// Double-sided when the first primitive's material says so
    pub side: Side,
}

/// GET `url` and return the body bytes
pub async fn fetch_bytes(url: String) -> Result<Vec<u8>, AssetError> {
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| AssetError::Fetch {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    if !response.ok() {
        return Err(AssetError::Status {
            url,
            status: response.status(),
        });
    }

    response.binary().await.map_err(|e| AssetError::Fetch {
        url,
        reason: e.to_string(),
    })
}

pub async fn load_model(url: &str) -> Result<ModelData, AssetError> {
    load_model_with(url, fetch_bytes).await
}

pub async fn load_texture(url: &str) -> Result<TextureData, AssetError> {
    let bytes = fetch_bytes(url.to_string()).await?;
    decode_texture(&bytes)
}

/// Load a glTF/GLB document through `fetch`, which also serves any external buffers
pub async fn load_model_with<F, Fut>(url: &str, fetch: F) -> Result<ModelData, AssetError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<u8>, AssetError>>,
{
    let bytes = fetch(url.to_string()).await?;
    let mut gltf = gltf::Gltf::from_slice(&bytes)?;
    let mut blob = gltf.blob.take();

    let mut buffers = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            Source::Bin => blob.take().ok_or(AssetError::MissingBuffer(buffer.index()))?,
            Source::Uri(uri) => match decode_data_uri(uri)? {
                Some(data) => data,
                None => fetch(resolve_relative(url, uri)).await?,
            },
        };
        if data.len() < buffer.length() {
            return Err(AssetError::MissingBuffer(buffer.index()));
        }
        buffers.push(data);
    }

    flatten_document(&gltf, &buffers)
}

/// Decode PNG/JPEG bytes into RGBA8 pixels
pub fn decode_texture(bytes: &[u8]) -> Result<TextureData, AssetError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    Ok(TextureData {
        width: image.width(),
        height: image.height(),
        pixels: image.into_raw(),
    })
}

/// Resolve a buffer/image URI against the URL of the document referencing it
pub fn resolve_relative(base: &str, uri: &str) -> String {
    if uri.starts_with('/') || uri.contains("://") {
        return uri.to_string();
    }
    match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], uri),
        None => uri.to_string(),
    }
}

/// Payload of a base64 `data:` URI, or `None` for any other URI
fn decode_data_uri(uri: &str) -> Result<Option<Vec<u8>>, AssetError> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Ok(None);
    };
    let Some((header, payload)) = rest.split_once(',') else {
        return Ok(None);
    };
    if !header.ends_with(";base64") {
        return Ok(None);
    }
    Ok(Some(base64::engine::general_purpose::STANDARD.decode(payload)?))
}

fn flatten_document(document: &gltf::Document, buffers: &[Vec<u8>]) -> Result<ModelData, AssetError> {
    let mut out = ModelData {
        mesh: Mesh::new(),
        base_color: Color::white(),
        side: Side::Front,
    };
    let mut look = None;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    if let Some(scene) = scene {
        for node in scene.nodes() {
            visit_node(&node, Mat4::IDENTITY, buffers, &mut out.mesh, &mut look);
        }
    }

    if out.mesh.is_empty() {
        return Err(AssetError::NoGeometry);
    }
    if let Some((color, side)) = look {
        out.base_color = color;
        out.side = side;
    }
    Ok(out)
}

fn visit_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[Vec<u8>],
    out: &mut Mesh,
    look: &mut Option<(Color, Side)>,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                log::debug!("skipping non-triangle primitive in mesh {}", mesh.index());
                continue;
            }
            if let Some(part) = read_primitive(&primitive, world, buffers) {
                if look.is_none() {
                    let material = primitive.material();
                    let [r, g, b, a] = material.pbr_metallic_roughness().base_color_factor();
                    let side = if material.double_sided() { Side::Double } else { Side::Front };
                    *look = Some((Color::new(r, g, b, a), side));
                }
                out.extend(&part);
            }
        }
    }

    for child in node.children() {
        visit_node(&child, world, buffers, out, look);
    }
}

fn read_primitive(primitive: &gltf::Primitive, world: Mat4, buffers: &[Vec<u8>]) -> Option<Mesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|n| n.collect())
        .unwrap_or_default();
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect())
        .unwrap_or_default();

    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let position = world.transform_point3(Vec3::from(p));
            let normal = normals
                .get(i)
                .map(|&n| (normal_matrix * Vec3::from(n)).normalize_or_zero())
                .unwrap_or(Vec3::Y);
            let uv = uvs.get(i).copied().unwrap_or([0.0, 0.0]);
            Vertex::new(position.to_array(), normal.to_array(), uv)
        })
        .collect::<Vec<_>>();

    let mut indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };
    indices.truncate(indices.len() - indices.len() % 3);

    let vertex_count = vertices.len() as u32;
    let before = indices.len() / 3;
    let mut indices: Vec<u32> = indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| i < vertex_count))
        .flatten()
        .copied()
        .collect();
    if indices.len() / 3 < before {
        log::warn!(
            "dropped {} triangles with out-of-range indices",
            before - indices.len() / 3
        );
    }
    if indices.is_empty() {
        return None;
    }

    // mirrored node transforms flip triangle winding
    if world.determinant() < 0.0 {
        for tri in indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    Some(Mesh { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::collections::HashMap;

    fn triangle_buffer() -> Vec<u8> {
        triangle_buffer_with([0, 1, 2])
    }

    /// One triangle: three VEC3 positions followed by three u16 indices (+2 bytes padding)
    fn triangle_buffer_with(indices: [u16; 3]) -> Vec<u8> {
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let mut bytes = Vec::new();
        for p in positions.iter().flatten() {
            bytes.extend_from_slice(&p.to_le_bytes());
        }
        for i in indices {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }

    fn triangle_gltf(buffer_uri: &str) -> String {
        triangle_gltf_with(buffer_uri, false)
    }

    fn triangle_gltf_with(buffer_uri: &str, double_sided: bool) -> String {
        format!(
            r#"{{
                "asset": {{"version": "2.0"}},
                "scene": 0,
                "scenes": [{{"nodes": [0]}}],
                "nodes": [{{"mesh": 0, "translation": [1.0, 0.0, 0.0]}}],
                "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}, "indices": 1, "material": 0}}]}}],
                "materials": [{{"doubleSided": {double_sided},
                    "pbrMetallicRoughness": {{"baseColorFactor": [0.5, 0.25, 1.0, 1.0]}}}}],
                "buffers": [{{"byteLength": 44, "uri": "{buffer_uri}"}}],
                "bufferViews": [
                    {{"buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962}},
                    {{"buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963}}
                ],
                "accessors": [
                    {{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}},
                    {{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}}
                ]
            }}"#
        )
    }

    fn embedded(buffer: Vec<u8>) -> String {
        format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(buffer)
        )
    }

    fn serve(files: HashMap<String, Vec<u8>>) -> impl Fn(String) -> futures::future::Ready<Result<Vec<u8>, AssetError>> {
        move |url| {
            futures::future::ready(files.get(&url).cloned().ok_or(AssetError::Status { url, status: 404 }))
        }
    }

    #[test]
    fn test_embedded_buffer_model() {
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(triangle_buffer())
        );
        let files = HashMap::from([("/models/t.gltf".to_string(), triangle_gltf(&uri).into_bytes())]);

        let model = block_on(load_model_with("/models/t.gltf", serve(files))).unwrap();
        assert_eq!(model.mesh.triangle_count(), 1);
        assert_eq!(model.base_color, Color::new(0.5, 0.25, 1.0, 1.0));
        // node translation is baked into the vertices
        assert_eq!(model.mesh.vertices[1].position, [2.0, 0.0, 0.0]);
        assert_eq!(model.mesh.vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(model.side, Side::Front);
    }

    #[test]
    fn test_double_sided_material() {
        let document = triangle_gltf_with(&embedded(triangle_buffer()), true);
        let files = HashMap::from([("/models/t.gltf".to_string(), document.into_bytes())]);

        let model = block_on(load_model_with("/models/t.gltf", serve(files))).unwrap();
        assert_eq!(model.side, Side::Double);
    }

    #[test]
    fn test_out_of_range_indices_are_dropped() {
        let document = triangle_gltf(&embedded(triangle_buffer_with([0, 1, 7])));
        let files = HashMap::from([("/models/t.gltf".to_string(), document.into_bytes())]);

        let result = block_on(load_model_with("/models/t.gltf", serve(files)));
        assert!(matches!(result, Err(AssetError::NoGeometry)));
    }

    #[test]
    fn test_external_buffer_resolved_next_to_document() {
        let files = HashMap::from([
            ("/models/t.gltf".to_string(), triangle_gltf("t.bin").into_bytes()),
            ("/models/t.bin".to_string(), triangle_buffer()),
        ]);
        let model = block_on(load_model_with("/models/t.gltf", serve(files))).unwrap();
        assert_eq!(model.mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_missing_model_reports_status() {
        let result = block_on(load_model_with("/models/none.gltf", serve(HashMap::new())));
        assert!(matches!(result, Err(AssetError::Status { status: 404, .. })));
    }

    #[test]
    fn test_missing_external_buffer_fails() {
        let files = HashMap::from([("/models/t.gltf".to_string(), triangle_gltf("t.bin").into_bytes())]);
        let result = block_on(load_model_with("/models/t.gltf", serve(files)));
        assert!(matches!(result, Err(AssetError::Status { ref url, .. }) if url == "/models/t.bin"));
    }

    #[test]
    fn test_garbage_document_is_rejected() {
        let files = HashMap::from([("/models/t.gltf".to_string(), b"not a model".to_vec())]);
        let result = block_on(load_model_with("/models/t.gltf", serve(files)));
        assert!(matches!(result, Err(AssetError::Gltf(_))));
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_relative("/models/table.gltf", "table.bin"), "/models/table.bin");
        assert_eq!(resolve_relative("/models/table.gltf", "/shared/a.bin"), "/shared/a.bin");
        assert_eq!(resolve_relative("table.gltf", "table.bin"), "table.bin");
    }

    #[test]
    fn test_decode_texture() {
        let image = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 255, 255, 128]));
        let mut png = std::io::Cursor::new(Vec::new());
        image.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let texture = decode_texture(png.get_ref()).unwrap();
        assert_eq!((texture.width, texture.height), (2, 3));
        assert_eq!(texture.pixels.len(), 2 * 3 * 4);
        assert_eq!(&texture.pixels[..4], &[255, 255, 255, 128]);
    }

    #[test]
    fn test_decode_texture_rejects_garbage() {
        assert!(matches!(decode_texture(b"nope"), Err(AssetError::Image(_))));
    }
}

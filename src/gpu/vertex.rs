use crate::scene::{Aabb, Vec3};
use bytemuck::{Pod, Zeroable};

/// Vertex data for GPU rendering
/// Each vertex has a 3D position, a normal and a texture coordinate
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Vertex buffer layout descriptor for wgpu
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Uniform data passed to shaders, rewritten before every object draw
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    /// 4x4 view-projection matrix (column-major)
    pub view_proj: [[f32; 4]; 4],
    /// 4x4 model transform matrix (column-major)
    pub model: [[f32; 4]; 4],
    /// Material color multiplied with the sampled texture
    pub tint: [f32; 4],
    /// Direction towards the light (xyz) and its intensity (w)
    pub light: [f32; 4],
    /// x: 1.0 when the material ignores lighting, y: ambient term
    pub params: [f32; 4],
}

impl Uniforms {
    pub fn identity_matrix() -> [[f32; 4]; 4] {
        glam::Mat4::IDENTITY.to_cols_array_2d()
    }
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            view_proj: Self::identity_matrix(),
            model: Self::identity_matrix(),
            tint: [1.0; 4],
            light: [0.0, 1.0, 0.0, 1.0],
            params: [0.0, 0.3, 0.0, 0.0],
        }
    }
}

/// A batch of vertices and indices ready for GPU upload
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
        }
    }

    /// Add a mesh to this mesh, offsetting indices appropriately
    pub fn extend(&mut self, other: &Mesh) {
        let index_offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|i| i + index_offset));
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle corners in local space; triangles with out-of-range indices are skipped
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let a = self.vertices.get(tri[0] as usize)?;
            let b = self.vertices.get(tri[1] as usize)?;
            let c = self.vertices.get(tri[2] as usize)?;
            Some([
                Vec3::from(a.position),
                Vec3::from(b.position),
                Vec3::from(c.position),
            ])
        })
    }

    /// Local-space bounding box
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::desc().array_stride, 32);
    }

    #[test]
    fn test_uniforms_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    #[test]
    fn test_extend_offsets_indices() {
        let tri = Mesh {
            vertices: vec![Vertex::new([0.0; 3], [0.0, 0.0, 1.0], [0.0; 2]); 3],
            indices: vec![0, 1, 2],
        };
        let mut mesh = tri.clone();
        mesh.extend(&tri);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_triangles_skip_bad_indices() {
        let mesh = Mesh {
            vertices: vec![Vertex::new([0.0; 3], [0.0, 0.0, 1.0], [0.0; 2]); 3],
            indices: vec![0, 1, 2, 0, 1, 9],
        };
        assert_eq!(mesh.triangles().count(), 1);
    }
}

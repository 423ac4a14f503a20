use crate::gpu::vertex::{Mesh, Vertex};

/// Build a `width` x `height` quad centred on the origin in the XY plane, facing +Z
/// Texture coordinates run (0,0) top-left to (1,1) bottom-right
pub fn plane(width: f32, height: f32) -> Mesh {
    let hw = width * 0.5;
    let hh = height * 0.5;
    let normal = [0.0, 0.0, 1.0];

    let mut mesh = Mesh::with_capacity(4, 6);
    mesh.vertices.extend([
        Vertex::new([-hw, hh, 0.0], normal, [0.0, 0.0]),
        Vertex::new([hw, hh, 0.0], normal, [1.0, 0.0]),
        Vertex::new([-hw, -hh, 0.0], normal, [0.0, 1.0]),
        Vertex::new([hw, -hh, 0.0], normal, [1.0, 1.0]),
    ]);
    // counter-clockwise when viewed from +Z
    mesh.indices.extend([0, 2, 1, 2, 3, 1]);
    mesh
}

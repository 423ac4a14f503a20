use super::types::{Mat4, Side, Vec3};
use crate::gpu::Mesh;

const EPSILON: f32 = 1e-7;

/// Half-line used for pointer picking
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Nearest world-space hit distance against a mesh placed with `model`
    pub fn intersect_mesh(&self, mesh: &Mesh, model: Mat4, side: Side) -> Option<f32> {
        let inv = model.inverse();
        let origin = inv.transform_point3(self.origin);
        // not normalised: local t then equals world distance
        let direction = inv.transform_vector3(self.direction);

        let bounds = mesh.bounds()?;
        ray_aabb_hit_t(origin, direction, bounds.min, bounds.max)?;

        // a mirrored model flips the winding seen from world space
        let side = if model.determinant() < 0.0 {
            match side {
                Side::Front => Side::Back,
                Side::Back => Side::Front,
                Side::Double => Side::Double,
            }
        } else {
            side
        };

        mesh.triangles()
            .filter_map(|tri| ray_triangle_hit_t(origin, direction, tri, side))
            .min_by(|a, b| a.total_cmp(b))
    }
}

fn ray_aabb_hit_t(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < EPSILON {
            // parallel to this slab: must already be between its planes
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }
    Some(if t_min >= 0.0 { t_min } else { t_max })
}

/// Möller–Trumbore with face culling by `side`
fn ray_triangle_hit_t(origin: Vec3, direction: Vec3, [a, b, c]: [Vec3; 3], side: Side) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = direction.cross(edge2);
    let det = edge1.dot(p);

    // det > 0: ray hits the counter-clockwise (front) face
    match side {
        Side::Front if det < EPSILON => return None,
        Side::Back if det > -EPSILON => return None,
        Side::Double if det.abs() < EPSILON => return None,
        _ => {}
    }

    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

use super::ray::Ray;
use super::types::{Color, Side, Transform3D};
use crate::gpu::Mesh;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global object ID counter
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

fn generate_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// What an object is for on the home page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectRole {
    /// Billboard prompt that always faces the camera
    Button,
    /// The schematic table model
    Table,
    Ground,
}

/// Decoded RGBA8 image ready for upload
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Surface appearance of an object
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub texture: Option<Rc<TextureData>>,
    /// Skip lighting (flat color)
    pub unlit: bool,
    /// Alpha-blended; drawn after opaque objects
    pub transparent: bool,
    pub side: Side,
}

impl Material {
    pub fn lit(color: Color) -> Self {
        Self {
            color,
            texture: None,
            unlit: false,
            transparent: false,
            side: Side::Front,
        }
    }

    pub fn unlit(color: Color) -> Self {
        Self {
            unlit: true,
            ..Self::lit(color)
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }
}

/// An object in the scene graph
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub id: u64,
    pub role: ObjectRole,
    pub mesh: Mesh,
    pub transform: Transform3D,
    pub material: Material,
    pub visible: bool,
}

impl SceneObject {
    pub fn new(role: ObjectRole, mesh: Mesh, material: Material) -> Self {
        Self {
            id: generate_object_id(),
            role,
            mesh,
            transform: Transform3D::identity(),
            material,
            visible: true,
        }
    }

    pub fn with_transform(mut self, transform: Transform3D) -> Self {
        self.transform = transform;
        self
    }

    /// World-space distance along `ray` to this object, if it is hit
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        if !self.visible {
            return None;
        }
        ray.intersect_mesh(&self.mesh, self.transform.to_matrix(), self.material.side)
    }
}

/// A ray hit on a scene object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub object_id: u64,
    pub distance: f32,
}

/// Scene graph for managing objects
/// Tracks which objects changed GPU-relevant data (mesh or texture) since the last frame
pub struct SceneGraph {
    objects: Vec<SceneObject>,
    dirty_objects: HashSet<u64>,
    removed_objects: HashSet<u64>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            dirty_objects: HashSet::new(),
            removed_objects: HashSet::new(),
        }
    }

    /// Add an object to the scene and return its ID
    pub fn add(&mut self, object: SceneObject) -> u64 {
        let id = object.id;
        self.dirty_objects.insert(id);
        self.objects.push(object);
        id
    }

    pub fn remove(&mut self, id: u64) -> Option<SceneObject> {
        let pos = self.objects.iter().position(|o| o.id == id)?;
        self.dirty_objects.remove(&id);
        self.removed_objects.insert(id);
        Some(self.objects.remove(pos))
    }

    pub fn get(&self, id: u64) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Mutable access for transform/visibility changes, which need no GPU re-upload
    pub fn get_mut(&mut self, id: u64) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Replace an object's texture; returns false if the object does not exist
    pub fn set_texture(&mut self, id: u64, texture: Rc<TextureData>) -> bool {
        match self.objects.iter_mut().find(|o| o.id == id) {
            Some(object) => {
                object.material.texture = Some(texture);
                self.dirty_objects.insert(id);
                true
            }
            None => false,
        }
    }

    /// Opaque objects first, then transparent ones, each in insertion order
    pub fn draw_order(&self) -> impl Iterator<Item = &SceneObject> {
        let opaque = self.objects.iter().filter(|o| !o.material.transparent);
        let transparent = self.objects.iter().filter(|o| o.material.transparent);
        opaque.chain(transparent).filter(|o| o.visible)
    }

    // === Dirty Tracking ===

    pub fn dirty_object_ids(&self) -> &HashSet<u64> {
        &self.dirty_objects
    }

    pub fn removed_object_ids(&self) -> &HashSet<u64> {
        &self.removed_objects
    }

    /// Clear dirty flags after rendering
    pub fn clear_dirty(&mut self) {
        self.dirty_objects.clear();
        self.removed_objects.clear();
    }

    // === Hit Testing ===

    /// Cast `ray` against the given objects, nearest hit first
    pub fn raycast(&self, ray: &Ray, candidates: &[u64]) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = candidates
            .iter()
            .filter_map(|&id| {
                let object = self.get(id)?;
                let distance = object.raycast(ray)?;
                Some(Intersection {
                    object_id: id,
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::primitives::plane;
    use crate::scene::Vec3;

    fn quad_at(z: f32, role: ObjectRole) -> SceneObject {
        SceneObject::new(role, plane(1.0, 1.0), Material::lit(Color::white()))
            .with_transform(Transform3D::from_position(Vec3::new(0.0, 0.0, z)))
    }

    #[test]
    fn test_add_and_remove() {
        let mut scene = SceneGraph::new();
        let id = scene.add(quad_at(0.0, ObjectRole::Ground));
        assert_eq!(scene.objects.len(), 1);
        assert!(scene.dirty_objects.contains(&id));

        scene.clear_dirty();
        assert!(!scene.dirty_objects.contains(&id));

        assert!(scene.remove(id).is_some());
        assert!(scene.objects.is_empty());
        assert!(scene.removed_object_ids().contains(&id));
    }

    #[test]
    fn test_set_texture_marks_dirty() {
        let mut scene = SceneGraph::new();
        let id = scene.add(quad_at(0.0, ObjectRole::Button));
        scene.clear_dirty();

        let texture = Rc::new(TextureData {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        });
        assert!(scene.set_texture(id, texture));
        assert!(scene.dirty_objects.contains(&id));
        assert!(!scene.set_texture(u64::MAX, Rc::new(TextureData {
            width: 1,
            height: 1,
            pixels: vec![0; 4],
        })));
    }

    #[test]
    fn test_raycast_sorts_by_distance_and_filters_candidates() {
        let mut scene = SceneGraph::new();
        let far = scene.add(quad_at(-2.0, ObjectRole::Table));
        let near = scene.add(quad_at(0.0, ObjectRole::Button));
        let ignored = scene.add(quad_at(1.0, ObjectRole::Ground));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hits = scene.raycast(&ray, &[far, near]);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object_id, near);
        assert_eq!(hits[1].object_id, far);
        assert!(hits.iter().all(|hit| hit.object_id != ignored));
    }

    #[test]
    fn test_hidden_objects_are_not_hit_or_drawn() {
        let mut scene = SceneGraph::new();
        let id = scene.add(quad_at(0.0, ObjectRole::Button));
        scene.get_mut(id).unwrap().visible = false;

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(scene.raycast(&ray, &[id]).is_empty());
        assert_eq!(scene.draw_order().count(), 0);
    }

    #[test]
    fn test_transparent_objects_draw_last() {
        let mut scene = SceneGraph::new();
        let glass = SceneObject::new(
            ObjectRole::Button,
            plane(1.0, 1.0),
            Material::lit(Color::white()).transparent(),
        );
        let glass_id = scene.add(glass);
        let ground_id = scene.add(quad_at(0.0, ObjectRole::Ground));

        let order: Vec<u64> = scene.draw_order().map(|o| o.id).collect();
        assert_eq!(order, vec![ground_id, glass_id]);
    }
}

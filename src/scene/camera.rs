use super::ray::Ray;
use super::types::{euler_to_quat, quat_to_euler, Mat3, Mat4, Quat, Vec2, Vec3};

/// Perspective camera with an Euler rotation (XYZ order, radians)
///
/// The projection is derived from `fov`/`aspect`/`near`/`far` on demand, so
/// changing any of them takes effect on the next frame without an explicit
/// projection update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub rotation: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            fov,
            aspect,
            near,
            far,
        }
    }

    pub fn orientation(&self) -> Quat {
        euler_to_quat(self.rotation)
    }

    /// Direction the camera looks along (local -Z)
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// Orient the camera so it looks along `direction`, keeping +Y up
    pub fn look_along(&mut self, direction: Vec3) {
        if direction.length_squared() <= f32::EPSILON {
            return;
        }
        let view = Mat4::look_to_rh(Vec3::ZERO, direction.normalize(), Vec3::Y);
        // the view rotation is the inverse (transpose) of the camera's world rotation
        let world = Mat3::from_mat4(view).transpose();
        self.rotation = quat_to_euler(Quat::from_mat3(&world));
    }

    /// Update the aspect ratio from a viewport size; zero-sized viewports are ignored
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// World to camera transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    /// Right-handed projection with a 0..1 depth range (wgpu convention)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the camera through a point in normalized device coordinates
    pub fn screen_ray(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let through = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.position, through - self.position)
    }
}

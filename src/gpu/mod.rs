pub mod primitives;
mod renderer;
mod vertex;

pub use renderer::*;
pub use vertex::*;

use crate::error::RenderError;
use crate::scene::{Color, PerspectiveCamera, SceneConfig, SceneGraph, Vec3};

/// Whatever the scene controller draws into once per frame
pub trait FrameTarget {
    /// Match the drawing surface to a new viewport size
    fn resize(&mut self, width: u32, height: u32);

    /// Draw every visible object of `scene` as seen from `camera`
    fn draw(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}

/// Background and lighting shared by every draw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub background: Color,
    /// Direction towards the light
    pub direction: Vec3,
    pub intensity: f32,
    pub ambient: f32,
}

impl From<&SceneConfig> for Lighting {
    fn from(config: &SceneConfig) -> Self {
        Self {
            background: config.background,
            direction: config.light_direction.normalize_or_zero(),
            intensity: config.light_intensity,
            ambient: config.ambient,
        }
    }
}

use super::pan::CameraPose;
use super::tween::Easing;
use super::types::{Color, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

/// Camera lens and starting placement
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Initial viewing direction
    pub look_direction: Vec3,
}

/// Everything the home scene needs to know up front
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub background: Color,
    pub camera: CameraSettings,
    /// Where the camera ends up after panning to the table
    pub table_view: CameraPose,
    pub pan_duration_ms: f64,
    pub pan_easing: Easing,

    pub model_url: String,
    pub table_offset: Vec3,
    pub table_scale: f32,

    pub button_texture_url: String,
    pub button_position: Vec3,
    pub button_size: f32,

    pub ground_size: f32,
    pub ground_height: f32,
    /// Euler rotation laying the ground quad flat
    pub ground_rotation: Vec3,
    pub ground_color: Color,

    /// Direction towards the key light
    pub light_direction: Vec3,
    pub light_intensity: f32,
    pub ambient: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: Color::from_rgb_u32(0x1d3161),
            camera: CameraSettings {
                fov: 35.0,
                near: 0.1,
                far: 1000.0,
                position: Vec3::new(2.0, 2.0, 5.0),
                look_direction: Vec3::new(-0.6, -0.6, -1.6),
            },
            table_view: CameraPose {
                position: Vec3::new(0.0, 2.0, -0.25),
                rotation: Vec3::new(-FRAC_PI_2, 0.0, 0.0),
                fov: 25.0,
            },
            pan_duration_ms: 2000.0,
            pan_easing: Easing::Linear,

            model_url: "/models/schematic_table.gltf".to_string(),
            table_offset: Vec3::new(-0.5, -0.5, -0.75),
            table_scale: 1.0,

            button_texture_url: "/home/button-outline.png".to_string(),
            button_position: Vec3::new(0.15, 1.0, 0.25),
            button_size: 0.1,

            ground_size: 2.0,
            ground_height: -0.5,
            ground_rotation: Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_4),
            ground_color: Color::from_rgb_u32(0x16264a),

            // light at (0, 8, 3) aimed at (0, 2, 0)
            light_direction: Vec3::new(0.0, 6.0, 3.0),
            light_intensity: 2.5,
            ambient: 0.25,
        }
    }
}

pub mod scene_canvas;

pub use scene_canvas::{SceneCanvas, SceneCanvasProps};

pub mod assets;
mod camera;
mod config;
mod controller;
mod graph;
mod pan;
mod ray;
mod render_loop;
mod tween;
mod types;

pub use assets::ModelData;
pub use camera::*;
pub use config::*;
pub use controller::*;
pub use graph::*;
pub use pan::*;
pub use ray::*;
pub use render_loop::*;
pub use tween::*;
pub use types::*;

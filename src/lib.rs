mod app;
pub mod components;
pub mod error;
pub mod schematic_file;
pub mod types;

// GPU rendering and the home scene
pub mod gpu;
pub mod scene;

use app::App;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn run_app() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}

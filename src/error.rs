//! Error types for rendering, asset loading, schematic files and the home scene

use thiserror::Error;

/// Errors raised by the GPU renderer
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    Surface(String),

    #[error("Failed to find a suitable GPU adapter")]
    NoAdapter,

    #[error("Failed to create device: {0}")]
    Device(String),

    #[error("Failed to get surface texture: {0}")]
    Frame(String),
}

/// Errors raised while fetching or decoding scene assets
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Request for {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Request for {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid glTF document: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("glTF buffer {0} has no data")]
    MissingBuffer(usize),

    #[error("Invalid data URI: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Model contains no triangle geometry")]
    NoGeometry,
}

/// Errors raised while reading an uploaded schematic file
#[derive(Error, Debug)]
pub enum SchematicFileError {
    #[error("Failed to decompress schematic: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("Invalid schematic NBT: {0}")]
    Nbt(#[from] fastnbt::error::Error),
}

/// Errors surfaced by the scene controller
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Camera pan was dropped before it finished")]
    PanAborted,
}

pub type SceneResult<T> = Result<T, SceneError>;

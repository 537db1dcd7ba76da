//! Error types shared across the crate.

use thiserror::Error;

/// Rejected generation or construction parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("invalid parameter `{name}`: {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl ParamError {
    pub(crate) fn invalid(name: &'static str, value: impl Into<f64>, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
            reason,
        }
    }
}

/// Errors raised while building CPU-side texture data.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Pixel buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    Size {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised by the GPU backend.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("Failed to find suitable GPU adapter")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("Unknown {kind} handle {index}")]
    UnknownHandle { kind: &'static str, index: usize },
    #[error("Texture update is {new_width}x{new_height}, texture is {width}x{height}")]
    TextureSize {
        width: u32,
        height: u32,
        new_width: u32,
        new_height: u32,
    },
    #[error("Failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Errors raised while assembling a scene; `E` is the upload backend's error.
#[derive(Error, Debug)]
pub enum SceneError<E> {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error("Upload failed: {0}")]
    Upload(#[source] E),
}

//! Parameter definitions with units and documented semantics.
//!
//! Defaults reproduce the values the demos start with; the CLI overrides a subset.

mod camera;
mod noise;
mod particles;
mod render;
mod terrain;

// Re-export all types
pub use camera::CameraConfig;
pub use noise::{NoiseParams, NoiseTextureConfig};
pub use particles::ParticleParams;
pub use render::RenderConfig;
pub use terrain::TerrainParams;

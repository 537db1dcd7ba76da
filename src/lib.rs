//! shadelab - real-time graphics teaching demos around a layered Perlin noise generator

pub mod camera;
pub mod cli;
pub mod error;
pub mod mesh;
pub mod noise;
pub mod params;
pub mod particles;
pub mod rendering;
pub mod scene;
pub mod state;
pub mod texture;
pub mod transform;
pub mod upload;

//! Terrain heightfield parameters.

use super::noise::NoiseParams;

/// Procedural terrain mesh parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainParams {
    /// Vertices along X
    pub xsize: usize,

    /// Vertices along Z
    pub zsize: usize,

    /// World extent along X (model units, centred on origin)
    pub width: f32,

    /// World extent along Z (model units, centred on origin)
    pub depth: f32,

    /// Vertical scale applied to the centred noise value (model units)
    pub height_scale: f32,

    /// Height below which vertices are coloured as water (model units)
    pub sea_level: f32,

    /// Noise used for displacement
    pub noise: NoiseParams,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            xsize: 200,
            zsize: 200,
            width: 2.0,
            depth: 2.0,
            height_scale: 0.5,
            sea_level: 0.0,
            noise: NoiseParams {
                frequency: 1.0,
                scale_divisor: 2.0,
                octaves: 4,
                periodic: false,
            },
        }
    }
}

//! Noise field generation parameters.

use crate::error::ParamError;

/// Generation parameters for one noise field.
///
/// Lacunarity is fixed at 2: every octave doubles `frequency`. Amplitude falls as
/// `1 / scale_divisor^(o+1)` for octave `o`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    /// Base frequency in lattice cells across the field (must be > 0)
    pub frequency: f32,

    /// Amplitude divisor, also the per-octave divisor growth (must be > 0)
    pub scale_divisor: f32,

    /// Number of octaves summed (0 gives a constant mid-grey field)
    pub octaves: u32,

    /// Tile the noise with a period of `frequency` cells per octave
    pub periodic: bool,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            frequency: 4.0,
            scale_divisor: 2.0,
            octaves: 2,
            periodic: false,
        }
    }
}

impl NoiseParams {
    /// Upper octave bound used by the interactive controls
    pub const MAX_OCTAVES: u32 = 15;

    /// Reject non-positive or non-finite frequency and scale divisor.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(ParamError::invalid(
                "frequency",
                self.frequency,
                "must be finite and > 0",
            ));
        }
        if !self.scale_divisor.is_finite() || self.scale_divisor <= 0.0 {
            return Err(ParamError::invalid(
                "scale_divisor",
                self.scale_divisor,
                "must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Noise texture dimensions paired with its generation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseTextureConfig {
    /// Texture width (pixels)
    pub width: u32,

    /// Texture height (pixels)
    pub height: u32,

    pub params: NoiseParams,
}

impl Default for NoiseTextureConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            params: NoiseParams::default(),
        }
    }
}

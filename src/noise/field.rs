//! Fractal (fBm) noise field generation.

use std::path::Path;

use image::GrayImage;

use super::GradientNoise;
use crate::error::{ParamError, TextureError};
use crate::params::NoiseParams;

/// Row-major grid of normalized noise values in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

/// Normalized coordinate step for an axis of `n` samples (endpoints land on 0 and 1)
fn axis_step(n: usize) -> f64 {
    if n > 1 {
        1.0 / (n - 1) as f64
    } else {
        0.0
    }
}

/// Sum `params.octaves` octaves of noise at normalized coordinates `(x, y)`.
fn octave_sum<N: GradientNoise + ?Sized>(noise: &N, x: f64, y: f64, params: &NoiseParams) -> f64 {
    let base_scale = params.scale_divisor as f64;
    let mut freq = params.frequency as f64;
    let mut scale = base_scale;
    let mut sum = 0.0;

    for _ in 0..params.octaves {
        let (px, py) = (x * freq, y * freq);
        let value = if params.periodic {
            noise.sample_periodic(px, py, freq, freq)
        } else {
            noise.sample(px, py)
        };
        sum += value / scale;

        freq *= 2.0;
        scale *= base_scale;
    }
    sum
}

/// Fold an octave sum from about [-1, 1] into [0, 1].
///
/// `max`/`min` instead of `clamp`: a NaN from saturated sums maps into range too.
fn fold(sum: f64) -> f32 {
    ((sum + 1.0) / 2.0).max(0.0).min(1.0) as f32
}

impl NoiseField {
    /// Generate a `width` × `height` field.
    ///
    /// Cell `(row, col)` samples the noise at `(col/(width-1), row/(height-1)) * freq` for
    /// each octave. Parameters are validated before any sampling happens.
    pub fn generate<N: GradientNoise + ?Sized>(
        width: usize,
        height: usize,
        params: &NoiseParams,
        noise: &N,
    ) -> Result<Self, ParamError> {
        if width == 0 {
            return Err(ParamError::invalid("width", 0.0, "must be >= 1"));
        }
        if height == 0 {
            return Err(ParamError::invalid("height", 0.0, "must be >= 1"));
        }
        params.validate()?;

        let (xstep, ystep) = (axis_step(width), axis_step(height));
        let mut values = Vec::with_capacity(width * height);
        for row in 0..height {
            let y = ystep * row as f64;
            for col in 0..width {
                let x = xstep * col as f64;
                values.push(fold(octave_sum(noise, x, y, params)));
            }
        }

        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// All values, row-major
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value at `(row, col)`, or `None` outside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.height && col < self.width {
            Some(self.values[row * self.width + col])
        } else {
            None
        }
    }

    /// Smallest and largest value in the field
    pub fn min_max(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// One byte per cell, `value * 255` truncated (not rounded).
    ///
    /// Only an exact 1.0 reaches 255. Values are already clamped to [0, 1] by `fold`,
    /// which also maps NaN to 0, so the cast never sees an out-of-range input.
    pub fn quantize(&self) -> Vec<u8> {
        self.values.iter().map(|&v| (v * 255.0) as u8).collect()
    }

    /// Grey RGB with opaque alpha, ready for texture upload.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.quantize()
            .into_iter()
            .flat_map(|grey| [grey, grey, grey, u8::MAX])
            .collect()
    }

    /// Save as an 8-bit greyscale PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), TextureError> {
        let (width, height) = (self.width as u32, self.height as u32);
        let pixels = self.quantize();
        let actual = pixels.len();
        let img = GrayImage::from_raw(width, height, pixels).ok_or(TextureError::Size {
            width,
            height,
            expected: self.width * self.height,
            actual,
        })?;
        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{ClassicPerlin, SeededPerlin};
    use approx::assert_relative_eq;

    fn params(frequency: f32, scale_divisor: f32, octaves: u32, periodic: bool) -> NoiseParams {
        NoiseParams {
            frequency,
            scale_divisor,
            octaves,
            periodic,
        }
    }

    #[test]
    fn values_stay_in_unit_range() {
        let cases = [
            params(4.0, 2.0, 2, false),
            params(1.0, 2.0, 8, true),
            params(7.5, 0.5, 6, false),
            params(0.25, 1.0, 15, true),
        ];
        for p in &cases {
            let field = NoiseField::generate(64, 48, p, &ClassicPerlin).unwrap();
            assert_eq!(field.values().len(), 64 * 48);
            let (lo, hi) = field.min_max();
            assert!(lo >= 0.0 && hi <= 1.0, "{p:?} gave range [{lo}, {hi}]");
        }
    }

    #[test]
    fn zero_octaves_is_mid_grey() {
        let field = NoiseField::generate(10, 10, &params(4.0, 2.0, 0, false), &ClassicPerlin)
            .unwrap();
        assert!(field.values().iter().all(|&v| v == 0.5));
        assert!(field.quantize().iter().all(|&b| b == 127));
    }

    #[test]
    fn single_octave_is_one_folded_sample() {
        let noise = ClassicPerlin;
        let p = params(3.0, 2.0, 1, false);
        let field = NoiseField::generate(20, 10, &p, &noise).unwrap();

        let (row, col) = (7, 13);
        let (x, y) = (col as f64 / 19.0, row as f64 / 9.0);
        let expected = ((noise.sample(x * 3.0, y * 3.0) / 2.0 + 1.0) / 2.0) as f32;
        assert_relative_eq!(field.get(row, col).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn adding_an_octave_changes_output_within_range() {
        let two = NoiseField::generate(32, 32, &params(4.0, 2.0, 2, false), &ClassicPerlin)
            .unwrap();
        let three = NoiseField::generate(32, 32, &params(4.0, 2.0, 3, false), &ClassicPerlin)
            .unwrap();
        assert_ne!(two, three);
        let (lo, hi) = three.min_max();
        assert!(lo >= 0.0 && hi <= 1.0);
    }

    #[test]
    fn generation_is_deterministic() {
        let p = params(4.0, 2.0, 5, true);
        let a = NoiseField::generate(50, 40, &p, &ClassicPerlin).unwrap();
        let b = NoiseField::generate(50, 40, &p, &ClassicPerlin).unwrap();
        assert_eq!(a.values(), b.values());

        let seeded = SeededPerlin::new(9);
        let c = NoiseField::generate(50, 40, &p, &seeded).unwrap();
        let d = NoiseField::generate(50, 40, &p, &seeded).unwrap();
        assert_eq!(c.values(), d.values());
    }

    #[test]
    fn periodic_field_matches_across_edges() {
        let p = params(4.0, 2.0, 3, true);
        let field = NoiseField::generate(33, 17, &p, &ClassicPerlin).unwrap();
        for row in 0..17 {
            let first = field.get(row, 0).unwrap();
            let last = field.get(row, 32).unwrap();
            assert_relative_eq!(first, last, epsilon = 1e-5);
        }
        for col in 0..33 {
            assert_relative_eq!(
                field.get(0, col).unwrap(),
                field.get(16, col).unwrap(),
                epsilon = 1e-5
            );
        }
    }

    /// FNV-1a over the quantized bytes
    fn digest(bytes: &[u8]) -> u64 {
        bytes.iter().fold(0xcbf2_9ce4_8422_2325u64, |hash, &b| {
            (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
        })
    }

    #[test]
    fn texture_scenario_matches_reference_output() {
        let bytes = NoiseField::generate(100, 100, &NoiseParams::default(), &ClassicPerlin)
            .unwrap()
            .quantize();

        let (lo, hi) = (bytes.iter().min().unwrap(), bytes.iter().max().unwrap());
        assert_eq!((*lo, *hi), (57, 189));
        assert_eq!(bytes.iter().map(|&b| b as u64).sum::<u64>(), 1_227_759);
        assert_eq!(bytes[37], 128);
        assert_eq!(bytes[50 * 100 + 50], 129);
        assert_eq!(bytes[12 * 100 + 81], 171);
        assert_eq!(bytes[99 * 100 + 99], 127);
        assert_eq!(digest(&bytes), 0x03e7_7cc7_bdb9_ab5a);
    }

    #[test]
    fn texture_scenario_stays_off_the_rails() {
        let field = NoiseField::generate(100, 100, &NoiseParams::default(), &ClassicPerlin)
            .unwrap();
        let bytes = field.quantize();
        assert_eq!(bytes.len(), 100 * 100);
        assert!(bytes.iter().all(|&b| b != 0 && b != 255));
        // Corner sits on a lattice point where the noise is zero.
        assert_eq!(bytes[0], 127);

        let again = NoiseField::generate(100, 100, &NoiseParams::default(), &ClassicPerlin)
            .unwrap()
            .quantize();
        assert_eq!(bytes, again);
    }

    #[test]
    fn rgba_layout_is_grey_and_opaque() {
        let field = NoiseField::generate(4, 3, &NoiseParams::default(), &ClassicPerlin).unwrap();
        let rgba = field.to_rgba8();
        assert_eq!(rgba.len(), 4 * 3 * 4);
        for (px, grey) in rgba.chunks_exact(4).zip(field.quantize()) {
            assert_eq!(px, &[grey, grey, grey, 255]);
        }
    }

    #[test]
    fn single_column_samples_x_zero() {
        let p = params(2.0, 2.0, 3, false);
        let field = NoiseField::generate(1, 5, &p, &ClassicPerlin).unwrap();
        assert_eq!(field.width(), 1);
        assert_eq!(field.get(0, 0), Some(0.5));
        assert_eq!(field.get(0, 1), None);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let bad_freq = NoiseField::generate(8, 8, &params(0.0, 2.0, 2, false), &ClassicPerlin);
        assert!(matches!(
            bad_freq,
            Err(ParamError::InvalidParameter { name: "frequency", .. })
        ));

        let bad_scale = NoiseField::generate(8, 8, &params(4.0, -1.0, 2, false), &ClassicPerlin);
        assert!(matches!(
            bad_scale,
            Err(ParamError::InvalidParameter { name: "scale_divisor", .. })
        ));

        let empty = NoiseField::generate(0, 8, &NoiseParams::default(), &ClassicPerlin);
        assert!(matches!(
            empty,
            Err(ParamError::InvalidParameter { name: "width", .. })
        ));
    }
}

//! Seeded Perlin noise backed by the `noise` crate.

use std::f64::consts::TAU;

use noise::{NoiseFn, Perlin};

use super::GradientNoise;

/// Seeded Perlin noise.
///
/// The periodic variant walks each axis around a circle whose circumference equals the
/// period and samples 4-D noise on the resulting torus, so it tiles exactly for any
/// positive period, including fractional ones.
#[derive(Clone)]
pub struct SeededPerlin {
    perlin: Perlin,
    seed: u32,
}

impl SeededPerlin {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }
}

impl std::fmt::Debug for SeededPerlin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededPerlin").field("seed", &self.seed).finish()
    }
}

impl GradientNoise for SeededPerlin {
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.perlin.get([x, y])
    }

    fn sample_periodic(&self, x: f64, y: f64, period_x: f64, period_y: f64) -> f64 {
        let (ax, ay) = (x / period_x * TAU, y / period_y * TAU);
        let (rx, ry) = (period_x / TAU, period_y / TAU);
        self.perlin.get([
            rx * ax.cos(),
            rx * ax.sin(),
            ry * ay.cos(),
            ry * ay.sin(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn same_seed_same_values() {
        let a = SeededPerlin::new(42);
        let b = SeededPerlin::new(42);
        for i in 0..50 {
            let (x, y) = (i as f64 * 0.13, i as f64 * 0.29);
            assert_eq!(a.sample(x, y), b.sample(x, y));
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = SeededPerlin::new(1);
        let b = SeededPerlin::new(2);
        let differs = (0..50).any(|i| {
            let (x, y) = (i as f64 * 0.13 + 0.05, i as f64 * 0.29 + 0.05);
            a.sample(x, y) != b.sample(x, y)
        });
        assert!(differs);
    }

    #[test]
    fn debug_names_the_seed() {
        assert_eq!(format!("{:?}", SeededPerlin::new(7)), "SeededPerlin { seed: 7 }");
    }

    #[test]
    fn periodic_variant_tiles_fractional_period() {
        let noise = SeededPerlin::new(7);
        let (px, py) = (2.5, 3.0);
        for &(x, y) in &[(0.2, 0.4), (1.7, 2.9)] {
            let a = noise.sample_periodic(x, y, px, py);
            let b = noise.sample_periodic(x + px, y + py, px, py);
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }
}

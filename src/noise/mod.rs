//! Procedural noise: gradient noise sources and the fractal noise field generator.
//!
//! The field generator is pure: it reads its parameters and a noise source and returns
//! a freshly computed grid. Sources hold no mutable state, so one source can serve any
//! number of concurrent generations.

mod field;
mod perlin;
mod seeded;

pub use field::NoiseField;
pub use perlin::ClassicPerlin;
pub use seeded::SeededPerlin;

/// Continuous 2-D gradient noise returning values in roughly [-1, 1].
pub trait GradientNoise: Send + Sync {
    /// Sample the noise at `(x, y)`.
    fn sample(&self, x: f64, y: f64) -> f64;

    /// Sample a variant that repeats every `period_x` along X and `period_y` along Y.
    fn sample_periodic(&self, x: f64, y: f64, period_x: f64, period_y: f64) -> f64;
}

/// Selectable noise source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseKind {
    /// Seedless classic Perlin noise (the GLSL `perlin`/`pnoise` formulation)
    #[default]
    Classic,

    /// Seeded Perlin noise from the `noise` crate
    Seeded,
}

impl NoiseKind {
    /// Build the noise source; `seed` is ignored by the classic source.
    pub fn build(self, seed: u32) -> Box<dyn GradientNoise> {
        match self {
            NoiseKind::Classic => Box::new(ClassicPerlin),
            NoiseKind::Seeded => Box::new(SeededPerlin::new(seed)),
        }
    }
}

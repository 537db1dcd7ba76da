//! Particle system parameters.

/// Point-sprite particle emitter parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleParams {
    /// Number of particles
    pub count: usize,

    /// Distance from the emitter at which a particle respawns (model units)
    pub max_dist: f32,

    /// Velocity scale per frame (model units per frame at unit direction)
    pub speed: f32,

    /// Rendered sprite size (pixels at unit depth)
    pub point_size: f32,

    /// RNG seed for velocities and colours
    pub seed: u64,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: 10_000,
            max_dist: 0.6,
            speed: 0.005,
            point_size: 4.0,
            seed: 42,
        }
    }
}

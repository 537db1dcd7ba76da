//! Point-sprite particle emitter: particles fly out from the origin and respawn there.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ParamError;
use crate::params::ParticleParams;

/// Per-instance particle data uploaded for billboard drawing
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub colour: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
struct Particle {
    position: Vec3,
    /// Direction with components in [-1, 1]; scaled by `speed` each frame
    direction: Vec3,
    colour: [f32; 4],
}

/// Particle system with a seeded RNG, so a given seed always replays the same spray
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    max_dist: f32,
    speed: f32,
}

fn check_motion(max_dist: f32, speed: f32) -> Result<(), ParamError> {
    if !max_dist.is_finite() || max_dist <= 0.0 {
        return Err(ParamError::invalid(
            "max_dist",
            max_dist,
            "must be finite and > 0",
        ));
    }
    if !speed.is_finite() || speed < 0.0 {
        return Err(ParamError::invalid("speed", speed, "must be finite and >= 0"));
    }
    Ok(())
}

impl ParticleSystem {
    /// Spawn `params.count` particles at the origin with random directions and colours.
    pub fn new(params: &ParticleParams) -> Result<Self, ParamError> {
        check_motion(params.max_dist, params.speed)?;

        let mut rng = StdRng::seed_from_u64(params.seed);
        let particles = (0..params.count)
            .map(|_| Particle {
                position: Vec3::ZERO,
                direction: Vec3::new(
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                ),
                colour: [rng.gen(), rng.gen(), rng.gen(), 1.0],
            })
            .collect();

        log::info!(
            "Spawned {} particles (max_dist {}, speed {})",
            params.count,
            params.max_dist,
            params.speed
        );

        Ok(Self {
            particles,
            max_dist: params.max_dist,
            speed: params.speed,
        })
    }

    /// Change how far particles travel and how fast; applies from the next `animate`.
    pub fn set_motion(&mut self, max_dist: f32, speed: f32) -> Result<(), ParamError> {
        check_motion(max_dist, speed)?;
        self.max_dist = max_dist;
        self.speed = speed;
        Ok(())
    }

    /// Advance one frame: move every particle, respawning those beyond `max_dist`.
    pub fn animate(&mut self) {
        for p in &mut self.particles {
            p.position += p.direction * self.speed;
            if p.position.length() > self.max_dist {
                p.position = Vec3::ZERO;
            }
        }
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn max_dist(&self) -> f32 {
        self.max_dist
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    pub fn colours(&self) -> impl Iterator<Item = [f32; 4]> + '_ {
        self.particles.iter().map(|p| p.colour)
    }

    /// Instance buffer contents with every sprite at `size`, offset by `emitter`
    pub fn instances(&self, emitter: Vec3, size: f32) -> Vec<ParticleInstance> {
        self.particles
            .iter()
            .map(|p| ParticleInstance {
                position: (p.position + emitter).to_array(),
                size,
                colour: p.colour,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(count: usize) -> ParticleParams {
        ParticleParams {
            count,
            ..Default::default()
        }
    }

    #[test]
    fn particles_start_at_origin() {
        let system = ParticleSystem::new(&params(100)).unwrap();
        assert_eq!(system.count(), 100);
        assert!(system.positions().all(|p| p == Vec3::ZERO));
        assert!(system
            .colours()
            .all(|c| c.iter().all(|&ch| (0.0..=1.0).contains(&ch))));
    }

    #[test]
    fn particles_never_exceed_max_dist() {
        let mut system = ParticleSystem::new(&ParticleParams {
            count: 500,
            max_dist: 0.3,
            speed: 0.05,
            ..Default::default()
        })
        .unwrap();
        for _ in 0..200 {
            system.animate();
            assert!(system.positions().all(|p| p.length() <= 0.3));
        }
    }

    #[test]
    fn fast_particles_respawn_at_origin() {
        let mut system = ParticleSystem::new(&ParticleParams {
            count: 100,
            max_dist: 0.5,
            speed: 0.4,
            ..Default::default()
        })
        .unwrap();
        system.animate();
        // Any direction longer than 1.25 overshoots on the first step
        assert!(system.positions().any(|p| p == Vec3::ZERO));
        assert!(system.positions().any(|p| p != Vec3::ZERO));
    }

    #[test]
    fn same_seed_replays_same_spray() {
        let mut a = ParticleSystem::new(&params(64)).unwrap();
        let mut b = ParticleSystem::new(&params(64)).unwrap();
        for _ in 0..10 {
            a.animate();
            b.animate();
        }
        assert!(a.positions().eq(b.positions()));

        let c = ParticleSystem::new(&ParticleParams {
            seed: 7,
            ..params(64)
        })
        .unwrap();
        assert!(!a.colours().eq(c.colours()));
    }

    #[test]
    fn zero_speed_freezes_particles() {
        let mut system = ParticleSystem::new(&params(10)).unwrap();
        system.set_motion(0.6, 0.0).unwrap();
        system.animate();
        assert!(system.positions().all(|p| p == Vec3::ZERO));
    }

    #[test]
    fn rejects_invalid_motion() {
        let bad = ParticleParams {
            max_dist: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            ParticleSystem::new(&bad),
            Err(ParamError::InvalidParameter { name: "max_dist", .. })
        ));

        let mut system = ParticleSystem::new(&params(1)).unwrap();
        assert!(system.set_motion(0.6, f32::NAN).is_err());
        assert_eq!(system.speed(), ParticleParams::default().speed);
    }

    #[test]
    fn instances_apply_emitter_offset() {
        let system = ParticleSystem::new(&params(3)).unwrap();
        let instances = system.instances(Vec3::new(1.0, 2.0, 3.0), 4.0);
        assert_eq!(instances.len(), 3);
        for inst in instances {
            assert_eq!(inst.position, [1.0, 2.0, 3.0]);
            assert_eq!(inst.size, 4.0);
        }
    }
}

//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::noise::NoiseKind;
use crate::params::{NoiseParams, NoiseTextureConfig, ParticleParams, TerrainParams};
use crate::scene::{Demo, SceneParams};

/// Noise source selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoiseArg {
    /// Seedless classic Perlin
    Classic,
    /// Seeded Perlin from the `noise` crate
    Seeded,
}

impl From<NoiseArg> for NoiseKind {
    fn from(arg: NoiseArg) -> Self {
        match arg {
            NoiseArg::Classic => NoiseKind::Classic,
            NoiseArg::Seeded => NoiseKind::Seeded,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "shadelab")]
#[command(about = "Real-time graphics demos built around layered Perlin noise", long_about = None)]
pub struct Args {
    /// Demo: noise (default), terrain, particles, shapes
    #[arg(long, value_name = "DEMO", default_value = "noise")]
    pub demo: String,

    /// Noise texture width (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 100)]
    pub width: u32,

    /// Noise texture height (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 100)]
    pub height: u32,

    /// Base noise frequency (defaults to the demo's own)
    #[arg(long)]
    pub frequency: Option<f32>,

    /// Amplitude divisor per octave (defaults to the demo's own)
    #[arg(long)]
    pub scale: Option<f32>,

    /// Number of octaves (defaults to the demo's own)
    #[arg(long)]
    pub octaves: Option<u32>,

    /// Tile the noise seamlessly
    #[arg(long)]
    pub periodic: bool,

    /// Noise source
    #[arg(long, value_enum, default_value_t = NoiseArg::Classic)]
    pub noise: NoiseArg,

    /// Seed for the seeded noise source
    #[arg(long, default_value_t = 0)]
    pub seed: u32,

    /// Number of particles in the particles demo
    #[arg(long, value_name = "COUNT")]
    pub particles: Option<usize>,

    /// Sprite image for the particles demo (a round sprite is generated otherwise)
    #[arg(long, value_name = "PATH")]
    pub sprite: Option<PathBuf>,

    /// Write the noise texture to a greyscale PNG and exit without opening a window
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

impl Args {
    /// Parse the demo name, falling back to the noise demo
    pub fn parse_demo(&self) -> Demo {
        match Demo::from_name(&self.demo) {
            Some(demo) => {
                log::info!("Demo: {}", demo.name());
                demo
            }
            None => {
                log::warn!("Unknown demo '{}', using noise", self.demo);
                Demo::TextureNoise
            }
        }
    }

    /// Apply the noise overrides on top of `base`
    pub fn noise_params(&self, base: NoiseParams) -> NoiseParams {
        NoiseParams {
            frequency: self.frequency.unwrap_or(base.frequency),
            scale_divisor: self.scale.unwrap_or(base.scale_divisor),
            octaves: self.octaves.unwrap_or(base.octaves),
            periodic: self.periodic || base.periodic,
        }
    }

    pub fn noise_texture_config(&self) -> NoiseTextureConfig {
        NoiseTextureConfig {
            width: self.width,
            height: self.height,
            params: self.noise_params(NoiseParams::default()),
        }
    }

    /// Scene parameters with every command-line override applied
    pub fn scene_params(&self) -> SceneParams {
        let terrain = TerrainParams::default();
        let particles = ParticleParams::default();
        SceneParams {
            noise_texture: self.noise_texture_config(),
            terrain: TerrainParams {
                noise: self.noise_params(terrain.noise),
                ..terrain
            },
            particles: ParticleParams {
                count: self.particles.unwrap_or(particles.count),
                ..particles
            },
            noise_kind: self.noise.into(),
            seed: self.seed,
            sprite: self.sprite.clone(),
        }
    }
}

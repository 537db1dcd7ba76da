//! Per-frame tweakable state and the keyboard actions that change it.

use glam::Vec3;
use winit::keyboard::KeyCode;

use crate::error::ParamError;
use crate::mesh::DrawMode;
use crate::params::{NoiseParams, ParticleParams};

const SPIN_STEP: f32 = 0.05;
const SCALE_STEP: f32 = 0.02;
const MOVE_STEP: f32 = 0.05;
const VIEW_STEP: f32 = 1.0;
const LIGHT_STEP: f32 = 1.0;
const FREQUENCY_STEP: f32 = 0.5;
const SCALE_DIVISOR_STEP: f32 = 0.5;
const POINT_SIZE_STEP: f32 = 1.0;
const EMITTER_STEP: f32 = 0.1;
const PARTICLE_SPEED_STEP: f32 = 0.0005;
const PARTICLE_RANGE_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Direction of a nudge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Down,
    Up,
}

impl Step {
    fn sign(self) -> f32 {
        match self {
            Step::Down => -1.0,
            Step::Up => 1.0,
        }
    }
}

/// Where the lighting equation is evaluated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShadeMode {
    /// Gouraud: lit at vertices, interpolated across faces
    PerVertex,
    /// Phong: lit per fragment
    #[default]
    PerFragment,
}

impl ShadeMode {
    pub fn toggled(self) -> Self {
        match self {
            ShadeMode::PerVertex => ShadeMode::PerFragment,
            ShadeMode::PerFragment => ShadeMode::PerVertex,
        }
    }
}

/// One discrete input action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Per-frame model rotation increment (degrees per frame)
    Spin(Axis, Step),
    Scale(Step),
    Move(Axis, Step),
    /// View rotation (degrees)
    View(Axis, Step),
    Light(Axis, Step),
    Octaves(Step),
    Frequency(Step),
    ScaleDivisor(Step),
    TogglePeriodic,
    CycleDrawMode,
    ToggleColourMode,
    /// Distance attenuation of the light on/off
    ToggleAttenuation,
    ToggleShadeMode,
    PointSize(Step),
    Emitter(Axis, Step),
    ParticleSpeed(Step),
    ParticleRange(Step),
}

impl Action {
    /// Key binding table
    pub fn from_key(key: KeyCode) -> Option<Self> {
        use Action::*;
        use Axis::*;
        use Step::*;

        let action = match key {
            KeyCode::KeyQ => Spin(X, Down),
            KeyCode::KeyW => Spin(X, Up),
            KeyCode::KeyE => Spin(Y, Down),
            KeyCode::KeyR => Spin(Y, Up),
            KeyCode::KeyT => Spin(Z, Down),
            KeyCode::KeyY => Spin(Z, Up),
            KeyCode::KeyA => Scale(Down),
            KeyCode::KeyS => Scale(Up),
            KeyCode::KeyZ => Move(X, Down),
            KeyCode::KeyX => Move(X, Up),
            KeyCode::KeyC => Move(Y, Down),
            KeyCode::KeyV => Move(Y, Up),
            KeyCode::KeyF => Move(Z, Down),
            KeyCode::KeyG => Move(Z, Up),
            KeyCode::Digit7 => View(X, Down),
            KeyCode::Digit8 => View(X, Up),
            KeyCode::Digit9 => View(Y, Down),
            KeyCode::Digit0 => View(Y, Up),
            KeyCode::KeyU => View(Z, Down),
            KeyCode::KeyI => View(Z, Up),
            KeyCode::ArrowLeft => Light(X, Down),
            KeyCode::ArrowRight => Light(X, Up),
            KeyCode::ArrowDown => Light(Y, Down),
            KeyCode::ArrowUp => Light(Y, Up),
            KeyCode::PageDown => Light(Z, Down),
            KeyCode::PageUp => Light(Z, Up),
            KeyCode::KeyO => Octaves(Down),
            KeyCode::KeyP => Octaves(Up),
            KeyCode::KeyL => Frequency(Down),
            KeyCode::Semicolon => Frequency(Up),
            KeyCode::Comma => ScaleDivisor(Down),
            KeyCode::Period => ScaleDivisor(Up),
            KeyCode::KeyB => TogglePeriodic,
            KeyCode::KeyN => CycleDrawMode,
            KeyCode::KeyM => ToggleColourMode,
            KeyCode::KeyD => ToggleAttenuation,
            KeyCode::KeyH => ToggleShadeMode,
            KeyCode::Minus => PointSize(Down),
            KeyCode::Equal => PointSize(Up),
            KeyCode::Digit1 => Emitter(X, Down),
            KeyCode::Digit2 => Emitter(X, Up),
            KeyCode::Digit3 => Emitter(Y, Down),
            KeyCode::Digit4 => Emitter(Y, Up),
            KeyCode::Digit5 => Emitter(Z, Down),
            KeyCode::Digit6 => Emitter(Z, Up),
            KeyCode::BracketLeft => ParticleSpeed(Down),
            KeyCode::BracketRight => ParticleSpeed(Up),
            KeyCode::KeyJ => ParticleRange(Down),
            KeyCode::KeyK => ParticleRange(Up),
            _ => return None,
        };
        Some(action)
    }
}

/// What an applied action touched, so the caller knows what to rebuild
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateChange {
    /// Model, view or light transform; picked up by the next draw list
    Transform,
    /// Noise parameters changed; the noise texture needs regenerating
    Noise(NoiseParams),
    DrawMode(DrawMode),
    ColourMode(bool),
    Lighting {
        attenuation: bool,
        shade_mode: ShadeMode,
    },
    /// Point size or emitter offset
    Sprites,
    /// Particle speed or travel distance
    ParticleMotion { speed: f32, max_dist: f32 },
}

/// Everything the key handler can change, passed explicitly to the scene and renderer
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub position: Vec3,
    pub model_scale: f32,
    /// Model rotation (degrees)
    pub angles: Vec3,
    /// Added to `angles` once per frame
    pub angle_inc: Vec3,
    /// View rotation (degrees)
    pub view_rotation: Vec3,
    /// Offset added to the scene's light position
    pub light_offset: Vec3,
    pub draw_mode: DrawMode,
    /// Use per-vertex colours instead of texture/white shading
    pub colour_mode: bool,
    /// Fade the light with distance
    pub attenuation: bool,
    pub shade_mode: ShadeMode,
    pub noise: NoiseParams,
    /// Set when `noise` changed and the texture is stale
    pub noise_dirty: bool,
    /// Particle sprite size (pixels)
    pub point_size: f32,
    pub emitter: Vec3,
    pub particle_speed: f32,
    pub particle_max_dist: f32,
    pub aspect_ratio: f32,
}

impl Default for FrameState {
    fn default() -> Self {
        Self::new(NoiseParams::default(), &ParticleParams::default(), 1024.0 / 768.0)
    }
}

impl FrameState {
    pub fn new(noise: NoiseParams, particles: &ParticleParams, aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            model_scale: 1.0,
            angles: Vec3::ZERO,
            angle_inc: Vec3::ZERO,
            view_rotation: Vec3::ZERO,
            light_offset: Vec3::ZERO,
            draw_mode: DrawMode::default(),
            colour_mode: false,
            attenuation: true,
            shade_mode: ShadeMode::default(),
            noise,
            noise_dirty: false,
            point_size: particles.point_size,
            emitter: Vec3::ZERO,
            particle_speed: particles.speed,
            particle_max_dist: particles.max_dist,
            aspect_ratio,
        }
    }

    /// Step the model rotation by one frame's increment
    pub fn advance(&mut self) {
        self.angles += self.angle_inc;
    }

    /// Recompute the aspect ratio after a resize (ignored for a zero-height window)
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if let Some(aspect) = aspect_ratio(width, height) {
            self.aspect_ratio = aspect;
        }
    }

    /// Apply an action.
    ///
    /// Noise and particle changes are validated first; a rejected change leaves the
    /// state untouched.
    pub fn apply(&mut self, action: Action) -> Result<StateChange, ParamError> {
        let change = match action {
            Action::Spin(axis, step) => {
                self.angle_inc += axis.unit() * step.sign() * SPIN_STEP;
                StateChange::Transform
            }
            Action::Scale(step) => {
                self.model_scale += step.sign() * SCALE_STEP;
                StateChange::Transform
            }
            Action::Move(axis, step) => {
                self.position += axis.unit() * step.sign() * MOVE_STEP;
                StateChange::Transform
            }
            Action::View(axis, step) => {
                self.view_rotation += axis.unit() * step.sign() * VIEW_STEP;
                StateChange::Transform
            }
            Action::Light(axis, step) => {
                self.light_offset += axis.unit() * step.sign() * LIGHT_STEP;
                StateChange::Transform
            }
            Action::Octaves(step) => {
                let mut noise = self.noise;
                noise.octaves = match step {
                    Step::Down => noise.octaves.saturating_sub(1).max(1),
                    Step::Up => (noise.octaves + 1).min(NoiseParams::MAX_OCTAVES),
                };
                self.set_noise(noise)?
            }
            Action::Frequency(step) => {
                let mut noise = self.noise;
                noise.frequency += step.sign() * FREQUENCY_STEP;
                self.set_noise(noise)?
            }
            Action::ScaleDivisor(step) => {
                let mut noise = self.noise;
                noise.scale_divisor += step.sign() * SCALE_DIVISOR_STEP;
                self.set_noise(noise)?
            }
            Action::TogglePeriodic => {
                let mut noise = self.noise;
                noise.periodic = !noise.periodic;
                self.set_noise(noise)?
            }
            Action::CycleDrawMode => {
                self.draw_mode = self.draw_mode.next();
                log::info!("Draw mode: {:?}", self.draw_mode);
                StateChange::DrawMode(self.draw_mode)
            }
            Action::ToggleColourMode => {
                self.colour_mode = !self.colour_mode;
                log::info!("Colour mode: {}", self.colour_mode);
                StateChange::ColourMode(self.colour_mode)
            }
            Action::ToggleAttenuation => {
                self.attenuation = !self.attenuation;
                log::info!("Attenuation: {}", self.attenuation);
                self.lighting_change()
            }
            Action::ToggleShadeMode => {
                self.shade_mode = self.shade_mode.toggled();
                log::info!("Shade mode: {:?}", self.shade_mode);
                self.lighting_change()
            }
            Action::PointSize(step) => {
                self.point_size = (self.point_size + step.sign() * POINT_SIZE_STEP).max(1.0);
                StateChange::Sprites
            }
            Action::Emitter(axis, step) => {
                self.emitter += axis.unit() * step.sign() * EMITTER_STEP;
                StateChange::Sprites
            }
            Action::ParticleSpeed(step) => {
                let speed = (self.particle_speed + step.sign() * PARTICLE_SPEED_STEP).max(0.0);
                self.particle_speed = speed;
                log::info!("Particle speed: {speed}");
                StateChange::ParticleMotion {
                    speed,
                    max_dist: self.particle_max_dist,
                }
            }
            Action::ParticleRange(step) => {
                let max_dist = self.particle_max_dist + step.sign() * PARTICLE_RANGE_STEP;
                if !(max_dist > 0.0) {
                    let err = ParamError::invalid("max_dist", max_dist, "must be > 0");
                    log::warn!("Ignoring particle change: {err}");
                    return Err(err);
                }
                self.particle_max_dist = max_dist;
                log::info!("Particle max distance: {max_dist}");
                StateChange::ParticleMotion {
                    speed: self.particle_speed,
                    max_dist,
                }
            }
        };
        Ok(change)
    }

    fn lighting_change(&self) -> StateChange {
        StateChange::Lighting {
            attenuation: self.attenuation,
            shade_mode: self.shade_mode,
        }
    }

    fn set_noise(&mut self, noise: NoiseParams) -> Result<StateChange, ParamError> {
        if let Err(err) = noise.validate() {
            log::warn!("Ignoring noise change: {err}");
            return Err(err);
        }
        if noise != self.noise {
            self.noise = noise;
            self.noise_dirty = true;
            log::info!(
                "Noise: octaves {}, frequency {}, scale {}, periodic {}",
                noise.octaves,
                noise.frequency,
                noise.scale_divisor,
                noise.periodic
            );
        }
        Ok(StateChange::Noise(self.noise))
    }
}

/// Width over height, or `None` for a minimised (zero-height) window
pub fn aspect_ratio(width: u32, height: u32) -> Option<f32> {
    if width == 0 || height == 0 {
        None
    } else {
        Some(width as f32 / height as f32)
    }
}

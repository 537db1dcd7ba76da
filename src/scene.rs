//! Per-demo scene assembly and the per-frame draw list.

use std::f32::consts::FRAC_PI_2;
use std::path::PathBuf;

use glam::{Mat3, Mat4, Vec3};

use crate::camera::CameraSystem;
use crate::error::{ParamError, SceneError};
use crate::mesh::{DrawMode, Mesh, WHITE};
use crate::noise::{GradientNoise, NoiseField, NoiseKind};
use crate::params::{CameraConfig, NoiseParams, NoiseTextureConfig, ParticleParams, TerrainParams};
use crate::particles::{ParticleInstance, ParticleSystem};
use crate::state::{FrameState, ShadeMode};
use crate::texture::TextureData;
use crate::transform::{normal_matrix, MatrixStack};
use crate::upload::{UploadMesh, UploadTexture};

/// Light position before the frame's light offset is added
const LIGHT_BASE: Vec3 = Vec3::new(2.0, 3.0, 2.0);
const LIGHT_MARKER_SCALE: f32 = 0.05;
const SPRITE_SIZE: u32 = 64;

/// Demo programs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    /// Quad textured with the interactive noise texture
    TextureNoise,
    /// Noise heightfield coloured by height
    Terrain,
    /// Point-sprite particle fountain
    Particles,
    /// Cube, sphere, cylinder and prism under a movable light
    Shapes,
}

impl Demo {
    pub const ALL: [Demo; 4] = [Demo::TextureNoise, Demo::Terrain, Demo::Particles, Demo::Shapes];

    pub fn name(self) -> &'static str {
        match self {
            Demo::TextureNoise => "noise",
            Demo::Terrain => "terrain",
            Demo::Particles => "particles",
            Demo::Shapes => "shapes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Demo::ALL
            .into_iter()
            .find(|demo| demo.name().eq_ignore_ascii_case(name))
    }

    fn camera(self) -> CameraConfig {
        match self {
            Demo::TextureNoise | Demo::Particles => CameraConfig::front(4.0),
            Demo::Terrain => CameraConfig::default(),
            Demo::Shapes => CameraConfig::front(6.0),
        }
    }
}

/// Everything a scene is built from
#[derive(Debug, Clone, Default)]
pub struct SceneParams {
    pub noise_texture: NoiseTextureConfig,
    pub terrain: TerrainParams,
    pub particles: ParticleParams,
    pub noise_kind: NoiseKind,
    /// Seed for the seeded noise source
    pub seed: u32,
    /// Sprite image for the particles; a generated round sprite when absent
    pub sprite: Option<PathBuf>,
}

/// One mesh draw for the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall<M, T> {
    pub mesh: M,
    pub texture: Option<T>,
    pub model: Mat4,
    /// View-space normal matrix for `model`
    pub normal_matrix: Mat3,
    /// Drawn unlit at full brightness
    pub emissive: bool,
    pub vertex_colours: bool,
    /// Fade the light with distance
    pub attenuation: bool,
    pub shade_mode: ShadeMode,
    pub draw_mode: DrawMode,
}

/// Instanced sprites for the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBatch<T> {
    pub texture: T,
    pub instances: Vec<ParticleInstance>,
}

#[derive(Debug, Clone)]
struct SceneObject<M, T> {
    mesh: M,
    texture: Option<T>,
    /// Placement within the demo's layout
    placement: Mat4,
    vertex_colours: bool,
    lit: bool,
}

/// Uploaded resources for one demo plus the CPU-side state that animates them
pub struct Scene<M, T> {
    demo: Demo,
    camera: CameraSystem,
    noise: Box<dyn GradientNoise>,
    noise_size: (usize, usize),
    terrain: TerrainParams,
    objects: Vec<SceneObject<M, T>>,
    light_marker: Option<M>,
    noise_texture: Option<T>,
    particles: Option<(ParticleSystem, T)>,
    initial_noise: NoiseParams,
    particle_params: ParticleParams,
}

fn upload_mesh<U: UploadMesh>(
    uploader: &mut U,
    mesh: &Mesh,
) -> Result<U::MeshHandle, SceneError<U::Error>> {
    uploader.upload_mesh(mesh).map_err(SceneError::Upload)
}

fn upload_texture<U: UploadTexture>(
    uploader: &mut U,
    texture: &TextureData,
) -> Result<U::TextureHandle, SceneError<U::Error>> {
    uploader.upload_texture(texture).map_err(SceneError::Upload)
}

impl<M: Clone, T: Clone> Scene<M, T> {
    /// Build the meshes and textures for `demo` and upload them.
    pub fn build<U>(
        demo: Demo,
        params: &SceneParams,
        uploader: &mut U,
    ) -> Result<Self, SceneError<U::Error>>
    where
        U: UploadMesh<MeshHandle = M> + UploadTexture<TextureHandle = T>,
    {
        let noise = params.noise_kind.build(params.seed);
        let noise_size = (
            params.noise_texture.width as usize,
            params.noise_texture.height as usize,
        );

        let mut scene = Self {
            demo,
            camera: CameraSystem::new(demo.camera()),
            noise,
            noise_size,
            terrain: params.terrain.clone(),
            objects: Vec::new(),
            light_marker: None,
            noise_texture: None,
            particles: None,
            initial_noise: params.noise_texture.params,
            particle_params: params.particles.clone(),
        };

        match demo {
            Demo::TextureNoise => {
                let field = scene.noise_field(&params.noise_texture.params)?;
                let texture = upload_texture(uploader, &TextureData::from_noise(&field)?)?;
                let quad = upload_mesh(uploader, &Mesh::quad(1.0, 2.0))?;
                // Stand the quad up to face the camera
                scene.objects.push(SceneObject {
                    mesh: quad,
                    texture: Some(texture.clone()),
                    placement: Mat4::from_rotation_x(FRAC_PI_2),
                    vertex_colours: false,
                    lit: false,
                });
                scene.noise_texture = Some(texture);
            }
            Demo::Terrain => {
                scene.initial_noise = params.terrain.noise;
                let terrain = Mesh::terrain(&params.terrain, &*scene.noise)?;
                let mesh = upload_mesh(uploader, &terrain)?;
                scene.objects.push(SceneObject {
                    mesh,
                    texture: None,
                    placement: Mat4::IDENTITY,
                    vertex_colours: true,
                    lit: true,
                });
                scene.light_marker = Some(upload_mesh(uploader, &Mesh::sphere(20, 20)?)?);
            }
            Demo::Particles => {
                let sprite = match &params.sprite {
                    Some(path) => TextureData::load(path, true)?,
                    None => TextureData::radial_sprite(SPRITE_SIZE)?,
                };
                let texture = upload_texture(uploader, &sprite)?;
                scene.particles = Some((ParticleSystem::new(&params.particles)?, texture));
            }
            Demo::Shapes => {
                let shapes = [
                    (Mesh::cube(), [0.9, 0.3, 0.3, 1.0], Vec3::new(-2.25, 0.0, 0.0)),
                    (Mesh::sphere(40, 40)?, [0.3, 0.8, 0.4, 1.0], Vec3::new(-0.75, 0.0, 0.0)),
                    (Mesh::cylinder(40)?, [0.3, 0.5, 0.9, 1.0], Vec3::new(0.75, 0.0, 0.0)),
                    (Mesh::tri_prism(), [0.9, 0.8, 0.3, 1.0], Vec3::new(2.25, 0.0, 0.0)),
                ];
                for (mesh, colour, offset) in shapes {
                    let mesh = upload_mesh(uploader, &mesh.with_colour(colour))?;
                    scene.objects.push(SceneObject {
                        mesh,
                        texture: None,
                        placement: Mat4::from_translation(offset),
                        vertex_colours: true,
                        lit: true,
                    });
                }
                let marker = Mesh::sphere(20, 20)?.with_colour(WHITE);
                scene.light_marker = Some(upload_mesh(uploader, &marker)?);
            }
        }

        log::info!("Built {} scene: {} objects", demo.name(), scene.objects.len());
        Ok(scene)
    }

    pub fn demo(&self) -> Demo {
        self.demo
    }

    pub fn camera(&self) -> &CameraSystem {
        &self.camera
    }

    /// Frame state seeded with this scene's noise and particle parameters
    pub fn initial_state(&self, aspect_ratio: f32) -> FrameState {
        FrameState::new(self.initial_noise, &self.particle_params, aspect_ratio)
    }

    /// World-space light position for this frame
    pub fn light_position(&self, state: &FrameState) -> Vec3 {
        LIGHT_BASE + state.light_offset
    }

    fn noise_field(&self, params: &NoiseParams) -> Result<NoiseField, ParamError> {
        let (width, height) = self.noise_size;
        NoiseField::generate(width, height, params, &*self.noise)
    }

    /// Regenerate noise-driven resources if the frame's noise parameters changed.
    ///
    /// Returns whether anything was re-uploaded; the dirty flag is cleared either way.
    pub fn refresh<U>(
        &mut self,
        state: &mut FrameState,
        uploader: &mut U,
    ) -> Result<bool, SceneError<U::Error>>
    where
        U: UploadMesh<MeshHandle = M> + UploadTexture<TextureHandle = T>,
    {
        if !state.noise_dirty {
            return Ok(false);
        }
        state.noise_dirty = false;

        match self.demo {
            Demo::TextureNoise => {
                let Some(handle) = &self.noise_texture else {
                    return Ok(false);
                };
                let field = self.noise_field(&state.noise)?;
                let texture = TextureData::from_noise(&field)?;
                uploader
                    .update_texture(handle, &texture)
                    .map_err(SceneError::Upload)?;
            }
            Demo::Terrain => {
                self.terrain.noise = state.noise;
                let terrain = Mesh::terrain(&self.terrain, &*self.noise)?;
                if let Some(object) = self.objects.first() {
                    uploader
                        .update_mesh(&object.mesh, &terrain)
                        .map_err(SceneError::Upload)?;
                }
            }
            Demo::Particles | Demo::Shapes => return Ok(false),
        }
        log::debug!("Regenerated noise for {}", self.demo.name());
        Ok(true)
    }

    /// Advance animation by one frame
    pub fn step(&mut self, state: &FrameState) {
        if let Some((system, _)) = &mut self.particles {
            if system.speed() != state.particle_speed || system.max_dist() != state.particle_max_dist
            {
                if let Err(err) = system.set_motion(state.particle_max_dist, state.particle_speed) {
                    log::warn!("Keeping particle motion: {err}");
                }
            }
            system.animate();
        }
    }

    /// Draw calls for this frame, built with the matrix stack
    pub fn draw_list(&self, state: &FrameState) -> Vec<DrawCall<M, T>> {
        let view = self.camera.view_matrix(state);
        let mut calls = Vec::with_capacity(self.objects.len() + 1);
        let mut stack = MatrixStack::new();

        stack.with_pushed(|stack| {
            stack
                .translate(state.position)
                .scale(Vec3::splat(state.model_scale))
                .rotate_deg(-state.angles.x, Vec3::X)
                .rotate_deg(-state.angles.y, Vec3::Y)
                .rotate_deg(-state.angles.z, Vec3::Z);

            for object in &self.objects {
                stack.with_pushed(|stack| {
                    *stack.top_mut() *= object.placement;
                    let model = stack.top();
                    calls.push(DrawCall {
                        mesh: object.mesh.clone(),
                        texture: object.texture.clone(),
                        model,
                        normal_matrix: normal_matrix(view, model),
                        emissive: !object.lit,
                        vertex_colours: object.vertex_colours != state.colour_mode,
                        attenuation: state.attenuation,
                        shade_mode: state.shade_mode,
                        draw_mode: state.draw_mode,
                    });
                });
            }
        });

        if let Some(marker) = &self.light_marker {
            stack.with_pushed(|stack| {
                stack
                    .translate(self.light_position(state))
                    .scale(Vec3::splat(LIGHT_MARKER_SCALE));
                let model = stack.top();
                calls.push(DrawCall {
                    mesh: marker.clone(),
                    texture: None,
                    model,
                    normal_matrix: normal_matrix(view, model),
                    emissive: true,
                    vertex_colours: false,
                    attenuation: state.attenuation,
                    shade_mode: state.shade_mode,
                    draw_mode: DrawMode::Fill,
                });
            });
        }

        calls
    }

    /// Particle sprites for this frame, if the demo has any
    pub fn particle_batch(&self, state: &FrameState) -> Option<ParticleBatch<T>> {
        self.particles.as_ref().map(|(system, texture)| ParticleBatch {
            texture: texture.clone(),
            instances: system.instances(state.emitter, state.point_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Action, Step};
    use crate::upload::UploadBackend;
    use std::convert::Infallible;

    /// Stand-in backend that records everything it is handed
    #[derive(Default)]
    struct Recorder {
        meshes: Vec<Mesh>,
        textures: Vec<TextureData>,
        updates: Vec<(usize, TextureData)>,
        mesh_updates: usize,
    }

    impl UploadBackend for Recorder {
        type Error = Infallible;
    }

    impl UploadMesh for Recorder {
        type MeshHandle = usize;

        fn upload_mesh(&mut self, mesh: &Mesh) -> Result<usize, Infallible> {
            self.meshes.push(mesh.clone());
            Ok(self.meshes.len() - 1)
        }

        fn update_mesh(&mut self, handle: &usize, mesh: &Mesh) -> Result<(), Infallible> {
            self.meshes[*handle] = mesh.clone();
            self.mesh_updates += 1;
            Ok(())
        }
    }

    impl UploadTexture for Recorder {
        type TextureHandle = usize;

        fn upload_texture(&mut self, texture: &TextureData) -> Result<usize, Infallible> {
            self.textures.push(texture.clone());
            Ok(self.textures.len() - 1)
        }

        fn update_texture(
            &mut self,
            handle: &usize,
            texture: &TextureData,
        ) -> Result<(), Infallible> {
            self.updates.push((*handle, texture.clone()));
            Ok(())
        }
    }

    fn small_params() -> SceneParams {
        SceneParams {
            noise_texture: NoiseTextureConfig {
                width: 16,
                height: 16,
                ..Default::default()
            },
            terrain: TerrainParams {
                xsize: 12,
                zsize: 12,
                ..Default::default()
            },
            particles: ParticleParams {
                count: 50,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn noise_demo_draws_one_textured_quad() {
        let mut recorder = Recorder::default();
        let scene = Scene::build(Demo::TextureNoise, &small_params(), &mut recorder).unwrap();
        assert_eq!(recorder.meshes.len(), 1);
        assert_eq!(recorder.textures.len(), 1);
        assert_eq!(recorder.textures[0].width(), 16);

        let calls = scene.draw_list(&scene.initial_state(1.0));
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].texture, Some(0));
        assert!(calls[0].emissive);
        // Quad normal turned toward the camera
        let normal = calls[0].model.transform_vector3(Vec3::Y);
        assert!((normal - Vec3::Z).length() < 1e-6);
        assert!(scene.particle_batch(&scene.initial_state(1.0)).is_none());
    }

    #[test]
    fn noise_change_updates_texture_in_place() {
        let mut recorder = Recorder::default();
        let mut scene = Scene::build(Demo::TextureNoise, &small_params(), &mut recorder).unwrap();
        let mut state = scene.initial_state(1.0);

        assert!(!scene.refresh(&mut state, &mut recorder).unwrap());
        state.apply(Action::Octaves(Step::Up)).unwrap();
        assert!(scene.refresh(&mut state, &mut recorder).unwrap());
        assert!(!state.noise_dirty);

        assert_eq!(recorder.updates.len(), 1);
        let (handle, texture) = &recorder.updates[0];
        assert_eq!(*handle, 0);
        assert_ne!(texture, &recorder.textures[0]);
    }

    #[test]
    fn terrain_noise_change_rewrites_mesh_in_place() {
        let mut recorder = Recorder::default();
        let mut scene = Scene::build(Demo::Terrain, &small_params(), &mut recorder).unwrap();
        let mut state = scene.initial_state(1.0);
        assert_eq!(state.noise, small_params().terrain.noise);

        let handle = scene.draw_list(&state)[0].mesh;
        let original = recorder.meshes[handle].clone();
        state.apply(Action::Frequency(Step::Up)).unwrap();
        assert!(scene.refresh(&mut state, &mut recorder).unwrap());

        assert_eq!(scene.draw_list(&state)[0].mesh, handle);
        assert_ne!(recorder.meshes[handle], original);
        assert_eq!(recorder.mesh_updates, 1);
    }

    #[test]
    fn repeated_terrain_refreshes_keep_upload_count_flat() {
        let mut recorder = Recorder::default();
        let mut scene = Scene::build(Demo::Terrain, &small_params(), &mut recorder).unwrap();
        let mut state = scene.initial_state(1.0);
        let uploaded = recorder.meshes.len();

        for i in 0..20 {
            let step = if i % 2 == 0 { Step::Up } else { Step::Down };
            state.apply(Action::Frequency(step)).unwrap();
            scene.refresh(&mut state, &mut recorder).unwrap();
        }

        assert_eq!(recorder.meshes.len(), uploaded);
        assert_eq!(recorder.mesh_updates, 20);
        assert_eq!(scene.draw_list(&state).len(), 2);
    }

    #[test]
    fn shapes_demo_lays_out_four_shapes_and_a_light() {
        let mut recorder = Recorder::default();
        let scene = Scene::build(Demo::Shapes, &small_params(), &mut recorder).unwrap();
        let mut state = scene.initial_state(1.0);
        state.light_offset = Vec3::new(1.0, 0.0, 0.0);

        let calls = scene.draw_list(&state);
        assert_eq!(calls.len(), 5);
        assert_eq!(calls.iter().filter(|c| c.emissive).count(), 1);

        let light = calls.last().unwrap();
        let centre = light.model.transform_point3(Vec3::ZERO);
        assert_eq!(centre, LIGHT_BASE + Vec3::X);

        let xs: Vec<f32> = calls[..4]
            .iter()
            .map(|c| c.model.transform_point3(Vec3::ZERO).x)
            .collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn model_transform_reaches_every_object() {
        let mut recorder = Recorder::default();
        let scene = Scene::build(Demo::Shapes, &small_params(), &mut recorder).unwrap();
        let mut state = scene.initial_state(1.0);
        state.position = Vec3::new(0.0, 1.0, 0.0);
        state.apply(Action::CycleDrawMode).unwrap();
        state.apply(Action::ToggleColourMode).unwrap();

        for call in &scene.draw_list(&state)[..4] {
            assert_eq!(call.model.transform_point3(Vec3::ZERO).y, 1.0);
            assert_eq!(call.draw_mode, DrawMode::Points);
            assert!(!call.vertex_colours);
        }
    }

    #[test]
    fn lighting_modes_reach_draw_calls() {
        let mut recorder = Recorder::default();
        let scene = Scene::build(Demo::Shapes, &small_params(), &mut recorder).unwrap();
        let mut state = scene.initial_state(1.0);
        assert!(scene.draw_list(&state).iter().all(|c| c.attenuation));

        state.apply(Action::ToggleAttenuation).unwrap();
        state.apply(Action::ToggleShadeMode).unwrap();
        for call in scene.draw_list(&state) {
            assert!(!call.attenuation);
            assert_eq!(call.shade_mode, ShadeMode::PerVertex);
        }
    }

    #[test]
    fn particles_demo_uses_generated_sprite() {
        let mut recorder = Recorder::default();
        let mut scene = Scene::build(Demo::Particles, &small_params(), &mut recorder).unwrap();
        assert!(recorder.meshes.is_empty());
        assert_eq!(recorder.textures[0].width(), SPRITE_SIZE);

        let mut state = scene.initial_state(1.0);
        state.emitter = Vec3::new(0.0, -1.0, 0.0);
        scene.step(&state);

        let batch = scene.particle_batch(&state).unwrap();
        assert_eq!(batch.texture, 0);
        assert_eq!(batch.instances.len(), 50);
        assert!(scene.draw_list(&state).is_empty());
    }

    #[test]
    fn particle_motion_follows_frame_state() {
        let mut recorder = Recorder::default();
        let mut scene = Scene::build(Demo::Particles, &small_params(), &mut recorder).unwrap();
        let mut state = scene.initial_state(1.0);
        state.particle_speed = 0.0;
        scene.step(&state);

        let batch = scene.particle_batch(&state).unwrap();
        assert!(batch.instances.iter().all(|i| i.position == [0.0, 0.0, 0.0]));
    }

    #[test]
    fn demo_names_round_trip() {
        for demo in Demo::ALL {
            assert_eq!(Demo::from_name(demo.name()), Some(demo));
        }
        assert_eq!(Demo::from_name("TERRAIN"), Some(Demo::Terrain));
        assert_eq!(Demo::from_name("skybox"), None);
    }
}

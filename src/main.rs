//! shadelab - interactive noise texture, terrain, particle and shape demos
//!
//! Keys nudge the model, view, light, noise and particle parameters; ESC quits.
//! `--export PATH` writes the noise texture to a PNG without opening a window.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use shadelab::cli::Args;
use shadelab::error::RenderError;
use shadelab::noise::NoiseField;
use shadelab::params::RenderConfig;
use shadelab::rendering::{Frame, MeshHandle, RenderSystem, TextureHandle};
use shadelab::scene::{Demo, Scene, SceneParams};
use shadelab::state::{aspect_ratio, Action, FrameState};

/// Main application state
struct App {
    demo: Demo,
    scene_params: SceneParams,
    render_config: RenderConfig,

    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    scene: Option<Scene<MeshHandle, TextureHandle>>,

    state: FrameState,

    /// Fatal error raised inside the event loop, reported after it exits
    error: Option<anyhow::Error>,
}

impl App {
    fn new(demo: Demo, scene_params: SceneParams) -> Self {
        let render_config = RenderConfig::default();
        Self {
            demo,
            state: FrameState::new(
                scene_params.noise_texture.params,
                &scene_params.particles,
                render_config.aspect_ratio(),
            ),
            scene_params,
            render_config,
            window: None,
            render_system: None,
            scene: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title(format!("shadelab - {}", self.demo.name()))
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let mut render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            self.render_config.clone(),
        ))
        .context("Failed to initialise renderer")?;

        let scene = Scene::build(self.demo, &self.scene_params, &mut render_system)
            .context("Failed to build scene")?;

        let (width, height) = render_system.size();
        let aspect = aspect_ratio(width, height).unwrap_or(self.render_config.aspect_ratio());
        self.state = scene.initial_state(aspect);

        log::info!("shadelab is running: {} demo, ESC to quit", self.demo.name());
        self.window = Some(window);
        self.render_system = Some(render_system);
        self.scene = Some(scene);
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        let Some(action) = Action::from_key(key) else {
            return;
        };
        // Rejected changes are logged by `apply` and leave the state as it was
        if let Ok(change) = self.state.apply(action) {
            log::debug!("{action:?} -> {change:?}");
        }
    }

    /// Render a single frame
    fn render_frame(&mut self) {
        let (Some(render_system), Some(scene)) = (self.render_system.as_mut(), self.scene.as_mut())
        else {
            return;
        };

        if let Err(err) = scene.refresh(&mut self.state, render_system) {
            log::error!("Failed to regenerate noise: {err}");
        }
        scene.step(&self.state);
        self.state.advance();

        let calls = scene.draw_list(&self.state);
        let particles = scene.particle_batch(&self.state);
        let (view, projection) = scene.camera().matrices(&self.state, &self.render_config);
        let frame = Frame {
            view,
            projection,
            light_position: scene.light_position(&self.state),
            calls: &calls,
            particles: particles.as_ref(),
        };

        match render_system.render(&frame) {
            Ok(()) => {}
            Err(RenderError::Frame(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                let (width, height) = render_system.size();
                render_system.resize(width, height);
            }
            Err(err) => log::error!("Render error: {err}"),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }
        if let Err(err) = self.init(event_loop) {
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    event_loop.exit();
                } else {
                    self.handle_key(key);
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(size.width, size.height);
                }
                self.state.set_viewport(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            _ => {}
        }
    }
}

/// Generate the noise texture once and save it as a greyscale PNG
fn export_noise(args: &Args, path: &Path) -> Result<()> {
    let config = args.noise_texture_config();
    let noise = args.scene_params().noise_kind.build(args.seed);
    let field = NoiseField::generate(
        config.width as usize,
        config.height as usize,
        &config.params,
        &*noise,
    )
    .context("Invalid noise parameters")?;

    field
        .save_png(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let (lo, hi) = field.min_max();
    log::info!(
        "Wrote {}x{} noise to {} (range {lo:.3}..{hi:.3})",
        config.width,
        config.height,
        path.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = &args.export {
        return export_noise(&args, path);
    }

    let mut app = App::new(args.parse_demo(), args.scene_params());
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

//! Rendering system with wgpu pipelines, GPU resources behind upload handles.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::error::RenderError;
use crate::mesh::{DrawMode, Mesh, Vertex};
use crate::params::RenderConfig;
use crate::particles::ParticleInstance;
use crate::scene::{DrawCall, ParticleBatch};
use crate::state::ShadeMode;
use crate::texture::TextureData;
use crate::upload::{UploadBackend, UploadMesh, UploadTexture};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Per-draw uniforms live at this stride in one dynamic-offset buffer
const OBJECT_STRIDE: u64 = 256;
const MAX_DRAWS: usize = 64;

/// Uniform buffer shared by all pipelines
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// View-space light position
    pub light_position: [f32; 4],
    /// Viewport width and height (pixels)
    pub viewport: [f32; 4],
}

/// Per-draw uniforms (model, normal matrix, shading flags)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    /// mat3x3 columns padded to 16 bytes
    pub normal_matrix: [[f32; 4]; 3],
    /// x: emissive, y: vertex colours, z: attenuation, w: per-vertex lighting
    pub flags: [u32; 4],
}

impl ObjectUniforms {
    fn new<M, T>(call: &DrawCall<M, T>) -> Self {
        let column = |c: Vec3| [c.x, c.y, c.z, 0.0];
        let normal_matrix: Mat3 = call.normal_matrix;
        Self {
            model: call.model.to_cols_array_2d(),
            normal_matrix: [
                column(normal_matrix.x_axis),
                column(normal_matrix.y_axis),
                column(normal_matrix.z_axis),
            ],
            flags: [
                call.emissive as u32,
                call.vertex_colours as u32,
                call.attenuation as u32,
                (call.shade_mode == ShadeMode::PerVertex) as u32,
            ],
        }
    }
}

/// Handle to an uploaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandle(usize);

/// Handle to an uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHandle(usize);

/// Everything the renderer needs for one frame
pub struct Frame<'a> {
    pub view: Mat4,
    pub projection: Mat4,
    /// World-space light position
    pub light_position: Vec3,
    pub calls: &'a [DrawCall<MeshHandle, TextureHandle>],
    pub particles: Option<&'a ParticleBatch<TextureHandle>>,
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    line_buffer: wgpu::Buffer,
    line_count: u32,
    vertex_count: u32,
}

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x4,
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32,
        2 => Float32x4,
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRIBUTES,
    }
}

fn uniform_layout_entry(dynamic: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Rendering system managing wgpu device, pipelines, and uploaded resources
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    render_config: RenderConfig,
    depth_view: wgpu::TextureView,
    /// Indexed by draw mode: points, lines, fill
    mesh_pipelines: [wgpu::RenderPipeline; 3],
    particle_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Bound for meshes without a texture
    white_texture: TextureHandle,
    meshes: Vec<GpuMesh>,
    textures: Vec<GpuTexture>,
    instance_buffer: Option<(wgpu::Buffer, usize)>,
}

impl RenderSystem {
    /// Create new rendering system
    pub async fn new(
        window: Arc<winit::window::Window>,
        render_config: RenderConfig,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Surface borrows the window for 'static via the Arc
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        let depth_view = create_depth_view(&device, surface_config.width, surface_config.height);

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });
        let particle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/particles.wgsl").into()),
        });

        // Group 0: per-frame globals
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[uniform_layout_entry(false)],
        });
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        // Group 1 (meshes): per-draw uniforms at dynamic offsets
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[uniform_layout_entry(true)],
        });
        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Buffer"),
            size: OBJECT_STRIDE * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: &object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &object_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
                }),
            }],
        });

        // Texture + sampler, group 2 for meshes and group 1 for particles
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Repeat Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &object_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = |label: &str, topology: wgpu::PrimitiveTopology| {
            let cull_mode = match topology {
                wgpu::PrimitiveTopology::TriangleList => Some(wgpu::Face::Back),
                _ => None,
            };
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&mesh_layout),
                vertex: wgpu::VertexState {
                    module: &mesh_shader,
                    entry_point: Some("vs_main"),
                    buffers: &[vertex_layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &mesh_shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let mesh_pipelines = [
            mesh_pipeline("Mesh Points Pipeline", wgpu::PrimitiveTopology::PointList),
            mesh_pipeline("Mesh Lines Pipeline", wgpu::PrimitiveTopology::LineList),
            mesh_pipeline("Mesh Fill Pipeline", wgpu::PrimitiveTopology::TriangleList),
        ];

        let particle_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&particle_layout),
            vertex: wgpu::VertexState {
                module: &particle_shader,
                entry_point: Some("vs_main"),
                buffers: &[instance_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &particle_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // Sprites test against meshes but never occlude each other
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let mut system = Self {
            surface,
            device,
            queue,
            surface_config,
            render_config,
            depth_view,
            mesh_pipelines,
            particle_pipeline,
            globals_buffer,
            globals_bind_group,
            object_buffer,
            object_bind_group,
            texture_layout,
            sampler,
            white_texture: TextureHandle(0),
            meshes: Vec::new(),
            textures: Vec::new(),
            instance_buffer: None,
        };
        let white = TextureData::new(1, 1, vec![255; 4])?;
        system.white_texture = system.upload_texture(&white)?;

        log::info!(
            "Renderer ready: {} ({:?}), {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            system.surface_config.width,
            system.surface_config.height
        );
        Ok(system)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Reconfigure the surface and depth buffer; zero sizes (minimised) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    fn write_frame_data(&mut self, frame: &Frame<'_>) -> usize {
        let light = frame.view.transform_point3(frame.light_position);
        let globals = Globals {
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            light_position: [light.x, light.y, light.z, 1.0],
            viewport: [
                self.surface_config.width as f32,
                self.surface_config.height as f32,
                0.0,
                0.0,
            ],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[globals]));

        let draw_count = frame.calls.len().min(MAX_DRAWS);
        if frame.calls.len() > MAX_DRAWS {
            log::warn!(
                "Dropping {} draw calls beyond {MAX_DRAWS}",
                frame.calls.len() - MAX_DRAWS
            );
        }
        let mut staging = vec![0u8; OBJECT_STRIDE as usize * draw_count.max(1)];
        for (i, call) in frame.calls.iter().take(draw_count).enumerate() {
            let uniforms = ObjectUniforms::new(call);
            let start = i * OBJECT_STRIDE as usize;
            let bytes = bytemuck::bytes_of(&uniforms);
            staging[start..start + bytes.len()].copy_from_slice(bytes);
        }
        self.queue.write_buffer(&self.object_buffer, 0, &staging);

        if let Some(batch) = frame.particles {
            self.write_instances(&batch.instances);
        }
        draw_count
    }

    fn write_instances(&mut self, instances: &[ParticleInstance]) {
        if instances.is_empty() {
            return;
        }
        let fits = matches!(&self.instance_buffer, Some((_, capacity)) if *capacity >= instances.len());
        if fits {
            if let Some((buffer, _)) = &self.instance_buffer {
                self.queue
                    .write_buffer(buffer, 0, bytemuck::cast_slice(instances));
            }
        } else {
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Particle Instance Buffer"),
                    contents: bytemuck::cast_slice(instances),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
            self.instance_buffer = Some((buffer, instances.len()));
        }
    }

    /// Bind group for `handle`, or the white texture when there is none
    fn texture_bind_group(&self, handle: Option<TextureHandle>) -> Option<&wgpu::BindGroup> {
        let handle = handle.unwrap_or(self.white_texture);
        self.textures.get(handle.0).map(|t| &t.bind_group)
    }

    /// Render one frame
    pub fn render(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        let draw_count = self.write_frame_data(frame);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b] = self.render_config.clear_colour;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (i, call) in frame.calls.iter().take(draw_count).enumerate() {
                let (Some(mesh), Some(texture)) = (
                    self.meshes.get(call.mesh.0),
                    self.texture_bind_group(call.texture),
                ) else {
                    log::error!("Skipping draw with unknown handle: {call:?}");
                    continue;
                };
                let pipeline = match call.draw_mode {
                    DrawMode::Points => &self.mesh_pipelines[0],
                    DrawMode::Lines => &self.mesh_pipelines[1],
                    DrawMode::Fill => &self.mesh_pipelines[2],
                };
                render_pass.set_pipeline(pipeline);
                let offset = (i as u64 * OBJECT_STRIDE) as wgpu::DynamicOffset;
                render_pass.set_bind_group(1, &self.object_bind_group, &[offset]);
                render_pass.set_bind_group(2, texture, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));

                match call.draw_mode {
                    DrawMode::Points => render_pass.draw(0..mesh.vertex_count, 0..1),
                    DrawMode::Lines if mesh.line_count > 0 => {
                        render_pass
                            .set_index_buffer(mesh.line_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..mesh.line_count, 0, 0..1);
                    }
                    DrawMode::Fill if mesh.index_count > 0 => {
                        render_pass
                            .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                    }
                    _ => {}
                }
            }

            if let (Some(batch), Some((buffer, _))) = (frame.particles, &self.instance_buffer) {
                let sprite = self.texture_bind_group(Some(batch.texture));
                if let (false, Some(sprite)) = (batch.instances.is_empty(), sprite) {
                    render_pass.set_pipeline(&self.particle_pipeline);
                    render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
                    render_pass.set_bind_group(1, sprite, &[]);
                    render_pass.set_vertex_buffer(0, buffer.slice(..));
                    render_pass.draw(0..6, 0..batch.instances.len() as u32);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl UploadBackend for RenderSystem {
    type Error = RenderError;
}

impl UploadMesh for RenderSystem {
    type MeshHandle = MeshHandle;

    fn upload_mesh(&mut self, mesh: &Mesh) -> Result<MeshHandle, RenderError> {
        let gpu_mesh = self.create_gpu_mesh(mesh);
        self.meshes.push(gpu_mesh);
        log::debug!(
            "Uploaded mesh {}: {} vertices, {} triangles",
            self.meshes.len() - 1,
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        Ok(MeshHandle(self.meshes.len() - 1))
    }

    fn update_mesh(&mut self, handle: &MeshHandle, mesh: &Mesh) -> Result<(), RenderError> {
        if handle.0 >= self.meshes.len() {
            return Err(RenderError::UnknownHandle {
                kind: "mesh",
                index: handle.0,
            });
        }
        // Dropping the old GpuMesh releases its buffers
        self.meshes[handle.0] = self.create_gpu_mesh(mesh);
        log::debug!(
            "Replaced mesh {}: {} vertices, {} triangles",
            handle.0,
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        Ok(())
    }
}

impl RenderSystem {
    fn create_gpu_mesh(&self, mesh: &Mesh) -> GpuMesh {
        let lines = mesh.line_indices();
        let buffer = |label: &str, contents: &[u8], usage: wgpu::BufferUsages| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage,
                })
        };

        GpuMesh {
            vertex_buffer: buffer(
                "Vertex Buffer",
                bytemuck::cast_slice(&mesh.vertices),
                wgpu::BufferUsages::VERTEX,
            ),
            index_buffer: buffer(
                "Index Buffer",
                bytemuck::cast_slice(&mesh.indices),
                wgpu::BufferUsages::INDEX,
            ),
            index_count: mesh.indices.len() as u32,
            line_buffer: buffer(
                "Line Index Buffer",
                bytemuck::cast_slice(&lines),
                wgpu::BufferUsages::INDEX,
            ),
            line_count: lines.len() as u32,
            vertex_count: mesh.vertices.len() as u32,
        }
    }
}

impl UploadTexture for RenderSystem {
    type TextureHandle = TextureHandle;

    fn upload_texture(&mut self, data: &TextureData) -> Result<TextureHandle, RenderError> {
        let size = wgpu::Extent3d {
            width: data.width(),
            height: data.height(),
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        self.textures.push(GpuTexture {
            texture,
            bind_group,
            width: data.width(),
            height: data.height(),
        });
        let handle = TextureHandle(self.textures.len() - 1);
        self.update_texture(&handle, data)?;
        Ok(handle)
    }

    fn update_texture(
        &mut self,
        handle: &TextureHandle,
        data: &TextureData,
    ) -> Result<(), RenderError> {
        let gpu = self.textures.get(handle.0).ok_or(RenderError::UnknownHandle {
            kind: "texture",
            index: handle.0,
        })?;
        if (gpu.width, gpu.height) != (data.width(), data.height()) {
            return Err(RenderError::TextureSize {
                width: gpu.width,
                height: gpu.height,
                new_width: data.width(),
                new_height: data.height(),
            });
        }

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &gpu.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data.rgba(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * data.width()),
                rows_per_image: Some(data.height()),
            },
            wgpu::Extent3d {
                width: data.width(),
                height: data.height(),
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layouts_match_wgsl() {
        // mat4 + mat4 + vec4 + vec4
        assert_eq!(std::mem::size_of::<Globals>(), 160);
        // mat4 + mat3x3 (three 16-byte columns) + vec4<u32>
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 128);
        assert!(std::mem::size_of::<ObjectUniforms>() as u64 <= OBJECT_STRIDE);
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);
    }

    fn call(shade_mode: ShadeMode, attenuation: bool) -> DrawCall<MeshHandle, TextureHandle> {
        DrawCall {
            mesh: MeshHandle(0),
            texture: None,
            model: Mat4::IDENTITY,
            normal_matrix: Mat3::from_cols(Vec3::X, Vec3::Y * 2.0, Vec3::Z * 3.0),
            emissive: true,
            vertex_colours: false,
            attenuation,
            shade_mode,
            draw_mode: DrawMode::Fill,
        }
    }

    #[test]
    fn object_uniforms_pad_normal_matrix_columns() {
        let uniforms = ObjectUniforms::new(&call(ShadeMode::PerFragment, false));
        assert_eq!(uniforms.normal_matrix[1], [0.0, 2.0, 0.0, 0.0]);
        assert_eq!(uniforms.flags, [1, 0, 0, 0]);
    }

    #[test]
    fn lighting_flags_fill_z_and_w() {
        let uniforms = ObjectUniforms::new(&call(ShadeMode::PerVertex, true));
        assert_eq!(uniforms.flags, [1, 0, 1, 1]);
    }
}

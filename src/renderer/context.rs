//! Main renderer implementation

use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::lights::LightStorage;
use super::mesh::{Mesh, ShapeParts, Vertex};
use super::shadow::{ShadowConfig, ShadowMap};
use super::texture::{Texture, TextureError, TextureSlots};
use super::uniforms::{GlobalUniform, ObjectUniform};
use crate::core::EngineError;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// One draw of a mesh with its per-object uniforms
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub mesh: &'a Mesh,
    /// Cylinder pieces to draw; ignored by meshes without sections
    pub parts: ShapeParts,
    /// Bind group from [`Renderer::create_object_bind_group`]
    pub object: &'a wgpu::BindGroup,
    /// Texture slot; `None` binds a white texture
    pub texture: Option<usize>,
    /// Blend over the opaque scene without writing depth
    pub translucent: bool,
}

/// A registered texture and the bind group that samples it
struct LoadedTexture {
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Main renderer
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    globals: GlobalUniform,
    globals_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    object_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    textures: TextureSlots<LoadedTexture>,
    _white_texture: Texture,
    white_bind_group: wgpu::BindGroup,
    shadow_map: ShadowMap,
    shadow_bind_group: wgpu::BindGroup,
    shadow_pass_bind_group: wgpu::BindGroup,
    /// Clear color
    pub clear_color: wgpu::Color,
}

impl Renderer {
    /// Create a new renderer
    ///
    /// # Errors
    ///
    /// Fails when no surface, adapter or device can be obtained
    pub async fn new(
        window: Arc<Window>,
        vsync: bool,
        shadow_config: ShadowConfig,
    ) -> Result<Self, EngineError> {
        let size = window.inner_size();
        let size = (size.width.max(1), size.height.max(1));

        // Create instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(EngineError::NoAdapter)?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Mug Scene Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.0,
            height: size.1,
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (depth_texture, depth_view) = Self::create_depth_texture(&device, size.0, size.1);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
        });

        // Globals and lights
        let globals = GlobalUniform::new();
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::bytes_of(&LightStorage::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let global_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Global Bind Group Layout"),
                entries: &[
                    // Camera and animation
                    uniform_layout_entry(
                        0,
                        wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ),
                    // Lights
                    uniform_layout_entry(1, wgpu::ShaderStages::FRAGMENT),
                ],
            });

        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &global_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        // Shared by the main and shadow pipelines
        let object_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Object Bind Group Layout"),
                entries: &[uniform_layout_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });

        let texture_bind_group_layout = Texture::bind_group_layout(&device);
        let white_texture = Texture::white(&device, &queue);
        let white_bind_group =
            white_texture.create_bind_group(&device, &texture_bind_group_layout);

        // Shadow map
        let shadow_map = ShadowMap::new(&device, shadow_config);
        let shadow_bind_group_layout = ShadowMap::bind_group_layout(&device);
        let shadow_bind_group = shadow_map.create_bind_group(&device, &shadow_bind_group_layout);
        let shadow_pass_layout = ShadowMap::pass_bind_group_layout(&device);
        let shadow_pass_bind_group =
            shadow_map.create_pass_bind_group(&device, &shadow_pass_layout);

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[
                    &global_bind_group_layout,
                    &object_bind_group_layout,
                    &texture_bind_group_layout,
                    &shadow_bind_group_layout,
                ],
                push_constant_ranges: &[],
            });

        let opaque_pipeline = Self::create_scene_pipeline(
            &device,
            &render_pipeline_layout,
            &shader,
            config.format,
            SceneBlend::Opaque,
        );
        let transparent_pipeline = Self::create_scene_pipeline(
            &device,
            &render_pipeline_layout,
            &shader,
            config.format,
            SceneBlend::Translucent,
        );

        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow Pipeline Layout"),
                bind_group_layouts: &[&shadow_pass_layout, &object_bind_group_layout],
                push_constant_ranges: &[],
            });

        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            opaque_pipeline,
            transparent_pipeline,
            shadow_pipeline,
            _depth_texture: depth_texture,
            depth_view,
            globals,
            globals_buffer,
            lights_buffer,
            global_bind_group,
            object_bind_group_layout,
            texture_bind_group_layout,
            textures: TextureSlots::new(),
            _white_texture: white_texture,
            white_bind_group,
            shadow_map,
            shadow_bind_group,
            shadow_pass_bind_group,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
        })
    }

    fn create_scene_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        blend: SceneBlend,
    ) -> wgpu::RenderPipeline {
        let (label, blend_state, depth_write_enabled) = match blend {
            SceneBlend::Opaque => ("Opaque Pipeline", wgpu::BlendState::REPLACE, true),
            SceneBlend::Translucent => (
                "Transparent Pipeline",
                wgpu::BlendState::ALPHA_BLENDING,
                false,
            ),
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(blend_state),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Both faces are drawn; the fragment shader flips back-face normals
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        (texture, view)
    }

    /// Resize the renderer
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);

            // Recreate depth texture
            let (depth_texture, depth_view) =
                Self::create_depth_texture(&self.device, width, height);
            self._depth_texture = depth_texture;
            self.depth_view = depth_view;

            log::debug!("Resized to {}x{}", width, height);
        }
    }

    /// Upload a mesh to GPU; meshes already uploaded are left alone
    pub fn upload_mesh(&self, mesh: &mut Mesh) {
        if mesh.is_uploaded() || mesh.vertices.is_empty() || mesh.indices.is_empty() {
            return;
        }

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        mesh.vertex_buffer = Some(vertex_buffer);
        mesh.index_buffer = Some(index_buffer);
    }

    /// Load an image file into the next free texture slot under `tag`
    ///
    /// # Errors
    ///
    /// Fails if the tag is taken, the table is full, or the image cannot be
    /// loaded
    pub fn load_texture(
        &mut self,
        path: impl AsRef<Path>,
        tag: &str,
    ) -> Result<usize, TextureError> {
        if self.textures.find_slot(tag).is_some() {
            return Err(TextureError::DuplicateTag(tag.to_owned()));
        }

        let texture = Texture::from_path(&self.device, &self.queue, path, Some(tag))?;
        let bind_group = texture.create_bind_group(&self.device, &self.texture_bind_group_layout);
        self.textures.register(
            tag,
            LoadedTexture {
                _texture: texture,
                bind_group,
            },
        )
    }

    /// Slot of a loaded texture
    pub fn texture_slot(&self, tag: &str) -> Option<usize> {
        self.textures.find_slot(tag)
    }

    /// Number of loaded textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn texture_bind_group(&self, slot: Option<usize>) -> &wgpu::BindGroup {
        slot.and_then(|slot| self.textures.get(slot))
            .map_or(&self.white_bind_group, |loaded| &loaded.bind_group)
    }

    /// Create an object bind group for rendering
    pub fn create_object_bind_group(
        &self,
        uniform: &ObjectUniform,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Object Buffer"),
                contents: bytemuck::bytes_of(uniform),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: &self.object_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        (buffer, bind_group)
    }

    /// Per-frame uniforms, written to the GPU at the start of each frame
    pub fn globals_mut(&mut self) -> &mut GlobalUniform {
        &mut self.globals
    }

    /// Upload the light block
    pub fn set_lights(&self, lights: &LightStorage) {
        self.queue
            .write_buffer(&self.lights_buffer, 0, bytemuck::bytes_of(lights));
    }

    /// Aim the shadow camera along the spotlight
    pub fn update_shadow(&mut self, position: Vec3, direction: Vec3) {
        self.shadow_map
            .update_for_spot_light(&self.queue, position, direction);
    }

    /// Render one frame: shadow depth pass, then opaque draws, then
    /// translucent draws in list order
    pub fn render_frame(&self, items: &[DrawItem<'_>]) {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&self.globals));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            shadow_pass.set_pipeline(&self.shadow_pipeline);
            shadow_pass.set_bind_group(0, &self.shadow_pass_bind_group, &[]);
            for item in items {
                shadow_pass.set_bind_group(1, item.object, &[]);
                draw_ranges(&mut shadow_pass, item);
            }
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
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

            render_pass.set_bind_group(0, &self.global_bind_group, &[]);
            render_pass.set_bind_group(3, &self.shadow_bind_group, &[]);

            for (pipeline, translucent) in [
                (&self.opaque_pipeline, false),
                (&self.transparent_pipeline, true),
            ] {
                render_pass.set_pipeline(pipeline);
                for item in items.iter().filter(|item| item.translucent == translucent) {
                    render_pass.set_bind_group(1, item.object, &[]);
                    render_pass.set_bind_group(2, self.texture_bind_group(item.texture), &[]);
                    draw_ranges(&mut render_pass, item);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

#[derive(Debug, Clone, Copy)]
enum SceneBlend {
    Opaque,
    Translucent,
}

fn uniform_layout_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Bind the item's mesh and draw each selected index range
fn draw_ranges(pass: &mut wgpu::RenderPass<'_>, item: &DrawItem<'_>) {
    let (Some(vertex_buffer), Some(index_buffer)) =
        (&item.mesh.vertex_buffer, &item.mesh.index_buffer)
    else {
        return;
    };

    pass.set_vertex_buffer(0, vertex_buffer.slice(..));
    pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    for range in item.mesh.index_ranges(item.parts) {
        pass.draw_indexed(range, 0, 0..1);
    }
}

use super::vertex::{Mesh, Uniforms, Vertex};
use super::{FrameTarget, Lighting};
use crate::error::RenderError;
use crate::scene::{PerspectiveCamera, SceneGraph, SceneObject, Side, TextureData};
use std::collections::HashMap;
use wgpu::util::DeviceExt;
use web_sys::HtmlCanvasElement;

/// MSAA sample count for anti-aliasing (1 = disabled, 4 = recommended)
const MSAA_SAMPLES: u32 = 4;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

#[cfg(target_arch = "wasm32")]
fn canvas_target(canvas: HtmlCanvasElement) -> Result<wgpu::SurfaceTarget<'static>, RenderError> {
    Ok(wgpu::SurfaceTarget::Canvas(canvas))
}

// native builds only exist for unit tests
#[cfg(not(target_arch = "wasm32"))]
fn canvas_target(_canvas: HtmlCanvasElement) -> Result<wgpu::SurfaceTarget<'static>, RenderError> {
    Err(RenderError::Surface("canvas surfaces need a browser".to_string()))
}

/// Mesh uploaded to GPU buffers
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// One pipeline per face-culling mode
struct Pipelines {
    front: wgpu::RenderPipeline,
    back: wgpu::RenderPipeline,
    double: wgpu::RenderPipeline,
}

impl Pipelines {
    fn for_side(&self, side: Side) -> &wgpu::RenderPipeline {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
            Side::Double => &self.double,
        }
    }
}

/// GPU renderer using wgpu
/// Handles WebGL initialization and draws the scene graph with a perspective camera
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipelines: Pipelines,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white_texture: wgpu::BindGroup,
    msaa_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    meshes: HashMap<u64, GpuMesh>,
    textures: HashMap<u64, wgpu::BindGroup>,
    lighting: Lighting,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Create a new renderer attached to an HTML canvas element
    pub async fn new(canvas: HtmlCanvasElement, lighting: Lighting) -> Result<Self, RenderError> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        // WebGL2 only; WebGPU support in browsers is still patchy for wgpu 22
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(canvas_target(canvas)?)
            .map_err(|e| RenderError::Surface(e.to_string()))?;

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
                    label: Some("Scene Renderer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Device(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);

        // Non-sRGB target: palette colors are already sRGB and pass straight through
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::Surface("surface reports no formats".to_string()))?;

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let msaa_view = Self::create_attachment(&device, width, height, surface_format, "MSAA Texture");
        let depth_view = Self::create_attachment(&device, width, height, DEPTH_FORMAT, "Depth Texture");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[Uniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

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
            label: Some("Texture Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipelines = Pipelines {
            front: Self::create_pipeline(&device, &pipeline_layout, &shader, surface_format, Some(wgpu::Face::Back)),
            back: Self::create_pipeline(&device, &pipeline_layout, &shader, surface_format, Some(wgpu::Face::Front)),
            double: Self::create_pipeline(&device, &pipeline_layout, &shader, surface_format, None),
        };

        let white = TextureData {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        };
        let white_texture = Self::create_texture_bind_group(&device, &queue, &texture_layout, &sampler, &white);

        log::info!("renderer ready: {}x{} {:?}", width, height, surface_format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipelines,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            sampler,
            white_texture,
            msaa_view,
            depth_view,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            lighting,
            width,
            height,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        cull_mode: Option<wgpu::Face>,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Render Pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
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
            multisample: wgpu::MultisampleState {
                count: MSAA_SAMPLES,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    /// Multisampled render attachment (color or depth) at the surface size
    fn create_attachment(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: MSAA_SAMPLES,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_texture_bind_group(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        data: &TextureData,
    ) -> wgpu::BindGroup {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("Object Texture"),
                size: wgpu::Extent3d {
                    width: data.width,
                    height: data.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data.pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn upload_mesh(&self, mesh: &Mesh) -> GpuMesh {
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    /// Bring GPU resources in line with the scene's dirty and removed objects
    fn sync(&mut self, scene: &SceneGraph) {
        for id in scene.removed_object_ids() {
            self.meshes.remove(id);
            self.textures.remove(id);
        }

        for &id in scene.dirty_object_ids() {
            let Some(object) = scene.get(id) else {
                continue;
            };

            if object.mesh.is_empty() {
                self.meshes.remove(&id);
            } else {
                let gpu_mesh = self.upload_mesh(&object.mesh);
                self.meshes.insert(id, gpu_mesh);
            }

            match &object.material.texture {
                Some(texture) => {
                    let bind_group = Self::create_texture_bind_group(
                        &self.device,
                        &self.queue,
                        &self.texture_layout,
                        &self.sampler,
                        texture,
                    );
                    self.textures.insert(id, bind_group);
                }
                None => {
                    self.textures.remove(&id);
                }
            }
        }
    }

    fn object_uniforms(&self, object: &SceneObject, view_proj: [[f32; 4]; 4]) -> Uniforms {
        let light = self.lighting.direction;
        Uniforms {
            view_proj,
            model: object.transform.to_matrix().to_cols_array_2d(),
            tint: object.material.color.to_array(),
            light: [light.x, light.y, light.z, self.lighting.intensity],
            params: [
                if object.material.unlit { 1.0 } else { 0.0 },
                self.lighting.ambient,
                0.0,
                0.0,
            ],
        }
    }
}

impl FrameTarget for Renderer {
    /// Resize the surface and its attachments when the canvas size changes
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 && (width != self.width || height != self.height) {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);

            self.msaa_view =
                Self::create_attachment(&self.device, width, height, self.config.format, "MSAA Texture");
            self.depth_view = Self::create_attachment(&self.device, width, height, DEPTH_FORMAT, "Depth Texture");
        }
    }

    fn draw(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.sync(scene);

        let output = self
            .surface
            .get_current_texture()
            .map_err(|e| RenderError::Frame(e.to_string()))?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let view_proj = camera.view_projection().to_cols_array_2d();

        let drawable: Vec<&SceneObject> = scene
            .draw_order()
            .filter(|object| self.meshes.contains_key(&object.id))
            .collect();
        let total = drawable.len();

        // First pass: clear color and depth
        {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Clear Encoder"),
                });

            {
                let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Clear Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &self.msaa_view,
                        // Resolve immediately if nothing else will be drawn
                        resolve_target: if total == 0 { Some(&view) } else { None },
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.lighting.background.to_wgpu()),
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
            }

            self.queue.submit(std::iter::once(encoder.finish()));
        }

        // Each object needs its own submit because the uniform buffer is shared
        for (i, object) in drawable.iter().enumerate() {
            let Some(gpu_mesh) = self.meshes.get(&object.id) else {
                continue;
            };
            let is_last = i == total - 1;

            let uniforms = self.object_uniforms(object, view_proj);
            self.queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

            let texture = self.textures.get(&object.id).unwrap_or(&self.white_texture);

            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Object Encoder"),
                });

            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Object Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &self.msaa_view,
                        resolve_target: if is_last { Some(&view) } else { None },
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: if is_last {
                                wgpu::StoreOp::Discard // MSAA samples discarded after resolve
                            } else {
                                wgpu::StoreOp::Store
                            },
                        },
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                render_pass.set_pipeline(self.pipelines.for_side(object.material.side));
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_bind_group(1, texture, &[]);
                render_pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
            }

            self.queue.submit(std::iter::once(encoder.finish()));
        }

        output.present();

        Ok(())
    }
}

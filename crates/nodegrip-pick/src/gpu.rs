#![forbid(unsafe_code)]

//! `wgpu` render target for the pick pass (feature `gpu`).
//!
//! Every mirrored instance is drawn as an instanced, unlit, camera-facing
//! disc into a 1×1 `Rgba8Unorm` texture through [`Camera::pick_projection`],
//! with a depth buffer so the nearest instance wins. The single texel is
//! copied into a mappable buffer and read back with a blocking device poll.
//!
//! Instance data is uploaded only when the [`OffscreenScene`] revision
//! changes; a pick with an unchanged scene writes 96 bytes of uniforms,
//! submits one pass and maps 256 bytes.

use std::sync::mpsc;

use nodegrip_core::Camera;
use tracing::{debug, trace};

use crate::error::PickError;
use crate::scene::OffscreenScene;
use crate::target::PickTarget;

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const PIXEL: wgpu::Extent3d = wgpu::Extent3d {
    width: 1,
    height: 1,
    depth_or_array_layers: 1,
};

/// `center.xyz, radius, r, g, b, 1`.
type InstanceData = [f32; 8];
const INSTANCE_STRIDE: u64 = std::mem::size_of::<InstanceData>() as u64;
const MIN_INSTANCE_BYTES: u64 = INSTANCE_STRIDE * 256;

/// `view_proj` (16), `right` (4), `up` (4).
type UniformData = [f32; 24];

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4];

fn unavailable(err: impl std::fmt::Display) -> PickError {
    PickError::ReadbackUnavailable(err.to_string())
}

/// GPU pick target backed by `wgpu`.
pub struct GpuPickTarget {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    readback: wgpu::Buffer,
    instances: Option<wgpu::Buffer>,
    instance_capacity: u64,
    instance_count: u32,
    uploaded_revision: Option<u64>,
    staging: Vec<InstanceData>,
}

impl std::fmt::Debug for GpuPickTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuPickTarget")
            .field("instance_count", &self.instance_count)
            .field("instance_capacity", &self.instance_capacity)
            .field("uploaded_revision", &self.uploaded_revision)
            .finish_non_exhaustive()
    }
}

impl GpuPickTarget {
    /// Open a headless adapter and device of its own.
    ///
    /// Fails with [`PickError::ReadbackUnavailable`] when no adapter or
    /// device can be obtained.
    pub fn new() -> Result<Self, PickError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(unavailable)?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("nodegrip pick device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
        }))
        .map_err(unavailable)?;

        debug!(adapter = ?adapter.get_info().name, "gpu pick target ready");
        Ok(Self::with_device(device, queue))
    }

    /// Render on a device the host already owns.
    #[must_use]
    pub fn with_device(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let shader = device.create_shader_module(wgpu::include_wgsl!("pick.wgsl"));

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pick uniforms"),
            size: std::mem::size_of::<UniformData>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pick uniforms layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pick uniforms"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pick pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pick pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: INSTANCE_STRIDE,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &INSTANCE_ATTRIBUTES,
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Screen-space cameras flip y, which flips winding.
                cull_mode: None,
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
        });

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pick color"),
            size: PIXEL,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pick depth"),
            size: PIXEL,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        // Texture-to-buffer copies need 256-byte rows.
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pick readback"),
            size: u64::from(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            device,
            queue,
            pipeline,
            uniforms,
            bind_group,
            color,
            color_view,
            depth_view,
            readback,
            instances: None,
            instance_capacity: 0,
            instance_count: 0,
            uploaded_revision: None,
            staging: Vec::new(),
        }
    }

    /// Instances currently resident on the GPU.
    #[must_use]
    pub fn uploaded_instances(&self) -> u32 {
        self.instance_count
    }

    fn upload_scene(&mut self, scene: &OffscreenScene) {
        if self.uploaded_revision == Some(scene.revision()) {
            return;
        }
        self.staging.clear();
        for group in scene.groups() {
            for (_, transform, color) in group.instances() {
                let p = transform.position;
                let [r, g, b] = color.to_unit_rgb();
                self.staging
                    .push([p.x, p.y, p.z, transform.radius(), r, g, b, 1.0]);
            }
        }

        let bytes: &[u8] = bytemuck::cast_slice(&self.staging);
        let needed = bytes.len() as u64;
        if needed > self.instance_capacity {
            let capacity = needed.next_power_of_two().max(MIN_INSTANCE_BYTES);
            self.instances = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("pick instances"),
                size: capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.instance_capacity = capacity;
            trace!(capacity, "pick instance buffer grown");
        }
        if let Some(buffer) = &self.instances
            && !bytes.is_empty()
        {
            self.queue.write_buffer(buffer, 0, bytes);
        }

        self.instance_count = u32::try_from(self.staging.len()).unwrap_or(u32::MAX);
        self.uploaded_revision = Some(scene.revision());
        trace!(
            instances = self.instance_count,
            revision = scene.revision(),
            "pick instances uploaded"
        );
    }

    fn write_uniforms(&self, camera: &Camera, x: f32, y: f32) {
        let matrix = camera.pick_projection(x, y) * camera.view();
        let mut data: UniformData = [0.0; 24];
        data[..16].copy_from_slice(&matrix.to_cols_array());
        data[16..19].copy_from_slice(&camera.right().to_array());
        data[20..23].copy_from_slice(&camera.up().to_array());
        self.queue
            .write_buffer(&self.uniforms, 0, bytemuck::cast_slice(&data));
    }

    fn encode_pass(&self) -> wgpu::CommandBuffer {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pick encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pick pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if let Some(instances) = &self.instances
                && self.instance_count > 0
            {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.bind_group, &[]);
                pass.set_vertex_buffer(0, instances.slice(..));
                pass.draw(0..6, 0..self.instance_count);
            }
        }
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
                    rows_per_image: Some(1),
                },
            },
            PIXEL,
        );
        encoder.finish()
    }

    fn read_back(&self) -> Result<[u8; 4], PickError> {
        let slice = self.readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(unavailable)?;
        rx.recv().map_err(unavailable)?.map_err(unavailable)?;

        let rgba = {
            let texel = slice.get_mapped_range();
            [texel[0], texel[1], texel[2], texel[3]]
        };
        self.readback.unmap();
        Ok(rgba)
    }
}

impl PickTarget for GpuPickTarget {
    fn render_pixel(
        &mut self,
        scene: &OffscreenScene,
        camera: &Camera,
        x: f32,
        y: f32,
    ) -> Result<[u8; 4], PickError> {
        self.upload_scene(scene);
        self.write_uniforms(camera, x, y);
        self.queue.submit(Some(self.encode_pass()));
        let rgba = self.read_back()?;
        trace!(x, y, instances = self.instance_count, "gpu pick pass");
        Ok(rgba)
    }

    fn dispose(&mut self) {
        if let Some(buffer) = self.instances.take() {
            buffer.destroy();
        }
        self.instance_capacity = 0;
        self.instance_count = 0;
        self.uploaded_revision = None;
        self.staging = Vec::new();
    }
}

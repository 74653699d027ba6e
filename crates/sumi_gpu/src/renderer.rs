//! GPU stroke renderer
//!
//! Device setup, layer textures, and the three-stage stroke pipeline:
//! Bezier expansion (compute), watercolor mixing (compute), and quad
//! rasterization (render). The host can run all three stages itself via
//! `sumi_brush`; this module is the device branch for platforms where the
//! expansion and mix should stay on the GPU.

use bytemuck::{Pod, Zeroable};
use sumi_brush::{AddressMode, BezierInterpolator, FilterMode, LayerContext, PixelBuffer, SamplerOptions, Stroke};
use sumi_core::Vec3;

use crate::buffer::DynamicBuffer;
use crate::shaders;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("no suitable GPU adapter found")]
    AdapterNotFound,

    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
}

/// Headless GPU device handle shared by every renderer resource.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquire a device without a surface, for offscreen layer rendering.
    pub fn headless() -> Result<Self, RendererError> {
        pollster::block_on(Self::headless_async())
    }

    async fn headless_async() -> Result<Self, RendererError> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::AdapterNotFound)?;

        tracing::info!(adapter = ?adapter.get_info().name, "acquired GPU adapter");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Sumi Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;

        Ok(Self { device, queue })
    }
}

/// Uniform mirror of the Bezier shader's `InterpolateParams` block.
///
/// Control points carry layer-pixel x/y with pressure in z; 96 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct InterpolateParams {
    p0: [f32; 4],
    p1: [f32; 4],
    p2: [f32; 4],
    p3: [f32; 4],
    color: [f32; 4],
    delta: f32,
    count: u32,
    _pad: [u32; 2],
}

/// Uniform mirror of the watercolor shader's `MixParams` block; 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct MixParams {
    pickup_rate: f32,
    count: u32,
    _pad: [u32; 2],
}

const _: () = {
    use std::mem::size_of;
    assert!(size_of::<InterpolateParams>() == 96);
    assert!(size_of::<MixParams>() == 16);
};

fn address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        AddressMode::Repeat => wgpu::AddressMode::Repeat,
        AddressMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}

fn filter_mode(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Bilinear => wgpu::FilterMode::Linear,
    }
}

/// One drawable layer: an Rgba texture plus its render view.
pub struct LayerTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl LayerTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Layer Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Upload host pixels, converting f32 texels to 8-bit.
    pub fn upload(&self, queue: &wgpu::Queue, pixels: &PixelBuffer) {
        let mut data = Vec::with_capacity((self.width * self.height * 4) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                for channel in pixels.get(x, y).to_array() {
                    data.push((channel.clamp(0.0, 1.0) * 255.0).round() as u8);
                }
            }
        }

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Renders stroke batches onto layer textures.
///
/// Owns the stroke storage buffer shared by all three stages, the uniform
/// buffers for the per-stage params, and the storage cell holding the mixed
/// current color between batches.
pub struct StrokeRenderer {
    context_buffer: wgpu::Buffer,
    interpolate_buffer: wgpu::Buffer,
    mix_buffer: wgpu::Buffer,
    current_color_buffer: wgpu::Buffer,
    stroke_buffer: DynamicBuffer,
    sampler: wgpu::Sampler,

    brush_layout: wgpu::BindGroupLayout,
    bezier_layout: wgpu::BindGroupLayout,
    watercolor_layout: wgpu::BindGroupLayout,

    brush_pipeline: wgpu::RenderPipeline,
    bezier_pipeline: wgpu::ComputePipeline,
    init_color_pipeline: wgpu::ComputePipeline,
    mix_color_pipeline: wgpu::ComputePipeline,

    stroke_count: u32,
}

/// Room for one typical interpolated window before the buffer grows.
const INITIAL_STROKE_CAPACITY: u64 = 256 * std::mem::size_of::<Stroke>() as u64;

impl StrokeRenderer {
    pub fn new(device: &wgpu::Device, sampler_options: &SamplerOptions) -> Self {
        let context_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Layer Context"),
            size: std::mem::size_of::<LayerContext>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let interpolate_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Interpolate Params"),
            size: std::mem::size_of::<InterpolateParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mix_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mix Params"),
            size: std::mem::size_of::<MixParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let current_color_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Current Color"),
            size: 16,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let stroke_buffer = DynamicBuffer::new(
            device,
            "Stroke Buffer",
            INITIAL_STROKE_CAPACITY,
            wgpu::BufferUsages::STORAGE,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Layer Sampler"),
            address_mode_u: address_mode(sampler_options.address_mode),
            address_mode_v: address_mode(sampler_options.address_mode),
            address_mode_w: address_mode(sampler_options.address_mode),
            mag_filter: filter_mode(sampler_options.filter_mode),
            min_filter: filter_mode(sampler_options.filter_mode),
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let brush_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Brush Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                storage_entry(1, wgpu::ShaderStages::VERTEX_FRAGMENT, true),
                texture_entry(2, wgpu::ShaderStages::FRAGMENT),
                sampler_entry(3, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let bezier_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bezier Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::COMPUTE),
                storage_entry(1, wgpu::ShaderStages::COMPUTE, false),
            ],
        });
        let watercolor_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Watercolor Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::COMPUTE),
                uniform_entry(1, wgpu::ShaderStages::COMPUTE),
                storage_entry(2, wgpu::ShaderStages::COMPUTE, true),
                storage_entry(3, wgpu::ShaderStages::COMPUTE, false),
                texture_entry(4, wgpu::ShaderStages::COMPUTE),
                sampler_entry(5, wgpu::ShaderStages::COMPUTE),
            ],
        });

        let brush_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Brush Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BRUSH_SHADER.into()),
        });
        let bezier_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bezier Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BEZIER_SHADER.into()),
        });
        let watercolor_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Watercolor Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::WATERCOLOR_SHADER.into()),
        });

        let brush_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Brush Pipeline Layout"),
                bind_group_layouts: &[&brush_layout],
                push_constant_ranges: &[],
            });
        let brush_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Brush Pipeline"),
            layout: Some(&brush_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &brush_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &brush_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: LayerTexture::FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let bezier_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Bezier Pipeline Layout"),
                bind_group_layouts: &[&bezier_layout],
                push_constant_ranges: &[],
            });
        let bezier_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Bezier Pipeline"),
            layout: Some(&bezier_pipeline_layout),
            module: &bezier_shader,
            entry_point: Some("cs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let watercolor_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Watercolor Pipeline Layout"),
                bind_group_layouts: &[&watercolor_layout],
                push_constant_ranges: &[],
            });
        let init_color_pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Init Current Color Pipeline"),
                layout: Some(&watercolor_pipeline_layout),
                module: &watercolor_shader,
                entry_point: Some("init_current_color"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });
        let mix_color_pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Mix Current Color Pipeline"),
                layout: Some(&watercolor_pipeline_layout),
                module: &watercolor_shader,
                entry_point: Some("mix_current_color"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });

        Self {
            context_buffer,
            interpolate_buffer,
            mix_buffer,
            current_color_buffer,
            stroke_buffer,
            sampler,
            brush_layout,
            bezier_layout,
            watercolor_layout,
            brush_pipeline,
            bezier_pipeline,
            init_color_pipeline,
            mix_color_pipeline,
            stroke_count: 0,
        }
    }

    pub fn stroke_count(&self) -> u32 {
        self.stroke_count
    }

    /// Push the host context into the uniform the shaders read.
    pub fn upload_context(&self, queue: &wgpu::Queue, context: &LayerContext) {
        queue.write_buffer(&self.context_buffer, 0, bytemuck::bytes_of(context));
        queue.write_buffer(
            &self.current_color_buffer,
            0,
            bytemuck::bytes_of(&context.current_color),
        );
    }

    /// Upload a host-interpolated stroke batch, replacing the buffer contents.
    pub fn upload_strokes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        strokes: &[Stroke],
    ) {
        self.stroke_buffer
            .write(device, queue, bytemuck::cast_slice(strokes));
        self.stroke_count = strokes.len() as u32;
    }

    /// Expand four control points into stroke samples on the GPU.
    ///
    /// Control points are layer-pixel positions with pressure in z, matching
    /// the host interpolator; the sample count rule is shared with it.
    pub fn interpolate(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        controls: [Vec3; 4],
        color: [f32; 4],
    ) {
        let [p0, p1, p2, p3] = controls;
        let length =
            p0.xy().distance(p1.xy()) + p1.xy().distance(p2.xy()) + p2.xy().distance(p3.xy());
        let count = BezierInterpolator::sample_count(length) as u32;
        tracing::trace!(length, count, "dispatch bezier interpolation");

        let params = InterpolateParams {
            p0: [p0.x, p0.y, p0.z, 0.0],
            p1: [p1.x, p1.y, p1.z, 0.0],
            p2: [p2.x, p2.y, p2.z, 0.0],
            p3: [p3.x, p3.y, p3.z, 0.0],
            color,
            delta: 1.0 / count as f32,
            count,
            _pad: [0; 2],
        };
        queue.write_buffer(&self.interpolate_buffer, 0, bytemuck::bytes_of(&params));

        let size = count as u64 * std::mem::size_of::<Stroke>() as u64;
        self.stroke_buffer.ensure_capacity(device, size);
        self.stroke_count = count;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bezier Bind Group"),
            layout: &self.bezier_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.interpolate_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.stroke_buffer.buffer().as_entire_binding(),
                },
            ],
        });

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Bezier Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.bezier_pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(count.div_ceil(64), 1, 1);
    }

    /// Run one watercolor pass over the current stroke batch.
    ///
    /// `initialize` selects the seeding entry point for the first batch of a
    /// session; later batches fold the canvas into the running color.
    pub fn mix(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        layer: &LayerTexture,
        pickup_rate: f32,
        initialize: bool,
    ) {
        let params = MixParams {
            pickup_rate,
            count: self.stroke_count,
            _pad: [0; 2],
        };
        queue.write_buffer(&self.mix_buffer, 0, bytemuck::bytes_of(&params));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Watercolor Bind Group"),
            layout: &self.watercolor_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.context_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.mix_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.stroke_buffer.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.current_color_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&layer.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Watercolor Pass"),
            timestamp_writes: None,
        });
        if initialize {
            pass.set_pipeline(&self.init_color_pipeline);
        } else {
            pass.set_pipeline(&self.mix_color_pipeline);
        }
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(1, 1, 1);
    }

    /// Rasterize the current stroke batch onto `target`.
    ///
    /// `canvas` is the layer texture sampled for color lookup; it must be a
    /// different texture than `target` since a texture cannot be sampled
    /// while bound as a render attachment.
    pub fn draw(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        canvas: &LayerTexture,
        target: &wgpu::TextureView,
    ) {
        if self.stroke_count == 0 {
            return;
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Brush Bind Group"),
            layout: &self.brush_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.context_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.stroke_buffer.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&canvas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Brush Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.brush_pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        // Six quad vertices per stroke instance.
        pass.draw(0..6, 0..self.stroke_count);
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
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

fn storage_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    read_only: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_params_layout() {
        assert_eq!(std::mem::size_of::<InterpolateParams>(), 96);
        assert_eq!(std::mem::size_of::<MixParams>(), 16);

        let params = InterpolateParams {
            p0: [1.0, 2.0, 0.5, 0.0],
            p1: [3.0, 4.0, 0.6, 0.0],
            p2: [5.0, 6.0, 0.7, 0.0],
            p3: [7.0, 8.0, 0.8, 0.0],
            color: [0.1, 0.2, 0.3, 1.0],
            delta: 0.25,
            count: 4,
            _pad: [0; 2],
        };
        let bytes = bytemuck::bytes_of(&params);
        // delta follows the five vec4 fields.
        let delta = f32::from_le_bytes(bytes[80..84].try_into().unwrap());
        assert_eq!(delta, 0.25);
        let count = u32::from_le_bytes(bytes[84..88].try_into().unwrap());
        assert_eq!(count, 4);
    }

    #[test]
    fn test_initial_stroke_capacity_is_stroke_aligned() {
        assert_eq!(
            INITIAL_STROKE_CAPACITY % std::mem::size_of::<Stroke>() as u64,
            0
        );
    }
}

//! GPU rendering implementation using wgpu
//!
//! Executes a frame's draw commands. Text is rasterized into a texture per
//! command; textures and vertex buffers live only until the frame is
//! presented and are released when [`PreparedDraw`] values drop.

use crate::error::{InitError, RenderError};
use crate::font::TextRasterizer;
use crate::layout::Rect;
use crate::render::DrawCommand;
use crate::theme;
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Vertex data for rectangles
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RectVertex {
    pub position: [f32; 2],
    pub color: u32,
}

/// Vertex data for text quads
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TextVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

/// Uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShaderUniforms {
    pub viewport_size: [f32; 2],
    pub _padding: [f32; 2], // Align to 16 bytes
}

/// The four 1px edges of an outlined rectangle
pub fn outline_edges(rect: Rect) -> [Rect; 4] {
    let Rect {
        x,
        y,
        width,
        height,
    } = rect;
    [
        Rect::new(x, y, width, 1.0),
        Rect::new(x, y + height - 1.0, width, 1.0),
        Rect::new(x, y, 1.0, height),
        Rect::new(x + width - 1.0, y, 1.0, height),
    ]
}

/// Two triangles covering `rect`, in the order (x1,y1) (x2,y1) (x1,y2) (x2,y1) (x2,y2) (x1,y2)
pub fn quad_corners(rect: Rect) -> [[f32; 2]; 6] {
    let (x1, y1, x2, y2) = (rect.x, rect.y, rect.right(), rect.bottom());
    [[x1, y1], [x2, y1], [x1, y2], [x2, y1], [x2, y2], [x1, y2]]
}

const QUAD_UVS: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [0.0, 1.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

/// A text image on the GPU, valid for one frame
struct TextTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    vertices: wgpu::Buffer,
}

/// Frame resources in paint order
enum PreparedDraw {
    Rects { vertices: wgpu::Buffer, count: u32 },
    Text(TextTexture),
}

/// GPU renderer that executes draw commands
pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,

    // Pipelines
    rect_pipeline: wgpu::RenderPipeline,
    text_pipeline: wgpu::RenderPipeline,

    // Uniform buffer
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    // Per-frame text textures bind against these
    text_bind_group_layout: wgpu::BindGroupLayout,
    text_sampler: wgpu::Sampler,

    scale_factor: f32,
}

impl GpuRenderer {
    pub async fn new(window: Arc<winit::window::Window>) -> Result<Self, InitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Tiny IDE Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let size = window.inner_size();
        let config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(InitError::SurfaceConfig)?;
        surface.configure(&device, &config);

        let rect_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Rectangle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/rect.wgsl").into()),
        });

        let text_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Text Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/text.wgsl").into()),
        });

        let text_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Text Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Uniform buffer for viewport size
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<ShaderUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let text_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Text Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
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

        let rect_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Rect Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let text_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Text Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &text_bind_group_layout],
            push_constant_ranges: &[],
        });

        let color_targets = [Some(wgpu::ColorTargetState {
            format: config.format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let rect_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Rect Pipeline"),
            layout: Some(&rect_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &rect_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<RectVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 8,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Uint32,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &rect_shader,
                entry_point: Some("fs_main"),
                targets: &color_targets,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let text_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Text Pipeline"),
            layout: Some(&text_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &text_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<TextVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 8,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &text_shader,
                entry_point: Some("fs_main"),
                targets: &color_targets,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            device,
            queue,
            surface,
            config,
            rect_pipeline,
            text_pipeline,
            uniform_buffer,
            uniform_bind_group,
            text_bind_group_layout,
            text_sampler,
            scale_factor: window.scale_factor() as f32,
        })
    }

    /// Execute one frame of draw commands and present it.
    ///
    /// Text that fails to rasterize is skipped; the rest of the frame still draws.
    pub fn render(
        &mut self,
        commands: &[DrawCommand],
        rasterizer: &mut TextRasterizer,
        logical_viewport: (f32, f32),
    ) -> Result<(), RenderError> {
        let uniforms = ShaderUniforms {
            viewport_size: [logical_viewport.0, logical_viewport.1],
            _padding: [0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut clear = theme::BLACK;
        let mut draws = Vec::with_capacity(commands.len());
        for command in commands {
            match command {
                DrawCommand::Clear(color) => clear = *color,
                DrawCommand::Outline { rect, color } => {
                    draws.push(self.prepare_rects(&outline_edges(*rect), *color));
                }
                DrawCommand::Text { text, x, y, color } => {
                    match self.prepare_text(rasterizer, text, *x, *y, *color) {
                        Ok(draw) => draws.push(draw),
                        Err(RenderError::EmptyText) => {}
                        Err(err) => tracing::warn!(%err, "skipping text draw"),
                    }
                }
            }
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(err) => {
                if matches!(err, wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) {
                    self.surface.configure(&self.device, &self.config);
                }
                return Err(err.into());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b, a] = theme::to_f64(clear);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            for draw in &draws {
                match draw {
                    PreparedDraw::Rects { vertices, count } => {
                        render_pass.set_pipeline(&self.rect_pipeline);
                        render_pass.set_vertex_buffer(0, vertices.slice(..));
                        render_pass.draw(0..*count, 0..1);
                    }
                    PreparedDraw::Text(text) => {
                        render_pass.set_pipeline(&self.text_pipeline);
                        render_pass.set_bind_group(1, &text.bind_group, &[]);
                        render_pass.set_vertex_buffer(0, text.vertices.slice(..));
                        render_pass.draw(0..QUAD_UVS.len() as u32, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn prepare_rects(&self, rects: &[Rect], color: u32) -> PreparedDraw {
        let vertices: Vec<RectVertex> = rects
            .iter()
            .flat_map(|rect| quad_corners(*rect))
            .map(|position| RectVertex { position, color })
            .collect();

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Rect Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        PreparedDraw::Rects {
            vertices: buffer,
            count: vertices.len() as u32,
        }
    }

    fn prepare_text(
        &self,
        rasterizer: &mut TextRasterizer,
        text: &str,
        x: f32,
        y: f32,
        color: u32,
    ) -> Result<PreparedDraw, RenderError> {
        // Anything past the right edge of the surface is never visible
        let max_width = self
            .config
            .width
            .min(self.device.limits().max_texture_dimension_2d);
        let image = rasterizer.rasterize(text, color, max_width)?;

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Text Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Text Bind Group"),
            layout: &self.text_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.text_sampler),
                },
            ],
        });

        // Images are rasterized at physical size; place them in logical space
        let quad = Rect::new(
            x,
            y,
            image.width as f32 / self.scale_factor,
            image.height as f32 / self.scale_factor,
        );
        let vertices: Vec<TextVertex> = quad_corners(quad)
            .into_iter()
            .zip(QUAD_UVS)
            .map(|(position, tex_coord)| TextVertex {
                position,
                tex_coord,
            })
            .collect();

        let vertices = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Text Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Ok(PreparedDraw::Text(TextTexture {
            _texture: texture,
            bind_group,
            vertices,
        }))
    }

    /// Resize surface when window changes
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>, scale_factor: f32) {
        self.scale_factor = scale_factor;
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_edges() {
        let edges = outline_edges(Rect::new(10.0, 150.0, 780.0, 440.0));
        assert_eq!(edges[0], Rect::new(10.0, 150.0, 780.0, 1.0));
        assert_eq!(edges[1], Rect::new(10.0, 589.0, 780.0, 1.0));
        assert_eq!(edges[2], Rect::new(10.0, 150.0, 1.0, 440.0));
        assert_eq!(edges[3], Rect::new(789.0, 150.0, 1.0, 440.0));
    }

    #[test]
    fn test_quad_corners_cover_rect() {
        let corners = quad_corners(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(corners[0], [1.0, 2.0]);
        assert_eq!(corners[4], [4.0, 6.0]);
    }

    #[test]
    fn test_vertex_layouts() {
        assert_eq!(std::mem::size_of::<RectVertex>(), 12);
        assert_eq!(std::mem::size_of::<TextVertex>(), 16);
        assert_eq!(std::mem::size_of::<ShaderUniforms>(), 16);
    }
}

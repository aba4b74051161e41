//! Rendering system: wgpu surface, pipeline, and bar quad generation.
//!
//! The core hands over raw amplitudes; everything pixel-shaped happens
//! here. Bar geometry is built on the CPU each frame (the buffer is at most
//! a couple hundred quads) and uploaded into a preallocated vertex buffer.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::error::VisError;
use crate::params::RenderConfig;

/// Vertex data for bar quads (clip-space position)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
}

/// Build clip-space quads for the visible bars, oldest-to-newest
/// left-to-right.
///
/// Slot `i` sits at `i * bar_pitch_px` with a fixed width; the bar extends
/// `value * height_scale` pixels above and below the vertical center,
/// clamped to the viewport. Four vertices per bar, matching the static
/// index buffer layout in [`RenderSystem`].
pub fn bar_vertices(bars: &[f32], config: &RenderConfig) -> Vec<Vertex> {
    let width = config.window_width as f32;
    let height = config.window_height as f32;
    let center_y = height / 2.0;

    let to_ndc_x = |x: f32| x / width * 2.0 - 1.0;
    let to_ndc_y = |y: f32| 1.0 - y / height * 2.0;

    let mut vertices = Vec::with_capacity(bars.len() * 4);

    for (i, &value) in bars.iter().enumerate() {
        let x0 = (i as u32 * config.bar_pitch_px) as f32;
        let x1 = x0 + config.bar_width_px as f32;

        let half = (value * config.height_scale).clamp(0.0, center_y);
        let y_top = center_y - half;
        let y_bottom = center_y + half;

        let (x0, x1) = (to_ndc_x(x0), to_ndc_x(x1));
        let (y_top, y_bottom) = (to_ndc_y(y_top), to_ndc_y(y_bottom));

        vertices.push(Vertex { position: [x0, y_top] });
        vertices.push(Vertex { position: [x0, y_bottom] });
        vertices.push(Vertex { position: [x1, y_top] });
        vertices.push(Vertex { position: [x1, y_bottom] });
    }

    vertices
}

/// Rendering system managing the wgpu device, pipeline, and bar buffers
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    config: RenderConfig,
}

impl RenderSystem {
    /// Create a new rendering system for a window sized to the config.
    ///
    /// The vertex buffer is allocated once for the scroll buffer's full
    /// capacity and rewritten each frame; the index buffer (two triangles
    /// per bar slot) never changes.
    pub async fn new(
        window: std::sync::Arc<winit::window::Window>,
        config: RenderConfig,
    ) -> Result<Self, VisError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Window must have 'static lifetime via Arc
        let surface = instance
            .create_surface(window)
            .map_err(|e| VisError::RenderBackend(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| {
                VisError::RenderBackend("no suitable GPU adapter found".to_string())
            })?;

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
            .await
            .map_err(|e| VisError::RenderBackend(format!("failed to request device: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        // Fifo present mode doubles as the tick source: one redraw per
        // display refresh.
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bar Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let capacity = config.scroll_capacity();

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bar Vertex Buffer"),
            size: (capacity * 4 * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let indices: Vec<u32> = (0..capacity as u32)
            .flat_map(|i| {
                let base = i * 4;
                [base, base + 1, base + 2, base + 2, base + 1, base + 3]
            })
            .collect();

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bar Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Bar Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x2,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            config,
        })
    }

    /// Render one frame of bars over the background
    pub fn render(&self, bars: &[f32]) -> Result<(), wgpu::SurfaceError> {
        let bar_count = bars.len().min(self.config.scroll_capacity());
        let vertices = bar_vertices(&bars[..bar_count], &self.config);

        if !vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }

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
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..(bar_count as u32 * 6), 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> RenderConfig {
        RenderConfig {
            window_width: 100,
            window_height: 100,
            bar_width_px: 3,
            bar_pitch_px: 5,
            height_scale: 100.0,
        }
    }

    #[test]
    fn test_bar_vertices_count_and_order() {
        let vertices = bar_vertices(&[0.1, 0.2, 0.3], &config());
        // Four vertices per bar
        assert_eq!(vertices.len(), 12);

        // Bars advance left to right by one pitch each
        let bar0_x = vertices[0].position[0];
        let bar1_x = vertices[4].position[0];
        assert!(bar1_x > bar0_x);
    }

    #[test]
    fn test_bar_spans_center_symmetrically() {
        // value 0.25 at scale 100 = 25px half-height in a 100px window:
        // top at y=25px, bottom at y=75px -> NDC 0.5 and -0.5.
        let vertices = bar_vertices(&[0.25], &config());

        assert_relative_eq!(vertices[0].position[1], 0.5);
        assert_relative_eq!(vertices[1].position[1], -0.5);
        // Top and bottom are mirror images about the center
        assert_relative_eq!(
            vertices[0].position[1],
            -vertices[1].position[1]
        );
    }

    #[test]
    fn test_bar_height_clamped_to_viewport() {
        // value 3.0 at scale 100 would be 300px half-height; must clamp to
        // half the 100px window.
        let vertices = bar_vertices(&[3.0], &config());
        assert_relative_eq!(vertices[0].position[1], 1.0);
        assert_relative_eq!(vertices[1].position[1], -1.0);
    }

    #[test]
    fn test_zero_amplitude_is_degenerate_quad() {
        let vertices = bar_vertices(&[0.0], &config());
        assert_relative_eq!(vertices[0].position[1], vertices[1].position[1]);
    }

    #[test]
    fn test_first_bar_starts_at_left_edge() {
        let vertices = bar_vertices(&[0.5], &config());
        // x0 = 0px -> NDC -1; x1 = 3px in a 100px window
        assert_relative_eq!(vertices[0].position[0], -1.0);
        assert_relative_eq!(vertices[2].position[0], -1.0 + 3.0 / 100.0 * 2.0);
    }
}

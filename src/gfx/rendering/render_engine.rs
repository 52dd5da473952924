//! WGPU-based rendering backend for the editor window
//!
//! [`RenderEngine`] implements [`RenderBackend`] on top of wgpu. Uniform slots
//! set between draws accumulate into a [`DrawUniforms`] block, every draw
//! snapshots that block, and [`RenderEngine::present`] uploads all snapshots
//! into one dynamic-offset uniform buffer and replays the draws in a single
//! depth-tested render pass.

use std::sync::Arc;

use cgmath::Matrix4;
use log::{debug, info, warn};
use wgpu::TextureFormat;
use winit::window::Window;

use crate::gfx::backend::{
    BackendError, BufferId, BufferKind, ProgramBindings, RenderBackend, UniformSlot,
};
use crate::gfx::camera::OPENGL_TO_WGPU_MATRIX;
use crate::gfx::resources::TextureResource;
use crate::gfx::scene::LIGHT_COUNT;
use crate::wgpu_utils::{uniform_dynamic, DynamicUniformBuffer};

use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::vertex::{NORMAL_SLOT, POSITION_SLOT};

const PHONG_SHADER: &str = include_str!("phong.wgsl");
const PHONG_PIPELINE: &str = "Phong";

/// Uniform block consumed by one draw of the Phong shader
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    /// Clip-space corrected projection
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub ambient_product: [[f32; 4]; LIGHT_COUNT],
    pub diffuse_product: [[f32; 4]; LIGHT_COUNT],
    pub specular_product: [[f32; 4]; LIGHT_COUNT],
    pub light_position: [[f32; 4]; LIGHT_COUNT],
    pub shininess: f32,
    pub _padding: [f32; 3],
}

impl Default for DrawUniforms {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawCall {
    Indexed { first_index: u32, count: u32 },
    Arrays { first: u32, count: u32 },
}

struct GpuBuffer {
    kind: BufferKind,
    buffer: wgpu::Buffer,
    /// Requested size; `shadow` is padded to the copy alignment
    size: u64,
    shadow: Vec<u8>,
}

/// Widens the byte range `[offset, offset + len)` to copy alignment
///
/// `padded_size` must itself be a multiple of the alignment.
fn widen_to_alignment(offset: u64, len: u64, padded_size: u64) -> (u64, u64) {
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    let start = offset - offset % align;
    let end = (offset + len).div_ceil(align) * align;
    (start, end.min(padded_size))
}

/// wgpu implementation of the rendering capability
pub struct RenderEngine {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,

    uniform_layout: wgpu::BindGroupLayout,
    uniforms: DynamicUniformBuffer<DrawUniforms>,
    uniform_bind_group: wgpu::BindGroup,

    buffers: Vec<GpuBuffer>,
    bindings: Option<ProgramBindings>,
    current: DrawUniforms,
    snapshots: Vec<DrawUniforms>,
    draws: Vec<DrawCall>,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates the backend for `window`
    ///
    /// Initializes wgpu, configures the surface, creates the depth target and
    /// compiles the Phong pipeline.
    pub async fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self, BackendError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| BackendError::Init(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| BackendError::Init(e.to_string()))?;
        info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| BackendError::Init(e.to_string()))?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| BackendError::Init("surface reports no formats".to_string()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniforms Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: uniform_dynamic(std::mem::size_of::<DrawUniforms>() as u64),
                count: None,
            }],
        });
        let uniforms = DynamicUniformBuffer::new(&device, 64);
        let uniform_bind_group = Self::create_uniform_bind_group(&device, &uniform_layout, &uniforms);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("phong", PHONG_SHADER);
        pipeline_manager.register_pipeline(
            PHONG_PIPELINE,
            PipelineConfig::default()
                .with_label(PHONG_PIPELINE)
                .with_shader("phong")
                .with_bind_group_layouts(vec![uniform_layout.clone()])
                .with_cull_mode(None)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_format(format),
        );
        pipeline_manager
            .create_all_pipelines()
            .map_err(|errors| BackendError::Pipeline(errors.join("; ")))?;

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            uniform_layout,
            uniforms,
            uniform_bind_group,
            buffers: Vec::new(),
            bindings: None,
            current: DrawUniforms::default(),
            snapshots: Vec::new(),
            draws: Vec::new(),
            clear_color: wgpu::Color::BLACK,
        })
    }

    fn create_uniform_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniforms: &DynamicUniformBuffer<DrawUniforms>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniforms"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.binding_resource(),
            }],
        })
    }

    fn gpu_buffer(&self, id: BufferId) -> Result<&GpuBuffer, BackendError> {
        self.buffers.get(id.0).ok_or(BackendError::UnknownBuffer(id))
    }

    fn record_draw(&mut self, draw: DrawCall) -> Result<(), BackendError> {
        if self.bindings.is_none() {
            return Err(BackendError::NoProgram);
        }
        self.snapshots.push(self.current);
        self.draws.push(draw);
        Ok(())
    }

    /// Submits the recorded frame, with an optional overlay pass on top
    ///
    /// A lost or outdated surface is reconfigured and the frame is skipped.
    pub fn present<F>(&mut self, overlay: Option<F>) -> Result<(), BackendError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                debug!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(BackendError::Surface(e.to_string())),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if self.uniforms.ensure_capacity(&self.device, self.snapshots.len()) {
            self.uniform_bind_group =
                Self::create_uniform_bind_group(&self.device, &self.uniform_layout, &self.uniforms);
        }
        self.uniforms.write_all(&self.queue, &self.snapshots);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let pipeline = self.pipeline_manager.get_pipeline(PHONG_PIPELINE);
            if let (Some(bindings), Some(pipeline)) = (self.bindings, pipeline) {
                let positions = self.gpu_buffer(bindings.positions)?;
                let normals = self.gpu_buffer(bindings.normals)?;
                let indices = self.gpu_buffer(bindings.indices)?;

                render_pass.set_pipeline(pipeline);
                render_pass.set_vertex_buffer(POSITION_SLOT, positions.buffer.slice(..));
                render_pass.set_vertex_buffer(NORMAL_SLOT, normals.buffer.slice(..));
                render_pass.set_index_buffer(indices.buffer.slice(..), wgpu::IndexFormat::Uint16);

                for (i, draw) in self.draws.iter().enumerate() {
                    render_pass.set_bind_group(0, &self.uniform_bind_group, &[self.uniforms.offset(i)]);
                    match *draw {
                        DrawCall::Indexed { first_index, count } => {
                            render_pass.draw_indexed(first_index..first_index + count, 0, 0..1)
                        }
                        DrawCall::Arrays { first, count } => {
                            render_pass.draw(first..first + count, 0..1)
                        }
                    }
                }
            }
        }

        if let Some(overlay) = overlay {
            overlay(&self.device, &self.queue, &mut encoder, &surface_texture_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and depth target for a new window size
    ///
    /// Zero-sized requests (minimised window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
        debug!("Surface resized to {}x{}", width, height);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.format
    }
}

impl RenderBackend for RenderEngine {
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        size: u64,
        label: &str,
    ) -> Result<BufferId, BackendError> {
        let padded = size.div_ceil(wgpu::COPY_BUFFER_ALIGNMENT) * wgpu::COPY_BUFFER_ALIGNMENT;
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        } | wgpu::BufferUsages::COPY_DST;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: padded,
            usage,
            mapped_at_creation: false,
        });
        debug!("Created {:?} buffer '{}' ({} bytes)", kind, label, size);

        self.buffers.push(GpuBuffer {
            kind,
            buffer,
            size,
            shadow: vec![0; padded as usize],
        });
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn write_buffer(&mut self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), BackendError> {
        let target = self
            .buffers
            .get_mut(id.0)
            .ok_or(BackendError::UnknownBuffer(id))?;

        let end = offset + data.len() as u64;
        if end > target.size {
            return Err(BackendError::WriteOutOfRange {
                buffer: id,
                offset,
                len: data.len(),
                size: target.size,
            });
        }
        if data.is_empty() {
            return Ok(());
        }

        target.shadow[offset as usize..end as usize].copy_from_slice(data);
        let (start, stop) = widen_to_alignment(offset, data.len() as u64, target.shadow.len() as u64);
        self.queue.write_buffer(
            &target.buffer,
            start,
            &target.shadow[start as usize..stop as usize],
        );
        Ok(())
    }

    fn bind_program(&mut self, bindings: ProgramBindings) -> Result<(), BackendError> {
        for id in [bindings.positions, bindings.normals, bindings.indices] {
            self.gpu_buffer(id)?;
        }
        let indices = self.gpu_buffer(bindings.indices)?;
        if indices.kind != BufferKind::Index {
            return Err(BackendError::UnknownBuffer(bindings.indices));
        }
        self.bindings = Some(bindings);
        Ok(())
    }

    fn set_matrix(&mut self, slot: UniformSlot, matrix: &Matrix4<f32>) -> Result<(), BackendError> {
        match slot {
            UniformSlot::Projection => {
                self.current.projection = (OPENGL_TO_WGPU_MATRIX * *matrix).into();
            }
            UniformSlot::ModelView => self.current.model_view = (*matrix).into(),
            other => return Err(BackendError::UniformType(other.name())),
        }
        Ok(())
    }

    fn set_vectors(&mut self, slot: UniformSlot, values: &[[f32; 4]]) -> Result<(), BackendError> {
        let target = match slot {
            UniformSlot::AmbientProduct => &mut self.current.ambient_product,
            UniformSlot::DiffuseProduct => &mut self.current.diffuse_product,
            UniformSlot::SpecularProduct => &mut self.current.specular_product,
            UniformSlot::LightPosition => &mut self.current.light_position,
            other => return Err(BackendError::UniformType(other.name())),
        };
        if values.len() != LIGHT_COUNT {
            return Err(BackendError::UniformSize {
                slot: slot.name(),
                expected: LIGHT_COUNT,
                actual: values.len(),
            });
        }
        target.copy_from_slice(values);
        Ok(())
    }

    fn set_float(&mut self, slot: UniformSlot, value: f32) -> Result<(), BackendError> {
        match slot {
            UniformSlot::Shininess => {
                self.current.shininess = value;
                Ok(())
            }
            other => Err(BackendError::UniformType(other.name())),
        }
    }

    fn draw_indexed(&mut self, count: u32, byte_offset: u64) -> Result<(), BackendError> {
        let first_index = (byte_offset / 2) as u32;
        self.record_draw(DrawCall::Indexed { first_index, count })
    }

    fn draw_arrays(&mut self, first: u32, count: u32) -> Result<(), BackendError> {
        self.record_draw(DrawCall::Arrays { first, count })
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), BackendError> {
        self.clear_color = wgpu::Color {
            r: color[0] as f64,
            g: color[1] as f64,
            b: color[2] as f64,
            a: color[3] as f64,
        };
        self.snapshots.clear();
        self.draws.clear();
        Ok(())
    }

    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_uniforms_layout() {
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 272);
        assert_eq!(std::mem::size_of::<DrawUniforms>() % 16, 0);
    }

    #[test]
    fn test_widen_to_alignment() {
        // u16 index write at an odd element
        assert_eq!(widen_to_alignment(6, 2, 16), (4, 8));
        assert_eq!(widen_to_alignment(0, 12, 16), (0, 12));
        assert_eq!(widen_to_alignment(14, 2, 16), (12, 16));
        assert_eq!(widen_to_alignment(2, 9, 16), (0, 12));
    }

    #[test]
    fn test_widened_range_covers_write() {
        for offset in 0..32u64 {
            for len in 1..16u64 {
                let (start, end) = widen_to_alignment(offset, len, 64);
                assert!(start <= offset && end >= offset + len);
                assert_eq!(start % 4, 0);
                assert_eq!(end % 4, 0);
            }
        }
    }
}

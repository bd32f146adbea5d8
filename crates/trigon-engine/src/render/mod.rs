//! The renderer: device + shaders + geometry, and the per-frame draw.

use std::path::{Path, PathBuf};

use anyhow::Result;
use winit::window::Window;

use crate::coords::ColorRgba;
use crate::device::{DeviceConfig, FrameError, GraphicsDevice, SurfaceErrorAction};
use crate::error::InitError;
use crate::game::FrameTarget;
use crate::geometry::GeometryBuffer;
use crate::shader::{ShaderPipeline, SHADER_PATH};

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub device: DeviceConfig,
    /// Shader file, relative to the working directory.
    pub shader_path: PathBuf,
    pub clear_color: ColorRgba,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            shader_path: PathBuf::from(SHADER_PATH),
            clear_color: ColorRgba::MIDNIGHT_BLUE,
        }
    }
}

/// Draws one triangle per frame into the window's swap chain.
///
/// Field order is release order: buffer and pipeline go before the device.
pub struct Renderer<'w> {
    geometry: GeometryBuffer,
    shaders: ShaderPipeline,
    device: GraphicsDevice<'w>,
    clear_color: ColorRgba,
}

impl<'w> Renderer<'w> {
    /// Device, then shaders, then geometry; the first failure aborts and
    /// drops whatever was already created.
    pub fn initialize(window: &'w Window, config: &RendererConfig) -> Result<Self, InitError> {
        let device = GraphicsDevice::initialize(window, &config.device)?;
        let (shaders, geometry) = create_resources(
            device.device(),
            device.surface_format(),
            &config.shader_path,
            GeometryBuffer::initialize,
        )?;

        Ok(Self {
            geometry,
            shaders,
            device,
            clear_color: config.clear_color,
        })
    }

    /// Per-frame hook, called once before every `render`. No effect yet.
    pub fn update(&mut self, _delta_seconds: f32) {}

    /// Clear, bind, draw, present. Never waits for vertical sync.
    ///
    /// Transient surface errors skip the frame; only unrecoverable ones are
    /// returned.
    pub fn render(&mut self) -> Result<()> {
        let mut frame = match self.device.begin_frame() {
            Ok(f) => f,
            Err(FrameError::RenderTarget(err)) => return Err(err.into()),
            Err(FrameError::Surface(err)) => {
                let reason = err.to_string();
                match self.device.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => anyhow::bail!("surface failed: {reason}"),
                    action => {
                        log::debug!("frame skipped ({action:?}): {reason}");
                        return Ok(());
                    }
                }
            }
        };

        // Render pass borrows the encoder; dropped before present() takes the frame.
        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trigon triangle pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let vp = self.device.viewport();
            rpass.set_viewport(vp.x, vp.y, vp.width, vp.height, vp.min_depth, vp.max_depth);

            rpass.set_pipeline(self.shaders.pipeline());
            rpass.set_vertex_buffer(0, self.geometry.slice());

            let draw = self.geometry.draw_call();
            rpass.draw(draw.vertices, draw.instances);
        }

        self.device.present(frame);
        Ok(())
    }

    pub fn device(&self) -> &GraphicsDevice<'w> {
        &self.device
    }

    pub fn shaders(&self) -> &ShaderPipeline {
        &self.shaders
    }

    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    pub fn clear_color(&self) -> ColorRgba {
        self.clear_color
    }
}

/// Shaders, then geometry, on `gpu`. `geometry` is not called when the
/// shaders fail.
fn create_resources<G>(
    gpu: &wgpu::Device,
    target_format: wgpu::TextureFormat,
    shader_path: &Path,
    geometry: G,
) -> Result<(ShaderPipeline, GeometryBuffer), InitError>
where
    G: FnOnce(&wgpu::Device) -> Result<GeometryBuffer, InitError>,
{
    let shaders = ShaderPipeline::initialize(shader_path, gpu, target_format)?;
    let geometry = geometry(gpu)?;
    Ok((shaders, geometry))
}

impl FrameTarget for Renderer<'_> {
    fn update(&mut self, delta_seconds: f32) {
        Renderer::update(self, delta_seconds);
    }

    fn render(&mut self) -> Result<()> {
        Renderer::render(self)
    }
}

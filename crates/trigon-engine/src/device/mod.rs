//! GPU device + swap chain management.
//!
//! This module is responsible for:
//! - negotiating a driver type and feature level (ordered fallback)
//! - creating and configuring the surface (swap chain) for the window
//! - acquiring back buffers, creating their render-target views, presenting

mod driver;
mod factory;
mod scope;
mod swap_chain;

pub use driver::{negotiate, CreateError, DeviceFactory, DriverType, FeatureLevel, Negotiated};
pub use swap_chain::{SwapChainDesc, SwapChainPath, PREFERRED_FORMAT};

use wgpu::SurfaceError;
use winit::window::Window;

use crate::coords::Viewport;
use crate::error::{InitError, Resource};
use factory::{DeviceParts, WgpuFactory};
pub(crate) use scope::capture_errors;
#[cfg(test)]
pub(crate) use scope::headless;

/// Device creation parameters.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Driver types to try, first success wins.
    pub drivers: Vec<DriverType>,

    /// Feature levels to request, newest first.
    pub feature_levels: Vec<FeatureLevel>,

    /// Present mode. The default never waits for vertical sync.
    pub present_mode: wgpu::PresentMode,

    /// Required wgpu features. Empty for portability.
    pub required_features: wgpu::Features,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            drivers: DriverType::FALLBACK_ORDER.to_vec(),
            feature_levels: FeatureLevel::NEWEST_FIRST.to_vec(),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            required_features: wgpu::Features::empty(),
        }
    }
}

/// The window's single back buffer, its render-target view and the encoder
/// recording this frame's draw. Handed back to `present`.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// Why `begin_frame` produced no frame.
#[derive(Debug)]
pub enum FrameError {
    /// The back buffer could not be acquired.
    Surface(SurfaceError),
    /// The back buffer was acquired but no render-target view could be made over it.
    RenderTarget(InitError),
}

/// What the frame loop does after the back buffer could not be acquired.
///
/// The swap chain never changes size, so a lost or outdated surface is
/// brought back with the configuration it was created with.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Swap chain configured again with its original size and format.
    Reconfigured,
    /// Nothing to present this tick.
    SkipFrame,
    /// Out of memory; the loop ends with an error.
    Fatal,
}

/// Owns the device, its queue and the swap chain bound to one window.
///
/// Construction either yields all of them or fails without keeping any.
/// Fields drop in declaration order, surface before device before instance.
pub struct GraphicsDevice<'w> {
    window: &'w Window,

    surface: wgpu::Surface<'w>,
    queue: wgpu::Queue,
    device: wgpu::Device,
    adapter: wgpu::Adapter,
    _instance: wgpu::Instance,

    driver_type: DriverType,
    feature_level: FeatureLevel,

    config: wgpu::SurfaceConfiguration,
    viewport: Viewport,
}

impl<'w> GraphicsDevice<'w> {
    /// Creates the device and swap chain for `window`.
    ///
    /// The viewport is fixed to the client area at the time of the call.
    pub fn initialize(window: &'w Window, config: &DeviceConfig) -> Result<Self, InitError> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(InitError::SwapChainCreation("window client area is empty".into()));
        }

        let handle = crate::window::native_handle(window)
            .map_err(|e| InitError::SwapChainCreation(format!("{e:#}")))?;
        log::debug!("binding swap chain to {handle:?} ({}x{})", size.width, size.height);

        let mut factory = WgpuFactory {
            window,
            required_features: config.required_features,
        };
        let Negotiated {
            device: parts,
            driver,
            level,
        } = negotiate(&mut factory, &config.drivers, &config.feature_levels)?;

        let DeviceParts {
            instance,
            surface,
            adapter,
            device,
            queue,
        } = parts;

        let caps = surface.get_capabilities(&adapter);
        let swap_chain = SwapChainDesc::negotiate(
            &caps.formats,
            &caps.alpha_modes,
            size.width,
            size.height,
            config.present_mode,
        )
        .ok_or_else(|| {
            InitError::AdapterQuery(format!(
                "adapter `{}` cannot present to this window",
                adapter.get_info().name
            ))
        })?;

        let surface_config = swap_chain.to_config();
        capture_errors(&device, || surface.configure(&device, &surface_config))
            .map_err(|e| InitError::SwapChainCreation(e.to_string()))?;
        log::info!(
            "swap chain: {} path, {:?}, {}x{}, refresh {:?}, windowed {}",
            swap_chain.path,
            swap_chain.format,
            swap_chain.width,
            swap_chain.height,
            swap_chain.refresh_rate,
            swap_chain.windowed
        );

        // Fullscreen is never supported; keep the window windowed.
        window.set_fullscreen(None);

        let viewport = Viewport::covering(size.width, size.height);

        Ok(Self {
            window,
            surface,
            queue,
            device,
            adapter,
            _instance: instance,
            driver_type: driver,
            feature_level: level,
            config: surface_config,
            viewport,
        })
    }

    pub fn driver_type(&self) -> DriverType {
        self.driver_type
    }

    pub fn feature_level(&self) -> FeatureLevel {
        self.feature_level
    }

    /// Returns the active back-buffer format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Viewport bound for every draw, equal to the initial client area.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Acquires the back buffer, creates its render-target view and an encoder.
    pub fn begin_frame(&self) -> Result<GpuFrame, FrameError> {
        let surface_texture = self
            .surface
            .get_current_texture()
            .map_err(FrameError::Surface)?;

        let view = capture_errors(&self.device, || {
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    label: Some("trigon back buffer rtv"),
                    ..Default::default()
                })
        })
        .map_err(|e| {
            FrameError::RenderTarget(InitError::resource(Resource::RenderTarget, e.to_string()))
        })?;

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("trigon frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the back buffer.
    pub fn present(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);

        self.window.pre_present_notify();
        surface_texture.present();
    }

    /// Decides how the loop carries on after `err`, reconfiguring the swap
    /// chain at its fixed size when the surface was lost or went stale.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        let action = surface_error_action(&err);
        if action == SurfaceErrorAction::Reconfigured {
            self.surface.configure(&self.device, &self.config);
        }
        action
    }
}

fn surface_error_action(err: &SurfaceError) -> SurfaceErrorAction {
    match err {
        SurfaceError::Lost | SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        SurfaceError::Timeout | SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_out_of_memory_ends_the_loop() {
        assert_eq!(surface_error_action(&SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
        assert_eq!(surface_error_action(&SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(surface_error_action(&SurfaceError::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(surface_error_action(&SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(surface_error_action(&SurfaceError::Other), SurfaceErrorAction::SkipFrame);
    }
}

use winit::window::Window;

use super::driver::{CreateError, DeviceFactory, DriverType, FeatureLevel};

/// Everything one successful wgpu attempt produces.
///
/// Instance, surface and adapter are tied together: the surface is created
/// from this instance and the adapter was selected for this surface.
pub(crate) struct DeviceParts<'w> {
    pub instance: wgpu::Instance,
    pub surface: wgpu::Surface<'w>,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// Creates wgpu devices bound to a window's surface.
pub(crate) struct WgpuFactory<'w> {
    pub window: &'w Window,
    pub required_features: wgpu::Features,
}

impl<'w> DeviceFactory for WgpuFactory<'w> {
    type Device = DeviceParts<'w>;

    fn create(
        &mut self,
        driver: DriverType,
        levels: &[FeatureLevel],
    ) -> Result<(DeviceParts<'w>, FeatureLevel), CreateError> {
        // Debug builds get wgpu's debug labels and API validation.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: driver.backends(),
            flags: wgpu::InstanceFlags::from_build_config(),
            ..Default::default()
        });

        // Surface lifetime is tied to `window` via `'w`.
        let surface = instance
            .create_surface(self.window)
            .map_err(|e| CreateError::Failed(format!("failed to create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: driver.power_preference(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: driver.force_fallback_adapter(),
        }))
        .map_err(|e| CreateError::Failed(format!("no suitable adapter: {e}")))?;

        let info = adapter.get_info();
        log::debug!(
            "{driver}: adapter `{}` ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let supported = adapter.limits();
        let Some(level) = levels
            .iter()
            .copied()
            .find(|l| l.limits().check_limits(&supported))
        else {
            return Err(CreateError::Failed(format!(
                "adapter `{}` supports none of the requested feature levels",
                info.name
            )));
        };

        let requested = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("trigon device"),
            required_features: self.required_features,
            required_limits: level.limits(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }));

        let (device, queue) = match requested {
            Ok(pair) => pair,
            // The adapter advertised the limits but the runtime refused them.
            Err(e) if Some(&level) == levels.first() => {
                log::debug!("{driver}: `{level}` refused by runtime: {e}");
                return Err(CreateError::UnsupportedLevel(level));
            }
            Err(e) => return Err(CreateError::Failed(format!("device request refused: {e}"))),
        };

        Ok((
            DeviceParts {
                instance,
                surface,
                adapter,
                device,
                queue,
            },
            level,
        ))
    }
}

use std::fmt;

use crate::error::InitError;

/// Execution backend that computes graphics, in fallback order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DriverType {
    /// Dedicated or integrated GPU on a primary backend (Vulkan, Metal, DX12).
    Hardware,
    /// Software-emulated adapter (wgpu's fallback adapter, e.g. WARP or lavapipe).
    Warp,
    /// Last resort: any adapter on the compatibility backends (GL).
    Reference,
}

impl DriverType {
    /// Candidates tried by default, first success wins.
    pub const FALLBACK_ORDER: [DriverType; 3] =
        [DriverType::Hardware, DriverType::Warp, DriverType::Reference];

    pub fn backends(self) -> wgpu::Backends {
        match self {
            DriverType::Hardware | DriverType::Warp => wgpu::Backends::PRIMARY,
            DriverType::Reference => wgpu::Backends::SECONDARY,
        }
    }

    pub fn power_preference(self) -> wgpu::PowerPreference {
        match self {
            DriverType::Hardware => wgpu::PowerPreference::HighPerformance,
            DriverType::Warp | DriverType::Reference => wgpu::PowerPreference::None,
        }
    }

    pub fn force_fallback_adapter(self) -> bool {
        matches!(self, DriverType::Warp)
    }
}

impl fmt::Display for DriverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverType::Hardware => "hardware",
            DriverType::Warp => "warp",
            DriverType::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// Capability tier requested from the device, newest first.
///
/// Each tier is a set of `wgpu::Limits`; a device is created with the limits
/// of the newest tier the adapter can satisfy.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FeatureLevel {
    /// Core limits with 16k textures.
    Extended,
    /// `wgpu::Limits::default()`.
    Core,
    /// `wgpu::Limits::downlevel_defaults()`.
    Downlevel,
    /// `wgpu::Limits::downlevel_webgl2_defaults()`.
    WebGl2,
}

impl FeatureLevel {
    pub const NEWEST_FIRST: [FeatureLevel; 4] = [
        FeatureLevel::Extended,
        FeatureLevel::Core,
        FeatureLevel::Downlevel,
        FeatureLevel::WebGl2,
    ];

    pub fn limits(self) -> wgpu::Limits {
        match self {
            FeatureLevel::Extended => wgpu::Limits {
                max_texture_dimension_1d: 16384,
                max_texture_dimension_2d: 16384,
                ..wgpu::Limits::default()
            },
            FeatureLevel::Core => wgpu::Limits::default(),
            FeatureLevel::Downlevel => wgpu::Limits::downlevel_defaults(),
            FeatureLevel::WebGl2 => wgpu::Limits::downlevel_webgl2_defaults(),
        }
    }
}

impl fmt::Display for FeatureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureLevel::Extended => "extended",
            FeatureLevel::Core => "core",
            FeatureLevel::Downlevel => "downlevel",
            FeatureLevel::WebGl2 => "webgl2",
        };
        f.write_str(name)
    }
}

/// Why a single device-creation attempt failed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CreateError {
    /// The runtime rejected the newest level in the request outright.
    /// Signals that the same driver may succeed without it.
    UnsupportedLevel(FeatureLevel),
    /// Any other failure (no adapter, device request refused, ...).
    Failed(String),
}

impl fmt::Display for CreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateError::UnsupportedLevel(level) => write!(f, "feature level `{level}` unsupported"),
            CreateError::Failed(msg) => f.write_str(msg),
        }
    }
}

/// Creates a device for one driver type against an ordered level list.
///
/// Implementations return the device together with the level it was created
/// at, which must be one of `levels`.
pub trait DeviceFactory {
    type Device;

    fn create(
        &mut self,
        driver: DriverType,
        levels: &[FeatureLevel],
    ) -> Result<(Self::Device, FeatureLevel), CreateError>;
}

/// Outcome of a successful negotiation.
#[derive(Debug)]
pub struct Negotiated<D> {
    pub device: D,
    pub driver: DriverType,
    pub level: FeatureLevel,
}

/// Tries each driver type in order, stopping at the first device created.
///
/// A driver whose first attempt reports `UnsupportedLevel` is retried exactly
/// once with the newest level dropped.
pub fn negotiate<F: DeviceFactory>(
    factory: &mut F,
    drivers: &[DriverType],
    levels: &[FeatureLevel],
) -> Result<Negotiated<F::Device>, InitError> {
    if levels.is_empty() {
        return Err(InitError::DeviceCreation("no feature levels requested".into()));
    }

    let mut failures = Vec::with_capacity(drivers.len());

    for &driver in drivers {
        let attempt = match factory.create(driver, levels) {
            Err(CreateError::UnsupportedLevel(top)) if levels.len() > 1 => {
                log::debug!("{driver}: `{top}` rejected, retrying without it");
                factory.create(driver, &levels[1..])
            }
            other => other,
        };

        match attempt {
            Ok((device, level)) => {
                log::info!("created device: driver `{driver}`, feature level `{level}`");
                return Ok(Negotiated { device, driver, level });
            }
            Err(err) => {
                log::debug!("{driver}: device creation failed: {err}");
                failures.push(format!("{driver}: {err}"));
            }
        }
    }

    if failures.is_empty() {
        return Err(InitError::DeviceCreation("no driver types requested".into()));
    }
    Err(InitError::DeviceCreation(failures.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted factory: each driver supports a set of levels, and may reject
    /// the newest level of the full list like an older runtime would.
    #[derive(Default)]
    struct FakeFactory {
        supported: Vec<(DriverType, Vec<FeatureLevel>)>,
        rejects_top: Vec<DriverType>,
        calls: Vec<(DriverType, Vec<FeatureLevel>)>,
        live_devices: usize,
    }

    impl DeviceFactory for FakeFactory {
        type Device = (DriverType, FeatureLevel);

        fn create(
            &mut self,
            driver: DriverType,
            levels: &[FeatureLevel],
        ) -> Result<(Self::Device, FeatureLevel), CreateError> {
            self.calls.push((driver, levels.to_vec()));

            if self.rejects_top.contains(&driver) && levels.first() == Some(&FeatureLevel::Extended)
            {
                return Err(CreateError::UnsupportedLevel(FeatureLevel::Extended));
            }

            let Some((_, supported)) = self.supported.iter().find(|(d, _)| *d == driver) else {
                return Err(CreateError::Failed("no adapter".into()));
            };

            let level = levels
                .iter()
                .copied()
                .find(|l| supported.contains(l))
                .ok_or_else(|| CreateError::Failed("no level fits".into()))?;

            self.live_devices += 1;
            Ok(((driver, level), level))
        }
    }

    fn all_levels() -> Vec<FeatureLevel> {
        FeatureLevel::NEWEST_FIRST.to_vec()
    }

    #[test]
    fn hardware_wins_when_available() {
        let mut f = FakeFactory {
            supported: vec![
                (DriverType::Hardware, all_levels()),
                (DriverType::Warp, all_levels()),
            ],
            ..Default::default()
        };

        let n = negotiate(&mut f, &DriverType::FALLBACK_ORDER, &FeatureLevel::NEWEST_FIRST).unwrap();
        assert_eq!(n.driver, DriverType::Hardware);
        assert_eq!(n.level, FeatureLevel::Extended);
        assert_eq!(n.device, (DriverType::Hardware, FeatureLevel::Extended));
        assert_eq!(f.calls.len(), 1);
    }

    #[test]
    fn falls_through_driver_list_in_order() {
        let mut f = FakeFactory {
            supported: vec![(DriverType::Reference, vec![FeatureLevel::Downlevel])],
            ..Default::default()
        };

        let n = negotiate(&mut f, &DriverType::FALLBACK_ORDER, &FeatureLevel::NEWEST_FIRST).unwrap();
        assert_eq!(n.driver, DriverType::Reference);
        assert_eq!(n.level, FeatureLevel::Downlevel);

        let order: Vec<_> = f.calls.iter().map(|(d, _)| *d).collect();
        assert_eq!(order, DriverType::FALLBACK_ORDER.to_vec());
    }

    #[test]
    fn selects_newest_mutually_supported_level() {
        let mut f = FakeFactory {
            supported: vec![(
                DriverType::Hardware,
                vec![FeatureLevel::Core, FeatureLevel::Downlevel],
            )],
            ..Default::default()
        };

        let n = negotiate(&mut f, &DriverType::FALLBACK_ORDER, &FeatureLevel::NEWEST_FIRST).unwrap();
        assert_eq!(n.level, FeatureLevel::Core);
    }

    #[test]
    fn unsupported_top_level_is_retried_exactly_once() {
        let mut f = FakeFactory {
            supported: vec![(DriverType::Hardware, all_levels())],
            rejects_top: vec![DriverType::Hardware],
            ..Default::default()
        };

        let n = negotiate(&mut f, &DriverType::FALLBACK_ORDER, &FeatureLevel::NEWEST_FIRST).unwrap();
        assert_eq!(n.driver, DriverType::Hardware);
        assert_eq!(n.level, FeatureLevel::Core);

        assert_eq!(f.calls.len(), 2);
        assert_eq!(f.calls[0].1, all_levels());
        assert_eq!(f.calls[1].1, all_levels()[1..].to_vec());
    }

    #[test]
    fn failed_retry_moves_on_to_next_driver() {
        let mut f = FakeFactory {
            supported: vec![
                (DriverType::Hardware, vec![FeatureLevel::Extended]),
                (DriverType::Warp, all_levels()),
            ],
            rejects_top: vec![DriverType::Hardware],
            ..Default::default()
        };

        let n = negotiate(&mut f, &DriverType::FALLBACK_ORDER, &FeatureLevel::NEWEST_FIRST).unwrap();
        assert_eq!(n.driver, DriverType::Warp);

        let hardware_calls = f.calls.iter().filter(|(d, _)| *d == DriverType::Hardware).count();
        assert_eq!(hardware_calls, 2);
    }

    #[test]
    fn total_failure_creates_nothing() {
        let mut f = FakeFactory::default();

        let err = negotiate(&mut f, &DriverType::FALLBACK_ORDER, &FeatureLevel::NEWEST_FIRST)
            .unwrap_err();
        assert!(matches!(err, InitError::DeviceCreation(_)));
        assert_eq!(f.live_devices, 0);
        assert_eq!(f.calls.len(), 3);
    }

    #[test]
    fn single_level_request_is_not_retried() {
        let mut f = FakeFactory {
            rejects_top: vec![DriverType::Hardware],
            ..Default::default()
        };

        let res = negotiate(&mut f, &[DriverType::Hardware], &[FeatureLevel::Extended]);
        assert!(res.is_err());
        assert_eq!(f.calls.len(), 1);
    }

    #[test]
    fn empty_level_list_is_rejected() {
        let mut f = FakeFactory::default();
        assert!(negotiate(&mut f, &DriverType::FALLBACK_ORDER, &[]).is_err());
        assert!(f.calls.is_empty());
    }

    #[test]
    fn tiers_shrink_monotonically() {
        let dims: Vec<u32> = FeatureLevel::NEWEST_FIRST
            .iter()
            .map(|l| l.limits().max_texture_dimension_2d)
            .collect();
        assert!(dims.windows(2).all(|w| w[0] >= w[1]), "{dims:?}");
    }
}

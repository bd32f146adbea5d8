use std::fmt;

/// Back-buffer format requested on the direct path.
pub const PREFERRED_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// How the swap chain was described to the surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SwapChainPath {
    /// The surface accepts the preferred 8-bit RGBA format directly.
    Direct,
    /// The surface dictates its own format. The legacy descriptor also
    /// records a 60/1 refresh rate and windowed mode.
    Legacy,
}

impl fmt::Display for SwapChainPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapChainPath::Direct => f.write_str("direct"),
            SwapChainPath::Legacy => f.write_str("legacy"),
        }
    }
}

/// Swap-chain description derived from surface capabilities.
///
/// wgpu surfaces have no refresh-rate, windowed or multisample setting:
/// `sample_count`, `refresh_rate` and `windowed` describe the request and are
/// logged, but `to_config` does not read them. The only configured difference
/// between the two paths is `format`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapChainDesc {
    pub path: SwapChainPath,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    /// Becomes the surface's maximum frame latency.
    pub buffer_count: u32,
    pub sample_count: u32,
    /// Numerator/denominator; legacy path only.
    pub refresh_rate: Option<(u32, u32)>,
    pub windowed: bool,
    pub present_mode: wgpu::PresentMode,
    pub alpha_mode: wgpu::CompositeAlphaMode,
}

impl SwapChainDesc {
    /// Picks the direct path when `formats` offers `PREFERRED_FORMAT`, the
    /// legacy path otherwise. Returns `None` when the surface reports no
    /// formats at all.
    pub fn negotiate(
        formats: &[wgpu::TextureFormat],
        alpha_modes: &[wgpu::CompositeAlphaMode],
        width: u32,
        height: u32,
        present_mode: wgpu::PresentMode,
    ) -> Option<Self> {
        let first = *formats.first()?;
        let alpha_mode = alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let desc = if formats.contains(&PREFERRED_FORMAT) {
            Self {
                path: SwapChainPath::Direct,
                format: PREFERRED_FORMAT,
                width,
                height,
                buffer_count: 1,
                sample_count: 1,
                refresh_rate: None,
                windowed: true,
                present_mode,
                alpha_mode,
            }
        } else {
            Self {
                path: SwapChainPath::Legacy,
                format: first,
                width,
                height,
                buffer_count: 1,
                sample_count: 1,
                refresh_rate: Some((60, 1)),
                windowed: true,
                present_mode,
                alpha_mode,
            }
        };

        Some(desc)
    }

    pub fn to_config(&self) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width.max(1),
            height: self.height.max(1),
            present_mode: self.present_mode,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: self.buffer_count,
        }
    }
}

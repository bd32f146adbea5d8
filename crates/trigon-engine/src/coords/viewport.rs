/// Rasterizer viewport in physical pixels.
///
/// Origin is the top-left corner of the client area. Depth range is the
/// full `0..1`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Viewport covering a client area of `width` x `height` pixels exactly.
    #[inline]
    pub fn covering(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }
}

//! Coordinate and colour primitives shared by the device and render layers.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;

//! Main window + its message queue.
//!
//! Owns the `winit` EventLoop and Window. The loop is pumped, never run:
//! the frame loop stays in charge of control flow.

mod message;
mod queue;

pub use message::{WindowMessage, WindowProc};
pub use queue::MessageQueue;
pub use winit::window::Window;

use anyhow::{Context, Result};
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::dpi::LogicalSize;

/// Main window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "trigon".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Opens the main window and returns it with its message queue.
///
/// The window is not resizable: the viewport is fixed at creation.
pub fn open(config: &WindowConfig) -> Result<(MessageQueue, Window)> {
    let attrs = Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(config.initial_size)
        .with_resizable(false);

    let (queue, window) = MessageQueue::open(attrs)?;

    let (width, height) = client_size(&window);
    log::info!("opened window `{}` ({width}x{height})", config.title);

    Ok((queue, window))
}

/// Client-area size in physical pixels.
pub fn client_size(window: &Window) -> (u32, u32) {
    let size = window.inner_size();
    (size.width, size.height)
}

/// Native handle the swap chain binds to.
pub fn native_handle(window: &Window) -> Result<RawWindowHandle> {
    let handle = window
        .window_handle()
        .context("window has no native handle")?;
    Ok(handle.as_raw())
}

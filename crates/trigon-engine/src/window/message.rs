use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Window messages the frame loop sees, translated from `winit` events.
///
/// Events the harness has no use for are dropped during translation.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowMessage {
    CloseRequested,
    Destroyed,
    Resized { width: u32, height: u32 },
    Focused(bool),
    ModifiersChanged { alt: bool },
    Key {
        code: Option<KeyCode>,
        pressed: bool,
        repeat: bool,
    },
}

pub(crate) fn translate(event: &WindowEvent) -> Option<WindowMessage> {
    match event {
        WindowEvent::CloseRequested => Some(WindowMessage::CloseRequested),
        WindowEvent::Destroyed => Some(WindowMessage::Destroyed),
        WindowEvent::Resized(size) => Some(WindowMessage::Resized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::Focused(f) => Some(WindowMessage::Focused(*f)),
        WindowEvent::ModifiersChanged(m) => Some(WindowMessage::ModifiersChanged {
            alt: m.state().alt_key(),
        }),
        WindowEvent::KeyboardInput { event, .. } => {
            let code = match event.physical_key {
                PhysicalKey::Code(code) => Some(code),
                PhysicalKey::Unidentified(_) => None,
            };
            Some(WindowMessage::Key {
                code,
                pressed: event.state == ElementState::Pressed,
                repeat: event.repeat,
            })
        }
        _ => None,
    }
}

/// Default message handling for the main window.
///
/// Closing the window posts a quit with exit code 0. Alt+Enter, the usual
/// fullscreen chord, is swallowed: the window never leaves windowed mode.
#[derive(Debug, Default)]
pub struct WindowProc {
    alt_held: bool,
    fullscreen_requests_ignored: u32,
}

impl WindowProc {
    /// Handles one message; returns the exit code when it ends the program.
    pub fn dispatch(&mut self, msg: WindowMessage) -> Option<i32> {
        match msg {
            WindowMessage::CloseRequested | WindowMessage::Destroyed => {
                log::debug!("window closed");
                return Some(0);
            }
            WindowMessage::ModifiersChanged { alt } => self.alt_held = alt,
            WindowMessage::Key {
                code: Some(KeyCode::Enter | KeyCode::NumpadEnter),
                pressed: true,
                repeat: false,
            } if self.alt_held => {
                self.fullscreen_requests_ignored += 1;
                log::debug!("Alt+Enter ignored: fullscreen is not supported");
            }
            WindowMessage::Resized { width, height } => {
                log::debug!("client area now {width}x{height}; viewport unchanged");
            }
            WindowMessage::Focused(focused) => log::trace!("focus: {focused}"),
            WindowMessage::Key { .. } => {}
        }
        None
    }

    pub fn fullscreen_requests_ignored(&self) -> u32 {
        self.fullscreen_requests_ignored
    }
}

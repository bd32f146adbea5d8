use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use super::message::{translate, WindowMessage, WindowProc};
use crate::game::{Message, MessagePump};

/// Pumps allowed while waiting for the platform to hand out the window.
const STARTUP_PUMP_LIMIT: u32 = 100;
const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

/// The main window's message queue.
///
/// Polling never blocks: each `peek` pumps the OS queue with a zero timeout
/// and returns at most one message.
pub struct MessageQueue {
    event_loop: EventLoop<()>,
    handler: QueueHandler,
    proc: WindowProc,
}

struct QueueHandler {
    pending: Option<WindowAttributes>,
    created: Option<Result<Window, OsError>>,
    messages: VecDeque<Message<WindowMessage>>,
}

impl ApplicationHandler for QueueHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        if let Some(attrs) = self.pending.take() {
            self.created = Some(event_loop.create_window(attrs));
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(msg) = translate(&event) {
            self.messages.push_back(Message::Event(msg));
        }
    }
}

impl MessageQueue {
    /// Creates the event loop and the window described by `attrs`.
    pub(crate) fn open(attrs: WindowAttributes) -> Result<(Self, Window)> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let mut queue = Self {
            event_loop,
            handler: QueueHandler {
                pending: Some(attrs),
                created: None,
                messages: VecDeque::new(),
            },
            proc: WindowProc::default(),
        };

        for _ in 0..STARTUP_PUMP_LIMIT {
            let status = queue
                .event_loop
                .pump_app_events(Some(STARTUP_PUMP_TIMEOUT), &mut queue.handler);

            if let PumpStatus::Exit(code) = status {
                anyhow::bail!("event loop exited during startup (code {code})");
            }

            if let Some(created) = queue.handler.created.take() {
                let window =
                    created.map_err(|e| anyhow::anyhow!("failed to create window: {e}"))?;
                return Ok((queue, window));
            }
        }

        anyhow::bail!("platform never resumed the event loop; no window was created")
    }

    /// Queues a quit message carrying `code`.
    pub fn post_quit(&mut self, code: i32) {
        self.handler.messages.push_back(Message::Quit(code));
    }

    fn pump(&mut self) {
        match self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler)
        {
            PumpStatus::Continue => {}
            PumpStatus::Exit(code) => self.post_quit(code),
        }
    }
}

impl MessagePump for MessageQueue {
    type Event = WindowMessage;

    fn peek(&mut self) -> Option<Message<WindowMessage>> {
        if self.handler.messages.is_empty() {
            self.pump();
        }
        self.handler.messages.pop_front()
    }

    fn dispatch(&mut self, event: WindowMessage) {
        if let Some(code) = self.proc.dispatch(event) {
            self.post_quit(code);
        }
    }
}

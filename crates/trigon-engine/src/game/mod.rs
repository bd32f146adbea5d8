//! The game: main window + renderer, and the loop that drives them.
//!
//! `Game` is the only type the binary needs:
//! - `initialize` opens the window and builds the renderer against it
//! - `run` pumps messages and renders until the window posts quit

mod frame_loop;

pub use frame_loop::{run_frame_loop, FrameTarget, Message, MessagePump};

use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::window::Window;

use crate::render::{Renderer, RendererConfig};
use crate::time::FrameClock;
use crate::window::{self, MessageQueue, WindowConfig};

/// Everything configurable about a game.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub renderer: RendererConfig,
}

#[self_referencing]
struct Stage {
    window: Window,

    #[borrows(window)]
    #[covariant]
    renderer: Renderer<'this>,
}

pub struct Game {
    name: String,
    config: GameConfig,

    // Declared before `queue`: renderer and window go before the event loop.
    stage: Option<Stage>,
    queue: Option<MessageQueue>,
}

impl Game {
    /// A game whose window is titled `name`, otherwise default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let config = GameConfig {
            window: WindowConfig {
                title: name.clone(),
                ..WindowConfig::default()
            },
            ..GameConfig::default()
        };
        Self::with_config(name, config)
    }

    pub fn with_config(name: impl Into<String>, config: GameConfig) -> Self {
        Self {
            name: name.into(),
            config,
            stage: None,
            queue: None,
        }
    }

    /// Opens the main window, then initializes the renderer for it.
    ///
    /// On error nothing is kept and the game must not be run.
    pub fn initialize(&mut self) -> Result<()> {
        let (queue, window) =
            window::open(&self.config.window).context("failed to open the main window")?;

        let renderer_config = &self.config.renderer;
        let stage = Stage::try_new(window, |window| Renderer::initialize(window, renderer_config))
            .context("renderer initialization failed")?;

        self.stage = Some(stage);
        self.queue = Some(queue);

        log::info!("`{}` initialized", self.name);
        Ok(())
    }

    /// Runs the frame loop until quit; returns the quit payload as exit code.
    pub fn run(&mut self) -> Result<i32> {
        let (Some(queue), Some(stage)) = (self.queue.as_mut(), self.stage.as_mut()) else {
            anyhow::bail!("`{}` was run before it was initialized", self.name);
        };

        let mut clock = FrameClock::new();
        stage.with_renderer_mut(|renderer| run_frame_loop(queue, renderer, &mut clock))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.stage.is_some()
    }

    pub fn window(&self) -> Option<&Window> {
        self.stage.as_ref().map(|stage| stage.borrow_window())
    }

    pub fn renderer(&self) -> Option<&Renderer<'_>> {
        self.stage.as_ref().map(|stage| stage.borrow_renderer())
    }
}

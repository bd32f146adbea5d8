//! Trigon engine crate.
//!
//! Owns the window, GPU device and the single-triangle render path, plus the
//! frame loop that drives them.

pub mod device;
pub mod window;
pub mod time;
pub mod game;

pub mod logging;
pub mod coords;
pub mod error;
pub mod geometry;
pub mod render;
pub mod shader;

pub use error::{InitError, Resource};
pub use game::{Game, GameConfig};

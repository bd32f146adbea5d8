//! Time subsystem.
//!
//! Frame timing decoupled from the wall clock so the frame loop can be driven
//! by a fake source in tests:
//! - `TimeSource` yields monotonic timestamps
//! - `FrameClock` turns consecutive timestamps into per-frame deltas

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime, MonotonicSource, TimeSource};

use std::time::{Duration, Instant};

/// Monotonic timestamp provider.
///
/// Timestamps are offsets from an arbitrary, fixed origin.
pub trait TimeSource {
    fn now(&mut self) -> Duration;
}

/// High-resolution monotonic clock backed by `Instant`.
#[derive(Debug, Clone)]
pub struct MonotonicSource {
    origin: Instant,
}

impl MonotonicSource {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicSource {
    #[inline]
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds. Never negative.
    pub dt: f32,

    /// Timestamp taken at the tick.
    pub now: Duration,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Produces `FrameTime` snapshots from a `TimeSource`.
///
/// Unclamped by default so `dt` tracks the wall clock between frames.
/// `with_clamps` bounds it for callers that simulate.
#[derive(Debug, Clone)]
pub struct FrameClock<S: TimeSource = MonotonicSource> {
    source: S,
    last: Duration,
    frame_index: u64,
    clamps: Option<(Duration, Duration)>,
}

impl FrameClock<MonotonicSource> {
    pub fn new() -> Self {
        Self::with_source(MonotonicSource::new())
    }
}

impl Default for FrameClock<MonotonicSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimeSource> FrameClock<S> {
    pub fn with_source(mut source: S) -> Self {
        let last = source.now();
        Self {
            source,
            last,
            frame_index: 0,
            clamps: None,
        }
    }

    /// Bounds every delta to `dt_min..=dt_max`.
    pub fn with_clamps(mut self, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        self.clamps = Some((dt_min, dt_max));
        self
    }

    /// Resets the baseline to the current timestamp.
    pub fn reset(&mut self) {
        self.last = self.source.now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = self.source.now();
        let mut dt = now.saturating_sub(self.last);

        if let Some((dt_min, dt_max)) = self.clamps {
            dt = dt.clamp(dt_min, dt_max);
        }

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Advances by a fixed step on every read.
    struct SteppingSource {
        now: Duration,
        step: Duration,
    }

    impl TimeSource for SteppingSource {
        fn now(&mut self) -> Duration {
            let t = self.now;
            self.now += self.step;
            t
        }
    }

    /// Replays a fixed list of timestamps, then repeats the last one.
    struct ScriptedSource(Vec<Duration>, usize);

    impl TimeSource for ScriptedSource {
        fn now(&mut self) -> Duration {
            let t = self.0[self.1.min(self.0.len() - 1)];
            self.1 += 1;
            t
        }
    }

    #[test]
    fn fixed_steps_yield_fixed_deltas() {
        let mut clock = FrameClock::with_source(SteppingSource {
            now: Duration::ZERO,
            step: Duration::from_millis(16),
        });

        for i in 0..5 {
            let ft = clock.tick();
            assert!((ft.dt - 0.016).abs() < 1e-6, "dt = {}", ft.dt);
            assert_eq!(ft.frame_index, i);
        }
    }

    #[test]
    fn backwards_timestamp_gives_zero_not_negative() {
        let mut clock = FrameClock::with_source(ScriptedSource(
            vec![Duration::from_millis(50), Duration::from_millis(40)],
            0,
        ));
        assert_eq!(clock.tick().dt, 0.0);
    }

    #[test]
    fn reset_moves_the_baseline() {
        let mut clock = FrameClock::with_source(ScriptedSource(
            vec![
                Duration::ZERO,
                Duration::from_millis(500),
                Duration::from_millis(510),
            ],
            0,
        ));
        clock.reset();
        let ft = clock.tick();
        assert!((ft.dt - 0.010).abs() < 1e-6);
    }

    #[test]
    fn clamps_bound_the_delta() {
        let mut clock = FrameClock::with_source(SteppingSource {
            now: Duration::ZERO,
            step: Duration::from_secs(2),
        })
        .with_clamps(Duration::from_micros(100), Duration::from_millis(250));

        assert!((clock.tick().dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn monotonic_source_never_goes_back() {
        let mut source = MonotonicSource::new();
        let a = source.now();
        let b = source.now();
        assert!(b >= a);
    }
}

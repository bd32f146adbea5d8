use anyhow::Result;

use crate::time::{FrameClock, TimeSource};

/// One message taken off a pump.
#[derive(Debug, Clone, PartialEq)]
pub enum Message<E> {
    /// Ends the loop; the payload becomes the process exit code.
    Quit(i32),
    Event(E),
}

/// Non-blocking source of OS messages.
pub trait MessagePump {
    type Event;

    /// Returns the next pending message without waiting for one.
    fn peek(&mut self) -> Option<Message<Self::Event>>;

    /// Runs the default handling for `event`.
    fn dispatch(&mut self, event: Self::Event);
}

/// What the loop drives when no message is pending.
pub trait FrameTarget {
    /// Called with the seconds elapsed since the previous frame, right before `render`.
    fn update(&mut self, delta_seconds: f32);

    fn render(&mut self) -> Result<()>;
}

/// Pump messages, else render, until a quit message arrives.
///
/// Returns the quit payload. A render error ends the loop and is returned.
pub fn run_frame_loop<P, T, S>(pump: &mut P, target: &mut T, clock: &mut FrameClock<S>) -> Result<i32>
where
    P: MessagePump,
    T: FrameTarget,
    S: TimeSource,
{
    clock.reset();

    loop {
        match pump.peek() {
            Some(Message::Quit(code)) => {
                log::info!("quit received, exit code {code}");
                return Ok(code);
            }
            Some(Message::Event(event)) => pump.dispatch(event),
            None => {
                let ft = clock.tick();
                target.update(ft.dt);
                target.render()?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;

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

    /// Replays a script; `None` entries are idle polls.
    struct ScriptedPump {
        script: VecDeque<Option<Message<&'static str>>>,
        dispatched: Vec<&'static str>,
    }

    impl ScriptedPump {
        fn new(script: Vec<Option<Message<&'static str>>>) -> Self {
            Self {
                script: script.into(),
                dispatched: Vec::new(),
            }
        }
    }

    impl MessagePump for ScriptedPump {
        type Event = &'static str;

        fn peek(&mut self) -> Option<Message<&'static str>> {
            self.script.pop_front().flatten()
        }

        fn dispatch(&mut self, event: &'static str) {
            if event == "close" {
                self.script.push_front(Some(Message::Quit(0)));
            }
            self.dispatched.push(event);
        }
    }

    #[derive(Default)]
    struct RecordingTarget {
        calls: Vec<&'static str>,
        deltas: Vec<f32>,
        fail_on_render: bool,
    }

    impl FrameTarget for RecordingTarget {
        fn update(&mut self, delta_seconds: f32) {
            self.calls.push("update");
            self.deltas.push(delta_seconds);
        }

        fn render(&mut self) -> Result<()> {
            self.calls.push("render");
            if self.fail_on_render {
                anyhow::bail!("device lost");
            }
            Ok(())
        }
    }

    fn clock_16ms() -> FrameClock<SteppingSource> {
        FrameClock::with_source(SteppingSource {
            now: Duration::ZERO,
            step: Duration::from_millis(16),
        })
    }

    #[test]
    fn returns_quit_payload() {
        for code in [0, 42, -1] {
            let mut pump = ScriptedPump::new(vec![None, Some(Message::Quit(code))]);
            let mut target = RecordingTarget::default();
            let result = run_frame_loop(&mut pump, &mut target, &mut clock_16ms()).unwrap();
            assert_eq!(result, code);
        }
    }

    #[test]
    fn renders_only_when_queue_is_idle() {
        let mut pump = ScriptedPump::new(vec![
            Some(Message::Event("focus")),
            None,
            Some(Message::Event("key")),
            Some(Message::Event("key")),
            None,
            None,
            Some(Message::Quit(3)),
        ]);
        let mut target = RecordingTarget::default();

        let code = run_frame_loop(&mut pump, &mut target, &mut clock_16ms()).unwrap();

        assert_eq!(code, 3);
        assert_eq!(pump.dispatched, vec!["focus", "key", "key"]);
        assert_eq!(target.deltas.len(), 3);
    }

    #[test]
    fn update_precedes_render_every_frame() {
        let mut pump = ScriptedPump::new(vec![None, None, Some(Message::Quit(0))]);
        let mut target = RecordingTarget::default();

        run_frame_loop(&mut pump, &mut target, &mut clock_16ms()).unwrap();

        assert_eq!(target.calls, vec!["update", "render", "update", "render"]);
    }

    #[test]
    fn update_receives_elapsed_seconds() {
        let mut pump = ScriptedPump::new(vec![None, None, None, None, Some(Message::Quit(0))]);
        let mut target = RecordingTarget::default();

        run_frame_loop(&mut pump, &mut target, &mut clock_16ms()).unwrap();

        assert_eq!(target.deltas.len(), 4);
        for dt in target.deltas {
            assert!(dt >= 0.0);
            assert!((dt - 0.016).abs() < 1e-6, "dt = {dt}");
        }
    }

    #[test]
    fn dispatched_close_ends_the_loop() {
        let mut pump = ScriptedPump::new(vec![None, Some(Message::Event("close")), None, None]);
        let mut target = RecordingTarget::default();

        let code = run_frame_loop(&mut pump, &mut target, &mut clock_16ms()).unwrap();

        assert_eq!(code, 0);
        assert_eq!(target.deltas.len(), 1);
    }

    #[test]
    fn render_failure_is_fatal() {
        let mut pump = ScriptedPump::new(vec![None, Some(Message::Quit(0))]);
        let mut target = RecordingTarget {
            fail_on_render: true,
            ..Default::default()
        };

        let err = run_frame_loop(&mut pump, &mut target, &mut clock_16ms()).unwrap_err();
        assert!(err.to_string().contains("device lost"));
    }
}

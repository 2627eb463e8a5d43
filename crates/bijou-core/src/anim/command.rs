//! Commands that drive a spring or tween to completion, emitting one
//! message per frame.

use std::time::Duration;

use crate::anim::spring::{SpringConfig, SpringState};
use crate::anim::tween::{tween_step, Easing};
use crate::command::Command;

/// Which motion function drives an [`animate`] command.
pub enum AnimateMotion {
    /// Spring physics toward the target.
    Spring(SpringConfig),
    /// Eased interpolation over a fixed duration.
    Tween {
        /// Total duration in milliseconds.
        duration_ms: f64,
        /// Easing curve.
        easing: Easing,
    },
}

/// Configuration for [`animate`].
pub struct AnimateOptions<M: Send + 'static> {
    from: f64,
    to: f64,
    motion: AnimateMotion,
    fps: u32,
    on_frame: Box<dyn Fn(f64) -> M + Send>,
    on_complete: Option<M>,
}

impl<M: Send + 'static> AnimateOptions<M> {
    /// Start a new options builder. `on_frame` maps the current value
    /// to a message emitted once per frame.
    pub fn new(
        from: f64,
        to: f64,
        motion: AnimateMotion,
        on_frame: impl Fn(f64) -> M + Send + 'static,
    ) -> Self {
        Self { from, to, motion, fps: 60, on_frame: Box::new(on_frame), on_complete: None }
    }

    /// Override the default 60fps frame rate.
    #[must_use]
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Emit this message once, after the final frame.
    #[must_use]
    pub fn on_complete(mut self, msg: M) -> Self {
        self.on_complete = Some(msg);
        self
    }
}

/// Build a command that steps a spring or tween to completion,
/// emitting `on_frame(value)` once per frame and `on_complete` (if
/// set) after the last frame. An immediate spring, or a tween with a
/// zero duration, emits exactly one frame at the target.
pub fn animate<M: Send + 'static>(opts: AnimateOptions<M>) -> Command<M> {
    Command::new(move |emitter| async move {
        let AnimateOptions { from, to, motion, fps, on_frame, on_complete } = opts;
        let frame = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));

        match motion {
            AnimateMotion::Spring(config) => {
                let mut state = SpringState::new(from, to);
                loop {
                    state = state.step(frame.as_secs_f64(), &config);
                    emitter.send((on_frame)(state.position));
                    if state.done {
                        break;
                    }
                    tokio::time::sleep(frame).await;
                }
            }
            AnimateMotion::Tween { duration_ms, easing } => {
                let mut elapsed_ms = 0.0;
                loop {
                    elapsed_ms += frame.as_secs_f64() * 1000.0;
                    let (value, done) = tween_step(from, to, duration_ms, easing, elapsed_ms);
                    emitter.send((on_frame)(value));
                    if done {
                        break;
                    }
                    tokio::time::sleep(frame).await;
                }
            }
        }

        if let Some(msg) = on_complete {
            emitter.send(msg);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Emitted, Emitter};
    use std::sync::{Arc, Mutex};

    fn collecting_emitter() -> (Emitter<f64>, Arc<Mutex<Vec<f64>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let clone = Arc::clone(&received);
        let emitter = Emitter::new(move |e| {
            if let Emitted::Message(v) = e {
                clone.lock().unwrap_or_else(|p| p.into_inner()).push(v);
            }
        });
        (emitter, received)
    }

    #[tokio::test]
    async fn immediate_spring_emits_one_frame() {
        let (emitter, received) = collecting_emitter();
        let config = SpringConfig { immediate: true, ..Default::default() };
        let opts = AnimateOptions::new(0.0, 10.0, AnimateMotion::Spring(config), |v| v)
            .on_complete(f64::NAN);
        animate(opts).run(emitter).await;
        let values = received.lock().unwrap_or_else(|p| p.into_inner());
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], 10.0);
        assert!(values[1].is_nan());
    }

    #[tokio::test]
    async fn zero_duration_tween_emits_one_frame() {
        let (emitter, received) = collecting_emitter();
        let opts = AnimateOptions::new(
            0.0,
            5.0,
            AnimateMotion::Tween { duration_ms: 0.0, easing: Easing::Linear },
            |v| v,
        );
        animate(opts).run(emitter).await;
        let values = received.lock().unwrap_or_else(|p| p.into_inner());
        assert_eq!(values.as_slice(), [5.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn spring_settles_to_target_over_several_frames() {
        let (emitter, received) = collecting_emitter();
        let opts =
            AnimateOptions::new(0.0, 1.0, AnimateMotion::Spring(SpringConfig::default()), |v| v)
                .fps(60);
        let handle = tokio::spawn(animate(opts).run(emitter));
        for _ in 0..200 {
            tokio::time::advance(Duration::from_millis(16)).await;
        }
        handle.await.expect("animation task panicked");
        let values = received.lock().unwrap_or_else(|p| p.into_inner());
        assert!(values.last().is_some_and(|last| (*last - 1.0).abs() < 1e-6));
    }

    #[tokio::test(start_paused = true)]
    async fn tween_reaches_target_after_duration() {
        let (emitter, received) = collecting_emitter();
        let opts = AnimateOptions::new(
            0.0,
            100.0,
            AnimateMotion::Tween { duration_ms: 200.0, easing: Easing::Linear },
            |v| v,
        )
        .fps(60);
        let handle = tokio::spawn(animate(opts).run(emitter));
        for _ in 0..40 {
            tokio::time::advance(Duration::from_millis(16)).await;
        }
        handle.await.expect("animation task panicked");
        let values = received.lock().unwrap_or_else(|p| p.into_inner());
        assert_eq!(*values.last().unwrap(), 100.0);
    }
}

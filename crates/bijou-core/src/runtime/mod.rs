//! Ports, the event bus, screen lifecycle, and the TEA runtime loop.

mod bus;
mod context;
mod screen;
mod tea;

pub use bus::{EventBus, InputEvent};
pub use context::{detect_output_mode, BoxFuture, Context, EnvSnapshot, Handle, IoPort, OutputMode, Runtime, StylePort, ThemePort};
pub use tea::{run, App};

/// Screen control sequences, exposed for backends that want to drive
/// the lifecycle manually instead of through [`run`].
pub mod screen_ops {
    pub use super::screen::{clear, enter, exit, render_frame};
}

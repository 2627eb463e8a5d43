//! Spring and tween primitives, the commands that drive them, and the
//! timeline compiler that sequences them.

mod command;
mod spring;
mod timeline;
mod tween;

pub use command::{animate, AnimateMotion, AnimateOptions};
pub use spring::{estimate_duration_ms, SpringConfig, SpringState};
pub use timeline::{Motion, Timeline, TimelineBuilder, TimelineState};
pub use tween::{tween_step, Easing};

//! Bijou's core engine: deterministic grid composition, DAG layout,
//! the TEA runtime and event bus, and the animation kernel.
//!
//! This crate has no component catalog of its own — it is the
//! substrate a terminal UI toolkit's widgets render through.

pub mod anim;
pub mod ansi;
pub mod command;
pub mod dag;
pub mod error;
pub mod flex;
pub mod input;
pub mod runtime;
pub mod theme;
pub mod token;
pub mod viewport;

pub use error::{BijouError, Result};

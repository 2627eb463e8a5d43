//! Error taxonomy for the bijou engine.
//!
//! One variant per *kind* of failure, not per call site.
//! Construction-time errors (malformed timelines, unbounded sources)
//! abort construction; runtime errors inside a command are swallowed
//! by the command task per the concurrency model and never reach here.

use std::io;

/// The error type for all fallible bijou-core operations.
#[derive(Debug, thiserror::Error)]
pub enum BijouError {
    /// DAG rendering saw a cycle, including a self-loop.
    #[error("cycle detected")]
    CyclicGraph,

    /// `dag()`/`layout()` was called on an unbounded `DagSource` without
    /// first narrowing it with `slice()`.
    #[error("unbounded DagSource: call slice() before layout()")]
    UnboundedSource,

    /// Ancestor traversal was requested on a source with no `parents` method.
    #[error("source does not support ancestor traversal: missing parents()")]
    UnsupportedSlice,

    /// A timeline position token referenced an unknown label or was malformed.
    #[error("bad timeline position: {reason}")]
    BadTimeline {
        /// Human-readable explanation of what was malformed.
        reason: String,
    },

    /// Two tracks in the same timeline shared a name.
    #[error("duplicate track name: {name}")]
    DuplicateTrack {
        /// The name that was registered twice.
        name: String,
    },

    /// `step()` was called with a negative, NaN, or infinite `dt`.
    #[error("bad step: dt must be finite and non-negative")]
    BadStep,

    /// A selection-style prompt had no options and no default.
    #[error("no options provided and no default set")]
    EmptyOptions,

    /// Underlying I/O failure (terminal write, raw mode, file read).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A style/theme/token value failed to parse (bad hex, unknown easing).
    #[error("style error: {0}")]
    Style(String),
}

/// Result type alias for bijou-core operations.
pub type Result<T> = std::result::Result<T, BijouError>;

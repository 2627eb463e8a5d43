//! Position-language timeline compiler and pure-step evaluator.

use std::collections::HashMap;

use crate::anim::spring::{estimate_duration_ms, SpringConfig, SpringState};
use crate::anim::tween::{tween_step, Easing};
use crate::error::{BijouError, Result};

/// Which motion function drives a compiled track.
#[derive(Debug, Clone)]
pub enum Motion {
    /// Eased interpolation over a fixed duration.
    Tween {
        /// Total duration in milliseconds.
        duration_ms: f64,
        /// Easing curve.
        easing: Easing,
    },
    /// Spring physics; duration is estimated at compile time.
    Spring(SpringConfig),
}

/// A resolved position-grammar token.
#[derive(Debug, Clone)]
enum Position {
    Absolute(f64),
    PrevEnd,
    PrevStart,
    PrevStartPlus(f64),
    PrevEndPlus(f64),
    PrevEndMinus(f64),
    Label(String),
    LabelPlus(String, f64),
}

impl Position {
    /// Tokens that describe a position relative to the running cursor
    /// advance that cursor once resolved. Absolute and label-anchored
    /// tokens place a track "out of band" and leave the cursor where
    /// it was.
    fn advances_cursor(&self) -> bool {
        !matches!(self, Self::Absolute(_) | Self::Label(_) | Self::LabelPlus(_, _))
    }
}

fn parse_position(token: &str) -> Result<Position> {
    let bad = |reason: &str| BijouError::BadTimeline { reason: format!("{reason}: {token:?}") };

    if token == "<" {
        return Ok(Position::PrevStart);
    }
    if let Some(rest) = token.strip_prefix("<+=") {
        return rest
            .parse::<f64>()
            .map(Position::PrevStartPlus)
            .map_err(|_| bad("malformed <+=N token"));
    }
    if let Some(rest) = token.strip_prefix("+=") {
        return rest.parse::<f64>().map(Position::PrevEndPlus).map_err(|_| bad("malformed +=N token"));
    }
    if let Some(rest) = token.strip_prefix("-=") {
        return rest.parse::<f64>().map(Position::PrevEndMinus).map_err(|_| bad("malformed -=N token"));
    }
    if let Some(rest) = token.strip_prefix(">=").or_else(|| token.strip_prefix('>')) {
        return rest.parse::<f64>().map(Position::PrevEndPlus).map_err(|_| bad("malformed >N token"));
    }
    if let Ok(value) = token.parse::<f64>() {
        return Ok(Position::Absolute(value.max(0.0)));
    }
    if let Some((name, offset)) = token.split_once("+=") {
        if name.is_empty() {
            return Err(bad("empty label name"));
        }
        return offset
            .parse::<f64>()
            .map(|n| Position::LabelPlus(name.to_string(), n))
            .map_err(|_| bad("malformed name+=N token"));
    }
    if token.is_empty() {
        return Err(bad("empty position token"));
    }
    Ok(Position::Label(token.to_string()))
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    prev_start_ms: f64,
    prev_end_ms: f64,
}

enum Entry {
    Track { name: String, from: f64, to: f64, motion: Motion, position: Option<Position> },
    Label(String),
    Callback { name: String, position: Position },
}

/// Collects track/label/callback entries in declaration order, then
/// resolves them into a [`Timeline`].
#[derive(Default)]
pub struct TimelineBuilder {
    entries: Vec<Entry>,
}

impl TimelineBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track. `position` is a raw position-grammar token;
    /// `None` behaves like the omitted token (chain after the cursor).
    #[must_use]
    pub fn add(
        mut self,
        name: impl Into<String>,
        from: f64,
        to: f64,
        motion: Motion,
        position: Option<&str>,
    ) -> Result<Self> {
        let position = position.map(parse_position).transpose()?;
        self.entries.push(Entry::Track { name: name.into(), from, to, motion, position });
        Ok(self)
    }

    /// Record a label at the cursor's current `prev_end_ms`.
    #[must_use]
    pub fn label(mut self, name: impl Into<String>) -> Self {
        self.entries.push(Entry::Label(name.into()));
        self
    }

    /// Schedule a named callback at a resolved position. Callbacks
    /// never move the cursor.
    #[must_use]
    pub fn call(mut self, name: impl Into<String>, position: &str) -> Result<Self> {
        let position = parse_position(position)?;
        self.entries.push(Entry::Callback { name: name.into(), position });
        Ok(self)
    }

    /// Resolve every entry into a compiled [`Timeline`].
    pub fn compile(self) -> Result<Timeline> {
        let mut cursor = Cursor { prev_start_ms: 0.0, prev_end_ms: 0.0 };
        let mut labels: HashMap<String, f64> = HashMap::new();
        let mut tracks: Vec<CompiledTrack> = Vec::new();
        let mut callbacks: Vec<(String, f64)> = Vec::new();

        for entry in self.entries {
            match entry {
                Entry::Track { name, from, to, motion, position } => {
                    if tracks.iter().any(|t| t.name == name) {
                        return Err(BijouError::DuplicateTrack { name });
                    }
                    let position = position.unwrap_or(Position::PrevEnd);
                    let start = resolve(&position, &cursor, &labels)?;
                    let duration_ms = match &motion {
                        Motion::Tween { duration_ms, .. } => *duration_ms,
                        Motion::Spring(config) => estimate_duration_ms(from, to, config),
                    };
                    let end = start + duration_ms.max(0.0);
                    if position.advances_cursor() {
                        cursor = Cursor { prev_start_ms: start, prev_end_ms: end };
                    }
                    tracks.push(CompiledTrack { name, from, to, motion, start, end });
                }
                Entry::Label(name) => {
                    labels.insert(name, cursor.prev_end_ms);
                }
                Entry::Callback { name, position } => {
                    let time = resolve(&position, &cursor, &labels)?.max(0.0);
                    callbacks.push((name, time));
                }
            }
        }

        callbacks.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(Timeline { tracks, callbacks })
    }
}

fn resolve(position: &Position, cursor: &Cursor, labels: &HashMap<String, f64>) -> Result<f64> {
    match position {
        Position::Absolute(v) => Ok(*v),
        Position::PrevEnd => Ok(cursor.prev_end_ms),
        Position::PrevStart => Ok(cursor.prev_start_ms),
        Position::PrevStartPlus(n) => Ok(cursor.prev_start_ms + n),
        Position::PrevEndPlus(n) => Ok(cursor.prev_end_ms + n),
        Position::PrevEndMinus(n) => Ok((cursor.prev_end_ms - n).max(0.0)),
        Position::Label(name) => labels.get(name).copied().ok_or_else(|| BijouError::BadTimeline {
            reason: format!("unknown label {name:?}"),
        }),
        Position::LabelPlus(name, n) => labels
            .get(name)
            .copied()
            .map(|t| t + n)
            .ok_or_else(|| BijouError::BadTimeline { reason: format!("unknown label {name:?}") }),
    }
}

struct CompiledTrack {
    name: String,
    from: f64,
    to: f64,
    motion: Motion,
    start: f64,
    end: f64,
}

/// A compiled, immutable timeline: resolved tracks and sorted callbacks.
pub struct Timeline {
    tracks: Vec<CompiledTrack>,
    callbacks: Vec<(String, f64)>,
}

impl Timeline {
    /// Callback names paired with their resolved trigger time, sorted
    /// ascending.
    pub fn callbacks(&self) -> &[(String, f64)] {
        &self.callbacks
    }

    /// Build the initial state: every track parked at its `from`
    /// value, nothing started.
    pub fn new_state(&self) -> TimelineState {
        TimelineState {
            elapsed_ms: 0.0,
            tracks: self.tracks.iter().map(|t| TrackState { value: t.from, done: false, spring: None }).collect(),
        }
    }

    /// Advance every track by `dt_seconds`, initialising any track
    /// whose start is crossed this step.
    pub fn step(&self, state: &TimelineState, dt_seconds: f64) -> Result<TimelineState> {
        if !dt_seconds.is_finite() || dt_seconds < 0.0 {
            return Err(BijouError::BadStep);
        }
        let next_elapsed = state.elapsed_ms + dt_seconds * 1000.0;
        let mut tracks = Vec::with_capacity(self.tracks.len());

        for (track, prev) in self.tracks.iter().zip(state.tracks.iter()) {
            if prev.done {
                tracks.push(prev.clone());
                continue;
            }
            if next_elapsed < track.start {
                tracks.push(prev.clone());
                continue;
            }

            match &track.motion {
                Motion::Tween { duration_ms, easing } => {
                    let local_elapsed = next_elapsed - track.start;
                    let (value, done) = tween_step(track.from, track.to, *duration_ms, *easing, local_elapsed);
                    tracks.push(TrackState { value, done, spring: None });
                }
                Motion::Spring(config) => match &prev.spring {
                    None => {
                        let fresh = SpringState::new(track.from, track.to);
                        tracks.push(TrackState { value: fresh.position, done: fresh.done, spring: Some(fresh) });
                    }
                    Some(spring) => {
                        let stepped = spring.step(dt_seconds, config);
                        tracks.push(TrackState { value: stepped.position, done: stepped.done, spring: Some(stepped) });
                    }
                },
            }
        }

        Ok(TimelineState { elapsed_ms: next_elapsed, tracks })
    }

    /// Callback names whose trigger time lies in `(prev, next]`,
    /// except at time zero, which fires on the first step away from
    /// `elapsed_ms == 0`.
    pub fn fired_callbacks(&self, prev: &TimelineState, next: &TimelineState) -> Vec<String> {
        self.callbacks
            .iter()
            .filter(|(_, time)| {
                let crosses = *time > prev.elapsed_ms && *time <= next.elapsed_ms;
                let at_zero = *time == 0.0 && prev.elapsed_ms == 0.0 && next.elapsed_ms > 0.0;
                crosses || at_zero
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Project each track's current value into a name→value map.
    pub fn values(&self, state: &TimelineState) -> HashMap<String, f64> {
        self.tracks.iter().zip(state.tracks.iter()).map(|(t, s)| (t.name.clone(), s.value)).collect()
    }

    /// True once every track has finished.
    pub fn done(&self, state: &TimelineState) -> bool {
        state.tracks.iter().all(|t| t.done)
    }
}

#[derive(Clone)]
struct TrackState {
    value: f64,
    done: bool,
    spring: Option<SpringState>,
}

/// Mutable simulation state for a [`Timeline`]. Stepping is pure:
/// `step` returns a new state rather than mutating.
pub struct TimelineState {
    elapsed_ms: f64,
    tracks: Vec<TrackState>,
}

impl TimelineState {
    /// Milliseconds of simulated time elapsed so far.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }
}

//! Semi-implicit Euler spring integrator.

/// Tunable spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    /// Spring stiffness.
    pub stiffness: f64,
    /// Damping coefficient.
    pub damping: f64,
    /// Settle precision: both position error and velocity must fall
    /// under this threshold.
    pub precision: f64,
    /// Bypass integration and jump straight to the target.
    pub immediate: bool,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self { stiffness: 170.0, damping: 26.0, precision: 0.01, immediate: false }
    }
}

impl SpringConfig {
    /// A soft, slow-settling spring.
    pub fn gentle() -> Self {
        Self { stiffness: 120.0, damping: 14.0, ..Default::default() }
    }

    /// A bouncy, underdamped spring.
    pub fn wobbly() -> Self {
        Self { stiffness: 40.0, damping: 8.0, ..Default::default() }
    }

    /// A snappy, near-critically-damped spring.
    pub fn stiff() -> Self {
        Self { stiffness: 210.0, damping: 20.0, ..Default::default() }
    }

    /// A heavy, slow spring.
    pub fn slow() -> Self {
        Self { stiffness: 280.0, damping: 60.0, ..Default::default() }
    }
}

/// Current spring simulation state. Value type: stepping returns a
/// new state rather than mutating in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringState {
    /// Current position.
    pub position: f64,
    /// Current velocity.
    pub velocity: f64,
    /// Target position.
    pub target: f64,
    /// True once settled (position snapped to target, velocity zeroed).
    pub done: bool,
}

impl SpringState {
    /// Start a spring at `from`, moving toward `target`.
    pub fn new(from: f64, target: f64) -> Self {
        Self { position: from, velocity: 0.0, target, done: false }
    }

    /// Advance one step of `dt` seconds. Once `done`, subsequent steps
    /// are fixed points.
    #[must_use]
    pub fn step(self, dt: f64, config: &SpringConfig) -> Self {
        if self.done {
            return self;
        }
        if config.immediate {
            return Self { position: self.target, velocity: 0.0, target: self.target, done: true };
        }
        let displacement = self.position - self.target;
        let accel = -config.stiffness * displacement - config.damping * self.velocity;
        let velocity = self.velocity + accel * dt;
        let position = self.position + velocity * dt;

        if (position - self.target).abs() < config.precision && velocity.abs() < config.precision {
            Self { position: self.target, velocity: 0.0, target: self.target, done: true }
        } else {
            Self { position, velocity, target: self.target, done: false }
        }
    }
}

/// Estimate a spring's settling duration in milliseconds by
/// simulating at 60 fps, capped at 30 seconds.
pub fn estimate_duration_ms(from: f64, to: f64, config: &SpringConfig) -> f64 {
    if config.immediate {
        return 0.0;
    }
    let dt = 1.0 / 60.0;
    let cap_steps = (30.0 / dt) as u32;
    let mut state = SpringState::new(from, to);
    let mut steps = 0u32;
    while !state.done && steps < cap_steps {
        state = state.step(dt, config);
        steps += 1;
    }
    f64::from(steps) * dt * 1000.0
}

//! Tick timing
//!
//! The engine is advanced with caller-measured elapsed times. Every component
//! clamps that value into a safe window before integrating, so stalls and
//! zero-length ticks never propagate into the physics.

/// Lower bound applied to a tick's elapsed time (s)
pub const MIN_ELAPSED_S: f64 = 0.001;
/// Upper bound applied to a tick's elapsed time (s)
pub const MAX_ELAPSED_S: f64 = 1.0;

/// Clamp a caller-measured elapsed time into [`MIN_ELAPSED_S`, `MAX_ELAPSED_S`].
///
/// Non-finite input is treated as a stall and mapped to the lower bound.
pub fn clamp_elapsed(elapsed_s: f64) -> f64 {
    if !elapsed_s.is_finite() {
        return MIN_ELAPSED_S;
    }
    elapsed_s.clamp(MIN_ELAPSED_S, MAX_ELAPSED_S)
}

/// Fixed control-period scheduler for realtime runners.
///
/// Accumulates wall-clock time and reports how many control periods have
/// elapsed. The remainder is carried to the next call.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    pub period_s: f64,
    pub accumulator: f64,
}

impl TickScheduler {
    pub fn new(period_s: f64) -> Self {
        TickScheduler {
            period_s: period_s.max(MIN_ELAPSED_S),
            accumulator: 0.0,
        }
    }

    /// Add `wall_dt` seconds and return the number of whole periods now due.
    pub fn advance(&mut self, wall_dt: f64) -> usize {
        if wall_dt.is_finite() && wall_dt > 0.0 {
            self.accumulator += wall_dt;
        }

        let mut due = 0;
        while self.accumulator >= self.period_s {
            self.accumulator -= self.period_s;
            due += 1;
        }
        due
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

//! Fixed-timestep pacing for the host loop.

use std::time::Duration;

/// Turns wall-clock time into a whole number of simulation steps.
#[derive(Clone, Debug)]
pub struct FrameClock {
    step: Duration,
    max_catch_up: u32,
    accumulator: Duration,
}

impl FrameClock {
    pub fn new(step: Duration, max_catch_up: u32) -> Self {
        Self {
            step,
            max_catch_up: max_catch_up.max(1),
            accumulator: Duration::ZERO,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Add `elapsed` and return how many steps are due. Backlog beyond
    /// `max_catch_up` steps is dropped so a stall never turns into a burst.
    pub fn accumulate(&mut self, elapsed: Duration) -> u32 {
        if self.step.is_zero() {
            return 1;
        }
        self.accumulator += elapsed;
        let mut due = 0;
        while self.accumulator >= self.step && due < self.max_catch_up {
            self.accumulator -= self.step;
            due += 1;
        }
        if due == self.max_catch_up && self.accumulator >= self.step {
            let backlog = self.accumulator;
            tracing::debug!(?backlog, "frame backlog dropped");
            self.accumulator = Duration::ZERO;
        }
        due
    }

    /// Time left until the next step is due.
    pub fn until_next(&self) -> Duration {
        self.step.saturating_sub(self.accumulator)
    }
}

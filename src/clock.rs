//! Fixed-interval drivers folded into one loop.
//!
//! Each driver keeps its own phase, so a frontend can feed arbitrary
//! wall-clock deltas and still get the same effective periods as separate
//! timers would.

use std::time::Duration;

use crate::config::Tuning;

/// What a firing clock asks the session to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Driver {
    Spawn,
    Frame,
    Second,
    Backdrop,
}

#[derive(Clone, Debug)]
pub struct Clock {
    period: Duration,
    elapsed: Duration,
}

impl Clock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            elapsed: Duration::ZERO,
        }
    }

    pub fn until_due(&self) -> Duration {
        self.period.saturating_sub(self.elapsed)
    }

    /// Add `dt` to the phase; true if the clock fired. At most one firing per call.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.period {
            self.elapsed -= self.period;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// The four session drivers. Listed in the order they fire when due at the
/// same instant.
#[derive(Clone, Debug)]
pub struct Scheduler {
    clocks: [(Driver, Clock); 4],
}

impl Scheduler {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            clocks: [
                (Driver::Spawn, Clock::new(tuning.spawn_period)),
                (Driver::Frame, Clock::new(tuning.frame_period)),
                (Driver::Second, Clock::new(tuning.clock_period)),
                (Driver::Backdrop, Clock::new(tuning.backdrop_period)),
            ],
        }
    }

    pub fn reset(&mut self) {
        for (_, clock) in &mut self.clocks {
            clock.reset();
        }
    }

    /// Advance every clock by `dt` and return the firings in chronological
    /// order.
    pub fn advance(&mut self, dt: Duration) -> Vec<Driver> {
        let mut fired = Vec::new();
        let mut remaining = dt;

        loop {
            let step = self
                .clocks
                .iter()
                .map(|(_, clock)| clock.until_due())
                .min()
                .unwrap_or(Duration::MAX);
            if step > remaining {
                for (_, clock) in &mut self.clocks {
                    clock.advance(remaining);
                }
                break;
            }
            remaining -= step;
            for (driver, clock) in &mut self.clocks {
                if clock.advance(step) {
                    fired.push(*driver);
                }
            }
        }

        fired
    }
}

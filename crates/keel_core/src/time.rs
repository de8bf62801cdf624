//! Fixed-timestep helpers
//!
//! `World::update` takes whatever delta the driver passes; these helpers
//! turn variable real-time frames into a stable tick cadence.

use std::time::Duration;

/// Default simulation tick rate.
pub const TICK_RATE_HZ: u32 = 60;

/// Seconds per tick at [`TICK_RATE_HZ`].
pub const TICK_DT: f32 = 1.0 / TICK_RATE_HZ as f32;

/// Accumulates real elapsed time and hands out whole fixed steps.
pub struct FixedTimestep {
    step: Duration,
    accumulated: Duration,
    tick_count: u64,
}

impl FixedTimestep {
    /// A timestep of `step` per tick.
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            accumulated: Duration::ZERO,
            tick_count: 0,
        }
    }

    /// The default 60 Hz timestep.
    pub fn at_tick_rate() -> Self {
        Self::new(Duration::from_secs_f32(TICK_DT))
    }

    /// Feed real elapsed time into the accumulator.
    pub fn advance(&mut self, elapsed: Duration) {
        self.accumulated += elapsed;
    }

    /// Take one pending fixed step, if a full one has accumulated.
    ///
    /// Returns the step delta in seconds, ready to pass to
    /// `World::update`. Call in a loop to catch up after a long frame.
    pub fn drain(&mut self) -> Option<f32> {
        if self.accumulated < self.step {
            return None;
        }
        self.accumulated -= self.step;
        self.tick_count += 1;
        Some(self.step.as_secs_f32())
    }

    /// Ticks drained so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::at_tick_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_yields_whole_steps() {
        let mut clock = FixedTimestep::new(Duration::from_millis(10));
        clock.advance(Duration::from_millis(35));

        assert_eq!(clock.drain(), Some(0.01));
        assert_eq!(clock.drain(), Some(0.01));
        assert_eq!(clock.drain(), Some(0.01));
        assert_eq!(clock.drain(), None);
        assert_eq!(clock.tick_count(), 3);
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut clock = FixedTimestep::new(Duration::from_millis(10));
        clock.advance(Duration::from_millis(6));
        assert_eq!(clock.drain(), None);

        clock.advance(Duration::from_millis(6));
        assert_eq!(clock.drain(), Some(0.01));
        assert_eq!(clock.drain(), None);
    }
}

//! Simulation clock.
//!
//! Every timer in the simulation (re-rolls, perception cadence, trail ages,
//! respawns, weather) reads this clock, never wall time.

use bevy_ecs::prelude::*;

/// Elapsed simulation time and tick count.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock {
    elapsed: f64,
    pub tick: u64,
}

impl SimClock {
    /// A clock already at `ms` milliseconds.
    pub fn at_ms(ms: u64) -> Self {
        Self {
            elapsed: ms as f64 / 1000.0,
            tick: 0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt as f64;
        self.tick = self.tick.wrapping_add(1);
    }

    /// Elapsed time in whole milliseconds.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        (self.elapsed * 1000.0).round() as u64
    }

    /// Elapsed time in seconds, for animation phases.
    #[inline]
    pub fn seconds(&self) -> f32 {
        self.elapsed as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_in_ms() {
        let mut clock = SimClock::default();
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert_eq!(clock.tick, 60);
        assert_eq!(clock.now_ms(), 1000);
        assert_eq!(SimClock::at_ms(20_000).now_ms(), 20_000);
    }
}

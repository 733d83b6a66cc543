//! Time management utilities

use std::time::Instant;

/// How a [`FrameClock`] produces frame deltas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockMode {
    /// Every frame advances by the same step (seconds)
    Fixed(f32),
    /// Frames advance by measured wall-clock time
    Variable,
}

/// Frame clock feeding delta time into the simulation
///
/// The streaming core only ever sees the delta this clock hands out, so the
/// same code path runs under a deterministic fixed step (tests, headless
/// runs) and under real time.
pub struct FrameClock {
    mode: ClockMode,
    last_frame: Instant,
    total_time: f64,
    frame_count: u64,
}

impl FrameClock {
    /// Create a clock with the given mode
    pub fn new(mode: ClockMode) -> Self {
        Self {
            mode,
            last_frame: Instant::now(),
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Create a fixed-step clock
    pub fn fixed(step: f32) -> Self {
        Self::new(ClockMode::Fixed(step))
    }

    /// Advance one frame and return its delta time in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta_time = match self.mode {
            ClockMode::Fixed(step) => step,
            ClockMode::Variable => now.duration_since(self.last_frame).as_secs_f32(),
        };
        self.last_frame = now;
        self.total_time += f64::from(delta_time);
        self.frame_count += 1;
        delta_time
    }

    /// Total simulated time since creation
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Number of frames ticked
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Clock mode
    pub fn mode(&self) -> ClockMode {
        self.mode
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(ClockMode::Variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_accumulates() {
        let mut clock = FrameClock::fixed(0.5);
        assert_eq!(clock.tick(), 0.5);
        assert_eq!(clock.tick(), 0.5);

        assert_eq!(clock.frame_count(), 2);
        assert!((clock.total_time() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_variable_clock_is_non_negative() {
        let mut clock = FrameClock::default();
        assert!(clock.tick() >= 0.0);
        assert_eq!(clock.mode(), ClockMode::Variable);
    }
}

//! Slope-driven travel speed
//!
//! Steeper chunks are faster. Entering a segment sets a target speed from
//! its tilt; each fixed step then ramps the current speed toward the target
//! by a constant factor without overshooting.

use crate::config::SlopeSpeedConfig;
use crate::foundation::math::utils;

/// Speed floor used before multiplying up from a standstill
const RESTART_SPEED: f32 = 1e-3;

/// Slope speed controller
#[derive(Debug, Clone)]
pub struct SlopeSpeed {
    config: SlopeSpeedConfig,
    target: f32,
}

impl SlopeSpeed {
    /// Create a controller targeting the minimum speed
    pub fn new(config: SlopeSpeedConfig) -> Self {
        Self {
            target: config.min_speed,
            config,
        }
    }

    /// Target speed for a segment tilted by `tilt_degrees`
    pub fn target_for_tilt(&self, tilt_degrees: f32) -> f32 {
        let t = (tilt_degrees / 90.0).clamp(0.0, 1.0);
        utils::lerp(self.config.min_speed, self.config.max_speed, t)
    }

    /// Retarget on entering a new segment
    pub fn on_enter_segment(&mut self, tilt_degrees: f32) -> f32 {
        self.target = self.target_for_tilt(tilt_degrees);
        log::debug!("Slope {:.1} degrees targets speed {:.2}", tilt_degrees, self.target);
        self.target
    }

    /// One ramp step from `current` toward the target
    pub fn step(&self, current: f32) -> f32 {
        let factor = self.config.ramp_factor.max(1.0);
        if current < self.target {
            (current.max(RESTART_SPEED) * factor).min(self.target)
        } else if current > self.target {
            (current / factor).max(self.target)
        } else {
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> SlopeSpeed {
        SlopeSpeed::new(SlopeSpeedConfig {
            min_speed: 10.0,
            max_speed: 40.0,
            ramp_factor: 1.1,
        })
    }

    #[test]
    fn test_target_interpolates_and_clamps() {
        let speed = controller();
        assert_relative_eq!(speed.target_for_tilt(0.0), 10.0);
        assert_relative_eq!(speed.target_for_tilt(45.0), 25.0);
        assert_relative_eq!(speed.target_for_tilt(120.0), 40.0);
        assert_relative_eq!(speed.target_for_tilt(-10.0), 10.0);
    }

    #[test]
    fn test_step_ramps_without_overshoot() {
        let mut speed = controller();
        speed.on_enter_segment(90.0);

        assert_relative_eq!(speed.step(20.0), 22.0, epsilon = 1e-4);
        assert_relative_eq!(speed.step(39.0), 40.0);

        speed.on_enter_segment(0.0);
        assert_relative_eq!(speed.step(22.0), 20.0, epsilon = 1e-4);
        assert_relative_eq!(speed.step(10.5), 10.0);
        assert_relative_eq!(speed.step(10.0), 10.0);
    }

    #[test]
    fn test_step_restarts_from_standstill() {
        let speed = controller();
        assert!(speed.step(0.0) > 0.0);
    }
}

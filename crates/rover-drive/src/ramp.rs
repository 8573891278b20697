//! Linear duty-cycle ramp.
//!
//! Motion starts gently: instead of slamming the enables to the target
//! duty, the controller walks them up one fixed step per tick. The
//! schedule itself is a plain iterator so it can be tested without
//! threads or clocks.

use std::time::Duration;

use crate::{DriveError, Speed};

/// Parameters of the linear ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampConfig {
    step: f32,
    interval: Duration,
}

impl RampConfig {
    /// Construct a ramp from a per-tick duty increment and a tick interval.
    ///
    /// # Errors
    ///
    /// Returns `Err(DriveError::InvalidRampStep)` if `step` is non-finite
    /// or not strictly positive. A zero step would never reach the target.
    pub fn new(step: f32, interval: Duration) -> Result<Self, DriveError> {
        if !step.is_finite() {
            return Err(DriveError::InvalidRampStep("must be finite"));
        }
        if step <= 0.0 {
            return Err(DriveError::InvalidRampStep("must be greater than zero"));
        }
        Ok(Self { step, interval })
    }

    /// The duty increment applied per tick.
    pub fn step(&self) -> f32 {
        self.step
    }

    /// The pause between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The schedule of duty values that climbs from zero to `target`.
    pub fn plan(&self, target: Speed) -> RampPlan {
        RampPlan {
            current: 0.0,
            target: target.value(),
            step: self.step,
        }
    }
}

impl Default for RampConfig {
    /// 5% duty per 50 ms tick, so full throttle takes one second.
    fn default() -> Self {
        Self {
            step: 0.05,
            interval: Duration::from_millis(50),
        }
    }
}

/// Iterator over the duty values of one ramp-up.
///
/// Yields strictly increasing values and clamps the final one exactly to
/// the target, so the last write always lands on the requested speed. A
/// zero target yields nothing.
#[derive(Debug, Clone)]
pub struct RampPlan {
    current: f32,
    target: f32,
    step: f32,
}

impl Iterator for RampPlan {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.current >= self.target {
            return None;
        }
        self.current = (self.current + self.step).min(self.target);
        Some(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn collect(config: RampConfig, target: f32) -> Vec<f32> {
        config.plan(Speed::new(target).unwrap()).collect()
    }

    #[test]
    fn test_ramp_config_rejects_bad_steps() {
        assert!(matches!(
            RampConfig::new(0.0, Duration::from_millis(50)),
            Err(DriveError::InvalidRampStep("must be greater than zero"))
        ));
        assert!(matches!(
            RampConfig::new(-0.05, Duration::from_millis(50)),
            Err(DriveError::InvalidRampStep("must be greater than zero"))
        ));
        assert!(matches!(
            RampConfig::new(f32::NAN, Duration::from_millis(50)),
            Err(DriveError::InvalidRampStep("must be finite"))
        ));
    }

    #[test]
    fn test_default_reaches_default_target_in_twelve_ticks() {
        let schedule = collect(RampConfig::default(), 0.6);
        assert_eq!(schedule.len(), 12);
        assert!((schedule[0] - 0.05).abs() < EPSILON);
        assert!((schedule[11] - 0.6).abs() < EPSILON);
    }

    #[test]
    fn test_full_throttle_takes_twenty_ticks() {
        let schedule = collect(RampConfig::default(), 1.0);
        assert_eq!(schedule.len(), 20);
        assert!((schedule[19] - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_final_value_clamps_to_target() {
        let schedule = collect(RampConfig::default(), 0.33);
        assert_eq!(schedule.len(), 7);
        assert!((schedule[6] - 0.33).abs() < EPSILON);
        // The clamp is exact, not merely close.
        assert_eq!(schedule[6], 0.33);
    }

    #[test]
    fn test_values_strictly_increase() {
        let schedule = collect(RampConfig::default(), 0.87);
        for pair in schedule.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_zero_target_yields_nothing() {
        assert!(collect(RampConfig::default(), 0.0).is_empty());
    }

    #[test]
    fn test_target_below_step_yields_single_value() {
        let schedule = collect(RampConfig::default(), 0.04);
        assert_eq!(schedule, vec![0.04]);
    }
}

//! H-bridge pin grouping and the direction truth table.
//!
//! The HW-095 (L298N-class) driver takes four direction inputs and two PWM
//! enable lines. [`pin_states`] is the single source of truth for which
//! inputs go high per [`Direction`]; [`PinSet`] owns the six pin handles
//! and applies those states in a fixed order.

use crate::traits::{DigitalOutput, PwmOutput};
use crate::Direction;

/// The levels for the four direction inputs, ordered `[IN1, IN2, IN3, IN4]`.
///
/// IN1/IN2 steer motor A, IN3/IN4 steer motor B. Both inputs of a motor
/// are never high together, so the bridge cannot shoot through.
pub fn pin_states(direction: Direction) -> [bool; 4] {
    match direction {
        Direction::Forward => [true, false, true, false],
        Direction::Backward => [false, true, false, true],
        Direction::RotateCcw => [false, true, true, false],
        Direction::RotateCw => [true, false, false, true],
        Direction::Stop => [false, false, false, false],
    }
}

/// The six pin handles of one H-bridge driver.
///
/// `D` is the backend's digital pin handle and `P` its PWM pin handle;
/// both must fail with the same error type so a whole pin operation can
/// propagate a single backend error.
#[derive(Debug)]
pub struct PinSet<D, P> {
    ena: P,
    enb: P,
    in1: D,
    in2: D,
    in3: D,
    in4: D,
}

impl<D, P> PinSet<D, P> {
    /// Group six pin handles into a set.
    ///
    /// Arguments follow the driver silkscreen: enables first, then the
    /// four direction inputs in order.
    pub fn new(ena: P, enb: P, in1: D, in2: D, in3: D, in4: D) -> Self {
        Self {
            ena,
            enb,
            in1,
            in2,
            in3,
            in4,
        }
    }
}

impl<E, D, P> PinSet<D, P>
where
    D: DigitalOutput<Error = E>,
    P: PwmOutput<Error = E>,
{
    /// Apply the truth-table states for `direction` to IN1..IN4.
    ///
    /// Writes stop at the first failing pin and return its error; the
    /// caller is expected to treat any failure as a dead link.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if a pin write fails.
    pub fn write_direction(&mut self, direction: Direction) -> Result<(), E> {
        let [in1, in2, in3, in4] = pin_states(direction);
        self.in1.write(in1)?;
        self.in2.write(in2)?;
        self.in3.write(in3)?;
        self.in4.write(in4)?;
        Ok(())
    }

    /// Release every pin: all direction inputs low, both enables at zero.
    ///
    /// Ordering matters. The inputs drop first so the bridge is already
    /// coasting when the duty cycle hits zero.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if a pin write fails.
    pub fn zero_all(&mut self) -> Result<(), E> {
        self.write_direction(Direction::Stop)?;
        self.ena.write_duty(0.0)?;
        self.enb.write_duty(0.0)?;
        Ok(())
    }
}

impl<D, P: Clone> PinSet<D, P> {
    /// Clones of the two enable handles, for the ramp worker.
    pub(crate) fn clone_enables(&self) -> (P, P) {
        (self.ena.clone(), self.enb.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{mock_pin_set, new_log, PinEvent};

    #[test]
    fn test_truth_table_forward() {
        assert_eq!(pin_states(Direction::Forward), [true, false, true, false]);
    }

    #[test]
    fn test_truth_table_backward() {
        assert_eq!(pin_states(Direction::Backward), [false, true, false, true]);
    }

    #[test]
    fn test_truth_table_rotations_mirror() {
        assert_eq!(pin_states(Direction::RotateCcw), [false, true, true, false]);
        assert_eq!(pin_states(Direction::RotateCw), [true, false, false, true]);
    }

    #[test]
    fn test_truth_table_stop_releases_all() {
        assert_eq!(pin_states(Direction::Stop), [false, false, false, false]);
    }

    #[test]
    fn test_no_shoot_through_per_motor() {
        for direction in [
            Direction::Forward,
            Direction::Backward,
            Direction::RotateCcw,
            Direction::RotateCw,
            Direction::Stop,
        ] {
            let [in1, in2, in3, in4] = pin_states(direction);
            assert!(!(in1 && in2), "{direction}: IN1 and IN2 both high");
            assert!(!(in3 && in4), "{direction}: IN3 and IN4 both high");
        }
    }

    #[test]
    fn test_write_direction_order() {
        let log = new_log();
        let mut pins = mock_pin_set(&log);
        pins.write_direction(Direction::RotateCw).unwrap();

        let events = log.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                PinEvent::Digital {
                    role: "IN1",
                    high: true
                },
                PinEvent::Digital {
                    role: "IN2",
                    high: false
                },
                PinEvent::Digital {
                    role: "IN3",
                    high: false
                },
                PinEvent::Digital {
                    role: "IN4",
                    high: true
                },
            ]
        );
    }

    #[test]
    fn test_zero_all_inputs_before_enables() {
        let log = new_log();
        let mut pins = mock_pin_set(&log);
        pins.zero_all().unwrap();

        let events = log.lock().unwrap();
        assert_eq!(events.len(), 6);
        for event in &events[..4] {
            assert!(matches!(event, PinEvent::Digital { high: false, .. }));
        }
        assert_eq!(
            events[4],
            PinEvent::Pwm {
                role: "ENA",
                duty: 0.0
            }
        );
        assert_eq!(
            events[5],
            PinEvent::Pwm {
                role: "ENB",
                duty: 0.0
            }
        );
    }
}

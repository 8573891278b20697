#![warn(missing_docs)]

//! Motion control for a two-motor H-bridge rover.
//!
//! This crate translates drive commands into H-bridge pin states and paces
//! the PWM enable lines through a linear ramp. It knows nothing about how
//! pins reach the board: backends implement the [`traits::DigitalOutput`]
//! and [`traits::PwmOutput`] boundary and hand a [`pins::PinSet`] to the
//! [`controller::DriveController`].

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod controller;
pub mod error;
pub mod pins;
pub mod ramp;
pub mod traits;

pub use controller::DriveController;
pub use error::DriveError;
pub use pins::PinSet;
pub use ramp::{RampConfig, RampPlan};

#[cfg(test)]
mod mock;

/// A drive command for the two-motor H-bridge.
///
/// Each variant maps to a fixed pattern on the four direction inputs; see
/// [`pins::pin_states`]. There are deliberately no left/right turn
/// variants: the chassis has no pin mapping for differential turning.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Both motors forward.
    Forward,
    /// Both motors in reverse.
    Backward,
    /// Left motor reverse, right motor forward (spin in place).
    RotateCcw,
    /// Left motor forward, right motor reverse (spin in place).
    RotateCw,
    /// All direction inputs released.
    Stop,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
            Direction::RotateCcw => write!(f, "rotate-ccw"),
            Direction::RotateCw => write!(f, "rotate-cw"),
            Direction::Stop => write!(f, "stop"),
        }
    }
}

/// A target speed as a fraction of full throttle, always in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Speed(f32);

impl Speed {
    /// Full stop.
    pub const ZERO: Speed = Speed(0.0);
    /// Full throttle.
    pub const FULL: Speed = Speed(1.0);

    /// Construct a speed, rejecting values outside `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns `Err(DriveError::InvalidSpeed)` if `value` is non-finite or
    /// out of range.
    pub fn new(value: f32) -> Result<Self, DriveError> {
        if !value.is_finite() {
            return Err(DriveError::InvalidSpeed("must be finite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(DriveError::InvalidSpeed("must be within [0.0, 1.0]"));
        }
        Ok(Speed(value))
    }

    /// Construct a speed by clamping `value` into `[0.0, 1.0]`.
    ///
    /// Non-finite input clamps to zero. Intended for UI widgets where the
    /// raw value is user-dragged and never worth refusing.
    pub fn saturating(value: f32) -> Self {
        if !value.is_finite() {
            return Speed(0.0);
        }
        Speed(value.clamp(0.0, 1.0))
    }

    /// The fractional value in `[0.0, 1.0]`.
    pub fn value(&self) -> f32 {
        self.0
    }

    /// The speed as a whole percentage, for status lines.
    pub fn as_percent(&self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

//! This module defines the error types used by the drive library.
//!
//! Errors here cover command validation only. Pin-write failures are not
//! represented; they belong to the driver backend and flow through the
//! controller as the backend's own error type.

#![warn(missing_docs)]

use std::fmt;

/// Errors that can occur when constructing drive parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveError {
    /// Error for an invalid target speed.
    /// This variant is returned when a speed outside `[0.0, 1.0]` (or a
    /// non-finite value) is provided.
    InvalidSpeed(&'static str),
    /// Error for an invalid ramp step.
    /// This variant is returned when a ramp step is provided that is not
    /// positive and finite.
    InvalidRampStep(&'static str),
}

impl fmt::Display for DriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveError::InvalidSpeed(msg) => write!(f, "Invalid speed: {}", msg),
            DriveError::InvalidRampStep(msg) => write!(f, "Invalid ramp step: {}", msg),
        }
    }
}

impl std::error::Error for DriveError {}

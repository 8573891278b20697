//! This module defines the error types used by the Firmata client.

#![warn(missing_docs)]

use crate::protocol::PinMode;

/// Error type for Firmata session operations.
#[derive(Debug, thiserror::Error)]
pub enum FirmataError {
    /// Error for a serial port that could not be opened or enumerated.
    #[error("serial port error: {0}")]
    Port(#[from] serialport::Error),
    /// Error for a write that could not be delivered to the board.
    #[error("serial write error: {0}")]
    Io(#[from] std::io::Error),
    /// Error for a pin that cannot be addressed in the requested mode.
    /// Analog messages only reach pins 0 through 15.
    #[error("pin {pin} cannot be used as {mode}")]
    UnsupportedPin {
        /// The offending pin number.
        pin: u8,
        /// The mode that was requested for it.
        mode: PinMode,
    },
    /// Error for a pin that already has a live handle.
    #[error("pin {0} is already claimed")]
    PinClaimed(u8),
}

//! Backend traits for pin output.
//!
//! The drive library never talks to hardware directly. A backend (a serial
//! protocol client, a GPIO peripheral, a test double) implements these two
//! traits and supplies handles for the six H-bridge pins.

/// A single digital output pin.
pub trait DigitalOutput {
    /// Backend-specific write error.
    type Error;

    /// Drive the pin high or low.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the write cannot be delivered.
    fn write(&mut self, high: bool) -> Result<(), Self::Error>;
}

/// A single PWM-capable output pin.
pub trait PwmOutput {
    /// Backend-specific write error.
    type Error;

    /// Set the duty cycle, where `duty` is a fraction in `[0.0, 1.0]`.
    ///
    /// Callers keep `duty` in range; backends may clamp or quantize as
    /// their wire format requires.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the write cannot be delivered.
    fn write_duty(&mut self, duty: f32) -> Result<(), Self::Error>;
}

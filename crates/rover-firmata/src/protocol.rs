//! Firmata message encoding.
//!
//! The client speaks a three-message subset of the Firmata protocol: pin
//! mode assignment, digital port writes and analog (PWM) writes. Every
//! message is three bytes, with payloads split into 7-bit halves because
//! Firmata reserves the high bit for command bytes.
//!
//! Encoding is pure. Nothing here touches the serial port, so every frame
//! can be checked byte for byte.

use std::fmt;

/// Command byte for assigning a pin mode.
pub const SET_PIN_MODE: u8 = 0xF4;
/// Command nibble for a digital port write, low nibble carries the port.
pub const DIGITAL_MESSAGE: u8 = 0x90;
/// Command nibble for an analog write, low nibble carries the pin.
pub const ANALOG_MESSAGE: u8 = 0xE0;

/// Highest pin addressable by [`analog_message`].
pub const MAX_ANALOG_PIN: u8 = 15;
/// Highest pin addressable through a digital port message.
pub const MAX_DIGITAL_PIN: u8 = 127;

/// The pin modes this client assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Plain digital output.
    Output,
    /// PWM output.
    Pwm,
}

impl PinMode {
    /// The Firmata mode code sent in a [`set_pin_mode`] message.
    pub fn code(&self) -> u8 {
        match self {
            PinMode::Output => 1,
            PinMode::Pwm => 3,
        }
    }
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinMode::Output => write!(f, "digital output"),
            PinMode::Pwm => write!(f, "pwm output"),
        }
    }
}

/// The digital port (group of eight pins) a pin belongs to.
pub fn port_of(pin: u8) -> u8 {
    pin / 8
}

/// The pin's bit position within its digital port.
pub fn bit_of(pin: u8) -> u8 {
    pin % 8
}

/// Encode a pin mode assignment.
pub fn set_pin_mode(pin: u8, mode: PinMode) -> [u8; 3] {
    [SET_PIN_MODE, pin & 0x7F, mode.code()]
}

/// Encode a digital write of a whole port.
///
/// `mask` carries the level of all eight pins in the port, so the caller
/// must fold the new pin level into the port's last-sent mask before
/// encoding. Bit 7 travels in the second payload byte.
pub fn digital_message(port: u8, mask: u8) -> [u8; 3] {
    [DIGITAL_MESSAGE | (port & 0x0F), mask & 0x7F, mask >> 7]
}

/// Encode an analog write of an eight-bit level to a PWM pin.
///
/// Only pins up to [`MAX_ANALOG_PIN`] fit in the command's low nibble;
/// the session rejects higher pins before encoding.
pub fn analog_message(pin: u8, level: u8) -> [u8; 3] {
    [ANALOG_MESSAGE | (pin & 0x0F), level & 0x7F, level >> 7]
}

/// Quantize a duty fraction into the eight-bit level Firmata expects.
///
/// Out-of-range and non-finite input saturates rather than wrapping.
pub fn duty_to_level(duty: f32) -> u8 {
    if !duty.is_finite() {
        return 0;
    }
    (duty.clamp(0.0, 1.0) * 255.0).round() as u8
}

//! One serial session to a Firmata board.
//!
//! A [`FirmataSession`] owns the open serial port and hands out claimed
//! pin handles. Handles are cheap clones over the shared session, so a
//! worker thread can keep writing to its pins while the session itself
//! stays with the owner. All writes from all handles funnel through one
//! lock, which keeps digital port masks coherent: Firmata digital writes
//! always carry the whole eight-pin port, so each write folds the pin's
//! new level into the last mask sent for that port.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rover_drive::traits::{DigitalOutput, PwmOutput};
use std::collections::HashSet;
use tracing::{debug, info, trace};

use crate::error::FirmataError;
use crate::protocol::{self, PinMode};

/// The stock StandardFirmata sketch listens at this rate.
pub const DEFAULT_BAUD: u32 = 57_600;

struct SessionInner {
    port: Box<dyn Write + Send>,
    port_masks: [u8; 16],
    claimed: HashSet<u8>,
}

impl SessionInner {
    fn claim(&mut self, pin: u8) -> Result<(), FirmataError> {
        if !self.claimed.insert(pin) {
            return Err(FirmataError::PinClaimed(pin));
        }
        Ok(())
    }

    fn send(&mut self, frame: &[u8; 3]) -> Result<(), FirmataError> {
        self.port.write_all(frame)?;
        Ok(())
    }

    fn write_digital(&mut self, pin: u8, high: bool) -> Result<(), FirmataError> {
        let port = protocol::port_of(pin) as usize;
        let bit = 1u8 << protocol::bit_of(pin);
        let mask = if high {
            self.port_masks[port] | bit
        } else {
            self.port_masks[port] & !bit
        };
        self.send(&protocol::digital_message(port as u8, mask))?;
        self.port_masks[port] = mask;
        trace!(pin, high, mask, "digital write");
        Ok(())
    }

    fn write_pwm(&mut self, pin: u8, duty: f32) -> Result<(), FirmataError> {
        let level = protocol::duty_to_level(duty);
        self.send(&protocol::analog_message(pin, level))?;
        trace!(pin, level, "analog write");
        Ok(())
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        // Push any buffered frames out before the port closes.
        let _ = self.port.flush();
    }
}

/// An open Firmata link and its pin claim registry.
///
/// Dropping the session (and every handle cloned from it) flushes and
/// closes the serial port. There is no explicit shutdown message in the
/// protocol subset; callers that want a quiet board write their pins low
/// first.
pub struct FirmataSession {
    inner: Arc<Mutex<SessionInner>>,
}

impl FirmataSession {
    /// Open the serial device at `path` and begin a session.
    ///
    /// `timeout` bounds each blocking write. `settle` is slept off before
    /// the session is handed back, giving the board's Firmata sketch time
    /// to come up; pass `Duration::ZERO` to skip the wait. No handshake is
    /// performed beyond that: StandardFirmata accepts pin traffic as soon
    /// as the sketch is listening.
    ///
    /// # Errors
    ///
    /// Returns `FirmataError::Port` if the device cannot be opened.
    pub fn open(
        path: &str,
        baud: u32,
        timeout: Duration,
        settle: Duration,
    ) -> Result<Self, FirmataError> {
        let port = serialport::new(path, baud).timeout(timeout).open()?;
        info!(path, baud, "serial port open");
        if !settle.is_zero() {
            debug!(settle_ms = settle.as_millis() as u64, "waiting for board");
            std::thread::sleep(settle);
        }
        Ok(Self::from_port(Box::new(port)))
    }

    fn from_port(port: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                port,
                port_masks: [0; 16],
                claimed: HashSet::new(),
            })),
        }
    }

    /// Claim `pin` as a digital output and put it in output mode.
    ///
    /// # Errors
    ///
    /// Returns `FirmataError::PinClaimed` if a handle for the pin already
    /// exists, `FirmataError::UnsupportedPin` if the pin is outside the
    /// digital port space, or an I/O error if the mode message fails.
    pub fn digital_pin(&self, pin: u8) -> Result<DigitalPin, FirmataError> {
        if pin > protocol::MAX_DIGITAL_PIN {
            return Err(FirmataError::UnsupportedPin {
                pin,
                mode: PinMode::Output,
            });
        }
        let mut inner = self.inner.lock();
        inner.claim(pin)?;
        inner.send(&protocol::set_pin_mode(pin, PinMode::Output))?;
        debug!(pin, "claimed digital output pin");
        Ok(DigitalPin {
            pin,
            inner: Arc::clone(&self.inner),
        })
    }

    /// Claim `pin` as a PWM output and put it in PWM mode.
    ///
    /// # Errors
    ///
    /// Returns `FirmataError::PinClaimed` if a handle for the pin already
    /// exists, `FirmataError::UnsupportedPin` if the pin cannot be
    /// reached by analog messages, or an I/O error if the mode message
    /// fails.
    pub fn pwm_pin(&self, pin: u8) -> Result<PwmPin, FirmataError> {
        if pin > protocol::MAX_ANALOG_PIN {
            return Err(FirmataError::UnsupportedPin {
                pin,
                mode: PinMode::Pwm,
            });
        }
        let mut inner = self.inner.lock();
        inner.claim(pin)?;
        inner.send(&protocol::set_pin_mode(pin, PinMode::Pwm))?;
        debug!(pin, "claimed pwm pin");
        Ok(PwmPin {
            pin,
            inner: Arc::clone(&self.inner),
        })
    }
}

/// A claimed digital output pin.
#[derive(Clone)]
pub struct DigitalPin {
    pin: u8,
    inner: Arc<Mutex<SessionInner>>,
}

impl DigitalOutput for DigitalPin {
    type Error = FirmataError;

    fn write(&mut self, high: bool) -> Result<(), FirmataError> {
        self.inner.lock().write_digital(self.pin, high)
    }
}

/// A claimed PWM output pin.
#[derive(Clone)]
pub struct PwmPin {
    pin: u8,
    inner: Arc<Mutex<SessionInner>>,
}

impl PwmOutput for PwmPin {
    type Error = FirmataError;

    fn write_duty(&mut self, duty: f32) -> Result<(), FirmataError> {
        self.inner.lock().write_pwm(self.pin, duty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_drive::PinSet;
    use std::io;

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Sink {
        fn bytes(&self) -> Vec<u8> {
            self.0.lock().clone()
        }
    }

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPort;

    impl Write for BrokenPort {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "port gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn session_with_sink() -> (FirmataSession, Sink) {
        let sink = Sink::default();
        let session = FirmataSession::from_port(Box::new(sink.clone()));
        (session, sink)
    }

    #[test]
    fn test_digital_pin_sets_output_mode() {
        let (session, sink) = session_with_sink();
        session.digital_pin(13).unwrap();
        assert_eq!(sink.bytes(), vec![0xF4, 13, 1]);
    }

    #[test]
    fn test_pwm_pin_sets_pwm_mode() {
        let (session, sink) = session_with_sink();
        session.pwm_pin(11).unwrap();
        assert_eq!(sink.bytes(), vec![0xF4, 11, 3]);
    }

    #[test]
    fn test_pin_cannot_be_claimed_twice() {
        let (session, _sink) = session_with_sink();
        session.digital_pin(13).unwrap();
        assert!(matches!(
            session.digital_pin(13),
            Err(FirmataError::PinClaimed(13))
        ));
        assert!(matches!(
            session.pwm_pin(13),
            Err(FirmataError::PinClaimed(13))
        ));
    }

    #[test]
    fn test_pwm_pin_rejects_unreachable_pins() {
        let (session, _sink) = session_with_sink();
        assert!(matches!(
            session.pwm_pin(16),
            Err(FirmataError::UnsupportedPin {
                pin: 16,
                mode: PinMode::Pwm
            })
        ));
    }

    #[test]
    fn test_digital_writes_latch_port_mask() {
        let (session, sink) = session_with_sink();
        let mut d13 = session.digital_pin(13).unwrap();
        let mut d12 = session.digital_pin(12).unwrap();

        d13.write(true).unwrap();
        d12.write(true).unwrap();
        d13.write(false).unwrap();

        // Skip the two pin-mode frames.
        assert_eq!(
            sink.bytes()[6..],
            [0x91, 0x20, 0x00, 0x91, 0x30, 0x00, 0x91, 0x10, 0x00]
        );
    }

    #[test]
    fn test_ports_do_not_interfere() {
        let (session, sink) = session_with_sink();
        let mut d13 = session.digital_pin(13).unwrap();
        let mut d7 = session.digital_pin(7).unwrap();

        d13.write(true).unwrap();
        d7.write(true).unwrap();

        assert_eq!(
            sink.bytes()[6..],
            [0x91, 0x20, 0x00, 0x90, 0x00, 0x01]
        );
    }

    #[test]
    fn test_pwm_write_quantizes_duty() {
        let (session, sink) = session_with_sink();
        let mut ena = session.pwm_pin(11).unwrap();

        ena.write_duty(0.5).unwrap();
        ena.write_duty(1.0).unwrap();

        assert_eq!(
            sink.bytes()[3..],
            [0xEB, 0x00, 0x01, 0xEB, 0x7F, 0x01]
        );
    }

    #[test]
    fn test_broken_port_surfaces_io_error() {
        let session = FirmataSession::from_port(Box::new(BrokenPort));
        assert!(matches!(
            session.digital_pin(13),
            Err(FirmataError::Io(_))
        ));
    }

    #[test]
    fn test_pin_set_release_traffic() {
        let (session, sink) = session_with_sink();
        let mut pins = PinSet::new(
            session.pwm_pin(11).unwrap(),
            session.pwm_pin(6).unwrap(),
            session.digital_pin(13).unwrap(),
            session.digital_pin(12).unwrap(),
            session.digital_pin(10).unwrap(),
            session.digital_pin(9).unwrap(),
        );

        pins.zero_all().unwrap();

        // Six mode frames, then four digital port writes, then two zero
        // duty writes.
        assert_eq!(
            sink.bytes()[18..],
            [
                0x91, 0x00, 0x00, 0x91, 0x00, 0x00, 0x91, 0x00, 0x00, 0x91, 0x00, 0x00, 0xEB,
                0x00, 0x00, 0xE6, 0x00, 0x00
            ]
        );
    }
}

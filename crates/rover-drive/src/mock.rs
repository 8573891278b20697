//! Test doubles that record every pin write into a shared log.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::pins::PinSet;
use crate::traits::{DigitalOutput, PwmOutput};

/// One recorded pin write.
#[derive(Debug, Clone, PartialEq)]
pub enum PinEvent {
    Digital { role: &'static str, high: bool },
    Pwm { role: &'static str, duty: f32 },
}

pub type EventLog = Arc<Mutex<Vec<PinEvent>>>;

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockError(pub &'static str);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MockError {}

#[derive(Clone)]
pub struct MockDigital {
    role: &'static str,
    log: EventLog,
}

impl DigitalOutput for MockDigital {
    type Error = MockError;

    fn write(&mut self, high: bool) -> Result<(), MockError> {
        self.log.lock().unwrap().push(PinEvent::Digital {
            role: self.role,
            high,
        });
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockPwm {
    role: &'static str,
    log: EventLog,
    fail: bool,
}

impl PwmOutput for MockPwm {
    type Error = MockError;

    fn write_duty(&mut self, duty: f32) -> Result<(), MockError> {
        if self.fail {
            return Err(MockError("pwm backend down"));
        }
        self.log.lock().unwrap().push(PinEvent::Pwm {
            role: self.role,
            duty,
        });
        Ok(())
    }
}

fn digital(role: &'static str, log: &EventLog) -> MockDigital {
    MockDigital {
        role,
        log: Arc::clone(log),
    }
}

fn pwm(role: &'static str, log: &EventLog, fail: bool) -> MockPwm {
    MockPwm {
        role,
        log: Arc::clone(log),
        fail,
    }
}

/// A full pin set whose writes all land in `log`.
pub fn mock_pin_set(log: &EventLog) -> PinSet<MockDigital, MockPwm> {
    PinSet::new(
        pwm("ENA", log, false),
        pwm("ENB", log, false),
        digital("IN1", log),
        digital("IN2", log),
        digital("IN3", log),
        digital("IN4", log),
    )
}

/// A pin set whose PWM writes always fail, for fault-path tests.
pub fn failing_pwm_pin_set(log: &EventLog) -> PinSet<MockDigital, MockPwm> {
    PinSet::new(
        pwm("ENA", log, true),
        pwm("ENB", log, true),
        digital("IN1", log),
        digital("IN2", log),
        digital("IN3", log),
        digital("IN4", log),
    )
}

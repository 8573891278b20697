//! Drive supervision: one command in, at most one ramp worker out.
//!
//! The controller owns the pin set and serializes all motion through it.
//! Starting a motion writes the direction inputs synchronously, then hands
//! the two enable handles to a background thread that walks the duty cycle
//! up the ramp schedule. Stopping aborts that thread, waits for it, and
//! only then releases every pin, so the all-pins-low state is the last
//! thing ever written.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use spin_sleep::SpinSleeper;
use tracing::{debug, error};

use crate::pins::PinSet;
use crate::ramp::{RampConfig, RampPlan};
use crate::traits::{DigitalOutput, PwmOutput};
use crate::{Direction, Speed};

/// The running ramp worker and its abort flag.
struct RampHandle {
    abort: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

/// Supervises a [`PinSet`] and at most one ramp thread at a time.
///
/// All pin traffic flows through this type on the caller's thread, except
/// for the enable duty writes issued by the ramp worker. The worker holds
/// clones of the enable handles only, so direction inputs stay under the
/// caller's control throughout.
pub struct DriveController<D, P> {
    pins: PinSet<D, P>,
    ramp: RampConfig,
    active: Option<RampHandle>,
    fault: Arc<AtomicBool>,
}

impl<E, D, P> DriveController<D, P>
where
    D: DigitalOutput<Error = E>,
    P: PwmOutput<Error = E> + Clone + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    /// Construct a controller over a pin set with the given ramp.
    pub fn new(pins: PinSet<D, P>, ramp: RampConfig) -> Self {
        Self {
            pins,
            ramp,
            active: None,
            fault: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Begin moving in `direction`, ramping the enables up to `target`.
    ///
    /// The direction inputs are written first, on this thread; only then
    /// does the ramp worker start feeding duty to the enables. A command
    /// that arrives while a previous ramp is still climbing is dropped,
    /// not queued. [`Direction::Stop`] is a synonym for [`stop_all`] and
    /// always takes effect.
    ///
    /// Returns `Ok(true)` if the command took effect and `Ok(false)` if it
    /// was ignored because a ramp is still running.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if a direction pin write fails. The
    /// enables are untouched at that point.
    ///
    /// [`stop_all`]: DriveController::stop_all
    pub fn start_motion(&mut self, direction: Direction, target: Speed) -> Result<bool, E> {
        if direction == Direction::Stop {
            self.stop_all()?;
            return Ok(true);
        }
        match self.active.take() {
            Some(handle) if !handle.join.is_finished() => {
                debug!(%direction, "motion command ignored, ramp still active");
                self.active = Some(handle);
                return Ok(false);
            }
            Some(handle) => {
                let _ = handle.join.join();
            }
            None => {}
        }

        self.pins.write_direction(direction)?;
        debug!(%direction, %target, "motion started");

        if target == Speed::ZERO {
            return Ok(true);
        }

        let (ena, enb) = self.pins.clone_enables();
        let plan = self.ramp.plan(target);
        let interval = self.ramp.interval();
        let abort = Arc::new(AtomicBool::new(false));
        let worker_abort = Arc::clone(&abort);
        let fault = Arc::clone(&self.fault);
        let join = thread::Builder::new()
            .name("ramp".to_string())
            .spawn(move || run_ramp(plan, interval, ena, enb, worker_abort, fault))
            .expect("failed to spawn ramp thread");
        self.active = Some(RampHandle { abort, join });
        Ok(true)
    }

    /// Whether a ramp worker is still climbing.
    pub fn motion_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|handle| !handle.join.is_finished())
    }

    /// Abort any running ramp, wait for it, and release every pin.
    ///
    /// Blocks for at most one ramp interval while the worker notices the
    /// abort flag. Once this returns, the all-pins-low writes are the most
    /// recent traffic on the backend. Safe to call when already stopped.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if a release write fails.
    pub fn stop_all(&mut self) -> Result<(), E> {
        if let Some(handle) = self.active.take() {
            handle.abort.store(true, Ordering::Relaxed);
            let _ = handle.join.join();
        }
        self.pins.zero_all()
    }

    /// Whether a ramp worker has hit a pin-write failure.
    ///
    /// The flag latches; a faulted controller should be torn down along
    /// with its backend rather than reused.
    pub fn faulted(&self) -> bool {
        self.fault.load(Ordering::Relaxed)
    }
}

impl<D, P> Drop for DriveController<D, P> {
    fn drop(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.abort.store(true, Ordering::Relaxed);
            let _ = handle.join.join();
        }
    }
}

/// Worker body: write the schedule to both enables, one step per interval.
fn run_ramp<P, E>(
    plan: RampPlan,
    interval: Duration,
    mut ena: P,
    mut enb: P,
    abort: Arc<AtomicBool>,
    fault: Arc<AtomicBool>,
) where
    P: PwmOutput<Error = E>,
    E: fmt::Display,
{
    let sleeper = SpinSleeper::new(100_000);
    for duty in plan {
        if abort.load(Ordering::Relaxed) {
            return;
        }
        if let Err(err) = ena.write_duty(duty).and_then(|()| enb.write_duty(duty)) {
            error!(%err, duty, "enable write failed, abandoning ramp");
            fault.store(true, Ordering::Relaxed);
            return;
        }
        sleeper.sleep(interval);
    }
}

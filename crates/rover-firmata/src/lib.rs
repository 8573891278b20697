#![warn(missing_docs)]
#![doc = "A write-only Firmata client for pin control over a serial link."]
#![doc = ""]
#![doc = "This crate encodes the Firmata pin-mode, digital-port and analog messages,"]
#![doc = "manages one serial session with claimed pin handles, and enumerates candidate"]
#![doc = "serial ports. The pin handles implement the `rover-drive` output traits, so a"]
#![doc = "drive controller can run over a live board without knowing about serial I/O."]

pub mod discovery;
pub mod error;
pub mod protocol;
pub mod session;

pub use discovery::{discover, PortCandidate, PortKind};
pub use error::FirmataError;
pub use session::{DigitalPin, FirmataSession, PwmPin, DEFAULT_BAUD};

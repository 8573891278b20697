//! Serial port enumeration.
//!
//! An HC-05 bonded over RFCOMM shows up as an ordinary serial device
//! (`/dev/rfcomm0` on Linux, a `cu.HC-05-*` device on macOS, `COMn` on
//! Windows), so discovery is just a listing of the system's serial ports
//! plus a substring match to pick the paired module out of the list.

use serialport::SerialPortType;
use std::fmt;

use crate::error::FirmataError;

/// Broad class of a serial device, derived from how the OS enumerates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    /// Enumerated as a Bluetooth serial device.
    Bluetooth,
    /// A USB serial adapter.
    Usb,
    /// A PCI serial device.
    Pci,
    /// Anything the OS cannot classify, including RFCOMM binds.
    Unknown,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::Bluetooth => write!(f, "bluetooth"),
            PortKind::Usb => write!(f, "usb"),
            PortKind::Pci => write!(f, "pci"),
            PortKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// One serial device that could carry a Firmata link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCandidate {
    path: String,
    kind: PortKind,
    product: Option<String>,
}

impl PortCandidate {
    /// Build a candidate from a device path and its kind.
    pub fn new(path: impl Into<String>, kind: PortKind) -> Self {
        Self {
            path: path.into(),
            kind,
            product: None,
        }
    }

    /// Attach the product string the OS reported for a USB adapter.
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// The device path to hand to [`FirmataSession::open`].
    ///
    /// [`FirmataSession::open`]: crate::session::FirmataSession::open
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The device class.
    pub fn kind(&self) -> PortKind {
        self.kind
    }

    /// Whether this device's name contains `needle`.
    ///
    /// The match is case-sensitive and runs over the device path and, for
    /// USB adapters, the product string. A paired module's name ("HC-05")
    /// appears in the path on macOS and Windows; a Linux RFCOMM bind is
    /// only ever `/dev/rfcommN`, so it must be matched by that path instead.
    pub fn matches(&self, needle: &str) -> bool {
        self.path.contains(needle) || self.product.as_deref().is_some_and(|p| p.contains(needle))
    }
}

impl fmt::Display for PortCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.kind)
    }
}

fn classify(port_type: &SerialPortType) -> PortKind {
    match port_type {
        SerialPortType::BluetoothPort => PortKind::Bluetooth,
        SerialPortType::UsbPort(_) => PortKind::Usb,
        SerialPortType::PciPort => PortKind::Pci,
        SerialPortType::Unknown => PortKind::Unknown,
    }
}

/// List the system's serial ports in the order the platform reports them.
///
/// # Errors
///
/// Returns `FirmataError::Port` if the system enumeration fails.
pub fn discover() -> Result<Vec<PortCandidate>, FirmataError> {
    let candidates = serialport::available_ports()?
        .into_iter()
        .map(|info| {
            let candidate = PortCandidate::new(info.port_name, classify(&info.port_type));
            match info.port_type {
                SerialPortType::UsbPort(usb) => match usb.product {
                    Some(product) => candidate.with_product(product),
                    None => candidate,
                },
                _ => candidate,
            }
        })
        .collect();
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_types() {
        assert_eq!(classify(&SerialPortType::BluetoothPort), PortKind::Bluetooth);
        assert_eq!(classify(&SerialPortType::PciPort), PortKind::Pci);
        assert_eq!(classify(&SerialPortType::Unknown), PortKind::Unknown);
    }

    #[test]
    fn test_matches_on_path() {
        let candidate = PortCandidate::new("/dev/cu.HC-05-DevB", PortKind::Bluetooth);
        assert!(candidate.matches("HC-05"));
        assert!(!candidate.matches("HC-06"));
    }

    #[test]
    fn test_matches_on_usb_product() {
        let candidate =
            PortCandidate::new("/dev/ttyUSB0", PortKind::Usb).with_product("HC-05 serial bridge");
        assert!(candidate.matches("HC-05"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let candidate = PortCandidate::new("/dev/cu.HC-05-DevB", PortKind::Bluetooth);
        assert!(!candidate.matches("hc-05"));
    }

    #[test]
    fn test_rfcomm_bind_matched_by_path() {
        let candidate = PortCandidate::new("/dev/rfcomm0", PortKind::Unknown);
        assert!(candidate.matches("rfcomm0"));
        assert!(!candidate.matches("HC-05"));
    }

    #[test]
    fn test_display_includes_kind() {
        let candidate = PortCandidate::new("/dev/rfcomm0", PortKind::Bluetooth);
        assert_eq!(format!("{candidate}"), "/dev/rfcomm0 (bluetooth)");
    }
}

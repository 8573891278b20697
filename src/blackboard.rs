use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use rover_drive::{Direction, Speed};

/// Link lifecycle as the UI presents it.
///
/// There is no path back from `Disconnected` short of restarting the
/// station; the link worker runs once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    Disconnected, // No session. Either the scan failed or the link died.
    Connecting, // The link worker is scanning ports and claiming pins.
    Connected, // Pin handles are live and drive commands are accepted.
}

#[derive(Clone)]
pub struct AppState {
    pub phase: LinkPhase,
    pub port: Option<String>,
    pub target_speed: Speed,
    pub commanded: Option<Direction>,
    pub last_cmd_ts: Instant,
    pub faults: Vec<String>,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            phase: LinkPhase::Disconnected,
            port: None,
            target_speed: Speed::ZERO,
            commanded: None,
            last_cmd_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<AppState>>;

pub fn snapshot(bb: &Blackboard) -> AppState {
    (*bb.read()).clone()
}

pub fn set_phase(bb: &Blackboard, phase: LinkPhase) {
    bb.write().phase = phase;
}

pub fn set_port(bb: &Blackboard, port: Option<String>) {
    bb.write().port = port;
}

pub fn set_speed(bb: &Blackboard, speed: Speed) {
    bb.write().target_speed = speed;
}

pub fn touch_cmd(bb: &Blackboard, commanded: Option<Direction>) {
    let mut g = bb.write();
    g.commanded = commanded;
    g.last_cmd_ts = Instant::now();
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_fault_deduplicates() {
        let bb: Blackboard = Arc::default();
        raise_fault(&bb, "port gone");
        raise_fault(&bb, "port gone");
        raise_fault(&bb, "pin 13 is already claimed");
        assert_eq!(snapshot(&bb).faults.len(), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let bb: Blackboard = Arc::default();
        let before = snapshot(&bb);
        set_phase(&bb, LinkPhase::Connecting);
        assert_eq!(before.phase, LinkPhase::Disconnected);
        assert_eq!(snapshot(&bb).phase, LinkPhase::Connecting);
    }

    #[test]
    fn test_touch_cmd_records_direction_and_time() {
        let bb: Blackboard = Arc::default();
        let t0 = snapshot(&bb).last_cmd_ts;
        touch_cmd(&bb, Some(Direction::Forward));
        let state = snapshot(&bb);
        assert_eq!(state.commanded, Some(Direction::Forward));
        assert!(state.last_cmd_ts >= t0);
    }
}

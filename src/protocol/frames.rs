//! Outbound text frames.

use core::fmt::Write;

use heapless::String;

use super::MESSAGE_CAPACITY;
use crate::app::ports::ScanList;
use crate::error::KettleFault;
use crate::fsm::KettleState;

pub type Frame = String<MESSAGE_CAPACITY>;

pub const CONNECTED: &str = "Connected";
pub const STATE_CHANGED: &str = "STATE CHANGED";
pub const NAME_SAVED: &str = "Access Point Name Saved";
pub const PASSWORD_SAVED: &str = "Access Point Password Saved";

/// `ERROR <message>`
pub fn fault(fault: KettleFault) -> Frame {
    let mut out = Frame::new();
    let _ = write!(out, "ERROR {}", fault.message());
    out
}

/// `DEBUG,STATE,<n>`
pub fn debug_state(state: KettleState) -> Frame {
    let mut out = Frame::new();
    let _ = write!(out, "DEBUG,STATE,{}", state.index());
    out
}

/// `SENSORS,THERMISTOR,<celsius>` with two decimals.
pub fn thermistor(celsius: f32) -> Frame {
    let mut out = Frame::new();
    let _ = write!(out, "SENSORS,THERMISTOR,{:.2}", celsius);
    out
}

/// `NETWORKS,<a>,<b>,...`; `NETWORKS,` when nothing was found.
pub fn networks(list: &ScanList) -> Frame {
    let mut out = Frame::new();
    let _ = out.push_str("NETWORKS,");
    for (i, ssid) in list.iter().enumerate() {
        if i > 0 && out.push(',').is_err() {
            break;
        }
        if out.push_str(ssid).is_err() {
            break;
        }
    }
    out
}

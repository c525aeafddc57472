//! Text command protocol spoken over the websocket.
//!
//! | Inbound                       | Effect                         | Outbound                         |
//! |-------------------------------|--------------------------------|----------------------------------|
//! | `WIFI`                        | read cached scan               | reply `NETWORKS,<list>`          |
//! | `SWITCH`                      | kettle → PreInit               | broadcast `STATE CHANGED`        |
//! | `RESET`                       | erase credentials, restart     | -                                |
//! | `AccessPointName,<ssid>`      | persist SSID                   | reply `Access Point Name Saved`  |
//! | `AccessPointPassword,<pass>`  | persist PASSWORD, restart      | reply `Access Point Password Saved` |
//!
//! The loop also broadcasts `ERROR <message>` for handled kettle faults and,
//! with debug broadcasts on, `DEBUG,STATE,<n>` / `SENSORS,THERMISTOR,<c>`.

pub mod channels;
pub mod command;
pub mod dispatcher;
pub mod frames;

/// Longest inbound line accepted.
pub const LINE_CAPACITY: usize = 128;
/// Longest outbound frame (fits a full scan list).
pub const MESSAGE_CAPACITY: usize = 576;

/// Websocket session handle as assigned by the HTTP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub i32);

impl core::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

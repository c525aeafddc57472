//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Device (domain)
//! ```
//!
//! Driven adapters (switches, relay, radio, storage, sockets) implement
//! these traits.  The [`Device`](super::service::Device) consumes them via
//! generics, so the state machines never touch hardware directly.

use heapless::{String, Vec};

use crate::protocol::ConnectionId;

/// Longest network name the station and scan cache will hold.
pub const SSID_CAPACITY: usize = 32;
/// Longest passphrase accepted by the station.
pub const PASSPHRASE_CAPACITY: usize = 64;
/// Networks kept from one scan.
pub const SCAN_CAPACITY: usize = 16;

pub type Ssid = String<SSID_CAPACITY>;
pub type ScanList = Vec<Ssid, SCAN_CAPACITY>;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Level reads the polling loop takes every tick.
pub trait SensorPort {
    /// Mug switch level (HIGH = mug on the plate).
    fn mug_present(&mut self) -> bool;

    /// Water switch level (HIGH = water in the reservoir).
    fn water_present(&mut self) -> bool;

    /// Raw 12-bit thermistor ADC count.
    fn thermistor_raw(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait ActuatorPort {
    /// Drive the heating element relay.
    fn set_heater(&mut self, on: bool);

    /// Set the RGB status indicator colour.
    fn set_indicator(&mut self, r: u8, g: u8, b: u8);

    /// Relay open, indicator dark.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Credential store (driven adapter: domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Network credentials, persisted across restarts.
///
/// Lives in its own namespace ([`CREDENTIAL_NAMESPACE`]) under the keys
/// [`SSID_KEY`] and [`PASSWORD_KEY`].  A missing key reads as empty.
pub trait CredentialStore {
    /// Read `key`.  Absent keys yield an empty string.
    fn get(&self, key: &str) -> String<PASSPHRASE_CAPACITY>;

    /// Persist `value` under `key`.  Durable once this returns `Ok`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove every key in the namespace.
    fn clear(&mut self) -> Result<(), StorageError>;
}

pub const CREDENTIAL_NAMESPACE: &str = "credentials";
pub const SSID_KEY: &str = "SSID";
pub const PASSWORD_KEY: &str = "PASSWORD";

// ───────────────────────────────────────────────────────────────
// Network port (driven adapter: domain → radio)
// ───────────────────────────────────────────────────────────────

/// Radio operations needed by the provisioning machine.
///
/// None of these may block on association: `join` only reports whether the
/// driver accepted the attempt.
pub trait NetworkPort {
    /// Visible network names.  An empty list is a valid result.
    fn scan(&mut self) -> ScanList;

    /// Start an open soft access point named `name`.
    fn start_access_point(&mut self, name: &str) -> Result<(), NetworkError>;

    /// Begin joining `ssid`.  `Err` means the attempt was refused outright.
    fn join(&mut self, ssid: &str, passphrase: &str) -> Result<(), NetworkError>;
}

// ───────────────────────────────────────────────────────────────
// Command channel (driven adapter: domain → connected clients)
// ───────────────────────────────────────────────────────────────

pub trait CommandChannel {
    /// Send `text` to one connection only.
    fn reply(&mut self, connection: ConnectionId, text: &str);

    /// Send `text` to every connected client.
    fn broadcast(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Timing and restart
// ───────────────────────────────────────────────────────────────

/// One-shot start-delay timer.  Expiry raises the delay-elapsed signal.
pub trait DelayTimer {
    /// (Re)arm the timer.  A pending expiry is replaced.
    fn start(&mut self, delay_ms: u32);

    fn cancel(&mut self);
}

/// Monotonic milliseconds since boot.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

pub trait RestartPort {
    /// Reset the chip.  On hardware this never returns.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`CredentialStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`NetworkPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// The driver rejected the configuration or mode change.
    Rejected,
    /// The radio is not initialised.
    Unavailable,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Rejected => write!(f, "rejected by driver"),
            Self::Unavailable => write!(f, "radio unavailable"),
        }
    }
}

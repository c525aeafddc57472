//! Error and fault types for the kettle firmware.
//!
//! Faults in the heating lifecycle are not returned as `Err` values: they
//! are recorded on the kettle state machine, broadcast as `ERROR <text>`
//! and drained back to Idle.  Provisioning and storage failures are plain
//! `Result` errors.  All variants are `Copy` so they can be carried through
//! the FSM context without allocation.

use core::fmt;

use crate::app::ports::StorageError;

// ---------------------------------------------------------------------------
// Kettle faults
// ---------------------------------------------------------------------------

/// Coarse classification used in logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Mug or water missing before or during a session.
    Safety,
    /// The heating session ran past its bound.
    Timeout,
}

/// Every cause that can force the kettle state machine into `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KettleFault {
    /// No mug on the plate when the start delay elapsed.
    NoMug,
    /// Water sensor reported empty when the start delay elapsed.
    NoWater,
    /// Mug lifted while the heater was energized.
    MugRemoved,
    /// Water ran out while the heater was energized.
    WaterEmpty,
    /// Target temperature not reached before the heating timeout.
    HeatingTimeout,
}

impl KettleFault {
    /// Exact text broadcast to connected clients after `ERROR `.
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoMug => "No Mug Present",
            Self::NoWater => "No water in the kettle",
            Self::MugRemoved => "Mug Moved!",
            Self::WaterEmpty => "No water in system!",
            Self::HeatingTimeout => "Heating too long somethings wrong!",
        }
    }

    pub const fn class(self) -> FaultClass {
        match self {
            Self::HeatingTimeout => FaultClass::Timeout,
            _ => FaultClass::Safety,
        }
    }

    /// Indicator colour shown while the fault is pending.  Interlock trips
    /// get a tinted red so the two sensors can be told apart on the device.
    pub const fn indicator(self) -> (u8, u8, u8) {
        match self {
            Self::MugRemoved => (255, 0, 10),
            Self::WaterEmpty => (255, 10, 0),
            _ => (255, 0, 0),
        }
    }
}

impl fmt::Display for KettleFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ---------------------------------------------------------------------------
// Provisioning errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningError {
    /// The soft access point could not be started.
    AccessPointFailed,
    /// The station join attempt was refused by the driver.
    JoinRejected,
    /// A credential exceeded its fixed capacity (SSID 32, passphrase 64).
    CredentialTooLong,
    /// The credential store failed.
    Storage(StorageError),
}

impl fmt::Display for ProvisioningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessPointFailed => write!(f, "access point start failed"),
            Self::JoinRejected => write!(f, "network join rejected"),
            Self::CredentialTooLong => write!(f, "credential too long"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

impl From<StorageError> for ProvisioningError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Protocol faults
// ---------------------------------------------------------------------------

/// An inbound line the dispatcher could not act on.  Logged, never escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolFault {
    /// The property is unknown or was sent in the wrong form.
    Unrecognized,
    /// The line did not fit the inbound buffer and was dropped.
    Oversized,
}

impl fmt::Display for ProtocolFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized => write!(f, "unrecognized command"),
            Self::Oversized => write!(f, "line exceeds inbound buffer"),
        }
    }
}

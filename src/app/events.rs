//! Outbound application events.
//!
//! The [`Device`](super::service::Device) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::{KettleFault, ProvisioningError};
use crate::fsm::KettleState;
use crate::provisioning::WifiState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The polling loop started (carries the initial kettle state).
    Started(KettleState),

    /// The kettle machine moved between states.
    StateChanged { from: KettleState, to: KettleState },

    /// A kettle fault was reported to clients and cleared.
    FaultHandled(KettleFault),

    /// The provisioning machine moved to a new state.
    WifiChanged(WifiState),

    /// A recognised command could not be carried out.
    CommandRejected(ProvisioningError),

    /// A command asked for a restart.
    RestartRequested,
}

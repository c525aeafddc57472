//! Command dispatcher.
//!
//! Runs each parsed [`Command`] to completion against the kettle and
//! provisioning machines.  Never blocks: credential writes go through
//! [`Provisioning`], which owns the store, and network joins only happen on the next provisioning entry
//! (after the restart the caller performs on [`Dispatch::Restart`]).

use log::{info, warn};

use super::ConnectionId;
use super::command::Command;
use super::frames;
use crate::app::ports::{CommandChannel, CredentialStore};
use crate::error::{ProtocolFault, ProvisioningError};
use crate::fsm::context::KettleContext;
use crate::fsm::{Fsm, KettleState};
use crate::provisioning::{CredentialKey, Provisioning};

/// What dispatching one line led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    /// The command is done and the device must restart now.
    Restart,
    /// A recognised command failed; nothing was persisted.
    Rejected(ProvisioningError),
    Unrecognized,
}

/// Borrowed view of everything a command may touch.
pub struct Dispatcher<'a, S, C> {
    pub fsm: &'a mut Fsm,
    pub ctx: &'a mut KettleContext,
    pub provisioning: &'a mut Provisioning<S>,
    pub channel: &'a mut C,
}

impl<S: CredentialStore, C: CommandChannel> Dispatcher<'_, S, C> {
    /// Greet a newly connected client.
    pub fn on_connect(&mut self, connection: ConnectionId) {
        info!("[{}] connected", connection);
        self.channel.reply(connection, frames::CONNECTED);
        if self.ctx.config.debug_broadcasts {
            let frame = frames::debug_state(self.fsm.current_state());
            self.channel.reply(connection, &frame);
        }
    }

    pub fn dispatch(&mut self, connection: ConnectionId, line: &str) -> Dispatch {
        match Command::parse(line) {
            Command::Wifi => {
                let frame = frames::networks(self.provisioning.networks());
                self.channel.reply(connection, &frame);
                Dispatch::Handled
            }
            Command::Switch => {
                self.fsm.force_transition(KettleState::PreInit, self.ctx);
                self.channel.broadcast(frames::STATE_CHANGED);
                Dispatch::Handled
            }
            Command::Reset => match self.provisioning.erase_credentials() {
                Ok(()) => Dispatch::Restart,
                Err(e) => {
                    warn!("[{}] RESET failed: {}", connection, e);
                    Dispatch::Rejected(e)
                }
            },
            Command::AccessPointName(ssid) => {
                match self
                    .provisioning
                    .update_credential(CredentialKey::Ssid, ssid)
                {
                    Ok(()) => {
                        self.channel.reply(connection, frames::NAME_SAVED);
                        Dispatch::Handled
                    }
                    Err(e) => Dispatch::Rejected(e),
                }
            }
            Command::AccessPointPassword(passphrase) => {
                match self
                    .provisioning
                    .update_credential(CredentialKey::Password, passphrase)
                {
                    Ok(()) => {
                        self.channel.reply(connection, frames::PASSWORD_SAVED);
                        Dispatch::Restart
                    }
                    Err(e) => Dispatch::Rejected(e),
                }
            }
            Command::Unrecognized {
                property,
                parameter,
            } => {
                warn!(
                    "[{}] {}: Property: {} | Param: {}",
                    connection,
                    ProtocolFault::Unrecognized,
                    property,
                    parameter.unwrap_or("")
                );
                Dispatch::Unrecognized
            }
        }
    }
}

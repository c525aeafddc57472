//! Network provisioning state machine.
//!
//! ```text
//!  STARTUP ──[no stored SSID]──▶ SETUP ──[AP fails]──▶ WIFI_ERROR
//!     │                            │                       ▲
//!     │                      [AP up: provisioning page]    │
//!     └──[stored SSID]──▶ CONNECTION_TEST ──[rejected]─────┘
//!                                │
//!                           [accepted]──▶ CONNECTED (home page)
//! ```
//!
//! Entry actions run exactly once per entry, on the first tick after the
//! transition.  There is no automatic retry: leaving `WifiError` takes a
//! restart, usually triggered by a credential command.
//!
//! [`Provisioning`] owns the credential store; every credential write goes
//! through [`Provisioning::update_credential`] or
//! [`Provisioning::erase_credentials`].

use heapless::String;
use log::{error, info, warn};

use crate::app::ports::{
    CredentialStore, NetworkPort, PASSPHRASE_CAPACITY, PASSWORD_KEY, SSID_CAPACITY, SSID_KEY,
    ScanList,
};
use crate::config::DEFAULT_ACCESS_POINT_NAME;
use crate::error::ProvisioningError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WifiState {
    Startup,
    Setup,
    ConnectionTest,
    Connected,
    WifiError,
}

/// What the device's HTTP root currently serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    None,
    /// Network picker and credential form (soft AP up, never provisioned).
    Provisioning,
    /// Kettle control page (joined a network).
    Home,
    /// Fallback page after a provisioning failure.
    Diagnostic,
}

/// Which credential a command updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKey {
    Ssid,
    Password,
}

impl CredentialKey {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Ssid => SSID_KEY,
            Self::Password => PASSWORD_KEY,
        }
    }

    pub const fn capacity(self) -> usize {
        match self {
            Self::Ssid => SSID_CAPACITY,
            Self::Password => PASSPHRASE_CAPACITY,
        }
    }
}

pub struct Provisioning<S> {
    store: S,
    state: WifiState,
    /// Entry action for `state` already ran.
    entered: bool,
    page: Page,
    networks: ScanList,
    last_error: Option<ProvisioningError>,
    access_point_name: String<SSID_CAPACITY>,
}

impl<S: CredentialStore> Provisioning<S> {
    pub fn new(access_point_name: &str, store: S) -> Self {
        let mut name = String::new();
        if name.push_str(access_point_name).is_err() {
            warn!("Access point name too long, using {}", DEFAULT_ACCESS_POINT_NAME);
            name.clear();
            let _ = name.push_str(DEFAULT_ACCESS_POINT_NAME);
        }
        Self {
            store,
            state: WifiState::Startup,
            entered: false,
            page: Page::None,
            networks: ScanList::new(),
            last_error: None,
            access_point_name: name,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn served_page(&self) -> Page {
        self.page
    }

    /// Networks seen by the most recent scan.  Empty until Setup ran.
    pub fn networks(&self) -> &ScanList {
        &self.networks
    }

    pub fn last_error(&self) -> Option<ProvisioningError> {
        self.last_error
    }

    /// Read-only view of the persisted credentials.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Back to `Startup` with nothing cached, as after a chip reset.  The
    /// store keeps its contents.
    pub fn reset(&mut self) {
        self.state = WifiState::Startup;
        self.entered = false;
        self.page = Page::None;
        self.networks.clear();
        self.last_error = None;
    }

    // ── Per-tick ─────────────────────────────────────────────

    /// Advance by one step.  Returns the new state when a transition happened.
    pub fn tick(&mut self, net: &mut impl NetworkPort) -> Option<WifiState> {
        let next = match self.state {
            WifiState::Startup => Some(self.startup()),
            _ if self.entered => None,
            WifiState::Setup => self.setup_enter(net),
            WifiState::ConnectionTest => self.connection_enter(net),
            WifiState::WifiError => {
                self.error_enter(net);
                None
            }
            WifiState::Connected => {
                self.entered = true;
                None
            }
        };

        if let Some(next) = next {
            info!("WiFi transition: {:?} -> {:?}", self.state, next);
            self.state = next;
            self.entered = false;
        }
        next
    }

    fn startup(&self) -> WifiState {
        if self.store.get(SSID_KEY).is_empty() {
            WifiState::Setup
        } else {
            WifiState::ConnectionTest
        }
    }

    fn setup_enter(&mut self, net: &mut impl NetworkPort) -> Option<WifiState> {
        self.entered = true;
        self.networks = net.scan();
        info!("WiFi scan found {} networks", self.networks.len());

        match net.start_access_point(&self.access_point_name) {
            Ok(()) => {
                info!("Access point {} ready", self.access_point_name);
                self.page = Page::Provisioning;
                None
            }
            Err(e) => {
                error!("Access point {} failed: {}", self.access_point_name, e);
                self.last_error = Some(ProvisioningError::AccessPointFailed);
                Some(WifiState::WifiError)
            }
        }
    }

    fn connection_enter(&mut self, net: &mut impl NetworkPort) -> Option<WifiState> {
        self.entered = true;
        let ssid = self.store.get(SSID_KEY);
        let passphrase = self.store.get(PASSWORD_KEY);

        match net.join(&ssid, &passphrase) {
            Ok(()) => {
                info!("Joining {}", ssid);
                self.page = Page::Home;
                Some(WifiState::Connected)
            }
            Err(e) => {
                error!("Credentials not found! join {} failed: {}", ssid, e);
                self.last_error = Some(ProvisioningError::JoinRejected);
                Some(WifiState::WifiError)
            }
        }
    }

    fn error_enter(&mut self, net: &mut impl NetworkPort) {
        self.entered = true;
        match net.start_access_point(&self.access_point_name) {
            Ok(()) => self.page = Page::Diagnostic,
            Err(e) => {
                error!("Fallback access point failed: {}", e);
                self.page = Page::None;
            }
        }
    }

    // ── Credentials ──────────────────────────────────────────

    /// Validate and persist one credential.  Over-long values never reach
    /// the store.
    pub fn update_credential(
        &mut self,
        key: CredentialKey,
        value: &str,
    ) -> Result<(), ProvisioningError> {
        if value.len() > key.capacity() {
            warn!(
                "{} rejected: {} bytes exceeds {}",
                key.key(),
                value.len(),
                key.capacity()
            );
            return Err(ProvisioningError::CredentialTooLong);
        }
        self.store.set(key.key(), value)?;
        info!("{} saved", key.key());
        Ok(())
    }

    /// Clear the namespace and leave both keys empty.
    pub fn erase_credentials(&mut self) -> Result<(), ProvisioningError> {
        self.store.clear()?;
        self.store.set(SSID_KEY, "")?;
        self.store.set(PASSWORD_KEY, "")?;
        info!("Credentials erased");
        Ok(())
    }
}

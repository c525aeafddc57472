//! WiFi radio adapter.
//!
//! Implements [`NetworkPort`]: the hexagonal boundary for the radio
//! operations the provisioning machine needs: scan, soft access point,
//! station join.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! `join` only starts the association; it never waits for the link.

use heapless::String;
use log::{info, warn};

use crate::app::ports::{NetworkError, NetworkPort, SSID_CAPACITY, ScanList, Ssid};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
    EspWifi,
};

// ───────────────────────────────────────────────────────────────
// Scan helpers
// ───────────────────────────────────────────────────────────────

/// Build a scan list from raw names: hidden (empty) and duplicate
/// networks are skipped, the list is capped at its capacity.
pub fn collect_networks<'a>(names: impl IntoIterator<Item = &'a str>) -> ScanList {
    let mut list = ScanList::new();
    for name in names {
        if name.is_empty() || list.iter().any(|s| s.as_str() == name) {
            continue;
        }
        let Ok(ssid) = Ssid::try_from(name) else {
            continue;
        };
        if list.push(ssid).is_err() {
            break;
        }
    }
    list
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: networks the fake radio can see.
    #[cfg(not(target_os = "espidf"))]
    sim_visible: std::vec::Vec<std::string::String>,
    /// Simulation: make the next mode changes fail.
    #[cfg(not(target_os = "espidf"))]
    sim_fail_ap: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_fail_join: bool,
    access_point: Option<String<SSID_CAPACITY>>,
    joined: Option<Ssid>,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>) -> Self {
        Self {
            wifi,
            access_point: None,
            joined: None,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            sim_visible: std::vec::Vec::new(),
            sim_fail_ap: false,
            sim_fail_join: false,
            access_point: None,
            joined: None,
        }
    }

    /// Name of the soft access point currently up, if any.
    pub fn access_point(&self) -> Option<&str> {
        self.access_point.as_deref()
    }

    /// Network the station last started joining.
    pub fn joined(&self) -> Option<&str> {
        self.joined.as_deref()
    }

    // ── Simulation controls ───────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_visible(&mut self, names: &[&str]) {
        self.sim_visible = names.iter().map(|s| (*s).into()).collect();
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_access_point(&mut self, fail: bool) {
        self.sim_fail_ap = fail;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_join(&mut self, fail: bool) {
        self.sim_fail_join = fail;
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ── Platform-specific ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl NetworkPort for WifiAdapter {
    fn scan(&mut self) -> ScanList {
        let ready = self
            .wifi
            .set_configuration(&Configuration::Client(ClientConfiguration::default()))
            .and_then(|()| self.wifi.start());
        if let Err(e) = ready {
            warn!("WiFi: station start for scan failed: {:?}", e);
            return ScanList::new();
        }
        match self.wifi.scan() {
            Ok(found) => collect_networks(found.iter().map(|ap| ap.ssid.as_str())),
            Err(e) => {
                warn!("WiFi: scan failed: {:?}", e);
                ScanList::new()
            }
        }
    }

    fn start_access_point(&mut self, name: &str) -> Result<(), NetworkError> {
        let ssid = name.try_into().map_err(|_| NetworkError::Rejected)?;
        let _ = self.wifi.stop();
        self.wifi
            .set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
                ssid,
                auth_method: AuthMethod::None,
                channel: 1,
                ..Default::default()
            }))
            .map_err(|e| {
                warn!("WiFi: AP configuration rejected: {:?}", e);
                NetworkError::Rejected
            })?;
        self.wifi.start().map_err(|e| {
            warn!("WiFi: AP start failed: {:?}", e);
            NetworkError::Unavailable
        })?;
        self.access_point = String::try_from(name).ok();
        info!("WiFi: soft AP '{}' up", name);
        Ok(())
    }

    fn join(&mut self, ssid: &str, passphrase: &str) -> Result<(), NetworkError> {
        let auth_method = if passphrase.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| NetworkError::Rejected)?,
            password: passphrase.try_into().map_err(|_| NetworkError::Rejected)?,
            auth_method,
            ..Default::default()
        };
        self.wifi
            .set_configuration(&Configuration::Client(config))
            .map_err(|_| NetworkError::Rejected)?;
        self.wifi.start().map_err(|_| NetworkError::Unavailable)?;
        // Non-blocking: association completes in the driver task.
        self.wifi.wifi_mut().connect().map_err(|e| {
            warn!("WiFi: connect to '{}' refused: {:?}", ssid, e);
            NetworkError::Rejected
        })?;
        self.joined = Ssid::try_from(ssid).ok();
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl NetworkPort for WifiAdapter {
    fn scan(&mut self) -> ScanList {
        collect_networks(self.sim_visible.iter().map(std::string::String::as_str))
    }

    fn start_access_point(&mut self, name: &str) -> Result<(), NetworkError> {
        if self.sim_fail_ap {
            return Err(NetworkError::Rejected);
        }
        self.access_point = String::try_from(name).ok();
        info!("WiFi(sim): soft AP '{}' up", name);
        Ok(())
    }

    fn join(&mut self, ssid: &str, _passphrase: &str) -> Result<(), NetworkError> {
        if self.sim_fail_join || ssid.is_empty() {
            warn!("WiFi(sim): join '{}' refused", ssid);
            return Err(NetworkError::Rejected);
        }
        self.joined = Ssid::try_from(ssid).ok();
        info!("WiFi(sim): joining '{}'", ssid);
        Ok(())
    }
}

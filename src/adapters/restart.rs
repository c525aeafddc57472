//! Chip restart adapter.

use log::warn;

use crate::app::ports::RestartPort;

#[derive(Default)]
pub struct ChipRestart;

impl RestartPort for ChipRestart {
    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        warn!("Restarting chip");
        // SAFETY: esp_restart has no preconditions and does not return.
        unsafe { esp_idf_svc::sys::esp_restart() };
    }

    /// The host has no chip to reset; the caller reboots the [`Device`]
    /// in place instead.
    ///
    /// [`Device`]: crate::app::service::Device
    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        warn!("Restart requested (sim): no chip reset on host");
    }
}

//! One-shot start-delay timer using ESP-IDF's esp_timer API.
//!
//! Expiry only raises the delay-elapsed flag in [`InterruptSignals`]; the
//! polling loop picks it up on its next tick.  On simulation targets a
//! sleeper thread stands in for the hardware timer.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), and
//! only store to an atomic.

use crate::app::ports::DelayTimer;
use crate::events::InterruptSignals;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use std::sync::Arc;
#[cfg(not(target_os = "espidf"))]
use std::sync::atomic::{AtomicU32, Ordering};

use log::{info, warn};

#[cfg(target_os = "espidf")]
unsafe extern "C" fn delay_elapsed_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static InterruptSignals` registered in `new()`.
    let signals = unsafe { &*(arg as *const InterruptSignals) };
    signals.on_delay_elapsed();
}

pub struct StartDelayTimer {
    signals: &'static InterruptSignals,
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
    /// Bumped on every start/cancel; a sleeper only fires if its
    /// generation is still current.
    #[cfg(not(target_os = "espidf"))]
    generation: Arc<AtomicU32>,
}

impl StartDelayTimer {
    #[cfg(target_os = "espidf")]
    pub fn new(signals: &'static InterruptSignals) -> Result<Self, i32> {
        let args = esp_timer_create_args_t {
            callback: Some(delay_elapsed_cb),
            arg: core::ptr::from_ref(signals).cast_mut().cast(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"start_delay".as_ptr(),
            skip_unhandled_events: false,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: `args` outlives the call and `signals` is 'static.
        let ret = unsafe { esp_timer_create(&args, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }
        info!("hw_timer: start-delay timer created");
        Ok(Self { signals, handle })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(signals: &'static InterruptSignals) -> Result<Self, i32> {
        info!("hw_timer(sim): start-delay timer backed by sleeper threads");
        Ok(Self {
            signals,
            generation: Arc::new(AtomicU32::new(0)),
        })
    }
}

#[cfg(target_os = "espidf")]
impl DelayTimer for StartDelayTimer {
    fn start(&mut self, delay_ms: u32) {
        // SAFETY: `handle` came from esp_timer_create and is never deleted.
        unsafe {
            esp_timer_stop(self.handle);
            let ret = esp_timer_start_once(self.handle, u64::from(delay_ms) * 1_000);
            if ret != ESP_OK {
                warn!("hw_timer: start failed (rc={}), firing now", ret);
                self.signals.on_delay_elapsed();
            }
        }
    }

    fn cancel(&mut self) {
        // SAFETY: as above.  Stopping an idle timer is a harmless error.
        unsafe {
            esp_timer_stop(self.handle);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl DelayTimer for StartDelayTimer {
    fn start(&mut self, delay_ms: u32) {
        let mine = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let generation = Arc::clone(&self.generation);
        let signals = self.signals;
        let spawned = std::thread::Builder::new()
            .name("start_delay".into())
            .spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(u64::from(delay_ms)));
                if generation.load(Ordering::Acquire) == mine {
                    signals.on_delay_elapsed();
                }
            });
        if spawned.is_err() {
            warn!("hw_timer(sim): sleeper spawn failed, firing now");
            self.signals.on_delay_elapsed();
        }
    }

    fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

//! Kettle controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod pins;
pub mod protocol;
pub mod provisioning;

// Hardware-facing modules carry their own cfg-gated simulation backends
// so the crate builds and tests on the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;

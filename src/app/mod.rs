//! Application core: domain orchestration, zero direct I/O.
//!
//! [`service::Device`] runs the polling loop that ties the kettle and
//! provisioning machines to the outside world.  All interaction with
//! hardware, storage and sockets happens through the **port traits** in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;

//! Application core: bus management logic, zero direct I/O.
//!
//! All interaction with the physical bus happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable on the host
//! against the simulated bus.

pub mod events;
pub mod ports;
pub mod service;

//! wirehub: two-wire bus manager library.
//!
//! Exposes the bus registry, device directory, transaction sequences and
//! request front end for integration testing and host-side simulation.
//! All ESP-IDF-specific code is guarded by
//! `#[cfg(all(target_os = "espidf", feature = "espidf"))]` within each
//! module, so a target build without the feature still compiles the core.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod bus;
pub mod config;
pub mod endpoints;
pub mod error;

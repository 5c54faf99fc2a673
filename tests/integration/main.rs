//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the simulated bus. All tests run on the host (x86_64) with no
//! real hardware required.

mod concurrency_tests;
mod registry_tests;
mod scan_tests;
mod transaction_tests;

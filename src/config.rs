//! Bus and manager configuration.
//!
//! [`BusConfig`] describes one physical bus (pins and clock); it is
//! recorded by the registry on the first successful bring-up and never
//! changed afterwards. [`ManagerConfig`] holds the tunables shared by
//! every bus.

use serde::{Deserialize, Serialize};

/// Number of physical bus slots (ids `0` and `1`).
pub const BUS_COUNT: usize = 2;

/// Standard-mode clock used when a request omits `frequency`.
pub const DEFAULT_FREQUENCY_HZ: u32 = 100_000;

/// Primitive timeout applied to newly initialized buses.
pub const DEFAULT_TIMEOUT_MS: u16 = 1000;

/// Largest transfer the front end accepts for a multi-byte read.
pub const DEFAULT_MAX_TRANSFER_LEN: usize = 64;

/// Lowest valid 7-bit device address (0 is the general call).
pub const MIN_ADDRESS: u8 = 0x01;
/// Highest valid 7-bit device address.
pub const MAX_ADDRESS: u8 = 0x7F;

/// First address probed by a scan sweep.
pub const SCAN_FIRST_ADDRESS: u8 = 0x01;
/// Last address probed by a scan sweep. `0x7F` is valid for explicit
/// operations but is not swept.
pub const SCAN_LAST_ADDRESS: u8 = 0x7E;

/// Pin and clock configuration for one bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Data line GPIO.
    pub sda_pin: u8,
    /// Clock line GPIO.
    pub scl_pin: u8,
    /// Bus clock in Hz.
    pub frequency: u32,
}

impl BusConfig {
    /// Configuration at the default 100 kHz clock.
    pub const fn new(sda_pin: u8, scl_pin: u8) -> Self {
        Self {
            sda_pin,
            scl_pin,
            frequency: DEFAULT_FREQUENCY_HZ,
        }
    }

    pub const fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }
}

/// Tunables shared by every bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Timeout forwarded to each bus primitive (milliseconds).
    pub timeout_ms: u16,
    /// Upper bound on `length` for front-end multi-byte reads.
    pub max_transfer_len: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_transfer_len: DEFAULT_MAX_TRANSFER_LEN,
        }
    }
}

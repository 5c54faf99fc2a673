//! Wire-level transaction sequences.
//!
//! Stateless helpers that drive a [`WirePort`] through the register
//! protocol:
//!
//! ```text
//! write:  START ADDR(W) REG DATA.. STOP
//! read:   START ADDR(W) REG  RESTART ADDR(R) DATA.. STOP
//! probe:  START ADDR(W) STOP
//! ```
//!
//! The caller is responsible for holding the bus lock and for address
//! validation; see [`validate_address`].

use crate::app::ports::WirePort;
use crate::config::{MAX_ADDRESS, MIN_ADDRESS, SCAN_FIRST_ADDRESS, SCAN_LAST_ADDRESS};
use crate::error::{BusError, Result};

/// Addresses covered by one scan sweep.
pub const SCAN_CAPACITY: usize = (SCAN_LAST_ADDRESS - SCAN_FIRST_ADDRESS + 1) as usize;

/// Addresses that acknowledged a sweep, in ascending order.
pub type ScanResult = heapless::Vec<u8, SCAN_CAPACITY>;

/// Reject the general-call address and anything beyond 7 bits.
pub fn validate_address(address: u8) -> Result<()> {
    if (MIN_ADDRESS..=MAX_ADDRESS).contains(&address) {
        Ok(())
    } else {
        Err(BusError::InvalidParameters)
    }
}

/// Address-only transaction; `true` if the device acknowledged.
pub fn probe(wire: &mut impl WirePort, address: u8) -> bool {
    wire.begin_transmission(address);
    wire.end_transmission(true) == 0
}

/// Probe every address in the scan window.
pub fn sweep(wire: &mut impl WirePort) -> ScanResult {
    let mut found = ScanResult::new();
    for address in SCAN_FIRST_ADDRESS..=SCAN_LAST_ADDRESS {
        if probe(wire, address) {
            // Capacity equals the window size.
            let _ = found.push(address);
        }
    }
    found
}

/// Write `payload` starting at register `reg` in a single transaction.
pub fn write_register(wire: &mut impl WirePort, address: u8, reg: u8, payload: &[u8]) -> Result<()> {
    wire.begin_transmission(address);
    wire.write(reg);
    for &byte in payload {
        wire.write(byte);
    }
    BusError::check_status(wire.end_transmission(true))
}

/// Fill `buf` from register `reg` using a repeated start.
///
/// Any short read is reported as [`BusError::Timeout`]; `buf` is only
/// written once the full count has been received.
pub fn read_register(wire: &mut impl WirePort, address: u8, reg: u8, buf: &mut [u8]) -> Result<()> {
    wire.begin_transmission(address);
    wire.write(reg);
    BusError::check_status(wire.end_transmission(false))?;

    let received = wire.request_from(address, buf.len(), true);
    if received != buf.len() {
        return Err(BusError::Timeout);
    }
    for slot in buf.iter_mut() {
        *slot = wire.read().ok_or(BusError::Timeout)?;
    }
    Ok(())
}

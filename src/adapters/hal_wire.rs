//! `embedded-hal` I2C adapter.
//!
//! Bridges any [`embedded_hal::i2c::I2c`] implementation to the
//! Wire-style [`WirePort`] the domain drives. Transmit bytes are queued
//! in a fixed buffer and flushed on `end_transmission`.
//!
//! `embedded-hal` has no notion of holding the bus between two calls, so
//! `end_transmission(false)` defers the queued bytes; the next
//! `request_from` for the same address issues them together with the
//! read as one `write_read` (repeated start). Address and data faults of
//! a deferred write therefore surface as a short read.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use log::debug;

use crate::app::ports::WirePort;
use crate::error::{
    STATUS_DATA_TOO_LONG, STATUS_NACK_ADDRESS, STATUS_NACK_DATA, STATUS_OK, STATUS_OTHER,
};

/// Transmit queue size, matching the classic Wire buffer.
pub const TX_CAPACITY: usize = 128;
/// Largest single `request_from`.
pub const RX_CAPACITY: usize = 128;

/// Map an `embedded-hal` error kind onto a Wire status code.
pub fn status_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => STATUS_NACK_DATA,
        ErrorKind::NoAcknowledge(_) => STATUS_NACK_ADDRESS,
        ErrorKind::Overrun => STATUS_DATA_TOO_LONG,
        _ => STATUS_OTHER,
    }
}

/// [`WirePort`] over an `embedded-hal` 1.0 I2C bus.
pub struct HalWire<I> {
    i2c: I,
    address: u8,
    tx: heapless::Vec<u8, TX_CAPACITY>,
    overflow: bool,
    /// Address whose queued write waits for a repeated-start read.
    held: Option<u8>,
    rx: heapless::Vec<u8, RX_CAPACITY>,
    rx_pos: usize,
}

impl<I: I2c> HalWire<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            address: 0,
            tx: heapless::Vec::new(),
            overflow: false,
            held: None,
            rx: heapless::Vec::new(),
            rx_pos: 0,
        }
    }

    /// Give the underlying driver back.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> WirePort for HalWire<I> {
    fn begin_transmission(&mut self, address: u8) {
        self.address = address;
        self.tx.clear();
        self.overflow = false;
        self.held = None;
    }

    fn write(&mut self, byte: u8) {
        if self.tx.push(byte).is_err() {
            self.overflow = true;
        }
    }

    fn end_transmission(&mut self, stop: bool) -> u8 {
        if self.overflow {
            self.tx.clear();
            return STATUS_DATA_TOO_LONG;
        }
        if !stop {
            self.held = Some(self.address);
            return STATUS_OK;
        }
        let result = self.i2c.write(self.address, &self.tx);
        self.tx.clear();
        match result {
            Ok(()) => STATUS_OK,
            Err(e) => status_for(e.kind()),
        }
    }

    fn request_from(&mut self, address: u8, count: usize, _stop: bool) -> usize {
        self.rx.clear();
        self.rx_pos = 0;
        if count > RX_CAPACITY {
            debug!("hal_wire: request of {} exceeds rx buffer", count);
            return 0;
        }
        // Capacity checked above.
        let _ = self.rx.resize(count, 0);

        let result = match self.held.take() {
            Some(held) if held == address => {
                self.i2c.write_read(address, &self.tx, &mut self.rx)
            }
            _ => self.i2c.read(address, &mut self.rx),
        };
        self.tx.clear();

        match result {
            Ok(()) => count,
            Err(e) => {
                debug!("hal_wire: read 0x{:02x} failed: {:?}", address, e.kind());
                self.rx.clear();
                0
            }
        }
    }

    fn read(&mut self) -> Option<u8> {
        let byte = self.rx.get(self.rx_pos).copied()?;
        self.rx_pos += 1;
        Some(byte)
    }
}

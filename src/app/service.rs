//! Bus manager, the hexagonal core.
//!
//! [`BusManager`] owns the [`BusRegistry`] and the [`DeviceDirectory`]
//! and exposes every register-level operation as a method returning its
//! own [`Result`]. There is no shared "last error": each call carries
//! its outcome.
//!
//! ```text
//!  WireFactory ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                  │         BusManager           │
//!        Clock ──▶ │ Registry · Directory · Txn   │
//!                  └─────────────────────────────┘
//! ```
//!
//! Methods take `&self`. Each bus has its own lock inside the registry,
//! so two threads can drive bus 0 and bus 1 at the same time. A scan takes
//! the directory lock while still holding its bus lock; nothing ever holds
//! both bus locks.

use std::sync::Mutex;

use log::debug;

use crate::bus::directory::{DeviceDirectory, DeviceRecord};
use crate::bus::registry::{BusRegistry, lock};
use crate::bus::transaction::{self, ScanResult};
use crate::config::{BusConfig, ManagerConfig};
use crate::error::{BusError, Result};

use super::events::BusEvent;
use super::ports::{Clock, EventSink, WireFactory, WirePort};

// ───────────────────────────────────────────────────────────────
// BusManager
// ───────────────────────────────────────────────────────────────

/// Owns bus handles and device records; performs validated transactions.
pub struct BusManager<F: WireFactory, C: Clock> {
    registry: BusRegistry<F>,
    directory: Mutex<DeviceDirectory>,
    clock: C,
}

impl<F: WireFactory, C: Clock> BusManager<F, C> {
    pub fn new(factory: F, clock: C, config: &ManagerConfig) -> Self {
        Self {
            registry: BusRegistry::new(factory, config.timeout_ms),
            directory: Mutex::new(DeviceDirectory::new()),
            clock,
        }
    }

    // ── Bus lifecycle ─────────────────────────────────────────

    /// Bring a bus online. Idempotent once it succeeded.
    pub fn init_bus(&self, bus_id: u8, config: BusConfig) -> Result<()> {
        self.registry.init_bus(bus_id, config)
    }

    pub fn is_initialized(&self, bus_id: u8) -> bool {
        self.registry.is_initialized(bus_id)
    }

    /// Configuration recorded when the bus came up.
    pub fn bus_config(&self, bus_id: u8) -> Option<BusConfig> {
        self.registry.config(bus_id)
    }

    pub fn timeout_ms(&self) -> u16 {
        self.registry.timeout_ms()
    }

    /// Store a new primitive timeout and forward it to every live bus.
    pub fn set_timeout(&self, timeout_ms: u16) {
        self.registry.set_timeout(timeout_ms);
    }

    // ── Discovery ─────────────────────────────────────────────

    /// Probe addresses `0x01..=0x7E` and reconcile the directory.
    ///
    /// `sink` receives one [`BusEvent::DeviceFound`] per responding
    /// address, one [`BusEvent::DeviceLost`] per device that stopped
    /// answering, then [`BusEvent::ScanCompleted`].
    pub fn scan_bus(&self, bus_id: u8, sink: &mut impl EventSink) -> Result<ScanResult> {
        // Reconcile under the bus lock so same-bus scans land in sweep order.
        // Lock order is always bus, then directory.
        let found = self.registry.with_bus(bus_id, |wire| {
            let found = transaction::sweep(wire);
            let now = self.clock.now_ms();
            for &address in &found {
                sink.emit(&BusEvent::DeviceFound { bus_id, address });
            }
            lock(&self.directory).reconcile_scan_result(bus_id, &found, now, &mut *sink);
            Ok(found)
        })?;
        sink.emit(&BusEvent::ScanCompleted {
            bus_id,
            found: found.len(),
        });
        Ok(found)
    }

    /// Single address probe. Does not touch the directory.
    pub fn is_present(&self, bus_id: u8, address: u8) -> Result<bool> {
        self.with_device(bus_id, address, |wire| Ok(transaction::probe(wire, address)))
    }

    /// Snapshot of every known device on both buses.
    pub fn devices(&self) -> Vec<DeviceRecord> {
        lock(&self.directory).list_all()
    }

    pub fn device(&self, bus_id: u8, address: u8) -> Option<DeviceRecord> {
        lock(&self.directory).get(bus_id, address).cloned()
    }

    /// Give a discovered device a human-readable name.
    pub fn rename_device(&self, bus_id: u8, address: u8, name: &str) -> bool {
        lock(&self.directory).rename(bus_id, address, name)
    }

    // ── Register writes ───────────────────────────────────────

    pub fn write_register(&self, bus_id: u8, address: u8, reg: u8, value: u8) -> Result<()> {
        self.with_device(bus_id, address, |wire| {
            transaction::write_register(wire, address, reg, &[value])
        })
    }

    /// Write a 16-bit value, high byte first.
    pub fn write_register16(&self, bus_id: u8, address: u8, reg: u8, value: u16) -> Result<()> {
        self.with_device(bus_id, address, |wire| {
            transaction::write_register(wire, address, reg, &value.to_be_bytes())
        })
    }

    /// Write `data` starting at `reg`. An empty slice is rejected
    /// without opening a transaction.
    pub fn write_bytes(&self, bus_id: u8, address: u8, reg: u8, data: &[u8]) -> Result<()> {
        self.with_device(bus_id, address, |wire| {
            if data.is_empty() {
                return Err(BusError::InvalidParameters);
            }
            transaction::write_register(wire, address, reg, data)
        })
    }

    // ── Register reads ────────────────────────────────────────

    pub fn read_register(&self, bus_id: u8, address: u8, reg: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_bytes(bus_id, address, reg, &mut buf)?;
        Ok(buf[0])
    }

    /// Read a 16-bit value; the first byte on the wire is the high byte.
    pub fn read_register16(&self, bus_id: u8, address: u8, reg: u8) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_bytes(bus_id, address, reg, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Fill `buf` starting at `reg`. A short transfer fails with
    /// [`BusError::Timeout`] and leaves `buf` untouched.
    pub fn read_bytes(&self, bus_id: u8, address: u8, reg: u8, buf: &mut [u8]) -> Result<()> {
        self.with_device(bus_id, address, |wire| {
            if buf.is_empty() {
                return Err(BusError::InvalidParameters);
            }
            transaction::read_register(wire, address, reg, buf)
        })
    }

    // ── Raw passthrough ───────────────────────────────────────

    /// Open a transaction for manual sequencing.
    pub fn begin_transmission(&self, bus_id: u8, address: u8) -> Result<()> {
        self.with_device(bus_id, address, |wire| {
            debug!("bus{}: raw begin 0x{:02x}", bus_id, address);
            wire.begin_transmission(address);
            Ok(())
        })
    }

    /// Queue one byte into the transaction opened by
    /// [`begin_transmission`](Self::begin_transmission).
    pub fn write_byte(&self, bus_id: u8, byte: u8) -> Result<()> {
        self.registry.with_bus(bus_id, |wire| {
            wire.write(byte);
            Ok(())
        })
    }

    /// Close the open transaction; `stop = false` holds the bus.
    pub fn end_transmission(&self, bus_id: u8, stop: bool) -> Result<()> {
        self.registry
            .with_bus(bus_id, |wire| BusError::check_status(wire.end_transmission(stop)))
    }

    /// Request `count` bytes. Anything short of `count` is a
    /// [`BusError::Timeout`].
    pub fn request_from(&self, bus_id: u8, address: u8, count: usize, stop: bool) -> Result<usize> {
        self.with_device(bus_id, address, |wire| {
            let received = wire.request_from(address, count, stop);
            if received == count {
                Ok(received)
            } else {
                debug!("bus{}: raw request 0x{:02x} got {}/{}", bus_id, address, received, count);
                Err(BusError::Timeout)
            }
        })
    }

    /// Consume the next byte delivered by [`request_from`](Self::request_from).
    pub fn read_byte(&self, bus_id: u8) -> Result<u8> {
        self.registry
            .with_bus(bus_id, |wire| wire.read().ok_or(BusError::Timeout))
    }

    // ── Internal ──────────────────────────────────────────────

    /// Bus must be initialized, then the address must be in `1..=127`.
    fn with_device<R>(
        &self,
        bus_id: u8,
        address: u8,
        op: impl FnOnce(&mut F::Wire) -> Result<R>,
    ) -> Result<R> {
        self.registry.with_bus(bus_id, |wire| {
            transaction::validate_address(address)?;
            op(wire)
        })
    }
}

//! Device directory: every (bus, address) pair ever seen responding.
//!
//! Records are created by the first scan that observes an address and
//! are never deleted: a device that stops answering is kept as "known
//! but not currently responsive" so its history survives.

use serde::Serialize;

use crate::app::events::BusEvent;
use crate::app::ports::EventSink;

/// Placeholder name for newly discovered devices.
pub const DEFAULT_DEVICE_NAME: &str = "Unknown Device";

/// Maximum stored length of a device name.
pub const DEVICE_NAME_LEN: usize = 32;

/// One discovered device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    pub bus_id: u8,
    pub address: u8,
    pub name: heapless::String<DEVICE_NAME_LEN>,
    /// Whether the device acknowledged the most recent scan of its bus.
    pub responsive: bool,
    /// Monotonic timestamp (ms) of the last acknowledged probe.
    pub last_seen: u64,
}

impl DeviceRecord {
    fn new(bus_id: u8, address: u8, now: u64) -> Self {
        Self {
            bus_id,
            address,
            name: truncated_name(DEFAULT_DEVICE_NAME),
            responsive: true,
            last_seen: now,
        }
    }

    fn is(&self, bus_id: u8, address: u8) -> bool {
        self.bus_id == bus_id && self.address == address
    }
}

fn truncated_name(name: &str) -> heapless::String<DEVICE_NAME_LEN> {
    let mut s = heapless::String::new();
    for c in name.chars() {
        if s.push(c).is_err() {
            break;
        }
    }
    s
}

/// Insertion-ordered set of [`DeviceRecord`]s, at most one per
/// (bus, address) pair.
#[derive(Debug, Default)]
pub struct DeviceDirectory {
    records: Vec<DeviceRecord>,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert: create a responsive record, or refresh an existing one.
    pub fn record_response(&mut self, bus_id: u8, address: u8, now: u64) {
        match self.records.iter_mut().find(|r| r.is(bus_id, address)) {
            Some(record) => {
                record.responsive = true;
                record.last_seen = now;
            }
            None => self.records.push(DeviceRecord::new(bus_id, address, now)),
        }
    }

    /// Flip a responsive record to non-responsive and emit
    /// [`BusEvent::DeviceLost`]. Returns `true` if that happened.
    pub fn mark_unseen(&mut self, bus_id: u8, address: u8, sink: &mut impl EventSink) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.is(bus_id, address)) else {
            return false;
        };
        if !record.responsive {
            return false;
        }
        record.responsive = false;
        sink.emit(&BusEvent::DeviceLost { bus_id, address });
        true
    }

    /// Apply a complete scan of `bus_id`: every observed address is
    /// refreshed and every other record on that bus is marked unseen.
    pub fn reconcile_scan_result(
        &mut self,
        bus_id: u8,
        observed: &[u8],
        now: u64,
        sink: &mut impl EventSink,
    ) {
        for &address in observed {
            self.record_response(bus_id, address, now);
        }

        let missing: Vec<u8> = self
            .records
            .iter()
            .filter(|r| r.bus_id == bus_id && !observed.contains(&r.address))
            .map(|r| r.address)
            .collect();
        for address in missing {
            self.mark_unseen(bus_id, address, sink);
        }
    }

    /// Replace the placeholder name of a known device.
    pub fn rename(&mut self, bus_id: u8, address: u8, name: &str) -> bool {
        match self.records.iter_mut().find(|r| r.is(bus_id, address)) {
            Some(record) => {
                record.name = truncated_name(name);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, bus_id: u8, address: u8) -> Option<&DeviceRecord> {
        self.records.iter().find(|r| r.is(bus_id, address))
    }

    /// Snapshot of every record across both buses, in insertion order.
    pub fn list_all(&self) -> Vec<DeviceRecord> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//! Outbound bus events.
//!
//! [`BusManager`](super::service::BusManager) emits these through the
//! [`EventSink`](super::ports::EventSink) port while a scan runs.
//! Adapters on the other side decide what to do with them. They may log to
//! serial, notify a device controller, etc.

/// Structured events emitted during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// An address acknowledged during a scan sweep.
    DeviceFound { bus_id: u8, address: u8 },

    /// A previously responsive device did not answer the latest scan.
    DeviceLost { bus_id: u8, address: u8 },

    /// A scan finished and the directory was reconciled.
    ScanCompleted { bus_id: u8, found: usize },
}

//! Port traits forming the hexagonal boundary between bus logic and the outside world.
//!
//! ```text
//!   WireFactory ──▶ WirePort ──▶ BusManager (domain) ──▶ EventSink
//!                                      ▲
//!                                    Clock
//! ```
//!
//! Driven adapters (the physical bus driver, the event consumer, the
//! monotonic clock) implement these traits. The
//! [`BusManager`](super::service::BusManager) consumes them via generics,
//! so the domain core never touches a peripheral directly.

use crate::bus::BusId;
use crate::config::BusConfig;

// ───────────────────────────────────────────────────────────────
// Wire port (driven adapter: domain ↔ physical bus)
// ───────────────────────────────────────────────────────────────

/// Wire-style transaction primitive for one bus.
///
/// A write transaction is `begin_transmission` → `write`* →
/// `end_transmission`. A read is `request_from` followed by `read` for
/// each byte received. Status values returned by `end_transmission` are
/// `0` for acknowledged and the vendor codes in [`crate::error`]
/// otherwise.
///
/// Implementations are trusted: the domain never retries a transaction.
pub trait WirePort {
    /// Open a transaction to `address` and clear the transmit queue.
    fn begin_transmission(&mut self, address: u8);

    /// Queue one byte inside the open transaction.
    fn write(&mut self, byte: u8);

    /// Flush the queued bytes. With `stop = false` the bus is held for a
    /// repeated start.
    fn end_transmission(&mut self, stop: bool) -> u8;

    /// Read `count` bytes from `address`. Returns the number received.
    fn request_from(&mut self, address: u8, count: usize, stop: bool) -> usize;

    /// Next received byte, if any remain.
    fn read(&mut self) -> Option<u8>;

    /// Apply the manager-wide timeout. Primitives without a per-call
    /// timeout may ignore it.
    fn set_timeout(&mut self, _timeout_ms: u16) {}

    /// Release the bus. Called exactly once at registry teardown.
    fn end(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Wire factory (driven adapter: bus bring-up)
// ───────────────────────────────────────────────────────────────

/// Brings a physical bus online.
///
/// The registry calls [`begin`](Self::begin) at most once per bus id for
/// every successful bring-up; a `None` return is reported as
/// [`BusError::Other`](crate::error::BusError::Other) and the slot stays
/// empty so the caller may retry.
pub trait WireFactory {
    /// The live handle type stored in the registry.
    type Wire: WirePort;

    /// Configure pins and clock for `bus` and return its handle.
    fn begin(&mut self, bus: BusId, config: &BusConfig) -> Option<Self::Wire>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → device controllers / logging)
// ───────────────────────────────────────────────────────────────

/// Receives device-found / device-lost notifications.
///
/// Called inline on the scanning thread: implementations must not block
/// or do long-running work.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BusEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::BusEvent) {}
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source used to stamp `last_seen`.
pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

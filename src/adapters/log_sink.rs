//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing bus events to the logger (UART /
//! USB-CDC in production). A device controller that reacts to
//! discovery would implement the same trait.

use log::{info, warn};

use crate::app::events::BusEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BusEvent`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BusEvent) {
        match event {
            BusEvent::DeviceFound { bus_id, address } => {
                info!("SCAN | bus{} found 0x{:02x}", bus_id, address);
            }
            BusEvent::DeviceLost { bus_id, address } => {
                warn!("SCAN | bus{} lost 0x{:02x}", bus_id, address);
            }
            BusEvent::ScanCompleted { bus_id, found } => {
                info!("SCAN | bus{} complete, {} responding", bus_id, found);
            }
        }
    }
}

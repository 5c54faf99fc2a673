//! Bus registry: a fixed two-slot arena of live bus handles.
//!
//! Each slot sits behind its own lock so bus 0 and bus 1 progress
//! independently; no operation ever holds both. A slot is filled on the
//! first successful [`BusRegistry::init_bus`] and stays filled for the
//! lifetime of the registry. Dropping the registry releases every live
//! handle exactly once.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::app::ports::{WireFactory, WirePort};
use crate::config::{BUS_COUNT, BusConfig};
use crate::error::{BusError, Result};

use super::BusId;

/// An initialized bus: its recorded configuration and live handle.
struct BusSlot<W> {
    config: BusConfig,
    wire: W,
}

/// Owns the bus factory and the handles it produced.
pub struct BusRegistry<F: WireFactory> {
    factory: Mutex<F>,
    slots: [Mutex<Option<BusSlot<F::Wire>>>; BUS_COUNT],
    timeout_ms: AtomicU16,
}

/// Lock a mutex, recovering the data if a previous holder panicked.
/// Slot contents are plain data, so a poisoned lock is still consistent.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<F: WireFactory> BusRegistry<F> {
    pub fn new(factory: F, timeout_ms: u16) -> Self {
        Self {
            factory: Mutex::new(factory),
            slots: core::array::from_fn(|_| Mutex::new(None)),
            timeout_ms: AtomicU16::new(timeout_ms),
        }
    }

    /// Bring `bus_id` online.
    ///
    /// A repeat call for an already-initialized bus succeeds without
    /// touching the hardware; its `config` is ignored.
    pub fn init_bus(&self, bus_id: u8, config: BusConfig) -> Result<()> {
        let Some(bus) = BusId::new(bus_id) else {
            return Err(BusError::InvalidParameters);
        };

        let mut slot = lock(&self.slots[bus.index()]);
        if slot.is_some() {
            debug!("{}: already initialized, ignoring {:?}", bus, config);
            return Ok(());
        }

        let Some(mut wire) = lock(&self.factory).begin(bus, &config) else {
            warn!(
                "{}: bring-up failed (sda={}, scl={}, {} Hz)",
                bus, config.sda_pin, config.scl_pin, config.frequency
            );
            return Err(BusError::Other);
        };

        wire.set_timeout(self.timeout_ms.load(Ordering::Relaxed));
        *slot = Some(BusSlot { config, wire });
        info!(
            "{}: online (sda={}, scl={}, {} Hz)",
            bus, config.sda_pin, config.scl_pin, config.frequency
        );
        Ok(())
    }

    /// Whether `bus_id` names an initialized bus. Never fails.
    pub fn is_initialized(&self, bus_id: u8) -> bool {
        BusId::new(bus_id).is_some_and(|bus| lock(&self.slots[bus.index()]).is_some())
    }

    /// Configuration recorded at bring-up, if the bus is initialized.
    pub fn config(&self, bus_id: u8) -> Option<BusConfig> {
        let bus = BusId::new(bus_id)?;
        lock(&self.slots[bus.index()]).as_ref().map(|s| s.config)
    }

    /// Run `op` against the live handle of `bus_id` while holding that
    /// bus's lock.
    ///
    /// An unknown or uninitialized bus yields
    /// [`BusError::BusNotInitialized`] without calling `op`.
    pub fn with_bus<R>(
        &self,
        bus_id: u8,
        op: impl FnOnce(&mut F::Wire) -> Result<R>,
    ) -> Result<R> {
        let bus = BusId::new(bus_id).ok_or(BusError::BusNotInitialized)?;
        let mut slot = lock(&self.slots[bus.index()]);
        match slot.as_mut() {
            Some(s) => op(&mut s.wire),
            None => Err(BusError::BusNotInitialized),
        }
    }

    /// Current primitive timeout (milliseconds).
    pub fn timeout_ms(&self) -> u16 {
        self.timeout_ms.load(Ordering::Relaxed)
    }

    /// Store a new timeout and forward it to every live bus.
    pub fn set_timeout(&self, timeout_ms: u16) {
        self.timeout_ms.store(timeout_ms, Ordering::Relaxed);
        for slot in &self.slots {
            if let Some(s) = lock(slot).as_mut() {
                s.wire.set_timeout(timeout_ms);
            }
        }
    }
}

impl<F: WireFactory> Drop for BusRegistry<F> {
    fn drop(&mut self) {
        for (id, slot) in self.slots.iter_mut().enumerate() {
            let slot = slot.get_mut().unwrap_or_else(PoisonError::into_inner);
            if let Some(s) = slot.as_mut() {
                s.wire.end();
                info!("bus{}: released", id);
            }
        }
    }
}

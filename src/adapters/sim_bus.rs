//! Simulated two-wire bus for host builds and tests.
//!
//! A [`SimBus`] models a set of register-file devices sharing one bus.
//! Each device has 256 byte registers and an auto-incrementing register
//! pointer: the first byte of a write sets the pointer, following bytes
//! are stored at successive registers, and reads stream from the
//! pointer onwards. Every primitive call is appended to a transcript so
//! tests can assert on the exact wire sequence.
//!
//! Faults are scripted: [`SimBus::limit_reads`] truncates every read,
//! [`SimBus::force_status`] makes the next `end_transmission` return a
//! vendor code, and [`SimFactory::fail_begin`] refuses bus bring-up.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::app::ports::{WireFactory, WirePort};
use crate::bus::BusId;
use crate::bus::registry::lock;
use crate::config::{BUS_COUNT, BusConfig, DEFAULT_TIMEOUT_MS};
use crate::error::{STATUS_NACK_ADDRESS, STATUS_OK};

/// One primitive call, as seen by the simulated bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireOp {
    Begin(u8),
    Write(u8),
    End { stop: bool },
    Request { address: u8, count: usize, stop: bool },
    Release,
}

struct SimDevice {
    registers: [u8; 256],
    pointer: u8,
}

impl SimDevice {
    fn new() -> Self {
        Self {
            registers: [0; 256],
            pointer: 0,
        }
    }
}

struct SimState {
    devices: BTreeMap<u8, SimDevice>,
    ops: Vec<WireOp>,
    read_limit: Option<usize>,
    forced_status: Option<u8>,
    timeout_ms: u16,
    releases: usize,
}

// ── SimBus ────────────────────────────────────────────────────

/// Shared handle to one simulated bus. Clones observe the same devices.
#[derive(Clone)]
pub struct SimBus {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                devices: BTreeMap::new(),
                ops: Vec::new(),
                read_limit: None,
                forced_status: None,
                timeout_ms: DEFAULT_TIMEOUT_MS,
                releases: 0,
            })),
        }
    }

    /// A fresh primitive handle onto this bus.
    pub fn wire(&self) -> SimWire {
        SimWire {
            bus: self.clone(),
            address: 0,
            tx: Vec::new(),
            rx: VecDeque::new(),
        }
    }

    /// Connect a device that acknowledges `address`.
    pub fn attach(&self, address: u8) {
        lock(&self.state).devices.entry(address).or_insert_with(SimDevice::new);
    }

    /// Disconnect the device at `address`; its registers are lost.
    pub fn detach(&self, address: u8) {
        lock(&self.state).devices.remove(&address);
    }

    /// Preload a register. Attaches the device if needed.
    pub fn set_register(&self, address: u8, reg: u8, value: u8) {
        let mut st = lock(&self.state);
        let dev = st.devices.entry(address).or_insert_with(SimDevice::new);
        dev.registers[reg as usize] = value;
    }

    /// Current register content, `None` if no device is attached.
    pub fn register(&self, address: u8, reg: u8) -> Option<u8> {
        lock(&self.state)
            .devices
            .get(&address)
            .map(|d| d.registers[reg as usize])
    }

    /// Deliver at most `limit` bytes per read from now on.
    pub fn limit_reads(&self, limit: usize) {
        lock(&self.state).read_limit = Some(limit);
    }

    /// Make the next `end_transmission` return `status`.
    pub fn force_status(&self, status: u8) {
        lock(&self.state).forced_status = Some(status);
    }

    /// Transcript of every primitive call so far.
    pub fn ops(&self) -> Vec<WireOp> {
        lock(&self.state).ops.clone()
    }

    /// Timeout last applied by the registry.
    pub fn timeout_ms(&self) -> u16 {
        lock(&self.state).timeout_ms
    }

    /// How many times a handle on this bus was released.
    pub fn release_count(&self) -> usize {
        lock(&self.state).releases
    }
}

// ── SimWire ───────────────────────────────────────────────────

/// [`WirePort`] implementation over a [`SimBus`].
pub struct SimWire {
    bus: SimBus,
    address: u8,
    tx: Vec<u8>,
    rx: VecDeque<u8>,
}

impl WirePort for SimWire {
    fn begin_transmission(&mut self, address: u8) {
        lock(&self.bus.state).ops.push(WireOp::Begin(address));
        self.address = address;
        self.tx.clear();
    }

    fn write(&mut self, byte: u8) {
        lock(&self.bus.state).ops.push(WireOp::Write(byte));
        self.tx.push(byte);
    }

    fn end_transmission(&mut self, stop: bool) -> u8 {
        let mut st = lock(&self.bus.state);
        st.ops.push(WireOp::End { stop });
        let tx = core::mem::take(&mut self.tx);

        if let Some(status) = st.forced_status.take() {
            return status;
        }
        let Some(dev) = st.devices.get_mut(&self.address) else {
            return STATUS_NACK_ADDRESS;
        };
        if let Some((&reg, data)) = tx.split_first() {
            dev.pointer = reg;
            for &byte in data {
                dev.registers[dev.pointer as usize] = byte;
                dev.pointer = dev.pointer.wrapping_add(1);
            }
        }
        STATUS_OK
    }

    fn request_from(&mut self, address: u8, count: usize, stop: bool) -> usize {
        let mut st = lock(&self.bus.state);
        st.ops.push(WireOp::Request { address, count, stop });
        self.rx.clear();

        let n = st.read_limit.map_or(count, |limit| limit.min(count));
        let Some(dev) = st.devices.get_mut(&address) else {
            return 0;
        };
        for _ in 0..n {
            self.rx.push_back(dev.registers[dev.pointer as usize]);
            dev.pointer = dev.pointer.wrapping_add(1);
        }
        n
    }

    fn read(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn set_timeout(&mut self, timeout_ms: u16) {
        lock(&self.bus.state).timeout_ms = timeout_ms;
    }

    fn end(&mut self) {
        let mut st = lock(&self.bus.state);
        st.ops.push(WireOp::Release);
        st.releases += 1;
    }
}

// ── SimFactory ────────────────────────────────────────────────

struct FactoryControl {
    fail_begin: bool,
    begins: Vec<(BusId, BusConfig)>,
}

/// [`WireFactory`] handing out handles onto two simulated buses.
/// Clones share buses and control state.
#[derive(Clone)]
pub struct SimFactory {
    buses: [SimBus; BUS_COUNT],
    control: Arc<Mutex<FactoryControl>>,
}

impl Default for SimFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SimFactory {
    pub fn new() -> Self {
        Self {
            buses: core::array::from_fn(|_| SimBus::new()),
            control: Arc::new(Mutex::new(FactoryControl {
                fail_begin: false,
                begins: Vec::new(),
            })),
        }
    }

    /// The simulated bus behind `bus`.
    pub fn bus(&self, bus: BusId) -> SimBus {
        self.buses[bus.index()].clone()
    }

    /// Make every following bring-up fail (or succeed again).
    pub fn fail_begin(&self, fail: bool) {
        lock(&self.control).fail_begin = fail;
    }

    /// Number of bring-up attempts, successful or not.
    pub fn begin_count(&self) -> usize {
        lock(&self.control).begins.len()
    }

    /// Every bring-up attempt with the configuration it carried.
    pub fn begins(&self) -> Vec<(BusId, BusConfig)> {
        lock(&self.control).begins.clone()
    }
}

impl WireFactory for SimFactory {
    type Wire = SimWire;

    fn begin(&mut self, bus: BusId, config: &BusConfig) -> Option<SimWire> {
        let mut control = lock(&self.control);
        control.begins.push((bus, *config));
        if control.fail_begin {
            return None;
        }
        Some(self.buses[bus.index()].wire())
    }
}

//! Two threads driving the two buses through one shared manager.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use wirehub::adapters::sim_bus::SimFactory;
use wirehub::app::ports::{Clock, NullSink};
use wirehub::app::service::BusManager;
use wirehub::bus::BusId;
use wirehub::config::ManagerConfig;

use crate::sim_rig::{BUS0_PINS, SimRig};

const ROUNDS: u8 = 200;

#[test]
fn buses_progress_independently_from_two_threads() {
    let rig = SimRig::with_both();
    rig.bus(0).attach(0x50);
    rig.bus(1).attach(0x51);

    let workers: Vec<_> = [(0u8, 0x50u8), (1, 0x51)]
        .into_iter()
        .map(|(bus_id, addr)| {
            let mgr = Arc::clone(&rig.manager);
            thread::spawn(move || {
                for round in 0..ROUNDS {
                    mgr.write_register(bus_id, addr, round, round ^ bus_id).unwrap();
                    assert_eq!(mgr.read_register(bus_id, addr, round), Ok(round ^ bus_id));
                }
            })
        })
        .collect();

    for w in workers {
        w.join().expect("worker panicked");
    }

    for round in 0..ROUNDS {
        assert_eq!(rig.bus(0).register(0x50, round), Some(round));
        assert_eq!(rig.bus(1).register(0x51, round), Some(round ^ 1));
    }
}

#[test]
fn scans_and_transactions_interleave_safely() {
    let rig = SimRig::with_both();
    rig.bus(0).attach(0x20);
    rig.bus(1).attach(0x21);

    let scanner = {
        let mgr = Arc::clone(&rig.manager);
        thread::spawn(move || {
            for _ in 0..20 {
                let found = mgr.scan_bus(0, &mut NullSink).unwrap();
                assert_eq!(found.as_slice(), &[0x20]);
            }
        })
    };
    let writer = {
        let mgr = Arc::clone(&rig.manager);
        thread::spawn(move || {
            for i in 0..100u8 {
                mgr.write_register(1, 0x21, 0, i).unwrap();
                mgr.scan_bus(1, &mut NullSink).unwrap();
            }
        })
    };
    scanner.join().expect("scanner panicked");
    writer.join().expect("writer panicked");

    let devices = rig.manager.devices();
    assert_eq!(devices.len(), 2);
    assert!(devices.iter().all(|d| d.responsive));
}

/// Clock whose first reading blocks until the test opens the gate, so a
/// scan can be held between its sweep and its bookkeeping.
#[derive(Default)]
struct GatedClock {
    armed: AtomicBool,
    state: Mutex<(bool, bool)>, // (parked, open)
    cond: Condvar,
}

impl GatedClock {
    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    fn wait_parked(&self) {
        let mut state = self.state.lock().unwrap();
        while !state.0 {
            state = self.cond.wait(state).unwrap();
        }
    }

    fn open(&self) {
        self.state.lock().unwrap().1 = true;
        self.cond.notify_all();
    }
}

impl Clock for GatedClock {
    fn now_ms(&self) -> u64 {
        if !self.armed.swap(false, Ordering::SeqCst) {
            return 200;
        }
        let mut state = self.state.lock().unwrap();
        state.0 = true;
        self.cond.notify_all();
        while !state.1 {
            state = self.cond.wait(state).unwrap();
        }
        100
    }
}

#[test]
fn same_bus_scans_reconcile_in_sweep_order() {
    let factory = SimFactory::new();
    let clock = Arc::new(GatedClock::default());
    let mgr = Arc::new(BusManager::new(
        factory.clone(),
        Arc::clone(&clock),
        &ManagerConfig::default(),
    ));
    mgr.init_bus(0, BUS0_PINS).unwrap();
    let bus = factory.bus(BusId::BUS0);
    bus.attach(0x50);

    clock.arm();
    let first = {
        let mgr = Arc::clone(&mgr);
        thread::spawn(move || mgr.scan_bus(0, &mut NullSink).unwrap())
    };
    clock.wait_parked();

    // The device leaves after the first sweep saw it.
    bus.detach(0x50);
    let second = {
        let mgr = Arc::clone(&mgr);
        thread::spawn(move || mgr.scan_bus(0, &mut NullSink).unwrap())
    };
    thread::sleep(Duration::from_millis(50));
    clock.open();

    assert_eq!(first.join().expect("first scan panicked").as_slice(), &[0x50]);
    assert!(second.join().expect("second scan panicked").is_empty());

    let record = mgr.device(0, 0x50).expect("device recorded");
    assert!(!record.responsive);
    assert_eq!(record.last_seen, 100);
}

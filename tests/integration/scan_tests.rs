//! Discovery: scan sweep, directory reconciliation and lost-device events.

use wirehub::app::events::BusEvent;
use wirehub::bus::directory::DEFAULT_DEVICE_NAME;
use wirehub::error::BusError;

use crate::sim_rig::{Recorder, SimRig};

#[test]
fn second_scan_flips_missing_device_exactly_once() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    bus.attach(0x48);
    bus.attach(0x50);
    let mut sink = Recorder::new();

    rig.clock.set(100);
    let found = rig.manager.scan_bus(0, &mut sink).unwrap();
    assert_eq!(found.as_slice(), &[0x48, 0x50]);
    for addr in [0x48, 0x50] {
        let rec = rig.manager.device(0, addr).unwrap();
        assert!(rec.responsive);
        assert_eq!(rec.last_seen, 100);
    }
    assert!(sink.lost().is_empty());

    bus.detach(0x50);
    sink.clear();
    rig.clock.set(250);
    let found = rig.manager.scan_bus(0, &mut sink).unwrap();
    assert_eq!(found.as_slice(), &[0x48]);

    let kept = rig.manager.device(0, 0x48).unwrap();
    assert!(kept.responsive);
    assert_eq!(kept.last_seen, 250);

    let gone = rig.manager.device(0, 0x50).unwrap();
    assert!(!gone.responsive);
    assert_eq!(gone.last_seen, 100, "last_seen only moves on a response");

    assert_eq!(sink.lost(), vec![(0, 0x50)]);

    // A third scan without 0x50 must not fire again.
    sink.clear();
    rig.manager.scan_bus(0, &mut sink).unwrap();
    assert!(sink.lost().is_empty());
}

#[test]
fn returning_device_becomes_responsive_without_duplicate_record() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    let mut sink = Recorder::new();

    bus.attach(0x3C);
    rig.manager.scan_bus(0, &mut sink).unwrap();
    bus.detach(0x3C);
    rig.manager.scan_bus(0, &mut sink).unwrap();
    bus.attach(0x3C);
    rig.manager.scan_bus(0, &mut sink).unwrap();

    let devices = rig.manager.devices();
    assert_eq!(devices.len(), 1);
    assert!(devices[0].responsive);
    assert_eq!(sink.found(), vec![(0, 0x3C), (0, 0x3C)]);
}

#[test]
fn events_arrive_found_then_lost_then_completed() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    bus.attach(0x10);
    bus.attach(0x11);
    rig.manager.scan_bus(0, &mut Recorder::new()).unwrap();

    bus.detach(0x11);
    let mut sink = Recorder::new();
    rig.manager.scan_bus(0, &mut sink).unwrap();
    assert_eq!(
        sink.events,
        vec![
            BusEvent::DeviceFound { bus_id: 0, address: 0x10 },
            BusEvent::DeviceLost { bus_id: 0, address: 0x11 },
            BusEvent::ScanCompleted { bus_id: 0, found: 1 },
        ]
    );
}

#[test]
fn scan_never_probes_general_call_or_top_address() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    bus.attach(0x7F);
    let found = rig.manager.scan_bus(0, &mut Recorder::new()).unwrap();
    assert!(found.is_empty(), "0x7F is outside the sweep");
    assert_eq!(rig.manager.is_present(0, 0x7F), Ok(true), "but valid for explicit probes");
}

#[test]
fn ping_does_not_touch_the_directory() {
    let rig = SimRig::with_bus0();
    rig.bus(0).attach(0x68);
    assert_eq!(rig.manager.is_present(0, 0x68), Ok(true));
    assert_eq!(rig.manager.is_present(0, 0x69), Ok(false));
    assert!(rig.manager.devices().is_empty());
}

#[test]
fn scan_of_uninitialized_bus_reports_error_and_no_events() {
    let rig = SimRig::new();
    let mut sink = Recorder::new();
    assert_eq!(rig.manager.scan_bus(0, &mut sink), Err(BusError::BusNotInitialized));
    assert!(sink.events.is_empty());
}

#[test]
fn records_are_per_bus_and_renamable() {
    let rig = SimRig::with_both();
    rig.bus(0).attach(0x50);
    rig.bus(1).attach(0x50);
    rig.manager.scan_bus(0, &mut Recorder::new()).unwrap();
    rig.manager.scan_bus(1, &mut Recorder::new()).unwrap();

    // Losing the device on bus 1 leaves bus 0's record alone.
    rig.bus(1).detach(0x50);
    let mut sink = Recorder::new();
    rig.manager.scan_bus(1, &mut sink).unwrap();
    assert_eq!(sink.lost(), vec![(1, 0x50)]);
    assert!(rig.manager.device(0, 0x50).unwrap().responsive);

    assert_eq!(rig.manager.device(0, 0x50).unwrap().name.as_str(), DEFAULT_DEVICE_NAME);
    assert!(rig.manager.rename_device(0, 0x50, "EEPROM"));
    assert_eq!(rig.manager.device(0, 0x50).unwrap().name.as_str(), "EEPROM");
    assert!(!rig.manager.rename_device(0, 0x51, "nothing"));
}

//! Bus bring-up, idempotent re-init, timeout forwarding and teardown.

use wirehub::app::ports::NullSink;
use wirehub::config::BusConfig;
use wirehub::error::BusError;

use crate::sim_rig::{BUS0_PINS, SimRig};

#[test]
fn repeat_init_keeps_first_configuration() {
    let rig = SimRig::new();
    rig.manager.init_bus(0, BUS0_PINS).unwrap();

    let other = BusConfig::new(1, 2).with_frequency(400_000);
    assert_eq!(rig.manager.init_bus(0, other), Ok(()));

    assert_eq!(rig.manager.bus_config(0), Some(BUS0_PINS));
    assert_eq!(rig.factory.begin_count(), 1, "second init must not touch hardware");
}

#[test]
fn bus_ids_beyond_one_are_invalid() {
    let rig = SimRig::new();
    for id in [2u8, 3, 200, 255] {
        assert_eq!(rig.manager.init_bus(id, BUS0_PINS), Err(BusError::InvalidParameters));
        assert!(!rig.manager.is_initialized(id));
    }
    assert_eq!(rig.factory.begin_count(), 0);
    assert!(!rig.manager.is_initialized(0));
}

#[test]
fn failed_bring_up_leaves_slot_empty_and_retry_works() {
    let rig = SimRig::new();
    rig.factory.fail_begin(true);
    assert_eq!(rig.manager.init_bus(1, BUS0_PINS), Err(BusError::Other));
    assert!(!rig.manager.is_initialized(1));
    assert_eq!(rig.manager.scan_bus(1, &mut NullSink), Err(BusError::BusNotInitialized));

    rig.factory.fail_begin(false);
    assert_eq!(rig.manager.init_bus(1, BUS0_PINS), Ok(()));
    assert!(rig.manager.is_initialized(1));
    assert_eq!(rig.factory.begin_count(), 2);
}

#[test]
fn custom_frequency_reaches_the_factory() {
    let rig = SimRig::new();
    let fast = BusConfig::new(8, 9).with_frequency(400_000);
    rig.manager.init_bus(1, fast).unwrap();
    let begins = rig.factory.begins();
    assert_eq!(begins.len(), 1);
    assert_eq!(begins[0].0.get(), 1);
    assert_eq!(begins[0].1.frequency, 400_000);
}

#[test]
fn timeout_is_applied_at_bring_up_and_on_change() {
    let rig = SimRig::with_bus0();
    assert_eq!(rig.bus(0).timeout_ms(), 1000);

    rig.manager.set_timeout(250);
    assert_eq!(rig.manager.timeout_ms(), 250);
    assert_eq!(rig.bus(0).timeout_ms(), 250);

    rig.manager.init_bus(1, BusConfig::new(4, 5)).unwrap();
    assert_eq!(rig.bus(1).timeout_ms(), 250, "late buses inherit the current timeout");
}

#[test]
fn teardown_releases_each_live_bus_once() {
    let rig = SimRig::with_bus0();
    let (bus0, bus1) = (rig.bus(0), rig.bus(1));
    drop(rig.manager);

    assert_eq!(bus0.release_count(), 1);
    assert_eq!(bus1.release_count(), 0, "uninitialized bus has nothing to release");
}

//! Register-level transactions through `BusManager` over `SimBus`.

use wirehub::adapters::sim_bus::WireOp;
use wirehub::error::{BusError, result_code};

use crate::sim_rig::{SimManager, SimRig};

/// Run every address-taking operation once against `addr` on `bus`.
fn every_operation(mgr: &SimManager, bus: u8, addr: u8) -> Vec<(&'static str, Result<(), BusError>)> {
    let mut buf = [0u8; 2];
    vec![
        ("write_register", mgr.write_register(bus, addr, 0, 1)),
        ("write_register16", mgr.write_register16(bus, addr, 0, 0x0102)),
        ("write_bytes", mgr.write_bytes(bus, addr, 0, &[1, 2])),
        ("read_register", mgr.read_register(bus, addr, 0).map(drop)),
        ("read_register16", mgr.read_register16(bus, addr, 0).map(drop)),
        ("read_bytes", mgr.read_bytes(bus, addr, 0, &mut buf)),
        ("is_present", mgr.is_present(bus, addr).map(drop)),
        ("begin_transmission", mgr.begin_transmission(bus, addr)),
        ("request_from", mgr.request_from(bus, addr, 1, true).map(drop)),
    ]
}

#[test]
fn out_of_range_addresses_never_reach_the_wire() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    for addr in [0u8, 128, 200] {
        for (name, result) in every_operation(&rig.manager, 0, addr) {
            assert_eq!(result, Err(BusError::InvalidParameters), "{} at 0x{:02x}", name, addr);
        }
    }
    assert!(bus.ops().is_empty(), "primitive was invoked: {:?}", bus.ops());
}

#[test]
fn uninitialized_bus_is_reported_before_address() {
    let rig = SimRig::with_bus0();
    for bus_id in [1u8, 2, 9] {
        for addr in [0x48u8, 0] {
            for (name, result) in every_operation(&rig.manager, bus_id, addr) {
                assert_eq!(result, Err(BusError::BusNotInitialized), "{} on bus {}", name, bus_id);
            }
        }
    }
    assert_eq!(rig.manager.write_byte(1, 0xAA), Err(BusError::BusNotInitialized));
    assert_eq!(rig.manager.end_transmission(1, true), Err(BusError::BusNotInitialized));
    assert_eq!(rig.manager.read_byte(1), Err(BusError::BusNotInitialized));
}

#[test]
fn write_then_read_round_trips() {
    let rig = SimRig::with_bus0();
    rig.bus(0).attach(0x50);

    rig.manager.write_register(0, 0x50, 0x00, 0xFF).unwrap();
    assert_eq!(rig.manager.read_register(0, 0x50, 0x00), Ok(0xFF));
}

#[test]
fn short_read_is_timeout_and_buffer_untouched() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    for (i, b) in [1u8, 2, 3, 4].into_iter().enumerate() {
        bus.set_register(0x50, i as u8, b);
    }
    bus.limit_reads(3);

    let mut buf = [0xEEu8; 4];
    let result = rig.manager.read_bytes(0, 0x50, 0x00, &mut buf);
    assert_eq!(result, Err(BusError::Timeout));
    assert_eq!(result_code(&result), 1);
    assert_eq!(buf, [0xEE; 4], "no partial success");
}

#[test]
fn empty_write_is_rejected_without_a_transaction() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    bus.attach(0x50);
    assert_eq!(rig.manager.write_bytes(0, 0x50, 0x00, &[]), Err(BusError::InvalidParameters));
    assert!(bus.ops().is_empty());
}

#[test]
fn multi_byte_write_is_one_stopped_transaction() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    bus.attach(0x50);

    rig.manager.write_bytes(0, 0x50, 0x10, &[0xA1, 0xA2, 0xA3]).unwrap();
    assert_eq!(
        bus.ops(),
        vec![
            WireOp::Begin(0x50),
            WireOp::Write(0x10),
            WireOp::Write(0xA1),
            WireOp::Write(0xA2),
            WireOp::Write(0xA3),
            WireOp::End { stop: true },
        ]
    );

    let mut buf = [0u8; 3];
    rig.manager.read_bytes(0, 0x50, 0x10, &mut buf).unwrap();
    assert_eq!(buf, [0xA1, 0xA2, 0xA3]);
}

#[test]
fn sixteen_bit_registers_are_high_byte_first() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    bus.set_register(0x40, 0x02, 0xBE);
    bus.set_register(0x40, 0x03, 0xEF);
    assert_eq!(rig.manager.read_register16(0, 0x40, 0x02), Ok(0xBEEF));
}

#[test]
fn primitive_status_maps_onto_errors() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    bus.attach(0x20);

    let cases = [
        (1u8, BusError::Timeout),
        (2, BusError::NackAddress),
        (3, BusError::NackData),
        (4, BusError::Other),
        (5, BusError::Timeout),
        (9, BusError::Other),
    ];
    for (status, expected) in cases {
        bus.force_status(status);
        assert_eq!(rig.manager.write_register(0, 0x20, 0, 0), Err(expected), "status {}", status);
    }
    assert_eq!(rig.manager.write_register(0, 0x20, 0, 0), Ok(()));
}

#[test]
fn absent_device_nacks_address_on_write_and_read() {
    let rig = SimRig::with_bus0();
    assert_eq!(rig.manager.write_register(0, 0x33, 0, 0), Err(BusError::NackAddress));
    assert_eq!(rig.manager.read_register(0, 0x33, 0), Err(BusError::NackAddress));
}

#[test]
fn no_retries_after_a_failure() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    assert!(rig.manager.write_register(0, 0x33, 0, 0).is_err());
    let begins = bus.ops().iter().filter(|op| matches!(op, WireOp::Begin(_))).count();
    assert_eq!(begins, 1);
}

#[test]
fn raw_request_short_count_is_timeout() {
    let rig = SimRig::with_bus0();
    let bus = rig.bus(0);
    bus.attach(0x29);
    bus.limit_reads(1);
    assert_eq!(rig.manager.request_from(0, 0x29, 2, true), Err(BusError::Timeout));
}

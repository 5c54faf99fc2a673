//! Fuzz target: `Router::handle` over a simulated bus.
//!
//! Arbitrary URIs are dispatched against a manager with bus 0 online and
//! two devices attached. The router must always answer with a known
//! status code and a JSON body.
//!
//! cargo fuzz run fuzz_router

#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use wirehub::adapters::sim_bus::SimFactory;
use wirehub::adapters::time::ManualClock;
use wirehub::app::ports::NullSink;
use wirehub::app::service::BusManager;
use wirehub::bus::BusId;
use wirehub::config::{BusConfig, ManagerConfig};
use wirehub::endpoints::Router;
use wirehub::endpoints::params::split_uri;

fuzz_target!(|data: &[u8]| {
    let Ok(uri) = core::str::from_utf8(data) else {
        return;
    };

    let factory = SimFactory::new();
    factory.bus(BusId::BUS0).attach(0x48);
    factory.bus(BusId::BUS0).attach(0x50);
    let config = ManagerConfig::default();
    let manager = Arc::new(BusManager::new(factory, ManualClock::new(), &config));
    let _ = manager.init_bus(0, BusConfig::new(21, 22));
    let router = Router::new(manager, &config);

    let (path, params) = split_uri(uri);
    let response = router.handle(path, &params, &mut NullSink);
    assert!(matches!(response.status, 200 | 400 | 404 | 500));
    assert!(response.to_value().is_some(), "body must be JSON");
});

//! Route table and dispatch.
//!
//! [`ENDPOINTS`] lists every built-in action with its route, a one-line
//! summary and its parameter metadata. [`Router::handle`] checks the
//! required parameters before calling the handler, so a request missing
//! any of them is answered with 400 without touching a bus.

use std::sync::Arc;

use log::debug;

use super::handlers;
use super::params::{ParamError, Params, require};
use super::Response;
use crate::app::ports::{Clock, EventSink, WireFactory};
use crate::app::service::BusManager;
use crate::config::ManagerConfig;

// ───────────────────────────────────────────────────────────────
// Route table
// ───────────────────────────────────────────────────────────────

/// Built-in actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    InitBus,
    ScanBus,
    ListDevices,
    ReadRegister,
    WriteRegister,
    PingDevice,
    ReadBytes,
    WriteBytes,
    BusInfo,
    ListEndpoints,
}

/// One named parameter accepted by an endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

const fn required(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec { name, description, required: true }
}

const fn optional(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec { name, description, required: false }
}

/// One routable endpoint.
#[derive(Debug, Clone, Copy)]
pub struct EndpointSpec {
    pub route: &'static str,
    pub summary: &'static str,
    pub action: Action,
    pub params: &'static [ParamSpec],
}

impl EndpointSpec {
    pub fn required_params(&self) -> impl Iterator<Item = &'static str> {
        self.params.iter().filter(|p| p.required).map(|p| p.name)
    }
}

const BUS_ID: ParamSpec = required("bus_id", "Bus ID (0 or 1)");
const DEVICE_ADDR: ParamSpec = required("device_addr", "Device address (hex, e.g. '0x48')");
const REG_ADDR: ParamSpec = required("reg_addr", "Register address (hex)");

pub const ENDPOINTS: &[EndpointSpec] = &[
    EndpointSpec {
        route: "/initI2C",
        summary: "Initialize I2C bus",
        action: Action::InitBus,
        params: &[
            BUS_ID,
            required("sda_pin", "SDA pin number"),
            required("scl_pin", "SCL pin number"),
            optional("frequency", "Bus frequency in Hz (default 100000)"),
        ],
    },
    EndpointSpec {
        route: "/scanI2C",
        summary: "Scan I2C bus for devices",
        action: Action::ScanBus,
        params: &[BUS_ID],
    },
    EndpointSpec {
        route: "/getI2CDevices",
        summary: "Get all known devices",
        action: Action::ListDevices,
        params: &[],
    },
    EndpointSpec {
        route: "/readI2C",
        summary: "Read register from device",
        action: Action::ReadRegister,
        params: &[BUS_ID, DEVICE_ADDR, REG_ADDR],
    },
    EndpointSpec {
        route: "/writeI2C",
        summary: "Write register to device",
        action: Action::WriteRegister,
        params: &[BUS_ID, DEVICE_ADDR, REG_ADDR, required("value", "Value to write (hex)")],
    },
    EndpointSpec {
        route: "/pingI2C",
        summary: "Ping I2C device",
        action: Action::PingDevice,
        params: &[BUS_ID, DEVICE_ADDR],
    },
    EndpointSpec {
        route: "/readI2CBytes",
        summary: "Read multiple bytes from device",
        action: Action::ReadBytes,
        params: &[BUS_ID, DEVICE_ADDR, REG_ADDR, required("length", "Number of bytes to read")],
    },
    EndpointSpec {
        route: "/writeI2CBytes",
        summary: "Write multiple bytes to device",
        action: Action::WriteBytes,
        params: &[
            BUS_ID,
            DEVICE_ADDR,
            REG_ADDR,
            required("data", "Comma-separated hex values (e.g. '0x01,0x02,0x03')"),
        ],
    },
    EndpointSpec {
        route: "/getI2CBus",
        summary: "Get bus configuration",
        action: Action::BusInfo,
        params: &[BUS_ID],
    },
    EndpointSpec {
        route: "/i2cEndpoints",
        summary: "List available endpoints",
        action: Action::ListEndpoints,
        params: &[],
    },
];

/// Built-in endpoint served at `route`, if any.
pub fn lookup(route: &str) -> Option<&'static EndpointSpec> {
    ENDPOINTS.iter().find(|e| e.route == route)
}

// ───────────────────────────────────────────────────────────────
// Router
// ───────────────────────────────────────────────────────────────

/// Caller-supplied endpoint handler.
pub type CustomHandler<F, C> = Box<dyn Fn(&BusManager<F, C>, &Params) -> Response + Send + Sync>;

/// Dispatches named actions to the shared [`BusManager`].
pub struct Router<F: WireFactory, C: Clock> {
    manager: Arc<BusManager<F, C>>,
    max_transfer_len: usize,
    custom: Vec<(String, CustomHandler<F, C>)>,
}

impl<F: WireFactory, C: Clock> Router<F, C> {
    pub fn new(manager: Arc<BusManager<F, C>>, config: &ManagerConfig) -> Self {
        Self {
            manager,
            max_transfer_len: config.max_transfer_len,
            custom: Vec::new(),
        }
    }

    /// Add a custom endpoint. Returns `false` and leaves the table
    /// unchanged if `route` is already served.
    pub fn register<H>(&mut self, route: impl Into<String>, handler: H) -> bool
    where
        H: Fn(&BusManager<F, C>, &Params) -> Response + Send + Sync + 'static,
    {
        let route = route.into();
        if lookup(&route).is_some() || self.custom.iter().any(|(r, _)| *r == route) {
            return false;
        }
        debug!("endpoints: registered custom route {}", route);
        self.custom.push((route, Box::new(handler)));
        true
    }

    /// Every served route, built-ins first.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        ENDPOINTS
            .iter()
            .map(|e| e.route)
            .chain(self.custom.iter().map(|(r, _)| r.as_str()))
    }

    /// Answer one request. Unknown routes are 404.
    pub fn handle(&self, route: &str, params: &Params, sink: &mut impl EventSink) -> Response {
        if let Some(endpoint) = lookup(route) {
            let required: Vec<&str> = endpoint.required_params().collect();
            let outcome = require(params, &required)
                .and_then(|()| self.dispatch(endpoint.action, params, sink));
            return match outcome {
                Ok(response) => response,
                Err(e) => {
                    debug!("endpoints: {} rejected: {}", route, e);
                    Response::rejected(&e)
                }
            };
        }
        if let Some((_, handler)) = self.custom.iter().find(|(r, _)| r == route) {
            return handler(&*self.manager, params);
        }
        Response::not_found(route)
    }

    fn dispatch(
        &self,
        action: Action,
        params: &Params,
        sink: &mut impl EventSink,
    ) -> Result<Response, ParamError> {
        let mgr = &*self.manager;
        match action {
            Action::InitBus => handlers::init_bus(mgr, params),
            Action::ScanBus => handlers::scan_bus(mgr, params, sink),
            Action::ListDevices => handlers::list_devices(mgr),
            Action::ReadRegister => handlers::read_register(mgr, params),
            Action::WriteRegister => handlers::write_register(mgr, params),
            Action::PingDevice => handlers::ping_device(mgr, params),
            Action::ReadBytes => handlers::read_bytes(mgr, params, self.max_transfer_len),
            Action::WriteBytes => handlers::write_bytes(mgr, params),
            Action::BusInfo => handlers::bus_info(mgr, params),
            Action::ListEndpoints => {
                handlers::list_endpoints(self.custom.iter().map(|(r, _)| r.as_str()))
            }
        }
    }
}

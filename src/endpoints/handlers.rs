//! Built-in action handlers.
//!
//! Each handler decodes its parameters, calls the [`BusManager`] once and
//! renders a JSON body. Parameter faults surface as [`ParamError`] and are
//! rendered by the router as 400 before the bus is touched; bus faults are
//! rendered here as 500 with the human string and the machine code.

use serde_json::{Value, json};

use super::Response;
use super::params::{self, ParamError, Params, hex};
use super::router::{ENDPOINTS, ParamSpec};
use crate::app::ports::{Clock, EventSink, WireFactory};
use crate::app::service::BusManager;
use crate::config::{BusConfig, DEFAULT_FREQUENCY_HZ};
use crate::error::{BusError, Result, result_code};

type Handled = core::result::Result<Response, ParamError>;

/// Stamp `success`, `error_code` and `error` onto `body`.
fn finish<T>(mut body: Value, result: &Result<T>) -> Response {
    body["success"] = json!(result.is_ok());
    body["error_code"] = json!(result_code(result));
    match result {
        Ok(_) => Response::json(200, &body),
        Err(e) => {
            body["error"] = json!(e.to_string());
            Response::json(500, &body)
        }
    }
}

pub(super) fn init_bus<F: WireFactory, C: Clock>(mgr: &BusManager<F, C>, p: &Params) -> Handled {
    let bus_id: u8 = params::decimal(p, "bus_id")?;
    let sda_pin: u8 = params::decimal(p, "sda_pin")?;
    let scl_pin: u8 = params::decimal(p, "scl_pin")?;
    let frequency: u32 = params::decimal_or(p, "frequency", DEFAULT_FREQUENCY_HZ)?;

    let config = BusConfig::new(sda_pin, scl_pin).with_frequency(frequency);
    let result = mgr.init_bus(bus_id, config);
    let body = json!({
        "bus_id": bus_id,
        "sda_pin": sda_pin,
        "scl_pin": scl_pin,
        "frequency": frequency,
    });
    Ok(finish(body, &result))
}

pub(super) fn scan_bus<F: WireFactory, C: Clock>(
    mgr: &BusManager<F, C>,
    p: &Params,
    sink: &mut impl EventSink,
) -> Handled {
    let bus_id: u8 = params::decimal(p, "bus_id")?;
    let result = mgr.scan_bus(bus_id, sink);

    let found: &[u8] = result.as_ref().map(|f| f.as_slice()).unwrap_or_default();
    let devices: Vec<Value> = found
        .iter()
        .map(|&address| json!({ "address": address, "address_hex": hex(address) }))
        .collect();
    let body = json!({
        "bus_id": bus_id,
        "device_count": devices.len(),
        "devices": devices,
    });
    Ok(finish(body, &result))
}

pub(super) fn list_devices<F: WireFactory, C: Clock>(mgr: &BusManager<F, C>) -> Handled {
    let devices: Vec<Value> = mgr
        .devices()
        .iter()
        .map(|d| {
            json!({
                "bus_id": d.bus_id,
                "address": d.address,
                "address_hex": hex(d.address),
                "name": d.name.as_str(),
                "responsive": d.responsive,
                "last_seen": d.last_seen,
            })
        })
        .collect();
    let body = json!({
        "device_count": devices.len(),
        "devices": devices,
    });
    Ok(finish(body, &Ok(())))
}

pub(super) fn read_register<F: WireFactory, C: Clock>(mgr: &BusManager<F, C>, p: &Params) -> Handled {
    let bus_id: u8 = params::decimal(p, "bus_id")?;
    let address = params::hex_u8(p, "device_addr")?;
    let reg = params::hex_u8(p, "reg_addr")?;

    let result = mgr.read_register(bus_id, address, reg);
    let mut body = json!({
        "bus_id": bus_id,
        "device_addr": hex(address),
        "reg_addr": hex(reg),
    });
    if let Ok(value) = result {
        body["value"] = json!(value);
        body["value_hex"] = json!(hex(value));
    }
    Ok(finish(body, &result))
}

pub(super) fn write_register<F: WireFactory, C: Clock>(mgr: &BusManager<F, C>, p: &Params) -> Handled {
    let bus_id: u8 = params::decimal(p, "bus_id")?;
    let address = params::hex_u8(p, "device_addr")?;
    let reg = params::hex_u8(p, "reg_addr")?;
    let value = params::hex_u8(p, "value")?;

    let result = mgr.write_register(bus_id, address, reg, value);
    let body = json!({
        "bus_id": bus_id,
        "device_addr": hex(address),
        "reg_addr": hex(reg),
        "value": hex(value),
    });
    Ok(finish(body, &result))
}

/// Always 200: absence is an answer, not a failure.
pub(super) fn ping_device<F: WireFactory, C: Clock>(mgr: &BusManager<F, C>, p: &Params) -> Handled {
    let bus_id: u8 = params::decimal(p, "bus_id")?;
    let address = params::hex_u8(p, "device_addr")?;

    let result = mgr.is_present(bus_id, address);
    let mut body = json!({
        "bus_id": bus_id,
        "device_addr": hex(address),
        "present": result == Ok(true),
    });
    body["success"] = json!(result.is_ok());
    body["error_code"] = json!(result_code(&result));
    if let Err(e) = result {
        body["error"] = json!(e.to_string());
    }
    Ok(Response::json(200, &body))
}

pub(super) fn read_bytes<F: WireFactory, C: Clock>(
    mgr: &BusManager<F, C>,
    p: &Params,
    max_len: usize,
) -> Handled {
    let bus_id: u8 = params::decimal(p, "bus_id")?;
    let address = params::hex_u8(p, "device_addr")?;
    let reg = params::hex_u8(p, "reg_addr")?;
    let length: usize = params::decimal(p, "length")?;
    if length > max_len {
        return Err(ParamError::TooLong { max: max_len });
    }

    let mut buf = vec![0u8; length];
    let result = mgr.read_bytes(bus_id, address, reg, &mut buf);
    let mut body = json!({
        "bus_id": bus_id,
        "device_addr": hex(address),
        "reg_addr": hex(reg),
        "length": length,
    });
    if result.is_ok() {
        body["data"] = json!(buf.iter().map(|&b| hex(b)).collect::<Vec<_>>());
    }
    Ok(finish(body, &result))
}

pub(super) fn write_bytes<F: WireFactory, C: Clock>(mgr: &BusManager<F, C>, p: &Params) -> Handled {
    let bus_id: u8 = params::decimal(p, "bus_id")?;
    let address = params::hex_u8(p, "device_addr")?;
    let reg = params::hex_u8(p, "reg_addr")?;
    let data = params::hex_list(p, "data")?;

    let result = mgr.write_bytes(bus_id, address, reg, &data);
    let body = json!({
        "bus_id": bus_id,
        "device_addr": hex(address),
        "reg_addr": hex(reg),
        "bytes_written": data.len(),
    });
    Ok(finish(body, &result))
}

pub(super) fn bus_info<F: WireFactory, C: Clock>(mgr: &BusManager<F, C>, p: &Params) -> Handled {
    let bus_id: u8 = params::decimal(p, "bus_id")?;
    let response = match mgr.bus_config(bus_id) {
        Some(config) => {
            let body = json!({
                "bus_id": bus_id,
                "sda_pin": config.sda_pin,
                "scl_pin": config.scl_pin,
                "frequency": config.frequency,
                "initialized": true,
                "timeout_ms": mgr.timeout_ms(),
            });
            finish(body, &Ok(()))
        }
        None => {
            let body = json!({ "bus_id": bus_id, "initialized": false });
            finish::<()>(body, &Err(BusError::BusNotInitialized))
        }
    };
    Ok(response)
}

fn params_json(specs: &[ParamSpec]) -> Vec<Value> {
    specs
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "required": s.required,
                "description": s.description,
            })
        })
        .collect()
}

pub(super) fn list_endpoints<'a>(custom: impl Iterator<Item = &'a str>) -> Handled {
    let mut endpoints: Vec<Value> = ENDPOINTS
        .iter()
        .map(|e| {
            json!({
                "route": e.route,
                "summary": e.summary,
                "params": params_json(e.params),
            })
        })
        .collect();
    endpoints.extend(custom.map(|route| {
        json!({
            "route": route,
            "summary": "Custom endpoint",
            "params": [],
        })
    }));
    let body = json!({
        "endpoint_count": endpoints.len(),
        "endpoints": endpoints,
    });
    Ok(finish(body, &Ok(())))
}

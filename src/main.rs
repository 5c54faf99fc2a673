//! wirehub firmware entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  EspWireFactory    LogEventSink    SystemClock             │
//! │  (WireFactory)     (EventSink)     (Clock)                 │
//! │  EspHttpServer ──▶ Router (endpoint table)                 │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ───────────────      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │          BusManager (pure logic)                 │      │
//! │  │  Registry · Directory · Transactions             │      │
//! │  └──────────────────────────────────────────────────┘      │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Result, anyhow};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::http::Method;
use esp_idf_svc::http::server::{Configuration as HttpConfig, EspHttpServer};
use esp_idf_svc::io::Write;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use wirehub::adapters::esp_wire::EspWireFactory;
use wirehub::adapters::log_sink::LogEventSink;
use wirehub::adapters::time::SystemClock;
use wirehub::app::service::BusManager;
use wirehub::config::{BusConfig, ManagerConfig};
use wirehub::endpoints::params::split_uri;
use wirehub::endpoints::{ENDPOINTS, Router};

/// Default ESP32 I2C pins for bus 0.
const BOOT_SDA_PIN: u8 = 21;
const BOOT_SCL_PIN: u8 = 22;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("wirehub v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Network ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let mut wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?,
        sys_loop,
    )?;
    match (option_env!("WIFI_SSID"), option_env!("WIFI_PASS")) {
        (Some(ssid), password) => {
            wifi.set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: ssid.try_into().map_err(|_| anyhow!("SSID too long"))?,
                password: password
                    .unwrap_or("")
                    .try_into()
                    .map_err(|_| anyhow!("password too long"))?,
                ..Default::default()
            }))?;
            wifi.start()?;
            wifi.connect()?;
            wifi.wait_netif_up()?;
            let ip = wifi.wifi().sta_netif().get_ip_info()?;
            info!("WiFi up: {}", ip.ip);
        }
        (None, _) => warn!("WIFI_SSID not set at build time, HTTP server unreachable"),
    }

    // ── 3. Bus manager ────────────────────────────────────────
    let config = ManagerConfig::default();
    let manager = Arc::new(BusManager::new(EspWireFactory::new(), SystemClock::new(), &config));

    let mut sink = LogEventSink::new();
    match manager.init_bus(0, BusConfig::new(BOOT_SDA_PIN, BOOT_SCL_PIN)) {
        Ok(()) => {
            if let Ok(found) = manager.scan_bus(0, &mut sink) {
                info!("bus0: {} device(s) at boot", found.len());
            }
        }
        Err(e) => warn!("bus0 boot init failed: {}", e),
    }

    // ── 4. HTTP front end ─────────────────────────────────────
    let router = Arc::new(Router::new(Arc::clone(&manager), &config));
    let mut server = EspHttpServer::new(&HttpConfig::default())?;
    for endpoint in ENDPOINTS {
        let router = Arc::clone(&router);
        server.fn_handler(endpoint.route, Method::Get, move |req| -> Result<()> {
            let (path, params) = split_uri(req.uri());
            let response = router.handle(path, &params, &mut LogEventSink::new());
            let mut resp = req.into_response(
                response.status,
                None,
                &[("Content-Type", "application/json")],
            )?;
            resp.write_all(response.body.as_bytes())?;
            Ok(())
        })?;
    }
    info!("HTTP: {} endpoints registered", ENDPOINTS.len());

    // ── 5. Idle ───────────────────────────────────────────────
    // The server and WiFi driver run on their own tasks; keep both alive.
    let _keep = (&server, &wifi);
    loop {
        FreeRtos::delay_ms(1000);
    }
}

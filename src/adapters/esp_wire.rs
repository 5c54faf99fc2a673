//! ESP-IDF bus bring-up.
//!
//! [`EspWireFactory`] configures the on-chip I2C controllers and wraps
//! each driver in a [`HalWire`]. Bus 0 uses `I2C0`, bus 1 uses `I2C1`
//! where the chip has one.

use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::i2c::{I2C0, I2cConfig, I2cDriver};
use esp_idf_hal::units::Hertz;
use log::{error, info};

use super::hal_wire::HalWire;
use crate::app::ports::WireFactory;
use crate::bus::BusId;
use crate::config::BusConfig;

/// Live handle type for one ESP32 bus.
pub type EspWire = HalWire<I2cDriver<'static>>;

/// Creates I2C drivers on demand. The registry guarantees at most one
/// live driver per controller.
#[derive(Debug, Default)]
pub struct EspWireFactory;

impl EspWireFactory {
    pub fn new() -> Self {
        Self
    }
}

impl WireFactory for EspWireFactory {
    type Wire = EspWire;

    fn begin(&mut self, bus: BusId, config: &BusConfig) -> Option<EspWire> {
        let i2c_config = I2cConfig::new().baudrate(Hertz(config.frequency));
        // SAFETY: the registry holds each bus slot behind its own lock and
        // never begins a bus that is already live, so each controller and
        // its two pins are owned by exactly one driver.
        let sda = unsafe { AnyIOPin::new(i32::from(config.sda_pin)) };
        let scl = unsafe { AnyIOPin::new(i32::from(config.scl_pin)) };

        let driver = match bus.get() {
            0 => {
                let i2c = unsafe { I2C0::new() };
                I2cDriver::new(i2c, sda, scl, &i2c_config)
            }
            #[cfg(not(any(esp32c2, esp32c3, esp32c6, esp32h2)))]
            1 => {
                let i2c = unsafe { esp_idf_hal::i2c::I2C1::new() };
                I2cDriver::new(i2c, sda, scl, &i2c_config)
            }
            _ => {
                error!("{}: no I2C controller on this chip", bus);
                return None;
            }
        };

        match driver {
            Ok(driver) => {
                info!(
                    "{}: I2C up (sda={}, scl={}, {} Hz)",
                    bus, config.sda_pin, config.scl_pin, config.frequency
                );
                Some(HalWire::new(driver))
            }
            Err(e) => {
                error!("{}: I2C driver init failed: {}", bus, e);
                None
            }
        }
    }
}

//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                    |
//! |-------------|--------------|--------------------------------|
//! | `esp_wire`  | WireFactory  | ESP32 I2C controllers          |
//! | `hal_wire`  | WirePort     | any `embedded-hal` I2C bus     |
//! | `log_sink`  | EventSink    | Serial log output              |
//! | `sim_bus`   | WireFactory  | In-memory register devices     |
//! |             | WirePort     |                                |
//! | `time`      | Clock        | ESP32 system timer / `Instant` |

#[cfg(all(target_os = "espidf", feature = "espidf"))]
pub mod esp_wire;
pub mod hal_wire;
pub mod log_sink;
pub mod sim_bus;
pub mod time;

//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                  |
//! |-------------|--------------------|------------------------------|
//! | `hardware`  | SensorPort         | ESP32 ADC, GPIO              |
//! |             | ActuatorPort       | ESP32 LEDC, GPIO             |
//! |             | DelayTimer         | esp_timer one-shot           |
//! | `log_sink`  | EventSink          | Serial log output            |
//! | `nvs`       | CredentialStore    | NVS / in-memory store        |
//! | `outbox`    | CommandChannel     | Outbound websocket queue     |
//! | `restart`   | RestartPort        | esp_restart / process exit   |
//! | `time`      | Clock              | ESP32 system timer           |
//! | `wifi`      | NetworkPort        | ESP-IDF WiFi AP + STA        |
//! | `websocket` | (queue bridge)     | EspHttpServer `/ws` sessions |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod outbox;
pub mod restart;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod websocket;
pub mod wifi;

//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements     | Connects to                 |
//! |-----------------|----------------|-----------------------------|
//! | `config_source` | ConfigPort     | Embedded JSON document      |
//! | `console`       | (command input)| UART serial console         |
//! | `hardware`      | ActuatorDriver | ESP32 GPIO relay board      |
//! | `log_sink`      | EventSink      | Serial log output           |
//! | `time`          | Clock          | System timer / simulation   |

pub mod config_source;
pub mod console;
#[cfg(feature = "espidf")]
pub mod hardware;
pub mod log_sink;
pub mod time;

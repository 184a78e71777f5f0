//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements          | Connects to                  |
//! |-------------|---------------------|------------------------------|
//! | `hardware`  | InputPort           | embedded-hal input pins      |
//! |             | OutputPort          | embedded-hal output pins     |
//! | `log_sink`  | EventSink           | `log` facade                 |
//! | `store`     | ConfigPort          | in-memory key-value store    |
//! |             | StoragePort         |                              |
//! | `time`      | —                   | host monotonic clock         |

pub mod hardware;
pub mod log_sink;
pub mod store;
pub mod time;

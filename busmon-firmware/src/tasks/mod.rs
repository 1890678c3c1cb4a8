//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod bus_rx;
pub mod console;
pub mod gateway;
pub mod led;

pub use bus_rx::bus_rx_task;
pub use console::{console_rx_task, console_tx_task};
pub use gateway::gateway_task;
pub use led::led_task;

//! Logging utilities.
//!
//! The engine only talks to the `log` facade. Hosts that want output call
//! [`init_logging`] once; hosts with their own logger simply skip it.

mod init;

pub use init::{init_logging, LoggingConfig};

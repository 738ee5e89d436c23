//! System-level modules
//!
//! Process-wide setup that is not tied to one execution mode.

pub mod logging;

pub use logging::{ConsoleTarget, init_logging};

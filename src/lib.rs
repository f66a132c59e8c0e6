//! Mouse TestKit - Pointing-device testing and diagnostic utility
//!
//! Captures raw relative-motion reports independent of window focus and
//! derives device characteristics from them: optical resolution (DPI),
//! USB polling rate, button press timing, and verbatim event traces.

pub mod app;
pub mod config;
pub mod device_info;
pub mod mouse;
pub mod report;
pub mod tests;
pub mod trace;
pub mod utils;

pub use config::Config;

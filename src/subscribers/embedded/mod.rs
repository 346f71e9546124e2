//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders snapshot messages through `tracing` (demo/debug).

mod log;

pub use log::LogWriter;

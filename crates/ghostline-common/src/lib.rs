//! Shared utilities for ghostline crates
//!
//! Currently this is the unified logging entry point; every crate in the
//! workspace (and the test suites) initializes logging through here rather
//! than wiring up `tracing-subscriber` on its own.

pub mod logging;

pub use logging::{init_logging, try_init_logging, LogLevel};

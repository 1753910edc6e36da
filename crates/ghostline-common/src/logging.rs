//! Unified logging initialization
//!
//! One entry point for the whole workspace:
//! - minimum log level parsed from a string (typically `GHOSTLINE_LOG`)
//! - stderr output so editor hosts can capture it separately from stdout
//! - a fallible variant for tests, where a subscriber may already be set

use tracing::Level;
use tracing_subscriber::fmt;

/// Minimum log level for the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    /// Parse log level from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn as_tracing_level(self) -> Level {
        match self {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Initialize process-wide logging at the given minimum level.
///
/// Panics if a global subscriber is already installed; use
/// [`try_init_logging`] where that is expected (tests).
pub fn init_logging(level: LogLevel) {
    fmt()
        .with_max_level(level.as_tracing_level())
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Initialize logging, returning `false` if a subscriber was already set.
pub fn try_init_logging(level: LogLevel) -> bool {
    fmt()
        .with_max_level(level.as_tracing_level())
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

//! Logging configuration types.

use serde::{Deserialize, Serialize};

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `tracing` filter directive for the overlay crates at this level.
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "overlay=trace",
            LogLevel::Debug => "overlay=debug",
            LogLevel::Info => "overlay=info",
            LogLevel::Warn => "overlay=warn",
            LogLevel::Error => "overlay=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

//! Configuration schema definitions.
//!
//! Every section is `#[serde(default)]`, so a file only needs to name the
//! values it changes.

use super::error::{ConfigError, ConfigResult};
use crate::settings::PortSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial line defaults and port aliases
    pub serial: SerialConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Serial port configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Default baud rate for new connections
    pub default_baud: u32,
    /// Default line format, e.g. "8N1"
    pub default_mode: String,
    /// Hardware (RTS/CTS) flow control
    pub flow_control: bool,
    /// Port aliases for convenience, e.g. `gps = "ttyUSB0"`
    pub port_aliases: HashMap<String, String>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            default_baud: 115200,
            default_mode: "8N1".to_string(),
            flow_control: false,
            port_aliases: HashMap::new(),
        }
    }
}

impl SerialConfig {
    /// Validate the default line settings.
    pub fn port_settings(&self) -> ConfigResult<PortSettings> {
        PortSettings::parse(self.default_baud, &self.default_mode, self.flow_control)
            .map_err(|e| ConfigError::validation("serial", e.to_string()))
    }

    /// Resolve a port name through aliases
    pub fn resolve_port<'a>(&'a self, name: &'a str) -> &'a str {
        self.port_aliases.get(name).map_or(name, String::as_str)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive: "trace", "debug", "info", "warn", "error" or a
    /// full `RUST_LOG` style directive list
    pub level: String,
    /// Log format: "full", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single line with all span context
    #[default]
    Full,
    /// Multi-line format with colors
    Pretty,
    /// Abbreviated single line
    Compact,
}

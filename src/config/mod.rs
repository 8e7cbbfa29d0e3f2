//! Configuration module for rs232.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `RS232_CONFIG` environment variable (explicit path)
//! 2. `./rs232.toml` (current directory)
//! 3. `~/.config/rs232/rs232.toml` on Linux, the equivalent per-user
//!    configuration directory on macOS and Windows
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! Values can be overridden via `RS232_<SECTION>_<KEY>` environment variables,
//! e.g. `RS232_SERIAL_DEFAULT_BAUD=9600` or `RS232_LOGGING_LEVEL=debug`.
//!
//! # Example
//!
//! ```rust,no_run
//! use rs232::config::ConfigLoader;
//! use rs232::PortRegistry;
//!
//! let config = ConfigLoader::load()?.into_config();
//! let settings = config.serial.port_settings()?;
//!
//! let mut ports = PortRegistry::new();
//! if let Some(index) = ports.find_port_index(config.serial.resolve_port("gps")) {
//!     ports.open_with(index, &settings)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader};
pub use schema::{Config, LogFormat, LoggingConfig, SerialConfig};

//! Cross-platform, non-blocking RS-232 serial port access.
//!
//! Ports are addressed by a small integer index into a fixed table of
//! platform device names (`/dev/ttyS0`, `/dev/ttyUSB0`, ... on Unix-like
//! systems, `COM1`..`COM32` on Windows). A [`PortRegistry`] opens a port
//! with a baud rate and an `"8N1"`-style mode string, locks it against other
//! processes and restores its previous settings when it is closed.
//!
//! ```rust,no_run
//! use rs232::{ModemLine, PortRegistry};
//!
//! let mut ports = PortRegistry::new();
//! let index = ports.find_port_index("ttyUSB0").expect("unknown device");
//! ports.open(index, 115200, "8N1", false)?;
//!
//! ports.send_string(index, "AT\r")?;
//! let mut buffer = [0u8; 64];
//! let count = ports.poll_read(index, &mut buffer)?;
//! println!("{:?} cts={}", &buffer[..count], ports.get_line_state(index, ModemLine::Cts)?);
//!
//! ports.close(index);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - `settings`: validated line settings and their native translation
//! - `device`: the native driver seam and an in-memory mock backend
//! - `registry`: the static device-name tables
//! - `lifecycle`: the open/close sequence of a single port
//! - `port`: the port registry and I/O operations
//! - `config`: TOML configuration with environment overrides
//! - `logging`: tracing subscriber setup

pub mod config;
pub mod device;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod port;
pub mod registry;
pub mod settings;

pub use device::{FlushDirection, ModemLine, ModemStatus};
pub use error::{InvalidIndex, IoError, OpenError, SettingsError, SetupStage};
pub use port::PortRegistry;
pub use registry::{DeviceTable, MAX_PORTS};
pub use settings::{BaudRate, DataBits, LineFormat, Parity, PortSettings, StopBits};

pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};

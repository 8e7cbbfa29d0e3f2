//! Error types for port configuration, lifecycle and I/O.
//!
//! Validation failures ([`SettingsError`]) are always reported before any
//! operating system call is made. Failures of the native driver are kept as
//! the underlying [`std::io::Error`] so callers can still inspect the OS code.

use std::fmt;
use thiserror::Error;

/// The supplied line configuration is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The baud rate is not in the platform's table of supported rates.
    #[error("unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// The mode string is not exactly three characters long.
    #[error("invalid mode string: expected 3 characters, got {0}")]
    InvalidModeLength(usize),

    /// The data bits character is not one of `5`, `6`, `7` or `8`.
    #[error("invalid number of data bits: '{0}'")]
    InvalidDataBits(char),

    /// The parity character is not one of `N`, `E` or `O` (either case).
    #[error("invalid parity: '{0}'")]
    InvalidParity(char),

    /// The stop bits character is not `1` or `2`.
    #[error("invalid number of stop bits: '{0}'")]
    InvalidStopBits(char),
}

/// A port index outside the device table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal port index: {0}")]
pub struct InvalidIndex(pub usize);

/// The sub-step of port setup that failed after the device handle was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    /// Reading the existing device settings.
    ReadSettings,
    /// Building the native settings block.
    BuildSettings,
    /// Applying the new settings to the device.
    ApplySettings,
    /// Asserting DTR and RTS.
    AssertModemLines,
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadSettings => write!(f, "unable to read port settings"),
            Self::BuildSettings => write!(f, "unable to build port settings"),
            Self::ApplySettings => write!(f, "unable to adjust port settings"),
            Self::AssertModemLines => write!(f, "unable to set port status"),
        }
    }
}

/// Errors returned by [`PortRegistry::open`](crate::PortRegistry::open).
///
/// Whatever the variant, a failed open leaves the port closed with no
/// handle or lock held.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The port index is outside the registry's device table.
    #[error("illegal port index: {0}")]
    InvalidIndex(usize),

    /// The baud rate or mode string was rejected.
    #[error(transparent)]
    InvalidSettings(#[from] SettingsError),

    /// Another handle (possibly in another process) holds the port's lock.
    #[error("another process has locked the port {device}")]
    PortBusy { device: String },

    /// The operating system refused to open the device.
    #[error("unable to open port {device}: {source}")]
    DeviceOpenFailed {
        device: String,
        #[source]
        source: std::io::Error,
    },

    /// The device was opened but could not be configured. The original
    /// settings have been restored and the device released.
    #[error("{stage} of {device}: {source}")]
    ConfigurationFailed {
        device: String,
        stage: SetupStage,
        #[source]
        source: std::io::Error,
    },
}

impl From<InvalidIndex> for OpenError {
    fn from(err: InvalidIndex) -> Self {
        Self::InvalidIndex(err.0)
    }
}

impl OpenError {
    /// Create a `PortBusy` error for a device name.
    pub fn busy(device: impl Into<String>) -> Self {
        Self::PortBusy {
            device: device.into(),
        }
    }

    /// Create a `DeviceOpenFailed` error for a device name.
    pub fn open_failed(device: impl Into<String>, source: std::io::Error) -> Self {
        Self::DeviceOpenFailed {
            device: device.into(),
            source,
        }
    }

    /// Create a `ConfigurationFailed` error for a device name.
    pub fn configuration(device: impl Into<String>, stage: SetupStage, source: std::io::Error) -> Self {
        Self::ConfigurationFailed {
            device: device.into(),
            stage,
            source,
        }
    }
}

/// Errors returned by I/O, modem line and flush operations on an open port.
///
/// A failed operation leaves the port open and usable.
#[derive(Debug, Error)]
pub enum IoError {
    /// The port index is outside the registry's device table.
    #[error("illegal port index: {0}")]
    InvalidIndex(usize),

    /// The port has not been opened.
    #[error("port {0} is not open")]
    NotOpen(usize),

    /// The write could not transfer any byte without blocking.
    #[error("write would block")]
    WouldBlock,

    /// Unexpected failure reported by the operating system.
    #[error("native I/O error: {0}")]
    Native(#[source] std::io::Error),
}

impl IoError {
    /// The OS error code of a `Native` error, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Native(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

impl From<InvalidIndex> for IoError {
    fn from(err: InvalidIndex) -> Self {
        Self::InvalidIndex(err.0)
    }
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::WouldBlock {
            Self::WouldBlock
        } else {
            Self::Native(err)
        }
    }
}

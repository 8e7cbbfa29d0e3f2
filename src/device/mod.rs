//! Device abstraction over the native serial driver.
//!
//! [`SerialDevice`] is the capability the lifecycle and I/O layers need from
//! an opened device; [`DeviceBackend`] opens devices by name. The native
//! backend is selected at build time, and [`MockBackend`] provides an
//! in-memory implementation for tests.

use crate::settings::NativeSettings;
use std::fmt;
use std::io;

pub mod mock;

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

pub use mock::{MockBackend, MockCall, MockDevice, MockFault, MockSettings};

#[cfg(unix)]
pub use unix::{NativeBackend, UnixDevice as NativeDevice};

#[cfg(windows)]
pub use self::windows::{NativeBackend, WindowsDevice as NativeDevice};

/// A modem status input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModemLine {
    /// Data carrier detect.
    Dcd,
    /// Ring indicator.
    Ring,
    /// Clear to send.
    Cts,
    /// Data set ready.
    Dsr,
}

/// Snapshot of the modem status input lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModemStatus {
    pub dcd: bool,
    pub ring: bool,
    pub cts: bool,
    pub dsr: bool,
}

impl ModemStatus {
    /// Whether the given line is asserted.
    pub fn is_asserted(&self, line: ModemLine) -> bool {
        match line {
            ModemLine::Dcd => self.dcd,
            ModemLine::Ring => self.ring,
            ModemLine::Cts => self.cts,
            ModemLine::Dsr => self.dsr,
        }
    }
}

/// Which buffers a flush discards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushDirection {
    /// Received but not yet read.
    Rx,
    /// Written but not yet transmitted.
    Tx,
    Both,
}

/// An opened serial device.
///
/// Dropping the device closes the underlying handle.
pub trait SerialDevice: Send + fmt::Debug {
    /// The native settings block of this device.
    type Settings: NativeSettings;

    /// Take the exclusive advisory lock without blocking.
    fn try_lock(&mut self) -> io::Result<()>;

    /// Release the advisory lock.
    fn unlock(&mut self) -> io::Result<()>;

    /// Read the current device settings.
    fn read_settings(&mut self) -> io::Result<Self::Settings>;

    /// Apply settings to the device, effective immediately.
    fn apply_settings(&mut self, settings: &Self::Settings) -> io::Result<()>;

    /// Read whatever bytes are available.
    ///
    /// Returns an error of kind [`io::ErrorKind::WouldBlock`] or `Ok(0)`
    /// when nothing is buffered.
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    /// Write as many bytes as the driver accepts without blocking.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Query the modem status input lines.
    fn modem_status(&mut self) -> io::Result<ModemStatus>;

    /// Set or clear DTR.
    fn set_dtr(&mut self, asserted: bool) -> io::Result<()>;

    /// Set or clear RTS.
    fn set_rts(&mut self, asserted: bool) -> io::Result<()>;

    /// Set DTR and RTS together.
    fn set_control_lines(&mut self, dtr: bool, rts: bool) -> io::Result<()> {
        self.set_dtr(dtr)?;
        self.set_rts(rts)
    }

    /// Discard buffered data.
    fn flush(&mut self, direction: FlushDirection) -> io::Result<()>;
}

/// Opens serial devices by name.
pub trait DeviceBackend {
    /// The device type produced by this backend.
    type Device: SerialDevice;

    /// Open the named device for reading and writing.
    fn open(&self, name: &str) -> io::Result<Self::Device>;

    /// Check if an open error means another handle already owns the device.
    ///
    /// Backends whose exclusion happens at open time (rather than through
    /// [`SerialDevice::try_lock`]) report it here.
    fn is_busy_error(&self, error: &io::Error) -> bool {
        let _ = error;
        false
    }
}

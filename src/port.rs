//! The port registry and the operations on open ports.
//!
//! A [`PortRegistry`] owns one entry per index of its [`DeviceTable`].
//! Entries start closed, are opened with [`PortRegistry::open`] and return
//! to closed with [`PortRegistry::close`]; an entry is reusable across any
//! number of open/close cycles. Dropping the registry closes every entry.
//!
//! All I/O is non-blocking: reads return `Ok(0)` when nothing is buffered,
//! and writes report how many bytes the driver accepted.

use crate::device::{DeviceBackend, FlushDirection, ModemLine, ModemStatus, NativeBackend, SerialDevice};
use crate::error::{InvalidIndex, IoError, OpenError};
use crate::lifecycle::OpenPort;
use crate::registry::DeviceTable;
use crate::settings::PortSettings;
use std::io;
use tracing::{debug, warn};

/// A fixed-capacity set of serial ports addressed by index.
///
/// Operations on one index must not run concurrently; wrap the registry in
/// a mutex when sharing it between threads.
#[derive(Debug)]
pub struct PortRegistry<B: DeviceBackend = NativeBackend> {
    backend: B,
    table: DeviceTable,
    ports: Vec<Option<OpenPort<B::Device>>>,
}

impl PortRegistry<NativeBackend> {
    /// A registry over the platform device table and native driver.
    pub fn new() -> Self {
        Self::with_backend(NativeBackend)
    }
}

impl Default for PortRegistry<NativeBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: DeviceBackend> PortRegistry<B> {
    /// A registry over the platform device table.
    pub fn with_backend(backend: B) -> Self {
        Self::with_table(backend, DeviceTable::platform())
    }

    /// A registry over a custom device table.
    pub fn with_table(backend: B, table: DeviceTable) -> Self {
        let ports = std::iter::repeat_with(|| None).take(table.len()).collect();
        Self { backend, table, ports }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn table(&self) -> &DeviceTable {
        &self.table
    }

    /// Number of entries.
    pub fn capacity(&self) -> usize {
        self.ports.len()
    }

    /// The device name of a port index.
    pub fn device_name(&self, index: usize) -> Result<&'static str, InvalidIndex> {
        self.table.resolve(index)
    }

    /// Find a port by device path or bare device label.
    pub fn find_port_index(&self, name: &str) -> Option<usize> {
        self.table.find_port_index(name)
    }

    /// Whether the port at `index` is open.
    pub fn is_open(&self, index: usize) -> bool {
        matches!(self.ports.get(index), Some(Some(_)))
    }

    /// The settings an open port was configured with.
    pub fn settings(&self, index: usize) -> Option<&PortSettings> {
        self.ports.get(index)?.as_ref().map(OpenPort::settings)
    }

    /// Open and configure a port.
    ///
    /// `mode` is the three character line format, e.g. `"8N1"`. The index,
    /// baud rate and mode are validated before any device is touched. On
    /// failure the entry stays closed and no handle or lock is held.
    ///
    /// # Example
    /// ```
    /// use rs232::device::MockBackend;
    /// use rs232::{OpenError, PortRegistry, SettingsError};
    ///
    /// let mut ports = PortRegistry::with_backend(MockBackend::new());
    /// let err = ports.open(0, 12345, "8N1", false).unwrap_err();
    /// assert!(matches!(err, OpenError::InvalidSettings(SettingsError::UnsupportedBaudRate(12345))));
    /// assert!(ports.backend().calls().is_empty());
    /// ```
    pub fn open(&mut self, index: usize, baud: u32, mode: &str, flow_control: bool) -> Result<(), OpenError> {
        self.table.resolve(index)?;
        let settings = PortSettings::parse(baud, mode, flow_control)?;
        self.open_with(index, &settings)
    }

    /// Open and configure a port from already validated settings.
    pub fn open_with(&mut self, index: usize, settings: &PortSettings) -> Result<(), OpenError> {
        let name = self.table.resolve(index)?;
        let entry = &mut self.ports[index];
        if entry.is_some() {
            warn!(index, device = name, "port is already open");
            return Err(OpenError::busy(name));
        }

        *entry = Some(OpenPort::open(&self.backend, name, settings)?);
        Ok(())
    }

    /// Close a port, restoring the settings and modem lines it had before
    /// it was opened.
    ///
    /// Closing a port that is not open, or an index outside the table, does
    /// nothing.
    pub fn close(&mut self, index: usize) {
        match self.ports.get_mut(index) {
            Some(entry) => match entry.take() {
                Some(port) => port.close(),
                None => debug!(index, "port is not open, nothing to close"),
            },
            None => warn!(index, "ignoring close of illegal port index"),
        }
    }

    /// Close every open port.
    pub fn close_all(&mut self) {
        for port in self.ports.iter_mut().filter_map(Option::take) {
            port.close();
        }
    }

    fn port_mut(&mut self, index: usize) -> Result<&mut OpenPort<B::Device>, IoError> {
        self.table.resolve(index)?;
        self.ports[index].as_mut().ok_or(IoError::NotOpen(index))
    }

    /// Read whatever bytes are available, up to `buffer.len()`.
    ///
    /// Never blocks: returns `Ok(0)` when no byte is buffered.
    pub fn poll_read(&mut self, index: usize, buffer: &mut [u8]) -> Result<usize, IoError> {
        let port = self.port_mut(index)?;
        match port.device_mut().read(buffer) {
            Ok(count) => Ok(count),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(IoError::Native(e)),
        }
    }

    /// Send a single byte.
    ///
    /// Returns [`IoError::WouldBlock`] when the driver cannot take the byte
    /// right now. The send is not retried.
    pub fn send_byte(&mut self, index: usize, byte: u8) -> Result<(), IoError> {
        let port = self.port_mut(index)?;
        match port.device_mut().write(&[byte])? {
            0 => Err(IoError::WouldBlock),
            _ => Ok(()),
        }
    }

    /// Send as much of `data` as the driver accepts without blocking.
    ///
    /// Returns the number of bytes written, which may be less than
    /// `data.len()`. [`IoError::WouldBlock`] means nothing was written.
    pub fn send_buffer(&mut self, index: usize, data: &[u8]) -> Result<usize, IoError> {
        let port = self.port_mut(index)?;
        match port.device_mut().write(data)? {
            0 if !data.is_empty() => Err(IoError::WouldBlock),
            count => Ok(count),
        }
    }

    /// Send a string byte by byte, stopping at the first NUL.
    ///
    /// Stops at the first byte that cannot be sent and returns its error;
    /// the rest of the string is not sent.
    pub fn send_string(&mut self, index: usize, text: &str) -> Result<(), IoError> {
        for byte in text.bytes().take_while(|&b| b != 0) {
            self.send_byte(index, byte)?;
        }
        Ok(())
    }

    /// All four modem status input lines.
    pub fn modem_status(&mut self, index: usize) -> Result<ModemStatus, IoError> {
        let port = self.port_mut(index)?;
        Ok(port.device_mut().modem_status()?)
    }

    /// Whether a modem status input line is asserted.
    pub fn get_line_state(&mut self, index: usize, line: ModemLine) -> Result<bool, IoError> {
        Ok(self.modem_status(index)?.is_asserted(line))
    }

    /// Assert or clear DTR.
    pub fn set_dtr(&mut self, index: usize, asserted: bool) -> Result<(), IoError> {
        let port = self.port_mut(index)?;
        Ok(port.device_mut().set_dtr(asserted)?)
    }

    /// Assert or clear RTS.
    pub fn set_rts(&mut self, index: usize, asserted: bool) -> Result<(), IoError> {
        let port = self.port_mut(index)?;
        Ok(port.device_mut().set_rts(asserted)?)
    }

    /// Discard buffered bytes in the given direction.
    pub fn flush(&mut self, index: usize, direction: FlushDirection) -> Result<(), IoError> {
        let port = self.port_mut(index)?;
        Ok(port.device_mut().flush(direction)?)
    }
}

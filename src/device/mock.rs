//! Mock device backend for testing.
//!
//! Provides a [`MockBackend`] that simulates serial devices without
//! requiring actual hardware. Every device call is recorded, so tests can
//! check exactly which operating system calls a code path would make.
//! Clones of a backend share their state, which makes two registries built
//! on clones of one backend behave like two processes sharing the devices.

use super::{DeviceBackend, FlushDirection, ModemStatus, SerialDevice};
use crate::settings::{NativeSettings, PortSettings};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::Arc;

/// Settings block of a mock device.
///
/// `None` stands for whatever configuration the device had before any
/// settings were applied to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockSettings(pub Option<PortSettings>);

impl NativeSettings for MockSettings {
    fn compose(settings: &PortSettings) -> io::Result<Self> {
        Ok(Self(Some(*settings)))
    }
}

/// A device call recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Open(String),
    Lock,
    Unlock,
    ReadSettings,
    ApplySettings(MockSettings),
    Read,
    Write(Vec<u8>),
    ModemStatus,
    SetDtr(bool),
    SetRts(bool),
    SetControlLines { dtr: bool, rts: bool },
    Flush(FlushDirection),
    Close,
}

/// A device call that can be made to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockFault {
    Open,
    ReadSettings,
    ApplySettings,
    ControlLines,
    Read,
    Write,
    ModemStatus,
    Flush,
}

/// Simulated state of one device node.
#[derive(Debug, Default)]
struct MockLine {
    settings: MockSettings,
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    modem: ModemStatus,
    dtr: bool,
    rts: bool,
    /// Handle id of the current lock holder.
    locked_by: Option<u64>,
    /// Maximum number of bytes accepted by a single write.
    write_limit: Option<usize>,
}

#[derive(Debug, Default)]
struct MockState {
    lines: HashMap<String, MockLine>,
    calls: Vec<MockCall>,
    faults: HashSet<MockFault>,
    next_handle: u64,
    open_handles: usize,
}

impl MockState {
    fn take_fault(&mut self, fault: MockFault) -> io::Result<()> {
        if self.faults.remove(&fault) {
            Err(io::Error::new(io::ErrorKind::Other, format!("injected {:?} failure", fault)))
        } else {
            Ok(())
        }
    }
}

/// In-memory device backend.
///
/// # Example
/// ```
/// use rs232::device::{DeviceBackend, MockBackend, SerialDevice};
///
/// let backend = MockBackend::new();
/// backend.add_device("/dev/ttyMOCK0");
/// backend.enqueue_read("/dev/ttyMOCK0", b"Hello");
///
/// let mut device = backend.open("/dev/ttyMOCK0").unwrap();
/// let mut buffer = [0u8; 16];
/// let n = device.read(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"Hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create a backend without any devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a device node that can be opened by name.
    pub fn add_device(&self, name: impl Into<String>) {
        self.state.lock().lines.entry(name.into()).or_default();
    }

    /// Make the next call of the given kind fail.
    pub fn fail_next(&self, fault: MockFault) {
        self.state.lock().faults.insert(fault);
    }

    /// Queue bytes to be returned by subsequent reads of the device.
    ///
    /// This and the other setters do nothing for a device that was never added.
    pub fn enqueue_read(&self, name: &str, data: &[u8]) {
        self.update(name, |line| line.rx.extend(data));
    }

    /// All bytes written to the device so far.
    pub fn written(&self, name: &str) -> Vec<u8> {
        self.query(name, |line| line.tx.clone())
    }

    /// Bytes still waiting to be read from the device.
    pub fn pending_rx(&self, name: &str) -> usize {
        self.query(name, |line| line.rx.len())
    }

    /// Limit how many bytes a single write accepts. `Some(0)` makes writes would-block.
    pub fn set_write_limit(&self, name: &str, limit: Option<usize>) {
        self.update(name, |line| line.write_limit = limit);
    }

    /// Set the modem status input lines of the device.
    pub fn set_modem_status(&self, name: &str, status: ModemStatus) {
        self.update(name, |line| line.modem = status);
    }

    /// Set the settings the device currently has.
    pub fn set_settings(&self, name: &str, settings: MockSettings) {
        self.update(name, |line| line.settings = settings);
    }

    /// The settings the device currently has.
    pub fn settings(&self, name: &str) -> MockSettings {
        self.query(name, |line| line.settings)
    }

    /// Current `(DTR, RTS)` output line state of the device.
    pub fn control_lines(&self, name: &str) -> (bool, bool) {
        self.query(name, |line| (line.dtr, line.rts))
    }

    /// Whether any handle holds the device's lock.
    pub fn is_locked(&self, name: &str) -> bool {
        self.query(name, |line| line.locked_by.is_some())
    }

    /// Number of device handles currently open.
    pub fn open_handles(&self) -> usize {
        self.state.lock().open_handles
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn update(&self, name: &str, f: impl FnOnce(&mut MockLine)) {
        if let Some(line) = self.state.lock().lines.get_mut(name) {
            f(line);
        }
    }

    /// Read from a device, or get the default for an unknown name.
    fn query<T: Default>(&self, name: &str, f: impl FnOnce(&MockLine) -> T) -> T {
        self.state.lock().lines.get(name).map_or_else(T::default, f)
    }
}

impl DeviceBackend for MockBackend {
    type Device = MockDevice;

    fn open(&self, name: &str) -> io::Result<MockDevice> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Open(name.to_string()));
        state.take_fault(MockFault::Open)?;
        if !state.lines.contains_key(name) {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("no such device: {}", name)));
        }

        state.next_handle += 1;
        state.open_handles += 1;
        Ok(MockDevice {
            id: state.next_handle,
            name: name.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

/// A handle to a mock device.
#[derive(Debug)]
pub struct MockDevice {
    id: u64,
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockDevice {
    /// The name this device was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record `call`, check for an injected fault and run `f` on the device's line.
    fn call<T>(
        &self,
        call: MockCall,
        fault: Option<MockFault>,
        f: impl FnOnce(u64, &mut MockLine) -> io::Result<T>,
    ) -> io::Result<T> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if let Some(fault) = fault {
            state.take_fault(fault)?;
        }
        let line = state.lines.entry(self.name.clone()).or_default();
        f(self.id, line)
    }
}

impl SerialDevice for MockDevice {
    type Settings = MockSettings;

    fn try_lock(&mut self) -> io::Result<()> {
        self.call(MockCall::Lock, None, |id, line| match line.locked_by {
            Some(holder) if holder != id => Err(io::ErrorKind::WouldBlock.into()),
            _ => {
                line.locked_by = Some(id);
                Ok(())
            }
        })
    }

    fn unlock(&mut self) -> io::Result<()> {
        self.call(MockCall::Unlock, None, |id, line| {
            if line.locked_by == Some(id) {
                line.locked_by = None;
            }
            Ok(())
        })
    }

    fn read_settings(&mut self) -> io::Result<MockSettings> {
        self.call(MockCall::ReadSettings, Some(MockFault::ReadSettings), |_, line| {
            Ok(line.settings)
        })
    }

    fn apply_settings(&mut self, settings: &MockSettings) -> io::Result<()> {
        let settings = *settings;
        self.call(MockCall::ApplySettings(settings), Some(MockFault::ApplySettings), |_, line| {
            line.settings = settings;
            Ok(())
        })
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.call(MockCall::Read, Some(MockFault::Read), |_, line| {
            if line.rx.is_empty() && !buffer.is_empty() {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            let count = buffer.len().min(line.rx.len());
            for (slot, byte) in buffer.iter_mut().zip(line.rx.drain(..count)) {
                *slot = byte;
            }
            Ok(count)
        })
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.call(MockCall::Write(data.to_vec()), Some(MockFault::Write), |_, line| {
            let count = line.write_limit.map_or(data.len(), |limit| limit.min(data.len()));
            if count == 0 && !data.is_empty() {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            line.tx.extend_from_slice(&data[..count]);
            Ok(count)
        })
    }

    fn modem_status(&mut self) -> io::Result<ModemStatus> {
        self.call(MockCall::ModemStatus, Some(MockFault::ModemStatus), |_, line| Ok(line.modem))
    }

    fn set_dtr(&mut self, asserted: bool) -> io::Result<()> {
        self.call(MockCall::SetDtr(asserted), Some(MockFault::ControlLines), |_, line| {
            line.dtr = asserted;
            Ok(())
        })
    }

    fn set_rts(&mut self, asserted: bool) -> io::Result<()> {
        self.call(MockCall::SetRts(asserted), Some(MockFault::ControlLines), |_, line| {
            line.rts = asserted;
            Ok(())
        })
    }

    fn set_control_lines(&mut self, dtr: bool, rts: bool) -> io::Result<()> {
        self.call(
            MockCall::SetControlLines { dtr, rts },
            Some(MockFault::ControlLines),
            |_, line| {
                line.dtr = dtr;
                line.rts = rts;
                Ok(())
            },
        )
    }

    fn flush(&mut self, direction: FlushDirection) -> io::Result<()> {
        self.call(MockCall::Flush(direction), Some(MockFault::Flush), |_, line| {
            if matches!(direction, FlushDirection::Rx | FlushDirection::Both) {
                line.rx.clear();
            }
            Ok(())
        })
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Close);
        state.open_handles -= 1;
        // Closing the last descriptor releases a flock.
        if let Some(line) = state.lines.get_mut(&self.name) {
            if line.locked_by == Some(self.id) {
                line.locked_by = None;
            }
        }
    }
}

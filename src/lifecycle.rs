//! Open and close sequence of a single port.
//!
//! Opening runs open → lock → snapshot settings → apply settings → assert
//! DTR/RTS. Each acquired resource is owned by a guard, so any failure
//! unwinds exactly what was acquired so far: the snapshot is restored, the
//! lock released and the handle closed. Closing runs the same release path.

use crate::device::{DeviceBackend, SerialDevice};
use crate::error::{OpenError, SetupStage};
use crate::settings::{NativeSettings, PortSettings};
use tracing::{debug, info, warn};

/// A device whose exclusive lock is held. Dropping it unlocks, then closes.
#[derive(Debug)]
struct LockedDevice<D: SerialDevice> {
    device: D,
    name: &'static str,
}

impl<D: SerialDevice> LockedDevice<D> {
    fn acquire(mut device: D, name: &'static str) -> Result<Self, OpenError> {
        if let Err(e) = device.try_lock() {
            warn!(device = name, error = %e, "another process has locked the port");
            return Err(OpenError::busy(name));
        }
        Ok(Self { device, name })
    }
}

impl<D: SerialDevice> Drop for LockedDevice<D> {
    fn drop(&mut self) {
        if let Err(e) = self.device.unlock() {
            warn!(device = self.name, error = %e, "unable to release port lock");
        }
    }
}

/// A configured port.
///
/// Holds the device handle, its lock and the settings the device had before
/// it was opened. Dropping an `OpenPort` clears DTR/RTS, restores the saved
/// settings, releases the lock and closes the handle, in that order.
#[derive(Debug)]
pub struct OpenPort<D: SerialDevice> {
    inner: LockedDevice<D>,
    saved: D::Settings,
    settings: PortSettings,
    lines_asserted: bool,
}

impl<D: SerialDevice> OpenPort<D> {
    /// Open, lock and configure the named device.
    pub fn open<B>(backend: &B, name: &'static str, settings: &PortSettings) -> Result<Self, OpenError>
    where
        B: DeviceBackend<Device = D>,
    {
        debug!(device = name, %settings, "opening serial port");

        let device = backend.open(name).map_err(|e| {
            if backend.is_busy_error(&e) {
                warn!(device = name, error = %e, "port is in use");
                OpenError::busy(name)
            } else {
                OpenError::open_failed(name, e)
            }
        })?;

        let mut inner = LockedDevice::acquire(device, name)?;
        let saved = inner
            .device
            .read_settings()
            .map_err(|e| OpenError::configuration(name, SetupStage::ReadSettings, e))?;

        let mut port = Self {
            inner,
            saved,
            settings: *settings,
            lines_asserted: false,
        };
        if let Err(e) = port.configure() {
            warn!(device = name, error = %e, "configuration failed, restoring previous settings");
            return Err(e);
        }

        info!(device = name, %settings, "serial port opened");
        Ok(port)
    }

    fn configure(&mut self) -> Result<(), OpenError> {
        let name = self.inner.name;

        let native = D::Settings::compose(&self.settings)
            .map_err(|e| OpenError::configuration(name, SetupStage::BuildSettings, e))?;
        self.inner
            .device
            .apply_settings(&native)
            .map_err(|e| OpenError::configuration(name, SetupStage::ApplySettings, e))?;

        // Devices that set the lines one at a time can fail with DTR already up.
        self.lines_asserted = true;
        self.inner
            .device
            .set_control_lines(true, true)
            .map_err(|e| OpenError::configuration(name, SetupStage::AssertModemLines, e))?;

        Ok(())
    }

    /// Close the port, restoring the state it had before it was opened.
    pub fn close(self) {
        drop(self);
    }

    /// The device name.
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// The settings the port was opened with.
    pub fn settings(&self) -> &PortSettings {
        &self.settings
    }

    /// The device settings captured before the port was configured.
    pub fn saved_settings(&self) -> &D::Settings {
        &self.saved
    }

    /// The underlying device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.inner.device
    }
}

impl<D: SerialDevice> Drop for OpenPort<D> {
    fn drop(&mut self) {
        let name = self.inner.name;
        let device = &mut self.inner.device;

        if self.lines_asserted {
            if let Err(e) = device.set_control_lines(false, false) {
                warn!(device = name, error = %e, "unable to clear DTR/RTS");
            }
        }
        if let Err(e) = device.apply_settings(&self.saved) {
            warn!(device = name, error = %e, "unable to restore port settings");
        }
        debug!(device = name, "serial port released");
    }
}

//! Win32 COMM API backend.
//!
//! Ports are opened without sharing, so exclusion is enforced by
//! `CreateFile` itself and the advisory lock calls are no-ops.

use super::{DeviceBackend, FlushDirection, ModemStatus, SerialDevice};
use crate::settings::dcb::CommState;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::windows::fs::OpenOptionsExt;
use std::os::windows::io::AsRawHandle;
use winapi::shared::minwindef::{BOOL, DWORD};
use winapi::shared::winerror::{ERROR_ACCESS_DENIED, ERROR_SHARING_VIOLATION};
use winapi::um::commapi::{
    EscapeCommFunction, GetCommModemStatus, GetCommState, GetCommTimeouts, PurgeComm, SetCommState,
    SetCommTimeouts,
};
use winapi::um::winbase::{
    CLRDTR, CLRRTS, COMMTIMEOUTS, DCB, MS_CTS_ON, MS_DSR_ON, MS_RING_ON, MS_RLSD_ON, PURGE_RXABORT,
    PURGE_RXCLEAR, PURGE_TXABORT, PURGE_TXCLEAR, RTS_CONTROL_HANDSHAKE, SETDTR, SETRTS,
};
use winapi::um::winnt::HANDLE;

/// Opens `\\.\COMn` devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl DeviceBackend for NativeBackend {
    type Device = WindowsDevice;

    fn open(&self, name: &str) -> io::Result<WindowsDevice> {
        let file = OpenOptions::new().read(true).write(true).share_mode(0).open(name)?;
        Ok(WindowsDevice { file })
    }

    fn is_busy_error(&self, error: &io::Error) -> bool {
        matches!(
            error.raw_os_error().map(|code| code as DWORD),
            Some(ERROR_ACCESS_DENIED) | Some(ERROR_SHARING_VIOLATION)
        )
    }
}

/// An open COM port.
#[derive(Debug)]
pub struct WindowsDevice {
    file: File,
}

fn check(ret: BOOL) -> io::Result<()> {
    if ret == 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

impl WindowsDevice {
    fn handle(&self) -> HANDLE {
        self.file.as_raw_handle() as HANDLE
    }

    fn escape(&self, function: DWORD) -> io::Result<()> {
        // SAFETY: the handle is owned by `self.file`.
        check(unsafe { EscapeCommFunction(self.handle(), function) })
    }

    fn purge(&self, flags: DWORD) -> io::Result<()> {
        // SAFETY: the handle is owned by `self.file`.
        check(unsafe { PurgeComm(self.handle(), flags) })
    }
}

impl SerialDevice for WindowsDevice {
    type Settings = CommState;

    fn try_lock(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn unlock(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn read_settings(&mut self) -> io::Result<CommState> {
        // SAFETY: DCB and COMMTIMEOUTS are plain C structs for which all-zero is valid.
        let mut dcb: DCB = unsafe { std::mem::zeroed() };
        let mut timeouts: COMMTIMEOUTS = unsafe { std::mem::zeroed() };
        dcb.DCBlength = std::mem::size_of::<DCB>() as DWORD;

        // SAFETY: both structures are valid and writable.
        unsafe {
            check(GetCommState(self.handle(), &mut dcb))?;
            check(GetCommTimeouts(self.handle(), &mut timeouts))?;
        }
        Ok(CommState::from_raw(dcb, timeouts))
    }

    fn apply_settings(&mut self, settings: &CommState) -> io::Result<()> {
        let mut dcb = *settings.dcb();
        let mut timeouts = *settings.timeouts();

        // SAFETY: the structures are local copies owned by this frame.
        unsafe {
            check(SetCommState(self.handle(), &mut dcb))?;
            check(SetCommTimeouts(self.handle(), &mut timeouts))
        }
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.file.read(buffer)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.file.write(data)
    }

    fn modem_status(&mut self) -> io::Result<ModemStatus> {
        let mut status: DWORD = 0;
        // SAFETY: GetCommModemStatus writes a single DWORD.
        check(unsafe { GetCommModemStatus(self.handle(), &mut status) })?;
        Ok(ModemStatus {
            dcd: status & MS_RLSD_ON != 0,
            ring: status & MS_RING_ON != 0,
            cts: status & MS_CTS_ON != 0,
            dsr: status & MS_DSR_ON != 0,
        })
    }

    fn set_dtr(&mut self, asserted: bool) -> io::Result<()> {
        self.escape(if asserted { SETDTR } else { CLRDTR })
    }

    fn set_rts(&mut self, asserted: bool) -> io::Result<()> {
        // The driver owns RTS under handshake and rejects EscapeCommFunction on it.
        if self.read_settings()?.dcb().fRtsControl() == RTS_CONTROL_HANDSHAKE {
            return Ok(());
        }
        self.escape(if asserted { SETRTS } else { CLRRTS })
    }

    fn flush(&mut self, direction: FlushDirection) -> io::Result<()> {
        match direction {
            FlushDirection::Rx => self.purge(PURGE_RXCLEAR | PURGE_RXABORT),
            FlushDirection::Tx => self.purge(PURGE_TXCLEAR | PURGE_TXABORT),
            FlushDirection::Both => {
                self.purge(PURGE_RXCLEAR | PURGE_RXABORT)?;
                self.purge(PURGE_TXCLEAR | PURGE_TXABORT)
            }
        }
    }
}

//! Win32 DCB translation.
//!
//! The device control block is built from a `mode.com` style string with
//! `BuildCommDCBA`, then the CTS/RTS handshake fields are overridden when
//! hardware flow control is requested. Timeouts make `ReadFile` return
//! immediately with whatever is buffered.

use super::{NativeSettings, Parity, PortSettings, StopBits};
use crate::error::SettingsError;
use std::ffi::CString;
use std::fmt;
use std::io;
use winapi::shared::minwindef::{DWORD, TRUE};
use winapi::um::winbase::{BuildCommDCBA, COMMTIMEOUTS, DCB, RTS_CONTROL_HANDSHAKE};
use winapi::um::winnt::MAXDWORD;

/// Baud rates accepted on this platform.
pub const SUPPORTED_BAUD_RATES: &[u32] = &[
    110, 300, 600, 1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200, 128000, 256000, 500000,
    921600, 1000000, 1500000, 2000000, 3000000,
];

/// Map a baud rate to the `baud=` field of a mode string.
pub fn baud_to_native(rate: u32) -> Result<String, SettingsError> {
    if SUPPORTED_BAUD_RATES.contains(&rate) {
        Ok(format!("baud={}", rate))
    } else {
        Err(SettingsError::UnsupportedBaudRate(rate))
    }
}

/// Build the `BuildCommDCBA` mode string for the given settings.
pub fn mode_string(settings: &PortSettings) -> Result<String, SettingsError> {
    let parity = match settings.format.parity {
        Parity::None => 'n',
        Parity::Even => 'e',
        Parity::Odd => 'o',
    };
    let stop = match settings.format.stop_bits {
        StopBits::One => 1,
        StopBits::Two => 2,
    };
    let rts = if settings.flow_control { "off" } else { "on" };

    Ok(format!(
        "{} data={} parity={} stop={} xon=off to=off odsr=off dtr=on rts={}",
        baud_to_native(settings.baud_rate.get())?,
        settings.format.data_bits.bits(),
        parity,
        stop,
        rts,
    ))
}

/// Non-blocking timeouts: reads return at once, writes never time out.
pub fn non_blocking_timeouts() -> COMMTIMEOUTS {
    COMMTIMEOUTS {
        ReadIntervalTimeout: MAXDWORD,
        ReadTotalTimeoutMultiplier: 0,
        ReadTotalTimeoutConstant: 0,
        WriteTotalTimeoutMultiplier: 0,
        WriteTotalTimeoutConstant: 0,
    }
}

/// A DCB together with the port timeouts.
#[derive(Clone, Copy)]
pub struct CommState {
    pub(crate) dcb: DCB,
    pub(crate) timeouts: COMMTIMEOUTS,
}

impl CommState {
    pub fn from_raw(dcb: DCB, timeouts: COMMTIMEOUTS) -> Self {
        Self { dcb, timeouts }
    }

    pub fn dcb(&self) -> &DCB {
        &self.dcb
    }

    pub fn timeouts(&self) -> &COMMTIMEOUTS {
        &self.timeouts
    }
}

impl NativeSettings for CommState {
    fn compose(settings: &PortSettings) -> io::Result<Self> {
        let mode = mode_string(settings).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let mode = CString::new(mode).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        // SAFETY: DCB is a plain C struct for which all-zero is a valid value.
        let mut dcb: DCB = unsafe { std::mem::zeroed() };
        dcb.DCBlength = std::mem::size_of::<DCB>() as DWORD;

        // SAFETY: `mode` is NUL terminated and `dcb` is a valid, writable DCB.
        if unsafe { BuildCommDCBA(mode.as_ptr(), &mut dcb) } == 0 {
            return Err(io::Error::last_os_error());
        }

        if settings.flow_control {
            dcb.set_fOutxCtsFlow(TRUE as DWORD);
            dcb.set_fRtsControl(RTS_CONTROL_HANDSHAKE);
        }

        Ok(Self {
            dcb,
            timeouts: non_blocking_timeouts(),
        })
    }
}

impl fmt::Debug for CommState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommState")
            .field("baud_rate", &self.dcb.BaudRate)
            .field("byte_size", &self.dcb.ByteSize)
            .field("parity", &self.dcb.Parity)
            .field("stop_bits", &self.dcb.StopBits)
            .field("cts_flow", &self.dcb.fOutxCtsFlow())
            .field("rts_control", &self.dcb.fRtsControl())
            .field("read_interval_timeout", &self.timeouts.ReadIntervalTimeout)
            .finish()
    }
}

//! POSIX termios translation.
//!
//! See termios(3): the port is put in raw mode with `VMIN = 0` and
//! `VTIME = 0`, so a read returns immediately with whatever is buffered.

use super::{DataBits, NativeSettings, Parity, PortSettings, StopBits};
use crate::error::SettingsError;
use std::fmt;
use std::io;

/// Baud rates accepted on this platform.
#[cfg(target_os = "linux")]
pub const SUPPORTED_BAUD_RATES: &[u32] = &[
    50, 75, 110, 134, 150, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19200, 38400, 57600, 115200,
    230400, 460800, 500000, 576000, 921600, 1000000, 1152000, 1500000, 2000000, 2500000, 3000000,
    3500000, 4000000,
];

/// Baud rates accepted on this platform.
#[cfg(not(target_os = "linux"))]
pub const SUPPORTED_BAUD_RATES: &[u32] = &[
    50, 75, 110, 134, 150, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19200, 38400, 57600, 115200,
    230400,
];

/// Map a baud rate to its termios speed constant.
pub fn baud_to_native(rate: u32) -> Result<libc::speed_t, SettingsError> {
    let speed = match rate {
        50 => libc::B50,
        75 => libc::B75,
        110 => libc::B110,
        134 => libc::B134,
        150 => libc::B150,
        200 => libc::B200,
        300 => libc::B300,
        600 => libc::B600,
        1200 => libc::B1200,
        1800 => libc::B1800,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        #[cfg(target_os = "linux")]
        460800 => libc::B460800,
        #[cfg(target_os = "linux")]
        500000 => libc::B500000,
        #[cfg(target_os = "linux")]
        576000 => libc::B576000,
        #[cfg(target_os = "linux")]
        921600 => libc::B921600,
        #[cfg(target_os = "linux")]
        1000000 => libc::B1000000,
        #[cfg(target_os = "linux")]
        1152000 => libc::B1152000,
        #[cfg(target_os = "linux")]
        1500000 => libc::B1500000,
        #[cfg(target_os = "linux")]
        2000000 => libc::B2000000,
        #[cfg(target_os = "linux")]
        2500000 => libc::B2500000,
        #[cfg(target_os = "linux")]
        3000000 => libc::B3000000,
        #[cfg(target_os = "linux")]
        3500000 => libc::B3500000,
        #[cfg(target_os = "linux")]
        4000000 => libc::B4000000,
        other => return Err(SettingsError::UnsupportedBaudRate(other)),
    };
    Ok(speed)
}

/// Control-mode bits for the character size.
pub fn data_bits_flags(bits: DataBits) -> libc::tcflag_t {
    match bits {
        DataBits::Five => libc::CS5,
        DataBits::Six => libc::CS6,
        DataBits::Seven => libc::CS7,
        DataBits::Eight => libc::CS8,
    }
}

/// Control-mode and input-mode bits for the parity setting.
///
/// No parity ignores parity errors on input; even and odd parity enable
/// input parity checking.
pub fn parity_flags(parity: Parity) -> (libc::tcflag_t, libc::tcflag_t) {
    match parity {
        Parity::None => (0, libc::IGNPAR),
        Parity::Even => (libc::PARENB, libc::INPCK),
        Parity::Odd => (libc::PARENB | libc::PARODD, libc::INPCK),
    }
}

/// Control-mode bits for the stop bits.
pub fn stop_bits_flags(bits: StopBits) -> libc::tcflag_t {
    match bits {
        StopBits::One => 0,
        StopBits::Two => libc::CSTOPB,
    }
}

/// A `termios` structure.
#[derive(Clone, Copy)]
pub struct Termios(pub(crate) libc::termios);

impl Termios {
    /// Wrap a raw `termios` value.
    pub fn from_raw(raw: libc::termios) -> Self {
        Self(raw)
    }

    /// The raw `termios` value.
    pub fn as_raw(&self) -> &libc::termios {
        &self.0
    }

    pub fn control_flags(&self) -> libc::tcflag_t {
        self.0.c_cflag
    }

    pub fn input_flags(&self) -> libc::tcflag_t {
        self.0.c_iflag
    }

    pub fn output_flags(&self) -> libc::tcflag_t {
        self.0.c_oflag
    }

    pub fn local_flags(&self) -> libc::tcflag_t {
        self.0.c_lflag
    }

    pub fn min_chars(&self) -> libc::cc_t {
        self.0.c_cc[libc::VMIN]
    }

    pub fn read_timeout(&self) -> libc::cc_t {
        self.0.c_cc[libc::VTIME]
    }

    pub fn input_speed(&self) -> libc::speed_t {
        // SAFETY: cfgetispeed only reads from the structure.
        unsafe { libc::cfgetispeed(&self.0) }
    }

    pub fn output_speed(&self) -> libc::speed_t {
        // SAFETY: cfgetospeed only reads from the structure.
        unsafe { libc::cfgetospeed(&self.0) }
    }
}

impl NativeSettings for Termios {
    fn compose(settings: &PortSettings) -> io::Result<Self> {
        let speed = baud_to_native(settings.baud_rate.get())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let (cpar, ipar) = parity_flags(settings.format.parity);

        // SAFETY: termios is a plain C struct for which all-zero is a valid value.
        let mut raw: libc::termios = unsafe { std::mem::zeroed() };
        raw.c_cflag = data_bits_flags(settings.format.data_bits)
            | cpar
            | stop_bits_flags(settings.format.stop_bits)
            | libc::CLOCAL
            | libc::CREAD;
        if settings.flow_control {
            raw.c_cflag |= libc::CRTSCTS;
        }
        raw.c_iflag = ipar;
        raw.c_oflag = 0;
        raw.c_lflag = 0;
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 0;

        // SAFETY: `raw` is a valid termios structure owned by this frame.
        unsafe {
            if libc::cfsetispeed(&mut raw, speed) != 0 {
                return Err(io::Error::last_os_error());
            }
            if libc::cfsetospeed(&mut raw, speed) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(Self(raw))
    }
}

impl fmt::Debug for Termios {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Termios")
            .field("c_iflag", &format_args!("{:#x}", self.0.c_iflag))
            .field("c_oflag", &format_args!("{:#x}", self.0.c_oflag))
            .field("c_cflag", &format_args!("{:#x}", self.0.c_cflag))
            .field("c_lflag", &format_args!("{:#x}", self.0.c_lflag))
            .field("speed", &self.output_speed())
            .finish()
    }
}

//! termios/ioctl backend for Unix-like systems.
//!
//! See tty_ioctl(4) for the modem control requests and flock(2) for the
//! advisory lock.

use super::{DeviceBackend, FlushDirection, ModemStatus, SerialDevice};
use crate::settings::termios::Termios;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};

/// Opens `/dev/tty*` style device nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl DeviceBackend for NativeBackend {
    type Device = UnixDevice;

    fn open(&self, name: &str) -> io::Result<UnixDevice> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(name)?;
        Ok(UnixDevice { file })
    }
}

/// An open tty device node.
#[derive(Debug)]
pub struct UnixDevice {
    file: File,
}

fn check(ret: libc::c_int) -> io::Result<()> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

impl UnixDevice {
    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    fn modem_bits(&self) -> io::Result<libc::c_int> {
        let mut status: libc::c_int = 0;
        // SAFETY: TIOCMGET writes a single c_int through the pointer.
        check(unsafe { libc::ioctl(self.fd(), libc::TIOCMGET, &mut status as *mut libc::c_int) })?;
        Ok(status)
    }

    fn update_modem_bits(&mut self, set: libc::c_int, clear: libc::c_int) -> io::Result<()> {
        let status = (self.modem_bits()? | set) & !clear;
        // SAFETY: TIOCMSET reads a single c_int through the pointer.
        check(unsafe { libc::ioctl(self.fd(), libc::TIOCMSET, &status as *const libc::c_int) })
    }
}

fn line_bit(asserted: bool, bit: libc::c_int) -> (libc::c_int, libc::c_int) {
    if asserted {
        (bit, 0)
    } else {
        (0, bit)
    }
}

impl SerialDevice for UnixDevice {
    type Settings = Termios;

    fn try_lock(&mut self) -> io::Result<()> {
        // SAFETY: flock on a file descriptor owned by `self.file`.
        check(unsafe { libc::flock(self.fd(), libc::LOCK_EX | libc::LOCK_NB) })
    }

    fn unlock(&mut self) -> io::Result<()> {
        // SAFETY: flock on a file descriptor owned by `self.file`.
        check(unsafe { libc::flock(self.fd(), libc::LOCK_UN) })
    }

    fn read_settings(&mut self) -> io::Result<Termios> {
        // SAFETY: termios is a plain C struct for which all-zero is a valid value.
        let mut raw: libc::termios = unsafe { std::mem::zeroed() };
        // SAFETY: tcgetattr fills in `raw`.
        check(unsafe { libc::tcgetattr(self.fd(), &mut raw) })?;
        Ok(Termios::from_raw(raw))
    }

    fn apply_settings(&mut self, settings: &Termios) -> io::Result<()> {
        // SAFETY: tcsetattr only reads from the termios structure.
        check(unsafe { libc::tcsetattr(self.fd(), libc::TCSANOW, settings.as_raw()) })
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.file.read(buffer)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.file.write(data)
    }

    fn modem_status(&mut self) -> io::Result<ModemStatus> {
        let status = self.modem_bits()?;
        Ok(ModemStatus {
            dcd: status & libc::TIOCM_CAR != 0,
            ring: status & libc::TIOCM_RNG != 0,
            cts: status & libc::TIOCM_CTS != 0,
            dsr: status & libc::TIOCM_DSR != 0,
        })
    }

    fn set_dtr(&mut self, asserted: bool) -> io::Result<()> {
        let (set, clear) = line_bit(asserted, libc::TIOCM_DTR);
        self.update_modem_bits(set, clear)
    }

    fn set_rts(&mut self, asserted: bool) -> io::Result<()> {
        let (set, clear) = line_bit(asserted, libc::TIOCM_RTS);
        self.update_modem_bits(set, clear)
    }

    fn set_control_lines(&mut self, dtr: bool, rts: bool) -> io::Result<()> {
        let (dtr_set, dtr_clear) = line_bit(dtr, libc::TIOCM_DTR);
        let (rts_set, rts_clear) = line_bit(rts, libc::TIOCM_RTS);
        self.update_modem_bits(dtr_set | rts_set, dtr_clear | rts_clear)
    }

    fn flush(&mut self, direction: FlushDirection) -> io::Result<()> {
        let queue = match direction {
            FlushDirection::Rx => libc::TCIFLUSH,
            FlushDirection::Tx => libc::TCOFLUSH,
            FlushDirection::Both => libc::TCIOFLUSH,
        };
        // SAFETY: tcflush on a file descriptor owned by `self.file`.
        check(unsafe { libc::tcflush(self.fd(), queue) })
    }
}

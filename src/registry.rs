//! Static table of serial device names indexed by port number.

use crate::error::InvalidIndex;

/// Device nodes known on this platform, indexed by port number.
#[cfg(unix)]
pub const DEVICE_NAMES: &[&str] = &[
    "/dev/ttyS0", "/dev/ttyS1", "/dev/ttyS2", "/dev/ttyS3", "/dev/ttyS4", "/dev/ttyS5",
    "/dev/ttyS6", "/dev/ttyS7", "/dev/ttyS8", "/dev/ttyS9", "/dev/ttyS10", "/dev/ttyS11",
    "/dev/ttyS12", "/dev/ttyS13", "/dev/ttyS14", "/dev/ttyS15", "/dev/ttyUSB0", "/dev/ttyUSB1",
    "/dev/ttyUSB2", "/dev/ttyUSB3", "/dev/ttyUSB4", "/dev/ttyUSB5", "/dev/ttyAMA0", "/dev/ttyAMA1",
    "/dev/ttyACM0", "/dev/ttyACM1", "/dev/rfcomm0", "/dev/rfcomm1", "/dev/ircomm0", "/dev/ircomm1",
    "/dev/cuau0", "/dev/cuau1", "/dev/cuau2", "/dev/cuau3", "/dev/cuaU0", "/dev/cuaU1",
    "/dev/cuaU2", "/dev/cuaU3",
];

/// Device nodes known on this platform, indexed by port number.
#[cfg(windows)]
pub const DEVICE_NAMES: &[&str] = &[
    r"\\.\COM1", r"\\.\COM2", r"\\.\COM3", r"\\.\COM4", r"\\.\COM5", r"\\.\COM6", r"\\.\COM7",
    r"\\.\COM8", r"\\.\COM9", r"\\.\COM10", r"\\.\COM11", r"\\.\COM12", r"\\.\COM13",
    r"\\.\COM14", r"\\.\COM15", r"\\.\COM16", r"\\.\COM17", r"\\.\COM18", r"\\.\COM19",
    r"\\.\COM20", r"\\.\COM21", r"\\.\COM22", r"\\.\COM23", r"\\.\COM24", r"\\.\COM25",
    r"\\.\COM26", r"\\.\COM27", r"\\.\COM28", r"\\.\COM29", r"\\.\COM30", r"\\.\COM31",
    r"\\.\COM32",
];

/// Prefix that turns a bare device label into a device path.
#[cfg(unix)]
pub const DEVICE_PREFIX: &str = "/dev/";

/// Prefix that turns a bare device label into a device path.
#[cfg(windows)]
pub const DEVICE_PREFIX: &str = r"\\.\";

/// Number of ports in the platform device table.
pub const MAX_PORTS: usize = DEVICE_NAMES.len();

/// A fixed table mapping port indices to device names.
#[derive(Debug, Clone, Copy)]
pub struct DeviceTable {
    names: &'static [&'static str],
}

impl DeviceTable {
    /// The platform's device table.
    pub const fn platform() -> Self {
        Self { names: DEVICE_NAMES }
    }

    /// A custom device table.
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The device name of a port index.
    pub fn resolve(&self, index: usize) -> Result<&'static str, InvalidIndex> {
        self.names.get(index).copied().ok_or(InvalidIndex(index))
    }

    /// Find the first index whose device name is exactly `name`.
    pub fn lookup_by_name(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|&entry| entry == name)
    }

    /// Find a port by device path or by bare label.
    ///
    /// `"ttyUSB0"` and `"/dev/ttyUSB0"` both find `/dev/ttyUSB0` on unix;
    /// `"COM3"` and `"\\.\COM3"` both find `\\.\COM3` on windows.
    pub fn find_port_index(&self, name: &str) -> Option<usize> {
        self.lookup_by_name(name).or_else(|| {
            if name.starts_with(DEVICE_PREFIX) {
                None
            } else {
                self.lookup_by_name(&format!("{}{}", DEVICE_PREFIX, name))
            }
        })
    }

    /// Iterate over `(index, device name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'static str)> + '_ {
        self.names.iter().copied().enumerate()
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::platform()
    }
}

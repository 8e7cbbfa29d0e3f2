//! Line configuration and its translation to native settings.
//!
//! A [`PortSettings`] value is the validated, platform-independent form of
//! `(baud rate, "8N1"-style mode, flow control)`. The platform backend turns
//! it into its own control block through [`NativeSettings::compose`].

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(unix)]
pub mod termios;

#[cfg(windows)]
pub mod dcb;

#[cfg(unix)]
pub use termios::{baud_to_native, Termios as PlatformSettings, SUPPORTED_BAUD_RATES};

#[cfg(windows)]
pub use dcb::{baud_to_native, CommState as PlatformSettings, SUPPORTED_BAUD_RATES};

/// A platform control block that can be derived from [`PortSettings`].
///
/// Values are only ever captured, applied and restored; they are never
/// compared by the library.
pub trait NativeSettings: Clone + fmt::Debug + Send + Sized {
    /// Build the native representation of the given line settings.
    fn compose(settings: &PortSettings) -> std::io::Result<Self>;
}

/// A baud rate from the platform's table of supported rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BaudRate(u32);

impl BaudRate {
    /// Validate a baud rate against [`SUPPORTED_BAUD_RATES`].
    pub fn new(rate: u32) -> Result<Self, SettingsError> {
        if SUPPORTED_BAUD_RATES.contains(&rate) {
            Ok(Self(rate))
        } else {
            Err(SettingsError::UnsupportedBaudRate(rate))
        }
    }

    /// The rate in bits per second.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = SettingsError;

    fn try_from(rate: u32) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<BaudRate> for u32 {
    fn from(rate: BaudRate) -> Self {
        rate.0
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl DataBits {
    fn from_mode_char(c: char) -> Result<Self, SettingsError> {
        match c {
            '5' => Ok(Self::Five),
            '6' => Ok(Self::Six),
            '7' => Ok(Self::Seven),
            '8' => Ok(Self::Eight),
            other => Err(SettingsError::InvalidDataBits(other)),
        }
    }

    /// The number of bits as an integer.
    pub fn bits(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    fn from_mode_char(c: char) -> Result<Self, SettingsError> {
        match c {
            'N' | 'n' => Ok(Self::None),
            'E' | 'e' => Ok(Self::Even),
            'O' | 'o' => Ok(Self::Odd),
            other => Err(SettingsError::InvalidParity(other)),
        }
    }

    fn mode_char(self) -> char {
        match self {
            Self::None => 'N',
            Self::Even => 'E',
            Self::Odd => 'O',
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    fn from_mode_char(c: char) -> Result<Self, SettingsError> {
        match c {
            '1' => Ok(Self::One),
            '2' => Ok(Self::Two),
            other => Err(SettingsError::InvalidStopBits(other)),
        }
    }

    /// The number of stop bits as an integer.
    pub fn bits(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// Character framing: data bits, parity and stop bits.
///
/// Parsed from the compact mode string, e.g. `"8N1"` or `"7e2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineFormat {
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl LineFormat {
    /// Parse a mode string of the form `[5-8][NnEeOo][12]`.
    pub fn parse(mode: &str) -> Result<Self, SettingsError> {
        let chars: Vec<char> = mode.chars().collect();
        let &[data, parity, stop] = chars.as_slice() else {
            return Err(SettingsError::InvalidModeLength(chars.len()));
        };

        Ok(Self {
            data_bits: DataBits::from_mode_char(data)?,
            parity: Parity::from_mode_char(parity)?,
            stop_bits: StopBits::from_mode_char(stop)?,
        })
    }
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl FromStr for LineFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.data_bits.bits(),
            self.parity.mode_char(),
            self.stop_bits.bits()
        )
    }
}

/// Complete, validated configuration of a serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortSettings {
    pub baud_rate: BaudRate,
    pub format: LineFormat,
    /// Hardware (RTS/CTS) flow control.
    pub flow_control: bool,
}

impl PortSettings {
    /// Validate the external form of a port configuration.
    ///
    /// The baud rate is checked first, then the mode string.
    pub fn parse(baud_rate: u32, mode: &str, flow_control: bool) -> Result<Self, SettingsError> {
        Ok(Self {
            baud_rate: BaudRate::new(baud_rate)?,
            format: LineFormat::parse(mode)?,
            flow_control,
        })
    }
}

impl fmt::Display for PortSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.baud_rate, self.format)?;
        if self.flow_control {
            write!(f, " rts/cts")?;
        }
        Ok(())
    }
}

//! Types shared across device ports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Colors an RGB status indicator can show.
///
/// Each color is a combination of the three on/off channels of a common
/// RGB LED; there is no intensity control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalColor {
    Off,
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    White,
}

impl SignalColor {
    /// Red, green and blue channel states.
    ///
    /// # Examples
    ///
    /// ```
    /// use portaria_hardware::SignalColor;
    ///
    /// assert_eq!(SignalColor::Yellow.as_rgb(), [true, true, false]);
    /// assert_eq!(SignalColor::Off.as_rgb(), [false, false, false]);
    /// ```
    pub fn as_rgb(self) -> [bool; 3] {
        match self {
            Self::Off => [false, false, false],
            Self::Red => [true, false, false],
            Self::Green => [false, true, false],
            Self::Blue => [false, false, true],
            Self::Yellow => [true, true, false],
            Self::Cyan => [false, true, true],
            Self::Magenta => [true, false, true],
            Self::White => [true, true, true],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Cyan => "cyan",
            Self::Magenta => "magenta",
            Self::White => "white",
        }
    }
}

impl fmt::Display for SignalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

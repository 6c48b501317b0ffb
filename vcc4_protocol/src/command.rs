//! # Command vocabulary
//!
//! The camera accepts many more commands than are listed here (gain,
//! backlight, manual focus position, slew and angle limit queries, ...). Only
//! the commands the driver actually issues are implemented.

/// Request frame header.
pub const HEADER: u8 = 0xff;

/// Response frame header.
pub const RESPONSE: u8 = 0xfe;

/// Frame footer, for both requests and responses.
pub const FOOTER: u8 = 0xef;

/// Delimiter between the device ID and the command (or error) byte.
pub const DELIM: u8 = 0x00;

/// Factory default device ID.
pub const DEFAULT_DEVICE_ID: u8 = 0x30;

/// Generic "off" / "no" / "first option" parameter byte.
pub(crate) const PARAM_OFF: u8 = 0x30;

/// Generic "on" / "yes" / "second option" parameter byte.
pub(crate) const PARAM_ON: u8 = 0x31;

/// Command byte, sent after the delimiter in every request frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum Command {
    /// Sets the pan slew rate.
    PanSlew = 0x50,
    /// Sets the tilt slew rate.
    TiltSlew = 0x51,
    /// Stops current pan/tilt motion.
    Stop = 0x53,
    /// Initialises the pan/tilt head, returning it to home.
    Init = 0x58,
    /// Absolute pan/tilt move.
    PanTilt = 0x62,
    /// Requests the current pan/tilt position.
    PanTiltRequest = 0x63,
    /// Pan/tilt minimum/maximum range assignment.
    SetRange = 0x64,
    /// Controls the infrared lighting LEDs (VC-C50i).
    Infrared = 0x76,
    /// Requests the product name.
    ProductName = 0x87,
    /// Controls the status LED on the front of the camera.
    LedControl = 0x8e,
    /// Puts the camera into host control mode.
    Control = 0x90,
    /// Turns the camera on or off.
    Power = 0xa0,
    /// Controls auto-focusing functions.
    AutoFocus = 0xa1,
    /// Stops zoom motion.
    ZoomStop = 0xa2,
    /// Zooms the lens to an absolute position.
    Zoom = 0xb3,
    /// Requests the current or maximum zoom position.
    ZoomRequest = 0xb4,
    /// Controls the infrared cut-off filter (VC-C50i).
    IrCutFilter = 0xb5,
    /// Controls the digital zoom multiplier (VC-C50i).
    DigitalZoom = 0xb7,
}

/// Mode of the status LED on the front of the camera.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[repr(u8)]
pub enum LedMode {
    /// The camera controls the LED itself.
    #[default]
    Auto = 0,
    Green = 1,
    Off = 2,
    Red = 3,
    Orange = 4,
}

/// Focus mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[repr(u8)]
pub enum FocusMode {
    #[default]
    Auto = 0,
    Manual = 1,
    /// Auto-focus on a near object.
    Near = 2,
    /// Auto-focus on a far object.
    Far = 3,
}

/// Digital zoom multiplier (VC-C50i only).
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, ToPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[repr(u8)]
pub enum DigitalZoom {
    #[default]
    X1 = 0,
    X2 = 1,
    X4 = 2,
    X8 = 3,
}

impl DigitalZoom {
    /// The magnification factor.
    pub const fn factor(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// Axis selector for [`Command::SetRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeAxis {
    Pan,
    Tilt,
}

/// Selector for [`Command::ZoomRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomQuery {
    /// The current zoom position.
    Position,
    /// The maximum zoom position.
    Limit,
}

/// Encodes a small enumerated parameter as its ASCII digit (`0x30 + n`).
#[inline]
pub(crate) fn digit_param(n: u8) -> u8 {
    PARAM_OFF + n
}

/// Encodes a boolean parameter.
#[inline]
pub(crate) fn bool_param(v: bool) -> u8 {
    if v {
        PARAM_ON
    } else {
        PARAM_OFF
    }
}

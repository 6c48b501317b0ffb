//! # Request frames
use crate::{
    command::{
        bool_param, digit_param, Command, DigitalZoom, FocusMode, LedMode, RangeAxis, ZoomQuery,
        DELIM, FOOTER, HEADER, PARAM_OFF, PARAM_ON,
    },
    units::angle_to_field,
    util::encode_hex_field,
    Error, Result,
};

/// Builds a single request frame.
///
/// There are only four ways to put data into a frame:
/// [`byte()`][Self::byte], [`ubyte()`][Self::ubyte], [`byte4()`][Self::byte4]
/// and [`finalize()`][Self::finalize]. The camera won't understand anything
/// else.
///
/// Errors (overflowing [`CAPACITY`][Self::CAPACITY], or a value which can't be
/// represented) are latched, and reported by [`finalize()`][Self::finalize].
///
/// ## Frame format
///
/// * `u8`: [`HEADER`]
/// * `u8`: device ID
/// * `u8`: [`DELIM`]
/// * `u8`: [`Command`]
/// * command-specific parameters
/// * `u8`: [`FOOTER`]
#[derive(Debug)]
pub struct CommandPacket {
    buf: Vec<u8>,
    error: Option<Error>,
}

impl CommandPacket {
    /// Maximum length of a frame, including the header and footer.
    pub const CAPACITY: usize = 30;

    /// Starts a new frame for `command`, addressed to `device_id`.
    pub fn new(device_id: u8, command: Command) -> Self {
        let mut buf = Vec::with_capacity(Self::CAPACITY);
        buf.extend_from_slice(&[HEADER, device_id, DELIM, command as u8]);
        Self { buf, error: None }
    }

    fn push(&mut self, b: &[u8]) {
        if self.error.is_some() {
            return;
        }

        // Always leave room for the footer.
        if self.buf.len() + b.len() >= Self::CAPACITY {
            self.error = Some(Error::InvalidLength);
            return;
        }

        self.buf.extend_from_slice(b);
    }

    /// Appends a signed byte.
    pub fn byte(mut self, v: i8) -> Self {
        self.push(&v.to_be_bytes());
        self
    }

    /// Appends an unsigned byte.
    pub fn ubyte(mut self, v: u8) -> Self {
        self.push(&[v]);
        self
    }

    /// Appends a 4-byte value as four individual bytes: one upper-case ASCII
    /// hexadecimal digit per byte, most significant first.
    ///
    /// Only `0..=0xffff` can be represented; anything else invalidates the
    /// frame.
    pub fn byte4(mut self, v: i32) -> Self {
        match u16::try_from(v) {
            Ok(v) => self.push(&encode_hex_field(v)),
            Err(_) => {
                if self.error.is_none() {
                    self.error = Some(Error::ParameterOutOfRange);
                }
            }
        }
        self
    }

    /// Appends the footer, returning the finished frame.
    ///
    /// On error, the frame must not be sent.
    pub fn finalize(mut self) -> Result<Vec<u8>> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        self.buf.push(FOOTER);
        Ok(self.buf)
    }
}

/// A typed request to the camera.
///
/// Angles and rates here are already in protocol units; use
/// [`units`][crate::units] to convert from degrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `CONTROL`: enter host control mode.
    ControlMode,
    /// `INIT`: initialise the pan/tilt head.
    Init,
    /// `POWER`: turn the camera on or off.
    Power(bool),
    /// `PANTILT`: absolute move.
    PanTilt { pan: i32, tilt: i32 },
    /// `PANSLEW`: pan slew rate, in units per second.
    PanSlew(i32),
    /// `TILTSLEW`: tilt slew rate, in units per second.
    TiltSlew(i32),
    /// `SETRANGE`: restrict the travel of one axis.
    SetRange { axis: RangeAxis, min: i32, max: i32 },
    /// `STOP`: halt pan/tilt motion.
    StopPanTilt,
    /// `ZOOMSTOP`: halt zoom motion.
    StopZoom,
    /// `ZOOM`: absolute optical zoom position.
    Zoom(u16),
    /// `DIGITALZOOM`: digital zoom multiplier.
    DigitalZoom(DigitalZoom),
    /// `AUTOFOCUS`: focus mode.
    Focus(FocusMode),
    /// `PANTILTREQ`: request the current pan/tilt position.
    PanTiltRequest,
    /// `ZOOMREQ`: request a zoom position.
    ZoomRequest(ZoomQuery),
    /// `PRODUCTNAME`: request the product name.
    ProductNameRequest,
    /// `LEDCONTROL`: status LED mode.
    LedControl(LedMode),
    /// `IRCUTFILTER`: enable or disable the IR cut-off filter.
    IrCutFilter(bool),
    /// `INFRARED`: turn the IR LEDs on or off.
    InfraredLeds(bool),
}

impl Request {
    /// The command byte for this request.
    pub const fn command(&self) -> Command {
        match self {
            Self::ControlMode => Command::Control,
            Self::Init => Command::Init,
            Self::Power(_) => Command::Power,
            Self::PanTilt { .. } => Command::PanTilt,
            Self::PanSlew(_) => Command::PanSlew,
            Self::TiltSlew(_) => Command::TiltSlew,
            Self::SetRange { .. } => Command::SetRange,
            Self::StopPanTilt => Command::Stop,
            Self::StopZoom => Command::ZoomStop,
            Self::Zoom(_) => Command::Zoom,
            Self::DigitalZoom(_) => Command::DigitalZoom,
            Self::Focus(_) => Command::AutoFocus,
            Self::PanTiltRequest => Command::PanTiltRequest,
            Self::ZoomRequest(_) => Command::ZoomRequest,
            Self::ProductNameRequest => Command::ProductName,
            Self::LedControl(_) => Command::LedControl,
            Self::IrCutFilter(_) => Command::IrCutFilter,
            Self::InfraredLeds(_) => Command::Infrared,
        }
    }

    /// Encodes this request into a frame addressed to `device_id`.
    pub fn encode(&self, device_id: u8) -> Result<Vec<u8>> {
        let p = CommandPacket::new(device_id, self.command());
        let p = match self {
            Self::ControlMode | Self::Init | Self::StopPanTilt | Self::StopZoom => {
                p.ubyte(PARAM_OFF)
            }
            Self::PanTiltRequest | Self::ProductNameRequest => p,
            Self::Power(on) | Self::IrCutFilter(on) | Self::InfraredLeds(on) => {
                p.ubyte(bool_param(*on))
            }
            Self::PanTilt { pan, tilt } => p
                .byte4(angle_to_field(*pan)?.into())
                .byte4(angle_to_field(*tilt)?.into()),
            Self::PanSlew(rate) | Self::TiltSlew(rate) => p.byte4(*rate),
            Self::SetRange { axis, min, max } => p
                .ubyte(match axis {
                    RangeAxis::Pan => PARAM_OFF,
                    RangeAxis::Tilt => PARAM_ON,
                })
                .byte4(angle_to_field(*min)?.into())
                .byte4(angle_to_field(*max)?.into()),
            Self::Zoom(zoom) => p.byte4((*zoom).into()),
            Self::DigitalZoom(z) => p.ubyte(digit_param(*z as u8)),
            Self::Focus(f) => p.ubyte(digit_param(*f as u8)),
            Self::ZoomRequest(q) => p.ubyte(match q {
                ZoomQuery::Position => PARAM_OFF,
                ZoomQuery::Limit => PARAM_ON,
            }),
            Self::LedControl(m) => p.ubyte(digit_param(*m as u8)),
        };

        let o = p.finalize()?;
        trace!(">>> {:?}: {}", self.command(), hex::encode(&o));
        Ok(o)
    }
}

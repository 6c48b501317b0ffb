//! # Response frames
//!
//! Every request frame is answered with a response frame, but only when the
//! camera's CTS line (pin 2 of the VISCA port) is wired up. The response says
//! whether the camera *will* execute the command, not when it has finished.
use crate::{
    command::{DELIM, FOOTER},
    units::{angle_to_field, field_to_angle, units_to_degrees},
    util::{decode_hex_field, encode_hex_field, str_from_ascii_field, HEX_FIELD_LENGTH},
    Error, Result,
};
use binrw::{binrw, helpers::until_eof, meta::ReadEndian, BinRead, BinWrite};
use std::io::Cursor;

/// Error code reported by the camera in every response.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    /// The command was accepted.
    #[default]
    None,
    /// The camera is busy, and will not execute the command.
    Busy,
    /// Illegal parameters.
    Param,
    /// The camera is not in host control mode.
    Mode,
    /// Unknown error condition. Any unrecognised error byte decodes as this.
    Unknown,
}

impl ErrorCode {
    #[inline]
    pub const fn is_error(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl From<u8> for ErrorCode {
    fn from(v: u8) -> Self {
        match v {
            0x30 => Self::None,
            0x31 => Self::Busy,
            0x35 => Self::Param,
            0x39 => Self::Mode,
            _ => Self::Unknown,
        }
    }
}

impl From<ErrorCode> for u8 {
    fn from(e: ErrorCode) -> Self {
        match e {
            ErrorCode::None => 0x30,
            ErrorCode::Busy => 0x31,
            ErrorCode::Param => 0x35,
            ErrorCode::Mode => 0x39,
            ErrorCode::Unknown => 0xff,
        }
    }
}

/// A response frame from the camera.
///
/// ## Frame format
///
/// * `u8`: [`RESPONSE`][crate::RESPONSE] header
/// * `u8`: device ID
/// * `u8`: [`DELIM`]
/// * `u8`: [error code](Self::error)
/// * `u8`: [status](Self::status)
/// * `u8[]`: [payload](Self::payload), depending on the request
/// * `u8`: [`FOOTER`]
///
/// The whole frame is between [`MIN_LENGTH`][Self::MIN_LENGTH] and
/// [`MAX_LENGTH`][Self::MAX_LENGTH] bytes long. The footer is handled by
/// [`parse()`][Self::parse] and [`to_bytes()`][Self::to_bytes].
#[binrw]
#[derive(Debug, Clone, PartialEq, Eq)]
#[brw(big, magic = 0xfeu8)]
pub struct Response {
    pub device_id: u8,

    #[br(temp, assert(delim == DELIM))]
    #[bw(calc = DELIM)]
    delim: u8,

    #[br(map = |b: u8| ErrorCode::from(b))]
    #[bw(map = |e: &ErrorCode| u8::from(*e))]
    pub error: ErrorCode,

    /// Secondary status byte. Not interpreted.
    pub status: u8,

    #[br(parse_with = until_eof)]
    pub payload: Vec<u8>,
}

impl Response {
    /// Shortest possible response frame, with no payload.
    pub const MIN_LENGTH: usize = 6;
    /// Longest possible response frame (a pan/tilt position report).
    pub const MAX_LENGTH: usize = 14;

    pub fn new(device_id: u8, error: ErrorCode, payload: Vec<u8>) -> Self {
        Self {
            device_id,
            error,
            status: 0,
            payload,
        }
    }

    /// Parses a complete response frame, including header and footer.
    ///
    /// ## Errors
    ///
    /// * [`Error::InvalidLength`] when the frame is shorter than
    ///   [`MIN_LENGTH`][Self::MIN_LENGTH] or longer than
    ///   [`MAX_LENGTH`][Self::MAX_LENGTH]
    /// * [`Error::MalformedFrame`] when the header, delimiter or footer is
    ///   missing
    pub fn parse(frame: &[u8]) -> Result<Self> {
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&frame.len()) {
            return Err(Error::InvalidLength);
        }

        let Some((&FOOTER, body)) = frame.split_last() else {
            return Err(Error::MalformedFrame);
        };

        let r = Self::read(&mut Cursor::new(body)).map_err(|e| {
            debug!("unparseable response {}: {e}", hex::encode(frame));
            Error::MalformedFrame
        })?;
        trace!("<<< {r:?}");
        Ok(r)
    }

    /// Serialises this response into a complete frame.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::with_capacity(Self::MAX_LENGTH));
        self.write(&mut out)?;
        let mut o = out.into_inner();
        o.push(FOOTER);

        if o.len() > Self::MAX_LENGTH {
            return Err(Error::InvalidLength);
        }
        Ok(o)
    }

    /// Decodes the payload of a [`PanTiltRequest`][crate::Request::PanTiltRequest]
    /// response.
    pub fn pan_tilt(&self) -> Result<PanTiltPosition> {
        self.decode_payload()
    }

    /// Decodes the payload of a [`ZoomRequest`][crate::Request::ZoomRequest]
    /// response.
    pub fn zoom(&self) -> Result<ZoomPosition> {
        self.decode_payload()
    }

    /// Decodes the payload of a
    /// [`ProductNameRequest`][crate::Request::ProductNameRequest] response.
    pub fn product_name(&self) -> Result<ProductName> {
        self.decode_payload()
    }

    fn decode_payload<T>(&self) -> Result<T>
    where
        T: for<'a> BinRead<Args<'a> = ()> + ReadEndian,
    {
        let mut c = Cursor::new(&self.payload);
        let v = T::read(&mut c)?;
        if c.position() != self.payload.len() as u64 {
            return Err(Error::InvalidLength);
        }
        Ok(v)
    }
}

/// Pan/tilt position report, in protocol units.
///
/// ## Payload format
///
/// * `char[4]`: pan, hexadecimal, offset by `0x8000`
/// * `char[4]`: tilt, hexadecimal, offset by `0x8000`
#[binrw]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[brw(big)]
pub struct PanTiltPosition {
    #[br(try_map = |v: [u8; HEX_FIELD_LENGTH]| decode_hex_field(&v).map(field_to_angle))]
    #[bw(try_map = |v: &i32| angle_to_field(*v).map(encode_hex_field))]
    pub pan: i32,

    #[br(try_map = |v: [u8; HEX_FIELD_LENGTH]| decode_hex_field(&v).map(field_to_angle))]
    #[bw(try_map = |v: &i32| angle_to_field(*v).map(encode_hex_field))]
    pub tilt: i32,
}

impl PanTiltPosition {
    #[inline]
    pub fn pan_degrees(&self) -> f64 {
        units_to_degrees(self.pan)
    }

    #[inline]
    pub fn tilt_degrees(&self) -> f64 {
        units_to_degrees(self.tilt)
    }
}

/// Zoom position report.
///
/// ## Payload format
///
/// * `char[4]`: zoom position, hexadecimal
#[binrw]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[brw(big)]
pub struct ZoomPosition {
    #[br(try_map = |v: [u8; HEX_FIELD_LENGTH]| decode_hex_field(&v))]
    #[bw(map = |v: &u16| encode_hex_field(*v))]
    pub position: u16,
}

/// Product name report.
///
/// Observed values are `VC-C` (VC-C4) and `C50i` (VC-C50i).
///
/// ## Payload format
///
/// * `char[4]`: product name, ASCII
#[binrw]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[brw(big)]
pub struct ProductName {
    #[br(try_map = |v: [u8; Self::LENGTH]| str_from_ascii_field(&v).map(str::to_string))]
    #[bw(
        assert(name.len() <= Self::LENGTH),
        pad_size_to = Self::LENGTH,
        map = |v: &String| v.as_bytes().to_vec()
    )]
    name: String,
}

impl ProductName {
    const LENGTH: usize = 4;

    pub fn new(name: String) -> Result<Self> {
        if name.len() > Self::LENGTH || !name.is_ascii() {
            return Err(Error::InvalidLength);
        }

        Ok(Self { name })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::DEFAULT_DEVICE_ID;

    #[test]
    fn no_payload() -> Result {
        let cmd = hex::decode("fe30003000ef")?;
        let r = Response::parse(&cmd)?;
        assert_eq!(DEFAULT_DEVICE_ID, r.device_id);
        assert_eq!(ErrorCode::None, r.error);
        assert!(!r.error.is_error());
        assert!(r.payload.is_empty());

        assert_eq!(cmd, r.to_bytes()?);
        Ok(())
    }

    #[test]
    fn error_codes() -> Result {
        for (b, e) in [
            (0x30, ErrorCode::None),
            (0x31, ErrorCode::Busy),
            (0x35, ErrorCode::Param),
            (0x39, ErrorCode::Mode),
            (0xff, ErrorCode::Unknown),
            (0x42, ErrorCode::Unknown),
        ] {
            let r = Response::parse(&[0xfe, 0x30, 0x00, b, 0x30, 0xef])?;
            assert_eq!(e, r.error);
        }
        Ok(())
    }

    #[test]
    fn length_limits() -> Result {
        assert!(matches!(
            Response::parse(&hex::decode("fe300030ef")?),
            Err(Error::InvalidLength)
        ));
        assert!(matches!(Response::parse(&[]), Err(Error::InvalidLength)));

        // 15 bytes
        let long = hex::decode("fe300030303830303038303030ffef")?;
        assert_eq!(15, long.len());
        assert!(matches!(Response::parse(&long), Err(Error::InvalidLength)));

        // 14 bytes is fine
        let r = Response::parse(&hex::decode("fe300030303830303038303030ef")?)?;
        assert_eq!(8, r.payload.len());
        Ok(())
    }

    #[test]
    fn missing_markers() -> Result {
        let _ = tracing_subscriber::fmt().try_init();
        // Wrong header
        assert!(matches!(
            Response::parse(&hex::decode("ff30003000ef")?),
            Err(Error::MalformedFrame)
        ));
        // Wrong footer
        assert!(matches!(
            Response::parse(&hex::decode("fe30003000ee")?),
            Err(Error::MalformedFrame)
        ));
        // Wrong delimiter
        assert!(matches!(
            Response::parse(&hex::decode("fe30013000ef")?),
            Err(Error::MalformedFrame)
        ));
        Ok(())
    }

    #[test]
    fn pan_tilt() -> Result {
        // pan = 871 units (98 deg), tilt = -266 units (-30 deg)
        let cmd = hex::decode("fe300030303833363737454636ef")?;
        let r = Response::parse(&cmd)?;
        let pos = r.pan_tilt()?;
        assert_eq!(871, pos.pan);
        assert_eq!(-266, pos.tilt);
        assert!((pos.pan_degrees() - 97.9875).abs() < 1e-9);
        assert!((pos.tilt_degrees() + 29.925).abs() < 1e-9);

        let mut payload = Cursor::new(Vec::new());
        pos.write(&mut payload)?;
        assert_eq!(b"83677EF6", &payload.into_inner()[..]);

        // Lower-case digits are accepted
        let r = Response::parse(&hex::decode("fe300030303833363737656636ef")?)?;
        assert_eq!(-266, r.pan_tilt()?.tilt);
        Ok(())
    }

    #[test]
    fn pan_tilt_bad_payload() -> Result {
        let _ = tracing_subscriber::fmt().try_init();
        // Too short
        let r = Response::parse(&hex::decode("fe3000303038333637ef")?)?;
        assert!(r.pan_tilt().is_err());

        // Not hex
        let r = Response::parse(&hex::decode("fe300030303833363737454647ef")?)?;
        assert!(r.pan_tilt().is_err());
        Ok(())
    }

    #[test]
    fn zoom() -> Result {
        let cmd = hex::decode("fe3000303030374138ef")?;
        let r = Response::parse(&cmd)?;
        assert_eq!(1960, r.zoom()?.position);

        let o = Response::new(DEFAULT_DEVICE_ID, ErrorCode::None, b"07A8".to_vec());
        assert_eq!(r.zoom()?, o.zoom()?);
        Ok(())
    }

    #[test]
    fn product_name() -> Result {
        let r = Response::parse(&hex::decode("fe3000303043353069ef")?)?;
        let name = r.product_name()?;
        assert_eq!("C50i", name.name());

        let r = Response::parse(&hex::decode("fe3000303056432d43ef")?)?;
        assert_eq!("VC-C", r.product_name()?.name());

        let expected = ProductName::new("C50i".to_string())?;
        let mut out = Cursor::new(Vec::new());
        expected.write(&mut out)?;
        assert_eq!(b"C50i", &out.into_inner()[..]);

        assert!(ProductName::new("VC-C4".to_string()).is_err());
        Ok(())
    }

    #[test]
    fn round_trip_to_bytes() -> Result {
        let r = Response::new(DEFAULT_DEVICE_ID, ErrorCode::Busy, vec![]);
        assert_eq!(hex::decode("fe30003100ef")?, r.to_bytes()?);

        let r = Response::new(DEFAULT_DEVICE_ID, ErrorCode::None, vec![0x30; 9]);
        assert!(matches!(r.to_bytes(), Err(Error::InvalidLength)));
        Ok(())
    }
}

//! # Units and hardware limits
//!
//! The pan/tilt head works in steps of 0.1125 degrees. Conversions from
//! degrees always round toward zero, so the magnitude of an encoded angle never
//! exceeds the requested angle.
//!
//! Limits are empirical, and are those of the VC-C4 and VC-C50i heads:
//!
//! Axis      | Minimum | Maximum | Notes
//! --------- | ------- | ------- | -----
//! Pan       | -98°    | 98°     | ±875 units accepted by the camera
//! Tilt      | -30°    | 88°     | -267 to 790 units accepted by the camera
//! Pan slew  | 1°/s    | 90°/s   | 8 to 800 units per second
//! Tilt slew | 1°/s    | 69°/s   | 8 to 662 units per second
//! Zoom      | 0       | 1960    | optical zoom position
use crate::{Error, Result};

/// Size of one protocol unit, in degrees.
pub const DEGREES_PER_UNIT: f64 = 0.1125;

/// Offset applied to signed angles on the wire.
pub const ANGLE_OFFSET: i32 = 0x8000;

pub const MAX_PAN: f64 = 98.;
pub const MIN_PAN: f64 = -98.;
pub const MAX_TILT: f64 = 88.;
pub const MIN_TILT: f64 = -30.;
pub const MAX_PAN_SLEW: f64 = 90.;
pub const MIN_PAN_SLEW: f64 = 1.;
pub const MAX_TILT_SLEW: f64 = 69.;
pub const MIN_TILT_SLEW: f64 = 1.;
pub const MAX_ZOOM: u16 = 1960;
pub const MIN_ZOOM: u16 = 0;

/// Converts degrees (or degrees per second) into protocol units, rounding
/// toward zero.
#[inline]
pub fn degrees_to_units(deg: f64) -> i32 {
    (deg / DEGREES_PER_UNIT).trunc() as i32
}

/// Converts protocol units into degrees.
#[inline]
pub fn units_to_degrees(units: i32) -> f64 {
    f64::from(units) * DEGREES_PER_UNIT
}

/// Offsets a signed angle for transmission.
pub fn angle_to_field(units: i32) -> Result<u16> {
    u16::try_from(units + ANGLE_OFFSET).map_err(|_| Error::ParameterOutOfRange)
}

/// Removes the transmission offset from a signed angle.
#[inline]
pub fn field_to_angle(v: u16) -> i32 {
    i32::from(v) - ANGLE_OFFSET
}

#[inline]
pub fn clamp_pan(deg: f64) -> f64 {
    deg.clamp(MIN_PAN, MAX_PAN)
}

#[inline]
pub fn clamp_tilt(deg: f64) -> f64 {
    deg.clamp(MIN_TILT, MAX_TILT)
}

#[inline]
pub fn clamp_pan_slew(deg: f64) -> f64 {
    deg.clamp(MIN_PAN_SLEW, MAX_PAN_SLEW)
}

#[inline]
pub fn clamp_tilt_slew(deg: f64) -> f64 {
    deg.clamp(MIN_TILT_SLEW, MAX_TILT_SLEW)
}

#[inline]
pub fn clamp_zoom(zoom: i32) -> u16 {
    // Bounded by MAX_ZOOM, so this always fits.
    zoom.clamp(i32::from(MIN_ZOOM), i32::from(MAX_ZOOM)) as u16
}

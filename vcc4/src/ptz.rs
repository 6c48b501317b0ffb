//! Generic pan/tilt/zoom camera interface.
use crate::{
    config::CommState,
    driver::Vcc4,
    protocol::{
        units::{
            clamp_pan, clamp_tilt, MAX_PAN, MAX_PAN_SLEW, MAX_TILT, MAX_TILT_SLEW, MAX_ZOOM,
            MIN_PAN, MIN_PAN_SLEW, MIN_TILT, MIN_TILT_SLEW, MIN_ZOOM,
        },
        FocusMode,
    },
    transport::Transport,
    Error, Result,
};

/// Interface shared by pan/tilt/zoom cameras.
///
/// Angles are in degrees, and slew rates in degrees per second. Setters only
/// record what the caller wants, and fail only if the request can't be
/// expressed at all. Values outside the camera's limits are clamped when
/// sent.
///
/// Getters report what the camera has confirmed.
pub trait Ptz {
    fn type_name(&self) -> &'static str;

    fn set_pan(&mut self, pan: f64) -> Result;
    fn set_tilt(&mut self, tilt: f64) -> Result;
    fn set_pan_tilt(&mut self, pan: f64, tilt: f64) -> Result {
        self.set_pan(pan)?;
        self.set_tilt(tilt)
    }
    fn pan_rel(&mut self, delta: f64) -> Result;
    fn tilt_rel(&mut self, delta: f64) -> Result;
    fn pan_tilt_rel(&mut self, pan_delta: f64, tilt_delta: f64) -> Result {
        self.pan_rel(pan_delta)?;
        self.tilt_rel(tilt_delta)
    }
    fn set_zoom(&mut self, zoom: i32) -> Result;
    fn set_pan_slew(&mut self, rate: f64) -> Result;
    fn set_tilt_slew(&mut self, rate: f64) -> Result;
    fn set_auto_focus(&mut self, enabled: bool) -> Result;

    /// Stops pan/tilt motion as soon as possible.
    fn halt_pan_tilt(&mut self) -> Result;
    /// Stops zoom motion as soon as possible.
    fn halt_zoom(&mut self) -> Result;

    /// (Re-)initialises the camera, powering it on if needed.
    fn init(&mut self) -> Result;
    /// Like [`init()`][Self::init], but also repeats the camera's full
    /// configuration.
    fn reset(&mut self) -> Result;

    /// Asks the camera where it is really pointing.
    fn request_real_pan_tilt(&mut self) -> Result;
    /// Asks the camera for its real zoom position.
    fn request_real_zoom(&mut self) -> Result;

    fn pan(&self) -> f64;
    fn tilt(&self) -> f64;
    fn zoom(&self) -> i32;
    fn pan_slew(&self) -> f64;
    fn tilt_slew(&self) -> f64;

    fn can_zoom(&self) -> bool;
    fn can_get_real_pan_tilt(&self) -> bool;
    fn can_get_real_zoom(&self) -> bool;
    fn can_set_focus(&self) -> bool;
    fn can_get_fov(&self) -> bool;

    fn max_pos_pan(&self) -> f64;
    fn max_neg_pan(&self) -> f64;
    fn max_pos_tilt(&self) -> f64;
    fn max_neg_tilt(&self) -> f64;
    fn min_zoom(&self) -> i32;
    fn max_zoom(&self) -> i32;

    /// Horizontal field of view at [`max_zoom()`][Self::max_zoom], in degrees.
    fn fov_at_max_zoom(&self) -> f64;
    /// Horizontal field of view at [`min_zoom()`][Self::min_zoom], in degrees.
    fn fov_at_min_zoom(&self) -> f64;
}

#[inline]
fn finite(v: f64) -> Result<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(Error::ParameterOutOfRange)
    }
}

impl<T: Transport> Ptz for Vcc4<T> {
    fn type_name(&self) -> &'static str {
        "vcc4"
    }

    fn set_pan(&mut self, pan: f64) -> Result {
        self.desired.pan = finite(pan)?;
        Ok(())
    }

    fn set_tilt(&mut self, tilt: f64) -> Result {
        self.desired.tilt = finite(tilt)?;
        Ok(())
    }

    fn set_pan_tilt(&mut self, pan: f64, tilt: f64) -> Result {
        // Check both before changing either.
        let (pan, tilt) = (finite(pan)?, finite(tilt)?);
        self.desired.pan = pan;
        self.desired.tilt = tilt;
        Ok(())
    }

    fn pan_rel(&mut self, delta: f64) -> Result {
        self.desired.pan = clamp_pan(self.desired.pan) + finite(delta)?;
        Ok(())
    }

    fn tilt_rel(&mut self, delta: f64) -> Result {
        self.desired.tilt = clamp_tilt(self.desired.tilt) + finite(delta)?;
        Ok(())
    }

    fn set_zoom(&mut self, zoom: i32) -> Result {
        self.desired.zoom = zoom;
        Ok(())
    }

    fn set_pan_slew(&mut self, rate: f64) -> Result {
        self.desired.pan_slew = finite(rate)?;
        Ok(())
    }

    fn set_tilt_slew(&mut self, rate: f64) -> Result {
        self.desired.tilt_slew = finite(rate)?;
        Ok(())
    }

    fn set_auto_focus(&mut self, enabled: bool) -> Result {
        self.set_focus_mode(if enabled {
            FocusMode::Auto
        } else {
            FocusMode::Manual
        });
        Ok(())
    }

    fn halt_pan_tilt(&mut self) -> Result {
        self.desired.halt_pan_tilt = true;
        Ok(())
    }

    fn halt_zoom(&mut self) -> Result {
        self.desired.halt_zoom = true;
        Ok(())
    }

    fn init(&mut self) -> Result {
        self.desired.init_requested = true;
        self.desired.power = true;
        Ok(())
    }

    fn reset(&mut self) -> Result {
        self.full_reset = true;
        self.init()
    }

    fn request_real_pan_tilt(&mut self) -> Result {
        if self.comm_state == CommState::Unidirectional {
            return Err(Error::FeatureUnavailable);
        }
        self.desired.real_pan_tilt_requested = true;
        Ok(())
    }

    fn request_real_zoom(&mut self) -> Result {
        if self.comm_state == CommState::Unidirectional {
            return Err(Error::FeatureUnavailable);
        }
        self.desired.real_zoom_requested = true;
        Ok(())
    }

    fn pan(&self) -> f64 {
        self.actual.pan
    }

    fn tilt(&self) -> f64 {
        self.actual.tilt
    }

    fn zoom(&self) -> i32 {
        self.actual.zoom.into()
    }

    fn pan_slew(&self) -> f64 {
        self.actual.pan_slew
    }

    fn tilt_slew(&self) -> f64 {
        self.actual.tilt_slew
    }

    fn can_zoom(&self) -> bool {
        true
    }

    fn can_get_real_pan_tilt(&self) -> bool {
        self.comm_state.is_bidirectional()
    }

    fn can_get_real_zoom(&self) -> bool {
        self.comm_state.is_bidirectional()
    }

    fn can_set_focus(&self) -> bool {
        false
    }

    fn can_get_fov(&self) -> bool {
        true
    }

    fn max_pos_pan(&self) -> f64 {
        MAX_PAN
    }

    fn max_neg_pan(&self) -> f64 {
        MIN_PAN
    }

    fn max_pos_tilt(&self) -> f64 {
        MAX_TILT
    }

    fn max_neg_tilt(&self) -> f64 {
        MIN_TILT
    }

    fn min_zoom(&self) -> i32 {
        MIN_ZOOM.into()
    }

    fn max_zoom(&self) -> i32 {
        self.actual.zoom_limit.unwrap_or(MAX_ZOOM).into()
    }

    fn fov_at_max_zoom(&self) -> f64 {
        self.config.variant.fov_at_max_zoom()
    }

    fn fov_at_min_zoom(&self) -> f64 {
        self.config.variant.fov_at_min_zoom()
    }
}

impl<T: Transport> Vcc4<T> {
    pub fn min_pan_slew(&self) -> f64 {
        MIN_PAN_SLEW
    }

    pub fn max_pan_slew(&self) -> f64 {
        MAX_PAN_SLEW
    }

    pub fn min_tilt_slew(&self) -> f64 {
        MIN_TILT_SLEW
    }

    pub fn max_tilt_slew(&self) -> f64 {
        MAX_TILT_SLEW
    }
}

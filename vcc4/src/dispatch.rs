//! Command dispatcher.
//!
//! Each `send_*` function clamps its input to the camera's limits, builds and
//! transmits a frame, then records what was sent. Success only means that the
//! frame was handed to the transport.
use crate::{
    driver::Vcc4,
    protocol::{
        units::{
            clamp_pan, clamp_pan_slew, clamp_tilt, clamp_tilt_slew, clamp_zoom, degrees_to_units,
            MAX_PAN, MIN_PAN,
        },
        DigitalZoom, FocusMode, LedMode, RangeAxis, Request, ZoomQuery,
    },
    state::{Family, SentState},
    transport::Transport,
    Result,
};
use std::time::Instant;

impl<T: Transport> Vcc4<T> {
    fn transmit(&mut self, request: Request, now: Instant) -> Result {
        let frame = request.encode(self.config.device_id)?;
        self.transport.send(&frame)?;
        self.last_frame = Some(frame);
        self.last_sent = Some(now);
        self.frames_sent += 1;
        Ok(())
    }

    /// Sends the last frame again, without touching [`SentState`].
    pub(crate) fn retransmit(&mut self, now: Instant) -> Result {
        let Some(frame) = &self.last_frame else {
            return Ok(());
        };
        trace!(">>> (retransmit) {}", hex::encode(frame));
        self.transport.send(frame)?;
        self.last_sent = Some(now);
        self.frames_sent += 1;
        Ok(())
    }

    /// Sends the command for `family`, using the desired state.
    pub(crate) fn send_family(&mut self, family: Family, now: Instant) -> Result {
        match family {
            Family::ControlMode => self.send_control_mode(now),
            Family::Init => self.send_init(now),
            Family::DefaultRange => self.send_default_range(now),
            Family::PowerOn => self.send_power(true, now),
            Family::PowerOff => self.send_power(false, now),
            Family::PanTilt => self.send_pan_tilt(self.desired.pan, self.desired.tilt, now),
            Family::Zoom => self.send_zoom(self.desired.zoom, now),
            Family::StopPanTilt => self.send_halt_pan_tilt(now),
            Family::StopZoom => self.send_halt_zoom(now),
            Family::PanSlew => self.send_pan_slew(self.desired.pan_slew, now),
            Family::TiltSlew => self.send_tilt_slew(self.desired.tilt_slew, now),
            Family::PositionRequest => self.send_position_request(now),
            Family::ZoomRequest => self.send_zoom_request(now),
            Family::ZoomLimitRequest => self.send_zoom_limit_request(now),
            Family::ProductNameRequest => self.send_product_name_request(now),
            Family::LedControl => self.send_led_control(self.desired.led, now),
            Family::IrFilter => self.send_ir_filter(self.desired.ir_filter, now),
            Family::IrLeds => self.send_ir_leds(self.desired.ir_leds, now),
            Family::DigitalZoom => self.send_digital_zoom(self.desired.digital_zoom, now),
            Family::Focus => self.send_focus(self.desired.focus, now),
        }
    }

    pub(crate) fn send_pan_tilt(&mut self, pan: f64, tilt: f64, now: Instant) -> Result {
        let pan = clamp_pan(pan);
        let tilt = clamp_tilt(tilt);
        self.transmit(
            Request::PanTilt {
                pan: degrees_to_units(pan),
                tilt: degrees_to_units(tilt),
            },
            now,
        )?;
        self.sent.pan = pan;
        self.sent.tilt = tilt;
        Ok(())
    }

    pub(crate) fn send_pan_slew(&mut self, rate: f64, now: Instant) -> Result {
        let rate = clamp_pan_slew(rate);
        self.transmit(Request::PanSlew(degrees_to_units(rate)), now)?;
        self.sent.pan_slew = rate;
        Ok(())
    }

    pub(crate) fn send_tilt_slew(&mut self, rate: f64, now: Instant) -> Result {
        let rate = clamp_tilt_slew(rate);
        self.transmit(Request::TiltSlew(degrees_to_units(rate)), now)?;
        self.sent.tilt_slew = rate;
        Ok(())
    }

    pub(crate) fn send_zoom(&mut self, zoom: i32, now: Instant) -> Result {
        let zoom = clamp_zoom(zoom);
        self.transmit(Request::Zoom(zoom), now)?;
        self.sent.zoom = zoom;
        Ok(())
    }

    pub(crate) fn send_digital_zoom(&mut self, zoom: DigitalZoom, now: Instant) -> Result {
        self.transmit(Request::DigitalZoom(zoom), now)?;
        self.sent.digital_zoom = zoom;
        Ok(())
    }

    pub(crate) fn send_power(&mut self, on: bool, now: Instant) -> Result {
        self.transmit(Request::Power(on), now)?;
        if on {
            // Everything goes back to defaults when the camera powers on.
            self.sent = SentState {
                power: true,
                ..Default::default()
            };
        } else {
            self.sent.power = false;
        }
        Ok(())
    }

    pub(crate) fn send_halt_pan_tilt(&mut self, now: Instant) -> Result {
        self.transmit(Request::StopPanTilt, now)?;
        self.desired.halt_pan_tilt = false;
        Ok(())
    }

    pub(crate) fn send_halt_zoom(&mut self, now: Instant) -> Result {
        self.transmit(Request::StopZoom, now)?;
        self.desired.halt_zoom = false;
        Ok(())
    }

    pub(crate) fn send_position_request(&mut self, now: Instant) -> Result {
        self.transmit(Request::PanTiltRequest, now)?;
        self.desired.real_pan_tilt_requested = false;
        self.auto_update_zoom_next = true;
        Ok(())
    }

    pub(crate) fn send_zoom_request(&mut self, now: Instant) -> Result {
        self.transmit(Request::ZoomRequest(ZoomQuery::Position), now)?;
        self.zoom_query = ZoomQuery::Position;
        self.desired.real_zoom_requested = false;
        self.auto_update_zoom_next = false;
        Ok(())
    }

    pub(crate) fn send_zoom_limit_request(&mut self, now: Instant) -> Result {
        self.transmit(Request::ZoomRequest(ZoomQuery::Limit), now)?;
        self.zoom_query = ZoomQuery::Limit;
        self.zoom_limit_pending = false;
        Ok(())
    }

    pub(crate) fn send_product_name_request(&mut self, now: Instant) -> Result {
        self.transmit(Request::ProductNameRequest, now)?;
        self.product_name_pending = false;
        Ok(())
    }

    pub(crate) fn send_led_control(&mut self, mode: LedMode, now: Instant) -> Result {
        self.transmit(Request::LedControl(mode), now)?;
        self.sent.led = mode;
        Ok(())
    }

    pub(crate) fn send_ir_filter(&mut self, on: bool, now: Instant) -> Result {
        self.transmit(Request::IrCutFilter(on), now)?;
        self.sent.ir_filter = on;
        Ok(())
    }

    pub(crate) fn send_ir_leds(&mut self, on: bool, now: Instant) -> Result {
        self.transmit(Request::InfraredLeds(on), now)?;
        self.sent.ir_leds = on;
        Ok(())
    }

    pub(crate) fn send_focus(&mut self, mode: FocusMode, now: Instant) -> Result {
        self.transmit(Request::Focus(mode), now)?;
        self.sent.focus = mode;
        Ok(())
    }

    pub(crate) fn send_control_mode(&mut self, now: Instant) -> Result {
        self.transmit(Request::ControlMode, now)
    }

    /// Initialising returns the head and lens to home.
    pub(crate) fn send_init(&mut self, now: Instant) -> Result {
        self.transmit(Request::Init, now)?;
        self.desired.init_requested = false;
        self.sent.pan = 0.;
        self.sent.tilt = 0.;
        self.sent.zoom = 0;
        Ok(())
    }

    /// Opens up the full pan range. Tilt is limited in software.
    pub(crate) fn send_default_range(&mut self, now: Instant) -> Result {
        self.transmit(
            Request::SetRange {
                axis: RangeAxis::Pan,
                min: degrees_to_units(MIN_PAN),
                max: degrees_to_units(MAX_PAN),
            },
            now,
        )
    }
}

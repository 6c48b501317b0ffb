//! Response interpreter: reassembles received bytes into frames, and applies
//! confirmed commands to [`ActualState`][crate::ActualState].
use crate::{
    config::CommState,
    driver::Vcc4,
    protocol::{
        self,
        units::{degrees_to_units, units_to_degrees},
        Response, ZoomQuery, FOOTER, RESPONSE,
    },
    state::{ProtocolState, StateUpdate},
    transport::Transport,
    Result,
};

/// Splits a stream of bytes from the camera into response frames.
#[derive(Debug, Default)]
pub(crate) struct FrameAssembler {
    buf: Vec<u8>,
}

impl FrameAssembler {
    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Takes the next complete frame out of the buffer.
    ///
    /// Returns `None` when more bytes are needed.
    pub fn next_frame(&mut self) -> Option<protocol::Result<Response>> {
        match self.buf.iter().position(|b| *b == RESPONSE) {
            None => {
                if !self.buf.is_empty() {
                    debug!("dropping stray bytes: {}", hex::encode(&self.buf));
                    self.buf.clear();
                }
                return None;
            }
            Some(0) => (),
            Some(i) => {
                debug!("dropping stray bytes: {}", hex::encode(&self.buf[..i]));
                self.buf.drain(..i);
            }
        }

        // The footer can't come before the status byte.
        let skip = Response::MIN_LENGTH - 1;
        let found = self
            .buf
            .iter()
            .take(Response::MAX_LENGTH)
            .skip(skip)
            .position(|b| *b == FOOTER);
        match found {
            Some(p) => {
                let frame: Vec<u8> = self.buf.drain(..=p + skip).collect();
                Some(Response::parse(&frame).inspect_err(|_| {
                    debug!("bad frame: {}", hex::encode(&frame));
                }))
            }

            None if self.buf.len() >= Response::MAX_LENGTH => {
                // No footer where there should be one. Drop the header, and
                // resynchronise on the next one.
                debug!(
                    "unterminated frame: {}",
                    hex::encode(&self.buf[..Response::MAX_LENGTH])
                );
                self.buf.drain(..1);
                Some(Err(protocol::Error::MalformedFrame))
            }

            None => None,
        }
    }
}

impl<T: Transport> Vcc4<T> {
    /// Drains all complete frames from the receive buffer, returning the first
    /// valid one addressed to us.
    pub(crate) fn collect_response(&mut self) -> Option<Response> {
        let mut first = None;
        while let Some(frame) = self.assembler.next_frame() {
            let r = match frame {
                Ok(r) => r,
                Err(e) => {
                    warn!("discarding malformed response: {e}");
                    continue;
                }
            };

            if r.device_id != self.config.device_id {
                debug!("ignoring response for device {:#04x}", r.device_id);
                continue;
            }

            if self.comm_state == CommState::Unknown {
                info!("camera replied, switching to bidirectional mode");
                self.comm_state = CommState::Bidirectional;
                self.updated |= StateUpdate::COMM_STATE;
            }

            if first.is_none() {
                first = Some(r);
            } else {
                debug!("discarding extra response: {r:?}");
            }
        }
        first
    }

    /// Applies the effects of the command in flight, now that it has been
    /// confirmed.
    ///
    /// `response` is `None` when the camera doesn't reply. Queries need a
    /// response to have any effect.
    ///
    /// An error means the response payload could not be understood, and the
    /// command should be treated as though there was no response at all.
    pub(crate) fn apply_confirmation(&mut self, response: Option<&Response>) -> Result {
        match self.state {
            ProtocolState::SettingInitTiltRate | ProtocolState::AwaitingTiltSlewResponse => {
                self.actual.tilt_slew = self.sent.tilt_slew;
                self.updated |= StateUpdate::TILT_SLEW;
            }

            ProtocolState::SettingInitPanRate | ProtocolState::AwaitingPanSlewResponse => {
                self.actual.pan_slew = self.sent.pan_slew;
                self.updated |= StateUpdate::PAN_SLEW;
            }

            ProtocolState::SettingInitRange => {
                self.configured = true;
            }

            ProtocolState::AwaitingInitialPowerOn | ProtocolState::PoweringOn => {
                self.actual.power = true;
                self.updated |= StateUpdate::POWER;
            }

            ProtocolState::AwaitingInitialInit => {
                info!("camera initialised");
                self.initialised = true;
                self.actual.power = true;
                self.actual.pan = 0.;
                self.actual.tilt = 0.;
                self.actual.zoom = 0;
                self.product_name_pending = true;
                self.zoom_limit_pending = true;
                self.updated |= StateUpdate::INITIALISED | StateUpdate::POSITION;
            }

            ProtocolState::PoweringOff => {
                self.actual.power = false;
                self.initialised = false;
                self.updated |= StateUpdate::POWER;
            }

            ProtocolState::AwaitingPanTiltResponse => {
                self.actual.pan = units_to_degrees(degrees_to_units(self.sent.pan));
                self.actual.tilt = units_to_degrees(degrees_to_units(self.sent.tilt));
                self.updated |= StateUpdate::PAN_TILT;
            }

            ProtocolState::AwaitingZoomResponse => {
                self.actual.zoom = self.sent.zoom;
                self.updated |= StateUpdate::ZOOM;
            }

            // Find out where motion stopped.
            ProtocolState::AwaitingStopPanTiltResponse => {
                if self.comm_state.is_bidirectional() {
                    self.desired.real_pan_tilt_requested = true;
                }
            }

            ProtocolState::AwaitingStopZoomResponse => {
                if self.comm_state.is_bidirectional() {
                    self.desired.real_zoom_requested = true;
                }
            }

            ProtocolState::AwaitingPosRequest => {
                if let Some(r) = response {
                    let pos = r.pan_tilt()?;
                    debug!(?pos, "position report");
                    self.actual.pan = pos.pan_degrees();
                    self.actual.tilt = pos.tilt_degrees();
                    self.updated |= StateUpdate::PAN_TILT;
                }
            }

            ProtocolState::AwaitingZoomRequest => {
                if let Some(r) = response {
                    let zoom = r.zoom()?.position;
                    match self.zoom_query {
                        ZoomQuery::Position => {
                            debug!(zoom, "zoom report");
                            self.actual.zoom = zoom;
                            self.updated |= StateUpdate::ZOOM;
                        }
                        ZoomQuery::Limit => {
                            info!("zoom limit: {zoom}");
                            self.actual.zoom_limit = Some(zoom);
                            self.updated |= StateUpdate::ZOOM_LIMIT;
                        }
                    }
                }
            }

            ProtocolState::AwaitingProductNameRequest => {
                if let Some(r) = response {
                    let name = r.product_name()?;
                    info!("product name: {}", name.name());
                    self.actual.product_name = Some(name.name().to_string());
                    self.updated |= StateUpdate::PRODUCT_NAME;
                }
            }

            ProtocolState::AwaitingLedControlResponse => {
                self.actual.led = self.sent.led;
                self.updated |= StateUpdate::LED;
            }

            ProtocolState::AwaitingIrLedsResponse => {
                self.actual.ir_leds = self.sent.ir_leds;
                self.updated |= StateUpdate::IR_LEDS;
            }

            ProtocolState::AwaitingIrFilterResponse => {
                self.actual.ir_filter = self.sent.ir_filter;
                self.updated |= StateUpdate::IR_FILTER;
                if !self.actual.ir_filter {
                    // The camera turns the LEDs off with the filter.
                    self.actual.ir_leds = false;
                    self.sent.ir_leds = false;
                    self.updated |= StateUpdate::IR_LEDS;
                }
            }

            ProtocolState::AwaitingDigitalZoomResponse => {
                self.actual.digital_zoom = self.sent.digital_zoom;
                self.updated |= StateUpdate::DIGITAL_ZOOM;
            }

            ProtocolState::AwaitingFocusResponse => {
                self.actual.focus = self.sent.focus;
                self.updated |= StateUpdate::FOCUS;
            }

            ProtocolState::SettingControlMode
            | ProtocolState::Uninitialized
            | ProtocolState::Initializing
            | ProtocolState::PoweredOn
            | ProtocolState::PoweredOff
            | ProtocolState::DelayedSwitch
            | ProtocolState::Error => (),
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn frames(a: &mut FrameAssembler) -> Vec<protocol::Result<Response>> {
        std::iter::from_fn(|| a.next_frame()).collect()
    }

    #[test]
    fn reassembly() -> Result {
        let mut a = FrameAssembler::default();
        let cmd = hex::decode("fe3000303043353069ef")?;

        // Arbitrary chunks
        a.push(&cmd[..3]);
        assert!(a.next_frame().is_none());
        a.push(&cmd[3..9]);
        assert!(a.next_frame().is_none());
        a.push(&cmd[9..]);
        let r = frames(&mut a);
        assert_eq!(1, r.len());
        let Ok(r) = &r[0] else {
            panic!("expected frame, got {r:?}");
        };
        assert_eq!("C50i", r.product_name()?.name());
        Ok(())
    }

    #[test]
    fn stray_bytes() -> Result {
        let mut a = FrameAssembler::default();
        a.push(&hex::decode("0102ef")?);
        assert!(a.next_frame().is_none());
        assert!(a.buf.is_empty());

        a.push(&hex::decode("00fe30003000effe30003100ef")?);
        let r = frames(&mut a);
        assert_eq!(2, r.len());
        assert!(matches!(&r[0], Ok(r) if r.error == protocol::ErrorCode::None));
        assert!(matches!(&r[1], Ok(r) if r.error == protocol::ErrorCode::Busy));
        Ok(())
    }

    #[test]
    fn oversized() -> Result {
        let mut a = FrameAssembler::default();
        a.push(&hex::decode("fe300030303830303038303030ffef")?);
        let r = frames(&mut a);
        assert_eq!(1, r.len());
        assert!(r[0].is_err());
        assert!(a.buf.is_empty());

        // No footer at all, followed by a good frame.
        a.push(&hex::decode("fe3000303031323334353637383930")?);
        a.push(&hex::decode("fe30003000ef")?);
        let r = frames(&mut a);
        assert!(r[0].is_err());
        assert!(matches!(r.last(), Some(Ok(r)) if r.payload.is_empty()));
        Ok(())
    }
}

use crate::{
    callbacks::{CallbackHandle, ErrorCallbacks},
    config::{CommState, Config},
    interpreter::FrameAssembler,
    protocol::{
        units::{clamp_pan, clamp_pan_slew, clamp_tilt, clamp_tilt_slew, clamp_zoom},
        DigitalZoom, ErrorCode, FocusMode, LedMode, Response, ZoomQuery,
    },
    state::{
        transition, ActualState, DesiredState, Event, Family, Next, ProtocolState, SentState,
        StateUpdate,
    },
    transport::Transport,
    Error, Result,
};
use num_traits::FromPrimitive;
use std::time::{Duration, Instant};

/// Result of a single state machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The state changed, and the new state may be able to act immediately.
    Progress,
    /// Nothing more to do this tick.
    Wait,
}

/// Driver for a Canon VC-C4 or VC-C50i camera.
///
/// ## General design
///
/// Callers change the *desired* state with the [`Ptz`][crate::Ptz] trait and
/// the methods here. Nothing is sent until the host calls
/// [`tick()`][Self::tick], which:
///
/// 1. reassembles any bytes pushed in with [`receive()`][Self::receive] into
///    response frames;
/// 2. resolves the command in flight (reply, `BUSY` retransmit or timeout);
/// 3. when idle, sends the single most important command needed to bring the
///    camera closer to the desired state.
///
/// At most one frame is sent per tick, and there is never more than one
/// command in flight.
///
/// ## Failures
///
/// A command the camera rejects is abandoned: it is only sent again once the
/// desired value changes. Error callbacks run at the end of any tick in which
/// the camera reported an error, or (in bidirectional mode) failed to reply.
///
/// After [`Config::max_consecutive_failures`] timeouts or transmit failures in
/// a row (or failures of any kind during bring-up), the driver parks in
/// [`ProtocolState::Error`] until [`init()`][crate::Ptz::init] or
/// [`reset()`][crate::Ptz::reset] is called.
pub struct Vcc4<T> {
    pub(crate) transport: T,
    pub(crate) config: Config,

    pub(crate) desired: DesiredState,
    pub(crate) sent: SentState,
    pub(crate) actual: ActualState,
    pub(crate) comm_state: CommState,

    pub(crate) state: ProtocolState,
    pub(crate) previous_state: ProtocolState,
    /// Where [`ProtocolState::DelayedSwitch`] goes next.
    pub(crate) next_state: ProtocolState,
    pub(crate) delay: Duration,

    pub(crate) state_entered: Instant,
    pub(crate) last_sent: Option<Instant>,
    pub(crate) idle_since: Instant,

    /// Control mode, slew rates and range have been set since the last reset.
    pub(crate) configured: bool,
    pub(crate) full_reset: bool,
    pub(crate) initialised: bool,
    pub(crate) product_name_pending: bool,
    pub(crate) zoom_limit_pending: bool,
    /// What the zoom request in flight asked for.
    pub(crate) zoom_query: ZoomQuery,
    pub(crate) auto_update: bool,
    pub(crate) auto_update_zoom_next: bool,

    /// The frame in flight, kept for retransmission.
    pub(crate) last_frame: Option<Vec<u8>>,
    pub(crate) frames_sent: u64,
    pub(crate) busy_retries: u8,
    pub(crate) retransmit_at: Option<Instant>,
    pub(crate) consecutive_failures: u32,

    pub(crate) assembler: FrameAssembler,
    pub(crate) callbacks: ErrorCallbacks,
    pub(crate) was_error: bool,
    pub(crate) updated: StateUpdate,
}

impl<T: Transport> Vcc4<T> {
    /// Upper bound on state machine steps in a single tick.
    const MAX_STEPS_PER_TICK: usize = 4;

    pub fn new(transport: T, config: Config) -> Self {
        let now = Instant::now();
        let desired = DesiredState {
            led: if config.disable_led {
                LedMode::Off
            } else {
                LedMode::Auto
            },
            ..Default::default()
        };

        Self {
            transport,
            desired,
            sent: SentState::default(),
            actual: ActualState::default(),
            comm_state: config.comm_mode,
            state: ProtocolState::Uninitialized,
            previous_state: ProtocolState::Uninitialized,
            next_state: ProtocolState::Uninitialized,
            delay: Duration::ZERO,
            state_entered: now,
            last_sent: None,
            idle_since: now,
            configured: false,
            full_reset: false,
            initialised: false,
            product_name_pending: false,
            zoom_limit_pending: false,
            zoom_query: ZoomQuery::Position,
            auto_update: config.auto_update,
            auto_update_zoom_next: false,
            last_frame: None,
            frames_sent: 0,
            busy_retries: 0,
            retransmit_at: None,
            consecutive_failures: 0,
            assembler: FrameAssembler::default(),
            callbacks: ErrorCallbacks::default(),
            was_error: false,
            updated: StateUpdate::empty(),
            config,
        }
    }

    /// Pushes bytes received from the camera into the driver.
    ///
    /// Bytes may arrive in any size chunks. They are only interpreted on the
    /// next [`tick()`][Self::tick].
    pub fn receive(&mut self, data: &[u8]) {
        trace!("<<< {}", hex::encode(data));
        self.assembler.push(data);
    }

    /// Runs one cycle of the state machine.
    ///
    /// Returns a summary of what changed.
    pub fn tick(&mut self) -> StateUpdate {
        self.tick_at(Instant::now())
    }

    /// Runs one cycle of the state machine, with a caller-supplied clock.
    pub fn tick_at(&mut self, now: Instant) -> StateUpdate {
        self.was_error = false;
        self.updated = StateUpdate::empty();

        let mut response = self.collect_response();
        let frames_sent = self.frames_sent;
        for _ in 0..Self::MAX_STEPS_PER_TICK {
            // Only the first step may consume the response.
            if self.step(now, response.take()) == Step::Wait || self.frames_sent != frames_sent {
                break;
            }
        }

        if self.was_error {
            self.updated |= StateUpdate::ERROR;
            self.callbacks.invoke();
        }
        self.updated
    }

    fn step(&mut self, now: Instant, response: Option<Response>) -> Step {
        if !self.state.is_awaiting() {
            if let Some(r) = &response {
                debug!("{:?}: discarding unsolicited response {r:?}", self.state);
            }
        }

        match self.state {
            ProtocolState::Uninitialized => {
                if self.desired.init_requested || self.desired.power {
                    self.enter(ProtocolState::Initializing, now);
                    Step::Progress
                } else {
                    Step::Wait
                }
            }

            ProtocolState::Initializing => self.bring_up(now),
            ProtocolState::PoweredOn => self.idle(now),

            ProtocolState::PoweredOff => {
                if self.desired.init_requested {
                    self.enter(ProtocolState::Initializing, now);
                    Step::Progress
                } else if self.desired.power {
                    self.dispatch(Family::PowerOn, ProtocolState::PoweringOn, now)
                } else {
                    Step::Wait
                }
            }

            ProtocolState::DelayedSwitch => {
                if now.saturating_duration_since(self.state_entered) < self.delay {
                    return Step::Wait;
                }
                self.enter(self.next_state, now);
                Step::Progress
            }

            ProtocolState::Error => {
                if !self.desired.init_requested {
                    return Step::Wait;
                }
                info!("re-initialising after errors");
                self.consecutive_failures = 0;
                self.enter(ProtocolState::Initializing, now);
                Step::Progress
            }

            _ => self.await_response(now, response),
        }
    }

    /// The bring-up hub.
    fn bring_up(&mut self, now: Instant) -> Step {
        if self.full_reset {
            self.full_reset = false;
            self.configured = false;
        }

        if !self.configured {
            self.dispatch(Family::ControlMode, ProtocolState::SettingControlMode, now)
        } else if !self.actual.power {
            self.dispatch(Family::PowerOn, ProtocolState::AwaitingInitialPowerOn, now)
        } else {
            self.dispatch(Family::Init, ProtocolState::AwaitingInitialInit, now)
        }
    }

    fn idle(&mut self, now: Instant) -> Step {
        if self.desired.init_requested {
            self.enter(ProtocolState::Initializing, now);
            return Step::Progress;
        }

        match self.needed(now) {
            Some((family, awaiting)) => self.dispatch(family, awaiting, now),
            None => Step::Wait,
        }
    }

    /// Picks the most important command needed to reach the desired state.
    fn needed(&self, now: Instant) -> Option<(Family, ProtocolState)> {
        let d = &self.desired;
        let s = &self.sent;
        let differs = |a: f64, b: f64| (a - b).abs() > self.config.tolerance;
        let extended = self.config.variant.is_extended();
        let bidirectional = self.comm_state.is_bidirectional();

        let n = if !d.power {
            (Family::PowerOff, ProtocolState::PoweringOff)
        } else if d.halt_pan_tilt {
            (Family::StopPanTilt, ProtocolState::AwaitingStopPanTiltResponse)
        } else if d.halt_zoom {
            (Family::StopZoom, ProtocolState::AwaitingStopZoomResponse)
        } else if differs(clamp_pan(d.pan), s.pan) || differs(clamp_tilt(d.tilt), s.tilt) {
            (Family::PanTilt, ProtocolState::AwaitingPanTiltResponse)
        } else if differs(clamp_zoom(d.zoom).into(), s.zoom.into()) {
            (Family::Zoom, ProtocolState::AwaitingZoomResponse)
        } else if differs(clamp_pan_slew(d.pan_slew), s.pan_slew) {
            (Family::PanSlew, ProtocolState::AwaitingPanSlewResponse)
        } else if differs(clamp_tilt_slew(d.tilt_slew), s.tilt_slew) {
            (Family::TiltSlew, ProtocolState::AwaitingTiltSlewResponse)
        } else if extended && d.ir_filter != s.ir_filter {
            (Family::IrFilter, ProtocolState::AwaitingIrFilterResponse)
        } else if extended && self.actual.ir_filter && d.ir_leds != s.ir_leds {
            // The LEDs only work with the IR cut filter enabled.
            (Family::IrLeds, ProtocolState::AwaitingIrLedsResponse)
        } else if extended && d.digital_zoom != s.digital_zoom {
            (Family::DigitalZoom, ProtocolState::AwaitingDigitalZoomResponse)
        } else if d.focus != s.focus {
            (Family::Focus, ProtocolState::AwaitingFocusResponse)
        } else if d.led != s.led {
            (Family::LedControl, ProtocolState::AwaitingLedControlResponse)
        } else if bidirectional && d.real_pan_tilt_requested {
            (Family::PositionRequest, ProtocolState::AwaitingPosRequest)
        } else if bidirectional && d.real_zoom_requested {
            (Family::ZoomRequest, ProtocolState::AwaitingZoomRequest)
        } else if bidirectional && self.product_name_pending {
            (
                Family::ProductNameRequest,
                ProtocolState::AwaitingProductNameRequest,
            )
        } else if bidirectional && self.zoom_limit_pending {
            (Family::ZoomLimitRequest, ProtocolState::AwaitingZoomRequest)
        } else if bidirectional
            && self.auto_update
            && now.saturating_duration_since(self.idle_since)
                >= self.config.timing.auto_update_interval
        {
            if self.auto_update_zoom_next {
                (Family::ZoomRequest, ProtocolState::AwaitingZoomRequest)
            } else {
                (Family::PositionRequest, ProtocolState::AwaitingPosRequest)
            }
        } else {
            return None;
        };

        Some(n)
    }

    fn await_response(&mut self, now: Instant, response: Option<Response>) -> Step {
        if let Some(r) = response {
            match r.error {
                ErrorCode::None => match self.apply_confirmation(Some(&r)) {
                    Ok(()) => return self.resolve(Event::Confirmed, now),
                    // Wait for the timeout, as though nothing arrived.
                    Err(e) => warn!("{:?}: unusable reply {r:?}: {e}", self.state),
                },

                ErrorCode::Busy if self.busy_retries < self.config.max_busy_retries => {
                    self.busy_retries += 1;
                    debug!(
                        "{:?}: camera busy, retry {}/{}",
                        self.state, self.busy_retries, self.config.max_busy_retries
                    );
                    self.was_error = true;
                    self.retransmit_at = Some(now + self.config.timing.busy_backoff);
                }

                e => {
                    warn!("{:?}: camera reported {e:?}", self.state);
                    self.was_error = true;
                    return self.resolve(Event::Rejected, now);
                }
            }
        }

        if let Some(at) = self.retransmit_at {
            if now >= at {
                self.retransmit_at = None;
                if let Err(e) = self.retransmit(now) {
                    warn!("{:?}: retransmit failed: {e}", self.state);
                }
                return Step::Wait;
            }
        }

        if now.saturating_duration_since(self.state_entered) < self.config.timeout(self.comm_state)
        {
            return Step::Wait;
        }

        if self.comm_state.is_bidirectional() {
            warn!("{:?}: timed out waiting for reply", self.state);
            self.was_error = true;
            return self.resolve(Event::TimedOut, now);
        }

        // Without replies, a command which had enough time has worked.
        match self.apply_confirmation(None) {
            Ok(()) => self.resolve(Event::Confirmed, now),
            Err(_) => self.resolve(Event::TimedOut, now),
        }
    }

    fn resolve(&mut self, event: Event, now: Instant) -> Step {
        let state = self.state;
        if event == Event::Confirmed {
            self.consecutive_failures = 0;
        } else if event == Event::TimedOut || state.is_bring_up() {
            // A rejected command is abandoned, but doesn't count towards
            // escalation once the camera is up.
            if state.is_bring_up() {
                self.configured = false;
            }
            if self.record_failure(now) {
                return Step::Wait;
            }
        }

        let next = transition(state, event);
        trace!("{state:?} + {event:?} => {next:?}");
        match next {
            Next::Dispatch(family, awaiting) => self.dispatch(family, awaiting, now),
            Next::Enter(s) => {
                self.enter(s, now);
                Step::Progress
            }
            Next::Settle(s) => {
                if self.comm_state.is_bidirectional() {
                    self.enter(s, now);
                } else {
                    self.next_state = s;
                    self.delay = self.config.timing.power_settle;
                    self.enter(ProtocolState::DelayedSwitch, now);
                }
                Step::Progress
            }
            Next::Idle => {
                self.enter_idle(now);
                Step::Progress
            }
        }
    }

    /// Counts a failed command. Returns `true` if this was one too many, and
    /// the driver has stopped.
    fn record_failure(&mut self, now: Instant) -> bool {
        self.consecutive_failures += 1;
        if self.consecutive_failures < self.config.max_consecutive_failures {
            return false;
        }

        error!(
            "{} consecutive failures, waiting to be re-initialised",
            self.consecutive_failures
        );
        self.initialised = false;
        self.desired.init_requested = false;
        self.enter(ProtocolState::Error, now);
        true
    }

    /// Sends a command, and waits for its reply in the `awaiting` state.
    fn dispatch(&mut self, family: Family, awaiting: ProtocolState, now: Instant) -> Step {
        match self.send_family(family, now) {
            Ok(()) => {
                self.enter(awaiting, now);
                Step::Progress
            }

            Err(e) => {
                warn!("failed to send {family:?}: {e}");
                let bring_up = awaiting.is_bring_up() || self.state.is_bring_up();
                if self.record_failure(now) {
                    return Step::Wait;
                }

                if bring_up {
                    self.configured = false;
                    self.enter(ProtocolState::Initializing, now);
                } else if self.state.is_awaiting() {
                    self.enter_idle(now);
                }
                Step::Wait
            }
        }
    }

    fn enter(&mut self, state: ProtocolState, now: Instant) {
        if state != self.state {
            debug!("{:?} -> {state:?}", self.state);
        }
        self.previous_state = self.state;
        self.state = state;
        self.state_entered = now;
        self.busy_retries = 0;
        self.retransmit_at = None;
        if matches!(state, ProtocolState::PoweredOn | ProtocolState::PoweredOff) {
            self.idle_since = now;
        }
        self.updated |= StateUpdate::PROTOCOL_STATE;
    }

    fn enter_idle(&mut self, now: Instant) {
        let s = if self.actual.power {
            ProtocolState::PoweredOn
        } else {
            ProtocolState::PoweredOff
        };
        self.enter(s, now);
    }

    pub(crate) fn require_extended(&self) -> Result {
        if self.config.variant.is_extended() {
            Ok(())
        } else {
            Err(Error::FeatureUnavailable)
        }
    }

    /// Turns the camera on or off.
    pub fn power(&mut self, on: bool) {
        self.desired.power = on;
    }

    pub fn is_powered(&self) -> bool {
        self.actual.power
    }

    /// `true` once the pan/tilt head has been initialised since the camera
    /// was last powered on.
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn digital_zoom(&self) -> DigitalZoom {
        self.actual.digital_zoom
    }

    /// Sets the digital zoom multiplier (VC-C50i only).
    pub fn set_digital_zoom(&mut self, zoom: DigitalZoom) -> Result {
        self.require_extended()?;
        self.desired.digital_zoom = zoom;
        Ok(())
    }

    /// Sets the digital zoom level, from `0` (1x) to `3` (8x).
    pub fn set_digital_zoom_level(&mut self, level: u8) -> Result {
        let zoom = DigitalZoom::from_u8(level).ok_or(Error::ParameterOutOfRange)?;
        self.set_digital_zoom(zoom)
    }

    pub fn focus_mode(&self) -> FocusMode {
        self.actual.focus
    }

    pub fn set_focus_mode(&mut self, mode: FocusMode) {
        self.desired.focus = mode;
    }

    /// Auto-focuses on a near object.
    pub fn focus_near(&mut self) {
        self.set_focus_mode(FocusMode::Near);
    }

    /// Auto-focuses on a far object.
    pub fn focus_far(&mut self) {
        self.set_focus_mode(FocusMode::Far);
    }

    pub fn led_control_mode(&self) -> LedMode {
        self.actual.led
    }

    pub fn set_led_control_mode(&mut self, mode: LedMode) {
        self.desired.led = mode;
    }

    /// Turns on the IR lighting LEDs (VC-C50i only).
    ///
    /// The LEDs are only switched on while the IR cut filter is enabled.
    pub fn enable_ir_leds(&mut self) -> Result {
        self.require_extended()?;
        self.desired.ir_leds = true;
        Ok(())
    }

    pub fn disable_ir_leds(&mut self) -> Result {
        self.require_extended()?;
        self.desired.ir_leds = false;
        Ok(())
    }

    pub fn ir_leds_enabled(&self) -> bool {
        self.actual.ir_leds
    }

    /// Enables the IR cut filter (night mode, VC-C50i only).
    pub fn enable_ir_filter(&mut self) -> Result {
        self.require_extended()?;
        self.desired.ir_filter = true;
        Ok(())
    }

    /// Disables the IR cut filter. This also turns off the IR LEDs.
    pub fn disable_ir_filter(&mut self) -> Result {
        self.require_extended()?;
        self.desired.ir_filter = false;
        Ok(())
    }

    pub fn ir_filter_enabled(&self) -> bool {
        self.actual.ir_filter
    }

    pub fn enable_auto_update(&mut self) {
        self.auto_update = true;
    }

    pub fn disable_auto_update(&mut self) {
        self.auto_update = false;
    }

    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    /// The product name reported by the camera, once known.
    pub fn product_name(&self) -> Option<&str> {
        self.actual.product_name.as_deref()
    }

    pub fn comm_state(&self) -> CommState {
        self.comm_state
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    pub fn previous_state(&self) -> ProtocolState {
        self.previous_state
    }

    pub fn desired(&self) -> &DesiredState {
        &self.desired
    }

    pub fn sent(&self) -> &SentState {
        &self.sent
    }

    pub fn actual(&self) -> &ActualState {
        &self.actual
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// When the last frame was sent.
    pub fn last_sent(&self) -> Option<Instant> {
        self.last_sent
    }

    /// `true` if the camera reported an error (or failed to reply) during
    /// the last tick.
    pub fn was_error(&self) -> bool {
        self.was_error
    }

    /// What changed during the last tick.
    pub fn updated_fields(&self) -> StateUpdate {
        self.updated
    }

    /// Adds an error callback, to run before all others.
    pub fn push_error_callback_front<F>(&mut self, f: F) -> CallbackHandle
    where
        F: FnMut() + Send + 'static,
    {
        self.callbacks.push_front(Box::new(f))
    }

    /// Adds an error callback, to run after all others.
    pub fn push_error_callback_back<F>(&mut self, f: F) -> CallbackHandle
    where
        F: FnMut() + Send + 'static,
    {
        self.callbacks.push_back(Box::new(f))
    }

    /// Removes an error callback. Returns `false` if it was not registered.
    pub fn remove_error_callback(&mut self, handle: CallbackHandle) -> bool {
        self.callbacks.remove(handle)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T> std::fmt::Debug for Vcc4<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vcc4")
            .field("state", &self.state)
            .field("comm_state", &self.comm_state)
            .field("desired", &self.desired)
            .field("sent", &self.sent)
            .field("actual", &self.actual)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{config::CameraVariant, protocol::units::units_to_degrees, Ptz};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    const OK: &str = "fe30003000ef";
    const BUSY: &str = "fe30003100ef";
    const PARAM: &str = "fe30003500ef";
    const C50I: &str = "fe3000303043353069ef";
    const ZOOM_LIMIT_1920: &str = "fe3000303030373830ef";

    const CONTROL_MODE: &str = "ff30009030ef";
    const TILT_SLEW_MAX: &str = "ff30005130323635ef";
    const PAN_SLEW_MAX: &str = "ff30005030333230ef";
    const PAN_RANGE: &str = "ff300064303743393938333637ef";
    const POWER_ON: &str = "ff3000a031ef";
    const POWER_OFF: &str = "ff3000a030ef";
    const INIT: &str = "ff30005830ef";
    const PRODUCT_NAME: &str = "ff300087ef";
    const POSITION_REQUEST: &str = "ff300063ef";
    const ZOOM_REQUEST: &str = "ff3000b430ef";
    const ZOOM_LIMIT_REQUEST: &str = "ff3000b431ef";

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<u8>>,
        fail: bool,
    }

    impl Transport for Recorder {
        fn send(&mut self, frame: &[u8]) -> Result {
            if self.fail {
                return Err(Error::ChannelUnavailable);
            }
            self.frames.push(frame.to_vec());
            Ok(())
        }
    }

    impl Recorder {
        fn hex(&self) -> Vec<String> {
            self.frames.iter().map(hex::encode).collect()
        }

        fn last(&self) -> Option<String> {
            self.frames.last().map(hex::encode)
        }
    }

    fn camera(comm_mode: CommState) -> Vcc4<Recorder> {
        Vcc4::new(
            Recorder::default(),
            Config {
                comm_mode,
                auto_update: false,
                ..Default::default()
            },
        )
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn reply(cam: &mut Vcc4<Recorder>, frame: &str) -> Result {
        cam.receive(&hex::decode(frame)?);
        Ok(())
    }

    fn error_counter(cam: &mut Vcc4<Recorder>) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        cam.push_error_callback_back(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    /// Runs through bring-up, replying to everything. Returns the time of the
    /// last tick.
    fn bring_up(cam: &mut Vcc4<Recorder>, mut now: Instant) -> Result<Instant> {
        cam.init()?;
        cam.tick_at(now);
        for _ in 0..12 {
            if cam.state() == ProtocolState::PoweredOn {
                break;
            }
            now += ms(10);
            let r = match cam.state() {
                ProtocolState::AwaitingProductNameRequest => C50I,
                ProtocolState::AwaitingZoomRequest => ZOOM_LIMIT_1920,
                _ => OK,
            };
            reply(cam, r)?;
            cam.tick_at(now);
        }
        assert_eq!(ProtocolState::PoweredOn, cam.state());
        Ok(now)
    }

    /// Runs through bring-up without any replies. Returns the time of the
    /// last tick.
    fn bring_up_unidirectional(cam: &mut Vcc4<Recorder>, t0: Instant) -> Result<Instant> {
        cam.init()?;
        for t in [0, 300, 600, 900, 1200, 1500, 5500, 5800] {
            cam.tick_at(t0 + ms(t));
        }
        assert_eq!(ProtocolState::PoweredOn, cam.state());
        Ok(t0 + ms(5800))
    }

    #[test]
    fn bidirectional_bring_up() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let now = Instant::now();

        // Nothing happens until asked
        cam.tick_at(now);
        assert_eq!(ProtocolState::Uninitialized, cam.state());
        assert!(cam.transport().frames.is_empty());

        bring_up(&mut cam, now)?;
        assert_eq!(
            vec![
                CONTROL_MODE,
                TILT_SLEW_MAX,
                PAN_SLEW_MAX,
                PAN_RANGE,
                POWER_ON,
                INIT,
                PRODUCT_NAME,
                ZOOM_LIMIT_REQUEST,
            ],
            cam.transport().hex()
        );
        assert_eq!(1920, cam.max_zoom());
        assert_eq!(0, cam.zoom());
        assert!(cam.is_initialised());
        assert!(cam.is_powered());
        assert_eq!(Some("C50i"), cam.product_name());
        assert_eq!(90., cam.pan_slew());
        assert_eq!(69., cam.tilt_slew());
        assert_eq!(CommState::Bidirectional, cam.comm_state());
        assert!(!cam.was_error());
        Ok(())
    }

    #[test]
    fn unknown_becomes_bidirectional() -> Result {
        let mut cam = camera(CommState::Unknown);
        let now = Instant::now();
        cam.init()?;
        cam.tick_at(now);
        assert_eq!(ProtocolState::SettingControlMode, cam.state());
        assert!(!cam.can_get_real_pan_tilt());

        reply(&mut cam, OK)?;
        let updated = cam.tick_at(now + ms(10));
        assert!(updated.contains(StateUpdate::COMM_STATE));
        assert_eq!(CommState::Bidirectional, cam.comm_state());
        assert_eq!(ProtocolState::SettingInitTiltRate, cam.state());
        assert!(cam.can_get_real_pan_tilt());

        // Only once
        reply(&mut cam, OK)?;
        let updated = cam.tick_at(now + ms(20));
        assert!(!updated.contains(StateUpdate::COMM_STATE));
        assert_eq!(CommState::Bidirectional, cam.comm_state());
        Ok(())
    }

    #[test]
    fn unidirectional_timeouts_succeed() -> Result {
        let mut cam = camera(CommState::Unidirectional);
        let errors = error_counter(&mut cam);
        let t0 = Instant::now();
        cam.init()?;

        cam.tick_at(t0);
        assert_eq!(1, cam.transport().frames.len());
        cam.tick_at(t0 + ms(299));
        assert_eq!(1, cam.transport().frames.len());
        cam.tick_at(t0 + ms(300));
        assert_eq!(Some(TILT_SLEW_MAX.to_string()), cam.transport().last());

        cam.tick_at(t0 + ms(600));
        cam.tick_at(t0 + ms(900));
        assert_eq!(Some(PAN_RANGE.to_string()), cam.transport().last());
        cam.tick_at(t0 + ms(1200));
        assert_eq!(Some(POWER_ON.to_string()), cam.transport().last());

        // Power on gets extra time to settle.
        cam.tick_at(t0 + ms(1500));
        assert!(cam.is_powered());
        assert_eq!(ProtocolState::DelayedSwitch, cam.state());
        cam.tick_at(t0 + ms(5499));
        assert_eq!(ProtocolState::DelayedSwitch, cam.state());
        cam.tick_at(t0 + ms(5500));
        assert_eq!(ProtocolState::AwaitingInitialInit, cam.state());
        assert_eq!(Some(INIT.to_string()), cam.transport().last());

        cam.tick_at(t0 + ms(5800));
        assert_eq!(ProtocolState::PoweredOn, cam.state());
        assert!(cam.is_initialised());

        // No product name request without replies.
        assert_eq!(6, cam.transport().frames.len());
        assert_eq!(0, errors.load(Ordering::SeqCst));
        assert!(!cam.was_error());
        assert!(cam.request_real_pan_tilt().is_err());
        Ok(())
    }

    #[test]
    fn clamps_to_limits() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let now = bring_up(&mut cam, Instant::now())?;

        cam.set_pan(120.)?;
        cam.tick_at(now + ms(10));
        assert_eq!(
            Some("ff3000623833363738303030ef".to_string()),
            cam.transport().last()
        );
        assert_eq!(98., cam.sent().pan);
        assert_eq!(120., cam.desired().pan);

        // Nothing is known until the camera confirms.
        assert_eq!(0., cam.pan());
        reply(&mut cam, OK)?;
        let updated = cam.tick_at(now + ms(20));
        assert!(updated.contains(StateUpdate::PAN_TILT));
        assert!((cam.pan() - units_to_degrees(871)).abs() < 1e-9);

        // Still 98 degrees once clamped, so nothing more to send.
        let frames = cam.transport().frames.len();
        cam.set_pan(130.)?;
        cam.tick_at(now + ms(30));
        assert_eq!(frames, cam.transport().frames.len());

        cam.set_zoom(5000)?;
        cam.tick_at(now + ms(40));
        assert_eq!(Some("ff3000b330374138ef".to_string()), cam.transport().last());
        assert_eq!(1960, cam.sent().zoom);
        Ok(())
    }

    #[test]
    fn one_command_in_flight() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let now = bring_up(&mut cam, Instant::now())?;
        let frames = cam.transport().frames.len();

        cam.set_pan(10.)?;
        cam.tick_at(now + ms(10));
        assert_eq!(frames + 1, cam.transport().frames.len());

        cam.set_pan(20.)?;
        cam.set_zoom(100)?;
        cam.tick_at(now + ms(20));
        cam.tick_at(now + ms(30));
        assert_eq!(frames + 1, cam.transport().frames.len());
        assert_eq!(10., cam.sent().pan);

        // The next command goes as soon as the first is confirmed.
        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(40));
        assert_eq!(frames + 2, cam.transport().frames.len());
        assert_eq!(20., cam.sent().pan);
        assert_eq!(ProtocolState::AwaitingPanTiltResponse, cam.state());

        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(50));
        assert_eq!(ProtocolState::AwaitingZoomResponse, cam.state());
        assert_eq!(100, cam.sent().zoom);
        Ok(())
    }

    #[test]
    fn busy_retries_are_bounded() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let errors = error_counter(&mut cam);
        let now = bring_up(&mut cam, Instant::now())?;

        cam.set_pan(10.)?;
        cam.tick_at(now);
        let frames = cam.transport().frames.len();
        let frame = cam.transport().last();

        for i in 0..3 {
            let t = now + ms(10 + 200 * i);
            reply(&mut cam, BUSY)?;
            let updated = cam.tick_at(t);
            assert!(updated.contains(StateUpdate::ERROR));
            assert!(cam.was_error());
            assert_eq!(frames + i as usize, cam.transport().frames.len());

            // Retransmitted after the backoff.
            cam.tick_at(t + ms(99));
            assert_eq!(frames + i as usize, cam.transport().frames.len());
            cam.tick_at(t + ms(100));
            assert_eq!(frames + i as usize + 1, cam.transport().frames.len());
            assert_eq!(frame, cam.transport().last());
            assert!(!cam.was_error());
        }

        assert_eq!(ProtocolState::AwaitingPanTiltResponse, cam.state());
        assert_eq!(3, errors.load(Ordering::SeqCst));

        // One more is too many.
        reply(&mut cam, BUSY)?;
        cam.tick_at(now + ms(700));
        assert_eq!(ProtocolState::PoweredOn, cam.state());
        assert_eq!(4, errors.load(Ordering::SeqCst));

        // Neither sent nor actual state moved, and the command is abandoned.
        assert_eq!(10., cam.sent().pan);
        assert_eq!(0., cam.pan());
        cam.tick_at(now + ms(800));
        assert_eq!(frames + 3, cam.transport().frames.len());
        Ok(())
    }

    #[test]
    fn rejected_command() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let errors = error_counter(&mut cam);
        let now = bring_up(&mut cam, Instant::now())?;

        cam.set_zoom(1000)?;
        cam.tick_at(now);
        let frames = cam.transport().frames.len();
        reply(&mut cam, PARAM)?;
        cam.tick_at(now + ms(10));
        assert!(cam.was_error());
        assert_eq!(1, errors.load(Ordering::SeqCst));
        assert_eq!(ProtocolState::PoweredOn, cam.state());
        assert_eq!(0, cam.zoom());

        cam.tick_at(now + ms(20));
        assert!(!cam.was_error());
        assert_eq!(frames, cam.transport().frames.len());

        // A new value is sent.
        cam.set_zoom(1001)?;
        cam.tick_at(now + ms(30));
        assert_eq!(frames + 1, cam.transport().frames.len());
        Ok(())
    }

    #[test]
    fn rejections_do_not_escalate() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let errors = error_counter(&mut cam);
        let now = bring_up(&mut cam, Instant::now())?;

        for i in 0..8 {
            let t = now + ms(20 * i);
            cam.set_zoom(100 + i as i32)?;
            cam.tick_at(t);
            assert_eq!(ProtocolState::AwaitingZoomResponse, cam.state());
            reply(&mut cam, PARAM)?;
            cam.tick_at(t + ms(10));
            assert_eq!(ProtocolState::PoweredOn, cam.state());
        }
        assert_eq!(8, errors.load(Ordering::SeqCst));

        cam.set_pan(10.)?;
        cam.tick_at(now + ms(200));
        assert_eq!(ProtocolState::AwaitingPanTiltResponse, cam.state());
        Ok(())
    }

    #[test]
    fn unidirectional_move_confirmed_by_timeout() -> Result {
        let mut cam = camera(CommState::Unidirectional);
        let errors = error_counter(&mut cam);
        let now = bring_up_unidirectional(&mut cam, Instant::now())?;

        cam.set_pan(45.)?;
        cam.tick_at(now);
        assert_eq!(ProtocolState::AwaitingPanTiltResponse, cam.state());

        cam.tick_at(now + ms(299));
        assert_eq!(0., cam.pan());
        assert_eq!(ProtocolState::AwaitingPanTiltResponse, cam.state());

        let updated = cam.tick_at(now + ms(300));
        assert!(updated.contains(StateUpdate::PAN_TILT));
        assert!((cam.pan() - 45.).abs() < 0.2);
        assert_eq!(ProtocolState::PoweredOn, cam.state());
        assert!(!cam.was_error());
        assert_eq!(0, errors.load(Ordering::SeqCst));
        Ok(())
    }

    #[test]
    fn zoom_limit_report() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        assert_eq!(1960, cam.max_zoom());
        let now = bring_up(&mut cam, Instant::now())?;
        assert_eq!(1920, cam.max_zoom());
        assert_eq!(Some(1920), cam.actual().zoom_limit);

        // Position reports don't touch the limit.
        cam.request_real_zoom()?;
        cam.tick_at(now);
        assert_eq!(Some(ZOOM_REQUEST.to_string()), cam.transport().last());
        reply(&mut cam, "fe3000303030334538ef")?;
        let updated = cam.tick_at(now + ms(10));
        assert!(updated.contains(StateUpdate::ZOOM));
        assert!(!updated.contains(StateUpdate::ZOOM_LIMIT));
        assert_eq!(0x3e8, cam.zoom());
        assert_eq!(1920, cam.max_zoom());
        Ok(())
    }

    #[test]
    fn position_report() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let now = bring_up(&mut cam, Instant::now())?;

        cam.request_real_pan_tilt()?;
        cam.tick_at(now);
        assert_eq!(Some(POSITION_REQUEST.to_string()), cam.transport().last());

        // Too long: ignored.
        reply(&mut cam, "fe300030303830303038303030ffef")?;
        cam.tick_at(now + ms(10));
        assert_eq!(ProtocolState::AwaitingPosRequest, cam.state());
        assert!(!cam.was_error());

        reply(&mut cam, "fe300030303833363737454636ef")?;
        let updated = cam.tick_at(now + ms(20));
        assert!(updated.contains(StateUpdate::PAN_TILT));
        assert!((cam.pan() - units_to_degrees(871)).abs() < 1e-9);
        assert!((cam.tilt() - units_to_degrees(-266)).abs() < 1e-9);

        cam.request_real_zoom()?;
        cam.tick_at(now + ms(30));
        assert_eq!(Some(ZOOM_REQUEST.to_string()), cam.transport().last());
        reply(&mut cam, "fe3000303030334538ef")?;
        cam.tick_at(now + ms(40));
        assert_eq!(0x3e8, cam.zoom());
        Ok(())
    }

    #[test]
    fn malformed_response_changes_nothing() -> Result {
        let mut cam = camera(CommState::Unknown);
        let now = Instant::now();
        cam.init()?;
        cam.tick_at(now);

        reply(&mut cam, "fe300030303830303038303030ffef")?;
        let updated = cam.tick_at(now + ms(10));
        assert_eq!(CommState::Unknown, cam.comm_state());
        assert_eq!(ProtocolState::SettingControlMode, cam.state());
        assert!(updated.is_empty());
        assert_eq!(1, cam.transport().frames.len());
        Ok(())
    }

    #[test]
    fn bad_payload_times_out() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let now = bring_up(&mut cam, Instant::now())?;

        cam.request_real_pan_tilt()?;
        cam.tick_at(now);
        reply(&mut cam, "fe300030303833363737454647ef")?;
        cam.tick_at(now + ms(10));
        assert_eq!(ProtocolState::AwaitingPosRequest, cam.state());

        cam.tick_at(now + ms(5000));
        assert!(cam.was_error());
        assert_eq!(ProtocolState::PoweredOn, cam.state());
        assert_eq!(0., cam.pan());
        Ok(())
    }

    #[test]
    fn auto_update() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        cam.enable_auto_update();
        let now = bring_up(&mut cam, Instant::now())?;
        let frames = cam.transport().frames.len();

        cam.tick_at(now + ms(1999));
        assert_eq!(frames, cam.transport().frames.len());
        cam.tick_at(now + ms(2000));
        assert_eq!(Some(POSITION_REQUEST.to_string()), cam.transport().last());

        reply(&mut cam, "fe300030303830303038303030ef")?;
        cam.tick_at(now + ms(2010));
        assert_eq!(ProtocolState::PoweredOn, cam.state());

        cam.tick_at(now + ms(4009));
        assert_eq!(frames + 1, cam.transport().frames.len());
        cam.tick_at(now + ms(4010));
        assert_eq!(Some(ZOOM_REQUEST.to_string()), cam.transport().last());

        reply(&mut cam, "fe3000303030303130ef")?;
        cam.tick_at(now + ms(4020));
        assert_eq!(0x10, cam.zoom());

        cam.disable_auto_update();
        cam.tick_at(now + ms(9000));
        assert_eq!(frames + 2, cam.transport().frames.len());
        Ok(())
    }

    #[test]
    fn escalation_and_recovery() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let errors = error_counter(&mut cam);
        let t0 = Instant::now();
        cam.init()?;
        cam.tick_at(t0);

        for i in 1..=4 {
            cam.tick_at(t0 + ms(5000 * i));
            assert_eq!(ProtocolState::SettingControlMode, cam.state());
            assert_eq!(i as usize + 1, cam.transport().frames.len());
        }

        cam.tick_at(t0 + ms(25000));
        assert_eq!(ProtocolState::Error, cam.state());
        assert_eq!(5, errors.load(Ordering::SeqCst));

        // Stays put
        cam.tick_at(t0 + ms(60000));
        assert_eq!(ProtocolState::Error, cam.state());
        assert_eq!(5, cam.transport().frames.len());

        cam.init()?;
        cam.tick_at(t0 + ms(60010));
        assert_eq!(ProtocolState::SettingControlMode, cam.state());
        assert_eq!(Some(CONTROL_MODE.to_string()), cam.transport().last());
        Ok(())
    }

    #[test]
    fn transmit_failures() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let errors = error_counter(&mut cam);
        cam.transport_mut().fail = true;
        let t0 = Instant::now();
        cam.init()?;

        for i in 0..4 {
            cam.tick_at(t0 + ms(10 * i));
            assert_eq!(ProtocolState::Initializing, cam.state());
        }
        cam.tick_at(t0 + ms(40));
        assert_eq!(ProtocolState::Error, cam.state());
        assert_eq!(0, errors.load(Ordering::SeqCst));
        Ok(())
    }

    #[test]
    fn power_cycle() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let now = bring_up(&mut cam, Instant::now())?;

        cam.power(false);
        cam.tick_at(now);
        assert_eq!(Some(POWER_OFF.to_string()), cam.transport().last());
        reply(&mut cam, OK)?;
        let updated = cam.tick_at(now + ms(10));
        assert!(updated.contains(StateUpdate::POWER));
        assert!(!cam.is_powered());
        assert!(!cam.is_initialised());
        assert_eq!(ProtocolState::PoweredOff, cam.state());

        cam.power(true);
        cam.tick_at(now + ms(20));
        assert_eq!(ProtocolState::PoweringOn, cam.state());
        assert_eq!(Some(POWER_ON.to_string()), cam.transport().last());

        // Powering on goes through initialisation again.
        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(30));
        assert_eq!(ProtocolState::AwaitingInitialInit, cam.state());
        assert_eq!(Some(INIT.to_string()), cam.transport().last());
        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(40));
        assert!(cam.is_initialised());
        assert_eq!(Some(PRODUCT_NAME.to_string()), cam.transport().last());
        Ok(())
    }

    #[test]
    fn reset_repeats_configuration() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let now = bring_up(&mut cam, Instant::now())?;

        cam.init()?;
        cam.tick_at(now + ms(10));
        assert_eq!(Some(INIT.to_string()), cam.transport().last());
        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(20));

        reply(&mut cam, C50I)?;
        cam.tick_at(now + ms(30));
        assert_eq!(Some(ZOOM_LIMIT_REQUEST.to_string()), cam.transport().last());
        reply(&mut cam, ZOOM_LIMIT_1920)?;
        cam.tick_at(now + ms(35));
        assert_eq!(ProtocolState::PoweredOn, cam.state());

        cam.reset()?;
        cam.tick_at(now + ms(40));
        assert_eq!(Some(CONTROL_MODE.to_string()), cam.transport().last());
        Ok(())
    }

    #[test]
    fn halt_refreshes_position() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let now = bring_up(&mut cam, Instant::now())?;

        cam.halt_pan_tilt()?;
        cam.tick_at(now);
        assert_eq!(Some("ff30005330ef".to_string()), cam.transport().last());
        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(10));
        assert_eq!(Some(POSITION_REQUEST.to_string()), cam.transport().last());

        reply(&mut cam, "fe300030303831313838303030ef")?;
        cam.tick_at(now + ms(20));
        assert_eq!(ProtocolState::PoweredOn, cam.state());

        cam.halt_zoom()?;
        cam.tick_at(now + ms(30));
        assert_eq!(Some("ff3000a230ef".to_string()), cam.transport().last());
        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(40));
        assert_eq!(Some(ZOOM_REQUEST.to_string()), cam.transport().last());
        Ok(())
    }

    #[test]
    fn ir_lighting() -> Result {
        let mut cam = Vcc4::new(
            Recorder::default(),
            Config {
                comm_mode: CommState::Bidirectional,
                variant: CameraVariant::Extended,
                auto_update: false,
                ..Default::default()
            },
        );
        let now = bring_up(&mut cam, Instant::now())?;
        let frames = cam.transport().frames.len();

        // LEDs need the filter.
        cam.enable_ir_leds()?;
        cam.tick_at(now);
        assert_eq!(frames, cam.transport().frames.len());

        cam.enable_ir_filter()?;
        cam.tick_at(now + ms(10));
        assert_eq!(Some("ff3000b531ef".to_string()), cam.transport().last());
        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(20));
        assert!(cam.ir_filter_enabled());
        assert_eq!(Some("ff30007631ef".to_string()), cam.transport().last());
        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(30));
        assert!(cam.ir_leds_enabled());

        // Disabling the filter turns the LEDs off too.
        cam.disable_ir_filter()?;
        cam.tick_at(now + ms(40));
        assert_eq!(Some("ff3000b530ef".to_string()), cam.transport().last());
        reply(&mut cam, OK)?;
        let updated = cam.tick_at(now + ms(50));
        assert!(updated.contains(StateUpdate::IR_FILTER | StateUpdate::IR_LEDS));
        assert!(!cam.ir_filter_enabled());
        assert!(!cam.ir_leds_enabled());
        assert_eq!(ProtocolState::PoweredOn, cam.state());
        assert_eq!(frames + 3, cam.transport().frames.len());

        cam.set_digital_zoom_level(3)?;
        cam.tick_at(now + ms(60));
        assert_eq!(Some("ff3000b733ef".to_string()), cam.transport().last());
        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(70));
        assert_eq!(DigitalZoom::X8, cam.digital_zoom());
        assert!(matches!(
            cam.set_digital_zoom_level(4),
            Err(Error::ParameterOutOfRange)
        ));
        Ok(())
    }

    #[test]
    fn base_variant_features() {
        let mut cam = camera(CommState::Bidirectional);
        assert!(matches!(cam.enable_ir_leds(), Err(Error::FeatureUnavailable)));
        assert!(matches!(cam.enable_ir_filter(), Err(Error::FeatureUnavailable)));
        assert!(matches!(
            cam.set_digital_zoom(DigitalZoom::X2),
            Err(Error::FeatureUnavailable)
        ));
        assert_eq!(4.4, cam.fov_at_max_zoom());
        assert_eq!(45., cam.fov_at_min_zoom());
    }

    #[test]
    fn led_and_focus() -> Result {
        let mut cam = Vcc4::new(
            Recorder::default(),
            Config {
                comm_mode: CommState::Bidirectional,
                auto_update: false,
                disable_led: true,
                ..Default::default()
            },
        );
        let now = bring_up(&mut cam, Instant::now())?;

        // The LED is turned off straight after initialising.
        let frames = cam.transport().hex();
        let init = frames.iter().position(|f| f == INIT);
        let led = frames.iter().position(|f| f == "ff30008e32ef");
        assert!(led.is_some());
        assert!(init < led);
        assert_eq!(LedMode::Off, cam.led_control_mode());

        cam.focus_far();
        cam.tick_at(now + ms(20));
        assert_eq!(Some("ff3000a133ef".to_string()), cam.transport().last());
        reply(&mut cam, OK)?;
        cam.tick_at(now + ms(30));
        assert_eq!(FocusMode::Far, cam.focus_mode());
        Ok(())
    }

    #[test]
    fn callbacks_run_in_order() -> Result {
        let mut cam = camera(CommState::Bidirectional);
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));

        let l = log.clone();
        let b = cam.push_error_callback_back(move || l.lock().unwrap().push("b"));
        let l = log.clone();
        cam.push_error_callback_front(move || l.lock().unwrap().push("a"));
        let l = log.clone();
        cam.push_error_callback_back(move || l.lock().unwrap().push("c"));

        let now = Instant::now();
        cam.init()?;
        cam.tick_at(now);
        reply(&mut cam, PARAM)?;
        cam.tick_at(now + ms(10));
        assert_eq!(vec!["a", "b", "c"], *log.lock().unwrap());

        assert!(cam.remove_error_callback(b));
        assert!(!cam.remove_error_callback(b));
        cam.tick_at(now + ms(5010));
        assert_eq!(vec!["a", "b", "c", "a", "c"], *log.lock().unwrap());
        Ok(())
    }

    #[test]
    fn rejects_non_finite() {
        let mut cam = camera(CommState::Bidirectional);
        assert!(cam.set_pan(f64::NAN).is_err());
        assert!(cam.set_tilt(f64::INFINITY).is_err());
        assert!(cam.set_pan_tilt(1., f64::NAN).is_err());
        assert_eq!(0., cam.desired().pan);
        assert!(cam.set_pan_slew(f64::NEG_INFINITY).is_err());
    }
}

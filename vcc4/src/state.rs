use crate::protocol::{
    units::{MAX_PAN_SLEW, MAX_TILT_SLEW},
    DigitalZoom, FocusMode, LedMode,
};

bitflags! {
    /// Summary of what changed during a single [tick][crate::Vcc4::tick].
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
    pub struct StateUpdate: u32 {
        const PAN_TILT       = 1;
        const ZOOM           = 1 << 1;
        const PAN_SLEW       = 1 << 2;
        const TILT_SLEW      = 1 << 3;
        const POWER          = 1 << 4;
        /// The pan/tilt head finished initialising.
        const INITIALISED    = 1 << 5;
        const PRODUCT_NAME   = 1 << 6;
        const LED            = 1 << 7;
        const IR_FILTER      = 1 << 8;
        const IR_LEDS        = 1 << 9;
        const DIGITAL_ZOOM   = 1 << 10;
        const FOCUS          = 1 << 11;
        /// The camera replied for the first time.
        const COMM_STATE     = 1 << 12;
        const PROTOCOL_STATE = 1 << 13;
        const ZOOM_LIMIT     = 1 << 14;

        const POSITION = Self::PAN_TILT.bits() | Self::ZOOM.bits();
        /// A command failed, or the camera reported an error.
        const ERROR          = 1 << 31;
    }
}

/// What the caller wants the camera to do.
///
/// Angles are in degrees, and are stored as given: they are only clamped to
/// the camera's limits when sent.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredState {
    pub pan: f64,
    pub tilt: f64,
    pub zoom: i32,
    pub digital_zoom: DigitalZoom,
    pub focus: FocusMode,
    /// Degrees per second.
    pub pan_slew: f64,
    /// Degrees per second.
    pub tilt_slew: f64,
    pub power: bool,
    pub ir_filter: bool,
    pub ir_leds: bool,
    pub led: LedMode,
    pub init_requested: bool,
    pub halt_pan_tilt: bool,
    pub halt_zoom: bool,
    pub real_pan_tilt_requested: bool,
    pub real_zoom_requested: bool,
}

impl Default for DesiredState {
    fn default() -> Self {
        Self {
            pan: 0.,
            tilt: 0.,
            zoom: 0,
            digital_zoom: DigitalZoom::default(),
            focus: FocusMode::default(),
            pan_slew: MAX_PAN_SLEW,
            tilt_slew: MAX_TILT_SLEW,
            power: false,
            ir_filter: false,
            ir_leds: false,
            led: LedMode::default(),
            init_requested: false,
            halt_pan_tilt: false,
            halt_zoom: false,
            real_pan_tilt_requested: false,
            real_zoom_requested: false,
        }
    }
}

/// The values carried by the most recent frame sent for each kind of
/// command.
///
/// The default value is what the camera does after it powers on.
#[derive(Debug, Clone, PartialEq)]
pub struct SentState {
    /// Degrees, after clamping.
    pub pan: f64,
    /// Degrees, after clamping.
    pub tilt: f64,
    pub zoom: u16,
    pub pan_slew: f64,
    pub tilt_slew: f64,
    pub digital_zoom: DigitalZoom,
    pub focus: FocusMode,
    pub power: bool,
    pub ir_filter: bool,
    pub ir_leds: bool,
    pub led: LedMode,
}

impl Default for SentState {
    fn default() -> Self {
        Self {
            pan: 0.,
            tilt: 0.,
            zoom: 0,
            pan_slew: MAX_PAN_SLEW,
            tilt_slew: MAX_TILT_SLEW,
            digital_zoom: DigitalZoom::default(),
            focus: FocusMode::default(),
            power: false,
            ir_filter: false,
            ir_leds: false,
            led: LedMode::default(),
        }
    }
}

/// What the camera has confirmed or reported.
///
/// Pan, tilt and zoom are only ever written from a reply (or, when the camera
/// doesn't reply, the assumed success of the command which set them).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActualState {
    /// Degrees.
    pub pan: f64,
    /// Degrees.
    pub tilt: f64,
    pub zoom: u16,
    pub pan_slew: f64,
    pub tilt_slew: f64,
    /// Four character product name, when the camera has reported it.
    pub product_name: Option<String>,
    /// Maximum optical zoom position, when the camera has reported it.
    pub zoom_limit: Option<u16>,
    pub power: bool,
    pub ir_filter: bool,
    pub ir_leds: bool,
    pub led: LedMode,
    pub focus: FocusMode,
    pub digital_zoom: DigitalZoom,
}

/// States of the protocol state machine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolState {
    #[default]
    Uninitialized,
    /// Bring-up hub: decides which bring-up command to send next.
    Initializing,
    SettingControlMode,
    SettingInitTiltRate,
    SettingInitPanRate,
    SettingInitRange,
    AwaitingInitialPowerOn,
    AwaitingInitialInit,
    /// Idle, with the camera on.
    PoweredOn,
    /// Idle, with the camera off.
    PoweredOff,

    AwaitingPanTiltResponse,
    AwaitingZoomResponse,
    AwaitingStopPanTiltResponse,
    AwaitingStopZoomResponse,
    AwaitingPanSlewResponse,
    AwaitingTiltSlewResponse,
    AwaitingPosRequest,
    AwaitingZoomRequest,
    AwaitingLedControlResponse,
    AwaitingIrLedsResponse,
    AwaitingIrFilterResponse,
    AwaitingDigitalZoomResponse,
    AwaitingFocusResponse,
    AwaitingProductNameRequest,

    /// Waiting for a delay to elapse before entering another state.
    DelayedSwitch,
    /// Too many consecutive failures. Only left by re-initialising.
    Error,
    PoweringOn,
    PoweringOff,
}

impl ProtocolState {
    /// `true` if a command is in flight in this state.
    pub const fn is_awaiting(&self) -> bool {
        !matches!(
            self,
            Self::Uninitialized
                | Self::Initializing
                | Self::PoweredOn
                | Self::PoweredOff
                | Self::DelayedSwitch
                | Self::Error
        )
    }

    /// `true` for states which are part of the bring-up sequence.
    pub const fn is_bring_up(&self) -> bool {
        matches!(
            self,
            Self::Initializing
                | Self::SettingControlMode
                | Self::SettingInitTiltRate
                | Self::SettingInitPanRate
                | Self::SettingInitRange
                | Self::AwaitingInitialPowerOn
                | Self::AwaitingInitialInit
        )
    }
}

/// A kind of command, as sent by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    ControlMode,
    Init,
    DefaultRange,
    PowerOn,
    PowerOff,
    PanTilt,
    Zoom,
    StopPanTilt,
    StopZoom,
    PanSlew,
    TiltSlew,
    PositionRequest,
    ZoomRequest,
    ZoomLimitRequest,
    ProductNameRequest,
    LedControl,
    IrFilter,
    IrLeds,
    DigitalZoom,
    Focus,
}

/// How a command round trip ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The camera accepted the command, or (without replies) the command was
    /// given enough time.
    Confirmed,
    /// The camera reported an error.
    Rejected,
    /// No reply arrived in time.
    TimedOut,
}

/// Where to go after a round trip ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Send a command, and wait for its reply in the given state.
    Dispatch(Family, ProtocolState),
    /// Enter a state immediately.
    Enter(ProtocolState),
    /// Enter a state once the camera has had time to finish powering on or
    /// off. This is only delayed when the camera doesn't reply.
    Settle(ProtocolState),
    /// Return to [`PoweredOn`][ProtocolState::PoweredOn] or
    /// [`PoweredOff`][ProtocolState::PoweredOff], depending on the camera's
    /// power state.
    Idle,
}

/// The transition table.
pub(crate) fn transition(state: ProtocolState, event: Event) -> Next {
    use Event::*;
    use ProtocolState::*;

    match (state, event) {
        (SettingControlMode, Confirmed) => Next::Dispatch(Family::TiltSlew, SettingInitTiltRate),
        (SettingInitTiltRate, Confirmed) => Next::Dispatch(Family::PanSlew, SettingInitPanRate),
        (SettingInitPanRate, Confirmed) => Next::Dispatch(Family::DefaultRange, SettingInitRange),
        (SettingInitRange, Confirmed) => Next::Enter(Initializing),
        (AwaitingInitialPowerOn, Confirmed) => Next::Settle(Initializing),
        (AwaitingInitialInit, Confirmed) => Next::Idle,

        // Any bring-up failure starts bring-up again.
        (
            SettingControlMode | SettingInitTiltRate | SettingInitPanRate | SettingInitRange
            | AwaitingInitialPowerOn | AwaitingInitialInit,
            Rejected | TimedOut,
        ) => Next::Enter(Initializing),

        (PoweringOn, Confirmed) => Next::Settle(Initializing),
        (PoweringOff, Confirmed) => Next::Settle(PoweredOff),

        _ => Next::Idle,
    }
}

//! Driver configuration.
use crate::protocol::DEFAULT_DEVICE_ID;
use std::time::Duration;

/// Whether the camera is able to reply to commands.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum CommState {
    /// Not known yet. Treated as [`Unidirectional`][Self::Unidirectional]
    /// until the first valid reply arrives.
    #[default]
    Unknown,
    /// The camera replies to every command.
    Bidirectional,
    /// The camera never replies.
    Unidirectional,
}

impl CommState {
    #[inline]
    pub const fn is_bidirectional(&self) -> bool {
        matches!(self, Self::Bidirectional)
    }
}

/// Camera model.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum CameraVariant {
    /// Canon VC-C4.
    #[default]
    Base,
    /// Canon VC-C50i, which adds an IR cut filter, IR lighting LEDs and
    /// digital zoom.
    Extended,
}

impl CameraVariant {
    /// Horizontal field of view at the minimum zoom position, in degrees.
    pub const fn fov_at_min_zoom(&self) -> f64 {
        match self {
            Self::Base => 45.,
            Self::Extended => 47.7,
        }
    }

    /// Horizontal field of view at the maximum zoom position, in degrees.
    pub const fn fov_at_max_zoom(&self) -> f64 {
        match self {
            Self::Base => 4.4,
            Self::Extended => 1.9,
        }
    }

    #[inline]
    pub const fn is_extended(&self) -> bool {
        matches!(self, Self::Extended)
    }
}

/// Timeouts and delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Timing {
    /// How long to wait for a reply when the camera is known to reply.
    pub bidirectional_timeout: Duration,
    /// How long a command is assumed to take when the camera doesn't reply.
    pub unidirectional_timeout: Duration,
    /// Interval between automatic position and zoom queries.
    pub auto_update_interval: Duration,
    /// Time allowed for the camera to power on or off, when the camera
    /// doesn't reply.
    pub power_settle: Duration,
    /// Delay before retransmitting a command which the camera was too busy
    /// to accept.
    pub busy_backoff: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            bidirectional_timeout: Duration::from_millis(5000),
            unidirectional_timeout: Duration::from_millis(300),
            auto_update_interval: Duration::from_millis(2000),
            power_settle: Duration::from_millis(4000),
            busy_backoff: Duration::from_millis(100),
        }
    }
}

/// Driver configuration.
///
/// ```
/// use vcc4::{CameraVariant, CommState, Config};
///
/// let config = Config {
///     comm_mode: CommState::Bidirectional,
///     variant: CameraVariant::Extended,
///     ..Default::default()
/// };
/// assert_eq!(5, config.max_consecutive_failures);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Config {
    /// Device ID the camera answers to.
    pub device_id: u8,
    /// Starting communication mode. [`CommState::Unknown`] upgrades itself
    /// to [`CommState::Bidirectional`] when the camera replies; the other
    /// modes are fixed.
    pub comm_mode: CommState,
    pub variant: CameraVariant,
    /// Periodically query the camera's position and zoom while idle.
    pub auto_update: bool,
    /// Turn the status LED off, rather than leaving it under the camera's
    /// control.
    pub disable_led: bool,
    pub timing: Timing,
    /// Number of times a command is retransmitted after a `BUSY` reply before
    /// giving up on it.
    pub max_busy_retries: u8,
    /// Number of consecutive timeouts or transmit failures before the driver
    /// stops and waits to be re-initialised. Rejected commands only count
    /// during bring-up.
    pub max_consecutive_failures: u32,
    /// Smallest difference (in degrees, or zoom steps) between desired and
    /// sent values which warrants a new command.
    pub tolerance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_id: DEFAULT_DEVICE_ID,
            comm_mode: CommState::default(),
            variant: CameraVariant::default(),
            auto_update: true,
            disable_led: false,
            timing: Timing::default(),
            max_busy_retries: 3,
            max_consecutive_failures: 5,
            tolerance: 0.1,
        }
    }
}

impl Config {
    /// The reply timeout for a communication mode.
    pub(crate) fn timeout(&self, comm_state: CommState) -> Duration {
        match comm_state {
            CommState::Bidirectional => self.timing.bidirectional_timeout,
            CommState::Unidirectional | CommState::Unknown => self.timing.unidirectional_timeout,
        }
    }
}

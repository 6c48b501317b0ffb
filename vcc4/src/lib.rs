#![doc = include_str!("../README.md")]

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate tracing;

mod callbacks;
mod config;
mod dispatch;
mod driver;
mod error;
mod interpreter;
mod ptz;
#[cfg(feature = "serial")]
mod serial;
mod state;
mod transport;

#[cfg(feature = "serial")]
pub use crate::serial::Vcc4SerialChannel;
pub use {
    crate::{
        callbacks::CallbackHandle,
        config::{CameraVariant, CommState, Config, Timing},
        driver::Vcc4,
        error::Error,
        ptz::Ptz,
        state::{
            ActualState, DesiredState, Event, Family, Next, ProtocolState, SentState, StateUpdate,
        },
        transport::Transport,
    },
    vcc4_protocol as protocol,
};
pub type Result<T = ()> = std::result::Result<T, Error>;

#![doc = include_str!("../README.md")]

#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate tracing;

mod command;
mod error;
mod packet;
mod response;
pub mod units;
mod util;

pub use crate::{
    command::{
        Command, DigitalZoom, FocusMode, LedMode, RangeAxis, ZoomQuery, DEFAULT_DEVICE_ID, DELIM,
        FOOTER, HEADER, RESPONSE,
    },
    error::Error,
    packet::{CommandPacket, Request},
    response::{ErrorCode, PanTiltPosition, ProductName, Response, ZoomPosition},
};

/// Result type.
pub type Result<T = ()> = std::result::Result<T, Error>;

use std::io::Error as IoError;
use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[cfg(test)]
    #[error(transparent)]
    FromHexError(#[from] hex::FromHexError),

    #[error(transparent)]
    IoError(#[from] IoError),

    #[cfg(feature = "serial")]
    #[error(transparent)]
    Serial(#[from] serialport::Error),

    #[error(transparent)]
    Protocol(#[from] crate::protocol::Error),

    #[error("channel unavailable")]
    ChannelUnavailable,

    #[error("parameter out of valid range")]
    ParameterOutOfRange,

    #[error("camera does not support the requested feature")]
    FeatureUnavailable,
}

use std::str::Utf8Error;
use thiserror::Error;

/// Error types.
#[derive(Debug, Error)]
pub enum Error {
    #[cfg(test)]
    #[error(transparent)]
    FromHexError(#[from] hex::FromHexError),

    #[error(transparent)]
    Utf8(#[from] Utf8Error),

    #[error("invalid length")]
    InvalidLength,

    #[error("parameter out of valid range")]
    ParameterOutOfRange,

    #[error("malformed frame")]
    MalformedFrame,

    #[error("invalid hexadecimal digit in parameter field")]
    InvalidHexDigit,

    #[error("data parse error: {0}")]
    BinRwError(#[from] binrw::Error),
}

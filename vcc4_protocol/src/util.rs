//! # Internal utilities
use crate::{Error, Result};

/// Length of a positional parameter field, in bytes.
pub const HEX_FIELD_LENGTH: usize = 4;

/// Encodes `v` as four upper-case ASCII hexadecimal digits, most significant
/// digit first.
pub fn encode_hex_field(v: u16) -> [u8; HEX_FIELD_LENGTH] {
    let mut o = [0; HEX_FIELD_LENGTH];
    // Two digits per input byte, always.
    o.copy_from_slice(hex::encode_upper(v.to_be_bytes()).as_bytes());
    o
}

/// Decodes four ASCII hexadecimal digits (either case) into a value.
pub fn decode_hex_field(b: &[u8]) -> Result<u16> {
    if b.len() != HEX_FIELD_LENGTH {
        return Err(Error::InvalidLength);
    }

    let mut o = [0; 2];
    hex::decode_to_slice(b, &mut o).map_err(|_| Error::InvalidHexDigit)?;
    Ok(u16::from_be_bytes(o))
}

/// Converts a fixed-length, possibly null-padded ASCII field into a string.
pub fn str_from_ascii_field(b: &[u8]) -> Result<&str> {
    let end = b.iter().position(|c| *c == 0).unwrap_or(b.len());
    Ok(std::str::from_utf8(&b[..end])?.trim_end())
}

//! Byte stuffing for the reserved framing octets.
//!
//! A frame is delimited by [`START`] and [`END`], which therefore must
//! never appear inside it. Any data octet equal to a reserved value is
//! replaced by [`ESC`] followed by the octet XORed with [`ESC_XOR`].
//! Only the covered range plus the CRC trailer is stuffed; the
//! outermost delimiters travel bare.

use crate::errors::FramingError;

/// Frame start delimiter. Never stuffed, never valid inside a frame.
pub const START: u8 = 0x7E;

/// Frame end delimiter. Never stuffed, never valid inside a frame.
pub const END: u8 = 0x7F;

/// Escape introducer.
pub const ESC: u8 = 0x7D;

/// XOR mask applied to the octet following an escape.
pub const ESC_XOR: u8 = 0x20;

/// True when `octet` must be escaped inside a frame.
#[must_use]
pub const fn is_reserved(octet: u8) -> bool {
    matches!(octet, START | END | ESC)
}

/// Apply byte stuffing to `data`, appending the result to `out`.
pub fn stuff_into(data: &[u8], out: &mut Vec<u8>) {
    for &octet in data {
        if is_reserved(octet) {
            out.push(ESC);
            out.push(octet ^ ESC_XOR);
        } else {
            out.push(octet);
        }
    }
}

/// Byte-stuff `data` into a fresh buffer.
#[must_use]
pub fn stuff(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    stuff_into(data, &mut out);
    out
}

/// Reverse byte stuffing.
///
/// # Errors
///
/// [`FramingError::IncompleteEscape`] when `data` ends with an orphan
/// [`ESC`] octet.
pub fn unstuff(data: &[u8]) -> Result<Vec<u8>, FramingError> {
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter();
    while let Some(&octet) = iter.next() {
        if octet == ESC {
            let &next = iter.next().ok_or(FramingError::IncompleteEscape)?;
            out.push(next ^ ESC_XOR);
        } else {
            out.push(octet);
        }
    }
    Ok(out)
}

//! Error types for the Fusain wire protocol.
//!
//! Errors are sorted into three channels: framing errors from the
//! streaming decoder (recoverable per frame), payload errors from the
//! CBOR codec (attached to the packet, never fatal to framing), and
//! encode errors rejecting an outbound description.
//!
//! All of these are `Clone + PartialEq` so that payload errors can be
//! cached on a [`Packet`](crate::Packet) and compared in tests. We
//! avoid `std::io::Error` in protocol logic; transport failures are
//! the caller's concern.

use thiserror::Error;

/// Errors detected by the streaming decoder while assembling a frame.
///
/// Every variant resets the decoder to idle; subsequent octets are
/// scanned for the next `START`. None of these are fatal to the byte
/// stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// Length octet exceeds the maximum payload size.
    #[error("length {length} exceeds maximum payload size {max}")]
    Length {
        /// Length octet as received.
        length: u8,
        /// Maximum accepted payload size.
        max: u8,
    },

    /// Frame arrived intact but failed its CRC check.
    ///
    /// The Display form begins with the literal prefix `CRC mismatch`;
    /// the statistics layer classifies decode errors on that prefix to
    /// separate cable noise from implementation mismatches.
    #[error("CRC mismatch: frame carried {received:#06x}, computed {computed:#06x}")]
    Crc {
        /// CRC carried in the frame trailer.
        received: u16,
        /// CRC computed over the covered range.
        computed: u16,
    },

    /// Delimiter discipline violated: an `END` arrived mid-frame, or
    /// the octet where `END` was required was something else.
    #[error("framing violation: unexpected octet {octet:#04x}")]
    Framing {
        /// Offending octet after unescaping.
        octet: u8,
    },

    /// The working buffer would exceed its bound.
    #[error("frame exceeds {max} working octets")]
    Overflow {
        /// Working buffer bound.
        max: usize,
    },

    /// Input ended with an orphan escape octet.
    #[error("escape sequence truncated at end of input")]
    IncompleteEscape,
}

/// Errors from the two-stage CBOR payload codec.
///
/// A payload error does not invalidate the frame: the packet is still
/// a useful structural artifact (address, raw bytes, CRC), so the
/// error is cached on the packet instead of rejecting it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// Payload contained no octets at all.
    #[error("empty payload")]
    Empty,

    /// Structural CBOR error before the outer shape could be checked.
    #[error("CBOR decode failed: {0}")]
    Cbor(String),

    /// Outer element is not a definite-length array of two elements.
    #[error("payload is not a 2-element CBOR array")]
    OuterShape,

    /// First array element is not an unsigned integer in `0..=255`.
    ///
    /// Negative integers are rejected here as well; only non-negative
    /// values that fit a message type octet are valid.
    #[error("message type is not an integer in 0..=255")]
    TypeOutOfRange,

    /// Second array element is neither null nor a map.
    #[error("inner element is neither null nor a map")]
    InnerShape,

    /// Inner map key is not a non-negative integer.
    #[error("inner map key is not a non-negative integer")]
    InvalidKey,
}

/// Errors rejecting an outbound packet description.
///
/// These indicate caller mistakes, not wire conditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Serialized payload exceeds the maximum the wire format carries.
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Serialized payload size in octets.
        size: usize,
        /// Maximum payload size.
        max: usize,
    },

    /// CBOR serialization failed.
    #[error("CBOR encode failed: {0}")]
    Cbor(String),
}

//! Frame encoder: packet description to on-wire octets.
//!
//! Encoding is the single serialization point. Command builders and
//! telemetry producers construct [`Packet`] descriptions; only this
//! module turns them into bytes, so the framing steps (covered range,
//! CRC, stuffing, delimiters) exist exactly once.

use bytes::Bytes;

use crate::crc::crc16;
use crate::errors::EncodeError;
use crate::framing::{self, END, START};
use crate::packet::{self, Packet};
use crate::payload::{self, InnerMap};

/// Encode a message description into its on-wire frame.
///
/// Use this form for untrusted input: an inner map whose serialized
/// form exceeds [`Packet::MAX_PAYLOAD_SIZE`] is rejected, not
/// panicked on.
///
/// # Errors
///
/// [`EncodeError::PayloadTooLarge`] when the serialized payload
/// exceeds the wire limit; [`EncodeError::Cbor`] on serialization
/// failure.
pub fn encode(
    address: u64,
    message_type: u8,
    inner: Option<&InnerMap>,
) -> Result<Bytes, EncodeError> {
    let payload = payload::encode_payload(message_type, inner)?;
    if payload.len() > Packet::MAX_PAYLOAD_SIZE {
        return Err(EncodeError::PayloadTooLarge {
            size: payload.len(),
            max: Packet::MAX_PAYLOAD_SIZE,
        });
    }
    Ok(frame(address, &payload))
}

/// Re-encode an already-constructed packet.
///
/// Both construction paths bound the payload (the decoder rejects
/// oversized length octets and [`Packet::new`] rejects oversized
/// descriptions), so unlike [`encode`] this form cannot fail.
#[must_use]
pub fn encode_packet(packet: &Packet) -> Bytes {
    debug_assert!(packet.cbor_payload().len() <= Packet::MAX_PAYLOAD_SIZE);
    frame(packet.address(), packet.cbor_payload())
}

/// Frame a bounded payload: covered range, CRC, stuffing, delimiters.
fn frame(address: u64, payload: &[u8]) -> Bytes {
    let mut covered = packet::covered_range(address, payload);
    let crc = crc16(&covered);
    covered.extend_from_slice(&crc.to_be_bytes());

    // Worst case every octet is stuffed, plus the two delimiters.
    let mut wire = Vec::with_capacity(covered.len() * 2 + 2);
    wire.push(START);
    framing::stuff_into(&covered, &mut wire);
    wire.push(END);
    Bytes::from(wire)
}

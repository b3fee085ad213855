//! The `Packet` type: one decoded or to-be-encoded Fusain frame.
//!
//! A packet holds the raw CBOR payload rather than a parsed structure.
//! This keeps the representation independent of any particular CBOR
//! library, lets a packet be re-encoded without re-serializing, and
//! means a frame with malformed CBOR is still a useful structural
//! artifact (address, raw bytes, CRC). The parsed view is produced on
//! first access and cached.

use std::sync::OnceLock;
use std::time::SystemTime;

use bytes::Bytes;

use crate::crc::crc16;
use crate::errors::{EncodeError, PayloadError};
use crate::payload::{self, InnerMap};

/// Broadcast address: every appliance on the link.
pub const BROADCAST_ADDRESS: u64 = 0x0000_0000_0000_0000;

/// Stateless address: router-addressed messages and the
/// end-of-discovery sentinel.
pub const STATELESS_ADDRESS: u64 = 0xFFFF_FFFF_FFFF_FFFF;

/// Parsed payload view, cached on first access.
#[derive(Debug, Clone, PartialEq)]
struct Parsed {
    message_type: u8,
    inner: Option<InnerMap>,
}

/// One Fusain frame, decoded from the wire or described for encoding.
///
/// Value-like and read-only once constructed. Equality compares the
/// semantic fields (address, payload octets, CRC); the receive
/// timestamp and the parse cache do not participate.
///
/// # Invariants
///
/// - `cbor_payload().len() == payload_length()` and never exceeds
///   [`Packet::MAX_PAYLOAD_SIZE`]. Both construction paths enforce
///   this: the decoder bounds the length octet, and [`Packet::new`]
///   rejects oversized descriptions.
/// - `crc()` equals the CRC-16 of the covered range.
/// - Parsing is deterministic: repeated accessor calls return the
///   cached first result.
pub struct Packet {
    address: u64,
    cbor_payload: Bytes,
    crc: u16,
    received_at: Option<SystemTime>,
    parsed: OnceLock<Result<Parsed, PayloadError>>,
}

/// Assemble the covered range `LEN || ADDR_LE || CBOR`.
///
/// Callers guarantee `payload.len() <= MAX_PAYLOAD_SIZE` so the length
/// octet cannot truncate.
pub(crate) fn covered_range(address: u64, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + 8 + payload.len());
    out.push(payload.len() as u8);
    out.extend_from_slice(&address.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

impl Packet {
    /// Maximum inner CBOR payload size in octets.
    pub const MAX_PAYLOAD_SIZE: usize = 114;

    /// Upper bound of the decoder working area:
    /// length octet + address + payload + CRC trailer.
    pub const MAX_PACKET_SIZE: usize = 1 + 8 + Self::MAX_PAYLOAD_SIZE + 2;

    /// Describe a packet for encoding.
    ///
    /// Serializes `[message_type, inner_or_null]`, computes the CRC
    /// over the covered range, and seeds the parse cache so accessors
    /// never re-parse what the caller just provided.
    ///
    /// # Errors
    ///
    /// [`EncodeError::PayloadTooLarge`] when the serialized payload
    /// exceeds [`Packet::MAX_PAYLOAD_SIZE`]; [`EncodeError::Cbor`] on
    /// serialization failure.
    pub fn new(
        address: u64,
        message_type: u8,
        inner: Option<InnerMap>,
    ) -> Result<Self, EncodeError> {
        let payload = payload::encode_payload(message_type, inner.as_ref())?;
        if payload.len() > Self::MAX_PAYLOAD_SIZE {
            return Err(EncodeError::PayloadTooLarge {
                size: payload.len(),
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        let crc = crc16(&covered_range(address, &payload));
        let parsed = OnceLock::new();
        let _ = parsed.set(Ok(Parsed { message_type, inner }));

        Ok(Self { address, cbor_payload: Bytes::from(payload), crc, received_at: None, parsed })
    }

    /// Construct from a completed, CRC-verified frame.
    ///
    /// Decoder use only; stamps the receive time.
    pub(crate) fn from_wire(address: u64, cbor_payload: Bytes, crc: u16) -> Self {
        Self {
            address,
            cbor_payload,
            crc,
            received_at: Some(SystemTime::now()),
            parsed: OnceLock::new(),
        }
    }

    /// Payload length in octets, as carried by the length field.
    #[must_use]
    pub fn payload_length(&self) -> u8 {
        self.cbor_payload.len() as u8
    }

    /// 64-bit device address.
    #[must_use]
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Raw CBOR payload octets.
    #[must_use]
    pub fn cbor_payload(&self) -> &Bytes {
        &self.cbor_payload
    }

    /// CRC-16 over the covered range, as carried on the wire.
    #[must_use]
    pub fn crc(&self) -> u16 {
        self.crc
    }

    /// Local receive time. `None` for locally-built descriptions.
    #[must_use]
    pub fn received_at(&self) -> Option<SystemTime> {
        self.received_at
    }

    /// Message type octet. `None` when the payload failed to parse.
    #[must_use]
    pub fn message_type(&self) -> Option<u8> {
        self.parse().as_ref().ok().map(|parsed| parsed.message_type)
    }

    /// Inner map. `None` for empty payloads and parse failures; use
    /// [`Packet::parse_error`] to tell the two apart.
    #[must_use]
    pub fn inner(&self) -> Option<&InnerMap> {
        self.parse().as_ref().ok().and_then(|parsed| parsed.inner.as_ref())
    }

    /// The payload parse failure, if any.
    #[must_use]
    pub fn parse_error(&self) -> Option<&PayloadError> {
        self.parse().as_ref().err()
    }

    /// Parse the payload once and cache the outcome.
    fn parse(&self) -> &Result<Parsed, PayloadError> {
        self.parsed.get_or_init(|| {
            payload::decode_payload(&self.cbor_payload)
                .map(|(message_type, inner)| Parsed { message_type, inner })
        })
    }
}

impl Clone for Packet {
    fn clone(&self) -> Self {
        let parsed = OnceLock::new();
        if let Some(cached) = self.parsed.get() {
            let _ = parsed.set(cached.clone());
        }
        Self {
            address: self.address,
            cbor_payload: self.cbor_payload.clone(),
            crc: self.crc,
            received_at: self.received_at,
            parsed,
        }
    }
}

impl PartialEq for Packet {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.cbor_payload == other.cbor_payload
            && self.crc == other.crc
    }
}

impl Eq for Packet {}

impl std::fmt::Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("address", &format!("{:#018x}", self.address))
            .field("payload_length", &self.payload_length())
            .field("crc", &format!("{:#06x}", self.crc))
            .field("message_type", &self.message_type())
            .field("received_at", &self.received_at)
            .finish_non_exhaustive()
    }
}

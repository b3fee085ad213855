//! Streaming frame decoder: octets in, packets or framing errors out.
//!
//! The decoder is a pure step function over one byte at a time. It
//! tolerates arbitrary noise: in the idle state every octet that is
//! not `START` is discarded, any decode error resets to idle, and a
//! literal `START` in any state abandons the frame in progress and
//! begins a new one. Cold start, noise bursts, and cable reconnection
//! therefore self-heal without caller involvement.
//!
//! Escapes are resolved before classification: an `ESC` octet sets a
//! pending flag and the following octet is XORed back to its original
//! value, so an escaped `0x7E` or `0x7F` is always data, never a
//! delimiter.

use bytes::Bytes;

use crate::crc::crc16;
use crate::errors::FramingError;
use crate::framing::{END, ESC, ESC_XOR, START};
use crate::packet::Packet;

/// Parse position within a frame.
///
/// `Address` and `Payload` carry their progress so the whole state
/// fits in one small enum; there is no other bookkeeping to get out of
/// sync with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between frames; discarding until `START`.
    Idle,
    /// Expecting the length octet.
    Length,
    /// Expecting address octet `index` of 8 (little-endian).
    Address {
        /// Octets of the address consumed so far.
        index: u8,
    },
    /// Expecting `remaining` more payload octets.
    Payload {
        /// Payload octets still outstanding.
        remaining: u8,
    },
    /// Expecting the CRC high octet.
    CrcHigh,
    /// Expecting the CRC low octet.
    CrcLow,
    /// Expecting the closing `END`.
    AwaitEnd,
}

/// Streaming Fusain frame decoder.
///
/// One instance per byte stream; instances are independent and carry
/// no global state. The working buffer is pre-allocated at
/// construction and reused across frames. Not intended for shared
/// concurrent use; give each reader thread its own decoder.
#[derive(Debug)]
pub struct Decoder {
    state: State,
    escape_pending: bool,
    /// Covered range under assembly: `LEN || ADDR || CBOR`.
    buffer: Vec<u8>,
    payload_length: u8,
    address: u64,
    crc_high: u8,
    crc_low: u8,
}

impl Decoder {
    /// Create an idle decoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            escape_pending: false,
            buffer: Vec::with_capacity(Packet::MAX_PACKET_SIZE),
            payload_length: 0,
            address: 0,
            crc_high: 0,
            crc_low: 0,
        }
    }

    /// Discard any frame in progress and return to idle.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.escape_pending = false;
        self.buffer.clear();
    }

    /// True when no frame is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle && !self.escape_pending
    }

    /// Consume one received octet.
    ///
    /// Returns `None` while a frame is incomplete, `Some(Ok(packet))`
    /// on frame completion, and `Some(Err(_))` when the frame in
    /// progress had to be abandoned. Errors are recoverable: the
    /// decoder is already idle again and the caller just keeps
    /// feeding octets.
    pub fn decode_byte(&mut self, octet: u8) -> Option<Result<Packet, FramingError>> {
        let data = if self.escape_pending {
            // The octet after an escape is data no matter its value.
            self.escape_pending = false;
            octet ^ ESC_XOR
        } else {
            match octet {
                START => {
                    self.begin_frame();
                    return None;
                },
                END => {
                    if self.state == State::Idle {
                        return None;
                    }
                    return Some(self.finish_frame());
                },
                ESC if self.state != State::Idle => {
                    self.escape_pending = true;
                    return None;
                },
                other => other,
            }
        };
        self.accept_data(data)
    }

    /// Feed a slice of received octets, collecting every completion
    /// and error in input order.
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<Result<Packet, FramingError>> {
        bytes.iter().filter_map(|&octet| self.decode_byte(octet)).collect()
    }

    /// A literal `START`: reset everything and expect the length.
    fn begin_frame(&mut self) {
        self.state = State::Length;
        self.escape_pending = false;
        self.buffer.clear();
        self.payload_length = 0;
        self.address = 0;
        self.crc_high = 0;
        self.crc_low = 0;
    }

    /// Handle an octet that classified as data for the current state.
    fn accept_data(&mut self, octet: u8) -> Option<Result<Packet, FramingError>> {
        match self.state {
            // Resync: octets between frames are silently discarded.
            State::Idle => None,
            State::Length => {
                if octet as usize > Packet::MAX_PAYLOAD_SIZE {
                    self.state = State::Idle;
                    return Some(Err(FramingError::Length {
                        length: octet,
                        max: Packet::MAX_PAYLOAD_SIZE as u8,
                    }));
                }
                self.payload_length = octet;
                if let Err(err) = self.push(octet) {
                    return Some(Err(err));
                }
                self.state = State::Address { index: 0 };
                None
            },
            State::Address { index } => {
                self.address |= u64::from(octet) << (8 * u32::from(index));
                if let Err(err) = self.push(octet) {
                    return Some(Err(err));
                }
                self.state = if index < 7 {
                    State::Address { index: index + 1 }
                } else if self.payload_length == 0 {
                    State::CrcHigh
                } else {
                    State::Payload { remaining: self.payload_length }
                };
                None
            },
            State::Payload { remaining } => {
                if let Err(err) = self.push(octet) {
                    return Some(Err(err));
                }
                self.state = if remaining > 1 {
                    State::Payload { remaining: remaining - 1 }
                } else {
                    State::CrcHigh
                };
                None
            },
            State::CrcHigh => {
                self.crc_high = octet;
                self.state = State::CrcLow;
                None
            },
            State::CrcLow => {
                self.crc_low = octet;
                self.state = State::AwaitEnd;
                None
            },
            State::AwaitEnd => {
                // A data octet where only END is acceptable.
                self.state = State::Idle;
                Some(Err(FramingError::Framing { octet }))
            },
        }
    }

    /// Append to the working buffer, honoring the hard bound.
    ///
    /// The length check already bounds every well-formed frame below
    /// this limit; the guard stays anyway so no state-machine mistake
    /// can ever grow the buffer.
    fn push(&mut self, octet: u8) -> Result<(), FramingError> {
        if self.buffer.len() >= Packet::MAX_PACKET_SIZE {
            self.state = State::Idle;
            return Err(FramingError::Overflow { max: Packet::MAX_PACKET_SIZE });
        }
        self.buffer.push(octet);
        Ok(())
    }

    /// A literal `END` arrived; complete or reject the frame.
    fn finish_frame(&mut self) -> Result<Packet, FramingError> {
        let state = self.state;
        self.state = State::Idle;

        if state != State::AwaitEnd {
            return Err(FramingError::Framing { octet: END });
        }

        let received = u16::from_be_bytes([self.crc_high, self.crc_low]);
        let computed = crc16(&self.buffer);
        if received != computed {
            return Err(FramingError::Crc { received, computed });
        }

        // INVARIANT: reaching AwaitEnd means the length octet and all
        // eight address octets were stored, so the buffer holds at
        // least 9 octets and the payload starts at index 9.
        let payload = Bytes::copy_from_slice(self.buffer.get(9..).unwrap_or_default());
        Ok(Packet::from_wire(self.address, payload, received))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder;
    use crate::packet::BROADCAST_ADDRESS;
    use crate::payload::InnerMap;

    fn wire(address: u64, message_type: u8, inner: Option<&InnerMap>) -> Vec<u8> {
        encoder::encode(address, message_type, inner).unwrap().to_vec()
    }

    #[test]
    fn decodes_a_ping_frame_byte_by_byte() {
        let mut decoder = Decoder::new();
        let frame = wire(BROADCAST_ADDRESS, 0x2F, None);

        let mut packets = Vec::new();
        for (position, &octet) in frame.iter().enumerate() {
            if let Some(result) = decoder.decode_byte(octet) {
                assert_eq!(position, frame.len() - 1, "completed early");
                packets.push(result.unwrap());
            }
        }

        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].address(), BROADCAST_ADDRESS);
        assert_eq!(packets[0].message_type(), Some(0x2F));
        assert!(packets[0].inner().is_none());
        assert!(packets[0].received_at().is_some());
    }

    #[test]
    fn idle_noise_is_discarded_silently() {
        let mut decoder = Decoder::new();
        let noise = [0x00, 0x55, 0xAA, 0xFF, END, ESC, 0x13];
        assert!(decoder.decode(&noise).is_empty());
        assert!(decoder.is_idle());
    }

    #[test]
    fn oversized_length_is_rejected_immediately() {
        let mut decoder = Decoder::new();
        let events = decoder.decode(&[START, 115]);
        assert_eq!(events, vec![Err(FramingError::Length { length: 115, max: 114 })]);
        assert!(decoder.is_idle());
    }

    #[test]
    fn boundary_length_is_accepted() {
        let mut decoder = Decoder::new();
        assert!(decoder.decode(&[START, 114]).is_empty());
        assert!(!decoder.is_idle());
    }

    #[test]
    fn crc_mismatch_is_reported_and_recovered_from() {
        let mut decoder = Decoder::new();
        let mut corrupted = wire(BROADCAST_ADDRESS, 0x2F, None);
        // Flip one bit of the CBOR array head (offset: START + LEN + 8).
        corrupted[10] ^= 0x01;

        let events = decoder.decode(&corrupted);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(FramingError::Crc { .. })));

        // The very next clean frame decodes.
        let events = decoder.decode(&wire(BROADCAST_ADDRESS, 0x2F, None));
        assert_eq!(events.len(), 1);
        assert!(events[0].is_ok());
    }

    #[test]
    fn early_end_is_a_framing_error() {
        let mut decoder = Decoder::new();
        let events = decoder.decode(&[START, 0x04, 0x01, END]);
        assert_eq!(events, vec![Err(FramingError::Framing { octet: END })]);
        assert!(decoder.is_idle());
    }

    #[test]
    fn data_after_crc_is_a_framing_error() {
        let mut decoder = Decoder::new();
        let mut frame = wire(7, 0x2F, None);
        let end = frame.pop().unwrap();
        assert_eq!(end, END);
        frame.push(0x42);

        let events = decoder.decode(&frame);
        assert_eq!(events, vec![Err(FramingError::Framing { octet: 0x42 })]);
    }

    #[test]
    fn start_mid_frame_abandons_and_restarts() {
        let mut decoder = Decoder::new();
        let frame = wire(3, 0x2F, None);

        // Half a frame, then a complete one.
        let mut stream = frame[..frame.len() / 2].to_vec();
        stream.extend_from_slice(&frame);

        let events = decoder.decode(&stream);
        assert_eq!(events.len(), 1);
        let packet = events[0].as_ref().unwrap();
        assert_eq!(packet.address(), 3);
    }

    #[test]
    fn repeated_start_bytes_then_one_frame_yield_one_packet() {
        let mut decoder = Decoder::new();
        let mut stream = vec![START; 10];
        stream.extend_from_slice(&wire(1, 0x2F, None));

        let events = decoder.decode(&stream);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_ok());
    }

    #[test]
    fn zero_length_payload_skips_straight_to_crc() {
        // Hand-built frame with LEN=0: covered range is LEN || ADDR.
        let covered = crate::packet::covered_range(0, &[]);
        let crc = crc16(&covered);
        let mut frame = vec![START];
        frame.extend_from_slice(&covered);
        frame.extend_from_slice(&crc.to_be_bytes());
        frame.push(END);

        let mut decoder = Decoder::new();
        let events = decoder.decode(&frame);
        assert_eq!(events.len(), 1);
        let packet = events[0].as_ref().unwrap();
        assert_eq!(packet.payload_length(), 0);
        assert!(packet.cbor_payload().is_empty());
        // An empty payload is a parse error, not a framing error.
        assert!(packet.parse_error().is_some());
    }

    #[test]
    fn escaped_payload_octets_round_trip() {
        let mut map = InnerMap::new();
        map.insert_bytes(0, vec![START, END, ESC, 0x00, START]);
        let described = Packet::new(0xAB, 0x30, Some(map)).unwrap();
        let frame = encoder::encode_packet(&described);

        let mut decoder = Decoder::new();
        let events = decoder.decode(&frame);
        assert_eq!(events.len(), 1);
        let packet = events[0].as_ref().unwrap();
        assert_eq!(packet.cbor_payload(), described.cbor_payload());
        assert_eq!(
            packet.inner().unwrap().get_bytes(0),
            Some(&[START, END, ESC, 0x00, START][..])
        );
    }

    #[test]
    fn reset_discards_a_partial_frame() {
        let mut decoder = Decoder::new();
        assert!(decoder.decode(&[START, 0x04, 0x01, 0x02]).is_empty());
        assert!(!decoder.is_idle());
        decoder.reset();
        assert!(decoder.is_idle());

        let events = decoder.decode(&wire(1, 0x2F, None));
        assert_eq!(events.len(), 1);
        assert!(events[0].is_ok());
    }

    #[test]
    fn address_is_accumulated_little_endian() {
        let address = 0x0102_0304_0506_0708;
        let mut decoder = Decoder::new();
        let events = decoder.decode(&wire(address, 0x2F, None));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().address(), address);
    }
}

//! Wire codec for the Fusain appliance protocol.
//!
//! Fusain frames travel over a raw bidirectional byte stream (a serial
//! UART or a WebSocket binary-message transport) and must agree
//! bit-for-bit with the appliance firmware on the other end. This
//! crate owns everything octet-shaped: CRC, byte stuffing, the CBOR
//! payload schema, the streaming decoder, the encoder, and command
//! builders. Validation and statistics live in `fusain-core`.
//!
//! # Wire format
//!
//! ```text
//! 0x7E                         START, never stuffed
//! <LEN>                        payload length in [0, 114]
//! <ADDR, 8 octets LE>          device address
//! <CBOR payload, LEN octets>   array of [msg_type, inner_map_or_null]
//! <CRC hi> <CRC lo>            CRC-16/CCITT-FALSE over LEN||ADDR||CBOR
//! 0x7F                         END, never stuffed
//! ```
//!
//! Between the delimiters, occurrences of `0x7D`/`0x7E`/`0x7F` are
//! escaped as `0x7D <octet ^ 0x20>`.
//!
//! # Boundary contracts
//!
//! Inbound, the [`Decoder`] is a byte sink: push received octets, get
//! packets or framing errors. Outbound, [`encode`] and
//! [`encode_packet`] are the packet source: describe a packet, get
//! octets. Both ends are pure computations over in-memory buffers;
//! transports and UIs stay outside.

pub mod builders;
mod crc;
mod decoder;
mod encoder;
pub mod errors;
pub mod framing;
pub mod message;
mod packet;
mod payload;

pub use crc::crc16;
pub use decoder::Decoder;
pub use encoder::{encode, encode_packet};
pub use errors::{EncodeError, FramingError, PayloadError};
pub use message::MessageType;
pub use packet::{BROADCAST_ADDRESS, Packet, STATELESS_ADDRESS};
pub use payload::{InnerMap, decode_payload, encode_payload};

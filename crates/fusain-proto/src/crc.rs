//! CRC-16/CCITT-FALSE over the covered range.
//!
//! Polynomial `0x1021`, initial value `0xFFFF`, no reflection, no
//! final XOR; octets are consumed MSB-first and the result travels
//! big-endian on the wire. These are the `CRC_16_IBM_3740` parameters
//! and they are shared with the appliance firmware; any change there
//! requires a matched change here.

use crc::{CRC_16_IBM_3740, Crc};

const CRC16_CCITT: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Compute the CRC-16/CCITT-FALSE of `data`.
///
/// Pure and deterministic; the same input always yields the same
/// output.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    CRC16_CCITT.checksum(data)
}

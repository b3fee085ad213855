//! Fuzz target for the streaming decoder.
//!
//! Feeds arbitrary byte sequences through a decoder to find:
//! - Parser crashes or panics
//! - Working buffer growth past its bound
//! - Lazy CBOR parse panics on packets that slipped past the CRC
//!
//! The decoder must NEVER panic. Invalid input only ever produces
//! framing errors.

#![no_main]

use fusain_proto::Decoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = Decoder::new();
    for event in decoder.decode(data) {
        if let Ok(packet) = event {
            // Force the lazy parse path too.
            let _ = packet.message_type();
            let _ = packet.inner();
            let _ = packet.parse_error();
        }
    }
});

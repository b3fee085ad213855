//! Fuzz target for the CBOR payload codec.
//!
//! Arbitrary bytes must either parse into a `(type, map)` pair or
//! produce one of the classified payload errors; never a panic. A
//! successful parse must re-encode.

#![no_main]

use fusain_proto::{decode_payload, encode_payload};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((message_type, inner)) = decode_payload(data) {
        // Whatever decoded must serialize again; size limits are the
        // encoder's concern and do not apply here.
        let _ = encode_payload(message_type, inner.as_ref());
    }
});

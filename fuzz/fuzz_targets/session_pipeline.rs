//! Fuzz target for the full inbound pipeline.
//!
//! Splits arbitrary input into arbitrary push chunks and drives a
//! session end to end: decoder, validator, and statistics must all
//! hold up under garbage, and the statistics accounting must stay
//! total-preserving.

#![no_main]

use arbitrary::Arbitrary;
use fusain_core::Session;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    chunks: Vec<Vec<u8>>,
}

fuzz_target!(|input: Input| {
    let mut session = Session::new();
    for chunk in &input.chunks {
        for event in session.push(chunk) {
            let _ = event;
        }
    }

    let counters = session.stats().counters();
    assert!(counters.valid + counters.crc_errors + counters.decode_errors <= counters.total);
});

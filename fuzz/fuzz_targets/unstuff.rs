//! Fuzz target for the byte-stuffing codec.
//!
//! Checks that unstuffing never panics and that the codec pair stays
//! coherent: whatever unstuffs successfully restuffs to a sequence
//! that unstuffs back to the same octets.

#![no_main]

use fusain_proto::framing;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Round trip one way: stuffing is total, unstuffing must invert it.
    let stuffed = framing::stuff(data);
    assert_eq!(framing::unstuff(&stuffed).as_deref(), Ok(data));

    // Arbitrary input either unstuffs or reports the orphan escape.
    if let Ok(unstuffed) = framing::unstuff(data) {
        let restuffed = framing::stuff(&unstuffed);
        assert_eq!(framing::unstuff(&restuffed), Ok(unstuffed));
    }
});

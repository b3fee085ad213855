//! Property-based tests for statistics accounting.
//!
//! Over any sequence of update calls, `total` equals the call count
//! and the coarse buckets partition it exactly: valid packets, CRC
//! failures, other decode failures, and calls that carried anomalies.

use fusain_core::{Anomaly, AnomalyKind, Stats};
use fusain_proto::FramingError;
use proptest::prelude::*;

/// One synthetic update call.
#[derive(Debug, Clone)]
enum Call {
    Valid,
    CrcFailure,
    FramingFailure,
    Anomalous(Vec<AnomalyKind>),
}

fn rule_kind() -> impl Strategy<Value = AnomalyKind> {
    prop_oneof![
        Just(AnomalyKind::InvalidCount),
        Just(AnomalyKind::LengthMismatch),
        Just(AnomalyKind::HighRpm),
        Just(AnomalyKind::InvalidTemp),
        Just(AnomalyKind::InvalidPwm),
        Just(AnomalyKind::InvalidValue),
    ]
}

fn arbitrary_call() -> impl Strategy<Value = Call> {
    prop_oneof![
        Just(Call::Valid),
        Just(Call::CrcFailure),
        Just(Call::FramingFailure),
        prop::collection::vec(rule_kind(), 1..4).prop_map(Call::Anomalous),
    ]
}

fn synthetic(kind: AnomalyKind) -> Anomaly {
    Anomaly { kind, message: "synthetic".to_owned(), details: Vec::new() }
}

proptest! {
    #[test]
    fn accounting_is_total_preserving(calls in prop::collection::vec(arbitrary_call(), 0..64)) {
        let mut stats = Stats::new();
        let mut anomalous_calls = 0u64;

        for call in &calls {
            match call {
                Call::Valid => stats.update(None, None, &[]),
                Call::CrcFailure => stats.update(
                    None,
                    Some(&FramingError::Crc { received: 1, computed: 2 }),
                    &[],
                ),
                Call::FramingFailure => stats.update(
                    None,
                    Some(&FramingError::Framing { octet: 0x7F }),
                    &[],
                ),
                Call::Anomalous(kinds) => {
                    anomalous_calls += 1;
                    let anomalies: Vec<Anomaly> =
                        kinds.iter().map(|&kind| synthetic(kind)).collect();
                    stats.update(None, None, &anomalies);
                },
            }
        }

        let counters = stats.counters();
        prop_assert_eq!(counters.total, calls.len() as u64);
        prop_assert_eq!(
            counters.valid + counters.crc_errors + counters.decode_errors + anomalous_calls,
            counters.total
        );
    }

    #[test]
    fn per_kind_counters_sum_to_the_aggregates(
        kinds in prop::collection::vec(rule_kind(), 0..32),
    ) {
        let mut stats = Stats::new();
        for &kind in &kinds {
            stats.update(None, None, &[synthetic(kind)]);
        }

        let counters = stats.counters();
        prop_assert_eq!(
            counters.invalid_count + counters.length_mismatch,
            counters.malformed
        );
        prop_assert_eq!(
            counters.high_rpm + counters.invalid_temp + counters.invalid_pwm
                + counters.invalid_value,
            counters.anomalous
        );
    }
}

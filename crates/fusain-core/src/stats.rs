//! Per-stream statistics: counters and rate estimation.
//!
//! One tracker per byte stream, fed from every decode result — even
//! when downstream delivery is lossy, statistics must see everything
//! or the console numbers lie. Rates are computed over the wall-clock
//! time since construction or the last reset; there is no sliding
//! window, because the consumers are humans watching a console.

use std::fmt::Write as _;
use std::time::Instant;

use fusain_proto::{FramingError, Packet};

use crate::validate::{Anomaly, AnomalyKind};

/// Counter block accumulated by [`Stats::update`].
///
/// `total` counts every update call. Exactly one of the coarse
/// buckets advances per call: `crc_errors` or `decode_errors` when a
/// decode error is present, `valid` when the packet carried no
/// anomalies, and otherwise the per-kind counters plus an aggregate
/// (`malformed` for schema findings, `anomalous` for range findings).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Update calls observed.
    pub total: u64,
    /// Packets with no decode error and no anomalies.
    pub valid: u64,
    /// Decode failures classified as CRC mismatches (cable noise).
    pub crc_errors: u64,
    /// Every other decode or parse failure (implementation mismatch).
    pub decode_errors: u64,
    /// Packets with at least one schema finding.
    pub malformed: u64,
    /// Packets with at least one range finding.
    pub anomalous: u64,
    /// Device count findings.
    pub invalid_count: u64,
    /// Missing-field findings.
    pub length_mismatch: u64,
    /// RPM findings.
    pub high_rpm: u64,
    /// Temperature findings.
    pub invalid_temp: u64,
    /// PWM findings.
    pub invalid_pwm: u64,
    /// Enumerated-value findings.
    pub invalid_value: u64,
}

/// Rates derived from the counters and elapsed wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    /// Update calls per second since the start of tracking.
    pub packets_per_sec: f64,
    /// Decode failures per second since the start of tracking.
    pub errors_per_sec: f64,
}

/// Statistics tracker for one packet stream.
#[derive(Debug, Clone)]
pub struct Stats {
    started: Instant,
    last_update: Instant,
    counters: Counters,
}

impl Stats {
    /// Start tracking now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self { started: now, last_update: now, counters: Counters::default() }
    }

    /// Record one decode result.
    ///
    /// `packet` and `decode_err` are mutually exclusive; when a decode
    /// error is present the packet was never produced and `anomalies`
    /// is ignored.
    pub fn update(
        &mut self,
        packet: Option<&Packet>,
        decode_err: Option<&FramingError>,
        anomalies: &[Anomaly],
    ) {
        self.update_at(Instant::now(), packet, decode_err, anomalies);
    }

    /// [`Stats::update`] with an injected clock, for deterministic
    /// tests.
    pub fn update_at(
        &mut self,
        now: Instant,
        packet: Option<&Packet>,
        decode_err: Option<&FramingError>,
        anomalies: &[Anomaly],
    ) {
        debug_assert!(packet.is_none() || decode_err.is_none());

        self.last_update = now;
        self.counters.total += 1;

        if let Some(err) = decode_err {
            // The literal prefix is the classification contract: CRC
            // failures point at the cable, everything else points at
            // one of the two implementations.
            if err.to_string().starts_with("CRC mismatch") {
                self.counters.crc_errors += 1;
            } else {
                self.counters.decode_errors += 1;
            }
            return;
        }

        if anomalies.is_empty() {
            self.counters.valid += 1;
            return;
        }

        for anomaly in anomalies {
            match anomaly.kind {
                AnomalyKind::InvalidCount => {
                    self.counters.invalid_count += 1;
                    self.counters.malformed += 1;
                },
                AnomalyKind::LengthMismatch => {
                    self.counters.length_mismatch += 1;
                    self.counters.malformed += 1;
                },
                AnomalyKind::HighRpm => {
                    self.counters.high_rpm += 1;
                    self.counters.anomalous += 1;
                },
                AnomalyKind::InvalidTemp => {
                    self.counters.invalid_temp += 1;
                    self.counters.anomalous += 1;
                },
                AnomalyKind::InvalidPwm => {
                    self.counters.invalid_pwm += 1;
                    self.counters.anomalous += 1;
                },
                AnomalyKind::InvalidValue => {
                    self.counters.invalid_value += 1;
                    self.counters.anomalous += 1;
                },
                // Reserved kinds tag decode failures surfaced through
                // the validator (unparseable payloads).
                AnomalyKind::CrcError => self.counters.crc_errors += 1,
                AnomalyKind::DecodeError => self.counters.decode_errors += 1,
            }
        }
    }

    /// Current counter values.
    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// When tracking started.
    #[must_use]
    pub fn start_time(&self) -> Instant {
        self.started
    }

    /// When the last update arrived.
    #[must_use]
    pub fn last_update_time(&self) -> Instant {
        self.last_update
    }

    /// Rates since the start of tracking.
    #[must_use]
    pub fn rates(&self) -> Rates {
        self.rates_at(Instant::now())
    }

    /// [`Stats::rates`] with an injected clock.
    #[must_use]
    pub fn rates_at(&self, now: Instant) -> Rates {
        let elapsed = now.duration_since(self.started).as_secs_f64();
        if elapsed <= 0.0 {
            return Rates { packets_per_sec: 0.0, errors_per_sec: 0.0 };
        }
        let errors = self.counters.crc_errors + self.counters.decode_errors;
        Rates {
            packets_per_sec: self.counters.total as f64 / elapsed,
            errors_per_sec: errors as f64 / elapsed,
        }
    }

    /// Printable multi-line summary for console display.
    #[must_use]
    pub fn snapshot(&self) -> String {
        self.snapshot_at(Instant::now())
    }

    /// [`Stats::snapshot`] with an injected clock.
    #[must_use]
    pub fn snapshot_at(&self, now: Instant) -> String {
        let counters = self.counters;
        let rates = self.rates_at(now);
        let elapsed = now.duration_since(self.started).as_secs_f64();

        let mut out = String::new();
        let _ = writeln!(out, "elapsed: {elapsed:.1}s");
        let _ = writeln!(
            out,
            "total: {} ({:.1}/s), valid: {}",
            counters.total, rates.packets_per_sec, counters.valid
        );
        let _ = writeln!(
            out,
            "crc errors: {}, decode errors: {} ({:.1}/s)",
            counters.crc_errors, counters.decode_errors, rates.errors_per_sec
        );
        let _ = writeln!(
            out,
            "malformed: {} (counts: {}, lengths: {})",
            counters.malformed, counters.invalid_count, counters.length_mismatch
        );
        let _ = write!(
            out,
            "anomalous: {} (rpm: {}, temp: {}, pwm: {}, values: {})",
            counters.anomalous,
            counters.high_rpm,
            counters.invalid_temp,
            counters.invalid_pwm,
            counters.invalid_value
        );
        out
    }

    /// Zero every counter and restart the clock.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.started = now;
        self.last_update = now;
        self.counters = Counters::default();
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use fusain_proto::builders;

    use super::*;
    use crate::validate::validate;

    fn anomaly(kind: AnomalyKind) -> Anomaly {
        let mut anomalies = Vec::new();
        match kind {
            AnomalyKind::HighRpm => {
                let mut map = fusain_proto::InnerMap::new();
                map.insert_u64(2, 7000);
                let packet = Packet::new(1, 0x31, Some(map)).unwrap();
                anomalies = validate(&packet);
            },
            AnomalyKind::LengthMismatch => {
                let packet = Packet::new(1, 0x30, None).unwrap();
                anomalies = validate(&packet);
            },
            _ => {},
        }
        anomalies.into_iter().next().unwrap_or(Anomaly {
            kind,
            message: "synthetic".to_owned(),
            details: Vec::new(),
        })
    }

    #[test]
    fn valid_packets_count_as_valid() {
        let mut stats = Stats::new();
        let ping = builders::ping_request(0);
        stats.update(Some(&ping), None, &[]);
        stats.update(Some(&ping), None, &[]);

        let counters = stats.counters();
        assert_eq!(counters.total, 2);
        assert_eq!(counters.valid, 2);
        assert_eq!(counters.crc_errors + counters.decode_errors, 0);
    }

    #[test]
    fn crc_failures_are_classified_by_message_prefix() {
        let mut stats = Stats::new();
        stats.update(None, Some(&FramingError::Crc { received: 1, computed: 2 }), &[]);
        stats.update(None, Some(&FramingError::Length { length: 200, max: 114 }), &[]);
        stats.update(None, Some(&FramingError::IncompleteEscape), &[]);

        let counters = stats.counters();
        assert_eq!(counters.total, 3);
        assert_eq!(counters.crc_errors, 1);
        assert_eq!(counters.decode_errors, 2);
        assert_eq!(counters.valid, 0);
    }

    #[test]
    fn anomalies_advance_kind_and_aggregate_counters() {
        let mut stats = Stats::new();
        stats.update(None, None, &[anomaly(AnomalyKind::HighRpm)]);
        stats.update(
            None,
            None,
            &[anomaly(AnomalyKind::LengthMismatch), anomaly(AnomalyKind::InvalidTemp)],
        );

        let counters = stats.counters();
        assert_eq!(counters.total, 2);
        assert_eq!(counters.valid, 0);
        assert_eq!(counters.high_rpm, 1);
        assert_eq!(counters.invalid_temp, 1);
        assert_eq!(counters.length_mismatch, 1);
        assert_eq!(counters.anomalous, 2);
        assert_eq!(counters.malformed, 1);
    }

    #[test]
    fn rates_use_elapsed_wall_clock() {
        let mut stats = Stats::new();
        let start = stats.start_time();
        for _ in 0..20 {
            stats.update_at(start, Some(&builders::ping_request(0)), None, &[]);
        }
        stats.update_at(start, None, Some(&FramingError::Crc { received: 1, computed: 2 }), &[]);

        let rates = stats.rates_at(start + Duration::from_secs(10));
        assert!((rates.packets_per_sec - 2.1).abs() < 1e-9);
        assert!((rates.errors_per_sec - 0.1).abs() < 1e-9);
    }

    #[test]
    fn zero_elapsed_yields_zero_rates() {
        let stats = Stats::new();
        let rates = stats.rates_at(stats.start_time());
        assert_eq!(rates.packets_per_sec, 0.0);
        assert_eq!(rates.errors_per_sec, 0.0);
    }

    #[test]
    fn reset_zeroes_counters_and_restarts_the_clock() {
        let mut stats = Stats::new();
        stats.update(Some(&builders::ping_request(0)), None, &[]);
        assert_eq!(stats.counters().total, 1);

        stats.reset();
        assert_eq!(stats.counters(), Counters::default());
    }

    #[test]
    fn snapshot_summarizes_every_bucket() {
        let mut stats = Stats::new();
        let start = stats.start_time();
        for _ in 0..18 {
            stats.update_at(start, Some(&builders::ping_request(0)), None, &[]);
        }
        stats.update_at(start, None, Some(&FramingError::Crc { received: 1, computed: 2 }), &[]);
        stats.update_at(start, None, None, &[anomaly(AnomalyKind::HighRpm)]);

        insta::assert_snapshot!(
            stats.snapshot_at(start + Duration::from_secs(10)),
            @r"
        elapsed: 10.0s
        total: 20 (2.0/s), valid: 18
        crc errors: 1, decode errors: 0 (0.1/s)
        malformed: 0 (counts: 0, lengths: 0)
        anomalous: 1 (rpm: 1, temp: 0, pwm: 0, values: 0)
        "
        );
    }

    #[test]
    fn update_accounting_is_total_preserving() {
        // Every call lands in exactly one coarse bucket.
        let mut stats = Stats::new();
        let ping = builders::ping_request(0);
        let calls: [(Option<&Packet>, Option<FramingError>, Vec<Anomaly>); 5] = [
            (Some(&ping), None, vec![]),
            (None, Some(FramingError::Crc { received: 1, computed: 2 }), vec![]),
            (None, Some(FramingError::Framing { octet: 0x7F }), vec![]),
            (None, None, vec![anomaly(AnomalyKind::HighRpm)]),
            (Some(&ping), None, vec![]),
        ];

        let mut with_anomalies = 0;
        for (packet, err, anomalies) in calls {
            if err.is_none() && !anomalies.is_empty() {
                with_anomalies += 1;
            }
            stats.update(packet, err.as_ref(), &anomalies);
        }

        let counters = stats.counters();
        assert_eq!(counters.total, 5);
        assert_eq!(
            counters.valid + counters.crc_errors + counters.decode_errors + with_anomalies,
            counters.total
        );
    }
}

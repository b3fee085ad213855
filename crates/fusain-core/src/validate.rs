//! Semantic validation of decoded packets.
//!
//! Validation never rejects a packet: it yields a list of classified
//! anomalies and leaves the decision to downstream consumers. An empty
//! list means "no anomaly detected", which is weaker than "correct" —
//! only the enumerated checks ran.
//!
//! The thresholds here mirror the appliance firmware's own accepted
//! ranges. Any change to a firmware limit requires a matched change
//! here.

use std::fmt;

use fusain_proto::message::{MessageType, keys};
use fusain_proto::{InnerMap, Packet, STATELESS_ADDRESS};

/// Firmware-accepted maximum motor RPM, measured or commanded.
pub const MAX_RPM: u64 = 6000;

/// Plausible thermometer range, °C.
pub const TEMP_RANGE: std::ops::RangeInclusive<f64> = -50.0..=1000.0;

/// Longest accepted glow-plug activation, milliseconds.
pub const MAX_GLOW_DURATION_MS: u64 = 300_000;

/// Largest per-kind device count an announce may declare.
pub const MAX_DEVICE_COUNT: u64 = 10;

/// Highest state machine index an appliance may report.
pub const MAX_STATE: u64 = 8;

/// Classification of a validation finding.
///
/// The taxonomy is stable even as individual rules drift with
/// firmware; new rules reuse existing kinds. `CrcError` and
/// `DecodeError` are reserved for statistics tagging of decode
/// failures and do not originate from range rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    /// Declared device count exceeds the supported maximum.
    InvalidCount,
    /// Required payload field missing or payload too short.
    LengthMismatch,
    /// Motor RPM or target RPM exceeds the plausible maximum.
    HighRpm,
    /// Temperature outside the plausible range.
    InvalidTemp,
    /// PWM duty exceeds the PWM period.
    InvalidPwm,
    /// Enumerated field outside its legal set.
    InvalidValue,
    /// Reserved: CRC failure tagged into statistics.
    CrcError,
    /// Reserved: decode or parse failure tagged into statistics.
    DecodeError,
}

impl AnomalyKind {
    /// Stable lowercase label for logs and counters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InvalidCount => "invalid-count",
            Self::LengthMismatch => "length-mismatch",
            Self::HighRpm => "high-rpm",
            Self::InvalidTemp => "invalid-temp",
            Self::InvalidPwm => "invalid-pwm",
            Self::InvalidValue => "invalid-value",
            Self::CrcError => "crc-error",
            Self::DecodeError => "decode-error",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One structured detail attached to an anomaly.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailValue {
    /// Unsigned integer detail.
    Unsigned(u64),
    /// Signed integer detail.
    Signed(i64),
    /// Floating point detail.
    Float(f64),
    /// Boolean detail.
    Bool(bool),
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(value) => write!(f, "{value}"),
            Self::Signed(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<u64> for DetailValue {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

impl From<i64> for DetailValue {
    fn from(value: i64) -> Self {
        Self::Signed(value)
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for DetailValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One classified validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    /// What kind of finding this is.
    pub kind: AnomalyKind,
    /// Human-readable description.
    pub message: String,
    /// Structured fields for log aggregation, in insertion order.
    pub details: Vec<(&'static str, DetailValue)>,
}

impl Anomaly {
    fn new(kind: AnomalyKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), details: Vec::new() }
    }

    fn with(mut self, key: &'static str, value: impl Into<DetailValue>) -> Self {
        self.details.push((key, value.into()));
        self
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Validate one packet against the per-type rules.
///
/// An unparseable payload yields a single [`AnomalyKind::DecodeError`]
/// finding; message types without rules (including unknown ones) pass
/// with no findings.
#[must_use]
pub fn validate(packet: &Packet) -> Vec<Anomaly> {
    let Some(message_type) = packet.message_type() else {
        let message = packet
            .parse_error()
            .map_or_else(|| "payload failed to parse".to_owned(), |err| err.to_string());
        return vec![Anomaly::new(AnomalyKind::DecodeError, message)];
    };

    let mut anomalies = Vec::new();
    match MessageType::from_u8(message_type) {
        Some(MessageType::StateData) => check_state_data(packet.inner(), &mut anomalies),
        Some(MessageType::MotorData) => check_motor_data(packet.inner(), &mut anomalies),
        Some(MessageType::TemperatureData) => {
            check_temperature_data(packet.inner(), &mut anomalies);
        },
        Some(MessageType::GlowCommand) => check_glow_command(packet.inner(), &mut anomalies),
        Some(MessageType::DeviceAnnounce) => {
            check_device_announce(packet.address(), packet.inner(), &mut anomalies);
        },
        _ => {},
    }
    anomalies
}

fn check_state_data(inner: Option<&InnerMap>, anomalies: &mut Vec<Anomaly>) {
    let Some(state) = inner.and_then(|map| map.get_u64(keys::state_data::STATE)) else {
        anomalies.push(Anomaly::new(
            AnomalyKind::LengthMismatch,
            "state-data without a state field",
        ));
        return;
    };

    if state > MAX_STATE {
        anomalies.push(
            Anomaly::new(AnomalyKind::InvalidValue, format!("state {state} out of range"))
                .with("state", state)
                .with("max", MAX_STATE),
        );
    }

    if let Some(code) = inner.and_then(|map| map.get_i64(keys::state_data::CODE))
        && i8::try_from(code).is_err()
    {
        anomalies.push(
            Anomaly::new(
                AnomalyKind::InvalidValue,
                format!("error code {code} does not fit a signed byte"),
            )
            .with("code", code),
        );
    }
}

fn check_motor_data(inner: Option<&InnerMap>, anomalies: &mut Vec<Anomaly>) {
    let Some(map) = inner else { return };

    for (key, field) in [(keys::motor_data::RPM, "rpm"), (keys::motor_data::TARGET, "target")] {
        if let Some(rpm) = map.get_u64(key)
            && rpm > MAX_RPM
        {
            anomalies.push(
                Anomaly::new(AnomalyKind::HighRpm, format!("{field} {rpm} exceeds {MAX_RPM}"))
                    .with(field, rpm)
                    .with("max", MAX_RPM),
            );
        }
    }

    if let Some(pwm) = map.get_u64(keys::motor_data::PWM)
        && let Some(pwm_max) = map.get_u64(keys::motor_data::PWM_MAX)
        && pwm > pwm_max
    {
        anomalies.push(
            Anomaly::new(
                AnomalyKind::InvalidPwm,
                format!("pwm duty {pwm} exceeds period {pwm_max}"),
            )
            .with("pwm", pwm)
            .with("pwm_max", pwm_max),
        );
    }
}

fn check_temperature_data(inner: Option<&InnerMap>, anomalies: &mut Vec<Anomaly>) {
    let Some(reading) = inner.and_then(|map| map.get_f64(keys::temperature_data::READING)) else {
        anomalies.push(Anomaly::new(
            AnomalyKind::LengthMismatch,
            "temperature-data without a reading",
        ));
        return;
    };

    if !TEMP_RANGE.contains(&reading) {
        anomalies.push(
            Anomaly::new(AnomalyKind::InvalidTemp, format!("reading {reading} °C out of range"))
                .with("reading", reading),
        );
    }

    if let Some(target) =
        inner.and_then(|map| map.get_f64(keys::temperature_data::TARGET_TEMPERATURE))
        && !TEMP_RANGE.contains(&target)
    {
        anomalies.push(
            Anomaly::new(AnomalyKind::InvalidTemp, format!("target {target} °C out of range"))
                .with("target", target),
        );
    }
}

fn check_glow_command(inner: Option<&InnerMap>, anomalies: &mut Vec<Anomaly>) {
    let Some(duration) = inner.and_then(|map| map.get_u64(keys::glow_command::DURATION_MS)) else {
        anomalies.push(Anomaly::new(
            AnomalyKind::LengthMismatch,
            "glow-command without a duration",
        ));
        return;
    };

    if duration > MAX_GLOW_DURATION_MS {
        anomalies.push(
            Anomaly::new(
                AnomalyKind::InvalidValue,
                format!("glow duration {duration} ms exceeds {MAX_GLOW_DURATION_MS}"),
            )
            .with("duration_ms", duration)
            .with("max", MAX_GLOW_DURATION_MS),
        );
    }
}

fn check_device_announce(address: u64, inner: Option<&InnerMap>, anomalies: &mut Vec<Anomaly>) {
    let counts = [
        ("motor_count", keys::device_announce::MOTOR_COUNT),
        ("thermometer_count", keys::device_announce::THERMOMETER_COUNT),
        ("pump_count", keys::device_announce::PUMP_COUNT),
        ("glow_count", keys::device_announce::GLOW_COUNT),
    ]
    .map(|(name, key)| (name, inner.and_then(|map| map.get_u64(key)).unwrap_or(0)));

    // End-of-discovery sentinel: a stateless-addressed announce with
    // every count at zero terminates a sweep and is exempt.
    if address == STATELESS_ADDRESS && counts.iter().all(|&(_, count)| count == 0) {
        return;
    }

    for (name, count) in counts {
        if count > MAX_DEVICE_COUNT {
            anomalies.push(
                Anomaly::new(
                    AnomalyKind::InvalidCount,
                    format!("{name} {count} exceeds {MAX_DEVICE_COUNT}"),
                )
                .with(name, count)
                .with("max", MAX_DEVICE_COUNT),
            );
        }
    }
}

//! Named constructors for common outbound messages.
//!
//! Each builder returns a [`Packet`] description with the documented
//! type and key assignments; none of them emit bytes. Hand the result
//! to [`encode_packet`](crate::encode_packet) when it is time to
//! serialize.

use crate::message::{MessageType, keys};
use crate::packet::{BROADCAST_ADDRESS, Packet, STATELESS_ADDRESS};
use crate::payload::InnerMap;

/// Construct a description, which cannot fail for builder payloads.
fn build(address: u64, message_type: MessageType, inner: Option<InnerMap>) -> Packet {
    // INVARIANT: every builder payload is a handful of small integer
    // entries, far below MAX_PAYLOAD_SIZE.
    Packet::new(address, message_type.to_u8(), inner)
        .unwrap_or_else(|_| unreachable!("builder payloads stay under MAX_PAYLOAD_SIZE"))
}

/// Drive the appliance state machine to `mode`, with an optional
/// mode-specific argument.
#[must_use]
pub fn set_state(address: u64, mode: u8, argument: Option<u64>) -> Packet {
    let mut map = InnerMap::new();
    map.insert_u64(keys::state_command::MODE, u64::from(mode));
    if let Some(argument) = argument {
        map.insert_u64(keys::state_command::ARGUMENT, argument);
    }
    build(address, MessageType::StateCommand, Some(map))
}

/// Liveness probe. The appliance answers with a ping response
/// carrying its uptime.
#[must_use]
pub fn ping_request(address: u64) -> Packet {
    build(address, MessageType::PingRequest, None)
}

/// Set the telemetry cadence.
#[must_use]
pub fn telemetry_config(address: u64, interval_ms: u64) -> Packet {
    let mut map = InnerMap::new();
    map.insert_u64(keys::telemetry_config::INTERVAL_MS, interval_ms);
    build(address, MessageType::TelemetryConfig, Some(map))
}

/// Command one motor to a target RPM.
#[must_use]
pub fn set_motor_rpm(address: u64, index: u8, rpm: u64) -> Packet {
    let mut map = InnerMap::new();
    map.insert_u64(keys::motor_command::INDEX, u64::from(index));
    map.insert_u64(keys::motor_command::TARGET_RPM, rpm);
    build(address, MessageType::MotorCommand, Some(map))
}

/// Command one pump to a dosing rate in Hz.
#[must_use]
pub fn set_pump_rate(address: u64, index: u8, rate: f64) -> Packet {
    let mut map = InnerMap::new();
    map.insert_u64(keys::pump_command::INDEX, u64::from(index));
    map.insert_f64(keys::pump_command::RATE, rate);
    build(address, MessageType::PumpCommand, Some(map))
}

/// Activate one glow plug for `duration_ms` milliseconds.
#[must_use]
pub fn set_glow_duration(address: u64, index: u8, duration_ms: u64) -> Packet {
    let mut map = InnerMap::new();
    map.insert_u64(keys::glow_command::INDEX, u64::from(index));
    map.insert_u64(keys::glow_command::DURATION_MS, duration_ms);
    build(address, MessageType::GlowCommand, Some(map))
}

/// Ask every appliance on the link to announce itself.
///
/// Always broadcast; appliances reply with device-announce frames and
/// a router terminates the sweep with the end-of-discovery sentinel
/// (stateless address, all counts zero).
#[must_use]
pub fn discovery_request() -> Packet {
    build(BROADCAST_ADDRESS, MessageType::DiscoveryRequest, None)
}

/// Ask the router to forward one appliance's telemetry.
///
/// Router-addressed: the frame goes to the stateless address and
/// names the appliance in the map.
#[must_use]
pub fn subscribe_appliance(appliance: u64) -> Packet {
    let mut map = InnerMap::new();
    map.insert_u64(keys::data_subscription::APPLIANCE_ADDRESS, appliance);
    build(STATELESS_ADDRESS, MessageType::DataSubscription, Some(map))
}

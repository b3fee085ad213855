//! End-to-end scenarios through the full inbound pipeline:
//! encoder → byte stream → session (decoder → validator → statistics).

use fusain_core::{AnomalyKind, Session, SessionEvent};
use fusain_proto::message::{MessageType, keys};
use fusain_proto::{InnerMap, Packet, encode_packet};

const APPLIANCE: u64 = 0x00C0_FFEE_0000_0001;

fn telemetry(message_type: MessageType, map: InnerMap) -> Vec<u8> {
    let packet = Packet::new(APPLIANCE, message_type.to_u8(), Some(map)).unwrap();
    encode_packet(&packet).to_vec()
}

fn state_data() -> Vec<u8> {
    let mut map = InnerMap::new();
    map.insert_bool(keys::state_data::ERROR, false);
    map.insert_i64(keys::state_data::CODE, 0);
    map.insert_u64(keys::state_data::STATE, 4);
    map.insert_u64(keys::state_data::TIMESTAMP, 3_600_000);
    telemetry(MessageType::StateData, map)
}

fn motor_data(rpm: u64) -> Vec<u8> {
    let mut map = InnerMap::new();
    map.insert_u64(keys::motor_data::INDEX, 0);
    map.insert_u64(keys::motor_data::RPM, rpm);
    map.insert_u64(keys::motor_data::TARGET, rpm.min(2500));
    telemetry(MessageType::MotorData, map)
}

fn temperature_data(reading: f64) -> Vec<u8> {
    let mut map = InnerMap::new();
    map.insert_u64(keys::temperature_data::INDEX, 0);
    map.insert_f64(keys::temperature_data::READING, reading);
    telemetry(MessageType::TemperatureData, map)
}

fn ping_response(uptime_ms: u64) -> Vec<u8> {
    let mut map = InnerMap::new();
    map.insert_u64(keys::ping_response::UPTIME_MS, uptime_ms);
    telemetry(MessageType::PingResponse, map)
}

/// A telemetry bundle of four clean frames decodes, validates clean,
/// and counts as four valid packets.
#[test]
fn telemetry_bundle_is_clean_end_to_end() {
    let mut stream = Vec::new();
    stream.extend(state_data());
    stream.extend(motor_data(2500));
    stream.extend(temperature_data(185.5));
    stream.extend(ping_response(3_600_000));

    let mut session = Session::new();
    let events = session.push(&stream);

    assert_eq!(events.len(), 4);
    let mut types = Vec::new();
    for event in &events {
        let SessionEvent::Packet { packet, anomalies } = event else {
            unreachable!("clean stream produced an error event");
        };
        assert!(anomalies.is_empty());
        assert_eq!(packet.address(), APPLIANCE);
        types.push(packet.message_type().unwrap());
    }
    assert_eq!(types, vec![0x30, 0x31, 0x34, 0x3F]);

    let counters = session.stats().counters();
    assert_eq!(counters.total, 4);
    assert_eq!(counters.valid, 4);
}

/// A motor frame with an implausible RPM is still delivered, but
/// flagged and counted as anomalous rather than valid.
#[test]
fn high_rpm_is_flagged_but_delivered() {
    let mut session = Session::new();
    let events = session.push(&motor_data(7000));

    assert_eq!(events.len(), 1);
    let SessionEvent::Packet { packet, anomalies } = &events[0] else {
        unreachable!("expected a packet event");
    };
    assert_eq!(packet.message_type(), Some(0x31));
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].kind, AnomalyKind::HighRpm);

    let counters = session.stats().counters();
    assert_eq!(counters.total, 1);
    assert_eq!(counters.valid, 0);
    assert_eq!(counters.anomalous, 1);
    assert_eq!(counters.high_rpm, 1);
}

/// Two hundred octets of line noise, then a valid frame: the frame
/// decodes, the noise is reported through the pre-sync counter.
#[test]
fn noise_burst_resynchronizes_and_is_accounted_for() {
    // Deterministic pseudo-noise that never contains START (0x7E).
    let mut noise: Vec<u8> = (0u32..200).map(|i| (i.wrapping_mul(151) >> 3) as u8).collect();
    for octet in &mut noise {
        if *octet == 0x7E {
            *octet = 0x00;
        }
    }

    let mut session = Session::new();
    assert!(session.push(&noise).is_empty());

    let events = session.push(&ping_response(1000));
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], SessionEvent::Packet { .. }));
    assert!(session.synced());
    assert_eq!(session.pre_sync_discarded(), 200);
}

/// Statistics see every decode result, including errors the session
/// policy keeps away from the event stream.
#[test]
fn suppressed_pre_sync_errors_still_reach_statistics() {
    // Flip one bit of the CBOR head: START + LEN + 8 address octets
    // put the payload at offset 10.
    let mut corrupted = ping_response(1000);
    corrupted[11] ^= 0x01;

    let mut session = Session::new();
    let events = session.push(&corrupted);
    assert!(events.is_empty());
    assert_eq!(session.pre_sync_errors(), 1);

    let counters = session.stats().counters();
    assert_eq!(counters.total, 1);
    assert_eq!(counters.crc_errors + counters.decode_errors, 1);
}

/// An unparseable payload flows through as a packet with a
/// decode-error anomaly, not as a framing error.
#[test]
fn malformed_cbor_is_delivered_with_a_decode_anomaly() {
    // Frame whose payload is a bare uint instead of the outer array.
    let payload = [0x18, 0x2F];
    let mut covered = vec![payload.len() as u8];
    covered.extend_from_slice(&APPLIANCE.to_le_bytes());
    covered.extend_from_slice(&payload);
    let crc = fusain_proto::crc16(&covered);

    let mut frame = vec![0x7E];
    frame.extend_from_slice(&covered);
    frame.extend_from_slice(&crc.to_be_bytes());
    frame.push(0x7F);

    let mut session = Session::new();
    let events = session.push(&frame);

    assert_eq!(events.len(), 1);
    let SessionEvent::Packet { packet, anomalies } = &events[0] else {
        unreachable!("parse failures must not become framing errors");
    };
    assert!(packet.parse_error().is_some());
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].kind, AnomalyKind::DecodeError);

    // Tagged into the decode-error bucket, not valid.
    let counters = session.stats().counters();
    assert_eq!(counters.valid, 0);
    assert_eq!(counters.decode_errors, 1);
}

//! Sans-IO session: decoder, validator, and statistics in one place.
//!
//! A [`Session`] owns one [`Decoder`] and one [`Stats`] tracker and
//! applies the caller-side policy the raw layers deliberately leave
//! out: framing errors before the first successful decode are counted
//! but not surfaced (initial junk is expected on cold start and
//! reconnection), and statistics are fed from every decode result even
//! when the caller drops events downstream.
//!
//! The session never blocks. The caller reads octets from whatever
//! transport it wraps, pushes them here, and forwards the returned
//! events; protocol logic stays out of the I/O path.

use fusain_proto::{Decoder, FramingError, Packet};

use crate::stats::Stats;
use crate::validate::{self, Anomaly};

/// One event out of the session per decoder completion.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A frame completed and was validated.
    ///
    /// Anomalies are advisory: the packet is always delivered, and
    /// whether to act on the findings is the consumer's choice.
    Packet {
        /// The decoded packet.
        packet: Packet,
        /// Validation findings, empty when none.
        anomalies: Vec<Anomaly>,
    },
    /// A framing error after first sync.
    Error(FramingError),
}

/// Sans-IO pipeline for one byte stream.
#[derive(Debug)]
pub struct Session {
    decoder: Decoder,
    stats: Stats,
    synced: bool,
    pre_sync_discarded: u64,
    pre_sync_errors: u64,
}

impl Session {
    /// Create a session with a fresh decoder and statistics tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoder: Decoder::new(),
            stats: Stats::new(),
            synced: false,
            pre_sync_discarded: 0,
            pre_sync_errors: 0,
        }
    }

    /// Feed received octets; returns completed events in input order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for &octet in bytes {
            // Octets the idle decoder is about to discard are the
            // pre-sync junk the caller may want to report.
            let idle_junk =
                !self.synced && self.decoder.is_idle() && octet != fusain_proto::framing::START;

            let Some(result) = self.decoder.decode_byte(octet) else {
                if idle_junk {
                    self.pre_sync_discarded += 1;
                }
                continue;
            };

            match result {
                Ok(packet) => {
                    self.synced = true;
                    let anomalies = validate::validate(&packet);
                    if !anomalies.is_empty() {
                        tracing::warn!(
                            address = packet.address(),
                            message_type = packet.message_type(),
                            count = anomalies.len(),
                            "validation anomalies"
                        );
                    }
                    self.stats.update(Some(&packet), None, &anomalies);
                    events.push(SessionEvent::Packet { packet, anomalies });
                },
                Err(err) => {
                    self.stats.update(None, Some(&err), &[]);
                    if self.synced {
                        tracing::debug!(error = %err, "framing error");
                        events.push(SessionEvent::Error(err));
                    } else {
                        self.pre_sync_errors += 1;
                        tracing::debug!(error = %err, "pre-sync framing error discarded");
                    }
                },
            }
        }
        events
    }

    /// True once at least one valid frame has been decoded since
    /// construction or the last reset.
    #[must_use]
    pub fn synced(&self) -> bool {
        self.synced
    }

    /// Octets discarded between frames before first sync.
    #[must_use]
    pub fn pre_sync_discarded(&self) -> u64 {
        self.pre_sync_discarded
    }

    /// Framing errors suppressed before first sync. Statistics still
    /// count them.
    #[must_use]
    pub fn pre_sync_errors(&self) -> u64 {
        self.pre_sync_errors
    }

    /// Statistics for this stream.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Drop any partial frame, zero statistics, and lose sync.
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.stats.reset();
        self.synced = false;
        self.pre_sync_discarded = 0;
        self.pre_sync_errors = 0;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

//! Validation, statistics, and session policy for Fusain streams.
//!
//! `fusain-proto` turns octets into packets; this crate decides what
//! the packets mean for an operator. The [`mod@validate`] module checks
//! telemetry against the firmware's accepted ranges and classifies
//! findings into a stable anomaly taxonomy, [`stats`] aggregates
//! counters and rates per stream, and [`session`] composes decoder,
//! validator, and statistics behind one sans-IO push interface with
//! the sync-tracking policy tools expect.
//!
//! Nothing here is fatal: anomalies are advisory, framing errors are
//! recoverable, and every instance is independent so one process can
//! watch a fleet of connections without shared state.

pub mod session;
pub mod stats;
pub mod validate;

pub use session::{Session, SessionEvent};
pub use stats::{Counters, Rates, Stats};
pub use validate::{Anomaly, AnomalyKind, DetailValue, validate};

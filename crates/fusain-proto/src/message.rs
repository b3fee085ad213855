//! Message type enumeration and per-message key assignments.
//!
//! Types are organized in ranges: configuration (`0x10..=0x1F`,
//! controller to appliance), control (`0x20..=0x2F`, controller to
//! appliance), telemetry (`0x30..=0x3F`, appliance to controller), and
//! errors (`0xE0..=0xEF`, bidirectional). The wire carries the raw
//! octet; unknown values still decode as packets and are simply not
//! validated.

/// Fusain message types.
///
/// The discriminant is the on-wire value. Conversion is explicit via
/// [`MessageType::from_u8`] and [`MessageType::to_u8`]; unrecognized
/// octets are represented as `None` rather than an error so that new
/// firmware types degrade gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Motor limits and ramp configuration.
    MotorConfig = 0x10,
    /// Pump dosing configuration.
    PumpConfig = 0x11,
    /// Thermometer and control-loop configuration.
    TemperatureConfig = 0x12,
    /// Glow plug configuration.
    GlowConfig = 0x13,
    /// Subscribe to an appliance's telemetry (router-addressed).
    DataSubscription = 0x14,
    /// Cancel a telemetry subscription.
    DataUnsubscribe = 0x15,
    /// Telemetry cadence configuration.
    TelemetryConfig = 0x16,
    /// Link supervision timeout configuration.
    TimeoutConfig = 0x17,
    /// Ask every appliance on the link to announce itself.
    DiscoveryRequest = 0x1F,

    /// Drive the appliance state machine.
    StateCommand = 0x20,
    /// Per-motor RPM target.
    MotorCommand = 0x21,
    /// Per-pump dosing rate.
    PumpCommand = 0x22,
    /// Per-glow-plug activation.
    GlowCommand = 0x23,
    /// Per-zone temperature target.
    TemperatureCommand = 0x24,
    /// Request an immediate telemetry burst.
    SendTelemetry = 0x25,
    /// Liveness probe.
    PingRequest = 0x2F,

    /// Appliance state machine report.
    StateData = 0x30,
    /// Motor telemetry.
    MotorData = 0x31,
    /// Pump telemetry.
    PumpData = 0x32,
    /// Glow plug telemetry.
    GlowData = 0x33,
    /// Thermometer telemetry.
    TemperatureData = 0x34,
    /// Device inventory announcement (discovery reply).
    DeviceAnnounce = 0x35,
    /// Liveness probe reply.
    PingResponse = 0x3F,

    /// Command rejected as unknown or malformed.
    ErrorInvalidCommand = 0xE0,
    /// Command rejected by the current appliance state.
    ErrorStateReject = 0xE1,
}

impl MessageType {
    /// Parse an on-wire message type octet. `None` if unrecognized.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x10 => Some(Self::MotorConfig),
            0x11 => Some(Self::PumpConfig),
            0x12 => Some(Self::TemperatureConfig),
            0x13 => Some(Self::GlowConfig),
            0x14 => Some(Self::DataSubscription),
            0x15 => Some(Self::DataUnsubscribe),
            0x16 => Some(Self::TelemetryConfig),
            0x17 => Some(Self::TimeoutConfig),
            0x1F => Some(Self::DiscoveryRequest),
            0x20 => Some(Self::StateCommand),
            0x21 => Some(Self::MotorCommand),
            0x22 => Some(Self::PumpCommand),
            0x23 => Some(Self::GlowCommand),
            0x24 => Some(Self::TemperatureCommand),
            0x25 => Some(Self::SendTelemetry),
            0x2F => Some(Self::PingRequest),
            0x30 => Some(Self::StateData),
            0x31 => Some(Self::MotorData),
            0x32 => Some(Self::PumpData),
            0x33 => Some(Self::GlowData),
            0x34 => Some(Self::TemperatureData),
            0x35 => Some(Self::DeviceAnnounce),
            0x3F => Some(Self::PingResponse),
            0xE0 => Some(Self::ErrorInvalidCommand),
            0xE1 => Some(Self::ErrorStateReject),
            _ => None,
        }
    }

    /// On-wire message type octet.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Controller-to-appliance configuration range.
    #[must_use]
    pub const fn is_configuration(self) -> bool {
        matches!(self.to_u8(), 0x10..=0x1F)
    }

    /// Controller-to-appliance control range.
    #[must_use]
    pub const fn is_control(self) -> bool {
        matches!(self.to_u8(), 0x20..=0x2F)
    }

    /// Appliance-to-controller telemetry range.
    #[must_use]
    pub const fn is_telemetry(self) -> bool {
        matches!(self.to_u8(), 0x30..=0x3F)
    }

    /// Bidirectional error range.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self.to_u8(), 0xE0..=0xEF)
    }

    /// Stable lowercase name, as shown by log viewers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MotorConfig => "motor-config",
            Self::PumpConfig => "pump-config",
            Self::TemperatureConfig => "temperature-config",
            Self::GlowConfig => "glow-config",
            Self::DataSubscription => "data-subscription",
            Self::DataUnsubscribe => "data-unsubscribe",
            Self::TelemetryConfig => "telemetry-config",
            Self::TimeoutConfig => "timeout-config",
            Self::DiscoveryRequest => "discovery-request",
            Self::StateCommand => "state-command",
            Self::MotorCommand => "motor-command",
            Self::PumpCommand => "pump-command",
            Self::GlowCommand => "glow-command",
            Self::TemperatureCommand => "temperature-command",
            Self::SendTelemetry => "send-telemetry",
            Self::PingRequest => "ping-request",
            Self::StateData => "state-data",
            Self::MotorData => "motor-data",
            Self::PumpData => "pump-data",
            Self::GlowData => "glow-data",
            Self::TemperatureData => "temperature-data",
            Self::DeviceAnnounce => "device-announce",
            Self::PingResponse => "ping-response",
            Self::ErrorInvalidCommand => "error-invalid-command",
            Self::ErrorStateReject => "error-state-reject",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Inner-map key assignments, one module per message type.
///
/// Producers use these constants when building maps; validators and
/// formatters address fields by key only, never by position.
pub mod keys {
    /// Keys for [`MessageType::StateData`](crate::message::MessageType::StateData).
    pub mod state_data {
        /// Error flag (bool).
        pub const ERROR: u64 = 0;
        /// Error code (int, fits a signed byte).
        pub const CODE: u64 = 1;
        /// Current state index (uint, `0..=8`).
        pub const STATE: u64 = 2;
        /// Appliance timestamp (uint, milliseconds).
        pub const TIMESTAMP: u64 = 3;
    }

    /// Keys for [`MessageType::MotorData`](crate::message::MessageType::MotorData).
    pub mod motor_data {
        /// Motor index (uint).
        pub const INDEX: u64 = 0;
        /// Appliance timestamp (uint, milliseconds).
        pub const TIMESTAMP: u64 = 1;
        /// Measured RPM (uint).
        pub const RPM: u64 = 2;
        /// Commanded RPM (uint).
        pub const TARGET: u64 = 3;
        /// Configured ceiling (uint).
        pub const MAX_RPM: u64 = 4;
        /// Configured floor (uint).
        pub const MIN_RPM: u64 = 5;
        /// Current PWM duty (uint).
        pub const PWM: u64 = 6;
        /// PWM period (uint).
        pub const PWM_MAX: u64 = 7;
    }

    /// Keys for [`MessageType::PumpData`](crate::message::MessageType::PumpData).
    pub mod pump_data {
        /// Pump index (uint).
        pub const INDEX: u64 = 0;
        /// Appliance timestamp (uint, milliseconds).
        pub const TIMESTAMP: u64 = 1;
        /// Measured dosing rate (float, Hz).
        pub const RATE: u64 = 2;
        /// Commanded dosing rate (float, Hz).
        pub const TARGET_RATE: u64 = 3;
    }

    /// Keys for [`MessageType::GlowData`](crate::message::MessageType::GlowData).
    pub mod glow_data {
        /// Glow plug index (uint).
        pub const INDEX: u64 = 0;
        /// Appliance timestamp (uint, milliseconds).
        pub const TIMESTAMP: u64 = 1;
        /// Remaining activation time (uint, milliseconds).
        pub const REMAINING_MS: u64 = 2;
    }

    /// Keys for
    /// [`MessageType::TemperatureData`](crate::message::MessageType::TemperatureData).
    pub mod temperature_data {
        /// Thermometer index (uint).
        pub const INDEX: u64 = 0;
        /// Appliance timestamp (uint, milliseconds).
        pub const TIMESTAMP: u64 = 1;
        /// Measured temperature (float, °C).
        pub const READING: u64 = 2;
        /// Whether this thermometer drives a motor loop (bool).
        pub const RPM_CONTROL: u64 = 3;
        /// Motor index under control (uint).
        pub const WATCHED_MOTOR: u64 = 4;
        /// Control loop target (float, °C).
        pub const TARGET_TEMPERATURE: u64 = 5;
    }

    /// Keys for
    /// [`MessageType::PingResponse`](crate::message::MessageType::PingResponse).
    pub mod ping_response {
        /// Appliance uptime (uint, milliseconds).
        pub const UPTIME_MS: u64 = 0;
    }

    /// Keys for
    /// [`MessageType::DeviceAnnounce`](crate::message::MessageType::DeviceAnnounce).
    pub mod device_announce {
        /// Motor count (uint, `0..=10`).
        pub const MOTOR_COUNT: u64 = 0;
        /// Thermometer count (uint, `0..=10`).
        pub const THERMOMETER_COUNT: u64 = 1;
        /// Pump count (uint, `0..=10`).
        pub const PUMP_COUNT: u64 = 2;
        /// Glow plug count (uint, `0..=10`).
        pub const GLOW_COUNT: u64 = 3;
    }

    /// Keys for
    /// [`MessageType::StateCommand`](crate::message::MessageType::StateCommand).
    pub mod state_command {
        /// Requested mode (uint).
        pub const MODE: u64 = 0;
        /// Mode argument (uint, optional).
        pub const ARGUMENT: u64 = 1;
    }

    /// Keys for
    /// [`MessageType::MotorCommand`](crate::message::MessageType::MotorCommand).
    pub mod motor_command {
        /// Motor index (uint).
        pub const INDEX: u64 = 0;
        /// Requested RPM (uint).
        pub const TARGET_RPM: u64 = 1;
    }

    /// Keys for
    /// [`MessageType::PumpCommand`](crate::message::MessageType::PumpCommand).
    pub mod pump_command {
        /// Pump index (uint).
        pub const INDEX: u64 = 0;
        /// Requested dosing rate (float, Hz).
        pub const RATE: u64 = 1;
    }

    /// Keys for
    /// [`MessageType::GlowCommand`](crate::message::MessageType::GlowCommand).
    pub mod glow_command {
        /// Glow plug index (uint).
        pub const INDEX: u64 = 0;
        /// Activation duration (uint, milliseconds, `0..=300000`).
        pub const DURATION_MS: u64 = 1;
    }

    /// Keys for
    /// [`MessageType::TemperatureCommand`](crate::message::MessageType::TemperatureCommand).
    pub mod temperature_command {
        /// Thermometer index (uint).
        pub const INDEX: u64 = 0;
        /// Requested temperature (float, °C).
        pub const TARGET: u64 = 1;
    }

    /// Keys for
    /// [`MessageType::TelemetryConfig`](crate::message::MessageType::TelemetryConfig).
    pub mod telemetry_config {
        /// Telemetry cadence (uint, milliseconds).
        pub const INTERVAL_MS: u64 = 0;
    }

    /// Keys for
    /// [`MessageType::DataSubscription`](crate::message::MessageType::DataSubscription).
    pub mod data_subscription {
        /// Appliance address whose telemetry to forward (uint).
        pub const APPLIANCE_ADDRESS: u64 = 0;
    }

    /// Keys shared by the `0xE0` error range.
    pub mod error {
        /// Message type the error refers to (uint).
        pub const OFFENDING_TYPE: u64 = 0;
        /// Firmware-specific detail code (int).
        pub const DETAIL_CODE: u64 = 1;
    }
}

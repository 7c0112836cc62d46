//! Token tables for the relay wire protocol.
//!
//! Two fixed tables map the short ASCII tokens used on the wire to semantic
//! kinds: one for the primary code that opens every command, and one for the
//! operation codes that refine it. Both tables are bijective over their known
//! entries, and lookups never fail: unrecognised tokens map to an `Unknown`
//! sentinel.

use std::fmt;

/// Separator between tokens of a command.
pub const DELIMITER: char = ':';

/// Semantic category identified by the primary code of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Thermostat power (`TS`).
    ThermostatPower,
    /// Override or programming toggle (`PO`).
    Override,
    /// Rule change (`TR`).
    RuleChange,
    /// Sensor data report (`DR`).
    SensorData,
    /// Time request or response (`CR`).
    TimeRequest,
    /// Status query (`ST`).
    Status,
    /// Primary code not present in the registry.
    Unknown,
}

const PRIMARY_CODES: [(CommandKind, &str); 6] = [
    (CommandKind::ThermostatPower, "TS"),
    (CommandKind::Override, "PO"),
    (CommandKind::RuleChange, "TR"),
    (CommandKind::SensorData, "DR"),
    (CommandKind::TimeRequest, "CR"),
    (CommandKind::Status, "ST"),
];

impl CommandKind {
    /// Resolves a primary code, yielding [`CommandKind::Unknown`] for anything
    /// outside the registry.
    ///
    /// ```
    /// use relay_protocol::CommandKind;
    ///
    /// assert_eq!(CommandKind::from_token("CR"), CommandKind::TimeRequest);
    /// assert_eq!(CommandKind::from_token("ZZ"), CommandKind::Unknown);
    /// ```
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        PRIMARY_CODES
            .iter()
            .find(|(_, code)| *code == token)
            .map_or(Self::Unknown, |(kind, _)| *kind)
    }

    /// Returns the wire token for a known kind.
    #[must_use]
    pub fn token(self) -> Option<&'static str> {
        PRIMARY_CODES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, code)| *code)
    }

    /// Every kind that has a wire token, in registry order.
    pub fn known() -> impl Iterator<Item = Self> {
        PRIMARY_CODES.iter().map(|(kind, _)| *kind)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ThermostatPower => "thermostat_power",
            Self::Override => "override",
            Self::RuleChange => "rule_change",
            Self::SensorData => "sensor_data",
            Self::TimeRequest => "time_request",
            Self::Status => "status",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Operation or acknowledgement code carried after the primary code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Negative acknowledgement (`NACK`).
    Nack,
    /// Positive acknowledgement (`ACK`).
    Ack,
    /// Switch off (`OFF`).
    Off,
    /// Switch on (`ON`).
    On,
    /// Read a value (`GET`).
    Get,
    /// Add an entry (`ADD`).
    Add,
    /// Delete an entry (`DELETE`).
    Delete,
    /// Move an entry (`MOVE`).
    Move,
    /// Update an entry (`UPDATE`).
    Update,
    /// Write a value (`SET`).
    Set,
    /// Operation code not present in the registry.
    Unknown,
}

const OPERATION_CODES: [(Operation, &str); 10] = [
    (Operation::Nack, "NACK"),
    (Operation::Ack, "ACK"),
    (Operation::Off, "OFF"),
    (Operation::On, "ON"),
    (Operation::Get, "GET"),
    (Operation::Add, "ADD"),
    (Operation::Delete, "DELETE"),
    (Operation::Move, "MOVE"),
    (Operation::Update, "UPDATE"),
    (Operation::Set, "SET"),
];

impl Operation {
    /// Resolves an operation code, yielding [`Operation::Unknown`] for
    /// anything outside the registry.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        OPERATION_CODES
            .iter()
            .find(|(_, code)| *code == token)
            .map_or(Self::Unknown, |(operation, _)| *operation)
    }

    /// Returns the wire token for a known operation.
    #[must_use]
    pub fn token(self) -> Option<&'static str> {
        OPERATION_CODES
            .iter()
            .find(|(operation, _)| *operation == self)
            .map(|(_, code)| *code)
    }

    /// Every operation that has a wire token, in registry order.
    pub fn known() -> impl Iterator<Item = Self> {
        OPERATION_CODES.iter().map(|(operation, _)| *operation)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token().unwrap_or("UNKNOWN"))
    }
}

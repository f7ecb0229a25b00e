//! Consistency levels and write types
//!
//! These mirror the engine's replication-acknowledgment policies. The
//! numeric codes are part of the native protocol and must not change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Replication-acknowledgment policy for a read or write.
///
/// The wire codes match the native protocol:
/// ANY=0x00, ONE=0x01, TWO=0x02, THREE=0x03, QUORUM=0x04, ALL=0x05,
/// LOCAL_QUORUM=0x06, EACH_QUORUM=0x07, SERIAL=0x08, LOCAL_SERIAL=0x09,
/// LOCAL_ONE=0x0A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    /// A write must be written to at least one node, hints count
    Any,
    /// One replica
    One,
    /// Two replicas
    Two,
    /// Three replicas
    Three,
    /// A majority of replicas
    Quorum,
    /// All replicas
    All,
    /// A majority of replicas in the local datacenter
    LocalQuorum,
    /// A majority of replicas in each datacenter
    EachQuorum,
    /// Linearizable reads of conditional writes
    Serial,
    /// Linearizable reads confined to the local datacenter
    LocalSerial,
    /// One replica in the local datacenter
    LocalOne,
}

impl ConsistencyLevel {
    /// The protocol code for this level.
    pub fn code(&self) -> u16 {
        match self {
            ConsistencyLevel::Any => 0x00,
            ConsistencyLevel::One => 0x01,
            ConsistencyLevel::Two => 0x02,
            ConsistencyLevel::Three => 0x03,
            ConsistencyLevel::Quorum => 0x04,
            ConsistencyLevel::All => 0x05,
            ConsistencyLevel::LocalQuorum => 0x06,
            ConsistencyLevel::EachQuorum => 0x07,
            ConsistencyLevel::Serial => 0x08,
            ConsistencyLevel::LocalSerial => 0x09,
            ConsistencyLevel::LocalOne => 0x0A,
        }
    }

    /// Decode a protocol code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x00 => Some(ConsistencyLevel::Any),
            0x01 => Some(ConsistencyLevel::One),
            0x02 => Some(ConsistencyLevel::Two),
            0x03 => Some(ConsistencyLevel::Three),
            0x04 => Some(ConsistencyLevel::Quorum),
            0x05 => Some(ConsistencyLevel::All),
            0x06 => Some(ConsistencyLevel::LocalQuorum),
            0x07 => Some(ConsistencyLevel::EachQuorum),
            0x08 => Some(ConsistencyLevel::Serial),
            0x09 => Some(ConsistencyLevel::LocalSerial),
            0x0A => Some(ConsistencyLevel::LocalOne),
            _ => None,
        }
    }

    /// Whether this level is a serial (LWT) level.
    pub fn is_serial(&self) -> bool {
        matches!(
            self,
            ConsistencyLevel::Serial | ConsistencyLevel::LocalSerial
        )
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConsistencyLevel::Any => "ANY",
            ConsistencyLevel::One => "ONE",
            ConsistencyLevel::Two => "TWO",
            ConsistencyLevel::Three => "THREE",
            ConsistencyLevel::Quorum => "QUORUM",
            ConsistencyLevel::All => "ALL",
            ConsistencyLevel::LocalQuorum => "LOCAL_QUORUM",
            ConsistencyLevel::EachQuorum => "EACH_QUORUM",
            ConsistencyLevel::Serial => "SERIAL",
            ConsistencyLevel::LocalSerial => "LOCAL_SERIAL",
            ConsistencyLevel::LocalOne => "LOCAL_ONE",
        };
        write!(f, "{}", name)
    }
}

/// The kind of write a timed-out or failed mutation was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WriteType {
    /// A single-partition, non-batched write
    Simple,
    /// A logged batch
    Batch,
    /// An unlogged batch
    UnloggedBatch,
    /// A counter update
    Counter,
    /// The write of the batch log itself
    BatchLog,
    /// A compare-and-set write
    Cas,
    /// A materialized-view update
    View,
    /// A CDC-enabled write
    Cdc,
}

impl WriteType {
    /// Stable ordinal used for cross-model conversion.
    pub fn ordinal(&self) -> u8 {
        match self {
            WriteType::Simple => 0,
            WriteType::Batch => 1,
            WriteType::UnloggedBatch => 2,
            WriteType::Counter => 3,
            WriteType::BatchLog => 4,
            WriteType::Cas => 5,
            WriteType::View => 6,
            WriteType::Cdc => 7,
        }
    }

    /// Decode an ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(WriteType::Simple),
            1 => Some(WriteType::Batch),
            2 => Some(WriteType::UnloggedBatch),
            3 => Some(WriteType::Counter),
            4 => Some(WriteType::BatchLog),
            5 => Some(WriteType::Cas),
            6 => Some(WriteType::View),
            7 => Some(WriteType::Cdc),
            _ => None,
        }
    }
}

impl fmt::Display for WriteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteType::Simple => "SIMPLE",
            WriteType::Batch => "BATCH",
            WriteType::UnloggedBatch => "UNLOGGED_BATCH",
            WriteType::Counter => "COUNTER",
            WriteType::BatchLog => "BATCH_LOG",
            WriteType::Cas => "CAS",
            WriteType::View => "VIEW",
            WriteType::Cdc => "CDC",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_LEVELS: [ConsistencyLevel; 11] = [
        ConsistencyLevel::Any,
        ConsistencyLevel::One,
        ConsistencyLevel::Two,
        ConsistencyLevel::Three,
        ConsistencyLevel::Quorum,
        ConsistencyLevel::All,
        ConsistencyLevel::LocalQuorum,
        ConsistencyLevel::EachQuorum,
        ConsistencyLevel::Serial,
        ConsistencyLevel::LocalSerial,
        ConsistencyLevel::LocalOne,
    ];

    #[test]
    fn test_consistency_code_roundtrip() {
        for cl in ALL_LEVELS {
            assert_eq!(
                ConsistencyLevel::from_code(cl.code()),
                Some(cl),
                "{} should roundtrip through its code",
                cl
            );
        }
    }

    #[test]
    fn test_consistency_codes_are_unique() {
        let codes: std::collections::HashSet<u16> = ALL_LEVELS.iter().map(|c| c.code()).collect();
        assert_eq!(codes.len(), ALL_LEVELS.len(), "codes must be unique");
    }

    #[test]
    fn test_unknown_code_returns_none() {
        assert_eq!(ConsistencyLevel::from_code(0x0B), None);
        assert_eq!(ConsistencyLevel::from_code(0xFF), None);
    }

    #[test]
    fn test_serial_levels() {
        assert!(ConsistencyLevel::Serial.is_serial());
        assert!(ConsistencyLevel::LocalSerial.is_serial());
        assert!(!ConsistencyLevel::Quorum.is_serial());
    }

    #[test]
    fn test_consistency_display() {
        assert_eq!(format!("{}", ConsistencyLevel::LocalQuorum), "LOCAL_QUORUM");
        assert_eq!(format!("{}", ConsistencyLevel::Quorum), "QUORUM");
    }

    #[test]
    fn test_write_type_ordinal_roundtrip() {
        for wt in [
            WriteType::Simple,
            WriteType::Batch,
            WriteType::UnloggedBatch,
            WriteType::Counter,
            WriteType::BatchLog,
            WriteType::Cas,
            WriteType::View,
            WriteType::Cdc,
        ] {
            assert_eq!(WriteType::from_ordinal(wt.ordinal()), Some(wt));
        }
        assert_eq!(WriteType::from_ordinal(8), None);
    }
}

//! Foundational engine types
//!
//! The engine keeps its own enumerations for consistency, protocol
//! version and write type. They are structurally close to the
//! external ones but evolve independently; the bridge converts
//! between the two by numeric code, never by name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default port the engine's storage protocol listens on. Used when
/// widening an internal address-only endpoint identity to the
/// external address-and-port form.
pub const DEFAULT_STORAGE_PORT: u16 = 7000;

/// The engine's consistency-level enumeration.
///
/// Codes are identical to the external protocol codes; that identity
/// is what makes code-based conversion safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Consistency {
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    Serial,
    LocalSerial,
    LocalOne,
}

impl Consistency {
    /// The numeric code for this level.
    pub fn code(&self) -> u16 {
        match self {
            Consistency::Any => 0x00,
            Consistency::One => 0x01,
            Consistency::Two => 0x02,
            Consistency::Three => 0x03,
            Consistency::Quorum => 0x04,
            Consistency::All => 0x05,
            Consistency::LocalQuorum => 0x06,
            Consistency::EachQuorum => 0x07,
            Consistency::Serial => 0x08,
            Consistency::LocalSerial => 0x09,
            Consistency::LocalOne => 0x0A,
        }
    }

    /// Decode a numeric code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x00 => Some(Consistency::Any),
            0x01 => Some(Consistency::One),
            0x02 => Some(Consistency::Two),
            0x03 => Some(Consistency::Three),
            0x04 => Some(Consistency::Quorum),
            0x05 => Some(Consistency::All),
            0x06 => Some(Consistency::LocalQuorum),
            0x07 => Some(Consistency::EachQuorum),
            0x08 => Some(Consistency::Serial),
            0x09 => Some(Consistency::LocalSerial),
            0x0A => Some(Consistency::LocalOne),
            _ => None,
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Consistency::Any => "ANY",
            Consistency::One => "ONE",
            Consistency::Two => "TWO",
            Consistency::Three => "THREE",
            Consistency::Quorum => "QUORUM",
            Consistency::All => "ALL",
            Consistency::LocalQuorum => "LOCAL_QUORUM",
            Consistency::EachQuorum => "EACH_QUORUM",
            Consistency::Serial => "SERIAL",
            Consistency::LocalSerial => "LOCAL_SERIAL",
            Consistency::LocalOne => "LOCAL_ONE",
        };
        write!(f, "{}", name)
    }
}

/// The engine's protocol-version enumeration. The engine never
/// executes anything below V3, so V1/V2 have no representation here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum EngineProtocolVersion {
    V3,
    V4,
    V5,
}

impl EngineProtocolVersion {
    /// The numeric version.
    pub fn as_int(&self) -> i32 {
        match self {
            EngineProtocolVersion::V3 => 3,
            EngineProtocolVersion::V4 => 4,
            EngineProtocolVersion::V5 => 5,
        }
    }

    /// Decode a numeric version.
    pub fn from_int(version: i32) -> Option<Self> {
        match version {
            3 => Some(EngineProtocolVersion::V3),
            4 => Some(EngineProtocolVersion::V4),
            5 => Some(EngineProtocolVersion::V5),
            _ => None,
        }
    }
}

impl fmt::Display for EngineProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.as_int())
    }
}

/// The engine's write-type enumeration, converted by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum EngineWriteType {
    Simple,
    Batch,
    UnloggedBatch,
    Counter,
    BatchLog,
    Cas,
    View,
    Cdc,
}

impl EngineWriteType {
    /// Stable ordinal used for cross-model conversion.
    pub fn ordinal(&self) -> u8 {
        match self {
            EngineWriteType::Simple => 0,
            EngineWriteType::Batch => 1,
            EngineWriteType::UnloggedBatch => 2,
            EngineWriteType::Counter => 3,
            EngineWriteType::BatchLog => 4,
            EngineWriteType::Cas => 5,
            EngineWriteType::View => 6,
            EngineWriteType::Cdc => 7,
        }
    }
}

/// The engine's 128-bit prepared-statement digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Md5Digest([u8; 16]);

impl Md5Digest {
    /// Wrap raw digest bytes.
    pub fn wrap(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

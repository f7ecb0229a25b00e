//! Native-protocol versions
//!
//! Clients negotiate one of these versions on connection. The bridge
//! only supports V3 and newer for execution; V1/V2 are representable
//! here (a client can still ask for them) but are rejected when a
//! statement is bound, matching the behavior of the original server.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A negotiated native-protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProtocolVersion {
    /// Legacy version 1 (unsupported for execution)
    V1,
    /// Legacy version 2 (unsupported for execution)
    V2,
    /// Version 3
    V3,
    /// Version 4
    V4,
    /// Version 5
    V5,
}

impl ProtocolVersion {
    /// The numeric version carried on the wire.
    pub fn as_int(&self) -> i32 {
        match self {
            ProtocolVersion::V1 => 1,
            ProtocolVersion::V2 => 2,
            ProtocolVersion::V3 => 3,
            ProtocolVersion::V4 => 4,
            ProtocolVersion::V5 => 5,
        }
    }

    /// Decode a wire version number.
    ///
    /// Returns `None` for versions this bridge has never heard of.
    pub fn from_int(version: i32) -> Option<Self> {
        match version {
            1 => Some(ProtocolVersion::V1),
            2 => Some(ProtocolVersion::V2),
            3 => Some(ProtocolVersion::V3),
            4 => Some(ProtocolVersion::V4),
            5 => Some(ProtocolVersion::V5),
            _ => None,
        }
    }

    /// Whether prepared-statement execution is supported under this version.
    pub fn supports_execution(&self) -> bool {
        self.as_int() >= 3
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.as_int())
    }
}

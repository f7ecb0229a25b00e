//! Per-request query parameters
//!
//! Constructed once per request by the caller, immutable, and
//! consumed by the parameter marshaller. The `with_*` methods return
//! modified copies; nothing here mutates in place.

use crate::consistency::ConsistencyLevel;
use crate::protocol::ProtocolVersion;
use serde::{Deserialize, Serialize};

/// External query parameters for a single execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameters {
    /// Consistency level for the request
    pub consistency: ConsistencyLevel,
    /// Serial consistency for LWT operations; defaults to SERIAL
    /// downstream when absent
    pub serial_consistency: Option<ConsistencyLevel>,
    /// Requested page size; absent means unbounded
    pub page_size: Option<i32>,
    /// Opaque continuation token from a previous page
    pub paging_state: Option<Vec<u8>>,
    /// Client-provided default timestamp in microseconds
    pub default_timestamp: Option<i64>,
    /// Negotiated protocol version
    pub protocol_version: ProtocolVersion,
    /// Skip result metadata in the response
    pub skip_metadata: bool,
}

impl QueryParameters {
    /// Parameters with the given version and consistency, everything
    /// else absent.
    pub fn new(protocol_version: ProtocolVersion, consistency: ConsistencyLevel) -> Self {
        Self {
            consistency,
            serial_consistency: None,
            page_size: None,
            paging_state: None,
            default_timestamp: None,
            protocol_version,
            skip_metadata: false,
        }
    }

    /// Copy with a different consistency level.
    pub fn with_consistency(&self, consistency: ConsistencyLevel) -> Self {
        Self {
            consistency,
            ..self.clone()
        }
    }

    /// Copy with a serial consistency level.
    pub fn with_serial_consistency(&self, serial: ConsistencyLevel) -> Self {
        Self {
            serial_consistency: Some(serial),
            ..self.clone()
        }
    }

    /// Copy with a page size.
    pub fn with_page_size(&self, page_size: i32) -> Self {
        Self {
            page_size: Some(page_size),
            ..self.clone()
        }
    }

    /// Copy with a continuation token (or without one).
    pub fn with_paging_state(&self, paging_state: Option<Vec<u8>>) -> Self {
        Self {
            paging_state,
            ..self.clone()
        }
    }

    /// Copy with a default timestamp.
    pub fn with_default_timestamp(&self, timestamp: i64) -> Self {
        Self {
            default_timestamp: Some(timestamp),
            ..self.clone()
        }
    }

    /// Copy with the skip-metadata flag set.
    pub fn with_skip_metadata(&self) -> Self {
        Self {
            skip_metadata: true,
            ..self.clone()
        }
    }
}

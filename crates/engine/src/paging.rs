//! Paging continuation state
//!
//! The opaque token a client hands back to continue a paged read
//! decodes into this structure. Decoding consumes its input buffer;
//! the buffer is unusable afterwards, so callers that need the raw
//! token again must copy it first.

use crate::types::EngineProtocolVersion;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure decoding a continuation token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PagingStateError {
    /// The token ended before a complete field was read
    #[error("truncated paging state: {0}")]
    Truncated(&'static str),
    /// The token had bytes left after the last field
    #[error("{0} trailing byte(s) after paging state")]
    TrailingBytes(usize),
    /// A length prefix was negative or otherwise nonsensical
    #[error("invalid length in paging state: {0}")]
    InvalidLength(i64),
}

/// Decoded continuation state for a paged read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingState {
    /// Partition key the previous page stopped in, absent on a fresh
    /// partition boundary
    pub partition_key: Option<Vec<u8>>,
    /// Clustering mark of the last row returned
    pub row_mark: Option<Vec<u8>>,
    /// Rows remaining across the whole query
    pub remaining: i32,
    /// Rows remaining within the current partition
    pub remaining_in_partition: i32,
}

impl PagingState {
    /// Encode this state as an opaque token.
    ///
    /// V3 tokens carry u16 segment lengths; V4 and later carry i32
    /// lengths. Both end with the two remaining-row counters.
    pub fn serialize(&self, version: EngineProtocolVersion) -> Vec<u8> {
        let mut out = Vec::new();
        match version {
            EngineProtocolVersion::V3 => {
                write_short_segment(&mut out, self.partition_key.as_deref());
                write_short_segment(&mut out, self.row_mark.as_deref());
            }
            _ => {
                write_int_segment(&mut out, self.partition_key.as_deref());
                write_int_segment(&mut out, self.row_mark.as_deref());
            }
        }
        out.extend_from_slice(&self.remaining.to_be_bytes());
        out.extend_from_slice(&self.remaining_in_partition.to_be_bytes());
        out
    }

    /// Decode a token, consuming the buffer.
    ///
    /// The buffer is drained as fields are read; on success it is
    /// empty, and on failure its remaining contents are unspecified.
    pub fn deserialize(
        buf: &mut Vec<u8>,
        version: EngineProtocolVersion,
    ) -> Result<Self, PagingStateError> {
        let (partition_key, row_mark) = match version {
            EngineProtocolVersion::V3 => {
                (read_short_segment(buf)?, read_short_segment(buf)?)
            }
            _ => (read_int_segment(buf)?, read_int_segment(buf)?),
        };
        let remaining = read_i32(buf)?;
        let remaining_in_partition = read_i32(buf)?;
        if !buf.is_empty() {
            return Err(PagingStateError::TrailingBytes(buf.len()));
        }
        Ok(Self {
            partition_key,
            row_mark,
            remaining,
            remaining_in_partition,
        })
    }
}

fn write_short_segment(out: &mut Vec<u8>, segment: Option<&[u8]>) {
    match segment {
        Some(bytes) => {
            out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            out.extend_from_slice(bytes);
        }
        None => out.extend_from_slice(&u16::MAX.to_be_bytes()),
    }
}

fn write_int_segment(out: &mut Vec<u8>, segment: Option<&[u8]>) {
    match segment {
        Some(bytes) => {
            out.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
            out.extend_from_slice(bytes);
        }
        None => out.extend_from_slice(&(-1i32).to_be_bytes()),
    }
}

fn take(buf: &mut Vec<u8>, n: usize, what: &'static str) -> Result<Vec<u8>, PagingStateError> {
    if buf.len() < n {
        return Err(PagingStateError::Truncated(what));
    }
    let rest = buf.split_off(n);
    let taken = std::mem::replace(buf, rest);
    Ok(taken)
}

fn read_short_segment(buf: &mut Vec<u8>) -> Result<Option<Vec<u8>>, PagingStateError> {
    let len_bytes = take(buf, 2, "segment length")?;
    let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]);
    if len == u16::MAX {
        return Ok(None);
    }
    take(buf, len as usize, "segment body").map(Some)
}

fn read_int_segment(buf: &mut Vec<u8>) -> Result<Option<Vec<u8>>, PagingStateError> {
    let len = read_i32(buf)?;
    if len == -1 {
        return Ok(None);
    }
    if len < 0 {
        return Err(PagingStateError::InvalidLength(len as i64));
    }
    take(buf, len as usize, "segment body").map(Some)
}

fn read_i32(buf: &mut Vec<u8>) -> Result<i32, PagingStateError> {
    let bytes = take(buf, 4, "int field")?;
    Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PagingState {
        PagingState {
            partition_key: Some(vec![1, 2, 3]),
            row_mark: None,
            remaining: 500,
            remaining_in_partition: 12,
        }
    }

    #[test]
    fn test_roundtrip_v4() {
        let token = sample().serialize(EngineProtocolVersion::V4);
        let mut buf = token;
        let decoded = PagingState::deserialize(&mut buf, EngineProtocolVersion::V4)
            .expect("token should decode");
        assert_eq!(decoded, sample());
        assert!(buf.is_empty(), "decode drains the buffer");
    }

    #[test]
    fn test_roundtrip_v3_short_lengths() {
        let token = sample().serialize(EngineProtocolVersion::V3);
        let mut buf = token;
        let decoded = PagingState::deserialize(&mut buf, EngineProtocolVersion::V3)
            .expect("token should decode");
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_truncated_token_is_rejected() {
        let mut token = sample().serialize(EngineProtocolVersion::V4);
        token.truncate(token.len() - 1);
        let err = PagingState::deserialize(&mut token, EngineProtocolVersion::V4)
            .expect_err("truncated token must fail");
        assert!(matches!(err, PagingStateError::Truncated(_)));
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let mut token = sample().serialize(EngineProtocolVersion::V4);
        token.push(0xFF);
        let err = PagingState::deserialize(&mut token, EngineProtocolVersion::V4)
            .expect_err("oversized token must fail");
        assert_eq!(err, PagingStateError::TrailingBytes(1));
    }

    #[test]
    fn test_garbage_length_is_rejected() {
        let mut token = (-2i32).to_be_bytes().to_vec();
        token.extend_from_slice(&[0; 12]);
        let err = PagingState::deserialize(&mut token, EngineProtocolVersion::V4)
            .expect_err("negative length must fail");
        assert!(matches!(err, PagingStateError::InvalidLength(_)));
    }
}

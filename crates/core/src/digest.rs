//! Prepared-statement digests
//!
//! A prepared statement is identified by a 128-bit content digest of
//! its query string. The digest is computed by the engine; this type
//! only carries it across the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 128-bit content digest identifying a prepared statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatementId([u8; 16]);

impl StatementId {
    /// Wrap raw digest bytes.
    pub fn wrap(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_preserves_bytes() {
        let bytes: [u8; 16] = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
            0xEE, 0xFF,
        ];
        let id = StatementId::wrap(bytes);
        assert_eq!(*id.as_bytes(), bytes);
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        let id = StatementId::wrap([0xAB; 16]);
        assert_eq!(format!("{}", id), "ab".repeat(16));
    }

    #[test]
    fn test_equality_and_hash() {
        use std::collections::HashSet;
        let a = StatementId::wrap([1; 16]);
        let b = StatementId::wrap([1; 16]);
        let c = StatementId::wrap([2; 16]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        set.insert(c);
        assert_eq!(set.len(), 2);
    }
}
